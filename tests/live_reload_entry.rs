// tests/live_reload_entry.rs

mod common;

use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::oneshot;
use tokio::time::{sleep, Duration, Instant};

use statreload::entry::LiveReload;
use statreload::errors::ReloadError;
use statreload::fs::mock::MockFileSystem;
use statreload::fs::FileSystem;
use statreload::types::ProcessRole;
use statreload_test_utils::builders::{invocation, ReloadSettingsBuilder};
use statreload_test_utils::fake_launcher::FakeLauncher;
use statreload_test_utils::with_timeout;

use common::{init_tracing, sample_project};

fn settings() -> statreload::config::ReloadSettings {
    ReloadSettingsBuilder::new("/proj")
        .interval(Duration::from_millis(100))
        .build()
}

#[tokio::test]
async fn inner_role_runs_the_target_and_nothing_else() {
    init_tracing();
    let (fs, _) = sample_project();
    let (launcher, _exits) = FakeLauncher::new();
    let record = launcher.record();
    let shared: Arc<dyn FileSystem> = Arc::new(fs);

    let mut live = LiveReload::new(
        ProcessRole::Inner,
        settings(),
        shared,
        launcher,
        invocation("/bin/app", &["serve"]),
    );
    let (_tx, rx) = oneshot::channel();
    let result = live.run(rx, || 42).await.unwrap();

    assert_eq!(result, Some(42));
    let record = record.lock().unwrap();
    assert!(record.spawned.is_empty());
    assert!(record.restarted.is_empty());
}

#[tokio::test(start_paused = true)]
async fn outer_role_restarts_with_identical_argv() {
    init_tracing();
    let (fs, _) = sample_project();
    let (launcher, _exits) = FakeLauncher::new();
    let record = launcher.record();
    let shared: Arc<dyn FileSystem> = Arc::new(fs.clone());
    let original = invocation("/usr/local/bin/app", &["a", "b", "c"]);

    let mut live = LiveReload::new(
        ProcessRole::Outer,
        settings(),
        shared,
        launcher,
        original.clone(),
    );

    let target_ran = AtomicBool::new(false);
    let (_tx, rx) = oneshot::channel();
    let edit = async {
        sleep(Duration::from_millis(150)).await;
        fs.touch("/proj/lib/util.py");
    };
    let (result, ()) = with_timeout(async {
        tokio::join!(live.run(rx, || target_ran.store(true, Ordering::SeqCst)), edit)
    })
    .await;

    // The fake cannot exec, so the restart surfaces as its error.
    assert!(matches!(result, Err(ReloadError::RestartError { .. })));
    assert!(!target_ran.load(Ordering::SeqCst));

    let record = record.lock().unwrap();
    let expected: Vec<OsString> = ["a", "b", "c"].iter().map(OsString::from).collect();

    assert_eq!(record.spawned.len(), 1);
    let inner = &record.spawned[0];
    assert_eq!(inner.args, expected);
    assert_eq!(inner.role(), ProcessRole::Inner);
    assert_eq!(inner.env_var("HOME"), original.env_var("HOME"));

    assert_eq!(record.restarted.len(), 1);
    let restarted = &record.restarted[0];
    assert_eq!(restarted.last_changed(), vec![PathBuf::from("/proj/lib/util.py")]);
    // Apart from the record of what changed, the relaunch is the original.
    assert_eq!(restarted.clone().with_last_changed(&[]), original);
}

#[tokio::test(start_paused = true)]
async fn crash_after_restart_reports_the_edit() {
    init_tracing();
    let (fs, _) = sample_project();
    let shared: Arc<dyn FileSystem> = Arc::new(fs.clone());

    // First generation: an edit triggers the restart.
    let (launcher, _exits) = FakeLauncher::new();
    let record = launcher.record();
    let mut live = LiveReload::new(
        ProcessRole::Outer,
        settings(),
        shared.clone(),
        launcher,
        invocation("/bin/app", &["serve"]),
    );
    let (_tx, rx) = oneshot::channel();
    let edit = async {
        sleep(Duration::from_millis(50)).await;
        fs.touch("/proj/app.py");
    };
    let (result, ()) = with_timeout(async { tokio::join!(live.run(rx, || ()), edit) }).await;
    assert!(matches!(result, Err(ReloadError::RestartError { .. })));
    let relaunch = record.lock().unwrap().restarted[0].clone();

    // Second generation starts from that relaunch and its target fails.
    let (launcher, exits) = FakeLauncher::new();
    let record = launcher.record();
    let mut live = LiveReload::new(ProcessRole::Outer, settings(), shared, launcher, relaunch);
    exits.exit(Some(1));
    let (_tx, rx) = oneshot::channel();
    let err = with_timeout(live.run(rx, || ())).await.unwrap_err();

    assert!(matches!(err, ReloadError::TargetError(1)));
    // The inner process never sees the record.
    let record = record.lock().unwrap();
    assert!(record.spawned[0].last_changed().is_empty());
    assert_eq!(record.spawned[0].role(), ProcessRole::Inner);
}

#[tokio::test(start_paused = true)]
async fn ignored_log_file_never_restarts_but_source_edit_does_once() {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_file("/proj/a.py");
    fs.add_file("/proj/b.log");
    let settings = ReloadSettingsBuilder::new("/proj")
        .interval(Duration::from_millis(100))
        .all_files()
        .ignore("*.log")
        .build();

    let (launcher, _exits) = FakeLauncher::new();
    let record = launcher.record();
    let shared: Arc<dyn FileSystem> = Arc::new(fs.clone());
    let original = invocation("/usr/bin/python3", &["a.py", "--port", "8000"]);
    let mut live = LiveReload::new(
        ProcessRole::Outer,
        settings,
        shared,
        launcher,
        original.clone(),
    );

    let start = Instant::now();
    let (_tx, rx) = oneshot::channel();
    let edits = async {
        sleep(Duration::from_millis(50)).await;
        fs.touch("/proj/b.log");
        sleep(Duration::from_millis(200)).await;
        fs.touch("/proj/b.log");
        fs.touch("/proj/a.py");
    };
    let (result, ()) = with_timeout(async { tokio::join!(live.run(rx, || ()), edits) }).await;

    assert!(matches!(result, Err(ReloadError::RestartError { .. })));
    // Only the 300ms tick, after `a.py` was written, saw a change.
    assert_eq!(start.elapsed(), Duration::from_millis(300));

    let record = record.lock().unwrap();
    assert_eq!(record.restarted.len(), 1);
    let restarted = &record.restarted[0];
    assert_eq!(restarted.program, original.program);
    assert_eq!(restarted.arg0, original.arg0);
    assert_eq!(restarted.args, original.args);
    assert_eq!(restarted.last_changed(), vec![PathBuf::from("/proj/a.py")]);
}

#[tokio::test(start_paused = true)]
async fn failing_inner_process_becomes_a_target_error() {
    let (fs, _) = sample_project();
    let (launcher, exits) = FakeLauncher::new();
    let shared: Arc<dyn FileSystem> = Arc::new(fs);

    let mut live = LiveReload::new(
        ProcessRole::Outer,
        settings(),
        shared,
        launcher,
        invocation("/bin/app", &[]),
    );

    exits.exit(Some(4));
    let (_tx, rx) = oneshot::channel();
    let err = with_timeout(live.run(rx, || ())).await.unwrap_err();

    assert!(matches!(err, ReloadError::TargetError(4)));
    assert_eq!(err.exit_code(), 4);
    assert!(live.launcher().snapshot().restarted.is_empty());
}

#[tokio::test(start_paused = true)]
async fn stop_request_returns_none() {
    let (fs, _) = sample_project();
    let (launcher, _exits) = FakeLauncher::new();
    let shared: Arc<dyn FileSystem> = Arc::new(fs);

    let mut live = LiveReload::new(
        ProcessRole::Outer,
        settings(),
        shared,
        launcher,
        invocation("/bin/app", &[]),
    );

    let (tx, rx) = oneshot::channel();
    let stop = async {
        sleep(Duration::from_millis(350)).await;
        tx.send(()).unwrap();
    };
    let (result, ()) = tokio::join!(live.run(rx, || ()), stop);

    assert_eq!(result.unwrap(), None);
    let record = live.launcher().snapshot();
    assert_eq!(record.stopped, 1);
    assert!(record.restarted.is_empty());
}

#[tokio::test]
async fn bad_pattern_fails_before_anything_starts() {
    let (fs, _) = sample_project();
    let (launcher, _exits) = FakeLauncher::new();
    let shared: Arc<dyn FileSystem> = Arc::new(fs);
    let settings = ReloadSettingsBuilder::new("/proj").ignore("src/[").build();

    let mut live = LiveReload::new(
        ProcessRole::Outer,
        settings,
        shared,
        launcher,
        invocation("/bin/app", &[]),
    );

    let (_tx, rx) = oneshot::channel();
    let err = live.run(rx, || ()).await.unwrap_err();

    assert!(err.is_config_error());
    assert!(live.launcher().snapshot().spawned.is_empty());
}
