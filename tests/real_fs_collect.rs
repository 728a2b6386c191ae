// tests/real_fs_collect.rs
//
// Same collector, real directory tree.

mod common;

use std::fs;
use std::time::{Duration, SystemTime};

use statreload::collect::{collect, WatchSet};
use statreload::fs::{FileSystem, RealFileSystem};
use statreload::reload::{Snapshot, Stamp};
use statreload_test_utils::builders::ReloadSettingsBuilder;

use common::init_tracing;

#[test]
fn scans_a_temporary_project() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("pkg/__pycache__")).unwrap();
    fs::create_dir_all(root.join("node_modules/left-pad")).unwrap();
    fs::write(root.join("app.py"), "print('hi')").unwrap();
    fs::write(root.join("pkg/mod.py"), "").unwrap();
    fs::write(root.join("pkg/__pycache__/mod.cpython-312.pyc"), "").unwrap();
    fs::write(root.join("node_modules/left-pad/index.js"), "").unwrap();
    fs::write(root.join("debug.log"), "").unwrap();

    let settings = ReloadSettingsBuilder::new(root.to_str().unwrap())
        .all_files()
        .ignore("*.log")
        .build();
    let set = collect(&RealFileSystem, root, &settings).unwrap();

    let canonical = root.canonicalize().unwrap();
    let mut found: Vec<_> = set
        .iter()
        .map(|p| p.strip_prefix(&canonical).unwrap().to_path_buf())
        .collect();
    found.sort();
    assert_eq!(
        found,
        vec![
            std::path::PathBuf::from("app.py"),
            std::path::PathBuf::from("pkg/mod.py")
        ]
    );
}

#[test]
fn snapshot_sees_a_newer_mtime_and_a_deletion() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("main.rs");
    fs::write(&file, "fn main() {}").unwrap();
    let file = file.canonicalize().unwrap();

    let set: WatchSet = [file.clone()].into_iter().collect();
    let mut snapshot = Snapshot::capture(&RealFileSystem, &set);
    assert!(matches!(snapshot.get(&file), Some(Stamp::Present(_))));

    // Push the mtime forward explicitly; coarse filesystem clocks would make
    // a plain rewrite flaky.
    let later = SystemTime::now() + Duration::from_secs(5);
    fs::File::options()
        .write(true)
        .open(&file)
        .unwrap()
        .set_modified(later)
        .unwrap();
    let report = snapshot.refresh(&RealFileSystem, &set);
    assert_eq!(report.changed, vec![file.clone()]);

    fs::remove_file(&file).unwrap();
    let report = snapshot.refresh(&RealFileSystem, &set);
    assert!(report.changed.is_empty());
    assert_eq!(report.removed, vec![file.clone()]);
    assert_eq!(RealFileSystem.modified(&file).unwrap(), None);
}
