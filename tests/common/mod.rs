#![allow(dead_code)]

use std::time::SystemTime;

use statreload::fs::mock::MockFileSystem;

pub use statreload_test_utils::init_tracing;

/// A small project under `/proj`:
///
/// ```text
/// /proj/app.py
/// /proj/lib/util.py
/// /proj/README.md
/// ```
///
/// Returns the filesystem and the stamp given to `app.py`.
pub fn sample_project() -> (MockFileSystem, SystemTime) {
    let fs = MockFileSystem::new();
    let app = fs.add_file("/proj/app.py");
    fs.add_file("/proj/lib/util.py");
    fs.add_file("/proj/README.md");
    (fs, app)
}
