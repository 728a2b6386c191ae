// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File { modified: SystemTime },
    Dir(Vec<String>), // List of child names
}

#[derive(Debug, Default)]
struct MockState {
    entries: HashMap<PathBuf, MockEntry>,
    /// Paths whose `modified` call fails, simulating a file caught mid-write.
    failing: HashSet<PathBuf>,
    /// Logical clock; every write advances it by one second.
    ticks: u64,
}

/// In-memory filesystem with a logical modification clock.
///
/// Clones share state, so a test can keep a handle and mutate files while a
/// reloader polls another handle.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
}

const CLOCK_ORIGIN_SECS: u64 = 1_700_000_000;

impl MockFileSystem {
    pub fn new() -> Self {
        let fs = Self::default();
        fs.state
            .lock()
            .unwrap()
            .entries
            .insert(PathBuf::from("."), MockEntry::Dir(Vec::new()));
        fs
    }

    /// Current value of the logical clock.
    pub fn now(&self) -> SystemTime {
        let state = self.state.lock().unwrap();
        clock_time(state.ticks)
    }

    /// Create (or overwrite) a file, stamping it with a fresh modification
    /// time. Returns that time.
    pub fn add_file(&self, path: impl AsRef<Path>) -> SystemTime {
        let path = path.as_ref().to_path_buf();
        let mut state = self.state.lock().unwrap();
        state.ticks += 1;
        let modified = clock_time(state.ticks);
        state
            .entries
            .insert(path.clone(), MockEntry::File { modified });
        link_into_parent(&mut state.entries, &path);
        modified
    }

    /// Create an empty directory (and its parents).
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut state = self.state.lock().unwrap();
        ensure_dir_entry(&mut state.entries, path.as_ref());
    }

    /// Bump the modification time of an existing file, or create it.
    pub fn touch(&self, path: impl AsRef<Path>) -> SystemTime {
        self.add_file(path)
    }

    /// Force a specific modification time (e.g. to move it backwards).
    pub fn set_modified(&self, path: impl AsRef<Path>, modified: SystemTime) {
        let path = path.as_ref().to_path_buf();
        let mut state = self.state.lock().unwrap();
        state
            .entries
            .insert(path.clone(), MockEntry::File { modified });
        link_into_parent(&mut state.entries, &path);
    }

    /// Delete a file or directory entry.
    pub fn remove(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut state = self.state.lock().unwrap();
        state.entries.remove(path);
        if let (Some(parent), Some(name)) = (parent_of(path), path.file_name()) {
            let name = name.to_string_lossy().into_owned();
            if let Some(MockEntry::Dir(children)) = state.entries.get_mut(&parent) {
                children.retain(|c| c != &name);
            }
        }
    }

    /// Make `modified(path)` fail until cleared.
    pub fn fail_stat(&self, path: impl AsRef<Path>, failing: bool) {
        let path = path.as_ref().to_path_buf();
        let mut state = self.state.lock().unwrap();
        if failing {
            state.failing.insert(path);
        } else {
            state.failing.remove(&path);
        }
    }
}

fn clock_time(ticks: u64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(CLOCK_ORIGIN_SECS + ticks)
}

fn parent_of(path: &Path) -> Option<PathBuf> {
    path.parent().map(|parent| {
        if parent.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            parent.to_path_buf()
        }
    })
}

fn link_into_parent(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    let Some(parent) = parent_of(path) else {
        return;
    };
    if parent == path {
        return;
    }
    ensure_dir_entry(entries, &parent);
    if let Some(MockEntry::Dir(children)) = entries.get_mut(&parent) {
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if !children.iter().any(|c| c == name) {
                children.push(name.to_string());
            }
        }
    }
}

fn ensure_dir_entry(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    if entries.contains_key(path) {
        return;
    }
    entries.insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
    link_into_parent(entries, path);
}

impl FileSystem for MockFileSystem {
    fn is_file(&self, path: &Path) -> bool {
        let state = self.state.lock().unwrap();
        matches!(state.entries.get(path), Some(MockEntry::File { .. }))
    }

    fn is_dir(&self, path: &Path) -> bool {
        let state = self.state.lock().unwrap();
        matches!(state.entries.get(path), Some(MockEntry::Dir(_)))
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        // In mock, we just return the path as is, assuming absolute paths are used in tests
        let state = self.state.lock().unwrap();
        if state.entries.contains_key(path) {
            Ok(path.to_path_buf())
        } else {
            Err(anyhow!("No such file or directory: {:?}", path))
        }
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let state = self.state.lock().unwrap();
        match state.entries.get(path) {
            Some(MockEntry::Dir(children)) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }

    fn modified(&self, path: &Path) -> Result<Option<SystemTime>> {
        let state = self.state.lock().unwrap();
        if state.failing.contains(path) {
            return Err(anyhow!("Resource temporarily unavailable: {:?}", path));
        }
        match state.entries.get(path) {
            Some(MockEntry::File { modified }) => Ok(Some(*modified)),
            Some(MockEntry::Dir(_)) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Ok(None),
        }
    }
}
