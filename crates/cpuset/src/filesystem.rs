use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::io::{Error, ErrorKind, Result};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Backend for the handful of filesystem primitives a cpuset partition needs.
///
/// On a real host this is the cgroup-v2 mount. Tests swap in [`MemoryFileSystem`].
pub trait FileSystem {
    /// Create a single directory. The parent must exist.
    fn create_dir(&self, path: &Path) -> Result<()>;
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn exists(&self, path: &Path) -> bool;
    /// Remove an empty directory (`rmdir`), never recursively.
    fn remove_dir(&self, path: &Path) -> Result<()>;
    /// Immediate subdirectories of `path`, sorted.
    fn list_dirs(&self, path: &Path) -> Result<Vec<PathBuf>>;
}

pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn create_dir(&self, path: &Path) -> Result<()> {
        fs::create_dir(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        fs::write(path, contents)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn remove_dir(&self, path: &Path) -> Result<()> {
        fs::remove_dir(path)
    }

    fn list_dirs(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut dirs = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                dirs.push(entry.path());
            }
        }
        dirs.sort();
        Ok(dirs)
    }
}

/// Operations of [`MemoryFileSystem`] that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateDir,
    Write,
    RemoveDir,
}

#[derive(Default)]
struct State {
    dirs: BTreeSet<PathBuf>,
    files: BTreeMap<PathBuf, Vec<u8>>,
    failures: HashSet<(Operation, PathBuf)>,
    calls: Vec<(Operation, PathBuf)>,
}

/// In-memory stand-in for the cgroup hierarchy.
///
/// Clones share state, so a test can keep one handle and give the other to a
/// partition. Every mutating call is recorded, including failed ones.
#[derive(Clone, Default)]
pub struct MemoryFileSystem {
    state: Arc<Mutex<State>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// A filesystem where `root` and all of its ancestors already exist.
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        let fs = Self::new();
        {
            let mut state = fs.lock();
            for ancestor in root.as_ref().ancestors() {
                state.dirs.insert(ancestor.to_path_buf());
            }
        }
        fs
    }

    /// Make every future `op` on exactly `path` fail with `PermissionDenied`.
    pub fn fail_on(&self, op: Operation, path: impl Into<PathBuf>) {
        self.lock().failures.insert((op, path.into()));
    }

    pub fn file(&self, path: impl AsRef<Path>) -> Option<String> {
        self.lock()
            .files
            .get(path.as_ref())
            .map(|contents| String::from_utf8_lossy(contents).into_owned())
    }

    pub fn calls(&self) -> Vec<(Operation, PathBuf)> {
        self.lock().calls.clone()
    }

    /// Number of recorded calls of kind `op`.
    pub fn count(&self, op: Operation) -> usize {
        self.lock().calls.iter().filter(|(o, _)| *o == op).count()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // a poisoned lock only means another test thread panicked
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(state: &mut State, op: Operation, path: &Path) -> Result<()> {
        state.calls.push((op, path.to_path_buf()));
        if state.failures.contains(&(op, path.to_path_buf())) {
            return Err(Error::new(ErrorKind::PermissionDenied, "Permission denied"));
        }
        Ok(())
    }

    fn parent_exists(state: &State, path: &Path) -> bool {
        path.parent()
            .map(|parent| state.dirs.contains(parent))
            .unwrap_or(false)
    }
}

impl FileSystem for MemoryFileSystem {
    fn create_dir(&self, path: &Path) -> Result<()> {
        let mut state = self.lock();
        Self::record(&mut state, Operation::CreateDir, path)?;
        if state.dirs.contains(path) {
            return Err(Error::new(ErrorKind::AlreadyExists, "File exists"));
        }
        if !Self::parent_exists(&state, path) {
            return Err(Error::new(ErrorKind::NotFound, "No such file or directory"));
        }
        state.dirs.insert(path.to_path_buf());
        Ok(())
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let mut state = self.lock();
        Self::record(&mut state, Operation::Write, path)?;
        if !Self::parent_exists(&state, path) {
            return Err(Error::new(ErrorKind::NotFound, "No such file or directory"));
        }
        state.files.insert(path.to_path_buf(), contents.to_vec());
        Ok(())
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        let state = self.lock();
        let contents = state
            .files
            .get(path)
            .ok_or_else(|| Error::new(ErrorKind::NotFound, "File not found"))?;
        String::from_utf8(contents.clone()).map_err(|e| Error::new(ErrorKind::InvalidData, e))
    }

    fn exists(&self, path: &Path) -> bool {
        let state = self.lock();
        state.dirs.contains(path) || state.files.contains_key(path)
    }

    // behaves like rmdir on cgroupfs: control files go away with the directory
    fn remove_dir(&self, path: &Path) -> Result<()> {
        let mut state = self.lock();
        Self::record(&mut state, Operation::RemoveDir, path)?;
        if !state.dirs.contains(path) {
            return Err(Error::new(ErrorKind::NotFound, "No such file or directory"));
        }
        let has_children = state
            .dirs
            .iter()
            .any(|dir| dir != path && dir.starts_with(path));
        if has_children {
            return Err(Error::new(ErrorKind::Other, "Device or resource busy"));
        }
        state.dirs.remove(path);
        state.files.retain(|file, _| !file.starts_with(path));
        Ok(())
    }

    fn list_dirs(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let state = self.lock();
        if !state.dirs.contains(path) {
            return Err(Error::new(ErrorKind::NotFound, "No such file or directory"));
        }
        Ok(state
            .dirs
            .iter()
            .filter(|dir| dir.parent() == Some(path))
            .cloned()
            .collect())
    }
}
