use super::backend::{FileStat, StorageBackend};
use crate::error::{QuicknoteError, Result};
use chrono::{DateTime, Utc};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

#[derive(Clone)]
struct FileEntry {
    text: String,
    mtime: DateTime<Utc>,
}

/// In-memory storage backend for testing.
///
/// Uses `RefCell` for interior mutability since quicknote is single-threaded.
/// This keeps the `StorageBackend` trait on `&self` for all methods.
#[derive(Default)]
pub struct MemBackend {
    files: RefCell<HashMap<PathBuf, FileEntry>>,
    dirs: RefCell<HashSet<PathBuf>>,
    simulate_write_error: RefCell<bool>,
    simulate_list_error: RefCell<bool>,
    failing_writes: RefCell<HashSet<PathBuf>>,
    failing_reads: RefCell<HashSet<PathBuf>>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for every path.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }

    /// Make directory listings fail.
    pub fn set_simulate_list_error(&self, simulate: bool) {
        *self.simulate_list_error.borrow_mut() = simulate;
    }

    /// Make writes to one path fail.
    pub fn fail_writes_to(&self, path: impl Into<PathBuf>) {
        self.failing_writes.borrow_mut().insert(path.into());
    }

    /// Make reads of one path fail.
    pub fn fail_reads_of(&self, path: impl Into<PathBuf>) {
        self.failing_reads.borrow_mut().insert(path.into());
    }

    /// Test helper: number of files directly under `dir`.
    pub fn file_count(&self, dir: &Path) -> usize {
        self.files
            .borrow()
            .keys()
            .filter(|p| p.parent() == Some(dir))
            .count()
    }

    fn parent_known(&self, path: &Path) -> bool {
        match path.parent() {
            Some(parent) => self.dir_exists(parent),
            None => true,
        }
    }
}

impl StorageBackend for MemBackend {
    fn read(&self, path: &Path) -> Result<String> {
        if self.failing_reads.borrow().contains(path) {
            return Err(QuicknoteError::Store("Simulated read error".to_string()));
        }
        self.files
            .borrow()
            .get(path)
            .map(|e| e.text.clone())
            .ok_or_else(|| QuicknoteError::InvalidPath(path.to_path_buf()))
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        if *self.simulate_write_error.borrow() || self.failing_writes.borrow().contains(path) {
            return Err(QuicknoteError::Store("Simulated write error".to_string()));
        }
        if !self.parent_known(path) {
            return Err(QuicknoteError::InvalidPath(path.to_path_buf()));
        }
        self.files.borrow_mut().insert(
            path.to_path_buf(),
            FileEntry {
                text: content.to_string(),
                mtime: Utc::now(),
            },
        );
        Ok(())
    }

    fn delete(&self, path: &Path) -> Result<()> {
        self.files.borrow_mut().remove(path);
        Ok(())
    }

    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if *self.simulate_list_error.borrow() {
            return Err(QuicknoteError::Store("Simulated list error".to_string()));
        }
        Ok(self
            .files
            .borrow()
            .keys()
            .filter(|p| p.parent() == Some(dir))
            .cloned()
            .collect())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(path)
    }

    fn dir_exists(&self, dir: &Path) -> bool {
        self.dirs.borrow().iter().any(|d| d.starts_with(dir))
    }

    fn ensure_dir(&self, dir: &Path) -> Result<()> {
        self.dirs.borrow_mut().insert(dir.to_path_buf());
        Ok(())
    }

    fn stat(&self, path: &Path) -> Result<Option<FileStat>> {
        Ok(self.files.borrow().get(path).map(|e| FileStat {
            bytes: e.text.len() as u64,
            modified: e.mtime,
        }))
    }
}
