use crate::error::Result;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// Size and age of a stored file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub bytes: u64,
    pub modified: DateTime<Utc>,
}

/// Abstract interface for raw file I/O.
/// This trait handles the "how" of storage (filesystem vs memory),
/// while SnapshotStore and the save commands handle the "what".
pub trait StorageBackend {
    /// Read a whole UTF-8 file.
    fn read(&self, path: &Path) -> Result<String>;

    /// Create or fully replace a file.
    /// MUST be atomic (e.g. write to tmp then rename) to avoid partial writes.
    fn write(&self, path: &Path, content: &str) -> Result<()>;

    /// Remove a file. A missing file is not an error.
    fn delete(&self, path: &Path) -> Result<()>;

    /// Direct children of `dir` that are files. A missing directory lists as empty.
    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>>;

    fn exists(&self, path: &Path) -> bool;

    fn dir_exists(&self, dir: &Path) -> bool;

    /// Create `dir` and its parents. Succeeds if it already exists.
    fn ensure_dir(&self, dir: &Path) -> Result<()>;

    /// Returns Ok(None) if the file does not exist.
    fn stat(&self, path: &Path) -> Result<Option<FileStat>>;
}
