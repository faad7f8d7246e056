use super::backend::{FileStat, StorageBackend};
use crate::error::{QuicknoteError, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Default, Clone, Copy)]
pub struct FsBackend;

impl FsBackend {
    pub fn new() -> Self {
        Self
    }

    /// Hidden sibling used while writing; never matches the snapshot suffix.
    fn partial_path(path: &Path) -> Result<PathBuf> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| QuicknoteError::InvalidPath(path.to_path_buf()))?;
        let partial = format!(".{}.{}.partial", name, Uuid::new_v4().simple());
        Ok(match path.parent() {
            Some(parent) => parent.join(partial),
            None => PathBuf::from(partial),
        })
    }
}

impl StorageBackend for FsBackend {
    fn read(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).map_err(QuicknoteError::Io)
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        // Atomic Write
        let tmp_path = Self::partial_path(path)?;
        if let Err(e) = fs::write(&tmp_path, content) {
            let _ = fs::remove_file(&tmp_path);
            return Err(QuicknoteError::Io(e));
        }
        if let Err(e) = fs::rename(&tmp_path, path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(QuicknoteError::Io(e));
        }
        Ok(())
    }

    fn delete(&self, path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(QuicknoteError::Io(e)),
        }
    }

    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(dir).map_err(QuicknoteError::Io)? {
            match entry {
                Ok(entry) if entry.path().is_file() => files.push(entry.path()),
                Ok(_) => {}
                Err(e) => warn!(dir = %dir.display(), error = %e, "skipping unreadable entry"),
            }
        }
        Ok(files)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn dir_exists(&self, dir: &Path) -> bool {
        dir.is_dir()
    }

    fn ensure_dir(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir).map_err(QuicknoteError::Io)
    }

    fn stat(&self, path: &Path) -> Result<Option<FileStat>> {
        match fs::metadata(path) {
            Ok(meta) => {
                let modified: DateTime<Utc> = meta.modified().unwrap_or(SystemTime::now()).into();
                Ok(Some(FileStat {
                    bytes: meta.len(),
                    modified,
                }))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(QuicknoteError::Io(e)),
        }
    }
}
