use super::backend::{FileStat, StorageBackend};
use crate::error::Result;
use crate::paths::{is_snapshot_name, SnapshotPaths};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Durable read/write/delete of snapshot payloads inside the snapshot directory.
pub struct SnapshotStore<B: StorageBackend> {
    /// The underlying storage backend.
    /// Exposed as pub(crate) for the real save path and tests.
    pub(crate) backend: B,
    paths: SnapshotPaths,
}

impl<B: StorageBackend> SnapshotStore<B> {
    pub fn new(backend: B, paths: SnapshotPaths) -> Self {
        Self { backend, paths }
    }

    pub fn paths(&self) -> &SnapshotPaths {
        &self.paths
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Create or overwrite a snapshot, creating the directory on demand.
    ///
    /// Failures are logged and returned; auto-save never surfaces them to the user.
    pub fn write(&self, path: &Path, payload: &str) -> Result<()> {
        let result = self
            .backend
            .ensure_dir(self.paths.dir())
            .and_then(|_| self.backend.write(path, payload));
        match &result {
            Ok(()) => debug!(path = %path.display(), bytes = payload.len(), "snapshot written"),
            Err(e) => warn!(path = %path.display(), error = %e, "snapshot write failed"),
        }
        result
    }

    pub fn read(&self, path: &Path) -> Result<String> {
        self.backend.read(path).inspect_err(|e| {
            warn!(path = %path.display(), error = %e, "snapshot read failed");
        })
    }

    /// Idempotent; failures are logged and swallowed.
    pub fn delete(&self, path: &Path) {
        if !self.backend.exists(path) {
            return;
        }
        match self.backend.delete(path) {
            Ok(()) => debug!(path = %path.display(), "snapshot removed"),
            Err(e) => warn!(path = %path.display(), error = %e, "snapshot removal failed"),
        }
    }

    /// All snapshot files, unordered.
    pub fn list(&self) -> Result<Vec<PathBuf>> {
        let files = self.backend.list_files(self.paths.dir())?;
        Ok(files
            .into_iter()
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(is_snapshot_name)
            })
            .collect())
    }

    pub fn dir_exists(&self) -> bool {
        self.backend.dir_exists(self.paths.dir())
    }

    pub fn stat(&self, path: &Path) -> Result<Option<FileStat>> {
        self.backend.stat(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem_backend::MemBackend;

    const DIR: &str = "/home/ada/.quicknote_autosave";

    fn make_store() -> SnapshotStore<MemBackend> {
        SnapshotStore::new(MemBackend::new(), SnapshotPaths::new(DIR))
    }

    #[test]
    fn test_write_creates_dir_on_demand() {
        let store = make_store();
        assert!(!store.dir_exists());

        let path = Path::new(DIR).join("a.tmp");
        store.write(&path, "hello").unwrap();

        assert!(store.dir_exists());
        assert_eq!(store.read(&path).unwrap(), "hello");
    }

    #[test]
    fn test_overwrite_in_place() {
        let store = make_store();
        let path = Path::new(DIR).join("a.tmp");
        store.write(&path, "one").unwrap();
        store.write(&path, "two").unwrap();

        assert_eq!(store.list().unwrap(), vec![path.clone()]);
        assert_eq!(store.read(&path).unwrap(), "two");
    }

    #[test]
    fn test_delete_is_idempotent() {
        let store = make_store();
        let path = Path::new(DIR).join("a.tmp");
        store.write(&path, "x").unwrap();

        store.delete(&path);
        store.delete(&path);
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_list_ignores_foreign_files() {
        let store = make_store();
        store.write(&Path::new(DIR).join("a.tmp"), "x").unwrap();
        store.write(&Path::new(DIR).join("notes.txt"), "y").unwrap();

        let listed = store.list().unwrap();
        assert_eq!(listed, vec![Path::new(DIR).join("a.tmp")]);
    }

    #[test]
    fn test_write_failure_is_returned() {
        let store = make_store();
        store.backend.set_simulate_write_error(true);
        assert!(store.write(&Path::new(DIR).join("a.tmp"), "x").is_err());
    }
}
