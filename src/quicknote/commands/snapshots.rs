use crate::error::Result;
use crate::model::{ContentKind, Identity};
use crate::paths::absolutize;
use crate::store::{SnapshotStore, StorageBackend};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone)]
pub struct SnapshotEntry {
    pub path: PathBuf,
    pub name: String,
    pub kind: ContentKind,
    pub bytes: u64,
    pub modified: Option<DateTime<Utc>>,
}

/// Every snapshot file, sorted by name. Unreadable files are left out.
pub fn list<B: StorageBackend>(store: &SnapshotStore<B>) -> Result<Vec<SnapshotEntry>> {
    let mut files = store.list()?;
    files.sort();

    let mut entries = Vec::with_capacity(files.len());
    for path in files {
        let Ok(payload) = store.read(&path) else {
            continue;
        };
        let stat = store.stat(&path)?;
        entries.push(SnapshotEntry {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            kind: ContentKind::classify(&payload),
            bytes: stat
                .as_ref()
                .map_or(payload.len() as u64, |s| s.bytes),
            modified: stat.map(|s| s.modified),
            path,
        });
    }
    Ok(entries)
}

/// Delete every snapshot file. Returns how many were removed.
pub fn purge<B: StorageBackend>(store: &SnapshotStore<B>) -> Result<usize> {
    let files = store.list()?;
    for path in &files {
        store.delete(path);
    }
    let remaining = store.list()?.len();
    let removed = files.len().saturating_sub(remaining);
    info!(removed, remaining, "snapshots purged");
    Ok(removed)
}

/// Where the snapshot of `file` lives (whether or not it exists).
pub fn snapshot_path_for<B: StorageBackend>(
    store: &SnapshotStore<B>,
    file: &Path,
) -> Result<PathBuf> {
    let abs = absolutize(file)?;
    Ok(store.paths().resolve(&Identity::Durable(abs)))
}
