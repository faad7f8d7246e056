//! # Command Layer
//!
//! Each module holds the logic of one user-visible operation. Commands take the pieces
//! of state they need (registry, snapshot store, view, prompter) as plain arguments and
//! return report structs; they never print and never exit.

pub mod autosave;
pub mod close;
pub mod format;
pub mod open;
pub mod recover;
pub mod save;
pub mod search;
pub mod snapshots;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::paths::SnapshotPaths;
    use crate::registry::DocumentRegistry;
    use crate::store::{MemBackend, SnapshotStore, StorageBackend};
    use crate::view::BufferView;
    use std::path::{Path, PathBuf};

    pub const SNAP_DIR: &str = "/home/ada/.quicknote_autosave";

    pub struct Fixture {
        pub registry: DocumentRegistry,
        pub store: SnapshotStore<MemBackend>,
        pub view: BufferView,
    }

    impl Fixture {
        pub fn new() -> Self {
            let backend = MemBackend::new();
            backend.ensure_dir(Path::new("/tmp")).unwrap();
            Self {
                registry: DocumentRegistry::new(),
                store: SnapshotStore::new(backend, SnapshotPaths::new(SNAP_DIR)),
                view: BufferView::new(),
            }
        }

        pub fn snapshots(&self) -> Vec<PathBuf> {
            let mut files = self.store.list().unwrap();
            files.sort();
            files
        }
    }
}
