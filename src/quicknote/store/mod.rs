//! # Storage Layer
//!
//! Quicknote touches the disk for two different reasons:
//!
//! 1. **Snapshots**: best-effort copies of unsaved documents, written by the auto-save
//!    sweep into the snapshot directory and read back by recovery.
//! 2. **Real saves**: the user's own files, written when they save and read when they
//!    open.
//!
//! Both go through the [`backend::StorageBackend`] trait, which handles the "how"
//! (filesystem vs memory). [`snapshot_store::SnapshotStore`] adds the snapshot-directory
//! semantics on top: directory created on demand, suffix filtering, idempotent delete,
//! and logging of failures that the user never sees.
//!
//! ## Implementations
//!
//! - [`fs_backend::FsBackend`]: production. Every write goes to a hidden `.partial`
//!   sibling and is renamed over the target, so a crash mid-write leaves the previous
//!   content intact.
//! - [`mem_backend::MemBackend`]: for testing logic without filesystem I/O. Can simulate
//!   write failures globally or per path, and read failures per path.

pub mod backend;
pub mod fs_backend;
pub mod mem_backend;
pub mod snapshot_store;

pub use backend::{FileStat, StorageBackend};
pub use fs_backend::FsBackend;
pub use mem_backend::MemBackend;
pub use snapshot_store::SnapshotStore;
