//! # Quicknote Architecture
//!
//! Quicknote is the core of a tabbed text editor: the part that decides when unsaved
//! work must be written somewhere safe, how it comes back after a crash, and whether a
//! tab may close. It is a **UI-agnostic library** with a small console client on top.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Console client (main.rs, args.rs, session.rs, print.rs)    │
//! │  - Parses arguments, reads commands, prints, exits          │
//! │  - Implements DocumentView (BufferView) and Prompter        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Owns registry, snapshot store and scheduler              │
//! │  - Translates tab numbers into document ids                 │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs, scheduler.rs)                │
//! │  - Auto-save sweep, recovery, save, close, search           │
//! │  - Talks to the user only through the Prompter trait        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/, paths.rs)                           │
//! │  - StorageBackend trait: FsBackend, MemBackend              │
//! │  - SnapshotStore over the snapshot directory                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshots
//!
//! Every `autosave_interval_secs` the scheduler writes each modified document to one file
//! in the snapshot directory (`~/.quicknote_autosave` by default). The file name is fixed
//! per document, so repeated sweeps overwrite instead of accumulating. A successful real
//! save deletes the document's snapshot; anything else (discard, crash, failed save) leaves
//! it for the next launch, where recovery offers to reopen it.
//!
//! ## No I/O Assumptions in Core
//!
//! From `api.rs` inward, code never writes to stdout/stderr, never exits the process and
//! never blocks on a terminal. Document content lives in the UI behind [`view::DocumentView`];
//! questions go through [`view::Prompter`]. Diagnostics are emitted as `tracing` events and
//! the binary decides where they go.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade
//! - [`commands`]: One module per operation
//! - [`scheduler`]: Auto-save timing (single-flight, poll driven)
//! - [`registry`]: Open documents in tab order
//! - [`store`]: Storage abstraction and implementations
//! - [`paths`]: Snapshot file naming
//! - [`model`]: `Document`, `Identity`, `ContentKind`
//! - [`view`]: Capabilities the UI provides
//! - [`config`]: Persisted settings
//! - [`error`]: Error types

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod model;
pub mod paths;
pub mod registry;
pub mod scheduler;
pub mod store;
pub mod view;
