//! # API Facade
//!
//! A thin facade over the command layer and the single entry point for every UI. It owns
//! the long-lived core state (the document registry, the snapshot store and the auto-save
//! scheduler); the UI keeps the document content and answers prompts, and passes both in
//! on each call.
//!
//! The facade does no business logic, no terminal I/O and no formatting. Tab numbers
//! (1-based, as the user sees them) are translated to [`DocumentId`]s here.
//!
//! `QuicknoteApi<B: StorageBackend>` is generic over the backend:
//! - Production: `QuicknoteApi<FsBackend>`
//! - Testing: `QuicknoteApi<MemBackend>`

use crate::commands::autosave::SweepReport;
use crate::commands::close::CloseReport;
use crate::commands::recover::RecoveryReport;
use crate::commands::save::SaveReport;
use crate::commands::snapshots::SnapshotEntry;
use crate::commands::{close, format, open, recover, save, search, snapshots};
use crate::config::AutoSaveSettings;
use crate::error::Result;
use crate::model::{ContentKind, Document, DocumentId};
use crate::paths::SnapshotPaths;
use crate::registry::DocumentRegistry;
use crate::scheduler::{AutoSaveScheduler, TickOutcome};
use crate::store::{SnapshotStore, StorageBackend};
use crate::view::{DocumentView, Prompter};
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub use crate::commands::{CmdMessage, MessageLevel};

pub struct QuicknoteApi<B: StorageBackend> {
    registry: DocumentRegistry,
    store: SnapshotStore<B>,
    scheduler: AutoSaveScheduler,
}

impl<B: StorageBackend> QuicknoteApi<B> {
    pub fn new(backend: B, settings: &AutoSaveSettings, now: Instant) -> Self {
        Self {
            registry: DocumentRegistry::new(),
            store: SnapshotStore::new(backend, SnapshotPaths::new(settings.snapshot_dir.clone())),
            scheduler: AutoSaveScheduler::from_settings(settings, now),
        }
    }

    pub fn registry(&self) -> &DocumentRegistry {
        &self.registry
    }

    pub fn store(&self) -> &SnapshotStore<B> {
        &self.store
    }

    pub fn scheduler(&self) -> &AutoSaveScheduler {
        &self.scheduler
    }

    pub fn tab(&self, number: usize) -> Result<DocumentId> {
        self.registry.by_number(number)
    }

    pub fn document(&self, id: DocumentId) -> Result<&Document> {
        self.registry.get(id)
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.registry.iter()
    }

    pub fn recover<V, P>(&mut self, view: &mut V, prompter: &mut P) -> Result<RecoveryReport>
    where
        V: DocumentView + ?Sized,
        P: Prompter + ?Sized,
    {
        recover::run(&mut self.registry, &self.store, view, prompter)
    }

    pub fn new_document<V: DocumentView + ?Sized>(&mut self, view: &mut V) -> DocumentId {
        open::new_document(&mut self.registry, &self.store, view)
    }

    pub fn open_document<V: DocumentView + ?Sized>(
        &mut self,
        view: &mut V,
        path: &Path,
    ) -> Result<DocumentId> {
        open::open_document(&mut self.registry, &self.store, view, path)
    }

    /// The view reports that a document's content changed.
    pub fn content_changed(&mut self, id: DocumentId) -> Result<()> {
        self.registry.mark_dirty(id, true)
    }

    pub fn set_kind<V: DocumentView + ?Sized>(
        &mut self,
        view: &mut V,
        id: DocumentId,
        kind: ContentKind,
    ) -> Result<bool> {
        format::set_kind(&mut self.registry, view, id, kind)
    }

    /// Move a tab to a new 1-based position.
    pub fn move_tab(&mut self, id: DocumentId, number: usize) -> Result<()> {
        self.registry.move_tab(id, number.saturating_sub(1))
    }

    pub fn save<V, P>(&mut self, view: &mut V, prompter: &mut P, id: DocumentId) -> Result<SaveReport>
    where
        V: DocumentView + ?Sized,
        P: Prompter + ?Sized,
    {
        save::save(&mut self.registry, &self.store, view, prompter, id)
    }

    pub fn save_as<V, P>(
        &mut self,
        view: &mut V,
        prompter: &mut P,
        id: DocumentId,
    ) -> Result<SaveReport>
    where
        V: DocumentView + ?Sized,
        P: Prompter + ?Sized,
    {
        save::save_as(&mut self.registry, &self.store, view, prompter, id)
    }

    pub fn close_tab<V, P>(
        &mut self,
        view: &mut V,
        prompter: &mut P,
        id: DocumentId,
    ) -> Result<CloseReport>
    where
        V: DocumentView + ?Sized,
        P: Prompter + ?Sized,
    {
        close::close_tab(&mut self.registry, &self.store, view, prompter, id)
    }

    pub fn close_all<V, P>(&mut self, view: &mut V, prompter: &mut P) -> Result<CloseReport>
    where
        V: DocumentView + ?Sized,
        P: Prompter + ?Sized,
    {
        close::close_all(&mut self.registry, &self.store, view, prompter)
    }

    /// Poll the auto-save timer.
    pub fn tick<V: DocumentView + ?Sized>(&mut self, now: Instant, view: &V) -> TickOutcome {
        self.scheduler.tick(now, &self.registry, &self.store, view)
    }

    pub fn autosave_now<V: DocumentView + ?Sized>(
        &mut self,
        now: Instant,
        view: &V,
    ) -> Option<SweepReport> {
        self.scheduler
            .force_sweep(now, &self.registry, &self.store, view)
    }

    pub fn find<V: DocumentView + ?Sized>(
        &self,
        view: &V,
        id: DocumentId,
        needle: &str,
        from: usize,
    ) -> Result<Option<Range<usize>>> {
        search::find_in_document(&self.registry, view, id, needle, from)
    }

    pub fn replace_next<V: DocumentView + ?Sized>(
        &mut self,
        view: &mut V,
        id: DocumentId,
        needle: &str,
        with: &str,
        from: usize,
    ) -> Result<Option<Range<usize>>> {
        search::replace_next_in_document(&mut self.registry, view, id, needle, with, from)
    }

    pub fn replace_all<V: DocumentView + ?Sized>(
        &mut self,
        view: &mut V,
        id: DocumentId,
        needle: &str,
        with: &str,
    ) -> Result<usize> {
        search::replace_all_in_document(&mut self.registry, view, id, needle, with)
    }

    pub fn list_snapshots(&self) -> Result<Vec<SnapshotEntry>> {
        snapshots::list(&self.store)
    }

    pub fn purge_snapshots(&self) -> Result<usize> {
        snapshots::purge(&self.store)
    }

    pub fn snapshot_path_for(&self, file: &Path) -> Result<PathBuf> {
        snapshots::snapshot_path_for(&self.store, file)
    }
}
