//! The real save path.
//!
//! A save writes the document to its own file (atomically, through the backend), clears
//! the dirty flag and removes any snapshot that belonged to the document and that no
//! other tab still writes to. Only one tab may be bound to a given file. Nothing is
//! changed on the document until the write has succeeded, so a failed save leaves both
//! the document and its snapshot exactly as they were.

use crate::commands::{autosave, CmdMessage, MessageLevel};
use crate::error::{QuicknoteError, Result};
use crate::model::{is_markup_path, ContentKind, DocumentId, Identity};
use crate::paths::absolutize;
use crate::registry::DocumentRegistry;
use crate::store::{SnapshotStore, StorageBackend};
use crate::view::{Choice, DocumentView, Prompt, Prompter};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const FORMATTING_LOSS_WARNING: &str = "You are saving to a plain-text format; rich formatting will be discarded. \
     To preserve formatting, save as .html or .htm.";

pub const DOCX_NOTICE: &str =
    "Saving as .docx is not supported. The file will be saved as plain text with a .docx extension.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(PathBuf),
    /// The user dismissed a destination or overwrite prompt.
    Cancelled,
    /// The write failed; the user has already been told.
    Failed,
}

#[derive(Debug)]
pub struct SaveReport {
    pub outcome: SaveOutcome,
    pub messages: Vec<CmdMessage>,
}

impl SaveReport {
    fn new(outcome: SaveOutcome) -> Self {
        Self {
            outcome,
            messages: Vec::new(),
        }
    }

    pub fn is_saved(&self) -> bool {
        matches!(self.outcome, SaveOutcome::Saved(_))
    }
}

/// Save to the document's own file, asking for one if it is untitled.
pub fn save<B, V, P>(
    registry: &mut DocumentRegistry,
    store: &SnapshotStore<B>,
    view: &mut V,
    prompter: &mut P,
    id: DocumentId,
) -> Result<SaveReport>
where
    B: StorageBackend,
    V: DocumentView + ?Sized,
    P: Prompter + ?Sized,
{
    let doc = registry.get(id)?;
    let kind = doc.kind;
    match doc.identity.clone() {
        Identity::Durable(path) => write_document(registry, store, view, prompter, id, &path, kind),
        Identity::Ephemeral { .. } => save_as(registry, store, view, prompter, id),
    }
}

/// Ask for a destination, confirm overwrites, then save there.
///
/// A rich document saved under a non-HTML name is converted to plain text, after the
/// user has been warned.
pub fn save_as<B, V, P>(
    registry: &mut DocumentRegistry,
    store: &SnapshotStore<B>,
    view: &mut V,
    prompter: &mut P,
    id: DocumentId,
) -> Result<SaveReport>
where
    B: StorageBackend,
    V: DocumentView + ?Sized,
    P: Prompter + ?Sized,
{
    let doc = registry.get(id)?;
    let mut kind = doc.kind;

    let Some(dest) = prompter.choose_destination(&doc.display_name()) else {
        return Ok(SaveReport::new(SaveOutcome::Cancelled));
    };
    let dest = absolutize(&dest)?;

    if let Some(other) = registry.find_by_path(&dest).filter(|d| d.id != id) {
        prompter.notify(
            MessageLevel::Error,
            &format!(
                "'{}' is already open in another tab. Close it first or choose another name.",
                other.display_name()
            ),
        );
        return Ok(SaveReport::new(SaveOutcome::Cancelled));
    }

    if store.backend().exists(&dest)
        && prompter.confirm(Prompt::Overwrite { path: &dest }) != Choice::Yes
    {
        return Ok(SaveReport::new(SaveOutcome::Cancelled));
    }

    if kind.is_rich() && !is_markup_path(&dest) {
        prompter.notify(MessageLevel::Warning, FORMATTING_LOSS_WARNING);
        kind = ContentKind::PlainText;
    } else if has_extension(&dest, "docx") {
        prompter.notify(MessageLevel::Warning, DOCX_NOTICE);
    }

    write_document(registry, store, view, prompter, id, &dest, kind)
}

fn write_document<B, V, P>(
    registry: &mut DocumentRegistry,
    store: &SnapshotStore<B>,
    view: &mut V,
    prompter: &mut P,
    id: DocumentId,
    dest: &Path,
    kind: ContentKind,
) -> Result<SaveReport>
where
    B: StorageBackend,
    V: DocumentView + ?Sized,
    P: Prompter + ?Sized,
{
    let previous_kind = registry.get(id)?.kind;
    let payload = if kind.is_rich() || is_markup_path(dest) {
        view.markup(id)
    } else {
        view.plain_text(id)
    }
    .ok_or(QuicknoteError::DocumentNotFound(id))?;

    if let Err(e) = store.backend().write(dest, &payload) {
        warn!(path = %dest.display(), error = %e, "save failed");
        prompter.notify(
            MessageLevel::Error,
            &format!("Could not save '{}': {}", dest.display(), e),
        );
        return Ok(SaveReport::new(SaveOutcome::Failed));
    }

    let identity = Identity::Durable(dest.to_path_buf());
    let fresh_snapshot = store.paths().resolve(&identity);

    let doc = registry.get_mut(id)?;
    let old_snapshot = std::mem::replace(&mut doc.snapshot, fresh_snapshot.clone());
    doc.identity = identity;
    doc.kind = kind;
    let name = doc.display_name();
    registry.mark_dirty(id, false)?;
    if kind != previous_kind {
        view.load(id, &payload, kind);
    }

    autosave::claim_snapshot(registry, store, &*view, id)?;

    // A snapshot another tab still writes to is that tab's only crash copy.
    for snapshot in [&old_snapshot, &fresh_snapshot] {
        if !registry.snapshot_in_use(snapshot, id) {
            store.delete(snapshot);
        }
    }
    info!(path = %dest.display(), "saved");

    let mut report = SaveReport::new(SaveOutcome::Saved(dest.to_path_buf()));
    report
        .messages
        .push(CmdMessage::success(format!("Saved {}", name)));
    Ok(report)
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::Fixture;
    use crate::commands::{autosave, open, recover};
    use crate::view::{BufferView, ScriptedPrompter};

    fn dirty_untitled(fx: &mut Fixture, text: &str) -> DocumentId {
        let id = open::new_document(&mut fx.registry, &fx.store, &mut fx.view);
        fx.view.set_text(id, text);
        fx.registry.mark_dirty(id, true).unwrap();
        id
    }

    #[test]
    fn test_save_as_writes_and_cleans_snapshot() {
        let mut fx = Fixture::new();
        let id = dirty_untitled(&mut fx, "typed");
        autosave::run(&fx.registry, &fx.store, &fx.view);
        assert_eq!(fx.snapshots().len(), 1);

        let mut prompter = ScriptedPrompter::new().destination("/tmp/a.txt");
        let report = save(&mut fx.registry, &fx.store, &mut fx.view, &mut prompter, id).unwrap();

        assert_eq!(report.outcome, SaveOutcome::Saved(PathBuf::from("/tmp/a.txt")));
        assert!(fx.snapshots().is_empty());
        assert_eq!(
            fx.store.backend().read(Path::new("/tmp/a.txt")).unwrap(),
            "typed"
        );
        let doc = fx.registry.get(id).unwrap();
        assert!(!doc.dirty);
        assert_eq!(doc.tab_label(), "a.txt");
    }

    #[test]
    fn test_failed_save_keeps_snapshot_and_dirty_flag() {
        let mut fx = Fixture::new();
        let id = dirty_untitled(&mut fx, "typed");
        autosave::run(&fx.registry, &fx.store, &fx.view);
        fx.store.backend().fail_writes_to("/tmp/a.txt");

        let mut prompter = ScriptedPrompter::new().destination("/tmp/a.txt");
        let report = save(&mut fx.registry, &fx.store, &mut fx.view, &mut prompter, id).unwrap();

        assert_eq!(report.outcome, SaveOutcome::Failed);
        assert_eq!(fx.snapshots().len(), 1);
        let doc = fx.registry.get(id).unwrap();
        assert!(doc.dirty);
        assert!(!doc.identity.is_durable());
        assert_eq!(prompter.notices[0].0, MessageLevel::Error);
    }

    #[test]
    fn test_dismissed_destination_is_cancel() {
        let mut fx = Fixture::new();
        let id = dirty_untitled(&mut fx, "typed");

        let mut prompter = ScriptedPrompter::new();
        let report = save(&mut fx.registry, &fx.store, &mut fx.view, &mut prompter, id).unwrap();
        assert_eq!(report.outcome, SaveOutcome::Cancelled);
        assert!(fx.registry.get(id).unwrap().dirty);
    }

    #[test]
    fn test_overwrite_declined_is_cancel() {
        let mut fx = Fixture::new();
        fx.store
            .backend()
            .write(Path::new("/tmp/taken.txt"), "old")
            .unwrap();
        let id = dirty_untitled(&mut fx, "new");

        let mut prompter = ScriptedPrompter::new()
            .destination("/tmp/taken.txt")
            .answer(Choice::No);
        let report = save(&mut fx.registry, &fx.store, &mut fx.view, &mut prompter, id).unwrap();

        assert_eq!(report.outcome, SaveOutcome::Cancelled);
        assert_eq!(
            fx.store.backend().read(Path::new("/tmp/taken.txt")).unwrap(),
            "old"
        );
    }

    #[test]
    fn test_save_durable_document_removes_hashed_snapshot() {
        let mut fx = Fixture::new();
        fx.store
            .backend()
            .write(Path::new("/tmp/a.txt"), "hello")
            .unwrap();
        let id =
            open::open_document(&mut fx.registry, &fx.store, &mut fx.view, Path::new("/tmp/a.txt"))
                .unwrap();
        fx.view.set_text(id, "hello world");
        fx.registry.mark_dirty(id, true).unwrap();
        autosave::run(&fx.registry, &fx.store, &fx.view);
        assert_eq!(fx.snapshots().len(), 1);

        let mut prompter = ScriptedPrompter::new();
        let report = save(&mut fx.registry, &fx.store, &mut fx.view, &mut prompter, id).unwrap();

        assert!(report.is_saved());
        assert!(fx.snapshots().is_empty());
        assert!(prompter.asked.is_empty());
    }

    #[test]
    fn test_rich_to_plain_destination_warns_and_drops_formatting() {
        let mut fx = Fixture::new();
        let id = open::new_document(&mut fx.registry, &fx.store, &mut fx.view);
        fx.view
            .load(id, "<html><body><b>hi</b></body></html>", ContentKind::RichText);
        fx.registry.get_mut(id).unwrap().kind = ContentKind::RichText;
        fx.registry.mark_dirty(id, true).unwrap();

        let mut prompter = ScriptedPrompter::new().destination("/tmp/out.txt");
        save_as(&mut fx.registry, &fx.store, &mut fx.view, &mut prompter, id).unwrap();

        assert_eq!(prompter.notices[0].0, MessageLevel::Warning);
        assert_eq!(
            fx.store.backend().read(Path::new("/tmp/out.txt")).unwrap(),
            "hi"
        );
        assert_eq!(fx.registry.get(id).unwrap().kind, ContentKind::PlainText);
        assert_eq!(fx.view.text(id), Some("hi"));
    }

    #[test]
    fn test_plain_document_saved_as_html_uses_markup() {
        let mut fx = Fixture::new();
        let id = dirty_untitled(&mut fx, "a < b");
        let mut prompter = ScriptedPrompter::new().destination("/tmp/page.htm");
        save_as(&mut fx.registry, &fx.store, &mut fx.view, &mut prompter, id).unwrap();

        let written = fx.store.backend().read(Path::new("/tmp/page.htm")).unwrap();
        assert!(written.starts_with("<html>"));
        assert!(written.contains("a &lt; b"));
        assert!(prompter.notices.is_empty());
    }

    #[test]
    fn test_save_as_onto_a_path_open_in_another_tab_is_refused() {
        let mut fx = Fixture::new();
        fx.store
            .backend()
            .write(Path::new("/tmp/a.txt"), "on disk")
            .unwrap();
        let opened =
            open::open_document(&mut fx.registry, &fx.store, &mut fx.view, Path::new("/tmp/a.txt"))
                .unwrap();
        fx.registry.mark_dirty(opened, true).unwrap();
        let untitled = dirty_untitled(&mut fx, "other text");

        let mut prompter = ScriptedPrompter::new()
            .destination("/tmp/a.txt")
            .answer(Choice::Yes);
        let report =
            save_as(&mut fx.registry, &fx.store, &mut fx.view, &mut prompter, untitled).unwrap();

        assert_eq!(report.outcome, SaveOutcome::Cancelled);
        assert_eq!(prompter.notices[0].0, MessageLevel::Error);
        let bound = fx
            .registry
            .iter()
            .filter(|d| d.identity.path() == Some(Path::new("/tmp/a.txt")))
            .count();
        assert_eq!(bound, 1);
        assert!(!fx.registry.get(untitled).unwrap().identity.is_durable());
        assert_eq!(
            fx.store.backend().read(Path::new("/tmp/a.txt")).unwrap(),
            "on disk"
        );
    }

    #[test]
    fn test_save_as_own_path_is_allowed() {
        let mut fx = Fixture::new();
        fx.store
            .backend()
            .write(Path::new("/tmp/a.txt"), "old")
            .unwrap();
        let id =
            open::open_document(&mut fx.registry, &fx.store, &mut fx.view, Path::new("/tmp/a.txt"))
                .unwrap();
        fx.view.set_text(id, "new");

        let mut prompter = ScriptedPrompter::new()
            .destination("/tmp/a.txt")
            .answer(Choice::Yes);
        let report = save_as(&mut fx.registry, &fx.store, &mut fx.view, &mut prompter, id).unwrap();
        assert!(report.is_saved());
    }

    #[test]
    fn test_saving_a_file_keeps_a_restored_tabs_crash_copy() {
        let mut fx = Fixture::new();
        fx.store
            .backend()
            .write(Path::new("/tmp/a.txt"), "hello")
            .unwrap();
        let shared = fx
            .store
            .paths()
            .resolve(&Identity::Durable(PathBuf::from("/tmp/a.txt")));
        fx.store.write(&shared, "hello from last session").unwrap();

        let mut prompter = ScriptedPrompter::new().answer(Choice::Yes);
        let restored = recover::run(&mut fx.registry, &fx.store, &mut fx.view, &mut prompter)
            .unwrap()
            .restored[0];

        let opened =
            open::open_document(&mut fx.registry, &fx.store, &mut fx.view, Path::new("/tmp/a.txt"))
                .unwrap();
        fx.view.set_text(opened, "hello again");
        fx.registry.mark_dirty(opened, true).unwrap();
        let mut prompter = ScriptedPrompter::new();
        assert!(save(&mut fx.registry, &fx.store, &mut fx.view, &mut prompter, opened)
            .unwrap()
            .is_saved());

        let doc = fx.registry.get(restored).unwrap();
        assert!(doc.dirty);
        assert_eq!(
            fx.store.read(&doc.snapshot).unwrap(),
            "hello from last session"
        );
    }

    #[test]
    fn test_save_leaves_snapshot_another_tab_still_uses() {
        let mut fx = Fixture::new();
        let saving = dirty_untitled(&mut fx, "mine");
        let other = dirty_untitled(&mut fx, "theirs");
        let shared = fx.registry.get(saving).unwrap().snapshot.clone();
        fx.registry.get_mut(other).unwrap().snapshot = shared.clone();
        autosave::run(&fx.registry, &fx.store, &fx.view);

        let mut prompter = ScriptedPrompter::new().destination("/tmp/mine.txt");
        assert!(save(&mut fx.registry, &fx.store, &mut fx.view, &mut prompter, saving)
            .unwrap()
            .is_saved());

        assert_eq!(fx.registry.get(other).unwrap().snapshot, shared);
        assert!(fx.store.read(&shared).is_ok());
    }

    #[test]
    fn test_docx_destination_gets_notice_and_plain_text() {
        let mut fx = Fixture::new();
        let id = dirty_untitled(&mut fx, "a < b");
        let mut prompter = ScriptedPrompter::new().destination("/tmp/report.docx");
        let report = save_as(&mut fx.registry, &fx.store, &mut fx.view, &mut prompter, id).unwrap();

        assert!(report.is_saved());
        assert_eq!(
            prompter.notices,
            vec![(MessageLevel::Warning, DOCX_NOTICE.to_string())]
        );
        assert_eq!(
            fx.store.backend().read(Path::new("/tmp/report.docx")).unwrap(),
            "a < b"
        );
    }

    #[test]
    fn test_save_missing_document_is_error() {
        let mut fx = Fixture::new();
        let mut view = BufferView::new();
        let mut prompter = ScriptedPrompter::new();
        assert!(save(
            &mut fx.registry,
            &fx.store,
            &mut view,
            &mut prompter,
            DocumentId::new()
        )
        .is_err());
    }
}
