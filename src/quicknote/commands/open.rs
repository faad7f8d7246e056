use crate::commands::autosave;
use crate::error::Result;
use crate::model::{ContentKind, Document, DocumentId, Identity, Origin};
use crate::paths::absolutize;
use crate::registry::DocumentRegistry;
use crate::store::{SnapshotStore, StorageBackend};
use crate::view::DocumentView;
use std::path::Path;
use tracing::info;

/// Open an empty untitled tab.
///
/// The random snapshot name is fixed here, once, for the lifetime of the tab.
pub fn new_document<B: StorageBackend, V: DocumentView + ?Sized>(
    registry: &mut DocumentRegistry,
    store: &SnapshotStore<B>,
    view: &mut V,
) -> DocumentId {
    let identity = store.paths().fresh_ephemeral();
    let snapshot = store.paths().resolve(&identity);
    let doc = Document::new(identity, ContentKind::PlainText, snapshot, Origin::New);
    let id = registry.add(doc);
    view.load(id, "", ContentKind::PlainText);
    id
}

/// Open a file in a new tab, or return the tab that already shows it.
///
/// `.html`/`.htm` files load as rich text. The document starts clean.
pub fn open_document<B: StorageBackend, V: DocumentView + ?Sized>(
    registry: &mut DocumentRegistry,
    store: &SnapshotStore<B>,
    view: &mut V,
    path: &Path,
) -> Result<DocumentId> {
    let abs = absolutize(path)?;

    if let Some(existing) = registry.find_by_path(&abs) {
        return Ok(existing.id);
    }

    let content = store.backend().read(&abs)?;
    let kind = ContentKind::from_path(&abs);
    let identity = Identity::Durable(abs.clone());
    let snapshot = store.paths().resolve(&identity);

    let id = registry.add(Document::new(identity, kind, snapshot, Origin::Opened));
    view.load(id, &content, kind);
    registry.mark_dirty(id, false)?;
    autosave::claim_snapshot(registry, store, &*view, id)?;
    info!(path = %abs.display(), %kind, "opened");
    Ok(id)
}
