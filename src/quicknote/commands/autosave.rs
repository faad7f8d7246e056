use crate::commands::CmdMessage;
use crate::error::Result;
use crate::model::DocumentId;
use crate::registry::DocumentRegistry;
use crate::store::{SnapshotStore, StorageBackend};
use crate::view::{serialize, DocumentView};
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
pub struct SweepReport {
    pub saved: Vec<DocumentId>,
    pub failed: Vec<DocumentId>,
    pub messages: Vec<CmdMessage>,
}

/// Snapshot every dirty document, in tab order.
///
/// Each document is attempted independently: one failed write is logged and recorded,
/// and the sweep moves on to the next document.
pub fn run<B: StorageBackend, V: DocumentView + ?Sized>(
    registry: &DocumentRegistry,
    store: &SnapshotStore<B>,
    view: &V,
) -> SweepReport {
    let mut report = SweepReport::default();

    for doc in registry.iter().filter(|d| d.dirty) {
        let Some(payload) = serialize(view, doc.id, doc.kind) else {
            warn!(document = %doc.id, "no content available, skipping snapshot");
            report.failed.push(doc.id);
            continue;
        };

        match store.write(&doc.snapshot, &payload) {
            Ok(()) => {
                report.saved.push(doc.id);
                report
                    .messages
                    .push(CmdMessage::info(format!("Auto-saved: {}", doc.display_name())));
            }
            Err(_) => report.failed.push(doc.id),
        }
    }

    debug!(
        saved = report.saved.len(),
        failed = report.failed.len(),
        "auto-save sweep finished"
    );
    report
}

/// Give `owner` sole use of its snapshot file.
///
/// A restored tab can hold the file a durable document resolves to. Such a tab moves to
/// the file its own identity resolves to; a dirty one has its content written there
/// first and stays put if that write fails.
pub(crate) fn claim_snapshot<B: StorageBackend, V: DocumentView + ?Sized>(
    registry: &mut DocumentRegistry,
    store: &SnapshotStore<B>,
    view: &V,
    owner: DocumentId,
) -> Result<()> {
    let claimed = registry.get(owner)?.snapshot.clone();
    let sharing: Vec<DocumentId> = registry
        .iter()
        .filter(|d| d.id != owner && d.snapshot == claimed)
        .map(|d| d.id)
        .collect();

    for id in sharing {
        let doc = registry.get(id)?;
        let own = store.paths().resolve(&doc.identity);
        if own == claimed {
            continue;
        }
        if doc.dirty {
            let Some(payload) = serialize(view, id, doc.kind) else {
                continue;
            };
            if store.write(&own, &payload).is_err() {
                continue;
            }
        }
        info!(document = %id, snapshot = %own.display(), "snapshot moved off a claimed file");
        registry.get_mut(id)?.snapshot = own;
    }
    Ok(())
}
