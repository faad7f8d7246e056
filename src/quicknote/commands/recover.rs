//! Startup recovery of snapshots left behind by a previous session.
//!
//! Recovery never deletes anything. Restored tabs adopt the snapshot they came from as
//! their own snapshot path, so the next sweep overwrites it in place and a successful
//! real save removes it through the normal cleanup. Declining the prompt leaves every
//! file where it is, to be offered again next launch. A snapshot directory that cannot
//! be listed is reported and skipped; startup carries on with no restored tabs.

use crate::commands::CmdMessage;
use crate::error::Result;
use crate::model::{ContentKind, Document, DocumentId, Origin};
use crate::registry::DocumentRegistry;
use crate::store::{SnapshotStore, StorageBackend};
use crate::view::{Choice, DocumentView, Prompt, Prompter};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Default)]
pub struct RecoveryReport {
    /// Snapshot files found on disk.
    pub found: usize,
    pub declined: bool,
    pub restored: Vec<DocumentId>,
    /// Files that could not be read.
    pub skipped: Vec<PathBuf>,
    pub messages: Vec<CmdMessage>,
}

pub fn run<B, V, P>(
    registry: &mut DocumentRegistry,
    store: &SnapshotStore<B>,
    view: &mut V,
    prompter: &mut P,
) -> Result<RecoveryReport>
where
    B: StorageBackend,
    V: DocumentView + ?Sized,
    P: Prompter + ?Sized,
{
    let mut report = RecoveryReport::default();

    if !store.dir_exists() {
        return Ok(report);
    }

    let mut files = match store.list() {
        Ok(files) => files,
        Err(e) => {
            warn!(error = %e, "could not list snapshots, skipping recovery");
            report.messages.push(CmdMessage::warning(format!(
                "Could not look for auto-saved files: {}",
                e
            )));
            return Ok(report);
        }
    };
    if files.is_empty() {
        return Ok(report);
    }
    files.sort();
    report.found = files.len();

    if prompter.confirm(Prompt::RestoreSnapshots { count: files.len() }) != Choice::Yes {
        info!(count = files.len(), "snapshot restore declined");
        report.declined = true;
        return Ok(report);
    }

    for path in files {
        let Ok(content) = store.read(&path) else {
            report.messages.push(CmdMessage::warning(format!(
                "Could not restore {}",
                path.display()
            )));
            report.skipped.push(path);
            continue;
        };

        let snapshot_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let kind = ContentKind::classify(&content);
        let identity = store.paths().fresh_ephemeral();

        let id = registry.add(Document::new(
            identity,
            kind,
            path.clone(),
            Origin::Restored {
                snapshot_name: snapshot_name.clone(),
            },
        ));
        view.load(id, &content, kind);
        registry.mark_dirty(id, true)?;

        info!(snapshot = %snapshot_name, %kind, "restored snapshot");
        report.restored.push(id);
    }

    report.messages.push(CmdMessage::success(format!(
        "Restored {} of {} auto-saved file(s)",
        report.restored.len(),
        report.found
    )));
    Ok(report)
}
