//! Closing tabs and the application.
//!
//! Every dirty document goes through `Requested -> {Saving, Discarding, Cancelled} -> Closed`.
//! A Cancel anywhere aborts the whole request. Documents resolved before the Cancel keep
//! whatever happened to them (a completed save is not rolled back), but nothing is removed.

use crate::commands::{open, save, CmdMessage};
use crate::error::Result;
use crate::model::DocumentId;
use crate::registry::DocumentRegistry;
use crate::store::{SnapshotStore, StorageBackend};
use crate::view::{Choice, DocumentView, Prompt, Prompter};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseState {
    Requested,
    Saving,
    Discarding,
    Cancelled,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    Closed,
    Cancelled,
}

#[derive(Debug)]
pub struct CloseReport {
    pub outcome: CloseOutcome,
    pub closed: Vec<DocumentId>,
    /// The untitled tab opened because the last tab went away.
    pub replacement: Option<DocumentId>,
    pub messages: Vec<CmdMessage>,
}

impl CloseReport {
    fn new(outcome: CloseOutcome) -> Self {
        Self {
            outcome,
            closed: Vec::new(),
            replacement: None,
            messages: Vec::new(),
        }
    }
}

/// Drive one document from `Requested` to `Closed` or `Cancelled`. Nothing is removed here.
fn resolve<B, V, P>(
    registry: &mut DocumentRegistry,
    store: &SnapshotStore<B>,
    view: &mut V,
    prompter: &mut P,
    id: DocumentId,
    messages: &mut Vec<CmdMessage>,
) -> Result<CloseState>
where
    B: StorageBackend,
    V: DocumentView + ?Sized,
    P: Prompter + ?Sized,
{
    let doc = registry.get(id)?;
    let mut state = CloseState::Requested;
    debug!(document = %id, ?state, dirty = doc.dirty, "close requested");
    if !doc.dirty {
        return Ok(CloseState::Closed);
    }

    let name = doc.display_name();
    state = match prompter.confirm(Prompt::UnsavedChanges { name: &name }) {
        Choice::Save => CloseState::Saving,
        Choice::Discard => CloseState::Discarding,
        _ => CloseState::Cancelled,
    };
    debug!(document = %id, ?state, "close prompt answered");

    state = match state {
        CloseState::Saving => {
            let report = save::save(registry, store, view, prompter, id)?;
            messages.extend(report.messages.iter().cloned());
            if report.is_saved() {
                CloseState::Closed
            } else {
                CloseState::Cancelled
            }
        }
        CloseState::Discarding => CloseState::Closed,
        other => other,
    };
    Ok(state)
}

fn remove<V: DocumentView + ?Sized>(
    registry: &mut DocumentRegistry,
    view: &mut V,
    id: DocumentId,
) -> Result<()> {
    let doc = registry.remove(id)?;
    view.forget(id);
    info!(document = %doc.display_name(), "tab closed");
    Ok(())
}

/// Close one tab. Closing the last tab leaves a fresh untitled tab behind.
pub fn close_tab<B, V, P>(
    registry: &mut DocumentRegistry,
    store: &SnapshotStore<B>,
    view: &mut V,
    prompter: &mut P,
    id: DocumentId,
) -> Result<CloseReport>
where
    B: StorageBackend,
    V: DocumentView + ?Sized,
    P: Prompter + ?Sized,
{
    let mut messages = Vec::new();
    if resolve(registry, store, view, prompter, id, &mut messages)? == CloseState::Cancelled {
        let mut report = CloseReport::new(CloseOutcome::Cancelled);
        report.messages = messages;
        return Ok(report);
    }

    remove(registry, view, id)?;

    let mut report = CloseReport::new(CloseOutcome::Closed);
    report.closed.push(id);
    if registry.is_empty() {
        report.replacement = Some(open::new_document(registry, store, view));
    }
    report.messages = messages;
    Ok(report)
}

/// Close every tab, as on application exit.
///
/// All dirty documents are resolved in tab order before anything is removed; the first
/// Cancel stops the prompts and leaves every tab open.
pub fn close_all<B, V, P>(
    registry: &mut DocumentRegistry,
    store: &SnapshotStore<B>,
    view: &mut V,
    prompter: &mut P,
) -> Result<CloseReport>
where
    B: StorageBackend,
    V: DocumentView + ?Sized,
    P: Prompter + ?Sized,
{
    let mut messages = Vec::new();
    let ids = registry.ids();

    for &id in &ids {
        if resolve(registry, store, view, prompter, id, &mut messages)? == CloseState::Cancelled {
            info!("exit cancelled");
            let mut report = CloseReport::new(CloseOutcome::Cancelled);
            report.messages = messages;
            return Ok(report);
        }
    }

    for &id in &ids {
        remove(registry, view, id)?;
    }

    let mut report = CloseReport::new(CloseOutcome::Closed);
    report.closed = ids;
    report.messages = messages;
    Ok(report)
}
