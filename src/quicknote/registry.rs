//! The set of open documents, in tab order.
//!
//! Order is what the user sees and can rearrange; the core only relies on it for
//! deterministic iteration (sweeps and close-all walk documents front to back).
//! [`DocumentRegistry::mark_dirty`] is the only place a document's dirty flag changes.

use crate::error::{QuicknoteError, Result};
use crate::model::{Document, DocumentId};
use std::path::Path;
use tracing::trace;

#[derive(Debug, Default)]
pub struct DocumentRegistry {
    documents: Vec<Document>,
}

impl DocumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, document: Document) -> DocumentId {
        let id = document.id;
        self.documents.push(document);
        id
    }

    pub fn remove(&mut self, id: DocumentId) -> Result<Document> {
        let pos = self.position(id)?;
        Ok(self.documents.remove(pos))
    }

    /// Ids of every modified document, in tab order.
    pub fn all_dirty(&self) -> Vec<DocumentId> {
        self.documents
            .iter()
            .filter(|d| d.dirty)
            .map(|d| d.id)
            .collect()
    }

    pub fn mark_dirty(&mut self, id: DocumentId, dirty: bool) -> Result<()> {
        let doc = self.get_mut(id)?;
        if doc.dirty != dirty {
            trace!(document = %id, dirty, "dirty state changed");
        }
        doc.dirty = dirty;
        Ok(())
    }

    pub fn get(&self, id: DocumentId) -> Result<&Document> {
        self.documents
            .iter()
            .find(|d| d.id == id)
            .ok_or(QuicknoteError::DocumentNotFound(id))
    }

    pub fn get_mut(&mut self, id: DocumentId) -> Result<&mut Document> {
        self.documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(QuicknoteError::DocumentNotFound(id))
    }

    /// Zero-based tab position.
    pub fn position(&self, id: DocumentId) -> Result<usize> {
        self.documents
            .iter()
            .position(|d| d.id == id)
            .ok_or(QuicknoteError::DocumentNotFound(id))
    }

    /// Document at a one-based tab number, as shown to the user.
    pub fn by_number(&self, number: usize) -> Result<DocumentId> {
        number
            .checked_sub(1)
            .and_then(|i| self.documents.get(i))
            .map(|d| d.id)
            .ok_or_else(|| QuicknoteError::Api(format!("No tab number {}", number)))
    }

    /// Move a tab to a new zero-based position (clamped to the end).
    pub fn move_tab(&mut self, id: DocumentId, to: usize) -> Result<()> {
        let from = self.position(id)?;
        let doc = self.documents.remove(from);
        let to = to.min(self.documents.len());
        self.documents.insert(to, doc);
        Ok(())
    }

    /// Whether any document other than `except` is assigned `snapshot`.
    pub fn snapshot_in_use(&self, snapshot: &Path, except: DocumentId) -> bool {
        self.documents
            .iter()
            .any(|d| d.id != except && d.snapshot == snapshot)
    }

    /// The document bound to a real file, if one is open.
    pub fn find_by_path(&self, path: &Path) -> Option<&Document> {
        self.documents
            .iter()
            .find(|d| d.identity.path() == Some(path))
    }

    /// Whether the window as a whole has unsaved changes.
    pub fn any_dirty(&self) -> bool {
        self.documents.iter().any(|d| d.dirty)
    }

    pub fn ids(&self) -> Vec<DocumentId> {
        self.documents.iter().map(|d| d.id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
