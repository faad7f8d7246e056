use crate::error::{QuicknoteError, Result};
use crate::model::{ContentKind, DocumentId};
use crate::registry::DocumentRegistry;
use crate::view::{serialize, DocumentView};
use tracing::debug;

/// Switch a document between plain and rich text.
///
/// The content is re-serialized in the new kind and pushed back into the view, and the
/// document becomes dirty. Returns false when the document already had that kind.
pub fn set_kind<V: DocumentView + ?Sized>(
    registry: &mut DocumentRegistry,
    view: &mut V,
    id: DocumentId,
    kind: ContentKind,
) -> Result<bool> {
    if registry.get(id)?.kind == kind {
        return Ok(false);
    }
    let content = serialize(view, id, kind).ok_or(QuicknoteError::DocumentNotFound(id))?;
    view.load(id, &content, kind);
    registry.get_mut(id)?.kind = kind;
    registry.mark_dirty(id, true)?;
    debug!(document = %id, %kind, "content kind changed");
    Ok(true)
}
