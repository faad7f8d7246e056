//! Find and replace.
//!
//! The text functions work on byte offsets into a `&str`. The document wrappers read the
//! document's content in its own kind (plain text or markup), edit it, push it back through
//! [`DocumentView::load`] and mark the document dirty.

use crate::error::{QuicknoteError, Result};
use crate::model::DocumentId;
use crate::registry::DocumentRegistry;
use crate::view::{serialize, DocumentView};
use std::ops::Range;
use tracing::debug;

fn floor_boundary(text: &str, mut at: usize) -> usize {
    at = at.min(text.len());
    while !text.is_char_boundary(at) {
        at -= 1;
    }
    at
}

/// First match at or after `from`, wrapping once to the start of the text.
pub fn find(text: &str, needle: &str, from: usize) -> Option<Range<usize>> {
    if needle.is_empty() {
        return None;
    }
    let from = floor_boundary(text, from);
    text[from..]
        .find(needle)
        .map(|i| from + i)
        .or_else(|| text.find(needle))
        .map(|start| start..start + needle.len())
}

/// Replace the next match. Returns the new text and the range of the inserted replacement.
pub fn replace_next(
    text: &str,
    needle: &str,
    with: &str,
    from: usize,
) -> Option<(String, Range<usize>)> {
    let found = find(text, needle, from)?;
    let mut out = String::with_capacity(text.len() + with.len());
    out.push_str(&text[..found.start]);
    out.push_str(with);
    out.push_str(&text[found.end..]);
    Some((out, found.start..found.start + with.len()))
}

/// Replace every non-overlapping match, returning the new text and the count.
pub fn replace_all(text: &str, needle: &str, with: &str) -> (String, usize) {
    if needle.is_empty() {
        return (text.to_string(), 0);
    }
    let count = text.matches(needle).count();
    (text.replace(needle, with), count)
}

fn content<V: DocumentView + ?Sized>(
    registry: &DocumentRegistry,
    view: &V,
    id: DocumentId,
) -> Result<String> {
    let kind = registry.get(id)?.kind;
    serialize(view, id, kind).ok_or(QuicknoteError::DocumentNotFound(id))
}

pub fn find_in_document<V: DocumentView + ?Sized>(
    registry: &DocumentRegistry,
    view: &V,
    id: DocumentId,
    needle: &str,
    from: usize,
) -> Result<Option<Range<usize>>> {
    let text = content(registry, view, id)?;
    Ok(find(&text, needle, from))
}

/// Replace the next match in a document. `None` when nothing matched; the document is then
/// left untouched and clean documents stay clean.
pub fn replace_next_in_document<V: DocumentView + ?Sized>(
    registry: &mut DocumentRegistry,
    view: &mut V,
    id: DocumentId,
    needle: &str,
    with: &str,
    from: usize,
) -> Result<Option<Range<usize>>> {
    let text = content(registry, view, id)?;
    let Some((updated, range)) = replace_next(&text, needle, with, from) else {
        return Ok(None);
    };
    let kind = registry.get(id)?.kind;
    view.load(id, &updated, kind);
    registry.mark_dirty(id, true)?;
    debug!(document = %id, at = range.start, "replaced match");
    Ok(Some(range))
}

pub fn replace_all_in_document<V: DocumentView + ?Sized>(
    registry: &mut DocumentRegistry,
    view: &mut V,
    id: DocumentId,
    needle: &str,
    with: &str,
) -> Result<usize> {
    let text = content(registry, view, id)?;
    let (updated, count) = replace_all(&text, needle, with);
    if count > 0 {
        let kind = registry.get(id)?.kind;
        view.load(id, &updated, kind);
        registry.mark_dirty(id, true)?;
        debug!(document = %id, count, "replaced all matches");
    }
    Ok(count)
}
