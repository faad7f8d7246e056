//! # External View
//!
//! The core never renders text and never shows dialogs. Whatever UI hosts it (a GUI, the
//! bundled console client, a test) implements two capabilities:
//!
//! - [`DocumentView`]: owns document content. The core reads copies of it when it needs a
//!   payload and pushes content in when a document is opened or restored.
//! - [`Prompter`]: answers modal questions synchronously. Returning
//!   [`Choice::Cancel`] (or `None` from a destination prompt) is the only way an
//!   in-progress operation gets cancelled.
//!
//! [`BufferView`] is a plain in-memory implementation of `DocumentView`, used by the
//! console client. [`ScriptedPrompter`] replays canned answers for headless runs.

use crate::commands::MessageLevel;
use crate::model::{ContentKind, DocumentId};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

pub trait DocumentView {
    /// Content as plain text.
    fn plain_text(&self, id: DocumentId) -> Option<String>;

    /// Content serialized as markup.
    fn markup(&self, id: DocumentId) -> Option<String>;

    /// Replace a document's content (open / restore).
    fn load(&mut self, id: DocumentId, content: &str, kind: ContentKind);

    /// Drop everything held for a closed document.
    fn forget(&mut self, id: DocumentId);
}

/// Serialize a document according to its kind.
pub fn serialize<V: DocumentView + ?Sized>(
    view: &V,
    id: DocumentId,
    kind: ContentKind,
) -> Option<String> {
    match kind {
        ContentKind::PlainText => view.plain_text(id),
        ContentKind::RichText => view.markup(id),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt<'a> {
    /// One question covering every snapshot found at startup.
    RestoreSnapshots { count: usize },
    /// Save / Discard / Cancel for a modified document being closed.
    UnsavedChanges { name: &'a str },
    /// Yes / No before replacing an existing file on save-as.
    Overwrite { path: &'a Path },
    /// Yes / No before deleting every snapshot.
    PurgeSnapshots { count: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Yes,
    No,
    Save,
    Discard,
    Cancel,
}

pub trait Prompter {
    fn confirm(&mut self, prompt: Prompt<'_>) -> Choice;

    /// Ask where to save; `None` means the user dismissed the prompt.
    fn choose_destination(&mut self, suggested_name: &str) -> Option<PathBuf>;

    /// Show a message the user must see now (save errors, format warnings).
    fn notify(&mut self, level: MessageLevel, message: &str);
}

#[derive(Debug, Clone)]
struct Buffer {
    text: String,
    kind: ContentKind,
}

/// In-memory document content.
///
/// Rich buffers hold markup; plain buffers hold text. Conversions between the two are
/// deliberately naive: tags are stripped one way and text is escaped into a `<pre>` block
/// the other way.
#[derive(Debug, Default)]
pub struct BufferView {
    buffers: HashMap<DocumentId, Buffer>,
}

impl BufferView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw buffer content as typed by the user.
    pub fn text(&self, id: DocumentId) -> Option<&str> {
        self.buffers.get(&id).map(|b| b.text.as_str())
    }

    /// Replace the buffer. The caller marks the document dirty.
    pub fn set_text(&mut self, id: DocumentId, text: &str) {
        let buffer = self.buffers.entry(id).or_insert_with(|| Buffer {
            text: String::new(),
            kind: ContentKind::PlainText,
        });
        buffer.text = text.to_string();
    }

    pub fn set_kind(&mut self, id: DocumentId, kind: ContentKind) {
        if let Some(buffer) = self.buffers.get_mut(&id) {
            buffer.kind = kind;
        }
    }
}

impl DocumentView for BufferView {
    fn plain_text(&self, id: DocumentId) -> Option<String> {
        self.buffers.get(&id).map(|b| match b.kind {
            ContentKind::PlainText => b.text.clone(),
            ContentKind::RichText => strip_tags(&b.text),
        })
    }

    fn markup(&self, id: DocumentId) -> Option<String> {
        self.buffers.get(&id).map(|b| match b.kind {
            ContentKind::RichText => b.text.clone(),
            ContentKind::PlainText => format!(
                "<html><body><pre>{}</pre></body></html>",
                escape_html(&b.text)
            ),
        })
    }

    fn load(&mut self, id: DocumentId, content: &str, kind: ContentKind) {
        self.buffers.insert(
            id,
            Buffer {
                text: content.to_string(),
                kind,
            },
        );
    }

    fn forget(&mut self, id: DocumentId) {
        self.buffers.remove(&id);
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

fn strip_tags(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut in_tag = false;
    for ch in markup.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Replays queued answers. An exhausted queue answers Cancel / No / `None`.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    choices: VecDeque<Choice>,
    destinations: VecDeque<PathBuf>,
    /// Every prompt asked, rendered with `{:?}`.
    pub asked: Vec<String>,
    /// Every notification shown.
    pub notices: Vec<(MessageLevel, String)>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, choice: Choice) -> Self {
        self.choices.push_back(choice);
        self
    }

    pub fn destination(mut self, path: impl Into<PathBuf>) -> Self {
        self.destinations.push_back(path.into());
        self
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&mut self, prompt: Prompt<'_>) -> Choice {
        let fallback = match prompt {
            Prompt::UnsavedChanges { .. } => Choice::Cancel,
            _ => Choice::No,
        };
        self.asked.push(format!("{:?}", prompt));
        self.choices.pop_front().unwrap_or(fallback)
    }

    fn choose_destination(&mut self, suggested_name: &str) -> Option<PathBuf> {
        self.asked.push(format!("Destination {{ suggested: {:?} }}", suggested_name));
        self.destinations.pop_front()
    }

    fn notify(&mut self, level: MessageLevel, message: &str) {
        self.notices.push((level, message.to_string()));
    }
}
