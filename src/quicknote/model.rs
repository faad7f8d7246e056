use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Process-unique handle for an open document (one per tab).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a document's content durably lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Identity {
    /// Backed by a real file (absolute path).
    Durable(PathBuf),
    /// Untitled; `token` is generated once when the tab is created.
    Ephemeral { token: String },
}

impl Identity {
    pub fn is_durable(&self) -> bool {
        matches!(self, Identity::Durable(_))
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Identity::Durable(path) => Some(path),
            Identity::Ephemeral { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentKind {
    PlainText,
    RichText,
}

impl ContentKind {
    /// Kind implied by a file name: `.html`/`.htm` open as rich text.
    pub fn from_path(path: &Path) -> Self {
        if is_markup_path(path) {
            ContentKind::RichText
        } else {
            ContentKind::PlainText
        }
    }

    /// Heuristic used for recovered payloads, which carry no file extension.
    pub fn classify(payload: &str) -> Self {
        let lower = payload.to_lowercase();
        if lower.contains("<html") && lower.contains("<body") {
            ContentKind::RichText
        } else {
            ContentKind::PlainText
        }
    }

    pub fn is_rich(&self) -> bool {
        matches!(self, ContentKind::RichText)
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKind::PlainText => write!(f, "text"),
            ContentKind::RichText => write!(f, "html"),
        }
    }
}

pub fn is_markup_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
        .unwrap_or(false)
}

/// How the tab came to exist. Only affects its label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    New,
    Opened,
    Restored { snapshot_name: String },
}

#[derive(Debug, Clone)]
pub struct Document {
    pub id: DocumentId,
    pub identity: Identity,
    pub kind: ContentKind,
    pub dirty: bool,
    /// Assigned snapshot location. Set at creation, on identity change, and when another
    /// tab claims the file.
    pub snapshot: PathBuf,
    pub origin: Origin,
}

impl Document {
    pub fn new(identity: Identity, kind: ContentKind, snapshot: PathBuf, origin: Origin) -> Self {
        Self {
            id: DocumentId::new(),
            identity,
            kind,
            dirty: false,
            snapshot,
            origin,
        }
    }

    /// File name for durable documents, "Untitled" otherwise.
    pub fn display_name(&self) -> String {
        match &self.identity {
            Identity::Durable(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            Identity::Ephemeral { .. } => "Untitled".to_string(),
        }
    }

    /// Tab caption, with a trailing `*` while modified.
    pub fn tab_label(&self) -> String {
        let base = match (&self.identity, &self.origin) {
            (Identity::Ephemeral { .. }, Origin::Restored { snapshot_name }) => {
                if self.kind.is_rich() {
                    format!("Restored (HTML): {}", snapshot_name)
                } else {
                    format!("Restored: {}", snapshot_name)
                }
            }
            _ => self.display_name(),
        };
        if self.dirty {
            format!("{}*", base)
        } else {
            base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(identity: Identity, kind: ContentKind, origin: Origin) -> Document {
        Document::new(identity, kind, PathBuf::from("/snap/x.tmp"), origin)
    }

    #[test]
    fn test_kind_from_path() {
        assert_eq!(
            ContentKind::from_path(Path::new("/tmp/a.HTML")),
            ContentKind::RichText
        );
        assert_eq!(
            ContentKind::from_path(Path::new("/tmp/a.htm")),
            ContentKind::RichText
        );
        assert_eq!(
            ContentKind::from_path(Path::new("/tmp/a.txt")),
            ContentKind::PlainText
        );
        assert_eq!(
            ContentKind::from_path(Path::new("/tmp/Makefile")),
            ContentKind::PlainText
        );
    }

    #[test]
    fn test_classify_needs_both_markers() {
        assert_eq!(
            ContentKind::classify("<HTML><BODY>hi</BODY></HTML>"),
            ContentKind::RichText
        );
        assert_eq!(
            ContentKind::classify("<html> without a body tag"),
            ContentKind::PlainText
        );
        assert_eq!(ContentKind::classify("hello world"), ContentKind::PlainText);
    }

    #[test]
    fn test_tab_labels() {
        let mut untitled = doc(
            Identity::Ephemeral {
                token: "ab".into(),
            },
            ContentKind::PlainText,
            Origin::New,
        );
        assert_eq!(untitled.tab_label(), "Untitled");
        untitled.dirty = true;
        assert_eq!(untitled.tab_label(), "Untitled*");

        let opened = doc(
            Identity::Durable(PathBuf::from("/tmp/notes.txt")),
            ContentKind::PlainText,
            Origin::Opened,
        );
        assert_eq!(opened.tab_label(), "notes.txt");

        let restored = doc(
            Identity::Ephemeral {
                token: "cd".into(),
            },
            ContentKind::RichText,
            Origin::Restored {
                snapshot_name: "abc.tmp".into(),
            },
        );
        assert_eq!(restored.tab_label(), "Restored (HTML): abc.tmp");
    }

    #[test]
    fn test_restored_label_switches_to_file_name_after_save_as() {
        let mut restored = doc(
            Identity::Ephemeral {
                token: "cd".into(),
            },
            ContentKind::PlainText,
            Origin::Restored {
                snapshot_name: "abc.tmp".into(),
            },
        );
        restored.identity = Identity::Durable(PathBuf::from("/tmp/kept.txt"));
        assert_eq!(restored.tab_label(), "kept.txt");
    }
}
