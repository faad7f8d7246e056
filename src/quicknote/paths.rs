//! # Snapshot Paths
//!
//! Maps a document [`Identity`] to the file its snapshot lives in:
//!
//! ```text
//! <snapshot_dir>/
//! ├── <sha256 of absolute path>.tmp   # documents backed by a real file
//! └── untitled_<16 hex chars>.tmp     # untitled documents
//! ```
//!
//! Durable names are a pure function of the absolute path, so a document reopened after
//! a restart lands on the same snapshot. Untitled documents get their random token once,
//! in [`SnapshotPaths::fresh_ephemeral`], and keep it on the identity; resolving the same
//! identity twice therefore never produces a second file.

use crate::error::{QuicknoteError, Result};
use crate::model::Identity;
use sha2::{Digest, Sha256};
use std::env;
use std::fs;
use std::path::{Component, Path, PathBuf};
use uuid::Uuid;

pub const SNAPSHOT_SUFFIX: &str = ".tmp";
const UNTITLED_PREFIX: &str = "untitled_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotPaths {
    dir: PathBuf,
}

impl SnapshotPaths {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the snapshot directory if needed. Safe to call repeatedly.
    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(QuicknoteError::Io)
    }

    pub fn resolve(&self, identity: &Identity) -> PathBuf {
        match identity {
            Identity::Durable(path) => self.dir.join(durable_file_name(path)),
            Identity::Ephemeral { token } => self
                .dir
                .join(format!("{}{}{}", UNTITLED_PREFIX, token, SNAPSHOT_SUFFIX)),
        }
    }

    /// A new untitled identity with a random 16-hex-char token.
    pub fn fresh_ephemeral(&self) -> Identity {
        let bytes = *Uuid::new_v4().as_bytes();
        // Bytes 6 and 8 carry the version and variant bits.
        let token = bytes[..6]
            .iter()
            .chain(&bytes[9..11])
            .map(|b| format!("{:02x}", b))
            .collect();
        Identity::Ephemeral { token }
    }
}

fn durable_file_name(path: &Path) -> String {
    let digest = Sha256::digest(path.as_os_str().as_encoded_bytes());
    format!("{:x}{}", digest, SNAPSHOT_SUFFIX)
}

pub fn is_snapshot_name(name: &str) -> bool {
    name.ends_with(SNAPSHOT_SUFFIX) && !name.starts_with('.')
}

/// One spelling per file: anchored at the current directory, `.` and `..` folded, and
/// symlinks resolved as far as the path exists on disk.
///
/// A file that does not exist yet is resolved through its parent directory, so saving
/// to a new name and reopening it later land on the same identity.
pub fn absolutize(path: &Path) -> Result<PathBuf> {
    let anchored = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir().map_err(QuicknoteError::Io)?.join(path)
    };
    let normalized = normalize_lexically(&anchored);

    if let Ok(real) = fs::canonicalize(&normalized) {
        return Ok(real);
    }
    let through_parent = normalized
        .parent()
        .zip(normalized.file_name())
        .and_then(|(parent, name)| fs::canonicalize(parent).ok().map(|real| real.join(name)));
    Ok(through_parent.unwrap_or(normalized))
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `..` above the root stays at the root.
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths() -> SnapshotPaths {
        SnapshotPaths::new("/home/ada/.quicknote_autosave")
    }

    #[test]
    fn test_durable_resolution_is_deterministic() {
        let identity = Identity::Durable(PathBuf::from("/tmp/a.txt"));
        let first = paths().resolve(&identity);
        let second = SnapshotPaths::new("/home/ada/.quicknote_autosave").resolve(&identity);
        assert_eq!(first, second);
    }

    #[test]
    fn test_durable_name_is_sha256_hex() {
        let resolved = paths().resolve(&Identity::Durable(PathBuf::from("/tmp/a.txt")));
        let name = resolved.file_name().unwrap().to_str().unwrap();
        let expected = format!("{:x}.tmp", Sha256::digest(b"/tmp/a.txt"));
        assert_eq!(name, expected);
        assert_eq!(name.len(), 64 + ".tmp".len());
    }

    #[test]
    fn test_distinct_files_get_distinct_snapshots() {
        let a = paths().resolve(&Identity::Durable(PathBuf::from("/tmp/a.txt")));
        let b = paths().resolve(&Identity::Durable(PathBuf::from("/tmp/b.txt")));
        assert_ne!(a, b);
    }

    #[test]
    fn test_ephemeral_path_is_stable_for_its_identity() {
        let p = paths();
        let identity = p.fresh_ephemeral();
        let first = p.resolve(&identity);
        for _ in 0..5 {
            assert_eq!(p.resolve(&identity), first);
        }
        let name = first.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("untitled_"));
        assert!(name.ends_with(".tmp"));
        assert_eq!(name.len(), "untitled_".len() + 16 + ".tmp".len());
    }

    #[test]
    fn test_fresh_ephemeral_tokens_differ() {
        let p = paths();
        assert_ne!(p.fresh_ephemeral(), p.fresh_ephemeral());
    }

    #[test]
    fn test_ensure_dir_is_idempotent() {
        let temp = tempfile::tempdir().unwrap();
        let p = SnapshotPaths::new(temp.path().join("snaps"));
        p.ensure_dir().unwrap();
        p.ensure_dir().unwrap();
        assert!(p.dir().is_dir());
    }

    #[test]
    fn test_snapshot_names() {
        assert!(is_snapshot_name("abc.tmp"));
        assert!(is_snapshot_name("untitled_0011.tmp"));
        assert!(!is_snapshot_name(".abc.tmp.partial"));
        assert!(!is_snapshot_name("notes.txt"));
    }

    #[test]
    fn test_tokens_use_every_hex_digit() {
        let p = paths();
        let tokens: Vec<String> = (0..64)
            .map(|_| match p.fresh_ephemeral() {
                Identity::Ephemeral { token } => token,
                Identity::Durable(_) => unreachable!(),
            })
            .collect();
        for token in &tokens {
            assert_eq!(token.len(), 16);
            assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        }
        // No digit position is pinned to a constant.
        for i in 0..16 {
            let first = tokens[0].as_bytes()[i];
            assert!(tokens.iter().any(|t| t.as_bytes()[i] != first), "digit {} fixed", i);
        }
    }

    #[test]
    fn test_two_spellings_of_one_file_share_a_snapshot() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir(temp.path().join("sub")).unwrap();
        fs::write(temp.path().join("a.txt"), "x").unwrap();

        let direct = absolutize(&temp.path().join("a.txt")).unwrap();
        let detour = absolutize(&temp.path().join("sub/../a.txt")).unwrap();
        let dotted = absolutize(&temp.path().join("./sub/./../a.txt")).unwrap();
        assert_eq!(direct, detour);
        assert_eq!(direct, dotted);

        let p = paths();
        assert_eq!(
            p.resolve(&Identity::Durable(direct)),
            p.resolve(&Identity::Durable(detour))
        );
    }

    #[test]
    fn test_missing_file_is_normalized_through_its_parent() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir(temp.path().join("sub")).unwrap();

        let before = absolutize(&temp.path().join("sub/../new.txt")).unwrap();
        fs::write(temp.path().join("new.txt"), "x").unwrap();
        let after = absolutize(&temp.path().join("new.txt")).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_normalize_lexically() {
        assert_eq!(
            normalize_lexically(Path::new("/a/./b/../c.txt")),
            PathBuf::from("/a/c.txt")
        );
        assert_eq!(normalize_lexically(Path::new("/../x")), PathBuf::from("/x"));
    }

    #[test]
    fn test_absolutize_anchors_relative_paths() {
        let temp = tempfile::tempdir().unwrap();
        let abs = absolutize(&temp.path().join("x.txt")).unwrap();
        assert!(abs.is_absolute());
        assert!(abs.ends_with("x.txt"));
        assert!(absolutize(Path::new("rel.txt")).unwrap().is_absolute());
    }
}
