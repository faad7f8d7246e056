//! # Configuration
//!
//! Quicknote keeps a small JSON file, `config.json`, in the OS-appropriate config
//! directory (resolved by the binary through the `directories` crate). A missing file
//! means defaults.
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `autosave_interval_secs` | `60` | Seconds between auto-save sweeps |
//! | `snapshot_dir` | `~/.quicknote_autosave` | Where snapshots are written |
//!
//! The persisted [`QuicknoteConfig`] is resolved once at startup into
//! [`AutoSaveSettings`], which is handed explicitly to the path resolver and the
//! scheduler. Nothing reads configuration from globals.

use crate::error::{QuicknoteError, Result};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILENAME: &str = "config.json";
pub const DEFAULT_AUTOSAVE_INTERVAL_SECS: u64 = 60;
pub const SNAPSHOT_DIR_NAME: &str = ".quicknote_autosave";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuicknoteConfig {
    #[serde(default = "default_interval")]
    pub autosave_interval_secs: u64,

    /// Overrides the per-user snapshot directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_dir: Option<PathBuf>,
}

fn default_interval() -> u64 {
    DEFAULT_AUTOSAVE_INTERVAL_SECS
}

impl Default for QuicknoteConfig {
    fn default() -> Self {
        Self {
            autosave_interval_secs: DEFAULT_AUTOSAVE_INTERVAL_SECS,
            snapshot_dir: None,
        }
    }
}

/// Resolved process-wide auto-save settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoSaveSettings {
    pub snapshot_dir: PathBuf,
    pub interval: Duration,
}

impl QuicknoteConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(QuicknoteError::Io)?;
        let config: QuicknoteConfig =
            serde_json::from_str(&content).map_err(QuicknoteError::Serialization)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(QuicknoteError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(QuicknoteError::Serialization)?;
        fs::write(config_path, content).map_err(QuicknoteError::Io)?;
        Ok(())
    }

    /// Get a value by its CLI key (`autosave-interval`, `snapshot-dir`).
    pub fn get(&self, key: &str) -> Result<String> {
        match key {
            "autosave-interval" => Ok(self.autosave_interval_secs.to_string()),
            "snapshot-dir" => Ok(self
                .snapshot_dir
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()),
            other => Err(QuicknoteError::Config(format!("Unknown key: {}", other))),
        }
    }

    /// Set a value by its CLI key. An empty `snapshot-dir` clears the override.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "autosave-interval" => {
                let secs: u64 = value.parse().map_err(|_| {
                    QuicknoteError::Config(format!("Not a number of seconds: {}", value))
                })?;
                if secs == 0 {
                    return Err(QuicknoteError::Config(
                        "autosave-interval must be at least 1 second".to_string(),
                    ));
                }
                self.autosave_interval_secs = secs;
            }
            "snapshot-dir" => {
                self.snapshot_dir = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            other => return Err(QuicknoteError::Config(format!("Unknown key: {}", other))),
        }
        Ok(())
    }

    /// Resolve into the settings object used by the core.
    ///
    /// `home` is the user's home directory; the default snapshot directory lives there.
    /// An interval of zero falls back to the default.
    pub fn resolve(&self, home: &Path) -> AutoSaveSettings {
        let snapshot_dir = self
            .snapshot_dir
            .clone()
            .unwrap_or_else(|| home.join(SNAPSHOT_DIR_NAME));
        let secs = if self.autosave_interval_secs == 0 {
            DEFAULT_AUTOSAVE_INTERVAL_SECS
        } else {
            self.autosave_interval_secs
        };
        AutoSaveSettings {
            snapshot_dir,
            interval: Duration::from_secs(secs),
        }
    }
}

/// The user's home directory as seen by the `directories` crate.
pub fn home_dir() -> Result<PathBuf> {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .ok_or_else(|| QuicknoteError::Config("Could not determine home directory".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = QuicknoteConfig::default();
        assert_eq!(config.autosave_interval_secs, 60);
        assert!(config.snapshot_dir.is_none());
    }

    #[test]
    fn test_load_missing_config() {
        let temp = tempfile::tempdir().unwrap();
        let config = QuicknoteConfig::load(temp.path().join("nope")).unwrap();
        assert_eq!(config, QuicknoteConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp = tempfile::tempdir().unwrap();

        let mut config = QuicknoteConfig::default();
        config.set("autosave-interval", "15").unwrap();
        config.save(temp.path()).unwrap();

        let loaded = QuicknoteConfig::load(temp.path()).unwrap();
        assert_eq!(loaded.autosave_interval_secs, 15);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join(CONFIG_FILENAME), "{}").unwrap();

        let loaded = QuicknoteConfig::load(temp.path()).unwrap();
        assert_eq!(loaded, QuicknoteConfig::default());
    }

    #[test]
    fn test_set_rejects_zero_and_garbage() {
        let mut config = QuicknoteConfig::default();
        assert!(config.set("autosave-interval", "0").is_err());
        assert!(config.set("autosave-interval", "soon").is_err());
        assert!(config.set("colour", "blue").is_err());
        assert_eq!(config.autosave_interval_secs, 60);
    }

    #[test]
    fn test_resolve_defaults_under_home() {
        let settings = QuicknoteConfig::default().resolve(Path::new("/home/ada"));
        assert_eq!(
            settings.snapshot_dir,
            PathBuf::from("/home/ada/.quicknote_autosave")
        );
        assert_eq!(settings.interval, Duration::from_secs(60));
    }

    #[test]
    fn test_resolve_honours_overrides() {
        let mut config = QuicknoteConfig::default();
        config.set("snapshot-dir", "/var/snaps").unwrap();
        config.autosave_interval_secs = 0;

        let settings = config.resolve(Path::new("/home/ada"));
        assert_eq!(settings.snapshot_dir, PathBuf::from("/var/snaps"));
        assert_eq!(settings.interval, Duration::from_secs(60));
    }
}
