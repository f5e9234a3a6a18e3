//! Configuration parsing and persistence.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Top-level configuration, stored as TOML.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Core paths.
    #[serde(default)]
    pub core: CoreConfig,

    /// Walk and classification behavior.
    #[serde(default)]
    pub tracking: TrackingConfig,
}

/// Core paths: where the versioned tree starts and where fsvault keeps its
/// own state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Base directory of the versioned tree.
    #[serde(default = "default_base_path")]
    pub base_path: PathBuf,
    /// Repository state directory.
    #[serde(default = "default_repo_path")]
    pub repo_path: PathBuf,
}

/// Walk behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Whether the walk follows symbolic links.
    pub follow_symlinks: bool,
}

/// Default base: the user's home directory.
fn default_base_path() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("/tmp"))
}

/// Default repository location: `~/.fsvault`.
fn default_repo_path() -> PathBuf {
    default_base_path().join(crate::DEFAULT_REPO_DIR)
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
            repo_path: default_repo_path(),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
        }
    }
}

impl Config {
    /// Load the configuration from `path`, creating a default file if none
    /// exists yet.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed, or created.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Save the configuration to `path`, creating parent directories as
    /// needed.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory {}", parent.display())
            })?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create config file {}", path.display()))?;
        file.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write config file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_creates_default() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config");
        let config = Config::load(&path).unwrap();
        assert!(path.exists());
        assert!(!config.tracking.follow_symlinks);
    }

    #[test]
    fn test_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config");

        let mut config = Config::default();
        config.core.base_path = PathBuf::from("/srv/data");
        config.tracking.follow_symlinks = true;
        config.save(&path).unwrap();

        let reloaded = Config::load(&path).unwrap();
        assert_eq!(reloaded.core.base_path, PathBuf::from("/srv/data"));
        assert!(reloaded.tracking.follow_symlinks);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config");
        std::fs::write(&path, "[tracking]\nfollow_symlinks = true\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert!(config.tracking.follow_symlinks);
        assert_eq!(config.core.repo_path, default_repo_path());
    }
}
