//! Tracking manifest: which paths are already under version control.
//!
//! The rule subsystem only ever sees *new* entries; this manifest is the
//! collaborator that answers "is this path already versioned?" during a
//! walk. It stores the user's tracking intent — whole directories and
//! individual files — and persists as a small TOML document inside the
//! repository.

use crate::MANIFEST_FILE;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Tracking manifest storing the user's tracking intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingManifest {
    /// Format version for future compatibility
    pub version: u32,
    /// Directories being tracked; everything below them counts as tracked
    #[serde(default)]
    pub tracked_directories: HashSet<PathBuf>,
    /// Individual files being tracked (not part of a tracked directory)
    #[serde(default)]
    pub tracked_files: HashSet<PathBuf>,
}

impl TrackingManifest {
    /// Current manifest format version
    const CURRENT_VERSION: u32 = 1;

    /// Create a new empty tracking manifest
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            tracked_directories: HashSet::new(),
            tracked_files: HashSet::new(),
        }
    }

    /// Add a directory to track. Files below it no longer need their own
    /// entries and are dropped.
    pub fn add_directory(&mut self, path: PathBuf) {
        self.tracked_files.retain(|f| !f.starts_with(&path));
        self.tracked_directories.insert(path);
    }

    /// Add an individual file to track.
    pub fn add_file(&mut self, path: PathBuf) {
        if !self.is_covered_by_directory(&path) {
            self.tracked_files.insert(path);
        }
    }

    /// Check if a path is tracked: either an explicitly tracked file or
    /// inside (or equal to) a tracked directory.
    #[must_use]
    pub fn is_tracked(&self, path: &Path) -> bool {
        self.tracked_files.contains(path) || self.is_covered_by_directory(path)
    }

    /// Whether a tracked directory covers this path.
    fn is_covered_by_directory(&self, path: &Path) -> bool {
        self.tracked_directories.iter().any(|d| path.starts_with(d))
    }

    /// Load the manifest from the repository directory. A missing file is
    /// an empty manifest.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(repo_path: &Path) -> Result<Self> {
        let path = repo_path.join(MANIFEST_FILE);
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse manifest {}", path.display()))
    }

    /// Save the manifest into the repository directory.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, repo_path: &Path) -> Result<()> {
        let path = repo_path.join(MANIFEST_FILE);
        let content = toml::to_string_pretty(self).context("Failed to serialize manifest")?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write manifest {}", path.display()))
    }
}

impl Default for TrackingManifest {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_tracked_directory_covers_children() {
        let mut manifest = TrackingManifest::new();
        manifest.add_directory(PathBuf::from("/home/user/.config/nvim"));

        assert!(manifest.is_tracked(Path::new("/home/user/.config/nvim")));
        assert!(manifest.is_tracked(Path::new("/home/user/.config/nvim/init.lua")));
        assert!(!manifest.is_tracked(Path::new("/home/user/.config/other")));
    }

    #[test]
    fn test_tracked_file_is_exact() {
        let mut manifest = TrackingManifest::new();
        manifest.add_file(PathBuf::from("/home/user/.bashrc"));

        assert!(manifest.is_tracked(Path::new("/home/user/.bashrc")));
        assert!(!manifest.is_tracked(Path::new("/home/user/.bash_profile")));
    }

    #[test]
    fn test_directory_absorbs_file_entries() {
        let mut manifest = TrackingManifest::new();
        manifest.add_file(PathBuf::from("/home/user/.config/nvim/init.lua"));
        manifest.add_directory(PathBuf::from("/home/user/.config/nvim"));

        assert!(manifest.tracked_files.is_empty());
        assert!(manifest.is_tracked(Path::new("/home/user/.config/nvim/init.lua")));
    }

    #[test]
    fn test_save_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let mut manifest = TrackingManifest::new();
        manifest.add_directory(PathBuf::from("/home/user/.config"));
        manifest.add_file(PathBuf::from("/home/user/.bashrc"));
        manifest.save(temp.path()).unwrap();

        let reloaded = TrackingManifest::load(temp.path()).unwrap();
        assert_eq!(reloaded.tracked_directories, manifest.tracked_directories);
        assert_eq!(reloaded.tracked_files, manifest.tracked_files);
    }

    #[test]
    fn test_load_missing_is_empty() {
        let temp = TempDir::new().unwrap();
        let manifest = TrackingManifest::load(temp.path()).unwrap();
        assert!(manifest.tracked_directories.is_empty());
        assert!(manifest.tracked_files.is_empty());
    }
}
