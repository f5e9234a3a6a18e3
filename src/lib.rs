#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
// Allow pedantic strict lints that create false positives in this codebase
#![allow(clippy::arithmetic_side_effects)] // Simple counters and index math cannot overflow
#![allow(clippy::indexing_slicing)] // Bounds checked by logic

//! # Fsvault - Whole-Tree Versioning Engine
//!
//! Fsvault is a git-like versioning tool for whole directory trees, built
//! around a local change-tracking engine: it walks a base directory, decides
//! which entries are under version control, and classifies every *new* entry
//! as ignored or taken according to a user-configurable, ordered rule set.
//!
//! ## Features
//!
//! - **Ordered ignore/take rules**: shell-style path globs, raw regular
//!   expressions, device-number predicates, and inode predicates, evaluated
//!   in list order (first match wins)
//! - **Compile-once matchers**: every rule is compiled into an efficient
//!   matcher exactly once at load time
//! - **Per-directory rule propagation**: during a walk, each directory only
//!   carries the rules that can still apply at its depth or below
//! - **Stable persistence**: the user rule list round-trips through a small
//!   count-prefixed file format
//!
//! ## Architecture
//!
//! The codebase is organized into several key modules:
//!
//! - [`ignore`]: The rule subsystem (pattern compiler, rule list store, tree
//!   propagator, match evaluator)
//! - [`scanner`]: Filesystem walking and entry classification
//! - [`tracking`]: Manifest of paths already under version control
//! - [`commands`]: Command implementations (init, status, ignore)
//! - [`config`]: Configuration parsing and persistence
//!
//! ## Example Usage
//!
//! ```no_run
//! use fsvault::ignore::{InsertPosition, Rule, RuleList};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut rules = RuleList::new();
//! let rule = Rule::compile("./tmp/**")?;
//! rules.insert(vec![rule], InsertPosition::End)?;
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions (argument parsing structures).
pub mod cli;

/// Commands module containing all CLI command implementations.
pub mod commands;

/// Configuration parsing, validation, and management.
pub mod config;

/// The ignore-rule subsystem: pattern compiler, rule list store, tree
/// propagator, and match evaluator.
pub mod ignore;

/// Filesystem walking and new-entry classification.
pub mod scanner;

/// Tracking manifest for paths already under version control.
pub mod tracking;

/// Utility functions and helpers.
pub mod utils;

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Current version of the fsvault binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default repository directory name within the home directory.
pub const DEFAULT_REPO_DIR: &str = ".fsvault";

/// Default configuration file path relative to home directory.
pub const DEFAULT_CONFIG_PATH: &str = ".config/fsvault/config";

/// Name of the persisted ignore-rule list file inside the repository.
pub const IGNORE_FILE: &str = "ignore";

/// Name of the tracking manifest file inside the repository.
pub const MANIFEST_FILE: &str = "tracking.toml";

/// Central context for all fsvault operations.
///
/// This structure holds the repository path, configuration, and settings
/// needed for executing commands. It replaces any process-wide state: the
/// rule list and walk machinery are always reached through an explicit
/// context value.
///
/// # Examples
///
/// ```no_run
/// use fsvault::FsvaultContext;
///
/// # fn main() -> anyhow::Result<()> {
/// // Create context with default paths
/// let ctx = FsvaultContext::new()?;
///
/// // Create context with custom paths (for testing)
/// let ctx = FsvaultContext::new_explicit(
///     "/tmp/test_repo".into(),
///     "/tmp/test_config".into()
/// )?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FsvaultContext {
    /// Path to the fsvault repository directory.
    pub repo_path: PathBuf,

    /// Path to the configuration file.
    pub config_path: PathBuf,

    /// Loaded configuration settings.
    pub config: config::Config,
}

impl FsvaultContext {
    /// Creates a new `FsvaultContext` by loading the configuration from the
    /// default path.
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined or if the
    /// configuration file cannot be read or created.
    pub fn new() -> Result<Self> {
        // Check environment variable for config path first
        let config_path = if let Ok(path) = std::env::var("FSVAULT_CONFIG_PATH") {
            PathBuf::from(path)
        } else {
            let home = dirs::home_dir().context("Could not find home directory")?;
            home.join(DEFAULT_CONFIG_PATH)
        };

        let config = config::Config::load(&config_path)?;

        // Allow environment variable to override config repo_path
        let repo_path = if let Ok(path) = std::env::var("FSVAULT_REPO_PATH") {
            PathBuf::from(path)
        } else {
            config.core.repo_path.clone()
        };

        Ok(Self {
            repo_path,
            config_path,
            config,
        })
    }

    /// Creates a new `FsvaultContext` with explicit paths for testing.
    /// This avoids the need for environment variable manipulation.
    ///
    /// # Errors
    /// Returns an error if the configuration cannot be loaded or created.
    pub fn new_explicit(repo_path: PathBuf, config_path: PathBuf) -> Result<Self> {
        let config = if config_path.exists() {
            config::Config::load(&config_path)?
        } else {
            // Create a default config with the provided repo path
            let mut config = config::Config::default();
            config.core.repo_path.clone_from(&repo_path);

            // Ensure the config directory exists
            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            // Save the config
            config.save(&config_path)?;
            config
        };

        Ok(Self {
            repo_path,
            config_path,
            config,
        })
    }

    /// Checks if the repository is initialized by verifying the existence of
    /// the repository directory and the ignore-rule list.
    #[must_use]
    pub fn is_repo_initialized(&self) -> bool {
        self.repo_path.exists() && self.repo_path.join(IGNORE_FILE).exists()
    }

    /// Checks if the repository is initialized, returning an error if not.
    ///
    /// # Errors
    /// Returns an error if the repository is not initialized.
    pub fn check_repo_initialized(&self) -> Result<()> {
        if !self.is_repo_initialized() {
            return Err(anyhow::anyhow!(
                "Repository not initialized: fsvault repository not found in {}. Did you run 'fsv init'?",
                self.repo_path.display()
            ));
        }
        Ok(())
    }

    /// Ensures that the repository directory exists.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn ensure_repo_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.repo_path).with_context(|| {
            format!(
                "Failed to create repository directory: {}",
                self.repo_path.display()
            )
        })?;
        Ok(())
    }
}
