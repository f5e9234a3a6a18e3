use crate::config::Config;
use crate::ignore::RuleList;
use crate::tracking::TrackingManifest;
use crate::{DEFAULT_CONFIG_PATH, DEFAULT_REPO_DIR, IGNORE_FILE};
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

/// Initialize a new fsvault repository
///
/// # Errors
///
/// Returns an error if:
/// - Home directory cannot be found
/// - Repository already exists
/// - Failed to create the repository directory structure
pub fn execute() -> Result<()> {
    let home = dirs::home_dir().context("Could not find home directory")?;
    let repo_path = if let Ok(path) = std::env::var("FSVAULT_REPO_PATH") {
        PathBuf::from(path)
    } else {
        home.join(DEFAULT_REPO_DIR)
    };

    if repo_path.join(IGNORE_FILE).exists() {
        return Err(anyhow::anyhow!(
            "fsvault repository already initialized at {}",
            repo_path.display()
        ));
    }

    std::fs::create_dir_all(&repo_path).with_context(|| {
        format!(
            "Failed to create repository directory: {}",
            repo_path.display()
        )
    })?;

    // Empty rule list and manifest; both files exist from here on.
    let rules = RuleList::new();
    rules
        .save_to_path(&repo_path.join(IGNORE_FILE))
        .context("Failed to save initial ignore list")?;
    TrackingManifest::new()
        .save(&repo_path)
        .context("Failed to save initial tracking manifest")?;

    // Create default config
    let config_path = if let Ok(path) = std::env::var("FSVAULT_CONFIG_PATH") {
        PathBuf::from(path)
    } else {
        home.join(DEFAULT_CONFIG_PATH)
    };
    if !config_path.exists() {
        let mut config = Config::default();
        config.core.repo_path.clone_from(&repo_path);
        config
            .save(&config_path)
            .context("Failed to save default configuration")?;
    }

    super::print_success(&format!(
        "Initialized fsvault repository at {}",
        repo_path.display()
    ));
    println!("\n{}", "Quick start:".bold());
    println!("  fsv ignore append './tmp/**'   # Ignore everything under ./tmp");
    println!("  fsv ignore dump                # List the stored rules");
    println!("  fsv status                     # Classify new entries");

    Ok(())
}
