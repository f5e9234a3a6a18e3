use anyhow::Result;
use fsvault::config::Config;
use fsvault::ignore::RuleList;
use fsvault::tracking::TrackingManifest;
use fsvault::{FsvaultContext, IGNORE_FILE};
use tempfile::TempDir;

/// Test repository fixture for consistent test setup
pub struct TestRepo {
    pub temp_dir: TempDir,
    pub ctx: FsvaultContext,
}

impl TestRepo {
    /// Create a new test repository rooted in a temporary base directory
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let repo_path = temp_dir.path().join(".fsvault");
        let config_path = temp_dir.path().join(".config/fsvault/config");

        // Point the walked base at the temp dir, not the real home.
        let mut config = Config::default();
        config.core.base_path = temp_dir.path().to_path_buf();
        config.core.repo_path.clone_from(&repo_path);
        config.save(&config_path)?;

        let ctx = FsvaultContext::new_explicit(repo_path.clone(), config_path)?;
        ctx.ensure_repo_exists()?;

        // Initialize an empty rule list and manifest
        RuleList::new().save_to_path(&repo_path.join(IGNORE_FILE))?;
        TrackingManifest::new().save(&repo_path)?;

        Ok(Self { temp_dir, ctx })
    }

    /// Get the temporary base directory path
    pub fn path(&self) -> &std::path::Path {
        self.temp_dir.path()
    }
}

impl Default for TestRepo {
    fn default() -> Self {
        Self::new().expect("Failed to create test repository")
    }
}
