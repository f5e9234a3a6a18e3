use crate::FsvaultContext;
use crate::IGNORE_FILE;
use crate::ignore::{Classification, Rule, RuleList};
use crate::scanner::{ClassifiedEntry, TreeWalker};
use crate::tracking::TrackingManifest;
use anyhow::{Context, Result};
use colored::Colorize;

/// Execute the `status` command: walk the base directory and report how
/// every new entry classifies.
///
/// # Errors
///
/// Returns an error if the repository is not initialized, the rule list
/// fails to load, or the walk fails.
pub fn execute(ctx: &FsvaultContext, short: bool, show_ignored: bool) -> Result<()> {
    ctx.check_repo_initialized()?;

    let base = &ctx.config.core.base_path;
    let manifest = TrackingManifest::load(&ctx.repo_path)?;

    let mut rules = RuleList::new();
    // The repository's own state directory is never a candidate for
    // versioning; exclude it with a builtin rule when it sits inside the
    // walked tree.
    if let Ok(rel) = ctx.repo_path.strip_prefix(base) {
        let pattern = format!("./{}/", rel.display());
        rules.add_builtin(
            Rule::compile_builtin(&pattern)
                .context("Failed to compile builtin repository exclusion")?,
        );
    }
    rules.load_from_path(&ctx.repo_path.join(IGNORE_FILE))?;

    let walker = TreeWalker::new(&rules, &manifest, base)
        .follow_symlinks(ctx.config.tracking.follow_symlinks)
        .skip_dir(ctx.repo_path.clone());
    let results = walker.classify_new_entries()?;

    let taken: Vec<&ClassifiedEntry> = results
        .iter()
        .filter(|e| e.classification == Classification::Taken)
        .collect();
    let unclassified: Vec<&ClassifiedEntry> = results
        .iter()
        .filter(|e| e.classification == Classification::Unclassified)
        .collect();
    let ignored: Vec<&ClassifiedEntry> = results
        .iter()
        .filter(|e| e.classification == Classification::Ignored)
        .collect();

    if taken.is_empty() && unclassified.is_empty() && (!show_ignored || ignored.is_empty()) {
        super::print_info("No new entries");
        println!("Working tree clean");
        return Ok(());
    }

    if short {
        for entry in &taken {
            println!("A {}", entry.relative);
        }
        for entry in &unclassified {
            println!("? {}", entry.relative);
        }
        if show_ignored {
            for entry in &ignored {
                println!("I {}", entry.relative);
            }
        }
        return Ok(());
    }

    if !taken.is_empty() {
        println!("{}", "New entries to be versioned (take rules):".bold());
        for entry in &taken {
            println!("  {}", entry.relative.green());
        }
        println!();
    }

    if !unclassified.is_empty() {
        println!("{}", "New entries:".bold());
        for entry in &unclassified {
            println!("  {}", entry.relative.yellow());
        }
        println!();
    }

    if show_ignored && !ignored.is_empty() {
        println!("{}", "Ignored entries:".bold());
        for entry in &ignored {
            println!("  {}", entry.relative.dimmed());
        }
        println!();
    }

    Ok(())
}
