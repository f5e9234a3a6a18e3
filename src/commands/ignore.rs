use crate::FsvaultContext;
use crate::IGNORE_FILE;
use crate::cli::IgnoreAction;
use crate::ignore::{InsertPosition, Rule, RuleList};
use anyhow::{Context, Result};
use std::io::Read;

/// Execute the `ignore` command: edit, list, or load the rule list.
///
/// Patterns are compiled before anything is stored, so a bad pattern leaves
/// the persisted list untouched.
///
/// # Errors
///
/// Returns an error if:
/// - The repository is not initialized
/// - A pattern fails to compile
/// - An insertion position is out of range
/// - The rule list cannot be read or written
pub fn execute(ctx: &FsvaultContext, action: &IgnoreAction, verbose: bool) -> Result<()> {
    ctx.check_repo_initialized()?;
    let list_path = ctx.repo_path.join(IGNORE_FILE);

    match action {
        IgnoreAction::Append { patterns } => {
            insert(ctx, patterns, InsertPosition::End)?;
        }
        IgnoreAction::Prepend { patterns } => {
            insert(ctx, patterns, InsertPosition::Start)?;
        }
        IgnoreAction::At { position, patterns } => {
            insert(ctx, patterns, InsertPosition::Index(*position))?;
        }
        IgnoreAction::Dump => {
            let mut rules = RuleList::new();
            rules.load_from_path(&list_path)?;
            for (position, text) in rules.dump() {
                if verbose {
                    println!("{position:3}: {text}");
                } else {
                    println!("{text}");
                }
            }
        }
        IgnoreAction::Load => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("Failed to read patterns from stdin")?;

            let mut rules = RuleList::new();
            let compiled: Vec<Rule> = input
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(Rule::compile)
                .collect::<Result<_, _>>()?;
            let count = compiled.len();
            rules.reserve(count);
            rules.insert(compiled, InsertPosition::End)?;
            rules.save_to_path(&list_path)?;

            println!("{} pattern{} loaded.", count, if count == 1 { "" } else { "s" });
        }
    }

    Ok(())
}

/// Load the stored list, insert freshly compiled patterns, and save.
fn insert(ctx: &FsvaultContext, patterns: &[String], position: InsertPosition) -> Result<()> {
    if patterns.is_empty() {
        anyhow::bail!("No patterns given");
    }

    let list_path = ctx.repo_path.join(IGNORE_FILE);
    let mut rules = RuleList::new();
    rules.load_from_path(&list_path)?;

    let compiled: Vec<Rule> = patterns
        .iter()
        .map(|p| Rule::compile(p))
        .collect::<Result<_, _>>()?;
    let count = compiled.len();

    rules.reserve(count);
    rules.insert(compiled, position)?;
    rules.save_to_path(&list_path)?;

    super::print_success(&format!(
        "{} pattern{} added",
        count,
        if count == 1 { "" } else { "s" }
    ));
    Ok(())
}
