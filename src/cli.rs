//! Command-line interface definitions for fsvault.
//!
//! This module contains all CLI argument parsing structures using clap's
//! derive macros.
//!
//! Note: Field-level documentation is provided via clap attributes, so we
//! allow missing_docs for this module to avoid redundant documentation.

#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Main CLI structure for fsvault.
#[derive(Parser)]
#[command(
    name = "fsv",
    version = crate::VERSION,
    about = "Whole-tree versioning with ordered ignore rules",
    long_about = "A git-like versioning tool for whole directory trees, with an ordered ignore/take rule engine deciding which new entries are versioned"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// All available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new fsvault repository
    Init,

    /// Show how new entries in the working tree classify
    Status {
        /// One entry per line, prefixed with its status character
        #[arg(short, long)]
        short: bool,

        /// Also list ignored entries
        #[arg(short, long)]
        ignored: bool,
    },

    /// Edit, list, or load the ignore-rule list
    Ignore {
        #[command(subcommand)]
        action: IgnoreAction,
    },

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Subcommands of `fsv ignore`.
#[derive(Subcommand)]
pub enum IgnoreAction {
    /// Append patterns to the end of the rule list
    Append {
        /// Patterns to add
        patterns: Vec<String>,
    },

    /// Put patterns at the beginning of the user rule list
    Prepend {
        /// Patterns to add
        patterns: Vec<String>,
    },

    /// Insert patterns at a position, counting user rules from 0
    At {
        /// Position to insert at
        position: usize,

        /// Patterns to add
        patterns: Vec<String>,
    },

    /// Print the stored patterns
    Dump,

    /// Replace the stored patterns with ones read from stdin, one per line
    Load,
}
