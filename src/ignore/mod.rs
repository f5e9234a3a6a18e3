//! The ignore-rule subsystem.
//!
//! This module decides the fate of every *new* filesystem entry a walk
//! discovers: excluded ("ignored"), explicitly kept ("taken"), or left to
//! default new-entry handling ("unclassified"). Already-versioned entries
//! never pass through here.
//!
//! # Architecture
//!
//! Four pieces, leaf-first:
//!
//! - [`pattern`] compiles one textual rule into a typed matcher
//! - [`list`] keeps the ordered rule list (builtin prefix, persisted user
//!   suffix)
//! - [`tree`] propagates per-directory rule subsets down a walked tree
//! - [`matcher`] evaluates one entry against a directory's rule view
//!
//! # Usage
//!
//! ```
//! use fsvault::ignore::{classify, DirectoryArena, InsertPosition, Rule, RuleList};
//! use fsvault::ignore::{Classification, Entry, FileKind};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut rules = RuleList::new();
//! rules.insert(
//!     vec![Rule::compile("t./proc/stat")?, Rule::compile("./proc/")?],
//!     InsertPosition::End,
//! )?;
//!
//! let mut arena = DirectoryArena::new();
//! let root = arena.push_root(&rules, 0);
//! let proc_dir = arena.push_child(&rules, root, 0);
//!
//! let entry = Entry {
//!     path: "./proc/stat",
//!     kind: FileKind::File,
//!     dev: 0,
//!     ino: 0,
//!     parent: Some(proc_dir),
//! };
//! let view = arena.node(proc_dir).unwrap().view().clone();
//! assert_eq!(classify(&entry, &view, &rules, &arena)?, Classification::Taken);
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod list;
pub mod matcher;
pub mod pattern;
pub mod tree;

pub use errors::IgnoreError;
pub use list::{InsertPosition, RuleList};
pub use matcher::{classify, Classification, Entry, FileKind};
pub use pattern::{DeviceComparator, Rule, RuleKind, Sense};
pub use tree::{DirectoryArena, DirectoryNode, RuleView};
