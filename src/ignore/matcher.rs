//! Match evaluator: classify one filesystem entry against a rule view.
//!
//! Rules are tested in original list order; the first decisive match wins.
//! List order, not rule specificity, determines precedence — an early take
//! rule carves an exception out of a later broad ignore rule.
//!
//! Only newly discovered entries are classified; already-tracked entries
//! never reach this evaluator.

use super::errors::IgnoreError;
use super::list::RuleList;
use super::pattern::{RuleKind, Sense};
use super::tree::{DirectoryArena, RuleView};
use std::cmp::Ordering;

/// File type of an entry, as far as the rule subsystem cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link.
    Symlink,
    /// Block device node.
    BlockDevice,
    /// Character device node.
    CharDevice,
    /// Anything else (sockets, fifos, …) — not representable under version
    /// control, ignored before any rule is consulted.
    Other,
}

/// One filesystem entry being classified. Transient per walk step; the
/// parent is a weak arena reference used for lookups only.
#[derive(Debug, Clone)]
pub struct Entry<'a> {
    /// Root-relative path in `./…` form.
    pub path: &'a str,
    /// File type.
    pub kind: FileKind,
    /// Device id the entry lives on.
    pub dev: u64,
    /// Inode number.
    pub ino: u64,
    /// Arena index of the parent directory; `None` for the walk root.
    pub parent: Option<usize>,
}

/// Outcome of classifying one new entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// A rule with ignore sense matched: excluded from version control.
    Ignored,
    /// A rule with take sense matched: explicitly kept.
    Taken,
    /// No rule matched; the caller applies default new-entry handling.
    Unclassified,
}

/// Classify `entry` against the rules visible in `view`.
///
/// The walk root itself is never ignored. Entries of unsupported file types
/// are ignored before any rule is consulted. Device rules compare the
/// entry's own device — or, for directories, the parent directory's device,
/// so a mount point stays versioned while its contents can be ignored.
///
/// # Errors
///
/// Returns [`IgnoreError::MatchEngine`] when the view references a rule
/// index outside the rule list — the sign of a corrupted compiled state,
/// which a walk must not continue past.
pub fn classify(
    entry: &Entry<'_>,
    view: &RuleView,
    rules: &RuleList,
    arena: &DirectoryArena,
) -> Result<Classification, IgnoreError> {
    // The walk root has no parent and is never up for exclusion.
    let Some(parent) = entry.parent else {
        return Ok(Classification::Unclassified);
    };

    if entry.kind == FileKind::Other {
        return Ok(Classification::Ignored);
    }

    for &index in view.active() {
        let rule = rules.get(index).ok_or_else(|| IgnoreError::MatchEngine {
            detail: format!(
                "rule view references index {index} beyond the rule list (len {})",
                rules.len()
            ),
        })?;

        let matched = match rule.kind() {
            RuleKind::PathGlob { matcher } | RuleKind::RawRegex { matcher } => {
                matcher.is_match(entry.path)
            }
            RuleKind::DeviceNumber {
                comparator,
                major,
                minor,
            } => {
                // Directories are judged by their parent's device, so the
                // mount point itself stays visible.
                let dev = if entry.kind == FileKind::Directory {
                    arena
                        .node(parent)
                        .ok_or_else(|| IgnoreError::MatchEngine {
                            detail: format!("entry parent {parent} is not in the directory arena"),
                        })?
                        .dev()
                } else {
                    entry.dev
                };
                comparator.accepts(compare_device(dev, *major, *minor))
            }
            RuleKind::InodeId { dev, inode } => entry.dev == *dev && entry.ino == *inode,
        };

        if matched {
            return Ok(match rule.sense() {
                Sense::Ignore => Classification::Ignored,
                Sense::Take => Classification::Taken,
            });
        }
    }

    Ok(Classification::Unclassified)
}

/// Compare a device id against a rule's major (and optional minor) number.
/// An absent minor means "compare on major only".
fn compare_device(dev: u64, major: u64, minor: Option<u64>) -> Ordering {
    let dev_major = u64::from(libc::major(dev as libc::dev_t));
    match dev_major.cmp(&major) {
        Ordering::Equal => match minor {
            Some(minor) => u64::from(libc::minor(dev as libc::dev_t)).cmp(&minor),
            None => Ordering::Equal,
        },
        other => other,
    }
}
