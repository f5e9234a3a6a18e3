//! Depth-first tree walk that classifies newly discovered entries.
//!
//! The walker visits parent-before-children (walkdir's natural order),
//! builds one [`DirectoryArena`] node per visited directory so rule views
//! propagate top-down, and hands every not-yet-tracked entry to the match
//! evaluator. New directories that classify as ignored are pruned: entries
//! below them are never enumerated.

use crate::ignore::{classify, Classification, DirectoryArena, Entry, FileKind, RuleList};
use crate::tracking::TrackingManifest;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::os::unix::fs::{FileTypeExt, MetadataExt};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One classified new entry, as reported to the caller.
#[derive(Debug, Clone)]
pub struct ClassifiedEntry {
    /// Absolute path of the entry.
    pub path: PathBuf,
    /// Root-relative path in `./…` form (what the rules matched against).
    pub relative: String,
    /// File type.
    pub kind: FileKind,
    /// The evaluator's verdict.
    pub classification: Classification,
}

/// Walks the base directory and classifies every new entry against the
/// rule list.
///
/// The rule list is treated as immutable for the whole walk; per-directory
/// views are produced as the walk descends and only read afterwards.
pub struct TreeWalker<'a> {
    /// The compiled rule list (builtins and user rules).
    rules: &'a RuleList,
    /// Which paths are already versioned.
    manifest: &'a TrackingManifest,
    /// Base directory of the versioned tree.
    base: &'a Path,
    /// Whether to follow symbolic links while walking.
    follow_symlinks: bool,
    /// A directory to leave out of the walk entirely (the repository's own
    /// state directory).
    skip: Option<PathBuf>,
}

impl<'a> TreeWalker<'a> {
    /// Create a walker over `base`.
    #[must_use]
    pub const fn new(
        rules: &'a RuleList,
        manifest: &'a TrackingManifest,
        base: &'a Path,
    ) -> Self {
        Self {
            rules,
            manifest,
            base,
            follow_symlinks: false,
            skip: None,
        }
    }

    /// Follow symbolic links during the walk.
    #[must_use]
    pub const fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Never enter (or report) the given directory.
    #[must_use]
    pub fn skip_dir(mut self, path: PathBuf) -> Self {
        self.skip = Some(path);
        self
    }

    /// Walk the tree and return every new entry with its classification,
    /// in discovery (depth-first) order.
    ///
    /// # Errors
    ///
    /// Returns an error if the base directory cannot be read, a directory
    /// entry fails to resolve, or the match evaluator reports a corrupted
    /// compiled state.
    pub fn classify_new_entries(&self) -> Result<Vec<ClassifiedEntry>> {
        let mut arena = DirectoryArena::new();
        let mut dir_nodes: HashMap<PathBuf, usize> = HashMap::new();
        let mut results = Vec::new();

        let mut it = WalkDir::new(self.base)
            .follow_links(self.follow_symlinks)
            .into_iter();

        while let Some(entry) = it.next() {
            let entry = entry.with_context(|| {
                format!("Failed to read directory entry under {}", self.base.display())
            })?;
            let path = entry.path();

            // Never enter the repository's own state directory.
            if self.skip.as_deref() == Some(path) {
                if entry.file_type().is_dir() {
                    it.skip_current_dir();
                }
                continue;
            }

            let metadata = entry.metadata().with_context(|| {
                format!("Failed to read metadata for {}", path.display())
            })?;

            if entry.depth() == 0 {
                let root = arena.push_root(self.rules, metadata.dev());
                dir_nodes.insert(path.to_path_buf(), root);
                continue;
            }

            let parent_id = path
                .parent()
                .and_then(|p| dir_nodes.get(p))
                .copied()
                .with_context(|| {
                    format!("Walk visited {} before its parent", path.display())
                })?;

            let kind = file_kind(&entry, &metadata);

            // Already-versioned entries bypass the evaluator; their
            // directories still get arena nodes so rules keep propagating
            // to new entries below them.
            if self.manifest.is_tracked(path) {
                if kind == FileKind::Directory {
                    let id = arena.push_child(self.rules, parent_id, metadata.dev());
                    dir_nodes.insert(path.to_path_buf(), id);
                }
                continue;
            }

            let rel = path
                .strip_prefix(self.base)
                .with_context(|| format!("Entry {} outside walk base", path.display()))?;
            let relative = format!("./{}", rel.display());

            let ignore_entry = Entry {
                path: &relative,
                kind,
                dev: metadata.dev(),
                ino: metadata.ino(),
                parent: Some(parent_id),
            };
            let view = arena
                .node(parent_id)
                .with_context(|| format!("Missing arena node for parent of {relative}"))?
                .view()
                .clone();
            let classification = classify(&ignore_entry, &view, self.rules, &arena)?;

            if kind == FileKind::Directory {
                if classification == Classification::Ignored {
                    // A new ignored directory hides everything below it.
                    it.skip_current_dir();
                } else {
                    let id = arena.push_child(self.rules, parent_id, metadata.dev());
                    dir_nodes.insert(path.to_path_buf(), id);
                }
            }

            results.push(ClassifiedEntry {
                path: path.to_path_buf(),
                relative,
                kind,
                classification,
            });
        }

        Ok(results)
    }
}

/// Map a directory entry's file type onto the rule subsystem's kinds.
fn file_kind(entry: &walkdir::DirEntry, metadata: &std::fs::Metadata) -> FileKind {
    let ft = entry.file_type();
    if ft.is_dir() {
        FileKind::Directory
    } else if ft.is_file() {
        FileKind::File
    } else if ft.is_symlink() {
        FileKind::Symlink
    } else if metadata.file_type().is_block_device() {
        FileKind::BlockDevice
    } else if metadata.file_type().is_char_device() {
        FileKind::CharDevice
    } else {
        FileKind::Other
    }
}
