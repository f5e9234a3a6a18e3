//! Per-directory rule propagation for tree walks.
//!
//! Instead of testing the full rule list against every entry, each walked
//! directory carries a [`RuleView`]: the subset of rule indices that can
//! still match at its depth or below (`active`), and the rules that only
//! become relevant deeper down (`pending`). Views are derived top-down while
//! the walk descends and are read-only once built; when nothing newly
//! qualifies at a directory, the child shares its parent's lists by
//! reference instead of allocating copies.
//!
//! Directories live in an index-addressed arena with parent back-indices,
//! so there are no ownership cycles to manage.

use super::list::RuleList;
use std::sync::Arc;

/// The rule subset relevant at one directory node.
///
/// Both sequences hold indices into the global [`RuleList`], in original
/// list order (order determines precedence). `active` holds rules testable
/// for the directory's children; `pending` holds rules still awaiting
/// greater depth.
#[derive(Debug, Clone)]
pub struct RuleView {
    /// Rules testable at this node or below.
    active: Arc<Vec<usize>>,
    /// Rules whose `path_depth` has not been reached yet.
    pending: Arc<Vec<usize>>,
}

impl RuleView {
    /// Build the view for the root directory (depth 0): rules that can
    /// match the root's immediate children are active, the rest pending.
    #[must_use]
    pub fn root(rules: &RuleList) -> Self {
        let mut active = Vec::new();
        let mut pending = Vec::new();
        for (index, rule) in rules.iter().enumerate() {
            if rule.path_depth() <= 1 {
                active.push(index);
            } else {
                pending.push(index);
            }
        }
        Self {
            active: Arc::new(active),
            pending: Arc::new(pending),
        }
    }

    /// Build the view for a child directory at `child_depth` (root = 0)
    /// from this parent view.
    ///
    /// Rules only ever gain eligibility with depth, so the child's `active`
    /// is the parent's plus whatever newly qualified, merged in original
    /// list order. When nothing newly qualifies, the parent's lists are
    /// shared by reference.
    #[must_use]
    pub fn child(&self, rules: &RuleList, child_depth: usize) -> Self {
        // Children of the child directory sit this many separators deep.
        let child_entry_depth = child_depth + 1;

        let qualifies = |index: usize| {
            rules
                .get(index)
                .is_some_and(|rule| rule.path_depth() <= child_entry_depth)
        };

        if !self.pending.iter().any(|&i| qualifies(i)) {
            // Same entries as the parent: share storage.
            return Self {
                active: Arc::clone(&self.active),
                pending: Arc::clone(&self.pending),
            };
        }

        let (newly, pending): (Vec<usize>, Vec<usize>) =
            self.pending.iter().copied().partition(|&i| qualifies(i));

        // Merge the newly qualified rules into the active sequence keeping
        // global list order; both inputs are already ascending.
        let mut active = Vec::with_capacity(self.active.len() + newly.len());
        let mut a = self.active.iter().peekable();
        let mut b = newly.iter().peekable();
        while let (Some(&&x), Some(&&y)) = (a.peek(), b.peek()) {
            if x < y {
                active.push(x);
                a.next();
            } else {
                active.push(y);
                b.next();
            }
        }
        active.extend(a.copied());
        active.extend(b.copied());

        Self {
            active: Arc::new(active),
            pending: Arc::new(pending),
        }
    }

    /// Rule indices testable at this node, in list order.
    #[must_use]
    pub fn active(&self) -> &[usize] {
        &self.active
    }

    /// Rule indices awaiting greater depth, in list order.
    #[must_use]
    pub fn pending(&self) -> &[usize] {
        &self.pending
    }

    /// Whether this view shares its `active` storage with `other`
    /// (reference identity, not content comparison).
    #[must_use]
    pub fn shares_active_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.active, &other.active)
    }
}

/// One directory node in the walked tree.
#[derive(Debug)]
pub struct DirectoryNode {
    /// Arena index of the parent directory; `None` for the root.
    parent: Option<usize>,
    /// Directory depth, root = 0.
    depth: usize,
    /// Device id of the directory itself (consulted by device rules for
    /// the directory's children).
    dev: u64,
    /// The rule subset relevant at this directory.
    view: RuleView,
}

impl DirectoryNode {
    /// Arena index of the parent directory, if any.
    #[must_use]
    pub const fn parent(&self) -> Option<usize> {
        self.parent
    }

    /// Directory depth below the walk root.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Device id of the directory.
    #[must_use]
    pub const fn dev(&self) -> u64 {
        self.dev
    }

    /// The rule view for this directory.
    #[must_use]
    pub const fn view(&self) -> &RuleView {
        &self.view
    }
}

/// Arena of directory nodes addressed by index.
///
/// Parent references are plain indices (lookup only, no ownership), so the
/// tree needs no interior mutability and no reference counting beyond the
/// shared rule views.
#[derive(Debug, Default)]
pub struct DirectoryArena {
    /// All nodes in creation order; the root is index 0 once pushed.
    nodes: Vec<DirectoryNode>,
}

impl DirectoryArena {
    /// Create an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push the root directory, deriving its view from the full rule list.
    /// Returns its arena index.
    pub fn push_root(&mut self, rules: &RuleList, dev: u64) -> usize {
        self.nodes.push(DirectoryNode {
            parent: None,
            depth: 0,
            dev,
            view: RuleView::root(rules),
        });
        self.nodes.len() - 1
    }

    /// Push a child directory below `parent`, deriving its view from the
    /// parent's. Returns its arena index.
    pub fn push_child(&mut self, rules: &RuleList, parent: usize, dev: u64) -> usize {
        let depth = self.nodes[parent].depth + 1;
        let view = self.nodes[parent].view.child(rules, depth);
        self.nodes.push(DirectoryNode {
            parent: Some(parent),
            depth,
            dev,
            view,
        });
        self.nodes.len() - 1
    }

    /// Look up a node by arena index.
    #[must_use]
    pub fn node(&self, index: usize) -> Option<&DirectoryNode> {
        self.nodes.get(index)
    }

    /// Number of nodes in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ignore::pattern::Rule;
    use crate::ignore::InsertPosition;

    fn list_of(texts: &[&str]) -> RuleList {
        let mut list = RuleList::new();
        let rules = texts.iter().map(|t| Rule::compile(t).unwrap()).collect();
        list.insert(rules, InsertPosition::End).unwrap();
        list
    }

    #[test]
    fn test_root_view_splits_by_depth() {
        let list = list_of(&["./a", "./a/b", "DEVICE:3", "./x/y/z"]);
        let view = RuleView::root(&list);
        assert_eq!(view.active(), &[0, 2]);
        assert_eq!(view.pending(), &[1, 3]);
    }

    #[test]
    fn test_child_gains_pending_rules_in_list_order() {
        let list = list_of(&["./a/b", "./c", "./a/d"]);
        let root = RuleView::root(&list);
        assert_eq!(root.active(), &[1]);

        let child = root.child(&list, 1);
        // Newly qualified rules interleave back into original order.
        assert_eq!(child.active(), &[0, 1, 2]);
        assert!(child.pending().is_empty());
    }

    #[test]
    fn test_child_shares_storage_when_nothing_qualifies() {
        let list = list_of(&["./a", "DEVICE:3"]);
        let root = RuleView::root(&list);
        let child = root.child(&list, 1);
        assert!(child.shares_active_with(&root));

        let grandchild = child.child(&list, 2);
        assert!(grandchild.shares_active_with(&root));
    }

    #[test]
    fn test_child_allocates_when_rules_qualify() {
        let list = list_of(&["./a", "./a/b/c"]);
        let root = RuleView::root(&list);
        let child = root.child(&list, 1);
        assert!(!child.shares_active_with(&root));
        assert_eq!(child.active(), &[0, 1]);
    }

    #[test]
    fn test_eligibility_is_monotone() {
        let list = list_of(&["./a/b"]);
        let root = RuleView::root(&list);
        let child = root.child(&list, 1);
        let grandchild = child.child(&list, 2);
        // Once active, a rule stays active further down.
        assert_eq!(grandchild.active(), &[0]);
        assert!(grandchild.shares_active_with(&child));
    }

    #[test]
    fn test_arena_parent_chain() {
        let list = list_of(&["./a"]);
        let mut arena = DirectoryArena::new();
        let root = arena.push_root(&list, 10);
        let child = arena.push_child(&list, root, 10);
        let grandchild = arena.push_child(&list, child, 20);

        let node = arena.node(grandchild).unwrap();
        assert_eq!(node.depth(), 2);
        assert_eq!(node.dev(), 20);
        assert_eq!(node.parent(), Some(child));
        assert_eq!(arena.node(child).unwrap().parent(), Some(root));
        assert_eq!(arena.node(root).unwrap().parent(), None);
    }
}
