//! Borrowed node handle and its query operations.

use std::borrow::Cow;
use std::fmt;

use super::{NodeId, Nodes, SyntaxTree};

/// A read-only handle to one node of a [`SyntaxTree`].
///
/// Handles are `Copy` and cheap; every query returns new handles into the same
/// tree. Tag matching comes in two flavors:
/// - **exact**: [`children_of_field`](Self::children_of_field) compares the
///   tag for equality
/// - **contains**: [`matches`](Self::matches) and everything built on it treat
///   the term as a substring, so `"declaration"` selects a whole family of tags
#[derive(Clone, Copy)]
pub struct Node<'t> {
    tree: &'t SyntaxTree,
    id: NodeId,
}

impl<'t> Node<'t> {
    pub(super) fn new(tree: &'t SyntaxTree, id: NodeId) -> Self {
        Node { tree, id }
    }

    /// Arena index of this node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The tree this node belongs to.
    pub fn tree(&self) -> &'t SyntaxTree {
        self.tree
    }

    /// The node's type tag.
    pub fn kind(&self) -> &'t str {
        &self.tree.data(self.id).kind
    }

    /// Literal value; only leaves carry one.
    pub fn value(&self) -> Option<&'t str> {
        self.tree.data(self.id).value.as_deref()
    }

    /// True if the node has no children.
    pub fn is_leaf(&self) -> bool {
        self.tree.data(self.id).children.is_empty()
    }

    /// Start byte offset (inclusive).
    pub fn start_byte(&self) -> usize {
        self.tree.data(self.id).start
    }

    /// End byte offset (exclusive).
    pub fn end_byte(&self) -> usize {
        self.tree.data(self.id).end
    }

    /// Parent node; `None` for the root.
    pub fn parent(&self) -> Option<Node<'t>> {
        self.tree
            .data(self.id)
            .parent
            .map(|id| Node::new(self.tree, id))
    }

    /// Immediate children in order.
    pub fn children(&self) -> Nodes<'t> {
        self.child_nodes().collect()
    }

    /// Source text covered by this node, decoded as UTF-8 (lossy).
    pub fn text(&self) -> Cow<'t, str> {
        let data = self.tree.data(self.id);
        self.tree
            .source
            .get(data.start..data.end)
            .map(String::from_utf8_lossy)
            .unwrap_or(Cow::Borrowed(""))
    }

    /// True if the tag contains `term`.
    pub fn matches(&self, term: &str) -> bool {
        self.kind().contains(term)
    }

    /// Immediate children whose tag equals `name` exactly.
    pub fn children_of_field(&self, name: &str) -> Nodes<'t> {
        self.child_nodes().filter(|c| c.kind() == name).collect()
    }

    /// Immediate children whose tag contains `term`.
    pub fn immediate_matches(&self, term: &str) -> Nodes<'t> {
        self.child_nodes().filter(|c| c.matches(term)).collect()
    }

    /// Named-field sugar for dotted traversal; same as
    /// [`immediate_matches`](Self::immediate_matches).
    pub fn field(&self, name: &str) -> Nodes<'t> {
        self.immediate_matches(name)
    }

    /// Pre-order search that stops descending at the first match on each path.
    ///
    /// A matching node is yielded and its subtree skipped; a non-matching node
    /// is replaced by a search of its children. The iterator is lazy and each
    /// call starts a fresh traversal.
    pub fn search<'q>(&self, term: &'q str) -> Search<'t, 'q> {
        Search {
            tree: self.tree,
            term,
            stack: vec![self.id],
        }
    }

    /// Nearest strict ancestor whose tag contains `term`.
    pub fn nearest_enclosing(&self, term: &str) -> Option<Node<'t>> {
        let mut current = self.parent();
        while let Some(node) = current {
            if node.matches(term) {
                return Some(node);
            }
            current = node.parent();
        }
        None
    }

    fn child_nodes(&self) -> impl Iterator<Item = Node<'t>> + 't {
        let tree = self.tree;
        tree.data(self.id)
            .children
            .iter()
            .map(move |&id| Node::new(tree, id))
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for Node<'_> {}

impl fmt::Debug for Node<'_> {
    /// Leaves render as `kind value`; inner nodes as `kind (a:1, b:2)` with
    /// consecutive runs of the same child kind counted together.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_leaf() {
            return write!(f, "{} {}", self.kind(), self.value().unwrap_or(""));
        }
        let mut runs: Vec<(&str, usize)> = Vec::new();
        for child in self.child_nodes() {
            match runs.last_mut() {
                Some((kind, count)) if *kind == child.kind() => *count += 1,
                _ => runs.push((child.kind(), 1)),
            }
        }
        let counts: Vec<String> = runs
            .iter()
            .map(|(kind, count)| format!("{}:{}", kind, count))
            .collect();
        write!(f, "{} ({})", self.kind(), counts.join(", "))
    }
}

/// Lazy iterator returned by [`Node::search`].
#[derive(Debug, Clone)]
pub struct Search<'t, 'q> {
    tree: &'t SyntaxTree,
    term: &'q str,
    stack: Vec<NodeId>,
}

impl<'t> Iterator for Search<'t, '_> {
    type Item = Node<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            let node = Node::new(self.tree, id);
            if node.matches(self.term) {
                return Some(node);
            }
            self.stack
                .extend(self.tree.data(id).children.iter().rev().copied());
        }
        None
    }
}

// ============================================================================
// Tests
// ============================================================================
