//! Ordered node collections with broadcast queries.

use std::borrow::Cow;

use super::Node;

/// An ordered, possibly empty collection of node handles.
///
/// The three shapes make the broadcast rule explicit:
/// - `One`: queries delegate straight to the element, so a chain over a
///   singleton reads like a chain over a node
/// - `Empty` / `Many`: queries run per element and the resulting collections
///   are concatenated in order
///
/// This lets a dotted chain such as `root.field("a").field("b")` fan out over
/// repeated grammar constructs without the caller checking arity.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Nodes<'t> {
    /// No nodes.
    #[default]
    Empty,
    /// Exactly one node.
    One(Node<'t>),
    /// Zero, two, or more nodes. Zero only arises from `Many(vec![])`
    /// constructed by hand; the collection methods normalize to `Empty`.
    Many(Vec<Node<'t>>),
}

impl<'t> Nodes<'t> {
    /// Build a collection from a vector, choosing the tightest shape.
    pub fn from_vec(mut nodes: Vec<Node<'t>>) -> Self {
        match nodes.len() {
            0 => Nodes::Empty,
            1 => Nodes::One(nodes.remove(0)),
            _ => Nodes::Many(nodes),
        }
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        match self {
            Nodes::Empty => 0,
            Nodes::One(_) => 1,
            Nodes::Many(nodes) => nodes.len(),
        }
    }

    /// True if there are no nodes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Node at `index`, if present.
    pub fn get(&self, index: usize) -> Option<Node<'t>> {
        match self {
            Nodes::Empty => None,
            Nodes::One(node) => (index == 0).then_some(*node),
            Nodes::Many(nodes) => nodes.get(index).copied(),
        }
    }

    /// First node, if any.
    pub fn first(&self) -> Option<Node<'t>> {
        self.get(0)
    }

    /// The node of a singleton collection; `None` for any other size.
    pub fn single(&self) -> Option<Node<'t>> {
        match self {
            Nodes::One(node) => Some(*node),
            Nodes::Many(nodes) if nodes.len() == 1 => Some(nodes[0]),
            _ => None,
        }
    }

    /// Iterate over the nodes in order.
    pub fn iter(&self) -> impl Iterator<Item = Node<'t>> + '_ {
        let slice: &[Node<'t>] = match self {
            Nodes::Empty => &[],
            Nodes::One(node) => std::slice::from_ref(node),
            Nodes::Many(nodes) => nodes,
        };
        slice.iter().copied()
    }

    /// Concatenate two collections, preserving order.
    pub fn concat(self, other: Nodes<'t>) -> Nodes<'t> {
        let mut nodes = self.into_vec();
        nodes.extend(other.into_vec());
        Nodes::from_vec(nodes)
    }

    /// Append a single node.
    pub fn push(self, node: Node<'t>) -> Nodes<'t> {
        self.concat(Nodes::One(node))
    }

    /// Apply `f` to each node, keeping order.
    pub fn map<T>(&self, f: impl FnMut(Node<'t>) -> T) -> Vec<T> {
        self.iter().map(f).collect()
    }

    /// Apply `f` to each node and flatten the resulting collections in order.
    pub fn flat_map(&self, mut f: impl FnMut(Node<'t>) -> Nodes<'t>) -> Nodes<'t> {
        self.iter()
            .fold(Nodes::Empty, |acc, node| acc.concat(f(node)))
    }

    /// Broadcast [`Node::field`].
    pub fn field(&self, name: &str) -> Nodes<'t> {
        self.broadcast(|node| node.field(name))
    }

    /// Broadcast [`Node::children_of_field`].
    pub fn children_of_field(&self, name: &str) -> Nodes<'t> {
        self.broadcast(|node| node.children_of_field(name))
    }

    /// Broadcast [`Node::immediate_matches`].
    pub fn immediate_matches(&self, term: &str) -> Nodes<'t> {
        self.broadcast(|node| node.immediate_matches(term))
    }

    /// Broadcast [`Node::search`], collecting each element's results.
    pub fn search(&self, term: &str) -> Nodes<'t> {
        self.broadcast(|node| node.search(term).collect())
    }

    /// Broadcast [`Node::children`].
    pub fn children(&self) -> Nodes<'t> {
        self.broadcast(|node| node.children())
    }

    /// Source text of each node, in order.
    pub fn texts(&self) -> Vec<Cow<'t, str>> {
        self.map(|node| node.text())
    }

    fn broadcast(&self, mut f: impl FnMut(Node<'t>) -> Nodes<'t>) -> Nodes<'t> {
        match self {
            Nodes::One(node) => f(*node),
            _ => self.flat_map(f),
        }
    }

    fn into_vec(self) -> Vec<Node<'t>> {
        match self {
            Nodes::Empty => Vec::new(),
            Nodes::One(node) => vec![node],
            Nodes::Many(nodes) => nodes,
        }
    }
}

impl<'t> FromIterator<Node<'t>> for Nodes<'t> {
    fn from_iter<I: IntoIterator<Item = Node<'t>>>(iter: I) -> Self {
        Nodes::from_vec(iter.into_iter().collect())
    }
}

impl<'t> IntoIterator for Nodes<'t> {
    type Item = Node<'t>;
    type IntoIter = std::vec::IntoIter<Node<'t>>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_vec().into_iter()
    }
}

impl<'t> From<Node<'t>> for Nodes<'t> {
    fn from(node: Node<'t>) -> Self {
        Nodes::One(node)
    }
}

// ============================================================================
// Tests
// ============================================================================
