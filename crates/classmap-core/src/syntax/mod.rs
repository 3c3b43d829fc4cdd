//! Syntax tree arena and query algebra.
//!
//! A [`SyntaxTree`] is the read-only, labeled, ordered tree a grammar parser
//! hands to an extractor. Nodes live in a flat arena and refer to each other by
//! [`NodeId`]; the parent link is an index, so ownership flows strictly from
//! the tree to its nodes.
//!
//! Extractors navigate the tree through two types:
//! - [`Node`]: a borrowed handle to one node with the query operations
//!   (`matches`, `children_of_field`, `immediate_matches`, `search`,
//!   `nearest_enclosing`, and the `field` sugar)
//! - [`Nodes`]: an ordered collection of handles that broadcasts the same
//!   queries across its elements and flattens the results
//!
//! # Example
//!
//! ```
//! use classmap_core::syntax::SyntaxTreeBuilder;
//!
//! let source = "package test;";
//! let mut builder = SyntaxTreeBuilder::new(source.as_bytes());
//! builder.start_node("program", 0);
//! builder.start_node("package_declaration", 0);
//! builder.leaf("package", 0, 7);
//! builder.leaf("identifier", 8, 12);
//! builder.finish_node(13);
//! builder.finish_node(13);
//! let tree = builder.finish().unwrap();
//!
//! let name = tree.root().field("package").field("identifier").first().unwrap();
//! assert_eq!(name.value(), Some("test"));
//! ```

mod node;
mod nodes;

pub use node::{Node, Search};
pub use nodes::Nodes;

use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors produced while turning source bytes into a [`SyntaxTree`].
#[derive(Debug, Error)]
pub enum ParseError {
    /// The grammar could not be loaded or configured.
    #[error("grammar error: {0}")]
    Grammar(String),

    /// The parser gave up without producing a tree.
    #[error("parser produced no tree")]
    NoTree,

    /// The tree under construction violated a structural invariant.
    #[error("malformed syntax tree: {0}")]
    Malformed(String),
}

// ============================================================================
// Grammar Parser Seam
// ============================================================================

/// A grammar parser: source bytes in, labeled syntax tree out.
///
/// Implementations own whatever parser state the grammar needs; the returned
/// tree carries a copy of the source so node text can be recovered later.
pub trait GrammarParser {
    /// Parse `source` into a syntax tree.
    fn parse(&mut self, source: &[u8]) -> Result<SyntaxTree, ParseError>;
}

// ============================================================================
// Arena
// ============================================================================

/// Index of a node within its [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node_{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: String,
    value: Option<String>,
    children: Vec<NodeId>,
    start: usize,
    end: usize,
    parent: Option<NodeId>,
}

/// A parsed source file: node arena plus the original byte buffer.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Vec<NodeData>,
    source: Vec<u8>,
}

impl SyntaxTree {
    /// The root node. The builder guarantees a tree has at least one node.
    pub fn root(&self) -> Node<'_> {
        Node::new(self, NodeId(0))
    }

    /// Handle for an arbitrary node, or `None` if the id is out of range.
    pub fn node(&self, id: NodeId) -> Option<Node<'_>> {
        (id.index() < self.nodes.len()).then(|| Node::new(self, id))
    }

    /// The source buffer the tree was parsed from.
    pub fn source(&self) -> &[u8] {
        &self.source
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A finished tree always has a root, so this is only true for
    /// trees that failed to build.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Incremental builder for [`SyntaxTree`].
///
/// Nodes are opened with [`start_node`](Self::start_node) and closed with
/// [`finish_node`](Self::finish_node); [`leaf`](Self::leaf) adds a complete
/// terminal. An opened node that receives no children is closed as a leaf and
/// takes its source text as its value, so leaf ⟺ no children holds for every
/// finished tree.
#[derive(Debug)]
pub struct SyntaxTreeBuilder {
    nodes: Vec<NodeData>,
    source: Vec<u8>,
    open: Vec<NodeId>,
    detached: usize,
}

impl SyntaxTreeBuilder {
    /// Create a builder over a copy of `source`.
    pub fn new(source: &[u8]) -> Self {
        SyntaxTreeBuilder {
            nodes: Vec::new(),
            source: source.to_vec(),
            open: Vec::new(),
            detached: 0,
        }
    }

    /// Open an inner node starting at byte `start`.
    pub fn start_node(&mut self, kind: impl Into<String>, start: usize) {
        let id = self.push(kind.into(), None, start, start);
        self.open.push(id);
    }

    /// Close the most recently opened node at byte `end`.
    ///
    /// Closing with nothing open is ignored; `finish` reports the imbalance.
    pub fn finish_node(&mut self, end: usize) {
        let Some(id) = self.open.pop() else {
            return;
        };
        let text = self.slice(self.nodes[id.index()].start, end);
        let data = &mut self.nodes[id.index()];
        data.end = end;
        if data.children.is_empty() {
            data.value = Some(text);
        }
    }

    /// Add a terminal whose value is the source text at `start..end`.
    pub fn leaf(&mut self, kind: impl Into<String>, start: usize, end: usize) {
        let value = self.slice(start, end);
        self.push(kind.into(), Some(value), start, end);
    }

    /// Add a terminal with an explicit value.
    pub fn leaf_with_value(
        &mut self,
        kind: impl Into<String>,
        value: impl Into<String>,
        start: usize,
        end: usize,
    ) {
        self.push(kind.into(), Some(value.into()), start, end);
    }

    /// Finish the tree. Rejects an empty or unbalanced tree, and any node
    /// added outside the root.
    pub fn finish(self) -> Result<SyntaxTree, ParseError> {
        if self.nodes.is_empty() {
            return Err(ParseError::Malformed("tree has no nodes".to_string()));
        }
        if !self.open.is_empty() {
            return Err(ParseError::Malformed(format!(
                "{} node(s) left open",
                self.open.len()
            )));
        }
        if self.detached > 0 {
            return Err(ParseError::Malformed(format!(
                "{} node(s) added outside the root",
                self.detached
            )));
        }
        Ok(SyntaxTree {
            nodes: self.nodes,
            source: self.source,
        })
    }

    fn push(&mut self, kind: String, value: Option<String>, start: usize, end: usize) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let parent = self.open.last().copied();
        // Node 0 is the root; anything else without a parent is unreachable.
        if parent.is_none() && !self.nodes.is_empty() {
            tracing::debug!(kind = %kind, "syntax node added outside the root");
            self.detached += 1;
        }
        self.nodes.push(NodeData {
            kind,
            value,
            children: Vec::new(),
            start,
            end,
            parent,
        });
        if let Some(parent) = parent {
            self.nodes[parent.index()].children.push(id);
        }
        id
    }

    fn slice(&self, start: usize, end: usize) -> String {
        self.source
            .get(start..end)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .unwrap_or_default()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_builder_is_malformed() {
        let builder = SyntaxTreeBuilder::new(b"");
        assert!(matches!(builder.finish(), Err(ParseError::Malformed(_))));
    }

    #[test]
    fn unclosed_node_is_malformed() {
        let mut builder = SyntaxTreeBuilder::new(b"x");
        builder.start_node("program", 0);
        builder.leaf("identifier", 0, 1);
        assert!(matches!(builder.finish(), Err(ParseError::Malformed(_))));
    }

    #[test]
    fn node_after_closed_root_is_malformed() {
        let mut builder = SyntaxTreeBuilder::new(b"a b");
        builder.start_node("program", 0);
        builder.leaf("identifier", 0, 1);
        builder.finish_node(1);
        builder.leaf("identifier", 2, 3);
        let err = builder.finish().unwrap_err();
        assert!(matches!(err, ParseError::Malformed(ref msg) if msg.contains("outside the root")));
    }

    #[test]
    fn second_root_leaf_is_malformed() {
        let mut builder = SyntaxTreeBuilder::new(b"ab");
        builder.leaf("program", 0, 1);
        builder.leaf("program", 1, 2);
        assert!(matches!(builder.finish(), Err(ParseError::Malformed(_))));
    }

    #[test]
    fn childless_node_becomes_leaf_with_text() {
        let mut builder = SyntaxTreeBuilder::new(b"class Foo");
        builder.start_node("program", 0);
        builder.start_node("identifier", 6);
        builder.finish_node(9);
        builder.finish_node(9);
        let tree = builder.finish().unwrap();

        let ident = tree.root().children().first().unwrap();
        assert!(ident.is_leaf());
        assert_eq!(ident.value(), Some("Foo"));
        assert_eq!(tree.root().value(), None);
    }

    #[test]
    fn node_lookup_out_of_range_is_none() {
        let mut builder = SyntaxTreeBuilder::new(b"");
        builder.leaf("program", 0, 0);
        let tree = builder.finish().unwrap();
        assert!(tree.node(NodeId(0)).is_some());
        assert!(tree.node(NodeId(1)).is_none());
        assert_eq!(tree.len(), 1);
    }
}
