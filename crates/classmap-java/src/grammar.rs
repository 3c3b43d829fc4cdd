//! Java grammar adapter.
//!
//! Wraps the tree-sitter Java grammar behind [`GrammarParser`] and converts
//! the concrete tree into a [`SyntaxTree`]. Named nodes are kept, as are
//! keyword tokens (`public`, `static`, `int`); punctuation and comments are
//! dropped.

use classmap_core::syntax::{GrammarParser, ParseError, SyntaxTree, SyntaxTreeBuilder};
use once_cell::sync::Lazy;
use tracing::debug;
use tree_sitter::{Language, Parser, TreeCursor};

use crate::kinds::is_keyword_token;

static JAVA: Lazy<JavaGrammar> = Lazy::new(|| JavaGrammar {
    language: tree_sitter_java::LANGUAGE.into(),
});

/// The loaded Java grammar, shared process-wide.
pub struct JavaGrammar {
    language: Language,
}

impl JavaGrammar {
    pub fn shared() -> &'static JavaGrammar {
        &JAVA
    }

    pub fn language(&self) -> &Language {
        &self.language
    }
}

/// A Java parser producing [`SyntaxTree`]s.
///
/// Holds a tree-sitter parser, which is not shareable across threads; create
/// one per worker.
pub struct TreeSitterJavaParser {
    parser: Parser,
}

impl TreeSitterJavaParser {
    pub fn new(grammar: &JavaGrammar) -> Result<Self, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(grammar.language())
            .map_err(|e| ParseError::Grammar(e.to_string()))?;
        Ok(TreeSitterJavaParser { parser })
    }
}

impl GrammarParser for TreeSitterJavaParser {
    fn parse(&mut self, source: &[u8]) -> Result<SyntaxTree, ParseError> {
        let tree = self.parser.parse(source, None).ok_or(ParseError::NoTree)?;
        let root = tree.root_node();
        if root.has_error() {
            debug!("java source contains syntax errors; extraction may be partial");
        }

        let mut builder = SyntaxTreeBuilder::new(source);
        convert(root, source, &mut builder);
        builder.finish()
    }
}

/// Pre-order walk with a cursor; nesting depth costs heap, not stack.
fn convert(root: tree_sitter::Node<'_>, source: &[u8], builder: &mut SyntaxTreeBuilder) {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.child_count() == 0 {
            builder.leaf(node.kind(), node.start_byte(), node.end_byte());
        } else {
            builder.start_node(node.kind(), node.start_byte());
            if cursor.goto_first_child() && keep(&cursor.node(), source) {
                continue;
            }
        }
        // Close every node whose children are exhausted.
        while !next_kept_sibling(&mut cursor, source) {
            if !cursor.goto_parent() {
                return;
            }
            builder.finish_node(cursor.node().end_byte());
        }
    }
}

fn next_kept_sibling(cursor: &mut TreeCursor<'_>, source: &[u8]) -> bool {
    while cursor.goto_next_sibling() {
        if keep(&cursor.node(), source) {
            return true;
        }
    }
    false
}

fn keep(node: &tree_sitter::Node<'_>, source: &[u8]) -> bool {
    if node.is_extra() {
        return false;
    }
    if node.is_named() {
        return true;
    }
    source
        .get(node.start_byte()..node.end_byte())
        .and_then(|bytes| std::str::from_utf8(bytes).ok())
        .is_some_and(is_keyword_token)
}
