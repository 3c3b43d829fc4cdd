//! Java language support for classmap.
//!
//! - [`grammar`]: tree-sitter Java grammar behind [`GrammarParser`](classmap_core::syntax::GrammarParser)
//! - [`extract`]: [`JavaExaminer`], the Java [`Examiner`](classmap_core::examiner::Examiner)
//! - [`kinds`]: node tags the examiner queries

pub mod extract;
pub mod grammar;
pub mod kinds;

pub use extract::JavaExaminer;
pub use grammar::{JavaGrammar, TreeSitterJavaParser};
