//! # Recast Parsers
//!
//! Python parsing into lossless, owned syntax trees and validated code generation.
//!
//! ## Features
//!
//! - **Lossless trees**: every token keeps its leading trivia, so `generate(parse(s)) == s`
//! - **Structured failures**: syntax errors report a 1-based line and column
//! - **Validated generation**: generated text can be re-parsed before it is trusted
//! - **Traversal and construction helpers** for rewrite engines built on top

pub mod builder;
pub mod error;
pub mod generator;
pub mod parser;
pub mod traversal;
pub mod types;

pub use builder::{insert_statements, is_statement, remove_statement, NodeBuilder};
pub use error::{Diagnostic, ParseError, ParserError, ParserResult, Severity};
pub use generator::CodeGenerator;
pub use parser::{dedent, PythonParser};
pub use traversal::{NodeVisitor, TraversalUtils, TreeWalker, VisitAction};
pub use types::{Position, Range, SyntaxNode, SyntaxTree};
