//! Source regeneration from syntax trees

use crate::error::ParserResult;
use crate::parser::PythonParser;
use crate::types::SyntaxTree;

/// Turns a [`SyntaxTree`] back into source text
///
/// Generation is a plain in-order concatenation of every token with its leading trivia, so an
/// untouched tree reproduces its source byte for byte and two generations of the same tree are
/// always identical.
#[derive(Clone, Default)]
pub struct CodeGenerator {
    parser: PythonParser,
}

impl CodeGenerator {
    pub fn new() -> Self {
        Self {
            parser: PythonParser::new(),
        }
    }

    pub fn generate(&self, tree: &SyntaxTree) -> String {
        let mut out = String::new();
        tree.root().write_source(&mut out);
        out.push_str(tree.trailing());
        out
    }

    /// Generate source and confirm it re-parses
    pub fn generate_validated(&self, tree: &SyntaxTree) -> ParserResult<String> {
        let text = self.generate(tree);
        self.parser.check(&text)?;
        Ok(text)
    }
}
