//! Python parsing on top of tree-sitter
//!
//! The tree-sitter tree is converted into an owned [`SyntaxTree`] right away so later stages never
//! borrow from the parser. A source with any ERROR or MISSING node is rejected as a whole.

use crate::error::{ParseError, ParserError, ParserResult};
use crate::types::{Position, SyntaxNode, SyntaxTree};
use tracing::trace;
use tree_sitter::{Node, Parser, Tree, TreeCursor};

/// Node kinds kept as a single token even though tree-sitter gives them children
const ATOMIC_KINDS: &[&str] = &["string"];

/// Node kinds that stay interior nodes when empty
const CONTAINER_KINDS: &[&str] = &["module", "block"];

/// Parser for Python source text
#[derive(Clone)]
pub struct PythonParser {
    language: tree_sitter::Language,
}

impl PythonParser {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_python::LANGUAGE.into(),
        }
    }

    /// Parse a complete source file
    pub fn parse(&self, source: &str) -> ParserResult<SyntaxTree> {
        let tree = self.parse_raw(source)?;
        let root = tree.root_node();
        if root.has_error() {
            let err = locate_error(root, source);
            trace!(line = err.line, column = err.column, "rejected source with syntax errors");
            return Err(ParserError::Syntax(err));
        }

        let mut cursor = root.walk();
        let mut offset = 0;
        let node = build_node(&mut cursor, source, &mut offset);
        let trailing = source.get(offset..).unwrap_or_default().to_string();
        Ok(SyntaxTree::new(node, trailing))
    }

    /// Parse a standalone code fragment into top-level statements
    ///
    /// The fragment is dedented first, so snippets copied from inside a block parse cleanly.
    pub fn parse_statements(&self, fragment: &str) -> ParserResult<Vec<SyntaxNode>> {
        let dedented = dedent(fragment);
        let (root, _) = self.parse(&dedented)?.into_parts();
        Ok(root.into_children())
    }

    /// Check that a source text parses without errors
    pub fn check(&self, source: &str) -> ParserResult<()> {
        let tree = self.parse_raw(source)?;
        let root = tree.root_node();
        if root.has_error() {
            return Err(ParserError::Syntax(locate_error(root, source)));
        }
        Ok(())
    }

    fn parse_raw(&self, source: &str) -> ParserResult<Tree> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| ParserError::TreeSitterError {
                message: e.to_string(),
            })?;
        parser
            .parse(source, None)
            .ok_or_else(|| ParserError::TreeSitterError {
                message: "failed to parse source".to_string(),
            })
    }
}

impl Default for PythonParser {
    fn default() -> Self {
        Self::new()
    }
}

fn build_node(cursor: &mut TreeCursor<'_>, source: &str, offset: &mut usize) -> SyntaxNode {
    let node = cursor.node();
    let field = cursor.field_name();
    let start = node.start_position();
    let position = Position::new(start.row, start.column);
    let kind = node.kind();

    let is_leaf = node.child_count() == 0 && !CONTAINER_KINDS.contains(&kind);
    if is_leaf || ATOMIC_KINDS.contains(&kind) {
        let begin = node.start_byte().max(*offset);
        let end = node.end_byte().max(begin);
        let leading = source.get(*offset..begin).unwrap_or_default().to_string();
        let text = source.get(begin..end).unwrap_or_default().to_string();
        *offset = end;
        return SyntaxNode::parsed_token(kind, node.is_named(), position, leading, text)
            .with_field(field);
    }

    let mut children = Vec::with_capacity(node.child_count());
    if cursor.goto_first_child() {
        loop {
            children.push(build_node(cursor, source, offset));
            if !cursor.goto_next_sibling() {
                break;
            }
        }
        cursor.goto_parent();
    }
    SyntaxNode::parsed_inner(kind, node.is_named(), position, children).with_field(field)
}

fn first_error_node(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = first_error_node(child) {
            return Some(found);
        }
    }
    None
}

fn locate_error(root: Node<'_>, source: &str) -> ParseError {
    let Some(node) = first_error_node(root) else {
        return ParseError::new(1, 1, "invalid syntax");
    };
    let point = node.start_position();
    let message = if node.is_missing() {
        format!("missing `{}`", node.kind())
    } else {
        let snippet: String = source
            .get(node.start_byte()..node.end_byte())
            .unwrap_or_default()
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .chars()
            .take(24)
            .collect();
        if snippet.is_empty() {
            "invalid syntax".to_string()
        } else {
            format!("invalid syntax near `{}`", snippet)
        }
    };
    ParseError::new(point.row + 1, point.column + 1, message)
}

/// Remove the whitespace prefix shared by every non-blank line
pub fn dedent(text: &str) -> String {
    let prefix_len = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);
    if prefix_len == 0 {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        if line.trim().is_empty() {
            out.push_str(line.trim_start_matches([' ', '\t']));
        } else {
            out.push_str(&line[prefix_len..]);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::CodeGenerator;

    #[test]
    fn test_parse_keeps_every_byte() -> ParserResult<()> {
        let source = "import os\n\n# helper\ndef f(a, b=2):  # trailing\n    return a + b\n\n\nprint(f(1))\n";
        let tree = PythonParser::new().parse(source)?;
        assert_eq!(CodeGenerator::new().generate(&tree), source);
        assert_eq!(tree.trailing(), "\n");
        Ok(())
    }

    #[test]
    fn test_strings_collapse_to_one_token() -> ParserResult<()> {
        let tree = PythonParser::new().parse("s = f\"a{b}c\"\n")?;
        let assignment = &tree.statements()[0].children()[0];
        let right = assignment.child_by_field("right").map(|n| (n.kind(), n.token_text()));
        assert_eq!(right, Some(("string", Some("f\"a{b}c\""))));
        Ok(())
    }

    #[test]
    fn test_field_names_are_recorded() -> ParserResult<()> {
        let tree = PythonParser::new().parse("os.path.join(a, b)\n")?;
        let call = &tree.statements()[0].children()[0];
        assert_eq!(call.kind(), "call");
        assert_eq!(call.child_by_field("function").map(|n| n.text()), Some("os.path.join".to_string()));
        assert_eq!(call.child_by_field("arguments").map(|n| n.kind()), Some("argument_list"));
        Ok(())
    }

    #[test]
    fn test_syntax_error_is_located() {
        let err = PythonParser::new()
            .parse("x = 1\ndef broken(:\n    pass\n")
            .expect_err("source is malformed");
        let parse_error = err.parse_error().cloned().expect("syntax error expected");
        assert!(parse_error.line >= 2);
        assert!(!parse_error.message.is_empty());
    }

    #[test]
    fn test_empty_source_has_module_root() -> ParserResult<()> {
        let tree = PythonParser::new().parse("")?;
        assert_eq!(tree.root().kind(), "module");
        assert!(!tree.root().is_token());
        assert!(tree.statements().is_empty());
        Ok(())
    }

    #[test]
    fn test_parse_statements_dedents_fragment() -> ParserResult<()> {
        let statements = PythonParser::new().parse_statements("    a = 1\n    if a:\n        b = 2\n")?;
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[1].kind(), "if_statement");
        Ok(())
    }

    #[test]
    fn test_dedent() {
        assert_eq!(dedent("  a\n\n    b\n"), "a\n\n  b\n");
        assert_eq!(dedent("a\n  b"), "a\n  b");
    }
}
