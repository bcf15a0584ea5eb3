//! Node construction and statement-list editing helpers
//!
//! Everything here returns new nodes. Synthesized nodes carry no position and minimal trivia;
//! the caller decides where they go and what trivia they need.

use crate::types::SyntaxNode;

/// Kinds that never need parentheses when used as an operand
const ATOMIC_EXPRESSIONS: &[&str] = &[
    "identifier",
    "attribute",
    "call",
    "subscript",
    "string",
    "concatenated_string",
    "integer",
    "float",
    "true",
    "false",
    "none",
    "parenthesized_expression",
    "list",
    "tuple",
    "dictionary",
    "set",
    "list_comprehension",
    "dictionary_comprehension",
    "set_comprehension",
    "generator_expression",
];

/// Parents that bind tighter than any binary or unary operator
const TIGHT_PARENTS: &[&str] = &[
    "attribute",
    "subscript",
    "call",
    "binary_operator",
    "unary_operator",
    "await",
];

/// Constructors for synthesized nodes
pub struct NodeBuilder;

impl NodeBuilder {
    pub fn identifier(name: impl Into<String>) -> SyntaxNode {
        SyntaxNode::token("identifier", name)
    }

    /// `object.member`
    pub fn attribute(object: SyntaxNode, member: impl Into<String>) -> SyntaxNode {
        SyntaxNode::inner(
            "attribute",
            vec![
                object.with_leading("").with_field(Some("object")),
                SyntaxNode::anonymous("."),
                Self::identifier(member).with_field(Some("attribute")),
            ],
        )
    }

    /// `function(args...)`
    pub fn call(function: SyntaxNode, args: Vec<SyntaxNode>) -> SyntaxNode {
        SyntaxNode::inner(
            "call",
            vec![
                function.with_leading("").with_field(Some("function")),
                Self::argument_list(args).with_field(Some("arguments")),
            ],
        )
    }

    /// `(a, b, c)` with single-space separators
    ///
    /// Arguments lose their original leading trivia, so comments between arguments do not carry
    /// over.
    pub fn argument_list(args: Vec<SyntaxNode>) -> SyntaxNode {
        let mut children = vec![SyntaxNode::anonymous("(")];
        for (idx, arg) in args.into_iter().enumerate() {
            if idx > 0 {
                children.push(SyntaxNode::anonymous(","));
                children.push(arg.with_leading(" "));
            } else {
                children.push(arg.with_leading(""));
            }
        }
        children.push(SyntaxNode::anonymous(")"));
        SyntaxNode::inner("argument_list", children)
    }

    /// `left <op> right`
    pub fn binary_operator(left: SyntaxNode, operator: &'static str, right: SyntaxNode) -> SyntaxNode {
        SyntaxNode::inner(
            "binary_operator",
            vec![
                left.with_leading("").with_field(Some("left")),
                SyntaxNode::anonymous(operator)
                    .with_leading(" ")
                    .with_field(Some("operator")),
                right.with_leading(" ").with_field(Some("right")),
            ],
        )
    }

    /// `(expr)`
    pub fn parenthesized(expression: SyntaxNode) -> SyntaxNode {
        SyntaxNode::inner(
            "parenthesized_expression",
            vec![
                SyntaxNode::anonymous("("),
                expression.with_leading("").with_field(None),
                SyntaxNode::anonymous(")"),
            ],
        )
    }

    /// Wrap `expression` in parentheses unless it is already a primary or spans several lines
    pub fn operand(expression: SyntaxNode) -> SyntaxNode {
        let multiline = expression.text().contains('\n');
        if Self::is_atomic(&expression) && !multiline {
            expression
        } else {
            Self::parenthesized(expression)
        }
    }

    pub fn is_atomic(node: &SyntaxNode) -> bool {
        ATOMIC_EXPRESSIONS.contains(&node.kind())
    }

    /// Whether a non-primary expression placed under `parent_kind` must be parenthesized
    pub fn needs_grouping(parent_kind: &str) -> bool {
        TIGHT_PARENTS.contains(&parent_kind)
    }

    pub fn pass_statement() -> SyntaxNode {
        SyntaxNode::inner("pass_statement", vec![SyntaxNode::anonymous("pass")])
    }
}

/// Whether a child of a module or block is a statement, as opposed to a comment or `;`
pub fn is_statement(node: &SyntaxNode) -> bool {
    node.is_named() && node.kind() != "comment"
}

/// Remove the statement at `index` from a statement list
///
/// The removed statement's leading trivia moves to its successor so line structure is kept, and
/// an adjacent `;` separator goes with it.
pub fn remove_statement(children: &mut Vec<SyntaxNode>, index: usize) -> Option<SyntaxNode> {
    if index >= children.len() {
        return None;
    }
    let removed = children.remove(index);

    if children.get(index).is_some_and(|next| next.kind() == ";") {
        children.remove(index);
    } else if index > 0 && children.get(index - 1).is_some_and(|prev| prev.kind() == ";") {
        children.remove(index - 1);
        return Some(removed);
    }

    if let Some(next) = children.get_mut(index) {
        let leading = removed.leading().to_string();
        let taken = std::mem::replace(next, SyntaxNode::anonymous(""));
        *next = taken.with_leading(leading);
    }
    Some(removed)
}

/// Insert statements at `index`, one per line, at the given indentation
///
/// Inserting at the very start of a module keeps the file's first line where it was and pushes
/// the old first statement onto the next line.
pub fn insert_statements(
    children: &mut Vec<SyntaxNode>,
    index: usize,
    statements: Vec<SyntaxNode>,
    indent: &str,
) {
    let index = index.min(children.len());
    let line_start = format!("\n{}", indent);
    let mut prepared: Vec<SyntaxNode> = statements
        .into_iter()
        .map(|stmt| stmt.reindent(indent).with_leading(line_start.clone()))
        .collect();
    if prepared.is_empty() {
        return;
    }

    if index == 0 && !children.first().is_some_and(|first| first.leading().contains('\n')) {
        let file_start = children
            .first()
            .map(|first| first.leading().to_string())
            .unwrap_or_default();
        if let Some(first) = prepared.first_mut() {
            let taken = std::mem::replace(first, SyntaxNode::anonymous(""));
            *first = taken.with_leading(file_start);
        }
        if let Some(old_first) = children.first_mut() {
            let taken = std::mem::replace(old_first, SyntaxNode::anonymous(""));
            *old_first = taken.with_leading(line_start.clone());
        }
    }

    children.splice(index..index, prepared);
}
