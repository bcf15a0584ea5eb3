//! Python statement helpers shared by the rewrite engines

use recast_parsers::SyntaxNode;

/// Name of a function or class definition, looking through decorators
pub fn definition_name(node: &SyntaxNode) -> Option<&str> {
    match node.kind() {
        "function_definition" | "class_definition" => {
            node.child_by_field("name").and_then(SyntaxNode::token_text)
        }
        "decorated_definition" => node.child_by_field("definition").and_then(definition_name),
        _ => None,
    }
}

pub fn is_definition(node: &SyntaxNode) -> bool {
    matches!(
        node.kind(),
        "function_definition" | "class_definition" | "decorated_definition"
    )
}

pub fn is_docstring(node: &SyntaxNode) -> bool {
    node.kind() == "expression_statement"
        && node.children().len() == 1
        && matches!(node.children()[0].kind(), "string" | "concatenated_string")
}

pub fn is_import(node: &SyntaxNode) -> bool {
    matches!(
        node.kind(),
        "import_statement" | "import_from_statement" | "future_import_statement"
    )
}

/// Index just past the module prologue
///
/// The prologue is the leading comment block (shebang, encoding, license), the module docstring
/// and any `from __future__` imports. Nothing may be inserted above it.
pub fn prologue_end(children: &[SyntaxNode]) -> usize {
    let mut idx = 0;
    while children.get(idx).is_some_and(|c| c.kind() == "comment") {
        idx += 1;
    }
    let mut end = idx;

    if children.get(idx).is_some_and(is_docstring) {
        idx += 1;
        end = idx;
    }

    loop {
        let mut after = idx;
        while children.get(after).is_some_and(|c| c.kind() == "comment") {
            after += 1;
        }
        if children
            .get(after)
            .is_some_and(|c| c.kind() == "future_import_statement")
        {
            idx = after + 1;
            end = idx;
        } else {
            break;
        }
    }
    end
}

/// The symbol a statement is about: the defined name, the called function or the assigned target
pub fn primary_symbol(statement: &SyntaxNode) -> Option<String> {
    if let Some(name) = definition_name(statement) {
        return Some(name.to_string());
    }
    if statement.kind() != "expression_statement" {
        return None;
    }
    let expression = statement.children().first()?;
    match expression.kind() {
        "call" => expression.child_by_field("function").map(SyntaxNode::text),
        "assignment" | "augmented_assignment" => {
            expression.child_by_field("left").map(SyntaxNode::text)
        }
        _ => None,
    }
}
