//! Scope-aware recipe rewriter
//!
//! Walks the tree depth-first with an explicit [`ScopeStack`]. Entering a function or class
//! pushes its name before its header is visited; leaving it pops. Inside every statement list the
//! work happens in a fixed order: deletions, then insertions, then substitution over the
//! resulting statements (inserted code included).
//!
//! Substitution is first-match-wins: for each literal or referencing identifier, the recipe's
//! substitutions are tried in order and the first one whose target matches and whose scope is
//! `global` or the innermost scope is applied. No later instruction sees that node again.
//! When that replacement cannot stand where the node is (a number in place of a name), the node
//! is left alone with a warning.
//!
//! Expressions interpolated into f-strings are parsed on their own and rewritten like any other
//! code, except that string literals inside them are never replaced.

mod fstring;
pub mod scope;

pub use scope::ScopeStack;

use crate::error::EngineError;
use crate::providers::Rewrite;
use crate::recipe::{InsertPosition, Instruction, InstructionKind, Recipe};
use crate::syntax::{definition_name, is_definition, primary_symbol, prologue_end};
use recast_parsers::{
    insert_statements, is_statement, remove_statement, Diagnostic, NodeBuilder, PythonParser,
    SyntaxNode, SyntaxTree,
};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Statements whose names are declarations, never references
const OPAQUE_STATEMENTS: &[&str] = &[
    "import_statement",
    "import_from_statement",
    "future_import_statement",
    "global_statement",
    "nonlocal_statement",
];

/// Nodes that bind parameter names when they appear inside a parameter list
const PARAMETER_KINDS: &[&str] = &[
    "parameters",
    "lambda_parameters",
    "list_splat_pattern",
    "dictionary_splat_pattern",
    "typed_parameter",
    "default_parameter",
    "typed_default_parameter",
    "tuple_pattern",
];

const LITERAL_KINDS: &[&str] = &["integer", "float", "string", "true", "false"];

/// Where a node sits, as far as substitution cares
#[derive(Debug, Clone, Copy)]
struct NodeContext {
    parent: &'static str,
    binding: bool,
    in_params: bool,
}

impl NodeContext {
    fn child_of(parent: &'static str, child: &SyntaxNode, in_params: bool) -> Self {
        let binding = match (parent, child.field()) {
            ("function_definition" | "class_definition", Some("name")) => true,
            ("attribute", Some("attribute")) => true,
            ("keyword_argument", Some("name")) => true,
            ("default_parameter" | "typed_default_parameter", Some("name")) => true,
            _ => {
                in_params
                    && child.kind() == "identifier"
                    && matches!(
                        parent,
                        "parameters"
                            | "lambda_parameters"
                            | "list_splat_pattern"
                            | "dictionary_splat_pattern"
                            | "typed_parameter"
                            | "tuple_pattern"
                    )
            }
        };
        Self {
            parent,
            binding,
            in_params,
        }
    }
}

enum Fragment {
    Unparsed,
    Parsed(Vec<SyntaxNode>),
    Failed,
}

struct RewriteState {
    scopes: ScopeStack,
    entered: BTreeSet<String>,
    fragments: Vec<Fragment>,
    modifications: Vec<String>,
    diagnostics: Vec<Diagnostic>,
    /// Location reported for nodes parsed out of an f-string
    origin: Option<String>,
}

impl RewriteState {
    fn new(instruction_count: usize) -> Self {
        Self {
            scopes: ScopeStack::new(),
            entered: BTreeSet::new(),
            fragments: (0..instruction_count).map(|_| Fragment::Unparsed).collect(),
            modifications: Vec::new(),
            diagnostics: Vec::new(),
            origin: None,
        }
    }

    fn location(&self, node: &SyntaxNode) -> String {
        if let Some(origin) = &self.origin {
            return origin.clone();
        }
        node.position()
            .map(|p| p.to_string())
            .unwrap_or_else(|| "inserted".to_string())
    }

    fn scope_label(&self) -> String {
        self.scopes.path()
    }
}

/// Applies a [`Recipe`] to syntax trees
pub struct ScopeAwareRewriter<'r> {
    recipe: &'r Recipe,
    parser: PythonParser,
}

impl<'r> ScopeAwareRewriter<'r> {
    pub fn new(recipe: &'r Recipe) -> Self {
        Self {
            recipe,
            parser: PythonParser::new(),
        }
    }

    /// Rewrite one tree, returning the new tree with its audit trail
    pub fn rewrite(&self, tree: SyntaxTree) -> Rewrite {
        let mut state = RewriteState::new(self.recipe.len());
        let (root, trailing) = tree.into_parts();

        let root = self.visit_module(root, &mut state);
        self.report_unreached_scopes(&mut state);

        debug!(
            modifications = state.modifications.len(),
            diagnostics = state.diagnostics.len(),
            "recipe rewrite finished"
        );
        Rewrite {
            tree: SyntaxTree::new(root, trailing),
            modifications: state.modifications,
            diagnostics: state.diagnostics,
            imports: None,
        }
    }

    fn visit_module(&self, module: SyntaxNode, state: &mut RewriteState) -> SyntaxNode {
        let (shell, children) = module.into_shell();
        let children = self.apply_deletions(children, "", state);
        let children = self.apply_sibling_insertions(children, "", state);
        let children = self.apply_body_insertions(children, None, "", state);
        let children = self.visit_children("module", children, false, state);
        shell.with_children(children)
    }

    fn visit(&self, node: SyntaxNode, ctx: NodeContext, state: &mut RewriteState) -> SyntaxNode {
        if node.is_token() {
            return self.substitute_token(node, ctx, state);
        }

        let kind = node.kind();
        if OPAQUE_STATEMENTS.contains(&kind) {
            return node;
        }
        match kind {
            "function_definition" | "class_definition" => self.visit_definition(node, state),
            "block" => self.visit_block(node, state),
            _ => {
                let in_params = matches!(kind, "parameters" | "lambda_parameters")
                    || (ctx.in_params && PARAMETER_KINDS.contains(&kind));
                let (shell, children) = node.into_shell();
                let children = self.visit_children(kind, children, in_params, state);
                shell.with_children(children)
            }
        }
    }

    fn visit_children(
        &self,
        parent: &'static str,
        children: Vec<SyntaxNode>,
        in_params: bool,
        state: &mut RewriteState,
    ) -> Vec<SyntaxNode> {
        children
            .into_iter()
            .map(|child| {
                let ctx = NodeContext::child_of(parent, &child, in_params);
                self.visit(child, ctx, state)
            })
            .collect()
    }

    fn visit_definition(&self, node: SyntaxNode, state: &mut RewriteState) -> SyntaxNode {
        let kind = node.kind();
        let name = definition_name(&node).unwrap_or_default().to_string();
        let def_indent = node.line_indent().unwrap_or("").to_string();

        state.scopes.push(name.clone());
        state.entered.insert(name.clone());

        let (shell, children) = node.into_shell();
        let children = children
            .into_iter()
            .map(|child| match (child.field(), child.kind()) {
                (Some("name"), _) => child,
                (Some("body"), "block") => self.visit_scope_body(child, &name, &def_indent, state),
                _ => {
                    let ctx = NodeContext::child_of(kind, &child, false);
                    self.visit(child, ctx, state)
                }
            })
            .collect();

        state.scopes.pop();
        shell.with_children(children)
    }

    fn visit_scope_body(
        &self,
        block: SyntaxNode,
        name: &str,
        def_indent: &str,
        state: &mut RewriteState,
    ) -> SyntaxNode {
        let indent = block_indent(&block, def_indent);
        let (shell, children) = block.into_shell();
        let children = self.apply_deletions(children, &indent, state);
        let children = self.apply_sibling_insertions(children, &indent, state);
        let children = self.apply_body_insertions(children, Some(name), &indent, state);
        let children = self.visit_children("block", children, false, state);
        shell.with_children(children)
    }

    fn visit_block(&self, block: SyntaxNode, state: &mut RewriteState) -> SyntaxNode {
        let indent = block.line_indent().unwrap_or("").to_string();
        let (shell, children) = block.into_shell();
        let children = self.apply_deletions(children, &indent, state);
        let children = self.apply_sibling_insertions(children, &indent, state);
        let children = self.visit_children("block", children, false, state);
        shell.with_children(children)
    }

    fn substitute_token(
        &self,
        node: SyntaxNode,
        ctx: NodeContext,
        state: &mut RewriteState,
    ) -> SyntaxNode {
        let kind = node.kind();
        let is_name = kind == "identifier" && !ctx.binding;
        if !is_name && !LITERAL_KINDS.contains(&kind) {
            return node;
        }
        let Some(text) = node.token_text() else {
            return node;
        };
        if kind == "string" {
            if state.origin.is_some() {
                return node;
            }
            if fstring::is_fstring(text) {
                return self.substitute_fstring(node, state);
            }
        }

        let current = state.scopes.current();
        let matched = self
            .recipe
            .of_kind(InstructionKind::Substitution)
            .find(|(_, instruction)| {
                instruction.applies_in(current)
                    && instruction
                        .target()
                        .is_some_and(|target| target.matches_token(kind, text))
            });
        let Some((index, instruction)) = matched else {
            return node;
        };
        let Some(replacement) = instruction.replacement() else {
            return node;
        };

        let location = state.location(&node);
        if is_name && !replacement.is_identifier() {
            warn!(instruction = index, "replacement is not a name; reference left unchanged");
            state.diagnostics.push(Diagnostic::warning(format!(
                "instruction #{}: {}: `{}` is a name and cannot become {}; left unchanged",
                index,
                location,
                text,
                replacement.to_python_literal()
            )));
            return node;
        }

        let (new_kind, new_text) = if is_name {
            ("identifier", replacement.to_string())
        } else {
            (replacement.literal_kind(), replacement.to_python_literal())
        };
        let label = state.scope_label();
        state.modifications.push(format!(
            "{}: replaced {} with {} in {} (instruction #{})",
            location, text, new_text, label, index
        ));

        let negative = new_text.starts_with('-');
        let replaced = SyntaxNode::token(new_kind, new_text).with_field(node.field());
        let replaced = if negative && NodeBuilder::needs_grouping(ctx.parent) {
            NodeBuilder::parenthesized(replaced).with_field(node.field())
        } else {
            replaced
        };
        replaced.with_leading(node.leading())
    }

    /// Rewrite the expressions interpolated into an f-string token
    fn substitute_fstring(&self, node: SyntaxNode, state: &mut RewriteState) -> SyntaxNode {
        let Some(text) = node.token_text() else {
            return node;
        };
        let spans = fstring::interpolation_spans(text);
        if spans.is_empty() {
            return node;
        }

        let location = state.location(&node);
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        let mut changed = false;
        for span in spans {
            out.push_str(&text[last..span.start]);
            let expression = &text[span.clone()];
            match self.substitute_expression(expression, &location, state) {
                Some(rewritten) => {
                    out.push_str(&rewritten);
                    changed = true;
                }
                None => out.push_str(expression),
            }
            last = span.end;
        }
        out.push_str(&text[last..]);

        if !changed {
            return node;
        }
        SyntaxNode::token("string", out)
            .with_field(node.field())
            .with_leading(node.leading())
    }

    fn substitute_expression(
        &self,
        expression: &str,
        location: &str,
        state: &mut RewriteState,
    ) -> Option<String> {
        if expression.trim().is_empty() {
            return None;
        }
        let mut statements = match self.parser.parse_statements(&format!("({})", expression)) {
            Ok(statements) => statements,
            Err(err) => {
                debug!(expression, "interpolation left as is: {}", err);
                return None;
            }
        };
        if statements.len() != 1 {
            return None;
        }
        let statement = statements.pop()?;

        let before = state.modifications.len();
        let outer = state.origin.replace(location.to_string());
        let ctx = NodeContext::child_of("module", &statement, false);
        let rewritten = self.visit(statement, ctx, state);
        state.origin = outer;
        if state.modifications.len() == before {
            return None;
        }

        let text = rewritten.text();
        text.strip_prefix('(')
            .and_then(|inner| inner.strip_suffix(')'))
            .map(str::to_string)
    }

    fn apply_deletions(
        &self,
        mut children: Vec<SyntaxNode>,
        indent: &str,
        state: &mut RewriteState,
    ) -> Vec<SyntaxNode> {
        let current = state.scopes.current();
        let deletions: Vec<(usize, &Instruction)> = self
            .recipe
            .of_kind(InstructionKind::Deletion)
            .filter(|(_, instruction)| instruction.applies_in(current))
            .collect();
        if deletions.is_empty() {
            return children;
        }

        let had_statements = children.iter().any(is_statement);
        let first_leading = children
            .first()
            .map(|c| c.leading().to_string())
            .unwrap_or_default();

        let mut idx = 0;
        while idx < children.len() {
            let child = &children[idx];
            let hit = is_statement(child)
                .then(|| {
                    deletions
                        .iter()
                        .find(|(_, instruction)| statement_matches(child, instruction))
                })
                .flatten();
            match hit {
                Some((index, _)) => {
                    let location = state.location(child);
                    let label = state.scope_label();
                    state.modifications.push(format!(
                        "{}: deleted `{}` in {} (instruction #{})",
                        location,
                        first_line(&child.text()),
                        label,
                        index
                    ));
                    remove_statement(&mut children, idx);
                }
                None => idx += 1,
            }
        }

        if had_statements && !children.iter().any(is_statement) {
            let leading = if children.is_empty() {
                first_leading
            } else {
                format!("\n{}", indent)
            };
            children.push(NodeBuilder::pass_statement().with_leading(leading));
        }
        children
    }

    fn apply_sibling_insertions(
        &self,
        children: Vec<SyntaxNode>,
        indent: &str,
        state: &mut RewriteState,
    ) -> Vec<SyntaxNode> {
        let sibling_insertions: Vec<(usize, &Instruction)> = self
            .recipe
            .of_kind(InstructionKind::Insertion)
            .filter(|(_, instruction)| {
                !instruction.is_global()
                    && matches!(
                        instruction.position(),
                        Some(InsertPosition::Before | InsertPosition::After)
                    )
            })
            .collect();
        if sibling_insertions.is_empty() || !children.iter().any(is_definition) {
            return children;
        }

        let mut out = Vec::with_capacity(children.len());
        for child in children {
            let name = definition_name(&child).map(str::to_string);
            out.push(child);
            let Some(name) = name else {
                continue;
            };

            let mut def_pos = out.len() - 1;
            for (index, instruction) in &sibling_insertions {
                if instruction.scope() != name {
                    continue;
                }
                let Some(statements) = self.fragment(*index, instruction, state) else {
                    continue;
                };
                let count = statements.len();
                let position = instruction.position();
                let at = if position == Some(InsertPosition::Before) {
                    def_pos
                } else {
                    out.len()
                };
                insert_statements(&mut out, at, statements, indent);
                if position == Some(InsertPosition::Before) {
                    def_pos += count;
                }
                state.modifications.push(format!(
                    "inserted {} statement(s) {} `{}` (instruction #{})",
                    count,
                    if position == Some(InsertPosition::Before) { "before" } else { "after" },
                    name,
                    index
                ));
            }
        }
        out
    }

    fn apply_body_insertions(
        &self,
        mut children: Vec<SyntaxNode>,
        scope: Option<&str>,
        indent: &str,
        state: &mut RewriteState,
    ) -> Vec<SyntaxNode> {
        let insertions: Vec<(usize, &Instruction)> = self
            .recipe
            .of_kind(InstructionKind::Insertion)
            .filter(|(_, instruction)| {
                let wanted = match scope {
                    Some(name) => instruction.scope() == name,
                    None => instruction.is_global(),
                };
                wanted
                    && matches!(
                        instruction.position(),
                        Some(InsertPosition::Start | InsertPosition::End)
                    )
            })
            .collect();

        for (index, instruction) in insertions {
            let Some(statements) = self.fragment(index, instruction, state) else {
                continue;
            };
            if scope.is_some() {
                if let Some(first) = children.first_mut() {
                    if !first.leading().contains('\n') {
                        let taken = std::mem::replace(first, SyntaxNode::anonymous(""));
                        *first = taken.with_leading(format!("\n{}", indent));
                    }
                }
            }

            let count = statements.len();
            let at = match (instruction.position(), scope) {
                (Some(InsertPosition::End), _) => children.len(),
                (_, None) => prologue_end(&children),
                _ => 0,
            };
            insert_statements(&mut children, at, statements, indent);
            state.modifications.push(format!(
                "inserted {} statement(s) at {} of {} (instruction #{})",
                count,
                instruction.position().map(|p| p.to_string()).unwrap_or_default(),
                scope.unwrap_or("<module>"),
                index
            ));
        }
        children
    }

    /// Parse an insertion fragment once; later calls reuse the result
    fn fragment(
        &self,
        index: usize,
        instruction: &Instruction,
        state: &mut RewriteState,
    ) -> Option<Vec<SyntaxNode>> {
        match state.fragments.get(index) {
            Some(Fragment::Parsed(statements)) => return Some(statements.clone()),
            Some(Fragment::Failed) | None => return None,
            Some(Fragment::Unparsed) => {}
        }

        let code = instruction.code().unwrap_or_default();
        let (slot, result) = match self.parser.parse_statements(code) {
            Ok(statements) if !statements.is_empty() => {
                (Fragment::Parsed(statements.clone()), Some(statements))
            }
            Ok(_) => {
                self.record_instruction_error(index, "fragment contains no statements", state);
                (Fragment::Failed, None)
            }
            Err(err) => {
                self.record_instruction_error(index, &format!("fragment does not parse: {}", err), state);
                (Fragment::Failed, None)
            }
        };
        state.fragments[index] = slot;
        result
    }

    fn record_instruction_error(&self, index: usize, message: &str, state: &mut RewriteState) {
        let err = EngineError::Instruction {
            index,
            message: message.to_string(),
        };
        warn!(instruction = index, "skipping insertion: {}", message);
        state.diagnostics.push(Diagnostic::warning(err.to_string()));
    }

    fn report_unreached_scopes(&self, state: &mut RewriteState) {
        for scope in self.recipe.named_scopes() {
            if state.entered.contains(scope) {
                continue;
            }
            let affected = self
                .recipe
                .instructions()
                .iter()
                .filter(|instruction| instruction.scope() == scope)
                .count();
            state.diagnostics.push(Diagnostic::warning(format!(
                "scope `{}` is never entered; {} instruction(s) had no effect",
                scope, affected
            )));
        }
        for (index, instruction) in self.recipe.of_kind(InstructionKind::Insertion) {
            if instruction.is_global()
                && matches!(
                    instruction.position(),
                    Some(InsertPosition::Before | InsertPosition::After)
                )
            {
                state.diagnostics.push(Diagnostic::warning(format!(
                    "instruction #{}: `{}` insertions need a named scope",
                    index,
                    instruction.position().map(|p| p.to_string()).unwrap_or_default()
                )));
            }
        }
    }
}

fn statement_matches(statement: &SyntaxNode, instruction: &Instruction) -> bool {
    let Some(target) = instruction.target() else {
        return false;
    };
    let wanted = target.to_string();
    let wanted = wanted.trim();
    statement.text().trim() == wanted || primary_symbol(statement).as_deref() == Some(wanted)
}

/// Indentation of a body; one-line bodies get the definition's indent plus four spaces
fn block_indent(block: &SyntaxNode, def_indent: &str) -> String {
    block
        .children()
        .iter()
        .find_map(|child| child.line_indent())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}    ", def_indent))
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}
