//! Structural pattern rewriting
//!
//! A [`PatternRewriter`] walks the tree bottom-up and offers every `call` node to a set of
//! [`RewriteRules`]. Arguments are rewritten before the call that contains them, so nested legacy
//! calls compose. Any rule that fires marks the rules' [`ImportPlan`] as required; the generator
//! then injects the modern import and retires legacy ones.

pub mod imports;
pub mod logging;
pub mod pathlib;

pub use imports::{ImportEditor, ImportPlan, ImportRequirement, LegacyImport};
pub use logging::PrintToLoggingRules;
pub use pathlib::PathlibRules;

use crate::error::Result;
use crate::providers::{ImportDirective, Rewrite, Transformer, TransformerMetadata};
use crate::syntax::is_import;
use recast_parsers::{NodeBuilder, SyntaxNode, SyntaxTree};
use tracing::debug;

/// A call node offered to the rules, with the kind of the node that contains it
#[derive(Debug, Clone, Copy)]
pub struct CallSite<'a> {
    call: &'a SyntaxNode,
    parent: &'static str,
}

impl<'a> CallSite<'a> {
    pub fn new(call: &'a SyntaxNode, parent: &'static str) -> Self {
        Self { call, parent }
    }

    pub fn call(&self) -> &'a SyntaxNode {
        self.call
    }

    pub fn parent_kind(&self) -> &'static str {
        self.parent
    }

    pub fn function(&self) -> Option<&'a SyntaxNode> {
        self.call.child_by_field("function")
    }

    /// Dotted name of the callee, when it is a plain name or attribute chain (`os.path.join`)
    pub fn callee_path(&self) -> Option<String> {
        dotted_path(self.function()?)
    }

    /// Every argument in order, or `None` for a generator-expression argument
    pub fn arguments(&self) -> Option<Vec<&'a SyntaxNode>> {
        let list = self.call.child_by_field("arguments")?;
        if list.kind() != "argument_list" {
            return None;
        }
        Some(list.named_children().filter(|arg| arg.kind() != "comment").collect())
    }

    /// Arguments, but only if every one of them is positional
    pub fn positional_arguments(&self) -> Option<Vec<&'a SyntaxNode>> {
        let arguments = self.arguments()?;
        arguments.iter().all(|arg| is_positional(arg)).then_some(arguments)
    }
}

pub(crate) fn is_positional(argument: &SyntaxNode) -> bool {
    !matches!(
        argument.kind(),
        "keyword_argument" | "list_splat" | "dictionary_splat" | "parenthesized_list_splat"
    )
}

fn dotted_path(node: &SyntaxNode) -> Option<String> {
    match node.kind() {
        "identifier" => node.token_text().map(str::to_string),
        "attribute" => {
            let object = dotted_path(node.child_by_field("object")?)?;
            let member = node.child_by_field("attribute")?.token_text()?;
            Some(format!("{}.{}", object, member))
        }
        _ => None,
    }
}

/// A family of call rewrites sharing one import plan
pub trait RewriteRules: Send + Sync {
    fn metadata(&self) -> TransformerMetadata;

    fn can_handle(&self, source: &str) -> bool;

    /// Replacement for the call, or `None` to leave it alone
    ///
    /// The returned node needs no trivia or parentheses; the engine supplies both.
    fn rewrite_call(&self, site: &CallSite<'_>) -> Option<SyntaxNode>;

    /// Imports the replacements depend on
    fn imports(&self) -> ImportPlan;
}

/// Post-order call rewriter driven by a [`RewriteRules`] implementation
#[derive(Debug, Clone, Default)]
pub struct PatternRewriter<R> {
    rules: R,
}

impl<R: RewriteRules> PatternRewriter<R> {
    pub fn new(rules: R) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    /// Rewrite every matching call in the tree
    pub fn rewrite_tree(&self, tree: SyntaxTree) -> Rewrite {
        let (root, trailing) = tree.into_parts();
        let mut modifications = Vec::new();
        let root = self.visit(root, "", &mut modifications);

        let required = !modifications.is_empty();
        debug!(
            rules = %self.rules.metadata().name,
            rewrites = modifications.len(),
            "pattern rewrite finished"
        );
        Rewrite {
            tree: SyntaxTree::new(root, trailing),
            modifications,
            diagnostics: Vec::new(),
            imports: Some(ImportDirective {
                plan: self.rules.imports(),
                required,
            }),
        }
    }

    fn visit(&self, node: SyntaxNode, parent: &'static str, modifications: &mut Vec<String>) -> SyntaxNode {
        if node.is_token() || is_import(&node) {
            return node;
        }

        let kind = node.kind();
        let (shell, children) = node.into_shell();
        let children = children
            .into_iter()
            .map(|child| self.visit(child, kind, modifications))
            .collect();
        let node = shell.with_children(children);
        if kind != "call" {
            return node;
        }

        let Some(replacement) = self.rules.rewrite_call(&CallSite::new(&node, parent)) else {
            return node;
        };
        let replacement = if !NodeBuilder::is_atomic(&replacement) && NodeBuilder::needs_grouping(parent) {
            NodeBuilder::parenthesized(replacement)
        } else {
            replacement
        };

        let location = node
            .position()
            .map(|p| p.to_string())
            .unwrap_or_else(|| "nested".to_string());
        let original = node.text();
        modifications.push(format!(
            "{}: {} -> {}",
            location,
            original.lines().next().unwrap_or_default(),
            replacement.text()
        ));
        replacement.with_field(node.field()).with_leading(node.leading())
    }
}

impl<R: RewriteRules> Transformer for PatternRewriter<R> {
    fn describe(&self) -> TransformerMetadata {
        self.rules.metadata()
    }

    fn can_handle(&self, source: &str) -> bool {
        self.rules.can_handle(source)
    }

    fn rewrite(&self, tree: SyntaxTree) -> Result<Rewrite> {
        Ok(self.rewrite_tree(tree))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recast_parsers::{ParserResult, PythonParser};

    fn first_call(source: &str) -> ParserResult<SyntaxNode> {
        let tree = PythonParser::new().parse(source)?;
        Ok(tree.statements()[0].children()[0].clone())
    }

    #[test]
    fn test_callee_path() -> ParserResult<()> {
        let call = first_call("os.path.join(a, b)\n")?;
        let site = CallSite::new(&call, "expression_statement");
        assert_eq!(site.callee_path().as_deref(), Some("os.path.join"));
        assert_eq!(site.positional_arguments().map(|a| a.len()), Some(2));

        let call = first_call("get()(x)\n")?;
        assert_eq!(CallSite::new(&call, "expression_statement").callee_path(), None);
        Ok(())
    }

    #[test]
    fn test_keyword_and_splat_arguments_are_not_positional() -> ParserResult<()> {
        for source in ["f(a, b=1)\n", "f(*args)\n", "f(**kw)\n"] {
            let call = first_call(source)?;
            let site = CallSite::new(&call, "expression_statement");
            assert!(site.arguments().is_some(), "{}", source);
            assert!(site.positional_arguments().is_none(), "{}", source);
        }
        let call = first_call("f(x for x in y)\n")?;
        assert!(CallSite::new(&call, "expression_statement").arguments().is_none());
        Ok(())
    }
}
