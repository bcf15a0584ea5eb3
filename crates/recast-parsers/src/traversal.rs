//! Syntax tree traversal utilities and visitor patterns

use crate::types::SyntaxNode;
use std::collections::BTreeMap;

/// Action to take after visiting a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitAction {
    /// Continue traversal normally
    Continue,
    /// Skip children of this node
    SkipChildren,
    /// Stop traversal entirely
    Stop,
}

/// Node visitor trait for read-only traversals
pub trait NodeVisitor {
    /// Called before visiting a node's children
    fn pre_visit(&mut self, node: &SyntaxNode) -> VisitAction;

    /// Called after visiting a node's children
    fn post_visit(&mut self, _node: &SyntaxNode) -> VisitAction {
        VisitAction::Continue
    }
}

/// Tree walker for traversing syntax trees
pub struct TreeWalker<V: NodeVisitor> {
    visitor: V,
}

impl<V: NodeVisitor> TreeWalker<V> {
    /// Create a new tree walker with a visitor
    pub fn new(visitor: V) -> Self {
        Self { visitor }
    }

    /// Walk the syntax tree starting from `root`, in source order
    pub fn walk(&mut self, root: &SyntaxNode) {
        let mut stack = vec![(root, false)]; // (node, post_visit_pending)

        while let Some((node, post_visit)) = stack.pop() {
            if post_visit {
                if self.visitor.post_visit(node) == VisitAction::Stop {
                    return;
                }
                continue;
            }

            match self.visitor.pre_visit(node) {
                VisitAction::Stop => return,
                VisitAction::SkipChildren => stack.push((node, true)),
                VisitAction::Continue => {
                    stack.push((node, true));
                    // Reverse so children are visited left-to-right
                    for child in node.children().iter().rev() {
                        stack.push((child, false));
                    }
                }
            }
        }
    }

    pub fn visitor(&self) -> &V {
        &self.visitor
    }

    pub fn into_visitor(self) -> V {
        self.visitor
    }
}

/// Utility functions for tree traversal
pub struct TraversalUtils;

impl TraversalUtils {
    /// Find the first node matching a predicate
    pub fn find_first<F>(root: &SyntaxNode, predicate: F) -> Option<&SyntaxNode>
    where
        F: Fn(&SyntaxNode) -> bool,
    {
        Self::first_match(root, &predicate)
    }

    fn first_match<'a, F>(node: &'a SyntaxNode, predicate: &F) -> Option<&'a SyntaxNode>
    where
        F: Fn(&SyntaxNode) -> bool,
    {
        if predicate(node) {
            return Some(node);
        }
        node.children()
            .iter()
            .find_map(|child| Self::first_match(child, predicate))
    }

    /// Count nodes by grammar kind
    pub fn count_by_kind(root: &SyntaxNode) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        Self::count_nodes_recursive(root, &mut counts);
        counts
    }

    /// Get tree depth
    pub fn tree_depth(root: &SyntaxNode) -> usize {
        root.children()
            .iter()
            .map(|child| Self::tree_depth(child) + 1)
            .max()
            .unwrap_or(0)
    }

    fn count_nodes_recursive(node: &SyntaxNode, counts: &mut BTreeMap<&'static str, usize>) {
        *counts.entry(node.kind()).or_insert(0) += 1;

        for child in node.children() {
            Self::count_nodes_recursive(child, counts);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::PythonParser;
    use crate::ParserResult;

    struct KindRecorder {
        seen: Vec<&'static str>,
        skip: &'static str,
    }

    impl NodeVisitor for KindRecorder {
        fn pre_visit(&mut self, node: &SyntaxNode) -> VisitAction {
            if node.is_named() {
                self.seen.push(node.kind());
            }
            if node.kind() == self.skip {
                VisitAction::SkipChildren
            } else {
                VisitAction::Continue
            }
        }
    }

    #[test]
    fn test_walker_visits_in_source_order() -> ParserResult<()> {
        let tree = PythonParser::new().parse("a = f(1)\n")?;
        let mut walker = TreeWalker::new(KindRecorder {
            seen: Vec::new(),
            skip: "argument_list",
        });
        walker.walk(tree.root());
        assert_eq!(
            walker.into_visitor().seen,
            vec!["module", "expression_statement", "assignment", "identifier", "call", "identifier", "argument_list"]
        );
        Ok(())
    }

    #[test]
    fn test_find_and_count() -> ParserResult<()> {
        let tree = PythonParser::new().parse("def f():\n    g()\n    h()\n")?;
        let first_call = TraversalUtils::find_first(tree.root(), |n| n.kind() == "call");
        assert_eq!(first_call.map(SyntaxNode::text).as_deref(), Some("g()"));
        assert!(TraversalUtils::find_first(tree.root(), |n| n.kind() == "class_definition").is_none());
        assert_eq!(TraversalUtils::count_by_kind(tree.root()).get("call"), Some(&2));
        // module > function_definition > block > expression_statement > call > argument_list > (
        assert_eq!(TraversalUtils::tree_depth(tree.root()), 6);
        Ok(())
    }
}
