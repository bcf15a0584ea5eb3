//! Construct counting over a parsed file

use recast_parsers::{
    CodeGenerator, NodeVisitor, SyntaxNode, SyntaxTree, TraversalUtils, TreeWalker, VisitAction,
};
use serde::{Deserialize, Serialize};

/// Counts of constructs of interest in one file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStatistics {
    pub functions: usize,
    pub classes: usize,
    pub imports: usize,
    pub calls: usize,
    /// Calls to the `print` builtin
    pub print_calls: usize,
    /// Calls through `os.path.*`
    pub legacy_path_calls: usize,
    pub string_literals: usize,
    pub number_literals: usize,
    pub literals: usize,
    pub lines: usize,
    /// Longest root-to-leaf path of the syntax tree
    pub nesting_depth: usize,
}

/// Classifies calls by callee; plain kind tallies come from `TraversalUtils::count_by_kind`
#[derive(Default)]
struct CallVisitor {
    print_calls: usize,
    legacy_path_calls: usize,
}

impl NodeVisitor for CallVisitor {
    fn pre_visit(&mut self, node: &SyntaxNode) -> VisitAction {
        match node.kind() {
            "import_statement" | "import_from_statement" | "future_import_statement" => {
                return VisitAction::SkipChildren;
            }
            "call" => {
                let callee = node.child_by_field("function").map(SyntaxNode::text);
                match callee.as_deref() {
                    Some("print") => self.print_calls += 1,
                    Some(name) if name.starts_with("os.path.") => self.legacy_path_calls += 1,
                    _ => {}
                }
            }
            _ => {}
        }
        VisitAction::Continue
    }
}

/// Computes [`SourceStatistics`]
#[derive(Clone, Default)]
pub struct SourceAnalyzer {
    generator: CodeGenerator,
}

impl SourceAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn analyze(&self, tree: &SyntaxTree) -> SourceStatistics {
        let root = tree.root();
        let kinds = TraversalUtils::count_by_kind(root);
        let count = |names: &[&str]| -> usize {
            names.iter().map(|name| kinds.get(*name).copied().unwrap_or(0)).sum()
        };

        let mut walker = TreeWalker::new(CallVisitor::default());
        walker.walk(root);
        let calls = walker.into_visitor();

        let string_literals = count(&["string"]);
        let number_literals = count(&["integer", "float"]);
        SourceStatistics {
            functions: count(&["function_definition"]),
            classes: count(&["class_definition"]),
            imports: count(&["import_statement", "import_from_statement", "future_import_statement"]),
            calls: count(&["call"]),
            print_calls: calls.print_calls,
            legacy_path_calls: calls.legacy_path_calls,
            string_literals,
            number_literals,
            literals: string_literals + number_literals + count(&["true", "false", "none"]),
            lines: self.generator.generate(tree).lines().count(),
            nesting_depth: TraversalUtils::tree_depth(root),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recast_parsers::{ParserResult, PythonParser};

    #[test]
    fn test_counts() -> ParserResult<()> {
        let source = "\
import os
from os import path

class Loader:
    def load(self, name):
        print('loading', name)
        return os.path.join('data', name)

def main():
    Loader().load(\"xy\")
    return 1.5 if True else 2
";
        let tree = PythonParser::new().parse(source)?;
        let stats = SourceAnalyzer::new().analyze(&tree);
        assert_eq!(stats.functions, 2);
        assert_eq!(stats.classes, 1);
        assert_eq!(stats.imports, 2);
        assert_eq!(stats.calls, 4);
        assert_eq!(stats.print_calls, 1);
        assert_eq!(stats.legacy_path_calls, 1);
        assert_eq!(stats.string_literals, 3);
        assert_eq!(stats.number_literals, 2);
        assert_eq!(stats.literals, 6);
        assert_eq!(stats.lines, 11);
        assert!(stats.nesting_depth > 6);

        let flat = SourceAnalyzer::new().analyze(&PythonParser::new().parse("x = 1\n")?);
        assert!(flat.nesting_depth < stats.nesting_depth);
        Ok(())
    }
}
