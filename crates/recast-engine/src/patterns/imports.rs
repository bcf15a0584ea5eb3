//! Import requirements: injecting the modern declaration and retiring legacy ones
//!
//! Retirement is decided on text, not on references: a legacy import is dropped only when none
//! of the names it binds appear anywhere in the file once the import itself is gone. Comments and
//! strings count as occurrences, which keeps the check conservative.

use crate::syntax::{is_definition, is_import, prologue_end};
use recast_parsers::{
    insert_statements, remove_statement, CodeGenerator, ParserResult, PythonParser, SyntaxNode,
    SyntaxTree, TraversalUtils,
};
use regex::Regex;

/// A declaration rewritten code depends on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportRequirement {
    /// `from <module> import <name>`
    FromImport { module: String, name: String },
    /// `import <module>`
    Module { module: String },
}

impl ImportRequirement {
    pub fn from_import(module: impl Into<String>, name: impl Into<String>) -> Self {
        ImportRequirement::FromImport {
            module: module.into(),
            name: name.into(),
        }
    }

    pub fn module(module: impl Into<String>) -> Self {
        ImportRequirement::Module {
            module: module.into(),
        }
    }

    /// Source text of the import statement
    pub fn statement(&self) -> String {
        match self {
            ImportRequirement::FromImport { module, name } => {
                format!("from {} import {}", module, name)
            }
            ImportRequirement::Module { module } => format!("import {}", module),
        }
    }

    /// Whether an import statement already provides this import
    pub fn is_satisfied_by(&self, statement: &SyntaxNode) -> bool {
        match (self, statement.kind()) {
            (ImportRequirement::FromImport { module, name }, "import_from_statement") => {
                let same_module = statement
                    .child_by_field("module_name")
                    .is_some_and(|m| m.text() == *module);
                same_module
                    && (statement.children().iter().any(|c| c.kind() == "wildcard_import")
                        || statement
                            .children_by_field("name")
                            .any(|n| n.kind() == "dotted_name" && n.text() == *name))
            }
            (ImportRequirement::Module { module }, "import_statement") => statement
                .children_by_field("name")
                .any(|n| n.kind() == "dotted_name" && n.text() == *module),
            _ => false,
        }
    }
}

/// A legacy namespace whose imports can be retired once nothing uses them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyImport {
    module: String,
}

impl LegacyImport {
    /// `module` is the dotted legacy namespace, e.g. `os.path`
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
        }
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    /// Names bound by `statement` if it imports nothing but the legacy namespace
    ///
    /// Covers `import os`, `import os.path [as p]`, `from os import path` and
    /// `from os.path import a, b`. Wildcard imports and mixed imports return `None`.
    pub fn bound_names(&self, statement: &SyntaxNode) -> Option<Vec<String>> {
        let (parent, leaf) = match self.module.rsplit_once('.') {
            Some((parent, leaf)) => (Some(parent), leaf),
            None => (None, self.module.as_str()),
        };

        match statement.kind() {
            "import_statement" => {
                let mut bound = Vec::new();
                for item in statement.children_by_field("name") {
                    let (dotted, alias) = split_alias(item)?;
                    let root_package = parent.unwrap_or(leaf);
                    let is_legacy = dotted == self.module
                        || dotted == root_package
                        || parent.is_some_and(|p| dotted == p);
                    if !is_legacy {
                        return None;
                    }
                    let first_segment = dotted.split('.').next().unwrap_or_default().to_string();
                    bound.push(alias.unwrap_or(first_segment));
                }
                (!bound.is_empty()).then_some(bound)
            }
            "import_from_statement" => {
                let module_name = statement.child_by_field("module_name")?.text();
                if statement.children().iter().any(|c| c.kind() == "wildcard_import") {
                    return None;
                }
                let mut bound = Vec::new();
                for item in statement.children_by_field("name") {
                    let (dotted, alias) = split_alias(item)?;
                    let allowed = module_name == self.module
                        || (parent == Some(module_name.as_str()) && dotted == leaf);
                    if !allowed {
                        return None;
                    }
                    bound.push(alias.unwrap_or(dotted));
                }
                (!bound.is_empty()).then_some(bound)
            }
            _ => None,
        }
    }
}

fn split_alias(item: &SyntaxNode) -> Option<(String, Option<String>)> {
    match item.kind() {
        "dotted_name" => Some((item.text(), None)),
        "aliased_import" => {
            let name = item.child_by_field("name")?.text();
            let alias = item.child_by_field("alias")?.text();
            Some((name, Some(alias)))
        }
        _ => None,
    }
}

/// What a pattern rewriter needs from the import section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportPlan {
    pub requirement: ImportRequirement,
    pub legacy: Option<LegacyImport>,
}

impl ImportPlan {
    pub fn new(requirement: ImportRequirement) -> Self {
        Self {
            requirement,
            legacy: None,
        }
    }

    pub fn retiring(mut self, legacy: LegacyImport) -> Self {
        self.legacy = Some(legacy);
        self
    }
}

/// Applies import plans to finished trees
#[derive(Clone, Default)]
pub struct ImportEditor {
    parser: PythonParser,
    generator: CodeGenerator,
}

impl ImportEditor {
    pub fn new() -> Self {
        Self {
            parser: PythonParser::new(),
            generator: CodeGenerator::new(),
        }
    }

    /// Add the required import after the top import block unless the file already has it
    ///
    /// Imports nested in module-level `try`/`if`/`with` blocks count; imports local to a function
    /// or class do not. Returns whether a statement was added.
    pub fn inject(&self, tree: SyntaxTree, requirement: &ImportRequirement) -> ParserResult<(SyntaxTree, bool)> {
        if provides(&tree, requirement) {
            return Ok((tree, false));
        }

        let statements = self.parser.parse_statements(&requirement.statement())?;
        let (root, trailing) = tree.into_parts();
        let (shell, mut children) = root.into_shell();
        let at = import_block_end(&children);
        insert_statements(&mut children, at, statements, "");
        Ok((SyntaxTree::new(shell.with_children(children), trailing), true))
    }

    /// Remove legacy imports whose bound names no longer occur in the generated text
    ///
    /// Returns the new tree and the text of every removed statement.
    pub fn retire(&self, tree: SyntaxTree, legacy: &LegacyImport) -> (SyntaxTree, Vec<String>) {
        let (root, trailing) = tree.into_parts();
        let (shell, mut children) = root.into_shell();
        let mut removed = Vec::new();

        let mut idx = 0;
        while idx < children.len() {
            let Some(names) = legacy.bound_names(&children[idx]) else {
                idx += 1;
                continue;
            };

            let mut trial = children.clone();
            let dropped = remove_statement(&mut trial, idx);
            let trial_tree = SyntaxTree::new(shell.clone().with_children(trial.clone()), trailing.clone());
            let text = self.generator.generate(&trial_tree);

            if names.iter().all(|name| !mentions(&text, name)) {
                if let Some(statement) = dropped {
                    removed.push(statement.text());
                }
                children = trial;
            } else {
                idx += 1;
            }
        }

        (SyntaxTree::new(shell.with_children(children), trailing), removed)
    }
}

fn provides(tree: &SyntaxTree, requirement: &ImportRequirement) -> bool {
    tree.statements()
        .iter()
        .filter(|statement| !is_definition(statement))
        .any(|statement| {
            TraversalUtils::find_first(statement, |node| requirement.is_satisfied_by(node)).is_some()
        })
}

/// Index after the last import of the top import block, or after the prologue
fn import_block_end(children: &[SyntaxNode]) -> usize {
    let start = prologue_end(children);
    let mut insert_at = start;
    for (idx, child) in children.iter().enumerate().skip(start) {
        if is_import(child) {
            insert_at = idx + 1;
        } else if child.kind() != "comment" && child.kind() != ";" {
            break;
        }
    }
    insert_at
}

fn mentions(text: &str, name: &str) -> bool {
    match Regex::new(&format!(r"\b{}\b", regex::escape(name))) {
        Ok(pattern) => pattern.is_match(text),
        // Unbuildable pattern: assume the name is still used
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> ParserResult<SyntaxTree> {
        PythonParser::new().parse(source)
    }

    #[test]
    fn test_inject_after_import_block() -> ParserResult<()> {
        let editor = ImportEditor::new();
        let requirement = ImportRequirement::from_import("pathlib", "Path");
        let (tree, added) = editor.inject(
            parse("\"\"\"Doc.\"\"\"\nimport os\nimport sys\n\nx = 1\n")?,
            &requirement,
        )?;
        assert!(added);
        assert_eq!(
            CodeGenerator::new().generate(&tree),
            "\"\"\"Doc.\"\"\"\nimport os\nimport sys\nfrom pathlib import Path\n\nx = 1\n"
        );
        Ok(())
    }

    #[test]
    fn test_inject_without_imports_goes_after_docstring() -> ParserResult<()> {
        let editor = ImportEditor::new();
        let (tree, _) = editor.inject(parse("\"\"\"Doc.\"\"\"\n\nx = 1\n")?, &ImportRequirement::module("logging"))?;
        assert_eq!(
            CodeGenerator::new().generate(&tree),
            "\"\"\"Doc.\"\"\"\nimport logging\n\nx = 1\n"
        );
        Ok(())
    }

    #[test]
    fn test_inject_is_skipped_when_present() -> ParserResult<()> {
        let editor = ImportEditor::new();
        let source = "from pathlib import Path\nx = Path('a')\n";
        let (tree, added) = editor.inject(parse(source)?, &ImportRequirement::from_import("pathlib", "Path"))?;
        assert!(!added);
        assert_eq!(CodeGenerator::new().generate(&tree), source);
        Ok(())
    }

    #[test]
    fn test_inject_sees_conditional_imports() -> ParserResult<()> {
        let editor = ImportEditor::new();
        let requirement = ImportRequirement::from_import("pathlib", "Path");
        let source = "import os\ntry:\n    from pathlib import Path\nexcept ImportError:\n    pass\n";
        let (tree, added) = editor.inject(parse(source)?, &requirement)?;
        assert!(!added);
        assert_eq!(CodeGenerator::new().generate(&tree), source);

        let local = "def f():\n    from pathlib import Path\n    return Path('a')\n";
        let (tree, added) = editor.inject(parse(local)?, &requirement)?;
        assert!(added);
        assert!(CodeGenerator::new().generate(&tree).starts_with("from pathlib import Path\n"));
        Ok(())
    }

    #[test]
    fn test_bound_names() -> ParserResult<()> {
        let legacy = LegacyImport::new("os.path");
        let tree = parse(
            "import os\nimport os.path as osp\nfrom os import path\nfrom os.path import join, exists\nimport os, sys\nfrom os.path import *\n",
        )?;
        let bound: Vec<Option<Vec<String>>> =
            tree.statements().iter().map(|s| legacy.bound_names(s)).collect();
        assert_eq!(bound[0], Some(vec!["os".to_string()]));
        assert_eq!(bound[1], Some(vec!["osp".to_string()]));
        assert_eq!(bound[2], Some(vec!["path".to_string()]));
        assert_eq!(bound[3], Some(vec!["join".to_string(), "exists".to_string()]));
        assert_eq!(bound[4], None);
        assert_eq!(bound[5], None);
        Ok(())
    }

    #[test]
    fn test_retire_only_unused_imports() -> ParserResult<()> {
        let editor = ImportEditor::new();
        let legacy = LegacyImport::new("os.path");

        let (tree, removed) = editor.retire(parse("import os\nfrom pathlib import Path\nx = Path('a')\n")?, &legacy);
        assert_eq!(removed, vec!["import os".to_string()]);
        assert_eq!(CodeGenerator::new().generate(&tree), "from pathlib import Path\nx = Path('a')\n");

        let source = "import os\nx = os.getcwd()\n";
        let (tree, removed) = editor.retire(parse(source)?, &legacy);
        assert!(removed.is_empty());
        assert_eq!(CodeGenerator::new().generate(&tree), source);
        Ok(())
    }
}
