//! Transformer trait and registry
//!
//! A transformer is anything that can describe itself, say whether a source is worth processing,
//! and rewrite a parsed tree. Two families implement it: [`RecipeTransformer`] wraps a recipe for
//! the scope-aware rewriter, and [`crate::patterns::PatternRewriter`] wraps a set of structural
//! rewrite rules. The registry stores either kind by name behind the same trait object.

pub mod recipe;
pub mod registry;

pub use recipe::RecipeTransformer;
pub use registry::{builtin_plugins, PluginLoadFailure, TransformerPlugin, TransformerRegistry};

use crate::error::Result;
use crate::generation::SourceGenerator;
use crate::patterns::ImportPlan;
use crate::validation::ValidationEngine;
use recast_parsers::{Diagnostic, PythonParser, SyntaxTree};
use serde::{Deserialize, Serialize};

/// Descriptive metadata every transformer exposes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformerMetadata {
    pub name: String,
    pub description: String,
    pub version: String,
    pub author: String,
}

impl TransformerMetadata {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            version: "1.0".to_string(),
            author: "Recast Contributors".to_string(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Reason the metadata is unusable for registration, if any
    pub fn problem(&self) -> Option<String> {
        if self.name.trim().is_empty() {
            Some("metadata has an empty name".to_string())
        } else if self.name.chars().any(char::is_whitespace) {
            Some(format!("metadata name `{}` contains whitespace", self.name))
        } else if self.version.trim().is_empty() {
            Some(format!("`{}` declares no version", self.name))
        } else {
            None
        }
    }
}

/// Import work a rewrite hands to the generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDirective {
    pub plan: ImportPlan,
    /// Set when at least one rule fired; nothing is injected or retired otherwise
    pub required: bool,
}

/// Output of one rewrite pass
#[derive(Debug, Clone)]
pub struct Rewrite {
    pub tree: SyntaxTree,
    /// Human-readable audit trail, in the order edits were made
    pub modifications: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
    pub imports: Option<ImportDirective>,
}

impl Rewrite {
    /// A pass that changed nothing
    pub fn unchanged(tree: SyntaxTree) -> Self {
        Self {
            tree,
            modifications: Vec::new(),
            diagnostics: Vec::new(),
            imports: None,
        }
    }

    pub fn with_diagnostic(mut self, diagnostic: Diagnostic) -> Self {
        self.diagnostics.push(diagnostic);
        self
    }

    pub fn modification_count(&self) -> usize {
        self.modifications.len()
    }
}

/// A source-to-source transformation
pub trait Transformer: Send + Sync {
    /// Name, description, version and author
    fn describe(&self) -> TransformerMetadata;

    /// Cheap textual check for whether this transformer has anything to do in `source`
    fn can_handle(&self, source: &str) -> bool;

    /// Rewrite one parsed file
    fn rewrite(&self, tree: SyntaxTree) -> Result<Rewrite>;

    /// Parse, rewrite, generate and validate in one call
    ///
    /// Sources the transformer cannot handle come back unchanged.
    fn apply(&self, source: &str) -> Result<String> {
        let tree = PythonParser::new().parse(source)?;
        let rewrite = if self.can_handle(source) {
            self.rewrite(tree)?
        } else {
            Rewrite::unchanged(tree)
        };
        let generated = SourceGenerator::new().finalize(rewrite)?;
        ValidationEngine::validate_syntax(&generated.text)?;
        Ok(generated.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_problems() {
        assert_eq!(TransformerMetadata::new("pathlib", "x").problem(), None);
        assert!(TransformerMetadata::new(" ", "x").problem().is_some());
        assert!(TransformerMetadata::new("two words", "x").problem().is_some());
        assert!(TransformerMetadata::new("ok", "x")
            .with_version("")
            .problem()
            .is_some());
    }
}
