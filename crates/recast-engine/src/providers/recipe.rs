//! Recipe-backed transformer

use super::{Rewrite, Transformer, TransformerMetadata};
use crate::error::{EngineError, Result};
use crate::recipe::{Recipe, RecipeExporter, RecipeValidator};
use crate::rewriter::ScopeAwareRewriter;
use recast_parsers::SyntaxTree;
use std::path::Path;

/// Runs the scope-aware rewriter with a fixed recipe
#[derive(Debug, Clone)]
pub struct RecipeTransformer {
    metadata: TransformerMetadata,
    recipe: Recipe,
}

impl RecipeTransformer {
    /// Wrap a recipe, rejecting it if it is structurally invalid
    pub fn new(name: impl Into<String>, recipe: Recipe) -> Result<Self> {
        RecipeValidator::validate(&recipe)?;
        let description = format!("Recipe with {} instruction(s)", recipe.len());
        Ok(Self {
            metadata: TransformerMetadata::new(name, description),
            recipe,
        })
    }

    /// Load a recipe file; the transformer is named after the file stem
    pub fn from_file(path: &Path) -> Result<Self> {
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| {
                EngineError::Config(format!("recipe path has no usable name: {}", path.display()))
            })?
            .to_string();
        let recipe = RecipeExporter::load(path)?;
        let mut transformer = Self::new(name, recipe)?;
        transformer.metadata.description = format!(
            "Recipe from {} ({} instruction(s))",
            path.display(),
            transformer.recipe.len()
        );
        Ok(transformer)
    }

    pub fn recipe(&self) -> &Recipe {
        &self.recipe
    }
}

impl Transformer for RecipeTransformer {
    fn describe(&self) -> TransformerMetadata {
        self.metadata.clone()
    }

    fn can_handle(&self, _source: &str) -> bool {
        !self.recipe.is_empty()
    }

    fn rewrite(&self, tree: SyntaxTree) -> Result<Rewrite> {
        Ok(ScopeAwareRewriter::new(&self.recipe).rewrite(tree))
    }
}
