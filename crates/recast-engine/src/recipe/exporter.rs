//! Recipe export and import

use super::Recipe;
use crate::error::{EngineError, Result};
use std::path::Path;

/// On-disk recipe formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeFormat {
    Json,
    Yaml,
}

impl RecipeFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Some(RecipeFormat::Json),
            Some("yaml") | Some("yml") => Some(RecipeFormat::Yaml),
            _ => None,
        }
    }
}

/// Exports and imports recipes
pub struct RecipeExporter;

impl RecipeExporter {
    /// Export a recipe to JSON format
    pub fn export_json(recipe: &Recipe) -> Result<String> {
        serde_json::to_string_pretty(recipe)
            .map_err(|e| EngineError::Serialization(format!("Failed to export recipe to JSON: {}", e)))
    }

    /// Export a recipe to YAML format
    pub fn export_yaml(recipe: &Recipe) -> Result<String> {
        serde_yaml::to_string(recipe)
            .map_err(|e| EngineError::Serialization(format!("Failed to export recipe to YAML: {}", e)))
    }

    /// Import a recipe from JSON format
    pub fn import_json(data: &str) -> Result<Recipe> {
        serde_json::from_str(data)
            .map_err(|e| EngineError::Serialization(format!("Failed to import recipe from JSON: {}", e)))
    }

    /// Import a recipe from YAML format
    pub fn import_yaml(data: &str) -> Result<Recipe> {
        serde_yaml::from_str(data)
            .map_err(|e| EngineError::Serialization(format!("Failed to import recipe from YAML: {}", e)))
    }

    /// Load a recipe file, choosing the format from its extension
    pub fn load(path: &Path) -> Result<Recipe> {
        let format = Self::format_of(path)?;
        let content = std::fs::read_to_string(path)?;
        match format {
            RecipeFormat::Json => Self::import_json(&content),
            RecipeFormat::Yaml => Self::import_yaml(&content),
        }
    }

    /// Save a recipe file, choosing the format from its extension
    pub fn save(recipe: &Recipe, path: &Path) -> Result<()> {
        let content = match Self::format_of(path)? {
            RecipeFormat::Json => Self::export_json(recipe)?,
            RecipeFormat::Yaml => Self::export_yaml(recipe)?,
        };
        std::fs::write(path, content)?;
        Ok(())
    }

    fn format_of(path: &Path) -> Result<RecipeFormat> {
        RecipeFormat::from_path(path).ok_or_else(|| {
            EngineError::Serialization(format!(
                "Unsupported recipe file format: {}",
                path.display()
            ))
        })
    }
}
