//! Per-file pipeline and batch driver
//!
//! Every file goes through Read, Analyze, Transform, Generate, Validate, Persist and Report in
//! that order. A failing stage ends the file's run with a failure entry naming the stage; the
//! source is never touched unless the caller asked for an in-place write, and even then only
//! after a verified backup exists and the new text has passed validation.

pub mod batch;
pub mod pipeline;
pub mod report;

pub use batch::BatchOptions;
pub use report::{FileReport, Outcome, Stage, TransformationReport};

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::preview::{Preview, PreviewGenerator};
use crate::providers::{RecipeTransformer, Transformer, TransformerRegistry};
use crate::recipe::Recipe;
use crate::safety::{BackupManager, SafeWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Which rewrite runs; exactly one per invocation
#[derive(Debug, Clone, PartialEq)]
pub enum Pathway {
    /// The scope-aware rewriter with this recipe
    Recipe(Recipe),
    /// A registered transformer, by name
    Transformer(String),
}

impl Pathway {
    pub fn label(&self) -> String {
        match self {
            Pathway::Recipe(recipe) => format!("recipe ({} instruction(s))", recipe.len()),
            Pathway::Transformer(name) => format!("transformer `{}`", name),
        }
    }
}

/// Where transformed text is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// An explicit path, which must not be the source
    Path(PathBuf),
    /// `<stem>_<suffix><.ext>` next to the source, or in the configured output directory
    Derived,
    /// Overwrite the source after backing it up
    InPlace,
}

/// Drives transformations over files
#[derive(Clone)]
pub struct Orchestrator {
    registry: TransformerRegistry,
    config: EngineConfig,
    writer: SafeWriter,
    backups: BackupManager,
}

impl Orchestrator {
    pub fn new(registry: TransformerRegistry, config: EngineConfig) -> Self {
        let backups = BackupManager::new(config.backup_dir.clone());
        Self {
            registry,
            config,
            writer: SafeWriter::new(),
            backups,
        }
    }

    pub fn registry(&self) -> &TransformerRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The transformer a pathway stands for
    pub fn resolve(&self, pathway: &Pathway) -> Result<Arc<dyn Transformer>> {
        match pathway {
            Pathway::Recipe(recipe) => Ok(Arc::new(RecipeTransformer::new("recipe", recipe.clone())?)),
            Pathway::Transformer(name) => self
                .registry
                .get(name)
                .ok_or_else(|| EngineError::UnknownTransformer(name.clone())),
        }
    }

    /// Derived output path for `source`
    pub fn derived_path(&self, source: &Path) -> PathBuf {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        let name = match source.extension() {
            Some(ext) => format!("{}_{}.{}", stem, self.config.output_suffix, ext.to_string_lossy()),
            None => format!("{}_{}", stem, self.config.output_suffix),
        };
        match &self.config.output_dir {
            Some(dir) => dir.join(name),
            None => source.with_file_name(name),
        }
    }

    /// Run the full pipeline on one file
    ///
    /// Never returns an error: every failure is recorded in the returned report.
    pub async fn apply_recipe(
        &self,
        source: &Path,
        destination: &Destination,
        pathway: &Pathway,
    ) -> FileReport {
        self.run_pipeline(source, destination, pathway).await
    }

    /// Run every stage except Persist and describe the result
    pub async fn preview(&self, source: &Path, pathway: &Pathway) -> Result<Preview> {
        let mut scratch = FileReport::new(source);
        let prepared = self
            .prepare(source, pathway, &mut scratch)
            .await
            .map_err(|(_, err)| err)?;

        let diff = PreviewGenerator::diff_stats(&prepared.original, &prepared.generated.text);
        Ok(Preview {
            path: source.to_path_buf(),
            original: prepared.original,
            transformed: prepared.generated.text,
            modifications: prepared.generated.modifications,
            diagnostics: prepared.generated.diagnostics,
            statistics: prepared.statistics,
            diff,
        })
    }
}
