//! Recast Engine
//!
//! Recipe-driven, scope-aware rewriting of Python sources with validated output.
//!
//! # Architecture
//!
//! - **Recipes**: ordered substitution, insertion and deletion instructions, each fenced to
//!   `global` or a named function or class scope; stored as JSON or YAML
//! - **Scope-Aware Rewriter**: applies a recipe in one deterministic pass with an explicit scope
//!   stack and first-match-wins substitution
//! - **Pattern Rewriters**: structural API migrations (`os.path` to `pathlib`, `print` to
//!   `logging`) that also manage the imports they depend on
//! - **Registry**: built-in and `inventory`-submitted transformers plus recipe files, with
//!   per-plugin load failures isolated
//! - **Orchestrator**: the Read, Analyze, Transform, Generate, Validate, Persist, Report pipeline,
//!   and bounded-parallel batches that always report every input
//! - **Safety**: nothing is written before the generated text re-parses; in-place writes are
//!   preceded by a verified backup and land through temp-file-then-rename
//!
//! # Example
//!
//! ```ignore
//! use recast_engine::{Destination, EngineConfig, Orchestrator, Pathway, TransformerRegistry};
//!
//! let orchestrator = Orchestrator::new(TransformerRegistry::discover(), EngineConfig::default());
//! let report = orchestrator
//!     .apply_recipe(path, &Destination::Derived, &Pathway::Transformer("pathlib".into()))
//!     .await;
//! assert!(report.is_success());
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod generation;
pub mod orchestrator;
pub mod patterns;
pub mod preview;
pub mod providers;
pub mod recipe;
pub mod rewriter;
pub mod safety;
pub mod validation;

mod syntax;

// Re-export commonly used types
pub use analysis::{SourceAnalyzer, SourceStatistics};
pub use config::{ConfigLoader, EngineConfig};
pub use error::{EngineError, Result};
pub use generation::{GeneratedSource, SourceGenerator};
pub use orchestrator::{
    BatchOptions, Destination, FileReport, Orchestrator, Outcome, Pathway, Stage,
    TransformationReport,
};
pub use patterns::{
    CallSite, ImportPlan, ImportRequirement, LegacyImport, PathlibRules, PatternRewriter,
    PrintToLoggingRules, RewriteRules,
};
pub use preview::{Preview, PreviewGenerator};
pub use providers::{
    PluginLoadFailure, RecipeTransformer, Rewrite, Transformer, TransformerMetadata,
    TransformerPlugin, TransformerRegistry,
};
pub use recipe::{
    InsertPosition, Instruction, InstructionKind, Recipe, RecipeExporter, RecipeValidator, Value,
};
pub use rewriter::ScopeAwareRewriter;
pub use safety::{BackupManager, BackupRecord, SafeWriter};
pub use validation::ValidationEngine;

// Plugin crates submit with `inventory::submit!` against this path
pub use inventory;
