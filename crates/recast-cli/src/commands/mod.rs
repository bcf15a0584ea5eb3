// Command handlers for the recast CLI

pub mod apply;
pub mod batch;
pub mod list;
pub mod preview;
pub mod recipe;

pub use apply::ApplyCommand;
pub use batch::BatchCommand;
pub use list::ListCommand;
pub use preview::PreviewCommand;
pub use recipe::RecipeCheckCommand;

use crate::error::CliResult;
use crate::output::OutputStyle;
use recast_engine::{EngineConfig, Orchestrator, TransformerRegistry};

/// Shared state every command runs with
pub struct Context {
    pub orchestrator: Orchestrator,
    pub style: OutputStyle,
    pub verbose: bool,
}

impl Context {
    pub fn new(registry: TransformerRegistry, config: EngineConfig, verbose: bool) -> Self {
        Self {
            orchestrator: Orchestrator::new(registry, config),
            style: OutputStyle::default(),
            verbose,
        }
    }

    pub fn registry(&self) -> &TransformerRegistry {
        self.orchestrator.registry()
    }
}

/// Trait for command handlers
#[async_trait::async_trait]
pub trait Command: Send + Sync {
    /// Execute the command
    async fn execute(&self, context: &Context) -> CliResult<()>;
}
