// List registered transformers

use super::{Command, Context};
use crate::error::CliResult;

/// List transformers with their metadata, then any load failures
pub struct ListCommand;

#[async_trait::async_trait]
impl Command for ListCommand {
    async fn execute(&self, context: &Context) -> CliResult<()> {
        let style = &context.style;
        let registry = context.registry();

        println!("{}", style.header("Transformers"));
        for metadata in registry.metadata() {
            println!("{}", style.transformer(&metadata));
        }

        let failures = registry.failures();
        if !failures.is_empty() {
            println!();
            println!("{}", style.header("Failed to load"));
            for failure in failures {
                println!("{}", style.warning(&format!("{}: {}", failure.name, failure.message)));
            }
        }
        Ok(())
    }
}
