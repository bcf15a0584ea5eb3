// Preview a transformation as a diff

use super::{Command, Context};
use crate::error::CliResult;
use crate::router::PathwayArgs;
use std::path::PathBuf;

pub struct PreviewCommand {
    pub source: PathBuf,
    pub pathway: PathwayArgs,
}

impl PreviewCommand {
    pub fn new(source: PathBuf, pathway: PathwayArgs) -> Self {
        Self { source, pathway }
    }
}

#[async_trait::async_trait]
impl Command for PreviewCommand {
    async fn execute(&self, context: &Context) -> CliResult<()> {
        let style = &context.style;
        let pathway = self.pathway.load()?;
        let preview = context.orchestrator.preview(&self.source, &pathway).await?;

        if !preview.has_changes() {
            println!("{}", style.info(&format!("{}: no changes", preview.path.display())));
        } else {
            println!("{}", style.diff(preview.unified_diff().trim_end()));
            println!(
                "{}",
                style.info(&format!(
                    "{} line(s) added, {} removed, {} modification(s)",
                    preview.diff.added,
                    preview.diff.removed,
                    preview.modifications.len()
                ))
            );
        }
        if context.verbose {
            for modification in &preview.modifications {
                println!("{}", style.list_item(modification));
            }
        }
        for diagnostic in &preview.diagnostics {
            println!("{}", style.diagnostic(diagnostic));
        }
        Ok(())
    }
}
