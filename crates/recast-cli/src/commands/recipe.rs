// Recipe file validation

use super::{Command, Context};
use crate::error::{CliError, CliResult};
use recast_engine::{InstructionKind, RecipeExporter, RecipeValidator};
use std::path::PathBuf;

pub struct RecipeCheckCommand {
    pub file: PathBuf,
}

impl RecipeCheckCommand {
    pub fn new(file: PathBuf) -> Self {
        Self { file }
    }
}

#[async_trait::async_trait]
impl Command for RecipeCheckCommand {
    async fn execute(&self, context: &Context) -> CliResult<()> {
        let style = &context.style;
        let recipe = RecipeExporter::load(&self.file)?;

        let problems = RecipeValidator::problems(&recipe);
        if !problems.is_empty() {
            for problem in &problems {
                println!("{}", style.error(&problem.to_string()));
            }
            return Err(CliError::InvalidRecipe {
                path: self.file.display().to_string(),
                problems: problems.len(),
            });
        }

        let count = |kind| recipe.of_kind(kind).count();
        println!(
            "{}",
            style.success(&format!(
                "{}: {} instruction(s) ({} substitution, {} insertion, {} deletion)",
                self.file.display(),
                recipe.len(),
                count(InstructionKind::Substitution),
                count(InstructionKind::Insertion),
                count(InstructionKind::Deletion)
            ))
        );
        let scopes: Vec<&str> = recipe.named_scopes().into_iter().collect();
        if !scopes.is_empty() {
            println!("{}", style.list_item(&format!("scopes: {}", scopes.join(", "))));
        }
        Ok(())
    }
}
