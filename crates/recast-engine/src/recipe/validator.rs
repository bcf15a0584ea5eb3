//! Structural validation of recipes before they run

use super::{InstructionKind, Recipe, Value};
use crate::error::{EngineError, Result};

/// Validates recipes
pub struct RecipeValidator;

impl RecipeValidator {
    /// Validate every instruction, failing on the first problem
    pub fn validate(recipe: &Recipe) -> Result<()> {
        for (index, instruction) in recipe.instructions().iter().enumerate() {
            let fail = |message: &str| EngineError::InvalidRecipe {
                index,
                message: message.to_string(),
            };

            let scope = instruction.scope();
            if scope.is_empty() {
                return Err(fail("scope cannot be empty"));
            }
            if scope.chars().any(char::is_whitespace) {
                return Err(fail("scope cannot contain whitespace"));
            }

            for value in [instruction.target(), instruction.replacement()].into_iter().flatten() {
                if matches!(value, Value::Float(f) if !f.is_finite()) {
                    return Err(fail("non-finite floats cannot be stored in a recipe"));
                }
            }

            match instruction.kind() {
                InstructionKind::Substitution => {
                    if instruction.target().is_none() {
                        return Err(fail("substitution requires a target"));
                    }
                    if instruction.replacement().is_none() {
                        return Err(fail("substitution requires a replacement"));
                    }
                    if instruction.position().is_some() {
                        return Err(fail("position is only valid for insertions"));
                    }
                }
                InstructionKind::Insertion => {
                    if instruction.position().is_none() {
                        return Err(fail("insertion requires a position"));
                    }
                    match instruction.code() {
                        Some(code) if !code.trim().is_empty() => {}
                        _ => return Err(fail("insertion requires a non-empty code fragment")),
                    }
                }
                InstructionKind::Deletion => {
                    if instruction.target().is_none() {
                        return Err(fail("deletion requires a target"));
                    }
                    if instruction.position().is_some() {
                        return Err(fail("position is only valid for insertions"));
                    }
                }
            }
        }
        Ok(())
    }

    /// Validate a recipe, collecting every problem instead of stopping at the first
    pub fn problems(recipe: &Recipe) -> Vec<EngineError> {
        recipe
            .instructions()
            .iter()
            .enumerate()
            .filter_map(|(index, instruction)| {
                let single = Recipe::new(vec![instruction.clone()]);
                Self::validate(&single).err().map(|err| match err {
                    EngineError::InvalidRecipe { message, .. } => {
                        EngineError::InvalidRecipe { index, message }
                    }
                    other => other,
                })
            })
            .collect()
    }
}
