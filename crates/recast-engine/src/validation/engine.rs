//! Re-parse validation of generated code

use crate::error::{EngineError, Result};
use recast_parsers::{CodeGenerator, PythonParser};

/// Validates generated source before it may be persisted
pub struct ValidationEngine;

impl ValidationEngine {
    /// Create a new validation engine
    pub fn new() -> Self {
        Self
    }
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationEngine {
    /// Re-parse `code`; any syntax error becomes [`EngineError::Regeneration`]
    pub fn validate_syntax(code: &str) -> Result<()> {
        PythonParser::new()
            .check(code)
            .map_err(EngineError::regeneration)
    }

    /// Check that `code` regenerates to itself after a parse
    pub fn validate_idempotent(code: &str) -> Result<()> {
        let tree = PythonParser::new()
            .parse(code)
            .map_err(EngineError::regeneration)?;
        if CodeGenerator::new().generate(&tree) == code {
            Ok(())
        } else {
            Err(EngineError::Regeneration {
                line: 0,
                column: 0,
                message: "regenerated text differs from its input".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_code_passes() {
        assert!(ValidationEngine::validate_syntax("def f():\n    return 1\n").is_ok());
        assert!(ValidationEngine::validate_idempotent("x = [1,\n  2]  # c\n").is_ok());
    }

    #[test]
    fn test_invalid_code_is_a_regeneration_error() {
        let err = ValidationEngine::validate_syntax("x = (1,\n").err();
        assert!(matches!(err, Some(EngineError::Regeneration { line, .. }) if line >= 1));
    }
}
