//! Parser error types and results

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Location and description of the first syntax error in a source text
///
/// Line and column are 1-based, matching what editors display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("line {line}, column {column}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl ParseError {
    /// Create a new parse error
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

/// Parser operation errors
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("Syntax error at {0}")]
    Syntax(#[from] ParseError),

    #[error("Tree-sitter error: {message}")]
    TreeSitterError { message: String },

    #[error("Invalid node type: expected {expected}, found {found}")]
    InvalidNodeType { expected: String, found: String },
}

impl ParserError {
    /// The syntax error carried by this failure, if any
    pub fn parse_error(&self) -> Option<&ParseError> {
        match self {
            ParserError::Syntax(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type for parser operations
pub type ParserResult<T> = std::result::Result<T, ParserError>;

/// Diagnostic severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARN"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// Non-fatal finding attached to a file while it is processed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub message: String,
    pub position: Option<crate::types::Position>,
    pub severity: Severity,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(position) => write!(f, "[{}] {} ({})", self.severity, self.message, position),
            None => write!(f, "[{}] {}", self.severity, self.message),
        }
    }
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            position: None,
            severity,
        }
    }

    /// Create a diagnostic with position information
    pub fn with_position(
        message: impl Into<String>,
        position: crate::types::Position,
        severity: Severity,
    ) -> Self {
        Self {
            message: message.into(),
            position: Some(position),
            severity,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Info)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Warning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Position;

    #[test]
    fn test_parse_error_display() {
        let err = ParserError::from(ParseError::new(3, 7, "unexpected `:`"));
        assert_eq!(err.to_string(), "Syntax error at line 3, column 7: unexpected `:`");
        assert_eq!(err.parse_error().map(|e| e.line), Some(3));
    }

    #[test]
    fn test_diagnostic_display() {
        let plain = Diagnostic::warning("scope `missing` never entered");
        assert_eq!(plain.to_string(), "[WARN] scope `missing` never entered");

        let located = Diagnostic::with_position("fragment skipped", Position::new(1, 4), Severity::Info);
        assert_eq!(located.to_string(), "[INFO] fragment skipped (2:5)");
    }
}
