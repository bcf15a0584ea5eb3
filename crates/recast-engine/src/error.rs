//! Error types for the rewrite engine

use recast_parsers::{ParseError, ParserError};
use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur while loading, rewriting or persisting sources
#[derive(Debug, Error)]
pub enum EngineError {
    /// The input source does not parse
    #[error("Parse error at {0}")]
    Parse(ParseError),

    /// An instruction could not be applied (recovered locally as a diagnostic)
    #[error("Instruction #{index} failed: {message}")]
    Instruction { index: usize, message: String },

    /// The rewritten tree generated text that does not re-parse
    #[error("Generated code is invalid at line {line}, column {column}: {message}")]
    Regeneration {
        line: usize,
        column: usize,
        message: String,
    },

    /// A transformer failed to initialize
    #[error("Transformer '{name}' failed to load: {message}")]
    PluginLoad { name: String, message: String },

    /// Recipe failed structural validation
    #[error("Invalid recipe: instruction #{index}: {message}")]
    InvalidRecipe { index: usize, message: String },

    /// No transformer registered under this name
    #[error("Unknown transformer: {0}")]
    UnknownTransformer(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Refusing or failing to write a destination
    #[error("Persist error: {0}")]
    Persist(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Batch was cancelled before this file started
    #[error("Cancelled before processing")]
    Cancelled,

    /// Other error
    #[error("{0}")]
    Other(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl From<ParserError> for EngineError {
    fn from(err: ParserError) -> Self {
        match err {
            ParserError::Syntax(parse) => EngineError::Parse(parse),
            other => EngineError::Other(other.to_string()),
        }
    }
}

impl EngineError {
    /// Convert a failed re-parse of generated text into a regeneration error
    pub fn regeneration(err: ParserError) -> Self {
        match err {
            ParserError::Syntax(parse) => EngineError::Regeneration {
                line: parse.line,
                column: parse.column,
                message: parse.message,
            },
            other => EngineError::Regeneration {
                line: 0,
                column: 0,
                message: other.to_string(),
            },
        }
    }
}
