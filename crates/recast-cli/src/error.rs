// CLI error types

use recast_engine::EngineError;
use thiserror::Error;

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid recipe {path}: {problems} problem(s)")]
    InvalidRecipe { path: String, problems: usize },

    #[error("{failed} of {total} file(s) failed")]
    FilesFailed { failed: usize, total: usize },

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Get a user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            CliError::InvalidArgument { message } => {
                format!("Invalid argument: {}\n\nRun 'recast --help' for usage information.", message)
            }
            CliError::Config(msg) => {
                format!("Configuration error: {}\n\nCheck the file passed with --config.", msg)
            }
            CliError::InvalidRecipe { path, problems } => {
                format!("Recipe {} has {} problem(s); see the list above.", path, problems)
            }
            CliError::FilesFailed { failed, total } => {
                format!("{} of {} file(s) failed; their sources were left unchanged.", failed, total)
            }
            CliError::Engine(EngineError::UnknownTransformer(name)) => {
                format!("Unknown transformer: {}\n\nRun 'recast list' to see available transformers.", name)
            }
            CliError::Engine(e) => e.to_string(),
            CliError::Io(e) => format!("File operation failed: {}", e),
        }
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        let err = CliError::from(EngineError::UnknownTransformer("paths".to_string()));
        assert!(err.user_message().contains("recast list"));

        let err = CliError::FilesFailed { failed: 1, total: 3 };
        assert_eq!(err.to_string(), "1 of 3 file(s) failed");
        assert!(err.user_message().contains("left unchanged"));
    }
}
