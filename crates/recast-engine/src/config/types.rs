//! Configuration types

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Settings shared by the orchestrator, registry and CLI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Files processed concurrently in batch mode
    pub workers: usize,
    /// Suffix of derived output names: `<stem>_<suffix><.ext>`
    pub output_suffix: String,
    /// Put derived outputs here instead of next to their sources
    pub output_dir: Option<PathBuf>,
    /// Put in-place backups here instead of next to their sources
    pub backup_dir: Option<PathBuf>,
    /// Extra recipe files to register as transformers
    pub recipe_dir: Option<PathBuf>,
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            output_suffix: "transformed".to_string(),
            output_dir: None,
            backup_dir: None,
            recipe_dir: None,
            log_level: "info".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(EngineError::Config("workers must be at least 1".to_string()));
        }
        if self.output_suffix.is_empty() {
            return Err(EngineError::Config("output_suffix cannot be empty".to_string()));
        }
        if self
            .output_suffix
            .chars()
            .any(|c| std::path::is_separator(c) || c.is_whitespace())
        {
            return Err(EngineError::Config(format!(
                "output_suffix `{}` must be a plain name fragment",
                self.output_suffix
            )));
        }
        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(EngineError::Config(format!(
                "unknown log_level `{}` (expected one of {})",
                self.log_level,
                LOG_LEVELS.join(", ")
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.workers >= 1);
        assert_eq!(config.output_suffix, "transformed");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_values() {
        let bad = [
            EngineConfig { workers: 0, ..EngineConfig::default() },
            EngineConfig { output_suffix: "a/b".to_string(), ..EngineConfig::default() },
            EngineConfig { log_level: "loud".to_string(), ..EngineConfig::default() },
        ];
        for config in bad {
            assert!(matches!(config.validate(), Err(EngineError::Config(_))));
        }
    }
}
