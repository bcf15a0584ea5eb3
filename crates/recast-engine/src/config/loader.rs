//! Configuration file loading

use super::types::EngineConfig;
use crate::error::{EngineError, Result};
use std::path::Path;
use tracing::debug;

/// Loads engine configuration from files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file
    pub fn load_from_yaml(path: &Path) -> Result<EngineConfig> {
        let content = Self::read(path)?;
        serde_yaml::from_str(&content)
            .map_err(|e| EngineError::Config(format!("Failed to parse YAML: {}", e)))
    }

    /// Load configuration from a JSON file
    pub fn load_from_json(path: &Path) -> Result<EngineConfig> {
        let content = Self::read(path)?;
        serde_json::from_str(&content)
            .map_err(|e| EngineError::Config(format!("Failed to parse JSON: {}", e)))
    }

    /// Load and validate a configuration file, detecting the format from its extension
    pub fn load(path: &Path) -> Result<EngineConfig> {
        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::load_from_yaml(path)?,
            Some("json") => Self::load_from_json(path)?,
            _ => {
                return Err(EngineError::Config(format!(
                    "Unsupported configuration file format: {}",
                    path.display()
                )))
            }
        };
        config.validate()?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Load `path` if given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<EngineConfig> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(EngineConfig::default()),
        }
    }

    fn read(path: &Path) -> Result<String> {
        std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("Failed to read config file: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_load_yaml_config() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let file_path = dir.path().join("recast.yaml");
        std::fs::write(
            &file_path,
            "workers: 2\noutput_suffix: modern\nbackup_dir: /var/backups/recast\n",
        )?;

        let config = ConfigLoader::load(&file_path)?;
        assert_eq!(config.workers, 2);
        assert_eq!(config.output_suffix, "modern");
        assert_eq!(config.backup_dir, Some(PathBuf::from("/var/backups/recast")));
        assert_eq!(config.log_level, "info");
        Ok(())
    }

    #[test]
    fn test_load_json_config_is_validated() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let file_path = dir.path().join("recast.json");
        std::fs::write(&file_path, r#"{"workers": 0}"#)?;
        assert!(matches!(ConfigLoader::load(&file_path), Err(EngineError::Config(_))));
        Ok(())
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(ConfigLoader::load(Path::new("recast.toml")).is_err());
        assert!(ConfigLoader::load_or_default(None).is_ok());
    }
}
