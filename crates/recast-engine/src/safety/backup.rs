//! Timestamped, hash-verified backups

use super::content_hash;
use crate::error::{EngineError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// Where a backup went and what it contains
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupRecord {
    pub original_path: PathBuf,
    pub backup_path: PathBuf,
    pub timestamp: DateTime<Utc>,
    pub content_hash: String,
}

/// Creates exact copies of files before they are overwritten in place
#[derive(Debug, Clone, Default)]
pub struct BackupManager {
    backup_dir: Option<PathBuf>,
}

impl BackupManager {
    /// Backups go into `backup_dir`, or next to the original when `None`
    pub fn new(backup_dir: Option<PathBuf>) -> Self {
        Self { backup_dir }
    }

    /// `<name>.<%Y%m%d_%H%M%S_%f>.bak`
    pub fn backup_path(&self, path: &Path, timestamp: DateTime<Utc>) -> PathBuf {
        let filename = format!(
            "{}.{}.bak",
            path.file_name().and_then(|n| n.to_str()).unwrap_or("file"),
            timestamp.format("%Y%m%d_%H%M%S_%f")
        );
        match (&self.backup_dir, path.parent()) {
            (Some(dir), _) => dir.join(filename),
            (None, Some(parent)) => parent.join(filename),
            (None, None) => PathBuf::from(filename),
        }
    }

    /// Copy `path` byte for byte and verify the copy's hash
    pub async fn create_backup(&self, path: &Path) -> Result<BackupRecord> {
        let content = fs::read(path).await.map_err(|e| {
            EngineError::Persist(format!("failed to read {} for backup: {}", path.display(), e))
        })?;
        let expected = content_hash(&content);

        let timestamp = Utc::now();
        let backup_path = self.backup_path(path, timestamp);
        if let Some(parent) = backup_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        fs::write(&backup_path, &content).await.map_err(|e| {
            EngineError::Persist(format!(
                "failed to write backup {}: {}",
                backup_path.display(),
                e
            ))
        })?;

        let stored = fs::read(&backup_path).await?;
        if content_hash(&stored) != expected {
            return Err(EngineError::Persist(format!(
                "backup {} does not match the original",
                backup_path.display()
            )));
        }

        info!(original = %path.display(), backup = %backup_path.display(), "created backup");
        Ok(BackupRecord {
            original_path: path.to_path_buf(),
            backup_path,
            timestamp,
            content_hash: expected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_backup_path_format() {
        let timestamp = Utc
            .with_ymd_and_hms(2024, 3, 9, 14, 5, 7)
            .single()
            .unwrap_or_else(Utc::now);
        let next_to = BackupManager::new(None).backup_path(Path::new("/src/app.py"), timestamp);
        assert_eq!(next_to, PathBuf::from("/src/app.py.20240309_140507_000000000.bak"));

        let elsewhere = BackupManager::new(Some(PathBuf::from("/backups")))
            .backup_path(Path::new("/src/app.py"), timestamp);
        assert_eq!(elsewhere, PathBuf::from("/backups/app.py.20240309_140507_000000000.bak"));
    }

    #[tokio::test]
    async fn test_backup_is_exact_copy() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let source = dir.path().join("legacy.py");
        let bytes = b"x = 1\r\n\xef\xbb\xbfy = 2\n";
        std::fs::write(&source, bytes)?;

        let record = BackupManager::new(Some(dir.path().join("bak")))
            .create_backup(&source)
            .await?;
        assert_eq!(std::fs::read(&record.backup_path)?, bytes.to_vec());
        assert_eq!(record.content_hash, content_hash(bytes));
        Ok(())
    }

    #[test]
    fn test_missing_source_is_a_persist_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let backups = dir.path().join("bak");
        let manager = BackupManager::new(Some(backups.clone()));

        let result = tokio_test::block_on(manager.create_backup(&dir.path().join("gone.py")));
        assert!(matches!(result, Err(EngineError::Persist(_))));
        assert!(!backups.exists());
        Ok(())
    }
}
