//! Temp-file-then-rename writes

use super::content_hash;
use crate::error::{EngineError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

/// Writes files so that a destination is either untouched or completely written
#[derive(Debug, Clone, Default)]
pub struct SafeWriter;

impl SafeWriter {
    pub fn new() -> Self {
        SafeWriter
    }

    /// Write `content` to a sibling temp file, rename it over `path`, then verify the result
    ///
    /// On failure the temp file is removed and `path` keeps its previous content.
    pub async fn write_atomic(&self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let temp_path = Self::temp_path(path);
        if let Err(err) = fs::write(&temp_path, content).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(EngineError::Persist(format!(
                "failed to write temporary file {}: {}",
                temp_path.display(),
                err
            )));
        }
        if let Err(err) = fs::rename(&temp_path, path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(EngineError::Persist(format!(
                "failed to move output into {}: {}",
                path.display(),
                err
            )));
        }

        let written = fs::read(path).await?;
        if content_hash(&written) != content_hash(content.as_bytes()) {
            return Err(EngineError::Persist(format!(
                "written content of {} does not match",
                path.display()
            )));
        }
        debug!(path = %path.display(), bytes = content.len(), "wrote file");
        Ok(())
    }

    /// `.tmp-<uuid>-<name>` next to `path`
    pub fn temp_path(path: &Path) -> PathBuf {
        let file_name = format!(
            ".tmp-{}-{}",
            Uuid::new_v4(),
            path.file_name().and_then(|n| n.to_str()).unwrap_or("file")
        );
        path.with_file_name(file_name)
    }
}
