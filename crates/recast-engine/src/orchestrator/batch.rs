//! Bounded-parallel batch processing

use super::report::{FileReport, TransformationReport};
use super::{Destination, Orchestrator, Pathway};
use crate::error::EngineError;
use crate::providers::registry::panic_message;
use chrono::Utc;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Options for [`Orchestrator::apply_batch`]
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Overwrite sources (after backing them up) instead of writing derived outputs
    pub in_place: bool,
    /// Worker count; the configured default when `None`
    pub workers: Option<usize>,
    pub cancel: CancellationToken,
}

impl BatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_place(mut self, in_place: bool) -> Self {
        self.in_place = in_place;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

impl Orchestrator {
    /// Transform every file with the same pathway
    ///
    /// Each file runs its whole pipeline inside one worker; reports are gathered by a single
    /// receiver and returned in input order. Files that have not started when `cancel` fires are
    /// reported as cancelled failures.
    pub async fn apply_batch(
        &self,
        files: &[PathBuf],
        pathway: &Pathway,
        options: BatchOptions,
    ) -> TransformationReport {
        let started_at = Utc::now();
        let workers = options.workers.unwrap_or(self.config.workers).max(1);
        let destination = if options.in_place {
            Destination::InPlace
        } else {
            Destination::Derived
        };
        info!(files = files.len(), workers, pathway = %pathway.label(), "starting batch");

        let semaphore = Arc::new(Semaphore::new(workers));
        let pathway = Arc::new(pathway.clone());
        let (tx, mut rx) = mpsc::channel::<(usize, FileReport)>(files.len().max(1));

        for (index, path) in files.iter().enumerate() {
            let orchestrator = self.clone();
            let semaphore = semaphore.clone();
            let pathway = pathway.clone();
            let destination = destination.clone();
            let cancel = options.cancel.clone();
            let tx = tx.clone();
            let path = path.clone();

            tokio::spawn(async move {
                let report = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => FileReport::cancelled(&path),
                    permit = semaphore.acquire_owned() => match permit {
                        Ok(_permit) if cancel.is_cancelled() => FileReport::cancelled(&path),
                        Ok(_permit) => {
                            let work = orchestrator.run_pipeline(&path, &destination, &pathway);
                            match AssertUnwindSafe(work).catch_unwind().await {
                                Ok(report) => report,
                                Err(payload) => {
                                    let message = panic_message(payload.as_ref());
                                    warn!(path = %path.display(), %message, "worker panicked");
                                    FileReport::failed(
                                        &path,
                                        None,
                                        &EngineError::Other(format!("panicked: {}", message)),
                                    )
                                }
                            }
                        }
                        Err(_) => FileReport::cancelled(&path),
                    },
                };
                if tx.send((index, report)).await.is_err() {
                    debug!(path = %path.display(), "batch receiver dropped");
                }
            });
        }
        drop(tx);

        let mut slots: Vec<Option<FileReport>> = vec![None; files.len()];
        while let Some((index, report)) = rx.recv().await {
            if let Some(slot) = slots.get_mut(index) {
                *slot = Some(report);
            }
        }

        let files: Vec<FileReport> = slots
            .into_iter()
            .zip(files)
            .map(|(slot, path)| {
                slot.unwrap_or_else(|| {
                    FileReport::failed(path, None, &EngineError::Other("worker exited without a report".to_string()))
                })
            })
            .collect();

        let report = TransformationReport {
            pathway: pathway.label(),
            started_at,
            finished_at: Utc::now(),
            files,
        };
        info!(
            succeeded = report.success_count(),
            failed = report.failure_count(),
            modifications = report.total_modifications(),
            "batch finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::providers::TransformerRegistry;
    use crate::recipe::{Instruction, Recipe};
    use std::fs;

    fn orchestrator() -> Orchestrator {
        Orchestrator::new(TransformerRegistry::discover(), EngineConfig::default())
    }

    fn bump_ten() -> Pathway {
        Pathway::Recipe(Recipe::new(vec![Instruction::substitution(10, 20, "global")]))
    }

    #[tokio::test]
    async fn test_reports_follow_input_order() -> crate::error::Result<()> {
        let dir = tempfile::tempdir()?;
        let files: Vec<PathBuf> = (0..6)
            .map(|i| {
                let path = dir.path().join(format!("f{}.py", i));
                fs::write(&path, format!("x{} = 10\n", i)).map(|_| path)
            })
            .collect::<std::io::Result<_>>()?;

        let report = orchestrator()
            .apply_batch(&files, &bump_ten(), BatchOptions::new().with_workers(2))
            .await;
        assert_eq!(report.files.len(), 6);
        assert!(report.is_success());
        for (file, path) in report.files.iter().zip(&files) {
            assert_eq!(&file.path, path);
        }
        assert_eq!(fs::read_to_string(dir.path().join("f3_transformed.py"))?, "x3 = 20\n");
        Ok(())
    }

    #[tokio::test]
    async fn test_cancelled_before_start() -> crate::error::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("a.py");
        fs::write(&path, "x = 10\n")?;

        let cancel = CancellationToken::new();
        cancel.cancel();
        let report = orchestrator()
            .apply_batch(&[path.clone()], &bump_ten(), BatchOptions::new().with_cancel(cancel))
            .await;
        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.files[0].error.as_deref(), Some("Cancelled before processing"));
        assert!(!dir.path().join("a_transformed.py").exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let report = orchestrator().apply_batch(&[], &bump_ten(), BatchOptions::new()).await;
        assert!(report.files.is_empty());
        assert!(report.is_success());
    }
}
