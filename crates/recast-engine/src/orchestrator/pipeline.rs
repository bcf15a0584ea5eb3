//! The per-file stage machine

use super::report::{FileReport, Stage};
use super::{Destination, Orchestrator, Pathway};
use crate::analysis::{SourceAnalyzer, SourceStatistics};
use crate::error::{EngineError, Result};
use crate::generation::{GeneratedSource, SourceGenerator};
use crate::providers::Rewrite;
use crate::validation::ValidationEngine;
use recast_parsers::{Diagnostic, PythonParser};
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, debug_span, info, info_span, warn, Instrument};

type StageResult<T> = std::result::Result<T, (Stage, EngineError)>;

/// Everything the stages before Persist produced
pub(crate) struct Prepared {
    pub original: String,
    pub statistics: SourceStatistics,
    pub generated: GeneratedSource,
}

fn run_stage<T>(stage: Stage, work: impl FnOnce() -> Result<T>) -> StageResult<T> {
    let _span = debug_span!("stage", %stage).entered();
    debug!("entering stage");
    work().map_err(|err| (stage, err))
}

async fn run_async_stage<T>(stage: Stage, work: impl Future<Output = Result<T>>) -> StageResult<T> {
    async move {
        debug!("entering stage");
        work.await
    }
    .instrument(debug_span!("stage", %stage))
    .await
    .map_err(|err| (stage, err))
}

impl Orchestrator {
    pub(crate) async fn run_pipeline(
        &self,
        source: &Path,
        destination: &Destination,
        pathway: &Pathway,
    ) -> FileReport {
        let span = info_span!("file", path = %source.display(), pathway = %pathway.label());
        async {
            let started = Instant::now();
            let mut report = FileReport::new(source);

            if let Err((stage, err)) = self.execute(source, destination, pathway, &mut report).await {
                warn!(%stage, error = %err, "transformation failed");
                report.fail(Some(stage), &err);
            }
            report.duration_ms = started.elapsed().as_millis() as u64;
            report
        }
        .instrument(span)
        .await
    }

    async fn execute(
        &self,
        source: &Path,
        destination: &Destination,
        pathway: &Pathway,
        report: &mut FileReport,
    ) -> StageResult<()> {
        let prepared = self.prepare(source, pathway, report).await?;
        report.modifications = prepared.generated.modifications.clone();
        report.diagnostics = prepared.generated.diagnostics.clone();

        run_async_stage(Stage::Persist, self.persist(source, destination, &prepared, report)).await?;

        run_stage(Stage::Report, || {
            report.modification_count = report.modifications.len();
            report.succeed();
            info!(
                modifications = report.modification_count,
                diagnostics = report.diagnostics.len(),
                destination = ?report.destination,
                "transformation succeeded"
            );
            Ok(())
        })
    }

    /// Read through Validate; nothing is written
    pub(crate) async fn prepare(
        &self,
        source: &Path,
        pathway: &Pathway,
        report: &mut FileReport,
    ) -> StageResult<Prepared> {
        let original = run_async_stage(Stage::Read, async {
            Ok::<_, EngineError>(tokio::fs::read_to_string(source).await?)
        })
        .await?;

        let (tree, statistics) = run_stage(Stage::Analyze, || {
            let tree = PythonParser::new().parse(&original)?;
            let statistics = SourceAnalyzer::new().analyze(&tree);
            debug!(?statistics, "analyzed source");
            Ok((tree, statistics))
        })?;
        report.statistics = Some(statistics);

        let rewrite = run_stage(Stage::Transform, || {
            let transformer = self.resolve(pathway)?;
            if !transformer.can_handle(&original) {
                let name = transformer.describe().name;
                debug!(transformer = %name, "nothing to do for this source");
                return Ok(Rewrite::unchanged(tree).with_diagnostic(Diagnostic::info(format!(
                    "transformer `{}` found nothing to rewrite",
                    name
                ))));
            }
            transformer.rewrite(tree)
        })?;

        let generated = run_stage(Stage::Generate, || SourceGenerator::new().finalize(rewrite))?;

        run_stage(Stage::Validate, || {
            ValidationEngine::validate_syntax(&generated.text)?;
            ValidationEngine::validate_idempotent(&generated.text)
        })?;

        Ok(Prepared {
            original,
            statistics,
            generated,
        })
    }

    async fn persist(
        &self,
        source: &Path,
        destination: &Destination,
        prepared: &Prepared,
        report: &mut FileReport,
    ) -> Result<()> {
        let target = match destination {
            Destination::InPlace => {
                if prepared.generated.text == prepared.original {
                    debug!("source unchanged, skipping in-place write");
                    report.destination = Some(source.to_path_buf());
                    return Ok(());
                }
                let backup = self.backups.create_backup(source).await?;
                report.backup = Some(backup.backup_path);
                source.to_path_buf()
            }
            Destination::Path(path) => self.checked_destination(source, path.clone()).await?,
            Destination::Derived => self.checked_destination(source, self.derived_path(source)).await?,
        };

        self.writer.write_atomic(&target, &prepared.generated.text).await?;
        report.destination = Some(target);
        Ok(())
    }

    /// Refuse any destination that resolves to the source file
    async fn checked_destination(&self, source: &Path, target: PathBuf) -> Result<PathBuf> {
        let same = match (
            tokio::fs::canonicalize(source).await,
            tokio::fs::canonicalize(&target).await,
        ) {
            (Ok(a), Ok(b)) => a == b,
            _ => source == target,
        };
        if same {
            return Err(EngineError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "destination {} is the source file; use an in-place write to overwrite it",
                    target.display()
                ),
            )));
        }
        Ok(target)
    }
}
