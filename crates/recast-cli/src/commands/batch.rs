// Transform many files

use super::{Command, Context};
use crate::error::{CliError, CliResult};
use crate::router::PathwayArgs;
use recast_engine::BatchOptions;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::warn;

pub struct BatchCommand {
    pub files: Vec<PathBuf>,
    pub pathway: PathwayArgs,
    pub in_place: bool,
    pub workers: Option<usize>,
    pub json: bool,
}

impl BatchCommand {
    pub fn new(
        files: Vec<PathBuf>,
        pathway: PathwayArgs,
        in_place: bool,
        workers: Option<usize>,
        json: bool,
    ) -> Self {
        Self {
            files,
            pathway,
            in_place,
            workers,
            json,
        }
    }
}

#[async_trait::async_trait]
impl Command for BatchCommand {
    async fn execute(&self, context: &Context) -> CliResult<()> {
        if self.workers == Some(0) {
            return Err(CliError::InvalidArgument {
                message: "--workers must be at least 1".to_string(),
            });
        }
        let pathway = self.pathway.load()?;

        let cancel = CancellationToken::new();
        let interrupt = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("interrupted; finishing files already in progress");
                    cancel.cancel();
                }
            })
        };

        let mut options = BatchOptions::new().in_place(self.in_place).with_cancel(cancel);
        options.workers = self.workers;
        let report = context
            .orchestrator
            .apply_batch(&self.files, &pathway, options)
            .await;
        interrupt.abort();

        if self.json {
            println!("{}", report.to_json()?);
        } else {
            for file in &report.files {
                println!("{}", context.style.file_report(file, context.verbose));
            }
            println!("{}", context.style.summary(&report));
        }

        if report.is_success() {
            Ok(())
        } else {
            Err(CliError::FilesFailed {
                failed: report.failure_count(),
                total: report.files.len(),
            })
        }
    }
}
