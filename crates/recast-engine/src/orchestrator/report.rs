//! Per-file and per-batch reports

use crate::analysis::SourceStatistics;
use crate::error::{EngineError, Result};
use chrono::{DateTime, Utc};
use recast_parsers::Diagnostic;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Read,
    Analyze,
    Transform,
    Generate,
    Validate,
    Persist,
    Report,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Read => "read",
            Stage::Analyze => "analyze",
            Stage::Transform => "transform",
            Stage::Generate => "generate",
            Stage::Validate => "validate",
            Stage::Persist => "persist",
            Stage::Report => "report",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Failure,
}

/// What happened to one input file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub destination: Option<PathBuf>,
    pub backup: Option<PathBuf>,
    pub outcome: Outcome,
    /// Stage that failed; `None` on success and for files that never started
    pub failed_stage: Option<Stage>,
    pub error: Option<String>,
    pub modifications: Vec<String>,
    pub modification_count: usize,
    pub diagnostics: Vec<Diagnostic>,
    pub statistics: Option<SourceStatistics>,
    pub duration_ms: u64,
}

impl FileReport {
    /// A report that has not reached an outcome yet; it counts as a failure until marked
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            destination: None,
            backup: None,
            outcome: Outcome::Failure,
            failed_stage: None,
            error: None,
            modifications: Vec::new(),
            modification_count: 0,
            diagnostics: Vec::new(),
            statistics: None,
            duration_ms: 0,
        }
    }

    pub fn failed(path: &Path, stage: Option<Stage>, error: &EngineError) -> Self {
        let mut report = Self::new(path);
        report.fail(stage, error);
        report
    }

    /// Failure entry for a file the batch never started
    pub fn cancelled(path: &Path) -> Self {
        Self::failed(path, None, &EngineError::Cancelled)
    }

    pub fn fail(&mut self, stage: Option<Stage>, error: &EngineError) {
        self.outcome = Outcome::Failure;
        self.failed_stage = stage;
        self.error = Some(error.to_string());
    }

    pub fn succeed(&mut self) {
        self.outcome = Outcome::Success;
        self.failed_stage = None;
        self.error = None;
    }

    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }
}

/// Outcome of a batch; every input file appears exactly once, in input order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformationReport {
    pub pathway: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub files: Vec<FileReport>,
}

impl TransformationReport {
    pub fn success_count(&self) -> usize {
        self.files.iter().filter(|f| f.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.files.len() - self.success_count()
    }

    pub fn total_modifications(&self) -> usize {
        self.files.iter().map(|f| f.modification_count).sum()
    }

    pub fn is_success(&self) -> bool {
        self.failure_count() == 0
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| EngineError::Serialization(format!("Failed to export report to JSON: {}", e)))
    }

    pub fn from_json(data: &str) -> Result<Self> {
        serde_json::from_str(data)
            .map_err(|e| EngineError::Serialization(format!("Failed to import report from JSON: {}", e)))
    }
}
