//! Unified diff rendering for previews

use crate::analysis::SourceStatistics;
use recast_parsers::Diagnostic;
use serde::Serialize;
use similar::{ChangeTag, TextDiff};
use std::path::PathBuf;

/// Line counts of a diff
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffStats {
    pub added: usize,
    pub removed: usize,
}

/// What a transformation would do to one file, without writing anything
#[derive(Debug, Clone, Serialize)]
pub struct Preview {
    pub path: PathBuf,
    pub original: String,
    pub transformed: String,
    pub modifications: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
    pub statistics: SourceStatistics,
    pub diff: DiffStats,
}

impl Preview {
    pub fn has_changes(&self) -> bool {
        self.original != self.transformed
    }

    pub fn unified_diff(&self) -> String {
        let label = self.path.display().to_string();
        PreviewGenerator::unified_diff(&self.original, &self.transformed, &label)
    }
}

/// Generates diffs between original and transformed sources
pub struct PreviewGenerator;

impl PreviewGenerator {
    /// Unified diff with three lines of context and `a/` `b/` headers
    pub fn unified_diff(original: &str, transformed: &str, label: &str) -> String {
        TextDiff::from_lines(original, transformed)
            .unified_diff()
            .context_radius(3)
            .header(&format!("a/{}", label), &format!("b/{}", label))
            .to_string()
    }

    pub fn diff_stats(original: &str, transformed: &str) -> DiffStats {
        let diff = TextDiff::from_lines(original, transformed);
        diff.iter_all_changes()
            .fold(DiffStats::default(), |mut stats, change| {
                match change.tag() {
                    ChangeTag::Insert => stats.added += 1,
                    ChangeTag::Delete => stats.removed += 1,
                    ChangeTag::Equal => {}
                }
                stats
            })
    }
}
