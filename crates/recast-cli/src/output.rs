// Output formatting and styling

use colored::Colorize;
use recast_engine::{FileReport, TransformationReport, TransformerMetadata};
use recast_parsers::{Diagnostic, Severity};
use std::io::IsTerminal;

/// Output styling configuration
pub struct OutputStyle {
    pub use_colors: bool,
}

impl Default for OutputStyle {
    fn default() -> Self {
        Self {
            use_colors: std::io::stdout().is_terminal(),
        }
    }
}

impl OutputStyle {
    /// Format success message
    pub fn success(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "✓".green().bold(), msg)
        } else {
            format!("✓ {}", msg)
        }
    }

    /// Format error message
    pub fn error(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "✗".red().bold(), msg)
        } else {
            format!("✗ {}", msg)
        }
    }

    /// Format warning message
    pub fn warning(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "⚠".yellow(), msg)
        } else {
            format!("⚠ {}", msg)
        }
    }

    /// Format info message
    pub fn info(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "ℹ".blue(), msg)
        } else {
            format!("ℹ {}", msg)
        }
    }

    /// Format header
    pub fn header(&self, title: &str) -> String {
        if self.use_colors {
            title.bold().to_string()
        } else {
            title.to_string()
        }
    }

    /// Format list item
    pub fn list_item(&self, item: &str) -> String {
        if self.use_colors {
            format!("  {} {}", "•".cyan(), item)
        } else {
            format!("  • {}", item)
        }
    }

    pub fn diagnostic(&self, diagnostic: &Diagnostic) -> String {
        let text = diagnostic.to_string();
        match diagnostic.severity {
            Severity::Info => self.info(&text),
            Severity::Warning => self.warning(&text),
            Severity::Error => self.error(&text),
        }
    }

    /// Colour the `+`/`-` lines of a unified diff
    pub fn diff(&self, diff: &str) -> String {
        if !self.use_colors {
            return diff.to_string();
        }
        diff.lines()
            .map(|line| {
                if line.starts_with("+++") || line.starts_with("---") {
                    line.bold().to_string()
                } else if line.starts_with('+') {
                    line.green().to_string()
                } else if line.starts_with('-') {
                    line.red().to_string()
                } else if line.starts_with("@@") {
                    line.cyan().to_string()
                } else {
                    line.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn transformer(&self, metadata: &TransformerMetadata) -> String {
        let name = if self.use_colors {
            metadata.name.bold().to_string()
        } else {
            metadata.name.clone()
        };
        self.list_item(&format!(
            "{} v{} by {}: {}",
            name, metadata.version, metadata.author, metadata.description
        ))
    }

    /// One line per file plus its modifications and diagnostics
    pub fn file_report(&self, report: &FileReport, verbose: bool) -> String {
        let mut lines = Vec::new();
        if report.is_success() {
            let target = report
                .destination
                .as_ref()
                .map(|d| format!(" -> {}", d.display()))
                .unwrap_or_default();
            lines.push(self.success(&format!(
                "{}{} ({} modification(s), {} ms)",
                report.path.display(),
                target,
                report.modification_count,
                report.duration_ms
            )));
        } else {
            let stage = report
                .failed_stage
                .map(|s| format!(" [{}]", s))
                .unwrap_or_default();
            lines.push(self.error(&format!(
                "{}{}: {}",
                report.path.display(),
                stage,
                report.error.as_deref().unwrap_or("failed")
            )));
        }
        if let Some(backup) = &report.backup {
            lines.push(self.list_item(&format!("backup: {}", backup.display())));
        }
        if verbose {
            lines.extend(report.modifications.iter().map(|m| self.list_item(m)));
        }
        lines.extend(report.diagnostics.iter().map(|d| format!("  {}", self.diagnostic(d))));
        lines.join("\n")
    }

    pub fn summary(&self, report: &TransformationReport) -> String {
        let text = format!(
            "{} succeeded, {} failed, {} modification(s) with {}",
            report.success_count(),
            report.failure_count(),
            report.total_modifications(),
            report.pathway
        );
        if report.is_success() {
            self.success(&text)
        } else {
            self.error(&text)
        }
    }
}
