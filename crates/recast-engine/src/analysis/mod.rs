//! Pre-transform statistics for reports

pub mod analyzer;

pub use analyzer::{SourceAnalyzer, SourceStatistics};
