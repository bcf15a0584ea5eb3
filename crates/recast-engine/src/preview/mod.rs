//! Dry-run previews of transformations

pub mod generator;

pub use generator::{DiffStats, Preview, PreviewGenerator};
