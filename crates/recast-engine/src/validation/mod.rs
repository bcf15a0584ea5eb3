//! Validity checks for generated code

pub mod engine;

pub use engine::ValidationEngine;
