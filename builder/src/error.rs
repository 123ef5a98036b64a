//! Error types for the survey import pipeline.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`SourceError`] - Survey definition and resource file errors
//! - [`ConfigError`] - Main/project configuration errors
//! - [`EmitError`] - Record emission errors
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;
use thiserror::Error;

use crate::parser::RowError;

// =============================================================================
// Source Errors
// =============================================================================

/// Errors while reading the survey definition or one of its resources.
#[derive(Debug, Error)]
pub enum SourceError {
    /// A required resource file does not exist.
    #[error("Resource not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Failed to read a file.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The survey definition could not be parsed.
    #[error("Invalid survey definition: {0}")]
    Row(#[from] RowError),

    /// A required column is missing from the survey definition header.
    #[error("Missing column in survey definition: {0}")]
    MissingColumn(String),

    /// The survey definition has no header row.
    #[error("Survey definition is empty")]
    Empty,
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while loading or applying configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a configuration file.
    #[error("Failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed JSON.
    #[error("Config JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The project configuration does not match its schema.
    #[error("Project config failed validation: {errors:?}")]
    Schema { errors: Vec<String> },

    /// No survey title configured for a language.
    #[error("No survey title for language '{0}'")]
    MissingTitle(String),

    /// No section text configured for a section/language pair.
    #[error("No text for section {section} in language '{language}'")]
    MissingSectionText { section: usize, language: String },
}

// =============================================================================
// Emission Errors
// =============================================================================

/// Errors while emitting records.
#[derive(Debug, Error)]
pub enum EmitError {
    /// The row declares an answer format with no emitter.
    #[error(
        "Unknown answer format '{format}' for question '{code}' (expected one of: {})",
        crate::models::AnswerShape::known_formats()
    )]
    UnknownAnswerFormat { code: String, format: String },

    /// The output sink rejected a record.
    #[error("Failed to write record: {0}")]
    Sink(#[from] csv::Error),

    /// Flushing the output failed.
    #[error("Failed to flush output: {0}")]
    Flush(#[from] std::io::Error),

    /// The import file could not be staged or moved into place.
    #[error("Failed to write {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the error type returned by [`crate::transform::pipeline::build_survey`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Survey definition or resource error.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Emission error.
    #[error("Emit error: {0}")]
    Emit(#[from] EmitError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for emission operations.
pub type EmitResult<T> = Result<T, EmitError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
