//! # Surveyimport - survey definitions to LimeSurvey import files
//!
//! Surveyimport reads a survey described as a CSV table (one row per question,
//! with translations in extra columns) and writes the tab-separated file
//! LimeSurvey imports as a complete multilingual survey.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Survey CSV  │────▶│   Parser    │────▶│   Grouper   │────▶│   Emitter   │──▶ TSV
//! │  (ISO/UTF8) │     │  (auto-enc) │     │ (compound)  │     │ (per lang)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//!                                                                    ▲
//!                     config.json, listAnswers/, texts/ ─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use surveyimport::{build_survey, BuildOptions};
//! use std::path::Path;
//!
//! let report = build_survey(Path::new("projects/uk_2017"), BuildOptions::default()).unwrap();
//! println!("Wrote {} records in {} languages", report.records, report.languages.len());
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Rows, records, groups and answer shapes
//! - [`parser`] - Survey CSV and project resources
//! - [`config`] - Main and project configuration
//! - [`validation`] - Project configuration schema
//! - [`transform`] - Grouping, emission and the pipeline
//! - [`logs`] - Progress log broadcaster

// Core modules
pub mod error;
pub mod models;

// Inputs
pub mod config;
pub mod parser;

// Transformation
pub mod transform;

// Validation
pub mod validation;

// Logging
pub mod logs;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{ConfigError, EmitError, PipelineError, SourceError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{AnswerShape, Group, GroupShape, Record, Row};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use config::{example_project_config, MainConfig, ProjectConfig};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{is_valid, is_valid_project_config, validate, validate_project_config};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{
    decode_content, detect_encoding, parse_survey, ProjectDir, ResourceSource, RowError,
    RowSource,
};

// =============================================================================
// Re-exports - Transformation
// =============================================================================

pub use transform::condition::{parse_condition, Condition, Connector};
pub use transform::grouper::{group_rows, GroupState};
pub use transform::sink::{RecordSink, TsvSink};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{build_records, build_survey, BuildOptions, BuildReport, PassReport};
