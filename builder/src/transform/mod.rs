//! Transformation module.
//!
//! This module turns survey rows into import records:
//! - Grouper: flat rows to compound questions
//! - Emit: question, subquestion and answer records per group
//! - Section / Settings: section headers, survey header and settings blocks
//! - Sink: TSV output
//! - Pipeline: per-language passes over the whole survey

pub mod answers;
pub mod condition;
pub mod emit;
pub mod grouper;
pub mod language;
pub mod pipeline;
pub mod section;
pub mod settings;
pub mod sink;

pub use grouper::group_rows;
pub use pipeline::*;
