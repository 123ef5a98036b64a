//! Section header emission.

use crate::config::{MainConfig, ProjectConfig};
use crate::error::PipelineResult;
use crate::models::fields;
use crate::transform::sink::RecordSink;

/// Tracks the last section header written in one language pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionTracker {
    /// Zero-based index of the last header, -1 before the first one.
    current: i64,
}

impl Default for SectionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl SectionTracker {
    pub fn new() -> Self {
        Self { current: -1 }
    }

    pub fn current(&self) -> i64 {
        self.current
    }

    /// Write a section header if `section` (1-based) differs from the current one.
    ///
    /// Returns whether a header was written.
    pub fn enter(
        &mut self,
        section: u32,
        main: &MainConfig,
        project: &ProjectConfig,
        language: &str,
        sink: &mut dyn RecordSink,
    ) -> PipelineResult<bool> {
        let index = i64::from(section) - 1;
        if index == self.current {
            return Ok(false);
        }

        // Section 0 would map to -1, which is the reset value.
        let zero_based = usize::try_from(index).unwrap_or(0);
        let mut header = main.group_format.clone();
        header
            .set(fields::TYPE_SCALE, format!("G{}", zero_based))
            .set(fields::LANGUAGE, language)
            .merge(project.section_text(zero_based, language)?);

        sink.write(&header)?;
        self.current = index;
        Ok(true)
    }
}
