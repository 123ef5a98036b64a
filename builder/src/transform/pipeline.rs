//! High-level pipeline API: survey project folder to import file.
//!
//! The import file is written in three blocks:
//!
//! 1. the survey header records, once;
//! 2. one settings block per language;
//! 3. per language, every section header and question record, in row order.
//!
//! Each language pass reads the rows again, groups them with a fresh grouper
//! and emits with a fresh [`QuestionEmitter`], so no state crosses passes.
//!
//! # Example
//!
//! ```rust,ignore
//! use surveyimport::{build_survey, BuildOptions};
//! use std::path::Path;
//!
//! let report = build_survey(Path::new("projects/uk_2017"), BuildOptions::default())?;
//! println!("Wrote {} records", report.records);
//! ```

use serde::Serialize;
use std::path::{Path, PathBuf};

use super::emit::QuestionEmitter;
use super::grouper::group_rows;
use super::language::{resolve_languages, Language};
use super::section::SectionTracker;
use super::settings::{header_records, settings_records};
use super::sink::{RecordSink, TsvSink};
use crate::config::{MainConfig, ProjectConfig};
use crate::error::{EmitResult, PipelineResult, SourceError};
use crate::logs::{log_info, log_success};
use crate::models::Record;
use crate::parser::{ProjectDir, ResourceSource, RowSource};

/// Options for a build
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Output file (default: `<project>/<name>_to_import.txt`)
    pub output: Option<PathBuf>,
    /// Main configuration file (default: compiled-in)
    pub main_config: Option<PathBuf>,
    /// Seed for randomized groups (default: drawn once per run)
    pub seed: Option<u64>,
}

/// Statistics of one language pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct PassReport {
    pub language: String,
    pub rows: usize,
    pub groups: usize,
    pub compound_groups: usize,
    pub sections: usize,
    pub records: usize,
}

/// Result of a complete build
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    /// File written, when built from a project folder
    pub output: Option<PathBuf>,
    pub languages: Vec<String>,
    /// Seed used for every randomized group
    pub seed: u64,
    /// Total records written, header line excluded
    pub records: usize,
    pub passes: Vec<PassReport>,
}

/// Build the import file of a project folder.
pub fn build_survey(project_path: &Path, options: BuildOptions) -> PipelineResult<BuildReport> {
    let project = ProjectDir::new(project_path);
    log_info(format!("📁 Project: {}", project.root().display()));

    let main = match &options.main_config {
        Some(path) => {
            log_info(format!("Using main config: {}", path.display()));
            MainConfig::load(path)?
        }
        None => MainConfig::default(),
    };
    let config = ProjectConfig::load(&project.config_path())?;
    log_success("Project config valid");

    let output = options
        .output
        .clone()
        .unwrap_or_else(|| project.default_output_path());
    let mut sink = TsvSink::staged(&output, main.output_fields.clone())?;

    let seed = options.seed.unwrap_or_else(rand::random);
    let mut report = build_records(&main, &config, &project, &project, seed, &mut sink)?;
    sink.commit(&output)?;

    log_success(format!("💾 Output written to: {}", output.display()));
    report.output = Some(output);
    Ok(report)
}

/// Emit every record of a survey into `sink`.
pub fn build_records(
    main: &MainConfig,
    project: &ProjectConfig,
    rows: &dyn RowSource,
    resources: &dyn ResourceSource,
    seed: u64,
    sink: &mut dyn RecordSink,
) -> PipelineResult<BuildReport> {
    let languages = resolve_languages(main, project);
    let codes: Vec<String> = languages.iter().map(|l| l.code.clone()).collect();
    log_info(format!("🌐 Languages: {}", codes.join(", ")));

    let mut sink = Counting::new(sink);

    for record in header_records(main, project, &languages) {
        sink.write(&record)?;
    }

    for language in &languages {
        for record in settings_records(main, project, resources, language)? {
            sink.write(&record)?;
        }
    }
    log_success(format!("Header and {} settings block(s) written", languages.len()));

    let mut passes = Vec::with_capacity(languages.len());
    for language in &languages {
        let pass = run_pass(main, project, rows, resources, language, seed, &mut sink)?;
        log_success(format!(
            "[{}] {} rows → {} groups ({} compound), {} sections, {} records",
            pass.language, pass.rows, pass.groups, pass.compound_groups, pass.sections, pass.records
        ));
        passes.push(pass);
    }

    Ok(BuildReport {
        output: None,
        languages: codes,
        seed,
        records: sink.count,
        passes,
    })
}

/// One language pass over freshly read rows.
fn run_pass(
    main: &MainConfig,
    project: &ProjectConfig,
    rows: &dyn RowSource,
    resources: &dyn ResourceSource,
    language: &Language,
    seed: u64,
    sink: &mut Counting<'_>,
) -> PipelineResult<PassReport> {
    let rows = rows.rows()?;
    let start = sink.count;
    let mut report = PassReport {
        language: language.code.clone(),
        rows: rows.len(),
        ..Default::default()
    };

    let text_field = language.text_field();
    if !rows.is_empty() && rows.iter().all(|r| !r.texts.contains_key(&text_field)) {
        return Err(SourceError::MissingColumn(text_field).into());
    }

    let mut tracker = SectionTracker::new();
    let mut emitter = QuestionEmitter::new(main, resources, language, seed);

    for group in group_rows(rows) {
        if tracker.enter(group.first().section, main, project, &language.code, sink)? {
            report.sections += 1;
        }
        report.groups += 1;
        if group.is_compound() {
            report.compound_groups += 1;
        }
        emitter.emit_group(group, sink)?;
    }

    report.records = sink.count - start;
    Ok(report)
}

/// Counts records on their way to the real sink.
struct Counting<'s> {
    inner: &'s mut dyn RecordSink,
    count: usize,
}

impl<'s> Counting<'s> {
    fn new(inner: &'s mut dyn RecordSink) -> Self {
        Self { inner, count: 0 }
    }
}

impl RecordSink for Counting<'_> {
    fn write(&mut self, record: &Record) -> EmitResult<()> {
        self.inner.write(record)?;
        self.count += 1;
        Ok(())
    }

    fn flush(&mut self) -> EmitResult<()> {
        self.inner.flush()
    }
}
