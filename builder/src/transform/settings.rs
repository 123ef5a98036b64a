//! Survey header and per-language settings blocks.

use pulldown_cmark::{html, Parser};

use crate::config::{apply_overrides, MainConfig, ProjectConfig};
use crate::error::PipelineResult;
use crate::models::{fields, Record};
use crate::parser::ResourceSource;
use crate::transform::language::Language;

const ADDITIONAL_LANGUAGES: &str = "additional_languages";
const TITLE: &str = "surveyls_title";

/// Render a markdown message to HTML.
pub fn render_markdown(source: &str) -> String {
    let mut out = String::new();
    html::push_html(&mut out, Parser::new(source));
    out
}

/// Survey-wide records, written once before anything else.
pub fn header_records(
    main: &MainConfig,
    project: &ProjectConfig,
    languages: &[Language],
) -> Vec<Record> {
    let mut records = apply_overrides(
        &main.global_headers,
        &project.header_to_modify,
        &project.header_to_add,
    );

    if !project.overrides_header(ADDITIONAL_LANGUAGES) {
        let additional: Vec<&str> = languages
            .iter()
            .filter(|l| !l.is_base())
            .map(|l| l.code.as_str())
            .collect();
        for record in records.iter_mut().filter(|r| r.name() == ADDITIONAL_LANGUAGES) {
            record.set(fields::TEXT, additional.join(" "));
        }
    }
    records
}

/// Settings records of one language: title, messages and project overrides.
pub fn settings_records(
    main: &MainConfig,
    project: &ProjectConfig,
    resources: &dyn ResourceSource,
    language: &Language,
) -> PipelineResult<Vec<Record>> {
    let welcome = render_markdown(&resources.message("welcome", language.message_suffix())?);
    let end = render_markdown(&resources.message("end", language.message_suffix())?);

    let mut records = apply_overrides(
        &main.global_settings,
        &project.settings_to_modify,
        &project.settings_to_add,
    );

    let title = Record::new()
        .with(fields::CLASS, "SL")
        .with(fields::NAME, TITLE)
        .with(fields::TEXT, project.title(&language.code)?);
    records.insert(0, title);

    set_first_text(&mut records, "surveyls_welcometext", welcome);
    set_first_text(&mut records, "surveyls_endtext", end);

    for record in &mut records {
        record.set(fields::LANGUAGE, language.code.as_str());
    }
    Ok(records)
}

fn set_first_text(records: &mut [Record], name: &str, text: String) {
    if let Some(record) = records.iter_mut().find(|r| r.name() == name) {
        record.set(fields::TEXT, text);
    }
}
