//! Main and per-project configuration.
//!
//! - [`MainConfig`] - output layout and record templates shared by every project
//! - [`ProjectConfig`] - languages, titles, section texts and overrides of one project
//!
//! Both are plain JSON documents. The main configuration ships with compiled-in
//! defaults; the project configuration lives in `<project>/config.json` and is
//! checked against an embedded JSON Schema before use.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};
use crate::models::{fields, AnswerShape, Record};
use crate::validation::validate_project_config;

// =============================================================================
// Main configuration
// =============================================================================

/// Layout of the import file and the templates every record starts from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MainConfig {
    /// Language rendered first; its text lives in the `question` column.
    pub base_language: String,
    /// Output columns, in order.
    pub output_fields: Vec<String>,
    /// Survey-wide records written once at the top of the file.
    pub global_headers: Vec<Record>,
    /// Per-language settings records.
    pub global_settings: Vec<Record>,
    /// Template of a section (group) record.
    pub group_format: Record,
    pub questions: QuestionTemplates,
    pub subquestion: Record,
    pub answers: AnswerTemplates,
}

/// One question template per shape, plus the multi-likert header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionTemplates {
    pub one_choice: Record,
    pub ranking: Record,
    pub multiple_choices: Record,
    pub free_numeric: Record,
    pub free_text: Record,
    pub likert: Record,
    pub yes_no_na: Record,
    pub multi_likert: Record,
}

impl QuestionTemplates {
    pub fn for_shape(&self, shape: AnswerShape) -> &Record {
        match shape {
            AnswerShape::OneChoice => &self.one_choice,
            AnswerShape::Ranking => &self.ranking,
            AnswerShape::MultipleChoices => &self.multiple_choices,
            AnswerShape::FreeNumeric => &self.free_numeric,
            AnswerShape::FreeText => &self.free_text,
            AnswerShape::Likert => &self.likert,
            AnswerShape::YesNoNa => &self.yes_no_na,
        }
    }
}

/// Answer templates of the shapes that carry an answer list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerTemplates {
    pub one_choice: Record,
    pub ranking: Record,
    pub multiple_choices: Record,
    pub likert: Record,
}

fn record(pairs: &[(&str, &str)]) -> Record {
    pairs.iter().map(|(k, v)| (*k, *v)).collect()
}

fn question(type_scale: &str) -> Record {
    record(&[
        (fields::CLASS, "Q"),
        (fields::TYPE_SCALE, type_scale),
        (fields::RELEVANCE, "1"),
        ("mandatory", "N"),
    ])
}

fn answer() -> Record {
    record(&[(fields::CLASS, "A"), (fields::TYPE_SCALE, "0")])
}

fn survey_header(name: &str, text: &str) -> Record {
    record(&[(fields::CLASS, "S"), (fields::NAME, name), (fields::TEXT, text)])
}

fn survey_setting(name: &str, text: &str) -> Record {
    record(&[(fields::CLASS, "SL"), (fields::NAME, name), (fields::TEXT, text)])
}

impl Default for MainConfig {
    fn default() -> Self {
        let output_fields = [
            "id",
            "related_id",
            "class",
            "type/scale",
            "name",
            "relevance",
            "text",
            "help",
            "language",
            "validation",
            "mandatory",
            "other",
            "default",
            "same_default",
            "random_order",
            "hide_tip",
            "page_break",
            "display_columns",
        ];

        Self {
            base_language: "en".to_string(),
            output_fields: output_fields.iter().map(|s| s.to_string()).collect(),
            global_headers: vec![
                survey_header("sid", ""),
                survey_header("format", "G"),
                survey_header("language", "en"),
                survey_header("additional_languages", ""),
                survey_header("admin", ""),
                survey_header("adminemail", ""),
                survey_header("anonymized", "N"),
                survey_header("datestamp", "N"),
                survey_header("ipaddr", "N"),
                survey_header("allowprev", "Y"),
                survey_header("showprogress", "Y"),
                survey_header("showwelcome", "Y"),
                survey_header("tokenlength", "15"),
            ],
            global_settings: vec![
                survey_setting("surveyls_description", ""),
                survey_setting("surveyls_welcometext", ""),
                survey_setting("surveyls_endtext", ""),
                survey_setting("surveyls_url", ""),
                survey_setting("surveyls_urldescription", ""),
                survey_setting("surveyls_dateformat", "1"),
                survey_setting("surveyls_numberformat", "0"),
            ],
            group_format: record(&[(fields::CLASS, "G"), (fields::RELEVANCE, "1")]),
            questions: QuestionTemplates {
                one_choice: question("L"),
                ranking: question("R"),
                multiple_choices: question("M"),
                free_numeric: question("N"),
                free_text: question("T"),
                likert: question("F"),
                yes_no_na: question("Y"),
                multi_likert: question("F"),
            },
            subquestion: record(&[
                (fields::CLASS, "SQ"),
                (fields::TYPE_SCALE, "0"),
                (fields::RELEVANCE, "1"),
            ]),
            answers: AnswerTemplates {
                one_choice: answer(),
                ranking: answer(),
                multiple_choices: answer(),
                likert: answer(),
            },
        }
    }
}

impl MainConfig {
    /// Load a main configuration from JSON. Missing keys keep their defaults.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = read_config(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

// =============================================================================
// Project configuration
// =============================================================================

/// A record inserted at a fixed position of a header or settings list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insertion {
    pub position: usize,
    pub record: Record,
}

/// Settings of one survey project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Languages rendered after the base language, in translation-column order.
    #[serde(default)]
    pub languages_to_add: Vec<String>,
    /// Survey title per language.
    pub survey_title: HashMap<String, String>,
    /// Section texts, zero-based, each keyed by language.
    #[serde(default)]
    pub sections: Vec<HashMap<String, Record>>,
    #[serde(default)]
    pub header_to_modify: Vec<Record>,
    #[serde(default)]
    pub header_to_add: Vec<Insertion>,
    #[serde(default)]
    pub settings_to_modify: Vec<Record>,
    #[serde(default)]
    pub settings_to_add: Vec<Insertion>,
}

impl ProjectConfig {
    /// Load and validate `config.json`.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = read_config(path)?;
        Self::from_json(&content)
    }

    /// Parse and validate a project configuration document.
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let value: Value = serde_json::from_str(content)?;
        validate_project_config(&value).map_err(|errors| ConfigError::Schema { errors })?;
        Ok(serde_json::from_value(value)?)
    }

    pub fn title(&self, language: &str) -> ConfigResult<&str> {
        self.survey_title
            .get(language)
            .map(String::as_str)
            .ok_or_else(|| ConfigError::MissingTitle(language.to_string()))
    }

    /// Text record of a zero-based section in one language.
    pub fn section_text(&self, section: usize, language: &str) -> ConfigResult<&Record> {
        self.sections
            .get(section)
            .and_then(|texts| texts.get(language))
            .ok_or_else(|| ConfigError::MissingSectionText {
                section,
                language: language.to_string(),
            })
    }

    /// Whether the project sets `additional_languages` itself.
    pub fn overrides_header(&self, name: &str) -> bool {
        self.header_to_modify.iter().any(|r| r.name() == name)
            || self.header_to_add.iter().any(|i| i.record.name() == name)
    }
}

/// Example configuration for a two-language project.
pub fn example_project_config() -> ProjectConfig {
    let section = |en: &str, fr: &str| {
        HashMap::from([
            ("en".to_string(), Record::new().with(fields::NAME, en)),
            ("fr".to_string(), Record::new().with(fields::NAME, fr)),
        ])
    };

    ProjectConfig {
        languages_to_add: vec!["fr".to_string()],
        survey_title: HashMap::from([
            ("en".to_string(), "Research software survey".to_string()),
            ("fr".to_string(), "Enquête sur les logiciels de recherche".to_string()),
        ]),
        sections: vec![
            section("About you", "À propos de vous"),
            section("Your work", "Votre travail"),
        ],
        header_to_modify: vec![Record::new()
            .with(fields::CLASS, "S")
            .with(fields::NAME, "admin")
            .with(fields::TEXT, "Survey team")],
        header_to_add: vec![],
        settings_to_modify: vec![],
        settings_to_add: vec![Insertion {
            position: 1,
            record: Record::new()
                .with(fields::CLASS, "SL")
                .with(fields::NAME, "surveyls_policy_notice")
                .with(fields::TEXT, ""),
        }],
    }
}

/// Replace records by name, then insert additions at their positions.
///
/// Positions past the end append, so additions never fail.
pub fn apply_overrides(original: &[Record], modify: &[Record], add: &[Insertion]) -> Vec<Record> {
    let mut out: Vec<Record> = original
        .iter()
        .map(|r| {
            modify
                .iter()
                .find(|m| m.name() == r.name())
                .unwrap_or(r)
                .clone()
        })
        .collect();

    for insertion in add {
        let at = insertion.position.min(out.len());
        out.insert(at, insertion.record.clone());
    }
    out
}

fn read_config(path: &Path) -> ConfigResult<String> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_overrides_replaces_by_name() {
        let original = vec![
            Record::new().with("name", "admin").with("text", ""),
            Record::new().with("name", "format").with("text", "G"),
        ];
        let modify = vec![Record::new().with("name", "admin").with("text", "Team")];

        let out = apply_overrides(&original, &modify, &[]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].value("text"), "Team");
        assert_eq!(out[1].value("text"), "G");
    }

    #[test]
    fn test_apply_overrides_inserts_in_order() {
        let original = vec![
            Record::new().with("name", "a"),
            Record::new().with("name", "b"),
        ];
        let add = vec![
            Insertion { position: 1, record: Record::new().with("name", "x") },
            Insertion { position: 99, record: Record::new().with("name", "y") },
            Insertion { position: 0, record: Record::new().with("name", "z") },
        ];

        let names: Vec<String> = apply_overrides(&original, &[], &add)
            .iter()
            .map(|r| r.name().to_string())
            .collect();
        assert_eq!(names, vec!["z", "a", "x", "b", "y"]);
    }

    #[test]
    fn test_project_config_from_json() {
        let json = r#"{
            "languages_to_add": ["de"],
            "survey_title": {"en": "Survey", "de": "Umfrage"},
            "sections": [{"en": {"name": "Intro"}, "de": {"name": "Einleitung"}}]
        }"#;
        let config = ProjectConfig::from_json(json).unwrap();

        assert_eq!(config.languages_to_add, vec!["de"]);
        assert_eq!(config.title("de").unwrap(), "Umfrage");
        assert_eq!(config.section_text(0, "de").unwrap().name(), "Einleitung");
        assert!(config.header_to_add.is_empty());
    }

    #[test]
    fn test_project_config_schema_violation() {
        let json = r#"{"survey_title": {"en": "Survey"}, "languages_to_add": "de"}"#;
        let err = ProjectConfig::from_json(json).unwrap_err();
        assert!(matches!(err, ConfigError::Schema { .. }));
    }

    #[test]
    fn test_missing_title_and_section() {
        let config = example_project_config();
        assert!(matches!(config.title("it"), Err(ConfigError::MissingTitle(_))));
        assert!(matches!(
            config.section_text(5, "en"),
            Err(ConfigError::MissingSectionText { section: 5, .. })
        ));
    }

    #[test]
    fn test_example_config_passes_schema() {
        let value = serde_json::to_value(example_project_config()).unwrap();
        assert!(validate_project_config(&value).is_ok());
    }

    #[test]
    fn test_main_config_partial_json_keeps_defaults() {
        let config: MainConfig = serde_json::from_str(r#"{"base_language": "fr"}"#).unwrap();
        assert_eq!(config.base_language, "fr");
        assert_eq!(config.questions.ranking.value("type/scale"), "R");
        assert!(config.output_fields.contains(&"type/scale".to_string()));
    }

    #[test]
    fn test_question_template_per_shape() {
        let config = MainConfig::default();
        for shape in AnswerShape::ALL {
            assert_eq!(config.questions.for_shape(shape).value("class"), "Q");
        }
        assert_eq!(config.questions.for_shape(AnswerShape::FreeNumeric).value("type/scale"), "N");
    }
}
