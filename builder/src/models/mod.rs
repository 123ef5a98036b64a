//! Domain models for the survey import pipeline.
//!
//! This module contains the core data structures used throughout the pipeline:
//!
//! - [`Row`] - One question line of the survey definition
//! - [`Record`] - One flat output record (a line of the import file)
//! - [`AnswerShape`] - The seven singleton question shapes
//! - [`Group`] - Adjacent rows emitted together
//! - [`GroupShape`] - How a group is dispatched to the emitters

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::error::{EmitError, EmitResult};

/// Column holding the base-language question text.
pub const BASE_TEXT_FIELD: &str = "question";

// =============================================================================
// Row
// =============================================================================

/// One line of the survey definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// 1-based line number in the source file (header is line 1).
    pub line: usize,
    /// 1-based section number.
    pub section: u32,
    /// Question code, may end in digits marking an instance.
    pub code: String,
    /// Declared answer format, as written in the file.
    pub answer_format: String,
    /// Display condition, empty when unconditional.
    pub condition: String,
    /// Answer-option resource identifier, possibly empty.
    pub answer_file: String,
    /// `other` column was `Y`.
    pub other: bool,
    /// `random` column was `Y`.
    pub random: bool,
    /// Question text keyed by column (`question`, `lang_trans1`, ...).
    pub texts: HashMap<String, String>,
}

impl Row {
    /// Create a row with the given code and answer format, section 1 and no text.
    pub fn new(code: impl Into<String>, answer_format: impl Into<String>) -> Self {
        Self {
            line: 0,
            section: 1,
            code: code.into(),
            answer_format: answer_format.into(),
            condition: String::new(),
            answer_file: String::new(),
            other: false,
            random: false,
            texts: HashMap::new(),
        }
    }

    pub fn in_section(mut self, section: u32) -> Self {
        self.section = section;
        self
    }

    pub fn with_answer_file(mut self, file: impl Into<String>) -> Self {
        self.answer_file = file.into();
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = condition.into();
        self
    }

    pub fn with_text(mut self, field: impl Into<String>, text: impl Into<String>) -> Self {
        self.texts.insert(field.into(), text.into());
        self
    }

    pub fn with_other(mut self, other: bool) -> Self {
        self.other = other;
        self
    }

    pub fn with_random(mut self, random: bool) -> Self {
        self.random = random;
        self
    }

    /// Lower-cased answer format, used for every comparison.
    pub fn format_key(&self) -> String {
        self.answer_format.to_lowercase()
    }

    /// Code with all digits removed (`Q1a` -> `Qa`).
    pub fn code_stem(&self) -> String {
        self.code.chars().filter(|c| !c.is_ascii_digit()).collect()
    }

    pub fn has_condition(&self) -> bool {
        !self.condition.is_empty()
    }

    /// Text stored under `field`, empty if the column is absent.
    pub fn text(&self, field: &str) -> &str {
        self.texts.get(field).map(String::as_str).unwrap_or("")
    }

    /// `Y`/`N` flag used in the `other` output column.
    pub fn other_flag(&self) -> &'static str {
        if self.other {
            "Y"
        } else {
            "N"
        }
    }
}

// =============================================================================
// Output Record
// =============================================================================

/// Output field names shared by all record kinds.
pub mod fields {
    pub const CLASS: &str = "class";
    pub const TYPE_SCALE: &str = "type/scale";
    pub const NAME: &str = "name";
    pub const RELEVANCE: &str = "relevance";
    pub const TEXT: &str = "text";
    pub const LANGUAGE: &str = "language";
    pub const OTHER: &str = "other";
}

/// A flat output record: output field name to value.
///
/// Fields absent from the record are written as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(BTreeMap<String, String>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any previous value.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Builder-style [`Record::set`].
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Value of `field`, empty if absent.
    pub fn value(&self, field: &str) -> &str {
        self.get(field).unwrap_or("")
    }

    /// Copy every field of `other` into this record.
    pub fn merge(&mut self, other: &Record) -> &mut Self {
        for (k, v) in &other.0 {
            self.0.insert(k.clone(), v.clone());
        }
        self
    }

    pub fn name(&self) -> &str {
        self.value(fields::NAME)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// =============================================================================
// Answer Shapes
// =============================================================================

/// Question shape of a singleton row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerShape {
    OneChoice,
    Ranking,
    MultipleChoices,
    FreeNumeric,
    FreeText,
    Likert,
    YesNoNa,
}

impl AnswerShape {
    pub const ALL: [AnswerShape; 7] = [
        Self::OneChoice,
        Self::Ranking,
        Self::MultipleChoices,
        Self::FreeNumeric,
        Self::FreeText,
        Self::Likert,
        Self::YesNoNa,
    ];

    /// Parse an answer format (case-insensitive).
    pub fn from_format(format: &str) -> Option<Self> {
        match format.to_lowercase().as_str() {
            "one choice" => Some(Self::OneChoice),
            "ranking" => Some(Self::Ranking),
            "multiple choices" => Some(Self::MultipleChoices),
            "freenumeric" => Some(Self::FreeNumeric),
            "freetext" => Some(Self::FreeText),
            "likert" => Some(Self::Likert),
            "y/n/na" => Some(Self::YesNoNa),
            _ => None,
        }
    }

    /// Accepted format strings, comma-separated.
    pub fn known_formats() -> String {
        Self::ALL
            .iter()
            .map(|shape| shape.as_format())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Canonical format string, as found in survey definitions.
    pub fn as_format(&self) -> &'static str {
        match self {
            Self::OneChoice => "one choice",
            Self::Ranking => "ranking",
            Self::MultipleChoices => "multiple choices",
            Self::FreeNumeric => "freenumeric",
            Self::FreeText => "freetext",
            Self::Likert => "likert",
            Self::YesNoNa => "y/n/na",
        }
    }
}

// =============================================================================
// Groups
// =============================================================================

/// Adjacent rows emitted as one unit. Never empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    rows: Vec<Row>,
}

/// How a group is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "shape", rename_all = "snake_case")]
pub enum GroupShape {
    /// One row, emitted by its own shape.
    Single(AnswerShape),
    /// Several likert rows sharing one answer scale.
    MultiLikert,
    /// Several y/n/na rows sharing a code stem.
    MultiYesNoNa,
}

impl Group {
    /// Wrap a non-empty row list. Returns `None` for an empty list.
    pub fn new(rows: Vec<Row>) -> Option<Self> {
        if rows.is_empty() {
            None
        } else {
            Some(Self { rows })
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    pub fn first(&self) -> &Row {
        &self.rows[0]
    }

    pub fn is_compound(&self) -> bool {
        self.rows.len() > 1
    }

    /// Resolve the dispatch shape.
    ///
    /// Fails on an answer format that has no emitter.
    pub fn shape(&self) -> EmitResult<GroupShape> {
        let first = self.first();
        let shape = AnswerShape::from_format(&first.answer_format).ok_or_else(|| {
            EmitError::UnknownAnswerFormat {
                code: first.code.clone(),
                format: first.answer_format.clone(),
            }
        })?;

        if !self.is_compound() {
            return Ok(GroupShape::Single(shape));
        }
        match shape {
            AnswerShape::Likert => Ok(GroupShape::MultiLikert),
            AnswerShape::YesNoNa => Ok(GroupShape::MultiYesNoNa),
            // The grouper only merges likert and y/n/na rows.
            other => Ok(GroupShape::Single(other)),
        }
    }

    pub fn codes(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.code.as_str()).collect()
    }
}

// =============================================================================
// Tests
// =============================================================================
