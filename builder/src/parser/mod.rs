//! Survey definition and resource readers.
//!
//! A project folder holds everything the pipeline reads:
//!
//! ```text
//! <project>/
//! ├── <project>.csv          survey definition, one row per question
//! ├── config.json            project configuration
//! ├── listAnswers/<id>.csv   answer options, one per line, `;` between languages
//! └── texts/                 welcome_message.md, end_message_<lang>.md, ...
//! ```
//!
//! Files are decoded with encoding auto-detection before parsing.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{SourceError, SourceResult};
use crate::models::{Row, BASE_TEXT_FIELD};

/// Columns every survey definition must carry.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "section",
    "code",
    "answer_format",
    "condition",
    "answer_file",
    "other",
    "random",
    BASE_TEXT_FIELD,
];

/// Prefix of translation text columns (`lang_trans1`, `lang_trans2`, ...).
pub const TRANSLATION_PREFIX: &str = "lang_trans";

/// Row-level parse error with context
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub column: Option<String>,
    pub value: Option<String>,
    pub message: String,
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "survey line {}", self.line)?;
        if let Some(column) = &self.column {
            write!(f, ", column '{}'", column)?;
        }
        if let Some(value) = &self.value {
            write!(f, " = '{}'", value)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for RowError {}

impl RowError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column: None,
            value: None,
            message: message.into(),
        }
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

// =============================================================================
// Sources
// =============================================================================

/// A restartable source of survey rows.
///
/// Every call to [`RowSource::rows`] starts a fresh traversal from the first row.
pub trait RowSource {
    fn rows(&self) -> SourceResult<Vec<Row>>;
}

/// Answer-option lists and message texts referenced by the survey.
pub trait ResourceSource {
    /// Raw answer-option lines for an `answer_file` identifier.
    fn answer_options(&self, answer_file: &str) -> SourceResult<Vec<String>>;

    /// Markdown source of a `welcome` or `end` message.
    ///
    /// `suffix` is `None` for the base language.
    fn message(&self, kind: &str, suffix: Option<&str>) -> SourceResult<String>;
}

impl RowSource for Vec<Row> {
    fn rows(&self) -> SourceResult<Vec<Row>> {
        Ok(self.clone())
    }
}

/// A project folder on disk.
#[derive(Debug, Clone)]
pub struct ProjectDir {
    root: PathBuf,
    name: String,
}

impl ProjectDir {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let name = root
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("survey")
            .to_string();
        Self { root, name }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn survey_path(&self) -> PathBuf {
        self.root.join(format!("{}.csv", self.name))
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.json")
    }

    pub fn default_output_path(&self) -> PathBuf {
        self.root.join(format!("{}_to_import.txt", self.name))
    }

    pub fn answer_path(&self, answer_file: &str) -> PathBuf {
        self.root.join("listAnswers").join(format!("{}.csv", answer_file))
    }

    pub fn message_path(&self, kind: &str, suffix: Option<&str>) -> PathBuf {
        let filename = match suffix {
            Some(lang) => format!("{}_message_{}.md", kind, lang),
            None => format!("{}_message.md", kind),
        };
        self.root.join("texts").join(filename)
    }
}

impl RowSource for ProjectDir {
    fn rows(&self) -> SourceResult<Vec<Row>> {
        let content = read_decoded(&self.survey_path())?;
        parse_survey(&content)
    }
}

impl ResourceSource for ProjectDir {
    fn answer_options(&self, answer_file: &str) -> SourceResult<Vec<String>> {
        let content = read_decoded(&self.answer_path(answer_file))?;
        Ok(split_answer_lines(&content))
    }

    fn message(&self, kind: &str, suffix: Option<&str>) -> SourceResult<String> {
        read_decoded(&self.message_path(kind, suffix))
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15.decode(bytes).0.into_owned(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        // UTF-8 and anything unknown: lossy UTF-8, dropping a leading BOM.
        _ => {
            let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}

/// Read a file and decode it with auto-detected encoding.
pub fn read_decoded(path: &Path) -> SourceResult<String> {
    let bytes = std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SourceError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            SourceError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;
    let encoding = detect_encoding(&bytes);
    Ok(decode_content(&bytes, &encoding))
}

// =============================================================================
// Parsing
// =============================================================================

/// Parse a survey definition (comma-delimited, header row first).
///
/// # Example
/// ```ignore
/// let csv = "section,code,answer_format,condition,answer_file,other,random,question\n\
///            1,Q1,freetext,,,N,N,Your name?";
/// let rows = parse_survey(csv)?;
/// assert_eq!(rows[0].code, "Q1");
/// ```
pub fn parse_survey(content: &str) -> SourceResult<Vec<Row>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| RowError::new(1, format!("Cannot read header: {}", e)))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(SourceError::Empty);
    }

    for required in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == required) {
            return Err(SourceError::MissingColumn(required.to_string()));
        }
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| {
            let line = e.position().map(|p| p.line() as usize).unwrap_or(0);
            RowError::new(line, format!("Cannot read line: {}", e))
        })?;
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);

        if record.iter().all(|v| v.trim().is_empty()) {
            continue;
        }

        let fields: HashMap<&str, &str> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.as_str(), record.get(i).unwrap_or("")))
            .collect();

        rows.push(row_from_fields(line, &fields)?);
    }

    Ok(rows)
}

fn row_from_fields(line: usize, fields: &HashMap<&str, &str>) -> Result<Row, RowError> {
    let get = |name: &str| fields.get(name).copied().unwrap_or("");

    let raw_section = get("section").trim();
    let section = raw_section
        .parse::<u32>()
        .ok()
        .filter(|s| *s >= 1)
        .ok_or_else(|| {
            RowError::new(line, "section must be a positive integer")
                .with_column("section")
                .with_value(raw_section)
        })?;

    let texts = fields
        .iter()
        .filter(|(k, _)| **k == BASE_TEXT_FIELD || k.starts_with(TRANSLATION_PREFIX))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    Ok(Row {
        line,
        section,
        code: get("code").trim().to_string(),
        answer_format: get("answer_format").to_string(),
        condition: get("condition").to_string(),
        answer_file: get("answer_file").trim().to_string(),
        other: get("other").trim() == "Y",
        random: get("random").trim() == "Y",
        texts,
    })
}

/// Split an answer-option resource into lines, dropping trailing blank lines.
pub fn split_answer_lines(content: &str) -> Vec<String> {
    let mut lines: Vec<String> = content.lines().map(String::from).collect();
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    lines
}
