//! Answer records built from answer-option resources.
//!
//! Each resource line is one option; `;` separates the per-language texts,
//! in survey language order:
//!
//! ```text
//! "Strongly agree";"Tout à fait d'accord";"Stimme voll zu"
//! "Agree";"D'accord"
//! ```
//!
//! A line without a segment for the requested language falls back to the
//! base-language segment.

use crate::error::EmitResult;
use crate::models::{fields, Record};
use crate::transform::language::Language;
use crate::transform::sink::RecordSink;

/// Text of one option line for a translation index, quote-stripped.
pub fn answer_text(line: &str, index: usize) -> String {
    let segments: Vec<&str> = line.split(';').collect();
    let segment = segments
        .get(index)
        .or_else(|| segments.first())
        .copied()
        .unwrap_or("");
    segment.trim().trim_matches('"').to_string()
}

/// Emit one answer record per option line, named `1`, `2`, ...
///
/// Returns the number of records written.
pub fn emit_answers(
    template: &Record,
    lines: &[String],
    language: &Language,
    sink: &mut dyn RecordSink,
) -> EmitResult<usize> {
    for (n, line) in lines.iter().enumerate() {
        let answer = template
            .clone()
            .with(fields::NAME, (n + 1).to_string())
            .with(fields::TEXT, answer_text(line, language.index))
            .with(fields::LANGUAGE, language.code.as_str());
        sink.write(&answer)?;
    }
    Ok(lines.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lang(code: &str, index: usize) -> Language {
        Language {
            code: code.to_string(),
            index,
        }
    }

    #[test]
    fn test_segment_by_index() {
        let line = "\"Agree\";\"D'accord\";\"Zustimmen\"";
        assert_eq!(answer_text(line, 0), "Agree");
        assert_eq!(answer_text(line, 1), "D'accord");
        assert_eq!(answer_text(line, 2), "Zustimmen");
    }

    #[test]
    fn test_missing_translation_falls_back_to_base() {
        assert_eq!(answer_text("\"Never\"", 2), "Never");
        assert_eq!(answer_text("Never;Jamais", 5), "Never");
    }

    #[test]
    fn test_empty_line() {
        assert_eq!(answer_text("", 1), "");
    }

    #[test]
    fn test_emit_numbered_answers() {
        let template = Record::new().with("class", "A").with("type/scale", "0");
        let lines = vec!["Yes;Oui".to_string(), "No".to_string()];
        let mut sink: Vec<Record> = Vec::new();

        let count = emit_answers(&template, &lines, &lang("fr", 1), &mut sink).unwrap();

        assert_eq!(count, 2);
        assert_eq!(sink[0].name(), "1");
        assert_eq!(sink[0].value("text"), "Oui");
        assert_eq!(sink[0].value("class"), "A");
        assert_eq!(sink[1].name(), "2");
        assert_eq!(sink[1].value("text"), "No");
        assert_eq!(sink[1].value("language"), "fr");
    }

    #[test]
    fn test_template_not_mutated() {
        let template = Record::new().with("class", "A");
        let mut sink: Vec<Record> = Vec::new();
        emit_answers(&template, &["x".to_string()], &lang("en", 0), &mut sink).unwrap();
        assert_eq!(template.get("name"), None);
    }
}
