//! Survey languages and where their text lives.

use serde::Serialize;

use crate::config::{MainConfig, ProjectConfig};
use crate::models::BASE_TEXT_FIELD;
use crate::parser::TRANSLATION_PREFIX;

/// One language of the survey, with its position in the language list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Language {
    pub code: String,
    /// 0 for the base language, `i` for the `i`-th additional language.
    pub index: usize,
}

impl Language {
    pub fn is_base(&self) -> bool {
        self.index == 0
    }

    /// Column holding this language's question text.
    pub fn text_field(&self) -> String {
        text_field(self.index)
    }

    /// File suffix of this language's message resources (`None` for the base language).
    pub fn message_suffix(&self) -> Option<&str> {
        if self.is_base() {
            None
        } else {
            Some(&self.code)
        }
    }
}

/// Column name for a translation index: `question` for 0, `lang_trans{i}` otherwise.
pub fn text_field(index: usize) -> String {
    if index == 0 {
        BASE_TEXT_FIELD.to_string()
    } else {
        format!("{}{}", TRANSLATION_PREFIX, index)
    }
}

/// Base language first, then the project's additional languages in order.
///
/// A repeated code is only rendered once.
pub fn resolve_languages(main: &MainConfig, project: &ProjectConfig) -> Vec<Language> {
    let mut codes: Vec<&str> = vec![main.base_language.as_str()];
    for code in &project.languages_to_add {
        if !codes.contains(&code.as_str()) {
            codes.push(code);
        }
    }

    codes
        .into_iter()
        .enumerate()
        .map(|(index, code)| Language {
            code: code.to_string(),
            index,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_field_by_index() {
        assert_eq!(text_field(0), "question");
        assert_eq!(text_field(1), "lang_trans1");
        assert_eq!(text_field(3), "lang_trans3");
    }

    #[test]
    fn test_base_language_first() {
        let project = ProjectConfig {
            languages_to_add: vec!["fr".into(), "de".into()],
            ..Default::default()
        };
        let langs = resolve_languages(&MainConfig::default(), &project);

        let codes: Vec<&str> = langs.iter().map(|l| l.code.as_str()).collect();
        assert_eq!(codes, vec!["en", "fr", "de"]);
        assert!(langs[0].is_base());
        assert_eq!(langs[2].text_field(), "lang_trans2");
        assert_eq!(langs[2].message_suffix(), Some("de"));
        assert_eq!(langs[0].message_suffix(), None);
    }

    #[test]
    fn test_duplicate_language_ignored() {
        let project = ProjectConfig {
            languages_to_add: vec!["en".into(), "nl".into()],
            ..Default::default()
        };
        let langs = resolve_languages(&MainConfig::default(), &project);
        assert_eq!(langs.len(), 2);
        assert_eq!(langs[1], Language { code: "nl".into(), index: 1 });
    }
}
