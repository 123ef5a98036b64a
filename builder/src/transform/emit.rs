//! Question, subquestion and answer emission for one language pass.
//!
//! Every group is dispatched on its [`GroupShape`]:
//!
//! | Shape            | Question | Subquestions          | Answers |
//! |------------------|----------|-----------------------|---------|
//! | one choice       | row      | -                     | yes     |
//! | ranking          | row      | `1`..`8` (`Rank1`..)  | yes     |
//! | multiple choices | row      | -                     | yes     |
//! | freenumeric      | row      | -                     | -       |
//! | freetext         | row      | -                     | -       |
//! | likert           | row      | `SQ001` (empty)       | yes     |
//! | y/n/na           | row      | -                     | -       |
//! | multi-likert     | `likertN`| one per row           | yes     |
//! | multi y/n/na     | first row| -                     | -       |
//!
//! Compound groups whose first row is flagged `random` are shuffled before
//! emission, so the header of a y/n/na group and the `other` flag of a
//! multi-likert header come from the first row after the shuffle.
//!
//! Records always start from a clone of their template, so nothing set for
//! one record can leak into the next.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::config::MainConfig;
use crate::error::PipelineResult;
use crate::logs::{log_info_indent, log_warning};
use crate::models::{fields, AnswerShape, Group, GroupShape, Record, Row};
use crate::parser::ResourceSource;
use crate::transform::answers::emit_answers;
use crate::transform::condition::parse_condition;
use crate::transform::language::Language;
use crate::transform::sink::RecordSink;

/// Number of rank subquestions of a ranking question.
pub const RANK_COUNT: usize = 8;

/// Name of the single subquestion of a standalone likert question.
pub const LIKERT_SUBQUESTION: &str = "SQ001";

/// Prefix of synthesized multi-likert question names.
pub const MULTI_LIKERT_PREFIX: &str = "likert";

/// Emits the records of one language pass.
///
/// Owns the per-pass state: the multi-likert counter and the shuffle RNG.
/// Create a new emitter for every language.
pub struct QuestionEmitter<'a> {
    main: &'a MainConfig,
    resources: &'a dyn ResourceSource,
    language: &'a Language,
    text_field: String,
    multi_counter: usize,
    rng: StdRng,
}

impl<'a> QuestionEmitter<'a> {
    pub fn new(
        main: &'a MainConfig,
        resources: &'a dyn ResourceSource,
        language: &'a Language,
        seed: u64,
    ) -> Self {
        Self {
            main,
            resources,
            language,
            text_field: language.text_field(),
            multi_counter: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Multi-likert questions created so far in this pass.
    pub fn multi_count(&self) -> usize {
        self.multi_counter
    }

    /// Emit every record of a group, in row order.
    pub fn emit_group(&mut self, group: Group, sink: &mut dyn RecordSink) -> PipelineResult<()> {
        match group.shape()? {
            GroupShape::Single(shape) => {
                let row = group.first();
                if let Some(condition) = parse_condition(&row.condition) {
                    log_info_indent(
                        format!("{}: display condition {:?} is not enforced", row.code, condition.raw),
                        1,
                    );
                }
                self.emit_single(shape, row, sink)
            }
            GroupShape::MultiLikert => {
                let rows = self.presentation_order(group);
                self.emit_multi_likert(&rows, sink)
            }
            GroupShape::MultiYesNoNa => {
                // The answer scale is fixed by the platform: only the header is written.
                let rows = self.presentation_order(group);
                let template = &self.main.questions.yes_no_na;
                sink.write(&self.question(template, &rows[0]))?;
                Ok(())
            }
        }
    }

    /// Rows of a compound group, shuffled when its first row is flagged `random`.
    fn presentation_order(&mut self, group: Group) -> Vec<Row> {
        let mut rows = group.into_rows();
        if rows[0].random {
            rows.shuffle(&mut self.rng);
        }
        rows
    }

    fn emit_single(
        &self,
        shape: AnswerShape,
        row: &Row,
        sink: &mut dyn RecordSink,
    ) -> PipelineResult<()> {
        let template = self.main.questions.for_shape(shape);
        sink.write(&self.question(template, row))?;

        let answers = &self.main.answers;
        match shape {
            AnswerShape::OneChoice => self.emit_answer_list(&answers.one_choice, row, sink),
            AnswerShape::Ranking => {
                for rank in 1..=RANK_COUNT {
                    let sub = self.subquestion(&rank.to_string(), &format!("Rank{}", rank));
                    sink.write(&sub)?;
                }
                self.emit_answer_list(&answers.ranking, row, sink)
            }
            AnswerShape::MultipleChoices => {
                self.emit_answer_list(&answers.multiple_choices, row, sink)
            }
            AnswerShape::Likert => {
                sink.write(&self.subquestion(LIKERT_SUBQUESTION, ""))?;
                self.emit_answer_list(&answers.likert, row, sink)
            }
            AnswerShape::FreeNumeric | AnswerShape::FreeText | AnswerShape::YesNoNa => Ok(()),
        }
    }

    fn emit_multi_likert(&mut self, rows: &[Row], sink: &mut dyn RecordSink) -> PipelineResult<()> {
        let name = format!("{}{}", MULTI_LIKERT_PREFIX, self.multi_counter);
        self.multi_counter += 1;

        let header = self
            .main
            .questions
            .multi_likert
            .clone()
            .with(fields::NAME, name)
            .with(fields::TEXT, "")
            .with(fields::LANGUAGE, self.language.code.as_str())
            .with(fields::OTHER, rows[0].other_flag());
        sink.write(&header)?;

        for row in rows {
            sink.write(&self.subquestion(&row.code, row.text(&self.text_field)))?;
        }

        self.emit_answer_list(&self.main.answers.likert, &rows[0], sink)
    }

    fn emit_answer_list(
        &self,
        template: &Record,
        row: &Row,
        sink: &mut dyn RecordSink,
    ) -> PipelineResult<()> {
        let lines = self.resources.answer_options(&row.answer_file)?;
        if lines.is_empty() {
            log_warning(format!("{}: answer file '{}' has no options", row.code, row.answer_file));
        }
        emit_answers(template, &lines, self.language, sink)?;
        Ok(())
    }

    fn question(&self, template: &Record, row: &Row) -> Record {
        template
            .clone()
            .with(fields::NAME, row.code.as_str())
            .with(fields::TEXT, row.text(&self.text_field))
            .with(fields::LANGUAGE, self.language.code.as_str())
            .with(fields::OTHER, row.other_flag())
    }

    fn subquestion(&self, name: &str, text: &str) -> Record {
        self.main
            .subquestion
            .clone()
            .with(fields::NAME, name)
            .with(fields::TEXT, text)
            .with(fields::RELEVANCE, "1")
            .with(fields::LANGUAGE, self.language.code.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PipelineError, SourceError, SourceResult};
    use std::collections::HashMap;
    use std::path::PathBuf;

    struct Answers(HashMap<String, Vec<String>>);

    impl ResourceSource for Answers {
        fn answer_options(&self, answer_file: &str) -> SourceResult<Vec<String>> {
            self.0.get(answer_file).cloned().ok_or_else(|| SourceError::NotFound {
                path: PathBuf::from(answer_file),
            })
        }

        fn message(&self, _kind: &str, _suffix: Option<&str>) -> SourceResult<String> {
            Ok(String::new())
        }
    }

    fn answers() -> Answers {
        Answers(HashMap::from([
            (
                "agree".to_string(),
                vec!["\"Agree\";\"D'accord\"".to_string(), "\"Disagree\"".to_string()],
            ),
            ("tools".to_string(), vec!["Git".to_string(), "Make".to_string()]),
        ]))
    }

    fn lang(code: &str, index: usize) -> Language {
        Language { code: code.to_string(), index }
    }

    fn emit(rows: Vec<Row>, language: &Language) -> PipelineResult<Vec<Record>> {
        let main = MainConfig::default();
        let resources = answers();
        let mut emitter = QuestionEmitter::new(&main, &resources, language, 7);
        let mut sink: Vec<Record> = Vec::new();
        emitter.emit_group(Group::new(rows).unwrap(), &mut sink)?;
        Ok(sink)
    }

    fn classes(records: &[Record]) -> Vec<&str> {
        records.iter().map(|r| r.value("class")).collect()
    }

    #[test]
    fn test_one_choice() {
        let row = Row::new("Q1", "one choice")
            .with_answer_file("agree")
            .with_text("question", "Do you agree?")
            .with_other(true);
        let records = emit(vec![row], &lang("en", 0)).unwrap();

        assert_eq!(classes(&records), vec!["Q", "A", "A"]);
        assert_eq!(records[0].name(), "Q1");
        assert_eq!(records[0].value("type/scale"), "L");
        assert_eq!(records[0].value("text"), "Do you agree?");
        assert_eq!(records[0].value("other"), "Y");
        assert_eq!(records[1].value("text"), "Agree");
    }

    #[test]
    fn test_ranking_has_eight_ranks() {
        let row = Row::new("R1", "Ranking").with_answer_file("tools");
        let records = emit(vec![row], &lang("en", 0)).unwrap();

        let subs: Vec<&Record> = records.iter().filter(|r| r.value("class") == "SQ").collect();
        assert_eq!(subs.len(), RANK_COUNT);
        for (i, sub) in subs.iter().enumerate() {
            assert_eq!(sub.name(), (i + 1).to_string());
            assert_eq!(sub.value("text"), format!("Rank{}", i + 1));
            assert_eq!(sub.value("relevance"), "1");
            assert_eq!(sub.value("language"), "en");
        }
        assert_eq!(records.len(), 1 + RANK_COUNT + 2);
        assert_eq!(records.last().unwrap().value("class"), "A");
    }

    #[test]
    fn test_multiple_choices_without_subquestions() {
        let row = Row::new("M1", "multiple choices").with_answer_file("tools");
        let records = emit(vec![row], &lang("en", 0)).unwrap();
        assert_eq!(classes(&records), vec!["Q", "A", "A"]);
        assert_eq!(records[0].value("type/scale"), "M");
    }

    #[test]
    fn test_free_shapes_emit_question_only() {
        for format in ["freetext", "freenumeric", "y/n/na"] {
            let records = emit(vec![Row::new("F1", format)], &lang("en", 0)).unwrap();
            assert_eq!(classes(&records), vec!["Q"], "format {}", format);
        }
    }

    #[test]
    fn test_single_likert_has_empty_subquestion() {
        let row = Row::new("L1", "likert")
            .with_answer_file("agree")
            .with_text("lang_trans1", "Êtes-vous d'accord ?");
        let records = emit(vec![row], &lang("fr", 1)).unwrap();

        assert_eq!(classes(&records), vec!["Q", "SQ", "A", "A"]);
        assert_eq!(records[0].value("text"), "Êtes-vous d'accord ?");
        assert_eq!(records[1].name(), LIKERT_SUBQUESTION);
        assert_eq!(records[1].value("text"), "");
        assert_eq!(records[2].value("text"), "D'accord");
        // Missing translation on the second option falls back to English.
        assert_eq!(records[3].value("text"), "Disagree");
    }

    #[test]
    fn test_multi_likert_header_and_subquestions() {
        let rows = vec![
            Row::new("L1", "likert").with_answer_file("agree").with_text("question", "First"),
            Row::new("L2", "likert").with_answer_file("agree").with_text("question", "Second"),
        ];
        let records = emit(rows, &lang("en", 0)).unwrap();

        assert_eq!(classes(&records), vec!["Q", "SQ", "SQ", "A", "A"]);
        assert_eq!(records[0].name(), "likert0");
        assert_eq!(records[0].value("text"), "");
        assert_eq!(records[1].name(), "L1");
        assert_eq!(records[1].value("text"), "First");
        assert_eq!(records[2].name(), "L2");
        assert_eq!(records[2].value("relevance"), "1");
    }

    #[test]
    fn test_multi_likert_counter_increments() {
        let main = MainConfig::default();
        let resources = answers();
        let language = lang("en", 0);
        let mut emitter = QuestionEmitter::new(&main, &resources, &language, 0);
        let mut sink: Vec<Record> = Vec::new();

        for _ in 0..3 {
            let group = Group::new(vec![
                Row::new("A1", "likert").with_answer_file("agree"),
                Row::new("A2", "likert").with_answer_file("agree"),
            ])
            .unwrap();
            emitter.emit_group(group, &mut sink).unwrap();
        }

        let headers: Vec<&str> = sink
            .iter()
            .filter(|r| r.value("class") == "Q")
            .map(|r| r.name())
            .collect();
        assert_eq!(headers, vec!["likert0", "likert1", "likert2"]);
        assert_eq!(emitter.multi_count(), 3);

        let fresh = QuestionEmitter::new(&main, &resources, &language, 0);
        assert_eq!(fresh.multi_count(), 0);
    }

    #[test]
    fn test_shuffle_is_seeded() {
        let rows: Vec<Row> = (1..=6)
            .map(|i| {
                Row::new(format!("L{}", i), "likert")
                    .with_answer_file("agree")
                    .with_random(true)
            })
            .collect();

        let order = |language: &Language| -> Vec<String> {
            emit(rows.clone(), language)
                .unwrap()
                .iter()
                .filter(|r| r.value("class") == "SQ")
                .map(|r| r.name().to_string())
                .collect()
        };

        let en = order(&lang("en", 0));
        let fr = order(&lang("fr", 1));
        assert_eq!(en, fr);

        let mut sorted = en.clone();
        sorted.sort();
        assert_eq!(sorted, vec!["L1", "L2", "L3", "L4", "L5", "L6"]);
    }

    fn random_group(format: &str, codes: &[String]) -> Vec<Row> {
        codes
            .iter()
            .map(|code| {
                Row::new(code.as_str(), format)
                    .with_answer_file("agree")
                    .with_other(code == "Q1a" || code == "L1")
                    .with_random(true)
            })
            .collect()
    }

    /// Order the emitter's RNG gives to `codes` under the seed used by `emit`.
    fn seeded_order(codes: &[String]) -> Vec<String> {
        let mut expected = codes.to_vec();
        expected.shuffle(&mut StdRng::seed_from_u64(7));
        assert_ne!(expected, codes, "seed 7 must move at least one row");
        expected
    }

    #[test]
    fn test_random_multi_likert_follows_seed() {
        let codes: Vec<String> = (1..=8).map(|i| format!("L{}", i)).collect();
        let expected = seeded_order(&codes);

        let records = emit(random_group("likert", &codes), &lang("en", 0)).unwrap();
        let order: Vec<&str> = records
            .iter()
            .filter(|r| r.value("class") == "SQ")
            .map(|r| r.name())
            .collect();
        assert_eq!(order, expected);

        // The header's other flag comes from the first row after shuffling.
        let other = if expected[0] == "L1" { "Y" } else { "N" };
        assert_eq!(records[0].value("other"), other);
    }

    #[test]
    fn test_random_multi_yes_no_na_header_follows_seed() {
        let codes: Vec<String> = (1..=8).map(|i| format!("Q{}a", i)).collect();
        let expected = seeded_order(&codes);

        let records = emit(random_group("y/n/na", &codes), &lang("en", 0)).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name(), expected[0]);
    }

    #[test]
    fn test_unflagged_group_keeps_file_order() {
        let rows: Vec<Row> = (1..=8)
            .map(|i| Row::new(format!("L{}", i), "likert").with_answer_file("agree"))
            .collect();
        let records = emit(rows, &lang("en", 0)).unwrap();
        let order: Vec<&str> = records
            .iter()
            .filter(|r| r.value("class") == "SQ")
            .map(|r| r.name())
            .collect();
        assert_eq!(order, vec!["L1", "L2", "L3", "L4", "L5", "L6", "L7", "L8"]);
    }

    #[test]
    fn test_multi_yes_no_na_header_only() {
        let rows = vec![
            Row::new("Q1a", "y/n/na").with_text("question", "Header"),
            Row::new("Q2a", "y/n/na"),
        ];
        let records = emit(rows, &lang("en", 0)).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name(), "Q1a");
        assert_eq!(records[0].value("type/scale"), "Y");
    }

    #[test]
    fn test_unknown_format_fails() {
        let err = emit(vec![Row::new("S1", "slider")], &lang("en", 0)).unwrap_err();
        assert!(matches!(err, PipelineError::Emit(_)));
    }

    #[test]
    fn test_missing_answer_file_fails() {
        let row = Row::new("Q1", "one choice").with_answer_file("nope");
        let err = emit(vec![row], &lang("en", 0)).unwrap_err();
        assert!(matches!(err, PipelineError::Source(SourceError::NotFound { .. })));
    }

    #[test]
    fn test_conditioned_likert_emitted_as_singleton() {
        let row = Row::new("L9", "likert")
            .with_answer_file("agree")
            .with_condition("L1 in [1 OR 2]");
        let records = emit(vec![row], &lang("en", 0)).unwrap();
        assert_eq!(records[0].name(), "L9");
        assert_eq!(classes(&records), vec!["Q", "SQ", "A", "A"]);
    }
}
