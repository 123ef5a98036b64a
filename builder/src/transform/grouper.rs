//! Merge adjacent survey rows into compound questions.
//!
//! Consecutive likert rows sharing an answer scale are rendered as one array
//! question, and consecutive y/n/na rows sharing a code stem are kept
//! together. Every other row stands alone.
//!
//! # Architecture
//!
//! ```text
//! Rows (file order)                         Groups
//! ┌──────────────────────────────┐          ┌──────────────────┐
//! │ Q1  likert  agree            │          │ [Q1, Q2]         │
//! │ Q2  likert  agree            │   →      ├──────────────────┤
//! │ Q3  likert  freq             │          │ [Q3]             │
//! │ Q4  likert  freq  (cond)     │          ├──────────────────┤
//! │ Q5  freetext                 │          │ [Q4]             │
//! └──────────────────────────────┘          ├──────────────────┤
//!                                           │ [Q5]             │
//!                                           └──────────────────┘
//! ```
//!
//! The decision for each row only depends on the previous row's answer
//! format, answer file and code stem. That state is a plain value
//! ([`GroupState`]) threaded through the rows, so a fresh pass over the same
//! rows always yields the same groups.

use crate::models::{Group, Row};

const LIKERT: &str = "likert";
const YES_NO_NA: &str = "y/n/na";

/// What the grouper remembers about the previous row.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Previous {
    answer_format: String,
    answer_file: String,
    code_stem: String,
}

/// Accumulator of the grouping fold.
#[derive(Debug, Clone, Default)]
pub struct GroupState {
    previous: Option<Previous>,
    working: Vec<Row>,
}

impl GroupState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one row. Returns the new state and the group closed by this row, if any.
    pub fn push(mut self, row: Row) -> (Self, Option<Group>) {
        let current = Previous {
            answer_format: row.format_key(),
            answer_file: row.answer_file.clone(),
            code_stem: row.code_stem(),
        };

        let continues = match (current.answer_format.as_str(), row.has_condition()) {
            (LIKERT, false) => self.continues_with(LIKERT, |p| p.answer_file == current.answer_file),
            (YES_NO_NA, false) => self.continues_with(YES_NO_NA, |p| p.code_stem == current.code_stem),
            // Conditioned rows never merge, whatever their format.
            _ => false,
        };

        let closed = if continues {
            None
        } else {
            Group::new(std::mem::take(&mut self.working))
        };

        self.working.push(row);
        self.previous = Some(current);
        (self, closed)
    }

    /// Close the last working group.
    pub fn finish(self) -> Option<Group> {
        Group::new(self.working)
    }

    fn continues_with(&self, format: &str, same_key: impl Fn(&Previous) -> bool) -> bool {
        match &self.previous {
            Some(prev) => prev.answer_format == format && same_key(prev),
            None => false,
        }
    }
}

/// Lazy iterator of groups over a row sequence.
///
/// Not restartable: run a new [`group_rows`] over a fresh traversal for each pass.
pub struct Groups<I> {
    rows: I,
    state: Option<GroupState>,
}

impl<I: Iterator<Item = Row>> Iterator for Groups<I> {
    type Item = Group;

    fn next(&mut self) -> Option<Group> {
        loop {
            let state = self.state.take()?;
            match self.rows.next() {
                Some(row) => {
                    let (state, closed) = state.push(row);
                    self.state = Some(state);
                    if closed.is_some() {
                        return closed;
                    }
                }
                None => return state.finish(),
            }
        }
    }
}

/// Group rows in file order.
pub fn group_rows<I: IntoIterator<Item = Row>>(rows: I) -> Groups<I::IntoIter> {
    Groups {
        rows: rows.into_iter(),
        state: Some(GroupState::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn likert(code: &str, file: &str) -> Row {
        Row::new(code, "likert").with_answer_file(file)
    }

    fn yn(code: &str) -> Row {
        Row::new(code, "y/n/na")
    }

    fn codes(groups: &[Group]) -> Vec<Vec<String>> {
        groups
            .iter()
            .map(|g| g.rows().iter().map(|r| r.code.clone()).collect())
            .collect()
    }

    #[test]
    fn test_likert_boundary_on_answer_file() {
        let rows = vec![likert("L1", "A"), likert("L2", "A"), likert("L3", "B")];
        let groups: Vec<Group> = group_rows(rows).collect();
        assert_eq!(codes(&groups), vec![vec!["L1", "L2"], vec!["L3"]]);
    }

    #[test]
    fn test_condition_breaks_grouping() {
        let rows = vec![
            likert("L1", "A"),
            likert("L2", "A").with_condition("x in [1]"),
            likert("L3", "A"),
        ];
        let groups: Vec<Group> = group_rows(rows).collect();
        // Only the current row's condition is checked: L3 follows a likert
        // row on the same file, so it joins the group L2 opened.
        assert_eq!(codes(&groups), vec![vec!["L1"], vec!["L2", "L3"]]);
    }

    #[test]
    fn test_conditioned_row_alone() {
        let rows = vec![likert("L1", "A"), likert("L2", "A").with_condition("x in [1]")];
        let groups: Vec<Group> = group_rows(rows).collect();
        assert_eq!(codes(&groups), vec![vec!["L1"], vec!["L2"]]);
    }

    #[test]
    fn test_yes_no_na_grouped_by_stem() {
        let rows = vec![yn("Q1a"), yn("Q2a"), yn("Q3b")];
        let groups: Vec<Group> = group_rows(rows).collect();
        assert_eq!(codes(&groups), vec![vec!["Q1a", "Q2a"], vec!["Q3b"]]);
    }

    #[test]
    fn test_format_case_insensitive() {
        let rows = vec![
            Row::new("L1", "Likert").with_answer_file("A"),
            Row::new("L2", "LIKERT").with_answer_file("A"),
        ];
        let groups: Vec<Group> = group_rows(rows).collect();
        assert_eq!(groups.len(), 1);
        assert!(groups[0].is_compound());
    }

    #[test]
    fn test_format_change_closes_group() {
        let rows = vec![
            yn("Q1"),
            likert("L1", "A"),
            likert("L2", "A"),
            Row::new("F1", "freetext"),
            Row::new("F2", "freetext"),
            yn("Q2"),
        ];
        let groups: Vec<Group> = group_rows(rows).collect();
        assert_eq!(
            codes(&groups),
            vec![vec!["Q1"], vec!["L1", "L2"], vec!["F1"], vec!["F2"], vec!["Q2"]]
        );
    }

    #[test]
    fn test_likert_and_yes_no_na_never_mix() {
        // Same stem and same (empty) answer file, different formats.
        let rows = vec![
            Row::new("Q1", "likert"),
            Row::new("Q2", "y/n/na"),
            Row::new("Q3", "likert"),
        ];
        let groups: Vec<Group> = group_rows(rows).collect();
        assert_eq!(groups.len(), 3);
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        assert_eq!(group_rows(Vec::<Row>::new()).count(), 0);
    }

    #[test]
    fn test_order_preserved_and_deterministic() {
        let rows = vec![
            Row::new("intro", "freetext"),
            likert("L1", "A"),
            likert("L2", "A"),
            likert("L3", "B").with_condition("L1 in [1 OR 2]"),
            yn("Y1a"),
            yn("Y2a"),
            yn("Y3b").with_condition("x"),
            yn("Y4b"),
            Row::new("R1", "ranking").with_answer_file("tools"),
            likert("L4", "B"),
            likert("L5", "B"),
        ];

        let first: Vec<Group> = group_rows(rows.clone()).collect();
        let second: Vec<Group> = group_rows(rows.clone()).collect();
        assert_eq!(first, second);

        let flattened: Vec<Row> = first.into_iter().flat_map(Group::into_rows).collect();
        assert_eq!(flattened, rows);
    }

    #[test]
    fn test_grouping_ignores_text() {
        let plain = vec![likert("L1", "A"), likert("L2", "A")];
        let translated: Vec<Row> = plain
            .iter()
            .cloned()
            .map(|r| r.with_text("lang_trans1", "Texte").with_text("question", "Text"))
            .collect();

        let a: Vec<Vec<String>> = codes(&group_rows(plain).collect::<Vec<_>>());
        let b: Vec<Vec<String>> = codes(&group_rows(translated).collect::<Vec<_>>());
        assert_eq!(a, b);
    }

    #[test]
    fn test_fold_state_directly() {
        let (state, closed) = GroupState::new().push(likert("L1", "A"));
        assert!(closed.is_none());
        let (state, closed) = state.push(Row::new("F1", "freetext"));
        assert_eq!(closed.unwrap().codes(), vec!["L1"]);
        assert_eq!(state.finish().unwrap().codes(), vec!["F1"]);
    }
}
