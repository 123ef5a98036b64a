//! Display conditions attached to survey rows.
//!
//! Conditions look like `Q3 in [1 OR 2]`. They are parsed and reported but
//! have no effect on the emitted records: a conditioned row is only kept out
//! of compound questions by the grouper.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static BRACKETED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<subject>[^\[]*)\[(?P<list>[^\]]*)\]?").expect("valid regex"));

static TRAILING_IN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*\bin\s*$").expect("valid regex"));

/// Logical connector between the alternatives of a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Connector {
    Or,
    And,
}

impl Connector {
    fn keyword(&self) -> &'static str {
        match self {
            Self::Or => "or",
            Self::And => "and",
        }
    }
}

/// A parsed display condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Condition {
    /// The expression as written.
    pub raw: String,
    /// Question the condition refers to, when a list was found.
    pub subject: Option<String>,
    pub connector: Option<Connector>,
    /// Lower-cased alternatives of the bracketed list.
    pub alternatives: Vec<String>,
}

/// Parse a condition. Empty input yields `None`.
///
/// Expressions without a bracketed list are kept as `raw` only.
pub fn parse_condition(condition: &str) -> Option<Condition> {
    if condition.trim().is_empty() {
        return None;
    }

    let mut parsed = Condition {
        raw: condition.to_string(),
        subject: None,
        connector: None,
        alternatives: Vec::new(),
    };

    let Some(caps) = BRACKETED.captures(condition) else {
        return Some(parsed);
    };

    let list = &caps["list"];
    // AND wins when both keywords appear.
    let connector = if list.contains("AND") {
        Some(Connector::And)
    } else if list.contains("OR") {
        Some(Connector::Or)
    } else {
        None
    };

    let lowered = list.to_lowercase();
    parsed.alternatives = match connector {
        Some(c) => lowered
            .split(&format!(" {} ", c.keyword()))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        None => vec![lowered.trim().to_string()],
    };
    parsed.connector = connector;
    parsed.subject = Some(TRAILING_IN.replace(&caps["subject"], "").trim().to_string());

    Some(parsed)
}
