//! Local heuristic parser: extraction, scoring and insights in one synchronous pass.

use chrono::NaiveDate;
use hisab_core::ParseResult;

use crate::confidence::score;
use crate::insights;
use crate::patterns::extract;

pub const LOCAL_SOURCE: &str = "local";

/// Deterministic parser used as the fallback for every input.
///
/// Holds the caller's notion of "today", which fills the date when the
/// message has none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalParser {
    today: NaiveDate,
}

impl LocalParser {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Parse one message. Blank input yields the empty result.
    pub fn parse(&self, raw: &str) -> ParseResult {
        if raw.trim().is_empty() {
            return ParseResult::empty();
        }

        let extracted = extract(raw);
        // Score and insights see only what the text itself supplied
        let confidence = score(&extracted);
        let insights = insights::generate(&extracted);

        let mut fields = extracted;
        if fields.date.is_none() {
            fields.date = Some(self.today);
        }

        ParseResult {
            fields,
            confidence,
            insights,
            source: Some(LOCAL_SOURCE.to_string()),
        }
    }
}

/// One-shot local parse
pub fn parse_local(raw: &str, today: NaiveDate) -> ParseResult {
    LocalParser::new(today).parse(raw)
}
