//! Parse result types shared by the local parser and the reconciliation engine

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a transaction decreases or increases the balance
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Direction {
    #[serde(rename = "expense")]
    Expense,
    #[serde(rename = "income")]
    Income,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Expense => "expense",
            Direction::Income => "income",
        }
    }

    /// Lenient label parsing for values that did not come from the phrase table.
    /// Accepts `expense`/`income` and the banking synonyms `debit`/`credit`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "expense" | "debit" => Some(Direction::Expense),
            "income" | "credit" => Some(Direction::Income),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields pulled out of a notification. Any subset may be absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedFields {
    pub amount: Option<Decimal>,
    pub transaction_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub merchant: Option<String>,
    pub direction: Option<Direction>,
    pub category: Option<String>,
}

impl ExtractedFields {
    /// True when nothing at all was extracted
    pub fn is_empty(&self) -> bool {
        self.amount.is_none()
            && self.transaction_id.is_none()
            && self.date.is_none()
            && self.merchant.is_none()
            && self.direction.is_none()
            && self.category.is_none()
    }
}

/// One complete parse of a message: fields plus a confidence score and notes.
///
/// A result is always replaced as a whole; callers never patch it field by field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ParseResult {
    #[serde(flatten)]
    pub fields: ExtractedFields,
    /// 0..=100
    pub confidence: u8,
    pub insights: Vec<String>,
    /// `local`, `remote`, or whatever tag the inference service reported.
    /// `None` for the empty result.
    pub source: Option<String>,
}

impl ParseResult {
    /// The result exposed for empty input
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.confidence == 0 && self.insights.is_empty()
    }
}

/// Lifecycle of the result exposed for the current input
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ParseStatus {
    /// Input is empty
    #[default]
    Idle,
    /// Remote call for the current input is outstanding
    Pending,
    /// Remote result for the current input was accepted
    Ready,
    /// Remote call failed, timed out or was abandoned; local result exposed
    Fallback,
}

impl fmt::Display for ParseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParseStatus::Idle => "idle",
            ParseStatus::Pending => "pending",
            ParseStatus::Ready => "ready",
            ParseStatus::Fallback => "fallback",
        };
        f.write_str(s)
    }
}
