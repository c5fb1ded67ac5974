//! Human-readable notes derived from the final fields.
//!
//! Each rule runs independently and may append one note; no deduplication.

use hisab_core::{Direction, ExtractedFields};
use rust_decimal::Decimal;

/// Amounts strictly above this (BDT) get the high-value note
pub const HIGH_VALUE_THRESHOLD: i64 = 5000;

pub const RECURRING_BILL: &str =
    "Looks like a recurring utility bill. Consider adding it to your monthly budget.";
pub const HIGH_VALUE: &str = "High-value transaction. Double-check the amount before saving.";
pub const POSITIVE_CASH_FLOW: &str = "Positive cash flow: this adds to your balance.";
pub const MANUAL_AMOUNT: &str = "Amount not detected. Please enter it manually.";

type Rule = fn(&ExtractedFields) -> Option<&'static str>;

const RULES: &[Rule] = &[recurring_bill, high_value, positive_cash_flow, missing_amount];

fn recurring_bill(f: &ExtractedFields) -> Option<&'static str> {
    f.category
        .as_deref()
        .filter(|c| c.eq_ignore_ascii_case("Utilities"))
        .map(|_| RECURRING_BILL)
}

fn high_value(f: &ExtractedFields) -> Option<&'static str> {
    f.amount
        .filter(|a| *a > Decimal::from(HIGH_VALUE_THRESHOLD))
        .map(|_| HIGH_VALUE)
}

fn positive_cash_flow(f: &ExtractedFields) -> Option<&'static str> {
    (f.direction == Some(Direction::Income)).then_some(POSITIVE_CASH_FLOW)
}

fn missing_amount(f: &ExtractedFields) -> Option<&'static str> {
    f.amount.is_none().then_some(MANUAL_AMOUNT)
}

/// Run every rule in order
pub fn generate(fields: &ExtractedFields) -> Vec<String> {
    RULES
        .iter()
        .filter_map(|rule| rule(fields))
        .map(str::to_string)
        .collect()
}
