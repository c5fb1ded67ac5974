//! Confidence model: fixed weights per successfully extracted field.

use hisab_core::ExtractedFields;

pub const AMOUNT_WEIGHT: u32 = 30;
pub const TRANSACTION_ID_WEIGHT: u32 = 20;
pub const DATE_WEIGHT: u32 = 10;
/// Awarded once when the phrase table matched (direction and category come together)
pub const INTENT_WEIGHT: u32 = 30;
pub const MERCHANT_WEIGHT: u32 = 10;

pub const MAX_CONFIDENCE: u8 = 100;

/// Score a single extraction pass, clamped to 0..=100.
///
/// Only pass the fields as extracted; a defaulted date must not be scored.
pub fn score(fields: &ExtractedFields) -> u8 {
    let mut total = 0u32;

    if fields.amount.is_some() {
        total += AMOUNT_WEIGHT;
    }
    if fields.transaction_id.is_some() {
        total += TRANSACTION_ID_WEIGHT;
    }
    if fields.date.is_some() {
        total += DATE_WEIGHT;
    }
    if fields.direction.is_some() || fields.category.is_some() {
        total += INTENT_WEIGHT;
    }
    if fields.merchant.is_some() {
        total += MERCHANT_WEIGHT;
    }

    clamp_confidence(i64::from(total))
}

/// Clamp any externally supplied score into 0..=100
pub fn clamp_confidence(value: i64) -> u8 {
    value.clamp(0, i64::from(MAX_CONFIDENCE)) as u8
}
