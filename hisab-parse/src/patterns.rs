//! Field extraction from raw notification text.
//!
//! Expected shapes (bKash / Nagad / card alerts):
//!   Payment successful to Foodpanda. Amount BDT 1,250.00. TrxID 8FH5G6H7. 27/12/2025
//!   You have received Tk 2,000.00 from 01712345678. TrxID BHK7TQ2M1A
//!   আপনার অ্যাকাউন্টে ৫০০ টাকা জমা হয়েছে

use hisab_core::{Direction, ExtractedFields};
use regex::Regex;
use rust_decimal::Decimal;
use std::ops::Range;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::classifier::classify;
use crate::dates::find_date;
use crate::digits::transliterate_digits;

// Digits are ASCII by the time these run; see `extract`.
static PREFIXED_AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:\bBDT|\bTk\.?|৳)\s*(?P<amt>[0-9][0-9,]*(?:\.[0-9]+)?)")
        .expect("prefixed amount pattern")
});

static SUFFIXED_AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?P<amt>[0-9][0-9,]*(?:\.[0-9]+)?)\s*(?:Tk\b|BDT\b|টাকা)")
        .expect("suffixed amount pattern")
});

static TRANSACTION_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:TrxID|TxnID|Trans\s+ID)\s*[:#]?\s*(?P<id>[A-Za-z0-9]{8,})")
        .expect("transaction id pattern")
});

static TO_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bto\b").expect("to keyword pattern"));

static FROM_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bfrom\b").expect("from keyword pattern"));

/// Extract every field the text supports. Unmatched fields stay `None`.
pub fn extract(text: &str) -> ExtractedFields {
    let text = transliterate_digits(text);
    let text: &str = &text;

    let intent = classify(text);
    let direction = intent.map(|i| i.direction);

    ExtractedFields {
        amount: extract_amount(text),
        transaction_id: extract_transaction_id(text),
        date: find_date(text),
        merchant: direction.and_then(|d| extract_merchant(text, d)),
        direction,
        category: intent.map(|i| i.category.to_string()),
    }
}

/// Currency-tagged amount. A prefixed tag anywhere beats a suffixed one.
/// Matches inside the transaction id (`TrxID TK93817265`) are skipped.
pub fn extract_amount(text: &str) -> Option<Decimal> {
    let text = transliterate_digits(text);
    let id_span = TRANSACTION_ID
        .captures(&text)
        .and_then(|caps| caps.name("id"))
        .map(|m| m.range());
    let outside_id = |caps: &regex::Captures<'_>| match (&id_span, caps.get(0)) {
        (Some(span), Some(m)) => !overlaps(span, &m.range()),
        _ => true,
    };
    let caps = PREFIXED_AMOUNT
        .captures_iter(&text)
        .find(|caps| outside_id(caps))
        .or_else(|| SUFFIXED_AMOUNT.captures_iter(&text).find(|caps| outside_id(caps)))?;
    parse_amount(&caps["amt"])
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

fn parse_amount(token: &str) -> Option<Decimal> {
    Decimal::from_str(&token.replace(',', "")).ok()
}

/// First labelled transaction id of 8+ alphanumerics
pub fn extract_transaction_id(text: &str) -> Option<String> {
    TRANSACTION_ID
        .captures(text)
        .map(|caps| caps["id"].to_string())
}

/// Counterparty after `to` (expense) or `from` (income): at most two tokens,
/// cut short when a token closes a clause.
pub fn extract_merchant(text: &str, direction: Direction) -> Option<String> {
    let keyword = match direction {
        Direction::Expense => &TO_KEYWORD,
        Direction::Income => &FROM_KEYWORD,
    };
    let m = keyword.find(text)?;
    let rest = text[m.end()..].trim_start_matches(|c: char| c == ':' || c.is_whitespace());

    let mut parts = Vec::with_capacity(2);
    for token in rest.split_whitespace().take(2) {
        let trimmed = token.trim_end_matches(is_trailing_punct);
        if !trimmed.is_empty() {
            parts.push(trimmed);
        }
        if trimmed.len() != token.len() {
            break;
        }
    }

    let merchant = parts.join(" ");
    (!merchant.is_empty()).then_some(merchant)
}

fn is_trailing_punct(c: char) -> bool {
    matches!(c, '.' | ',' | ';' | ':' | '!' | '?' | ')' | '।')
}
