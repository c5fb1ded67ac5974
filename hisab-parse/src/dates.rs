//! Date normalization.
//!
//! Bank notifications write day-first dates (`27/12/2025`, `27-12-2025`);
//! the inference service may send back almost anything. Both end up as a
//! `NaiveDate` (ISO `YYYY-MM-DD` when serialized).

use chrono::{DateTime, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

use crate::digits::transliterate_digits;

static DAY_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\b(?P<d1>[0-9]{1,2})/(?P<m1>[0-9]{1,2})/(?P<y1>[0-9]{4})\b",
        r"|\b(?P<d2>[0-9]{1,2})-(?P<m2>[0-9]{1,2})-(?P<y2>[0-9]{4})\b"
    ))
    .expect("day-first date pattern")
});

/// Formats tried in order by [`normalize_date`]
const FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d-%b-%Y",
];

/// First `DD/MM/YYYY` or `DD-MM-YYYY` date in the text.
///
/// Only the first match is considered; an impossible calendar date is a miss.
pub fn find_date(text: &str) -> Option<NaiveDate> {
    let text = transliterate_digits(text);
    let caps = DAY_FIRST.captures(&text)?;

    let (d, m, y) = if caps.name("d1").is_some() {
        (&caps["d1"], &caps["m1"], &caps["y1"])
    } else {
        (&caps["d2"], &caps["m2"], &caps["y2"])
    };

    NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, d.parse().ok()?)
}

/// Canonicalize a free-standing date string. Unrecognized input yields `None`.
pub fn normalize_date(raw: &str) -> Option<NaiveDate> {
    let s = transliterate_digits(raw);
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    // Full timestamps: keep the calendar date as written
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    None
}
