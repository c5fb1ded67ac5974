//! Field-by-field reducer combining the local fallback with a remote result.

use hisab_core::{Direction, ExtractedFields, ParseResult};
use hisab_parse::confidence::clamp_confidence;
use hisab_parse::normalize_date;

use crate::remote::RemoteParse;

pub const REMOTE_SOURCE: &str = "remote";

fn non_blank(v: &Option<String>) -> Option<String> {
    v.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Remote fields win when present and non-empty; local fills the gaps.
/// Confidence and insights come from the remote result when it has them.
pub fn merge(local: &ParseResult, remote: &RemoteParse) -> ParseResult {
    let l = &local.fields;
    let r = &remote.parsed;

    let fields = ExtractedFields {
        amount: r.amount.or(l.amount),
        transaction_id: non_blank(&r.transaction_id).or_else(|| l.transaction_id.clone()),
        date: r.date.as_deref().and_then(normalize_date).or(l.date),
        merchant: non_blank(&r.merchant).or_else(|| l.merchant.clone()),
        direction: r
            .direction
            .as_deref()
            .and_then(Direction::from_label)
            .or(l.direction),
        category: non_blank(&r.category).or_else(|| l.category.clone()),
    };

    let confidence = remote
        .confidence
        .filter(|c| c.is_finite())
        .map(|c| clamp_confidence(c.round() as i64))
        .unwrap_or(local.confidence);

    ParseResult {
        fields,
        confidence,
        insights: remote
            .insights
            .clone()
            .unwrap_or_else(|| local.insights.clone()),
        source: Some(non_blank(&remote.source).unwrap_or_else(|| REMOTE_SOURCE.to_string())),
    }
}
