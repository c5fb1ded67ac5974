//! hisab-parse: regex and phrase-table extraction for mobile-banking notifications
//!
//! Everything here is synchronous, side-effect free and total: any input,
//! including the empty string, produces a result.

pub mod classifier;
pub mod confidence;
pub mod dates;
pub mod digits;
pub mod insights;
pub mod local;
pub mod patterns;

pub use classifier::{classify, Intent};
pub use confidence::score;
pub use dates::{find_date, normalize_date};
pub use digits::transliterate_digits;
pub use local::{parse_local, LocalParser};
pub use patterns::extract;
