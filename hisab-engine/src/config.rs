//! Engine settings (loaded from `config.toml` by the CLI)

use anyhow::{anyhow, Result};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    #[serde(default)]
    pub remote: RemoteSection,
    #[serde(default)]
    pub parser: ParserSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RemoteSection {
    /// When false every message is parsed locally only
    pub enabled: bool,
    /// POST endpoint accepting `{"message": "..."}`
    pub endpoint: String,
    pub timeout_ms: u64,
    /// Sent as a bearer token when present
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParserSection {
    /// IANA zone used to decide what "today" is
    pub timezone: String,
}

impl Default for RemoteSection {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: "http://localhost:8000/api/parse-sms".to_string(),
            timeout_ms: 8_000,
            api_key: None,
        }
    }
}

impl Default for ParserSection {
    fn default() -> Self {
        Self {
            timezone: "Asia/Dhaka".to_string(),
        }
    }
}

impl RemoteSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl ParserSection {
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow!("invalid timezone {:?}: {e}", self.timezone))
    }
}

/// Where the parser's default date comes from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Today {
    /// Current calendar date in a zone, read on every input
    InZone(Tz),
    /// Pinned date (tests, `--today`)
    Fixed(NaiveDate),
}

impl Today {
    pub fn date(&self) -> NaiveDate {
        match self {
            Today::InZone(tz) => Utc::now().with_timezone(tz).date_naive(),
            Today::Fixed(d) => *d,
        }
    }

    pub fn from_config(parser: &ParserSection) -> Result<Self> {
        Ok(Today::InZone(parser.tz()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = EngineConfig::default();
        assert!(!cfg.remote.enabled);
        assert_eq!(cfg.remote.timeout(), Duration::from_secs(8));
        assert_eq!(cfg.parser.tz().unwrap(), chrono_tz::Asia::Dhaka);
    }

    #[test]
    fn test_bad_timezone() {
        let p = ParserSection {
            timezone: "Mars/Olympus".to_string(),
        };
        assert!(p.tz().is_err());
    }

    #[test]
    fn test_fixed_today() {
        let d = NaiveDate::from_ymd_opt(2025, 12, 27).unwrap();
        assert_eq!(Today::Fixed(d).date(), d);
    }
}
