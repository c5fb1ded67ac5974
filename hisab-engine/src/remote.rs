//! Remote inference client.
//!
//! Wire shape:
//!   request  {"message": "..."}
//!   response {"parsed": {...partial fields...}, "confidence": 87, "insights": [...], "source": "gemini"}

use async_trait::async_trait;
use hisab_parse::transliterate_digits;
use reqwest::header::AUTHORIZATION;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::config::RemoteSection;

/// Every way the remote side can let us down. All of them are recovered by
/// falling back to the local parse.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("inference request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("inference service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not decode inference response: {0}")]
    Decode(String),
    #[error("inference call timed out after {0:?}")]
    Timeout(Duration),
    #[error("inference task failed: {0}")]
    TaskFailed(String),
}

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    message: &'a str,
}

/// Response body. Every part is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RemoteParse {
    #[serde(default)]
    pub parsed: RemoteFields,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub insights: Option<Vec<String>>,
    #[serde(default)]
    pub source: Option<String>,
}

/// Partial fields as the service sends them (strings, loosely typed)
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFields {
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: Option<Decimal>,
    #[serde(default, alias = "trxId", alias = "trxID")]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub merchant: Option<String>,
    #[serde(default, alias = "type")]
    pub direction: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// Accept `1250`, `1250.5`, `"1,250.00"` or `"১২৫০"`; anything else is absent
fn lenient_amount<'de, D>(de: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<serde_json::Value>::deserialize(de)?;
    Ok(match v {
        Some(serde_json::Value::Number(n)) => Decimal::from_str(&n.to_string()).ok(),
        Some(serde_json::Value::String(s)) => {
            let s = transliterate_digits(&s).replace(',', "");
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                Decimal::from_str(s).ok()
            }
        }
        _ => None,
    })
}

/// Capability to run remote inference on one message.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn infer(&self, message: &str) -> Result<RemoteParse, RemoteError>;
}

/// JSON-over-HTTP inference service
pub struct HttpInferenceClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpInferenceClient {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key,
        }
    }

    pub fn from_config(remote: &RemoteSection) -> Self {
        Self::new(remote.endpoint.clone(), remote.api_key.clone())
    }
}

#[async_trait]
impl InferenceClient for HttpInferenceClient {
    async fn infer(&self, message: &str) -> Result<RemoteParse, RemoteError> {
        let mut req = self
            .client
            .post(&self.endpoint)
            .json(&InferenceRequest { message });
        if let Some(key) = &self.api_key {
            req = req.header(AUTHORIZATION, format!("Bearer {key}"));
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| RemoteError::Decode(e.to_string()))
    }
}
