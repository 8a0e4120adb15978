//! Uniform result shapes returned by dispatch.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

use crate::dispatch::channel::{ChannelError, Exchange};
use crate::request::Headers;

/// Result of a dispatch, identical in shape whichever path was taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub status: u16,
    pub status_text: String,
    #[serde(default)]
    pub headers: Headers,
    pub data: Value,
    #[serde(rename = "responseTime")]
    pub response_time_ms: u64,
    #[serde(rename = "size", default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
}

/// Failures use the same structure; `status` is 0 when nothing answered.
pub type ErrorEnvelope = ResponseEnvelope;

impl ResponseEnvelope {
    /// Envelope for a response that came back, whatever its status.
    pub fn from_exchange(exchange: Exchange, elapsed: Duration) -> Self {
        Self {
            status: exchange.status,
            status_text: exchange.status_text,
            headers: exchange.headers,
            data: exchange.data,
            response_time_ms: millis(elapsed),
            size_bytes: exchange.size_bytes,
        }
    }

    /// Envelope for a failed dispatch.
    ///
    /// A proxy failure payload (carrying both `error` and `url`) is taken as
    /// authoritative. Other answered failures keep their status; when
    /// nothing answered the status is 0 with a synthesized error body.
    pub fn from_failure(failure: ChannelError, elapsed: Duration) -> ErrorEnvelope {
        let response_time_ms = millis(elapsed);
        match failure.response {
            Some(resp) if is_proxy_error(&resp.data) => Self {
                status: if resp.status == 0 { 500 } else { resp.status },
                status_text: non_empty_or(resp.status_text, "Proxy Error"),
                headers: resp.headers,
                data: resp.data,
                response_time_ms,
                size_bytes: None,
            },
            Some(resp) => Self {
                status: resp.status,
                status_text: non_empty_or(resp.status_text, "Network Error"),
                headers: resp.headers,
                data: if truthy(&resp.data) {
                    resp.data
                } else {
                    json!({ "error": failure.message })
                },
                response_time_ms,
                size_bytes: None,
            },
            None => Self {
                status: 0,
                status_text: "Network Error".to_string(),
                headers: Headers::new(),
                data: json!({ "error": failure.message }),
                response_time_ms,
                size_bytes: None,
            },
        }
    }

    /// Rejection produced before any network attempt.
    pub fn bad_request(url: &str, message: impl Into<String>, elapsed: Duration) -> ErrorEnvelope {
        Self {
            status: 400,
            status_text: "Bad Request".to_string(),
            headers: Headers::new(),
            data: json!({
                "error": "Invalid URL format",
                "message": message.into(),
                "url": url,
            }),
            response_time_ms: millis(elapsed),
            size_bytes: None,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// What a dispatch produced. Both arms carry the same envelope type.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The target answered (any status, 4xx/5xx included).
    Response(ResponseEnvelope),
    /// Validation, network or proxy failure.
    Error(ErrorEnvelope),
}

impl Outcome {
    pub fn envelope(&self) -> &ResponseEnvelope {
        match self {
            Outcome::Response(envelope) | Outcome::Error(envelope) => envelope,
        }
    }

    pub fn into_envelope(self) -> ResponseEnvelope {
        match self {
            Outcome::Response(envelope) | Outcome::Error(envelope) => envelope,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error(_))
    }
}

/// Opportunistic JSON parse of a response body; plain text otherwise.
pub fn parse_data(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// A payload shaped like the proxy's own failure report.
pub fn is_proxy_error(data: &Value) -> bool {
    data.get("error").is_some_and(truthy) && data.get("url").is_some_and(truthy)
}

/// JavaScript-style truthiness, which the JSON surface relies on.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn non_empty_or(text: String, fallback: &str) -> String {
    if text.is_empty() {
        fallback.to_string()
    } else {
        text
    }
}

fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
