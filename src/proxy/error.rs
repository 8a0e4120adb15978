//! Structured proxy failures and their HTTP bodies.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

use crate::transport::{ErrorType, TransportError};

/// Everything the proxy endpoints can answer besides a success envelope.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("URL is required")]
    MissingUrl,

    #[error("Invalid URL format: {message}")]
    InvalidUrl { message: String, url: String },

    #[error("Invalid method '{0}'")]
    InvalidMethod(String),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// The target never answered.
    #[error("{message}")]
    Upstream {
        error_type: ErrorType,
        message: String,
        url: String,
        response_time_ms: u64,
        timestamp: DateTime<Utc>,
    },
}

impl ProxyError {
    /// Classified failure report for an outbound call to `url`.
    pub fn upstream(err: &TransportError, url: &str, timeout: Duration, elapsed: Duration) -> Self {
        ProxyError::Upstream {
            error_type: err.error_type(),
            message: describe(err, url, timeout),
            url: url.to_string(),
            response_time_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            timestamp: Utc::now(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

/// Human-readable message for each failure class.
pub fn describe(err: &TransportError, url: &str, timeout: Duration) -> String {
    match err {
        TransportError::Dns(_) => format!(
            "DNS lookup failed for {url}. The domain might not exist or there might be a network connectivity issue."
        ),
        TransportError::Timeout(_) => {
            format!("Request timeout after {} seconds for {url}", timeout.as_secs())
        }
        TransportError::ConnectionRefused(_) => format!("Connection refused by {url}"),
        TransportError::Fetch(cause) => format!("Network error: {cause}"),
        TransportError::Unknown(cause) => cause.clone(),
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            ProxyError::MissingUrl => json!({ "error": "URL is required" }),
            ProxyError::InvalidUrl { message, url } => json!({
                "error": "Invalid URL format",
                "message": message,
                "url": url,
            }),
            ProxyError::InvalidMethod(method) => json!({
                "error": "Invalid method",
                "message": format!("Unsupported HTTP method '{method}'"),
                "method": method,
            }),
            ProxyError::InvalidBody(message) => json!({
                "error": "Invalid request body",
                "message": message,
            }),
            ProxyError::Upstream {
                error_type,
                message,
                url,
                response_time_ms,
                timestamp,
            } => json!({
                "error": "Failed to fetch from external API",
                "message": message,
                "errorType": error_type,
                "url": url,
                "responseTime": response_time_ms,
                "timestamp": timestamp,
            }),
        };
        (status, Json(body)).into_response()
    }
}
