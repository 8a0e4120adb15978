//! Proxy wire types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::proxy::error::ProxyError;
use crate::request::{Body, Headers, Method, RequestDescriptor};

/// Body accepted by both proxy endpoints.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProxyRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub headers: Option<Headers>,
    #[serde(default)]
    pub body: Option<Body>,
}

impl ProxyRequest {
    /// Validate and convert into a descriptor.
    ///
    /// The URL must be present and absolute; the method defaults to GET.
    /// A body is kept only for POST, PUT and PATCH and only when non-empty.
    pub fn into_descriptor(self) -> Result<RequestDescriptor, ProxyError> {
        let url = match self.url {
            Some(url) if !url.is_empty() => url,
            _ => return Err(ProxyError::MissingUrl),
        };
        if let Err(e) = url::Url::parse(&url) {
            return Err(ProxyError::InvalidUrl {
                message: e.to_string(),
                url,
            });
        }
        let method = match self.method.as_deref() {
            None | Some("") => Method::Get,
            Some(raw) => raw.parse().map_err(|_| ProxyError::InvalidMethod(raw.to_string()))?,
        };
        let body = self
            .body
            .filter(|body| method.allows_body() && !body.is_empty());

        Ok(RequestDescriptor {
            url,
            method,
            headers: self.headers.unwrap_or_default(),
            body,
        })
    }
}

/// Success envelope of `/api/external`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Headers,
    pub data: Value,
    #[serde(rename = "responseTime")]
    pub response_time_ms: u64,
    #[serde(rename = "size")]
    pub size_bytes: u64,
    pub url: String,
    pub success: bool,
}
