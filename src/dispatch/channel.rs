//! The two ways a descriptor can reach its target.

use serde::Deserialize;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

use crate::dispatch::envelope::parse_data;
use crate::request::{Headers, RequestDescriptor};
use crate::transport::{HttpTransport, TransportError};

/// Proxy endpoint path, relative to the application's base URL.
pub const PROXY_ENDPOINT: &str = "/api/external";

/// A response that came back through a channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Exchange {
    pub status: u16,
    pub status_text: String,
    pub headers: Headers,
    pub data: Value,
    pub size_bytes: Option<u64>,
}

/// A failed send. `response` is set when something answered with a failure.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelError {
    pub message: String,
    pub response: Option<Exchange>,
}

impl ChannelError {
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            response: None,
        }
    }
}

impl From<TransportError> for ChannelError {
    fn from(err: TransportError) -> Self {
        ChannelError::network(err.to_string())
    }
}

/// One way of delivering a descriptor: `send(descriptor) → exchange`.
pub trait Channel: Send + Sync {
    fn send(
        &self,
        descriptor: &RequestDescriptor,
    ) -> impl Future<Output = Result<Exchange, ChannelError>> + Send;
}

/// Calls the target directly through the transport adapter.
#[derive(Debug, Clone)]
pub struct DirectChannel {
    transport: HttpTransport,
}

impl DirectChannel {
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }
}

impl Channel for DirectChannel {
    async fn send(&self, descriptor: &RequestDescriptor) -> Result<Exchange, ChannelError> {
        let raw = self.transport.send(descriptor).await?;
        let size_bytes = Some(raw.size_bytes());
        Ok(Exchange {
            status: raw.status,
            status_text: raw.status_text,
            headers: raw.headers,
            data: parse_data(&raw.body_text),
            size_bytes,
        })
    }
}

/// Forwards the descriptor to the proxy service and unwraps its envelope.
#[derive(Debug, Clone)]
pub struct ProxyChannel {
    client: reqwest::Client,
    endpoint: String,
}

/// The subset of the proxy's success payload that survives unwrapping.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProxyPayload {
    status: u16,
    #[serde(default)]
    status_text: String,
    #[serde(default)]
    headers: Headers,
    #[serde(default)]
    data: Value,
    #[serde(rename = "size", default)]
    size_bytes: Option<u64>,
}

impl ProxyChannel {
    /// `base_url` is the proxy service's root; `timeout` bounds the whole round trip.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Unknown(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), PROXY_ENDPOINT),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Channel for ProxyChannel {
    async fn send(&self, descriptor: &RequestDescriptor) -> Result<Exchange, ChannelError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(descriptor)
            .send()
            .await
            .map_err(|e| ChannelError::network(e.to_string()))?;

        let status = response.status();
        let mut headers = Headers::new();
        for (name, value) in response.headers() {
            headers.append(name.as_str(), String::from_utf8_lossy(value.as_bytes()));
        }
        let text = response
            .text()
            .await
            .map_err(|e| ChannelError::network(e.to_string()))?;
        let data = parse_data(&text);

        if !status.is_success() {
            return Err(ChannelError {
                message: format!("Request failed with status code {}", status.as_u16()),
                response: Some(Exchange {
                    status: status.as_u16(),
                    status_text: status.canonical_reason().unwrap_or_default().to_string(),
                    headers,
                    data,
                    size_bytes: None,
                }),
            });
        }

        let payload: ProxyPayload = serde_json::from_value(data)
            .map_err(|e| ChannelError::network(format!("malformed proxy response: {e}")))?;
        Ok(Exchange {
            status: payload.status,
            status_text: payload.status_text,
            headers: payload.headers,
            data: payload.data,
            size_bytes: payload.size_bytes,
        })
    }
}
