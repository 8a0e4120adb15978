//! Client for the server-side request log.

use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::history::RequestLog;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("server returned {status}: {body}")]
    Status { status: StatusCode, body: String },
}

/// Wraps the `/api/history` endpoints of a running server.
pub struct RemoteHistory {
    client: Client,
    base_url: String,
}

impl RemoteHistory {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| RemoteError::Http {
                url: base_url.to_string(),
                source,
            })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn list(&self) -> Result<Vec<RequestLog>, RemoteError> {
        let value = self.call(reqwest::Method::GET, "/api/history").await?;
        serde_json::from_value(value).map_err(|e| RemoteError::Status {
            status: StatusCode::OK,
            body: format!("unexpected history payload: {e}"),
        })
    }

    pub async fn get(&self, id: &str) -> Result<Value, RemoteError> {
        self.call(reqwest::Method::GET, &format!("/api/history/{id}")).await
    }

    pub async fn delete(&self, id: &str) -> Result<Value, RemoteError> {
        self.call(reqwest::Method::DELETE, &format!("/api/history/{id}")).await
    }

    pub async fn clear(&self) -> Result<Value, RemoteError> {
        self.call(reqwest::Method::DELETE, "/api/history").await
    }

    async fn call(&self, method: reqwest::Method, path: &str) -> Result<Value, RemoteError> {
        let url = format!("{}{}", self.base_url, path);
        let http_err = |source: reqwest::Error| RemoteError::Http {
            url: url.clone(),
            source,
        };
        let response = self
            .client
            .request(method, &url)
            .send()
            .await
            .map_err(http_err)?;

        let status = response.status();
        let text = response.text().await.map_err(http_err)?;
        if !status.is_success() {
            return Err(RemoteError::Status { status, body: text });
        }
        Ok(crate::dispatch::envelope::parse_data(&text))
    }
}
