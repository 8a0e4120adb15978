//! reqwest-backed transport adapter.
//!
//! # Responsibilities
//! - Issue exactly one HTTP request per call
//! - Serialize the descriptor body (JSON → text, raw text unchanged)
//! - Buffer the full response body before returning
//! - Enforce the caller's fixed timeout

use std::time::Duration;

use reqwest::redirect::Policy;

use crate::request::{Headers, Method, RequestDescriptor};
use crate::transport::error::TransportError;

/// Fully buffered response as seen by the adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Headers,
    pub body_text: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Size of the buffered body text in bytes.
    pub fn size_bytes(&self) -> u64 {
        self.body_text.len() as u64
    }
}

/// HTTP client wrapper with a fixed per-call budget.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    /// Create a transport that follows at most `max_redirects` redirects.
    pub fn new(timeout: Duration, max_redirects: usize) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(Policy::limited(max_redirects))
            .build()
            .map_err(|e| TransportError::Unknown(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Perform the call described by `descriptor`.
    pub async fn send(&self, descriptor: &RequestDescriptor) -> Result<RawResponse, TransportError> {
        let mut builder = self
            .client
            .request(to_reqwest_method(descriptor.method), descriptor.url.as_str());

        for (key, value) in descriptor.headers.iter() {
            builder = builder.header(key, value);
        }

        if let Some(body) = &descriptor.body {
            let text = body
                .to_wire()
                .map_err(|e| TransportError::Unknown(format!("failed to serialize body: {e}")))?;
            builder = builder.body(text);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(e, self.timeout))?;

        let status = response.status();
        let mut headers = Headers::new();
        for (name, value) in response.headers() {
            headers.append(name.as_str(), String::from_utf8_lossy(value.as_bytes()));
        }

        let body_text = response
            .text()
            .await
            .map_err(|e| TransportError::from_reqwest(e, self.timeout))?;

        Ok(RawResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body_text,
        })
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("timeout_secs", &self.timeout.as_secs())
            .finish()
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
        Method::Patch => reqwest::Method::PATCH,
        Method::Head => reqwest::Method::HEAD,
        Method::Options => reqwest::Method::OPTIONS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Body;
    use axum::{extract::Request, routing::any, Router};
    use std::net::SocketAddr;

    async fn echo_backend() -> SocketAddr {
        let app = Router::new().route(
            "/echo",
            any(|request: Request| async move {
                let method = request.method().to_string();
                let content_type = request
                    .headers()
                    .get("content-type")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("")
                    .to_string();
                let token = request
                    .headers()
                    .get("x-token")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("")
                    .to_string();
                let body = axum::body::to_bytes(request.into_body(), usize::MAX)
                    .await
                    .unwrap_or_default();
                axum::Json(serde_json::json!({
                    "method": method,
                    "contentType": content_type,
                    "token": token,
                    "body": String::from_utf8_lossy(&body),
                }))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        addr
    }

    #[tokio::test]
    async fn test_send_passes_headers_and_json_body() {
        let addr = echo_backend().await;
        let transport = HttpTransport::new(Duration::from_secs(5), 5).unwrap();

        let mut descriptor = RequestDescriptor::new(format!("http://{addr}/echo"), Method::Post);
        descriptor.headers.insert("X-Token", "abc");
        descriptor.body = Some(Body::Json(serde_json::json!({"a": 1})));

        let response = transport.send(&descriptor).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.status_text, "OK");

        let echoed: serde_json::Value = serde_json::from_str(&response.body_text).unwrap();
        assert_eq!(echoed["method"], "POST");
        assert_eq!(echoed["token"], "abc");
        assert_eq!(echoed["body"], r#"{"a":1}"#);
        // no Content-Type injection at this layer
        assert_eq!(echoed["contentType"], "");
    }

    #[tokio::test]
    async fn test_not_found_is_not_an_error() {
        let addr = echo_backend().await;
        let transport = HttpTransport::new(Duration::from_secs(5), 5).unwrap();

        let descriptor = RequestDescriptor::new(format!("http://{addr}/missing"), Method::Get);
        let response = transport.send(&descriptor).await.unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(response.status_text, "Not Found");
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_connection_refused_is_classified() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = HttpTransport::new(Duration::from_secs(5), 5).unwrap();
        let descriptor = RequestDescriptor::new(format!("http://{addr}/"), Method::Get);
        let err = transport.send(&descriptor).await.unwrap_err();
        assert_eq!(err.error_type(), crate::transport::ErrorType::ConnectionRefused);
    }

    #[tokio::test]
    async fn test_timeout_is_classified() {
        let app = Router::new().route(
            "/slow",
            any(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                "late"
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let transport = HttpTransport::new(Duration::from_millis(300), 5).unwrap();
        let descriptor = RequestDescriptor::new(format!("http://{addr}/slow"), Method::Get);
        let err = transport.send(&descriptor).await.unwrap_err();
        assert_eq!(err.error_type(), crate::transport::ErrorType::TimeoutError);
    }
}
