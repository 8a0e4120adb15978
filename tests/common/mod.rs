//! Shared utilities for integration tests.

#![allow(dead_code)]

use axum::{
    body::Bytes,
    http::{HeaderMap, Method, StatusCode},
    routing::{any, get},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;

use devfetch::config::DevFetchConfig;
use devfetch::http::HttpServer;
use devfetch::lifecycle::Shutdown;

/// Backend with a few canned routes:
/// `/ok` JSON 200, `/missing` JSON 404, `/text` plain text,
/// `/echo` reflects method, headers and body, `/slow` sleeps 2s.
pub fn backend_router() -> Router {
    Router::new()
        .route("/ok", get(|| async { Json(json!({ "ok": true })) }))
        .route(
            "/missing",
            get(|| async { (StatusCode::NOT_FOUND, Json(json!({ "error": "nope" }))) }),
        )
        .route("/text", get(|| async { "hello" }))
        .route("/echo", any(echo))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                "late"
            }),
        )
}

async fn echo(method: Method, headers: HeaderMap, body: Bytes) -> Json<Value> {
    let headers: BTreeMap<String, String> = headers
        .iter()
        .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or_default().to_string()))
        .collect();
    Json(json!({
        "method": method.as_str(),
        "headers": headers,
        "body": String::from_utf8_lossy(&body),
    }))
}

/// Serve `router` on an ephemeral local port.
pub async fn start_backend(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}

/// Start the proxy service with `config`, storage kept in memory.
pub async fn start_server(mut config: DevFetchConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    config.listener.bind_address = addr.to_string();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });
    (addr, shutdown)
}

/// Address that nothing is listening on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

pub fn test_config() -> DevFetchConfig {
    let mut config = DevFetchConfig::default();
    config.storage.path = None;
    config.proxy.timeout_secs = 1;
    config
}
