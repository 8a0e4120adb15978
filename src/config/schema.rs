//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for both
//! binaries. All types derive Serde traits for deserialization from
//! config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DevFetchConfig {
    /// Server listener configuration.
    pub listener: ListenerConfig,

    /// Proxy service outbound call settings.
    pub proxy: ProxyConfig,

    /// Client-side dispatch settings.
    pub client: ClientConfig,

    /// Server-side request log storage.
    pub storage: StorageConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:5000").
    pub bind_address: String,

    /// Maximum accepted request body in bytes.
    pub max_body_bytes: usize,

    /// Ceiling for a whole inbound request, proxied call included.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
            max_body_bytes: 1024 * 1024,
            request_timeout_secs: 60,
        }
    }
}

/// Outbound settings for the proxy service.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Budget for one outbound call in seconds.
    pub timeout_secs: u64,

    /// Redirects followed before giving up.
    pub max_redirects: usize,

    /// Default User-Agent injected when the caller sets none.
    pub user_agent: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            max_redirects: 5,
            user_agent: "DevFetch/1.0 (External API Proxy)".to_string(),
        }
    }
}

/// Client-side dispatch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Application backend; URLs starting with it are sent directly.
    pub base_url: String,

    /// Budget for a direct call or a proxy round trip in seconds.
    pub timeout_secs: u64,

    /// Redirects followed on direct calls.
    pub max_redirects: usize,

    /// Directory holding the client's persisted state.
    pub state_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 30,
            max_redirects: 5,
            state_dir: PathBuf::from(".devfetch"),
        }
    }
}

/// Server-side request log configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Keep a request log at all.
    pub enabled: bool,

    /// JSON file backing the log; in-memory only when unset.
    pub path: Option<PathBuf>,

    /// Maximum entries returned by a history listing.
    pub list_limit: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
            list_limit: 100,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_budgets() {
        let config = DevFetchConfig::default();
        assert_eq!(config.proxy.timeout_secs, 15);
        assert_eq!(config.client.timeout_secs, 30);
        assert_eq!(config.client.base_url, "http://localhost:5000");
        assert_eq!(config.storage.list_limit, 100);
    }

    #[test]
    fn test_partial_toml() {
        let config: DevFetchConfig = toml::from_str(
            r#"
            [proxy]
            timeout_secs = 5

            [storage]
            path = "/tmp/devfetch-history.json"
            "#,
        )
        .unwrap();
        assert_eq!(config.proxy.timeout_secs, 5);
        assert_eq!(config.proxy.max_redirects, 5);
        assert_eq!(
            config.storage.path.as_deref(),
            Some(std::path::Path::new("/tmp/devfetch-history.json"))
        );
        assert!(config.storage.enabled);
    }
}
