//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, limits > 0)
//! - Validate addresses and the client base URL
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DevFetchConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::DevFetchConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field}: must be greater than zero")]
    Zero { field: &'static str },

    #[error("client.base_url: '{0}' is not an absolute http(s) URL")]
    InvalidBaseUrl(String),

    #[error("observability.log_level: unknown level '{0}'")]
    InvalidLogLevel(String),
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Check every semantic constraint, collecting all failures.
pub fn validate_config(config: &DevFetchConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    let positive = [
        ("listener.max_body_bytes", config.listener.max_body_bytes as u64),
        ("listener.request_timeout_secs", config.listener.request_timeout_secs),
        ("proxy.timeout_secs", config.proxy.timeout_secs),
        ("client.timeout_secs", config.client.timeout_secs),
        ("storage.list_limit", config.storage.list_limit as u64),
    ];
    for (field, value) in positive {
        if value == 0 {
            errors.push(ValidationError::Zero { field });
        }
    }

    match url::Url::parse(&config.client.base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        _ => errors.push(ValidationError::InvalidBaseUrl(config.client.base_url.clone())),
    }

    if !LOG_LEVELS.contains(&config.observability.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::InvalidLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&DevFetchConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = DevFetchConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.proxy.timeout_secs = 0;
        config.client.base_url = "ftp://files.example.com".into();
        config.observability.log_level = "loud".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::Zero {
            field: "proxy.timeout_secs"
        }));
        assert!(errors.contains(&ValidationError::InvalidBaseUrl(
            "ftp://files.example.com".into()
        )));
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = DevFetchConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
