//! Configuration loading from disk and environment.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::schema::DevFetchConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<DevFetchConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: DevFetchConfig = toml::from_str(&content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load from `path` when given (defaults otherwise), apply process
/// environment overrides, then validate.
pub fn load(path: Option<&Path>) -> Result<DevFetchConfig, ConfigError> {
    let mut config = match path {
        Some(path) => toml::from_str(&fs::read_to_string(path)?)?,
        None => DevFetchConfig::default(),
    };
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply `PORT`, `DEVFETCH_API_URL` and `DEVFETCH_HISTORY_PATH`.
pub fn apply_env_overrides<F>(config: &mut DevFetchConfig, var: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(port) = var("PORT").filter(|p| !p.is_empty()) {
        let host = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        config.listener.bind_address = format!("{host}:{port}");
    }
    if let Some(base_url) = var("DEVFETCH_API_URL").filter(|u| !u.is_empty()) {
        config.client.base_url = base_url;
    }
    if let Some(path) = var("DEVFETCH_HISTORY_PATH").filter(|p| !p.is_empty()) {
        config.storage.path = Some(PathBuf::from(path));
    }
}
