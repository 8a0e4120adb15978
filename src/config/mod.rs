//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, defaults for missing fields)
//!     → loader.rs (environment overrides: PORT, DEVFETCH_API_URL, DEVFETCH_HISTORY_PATH)
//!     → validation.rs (semantic checks)
//!     → DevFetchConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults so an absent file is a valid configuration
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load, load_config, ConfigError};
pub use schema::{
    ClientConfig, DevFetchConfig, ListenerConfig, ObservabilityConfig, ProxyConfig, StorageConfig,
};
pub use validation::{validate_config, ValidationError};
