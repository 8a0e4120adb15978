//! Transport adapter subsystem.
//!
//! # Data Flow
//! ```text
//! RequestDescriptor
//!     → client.rs (one reqwest call, body buffered, hard timeout)
//!     → RawResponse { status, status_text, headers, body_text }
//!
//! On failure:
//!     reqwest::Error → error.rs (classified by low-level cause) → TransportError
//! ```
//!
//! # Design Decisions
//! - Exactly one HTTP request per call; no retries
//! - Headers go out verbatim, no Content-Type injection at this layer
//! - 4xx/5xx are ordinary responses; only transport-level failures are errors
//! - The timeout is owned by the adapter, each caller picks its own budget

pub mod client;
pub mod error;

pub use client::{HttpTransport, RawResponse};
pub use error::{ErrorType, TransportError};
