//! DevFetch: HTTP request composer core and proxy service.
//!
//! ```text
//!   raw input ──▶ request::normalize ──▶ dispatch::Dispatcher
//!                                           │
//!                     ┌─────────────────────┴───────────────────┐
//!                     ▼ internal                      external  ▼
//!              DirectChannel                          ProxyChannel
//!                     │                                         │ POST /api/external
//!                     ▼                                         ▼
//!              transport::HttpTransport ◀──────────── proxy handlers (server)
//!                     │
//!                     ▼
//!              ResponseEnvelope / ErrorEnvelope ──▶ HistoryRecorder
//! ```

pub mod client;
pub mod config;
pub mod dispatch;
pub mod history;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod request;
pub mod transport;

pub use config::DevFetchConfig;
pub use dispatch::{Dispatcher, Outcome, ResponseEnvelope};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use request::{normalize, HeaderRow, Method, RequestDescriptor};
