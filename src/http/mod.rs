//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware: request ID, trace, CORS, limits)
//!     → proxy handlers (/api/external, /api/request)
//!     → history handlers (/api/history[/:id])
//!     → JSON response
//! ```

pub mod request;
pub mod server;

pub use request::{request_id, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
