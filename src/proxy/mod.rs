//! Proxy service subsystem.
//!
//! # Data Flow
//! ```text
//! POST /api/external {url, method?, headers?, body?}
//!     → types.rs (validate url/method, drop body for bodiless methods)
//!     → headers.rs (default header set, caller headers win)
//!     → transport adapter (proxy budget, limited redirects)
//!     → 200 ProxyResponse envelope
//!       or 500 classified failure (error.rs)
//!
//! POST /api/request
//!     → same validation, caller headers + JSON Content-Type only
//!     → transport adapter
//!     → best-effort RequestLog append
//! ```
//!
//! # Design Decisions
//! - Input validation failures are 400s and never reach the network
//! - Target 4xx/5xx are passed through inside a 200 envelope
//! - A transport failure is always a 500 from the proxy itself

pub mod error;
pub mod handlers;
pub mod headers;
pub mod types;

pub use error::ProxyError;
pub use handlers::setup_proxy_router;
pub use types::{ProxyRequest, ProxyResponse};
