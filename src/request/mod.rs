//! Request composition subsystem.
//!
//! # Data Flow
//! ```text
//! raw user input (url, method, header rows, body text)
//!     → normalize.rs (filter rows, collapse headers, parse body)
//!     → RequestDescriptor (canonical, transport-ready)
//!     → dispatch subsystem
//! ```
//!
//! # Design Decisions
//! - Normalization is a pure function; it never fails and never touches the network
//! - URL syntax is checked later by the dispatcher, not here
//! - Header names compare case-insensitively; the last spelling written wins

pub mod normalize;
pub mod types;

pub use normalize::{collapse_headers, normalize, parse_body};
pub use types::{Body, HeaderRow, Headers, Method, RequestDescriptor, UnknownMethod};
