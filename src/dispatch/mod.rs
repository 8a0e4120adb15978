//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! RequestDescriptor
//!     → target.rs (literal prefix check against the base URL)
//!     → channel.rs
//!         Internal → DirectChannel → transport adapter
//!         External → ProxyChannel  → POST {base}/api/external → proxy service
//!     → envelope.rs (uniform ResponseEnvelope / ErrorEnvelope)
//!     → dispatcher.rs (timing, history record, Outcome)
//! ```
//!
//! # Design Decisions
//! - Both paths implement one `Channel` capability; the dispatcher only picks
//! - Failures never cross the boundary as errors; they become envelopes
//! - History is recorded exactly once per dispatch, failures included

pub mod channel;
pub mod dispatcher;
pub mod envelope;
pub mod target;

pub use channel::{Channel, ChannelError, DirectChannel, Exchange, ProxyChannel};
pub use dispatcher::Dispatcher;
pub use envelope::{ErrorEnvelope, Outcome, ResponseEnvelope};
pub use target::{classify, Target};
