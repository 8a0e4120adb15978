//! Request history subsystem.
//!
//! # Data Flow
//! ```text
//! Client side:
//!     Dispatcher → HistoryEntry → HistoryRecorder::record (fire-and-forget)
//!         → client::LocalHistory (JSON state file, rewritten wholesale)
//!
//! Server side:
//!     POST /api/request → RequestLog → LogStore::append (best-effort)
//!     GET/DELETE /api/history[/:id] → handlers.rs → LogStore
//! ```
//!
//! # Design Decisions
//! - Entries are append-only; only deletion ends their lifetime
//! - Recording never fails the dispatch; persistence errors are logged
//! - The server store is an owned handle passed through state, not a global

pub mod entry;
pub mod handlers;
pub mod store;

pub use entry::{HistoryEntry, HistoryRecorder};
pub use handlers::setup_history_router;
pub use store::{LogStore, RequestLog, StoreError};
