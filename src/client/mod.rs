//! Client-side state and server access for the composer.
//!
//! # Data Flow
//! ```text
//! startup
//!     → storage.rs (one JSON value per key under the state directory)
//!     → history.rs (LocalHistory: "devfetch-history", newest first,
//!       status filter, search, stats, JSON export)
//!     → preferences.rs (Preferences: "darkMode", default true)
//!
//! every mutation rewrites the whole value for its key
//!
//! remote.rs: thin client for the server-side /api/history endpoints
//! ```

pub mod history;
pub mod preferences;
pub mod remote;
pub mod storage;

pub use history::{export_file_name, HistoryFilter, HistoryStats, LocalHistory};
pub use preferences::Preferences;
pub use remote::RemoteHistory;
pub use storage::{LocalStorage, DARK_MODE_KEY, HISTORY_KEY};
