//! Server-side request log storage and persistence.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::observability::metrics;
use crate::request::{Body, Headers, Method};

/// One request handled by `/api/request`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestLog {
    #[serde(rename = "_id")]
    pub id: String,
    pub url: String,
    pub method: Method,
    #[serde(default)]
    pub request_headers: Headers,
    #[serde(default)]
    pub request_body: Option<Body>,
    pub response_status: u16,
    #[serde(default)]
    pub response_headers: Headers,
    #[serde(default)]
    pub response_body: Value,
    #[serde(rename = "responseTime")]
    pub response_time_ms: u64,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub error: bool,
}

impl RequestLog {
    /// New record with a fresh id and the current time.
    pub fn new(url: impl Into<String>, method: Method) -> Self {
        Self {
            id: uuid::Uuid::new_v4().simple().to_string(),
            url: url.into(),
            method,
            request_headers: Headers::new(),
            request_body: None,
            response_status: 0,
            response_headers: Headers::new(),
            response_body: Value::Null,
            response_time_ms: 0,
            timestamp: Utc::now(),
            error: false,
        }
    }
}

/// Errors from the persistence layer. Never surfaced to API callers.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("history file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("history file is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
}

/// A thread-safe request log, optionally mirrored to a JSON file.
#[derive(Clone)]
pub struct LogStore {
    inner: Arc<DashMap<String, RequestLog>>,
    persistence_path: Option<PathBuf>,
    list_limit: usize,
    /// Serializes file rewrites so concurrent appends never interleave.
    write_lock: Arc<Mutex<()>>,
}

impl LogStore {
    /// Create a new empty store.
    pub fn new(persistence_path: Option<PathBuf>, list_limit: usize) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            persistence_path,
            list_limit,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Load from file if it exists; a missing file yields an empty store.
    pub fn load_from_file(path: &Path, list_limit: usize) -> Result<Self, StoreError> {
        let store = Self::new(Some(path.to_path_buf()), list_limit);
        if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            let logs: Vec<RequestLog> = serde_json::from_reader(reader)?;
            for log in logs {
                store.inner.insert(log.id.clone(), log);
            }
            tracing::info!(path = ?path, entries = store.inner.len(), "Loaded request log");
        }
        Ok(store)
    }

    /// Rewrite the backing file with the full log.
    pub fn save_to_file(&self) -> Result<(), StoreError> {
        let Some(path) = &self.persistence_path else {
            return Ok(());
        };
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let logs = self.sorted();
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(writer, &logs)?;
        tracing::debug!(path = ?path, entries = logs.len(), "Saved request log");
        Ok(())
    }

    /// Append a record. The in-memory insert always succeeds; only the
    /// file rewrite can fail.
    pub fn append(&self, log: RequestLog) -> Result<(), StoreError> {
        self.inner.insert(log.id.clone(), log);
        let result = self.save_to_file();
        metrics::record_history_write(result.is_ok());
        result
    }

    /// Newest first, capped at the configured limit.
    pub fn list(&self) -> Vec<RequestLog> {
        let mut logs = self.sorted();
        logs.truncate(self.list_limit);
        logs
    }

    pub fn get(&self, id: &str) -> Option<RequestLog> {
        self.inner.get(id).map(|r| r.value().clone())
    }

    /// Remove one record; deleting an unknown id is not an error.
    pub fn remove(&self, id: &str) -> Result<Option<RequestLog>, StoreError> {
        let removed = self.inner.remove(id).map(|(_, log)| log);
        if removed.is_some() {
            self.save_to_file()?;
        }
        Ok(removed)
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.inner.clear();
        self.save_to_file()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn sorted(&self) -> Vec<RequestLog> {
        let mut logs: Vec<RequestLog> = self.inner.iter().map(|r| r.value().clone()).collect();
        logs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        logs
    }
}

impl std::fmt::Debug for LogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogStore")
            .field("entries", &self.inner.len())
            .field("persistence_path", &self.persistence_path)
            .finish()
    }
}
