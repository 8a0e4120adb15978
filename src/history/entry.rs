//! Client-side history records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::dispatch::ResponseEnvelope;
use crate::request::{Body, Headers, Method, RequestDescriptor};

/// One completed dispatch, successful or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub url: String,
    pub method: Method,
    #[serde(default)]
    pub headers: Headers,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
    pub response_status: u16,
    #[serde(rename = "responseTime")]
    pub response_time_ms: u64,
    pub response: ResponseEnvelope,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    /// Build the record for `descriptor` and the envelope it produced.
    pub fn new(descriptor: &RequestDescriptor, envelope: &ResponseEnvelope) -> Self {
        let timestamp = Utc::now();
        Self {
            id: next_id(timestamp),
            url: descriptor.url.clone(),
            method: descriptor.method,
            headers: descriptor.headers.clone(),
            body: descriptor.body.clone(),
            response_status: envelope.status,
            response_time_ms: envelope.response_time_ms,
            response: envelope.clone(),
            timestamp,
        }
    }
}

/// Sink for completed dispatches.
///
/// Implementations must not lose entries when called from several
/// completed dispatches at once.
pub trait HistoryRecorder: Send + Sync {
    fn record(&self, entry: HistoryEntry);
}

static LAST_ID: AtomicU64 = AtomicU64::new(0);

/// Creation time in milliseconds, bumped so ids stay unique within a process.
fn next_id(now: DateTime<Utc>) -> String {
    let millis = u64::try_from(now.timestamp_millis()).unwrap_or_default();
    let mut current = LAST_ID.load(Ordering::Relaxed);
    loop {
        let candidate = millis.max(current + 1);
        match LAST_ID.compare_exchange_weak(current, candidate, Ordering::SeqCst, Ordering::Relaxed) {
            Ok(_) => return candidate.to_string(),
            Err(actual) => current = actual,
        }
    }
}
