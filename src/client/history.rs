//! Local request history, the composer's side of the history log.

use chrono::NaiveDate;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

use crate::client::storage::{LocalStorage, HISTORY_KEY};
use crate::history::{HistoryEntry, HistoryRecorder};

/// Status filter for listing history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryFilter {
    #[default]
    All,
    /// 2xx responses.
    Success,
    /// 4xx and 5xx responses. Network failures (status 0) match neither.
    Error,
}

impl HistoryFilter {
    pub fn matches(self, status: u16) -> bool {
        match self {
            HistoryFilter::All => true,
            HistoryFilter::Success => (200..300).contains(&status),
            HistoryFilter::Error => status >= 400,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown history filter '{0}' (expected all, success or error)")]
pub struct UnknownFilter(pub String);

impl FromStr for HistoryFilter {
    type Err = UnknownFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(HistoryFilter::All),
            "success" => Ok(HistoryFilter::Success),
            "error" => Ok(HistoryFilter::Error),
            _ => Err(UnknownFilter(s.to_string())),
        }
    }
}

impl fmt::Display for HistoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HistoryFilter::All => "all",
            HistoryFilter::Success => "success",
            HistoryFilter::Error => "error",
        })
    }
}

/// Summary counts over the whole history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HistoryStats {
    pub total: usize,
    pub success: usize,
    pub error: usize,
    /// Rounded mean of `responseTime`; 0 when empty.
    pub average_response_ms: u64,
}

/// Default export file name for a given day, e.g. `devfetch-history-2024-05-01.json`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("devfetch-history-{}.json", date.format("%Y-%m-%d"))
}

/// History array loaded once and rewritten on every change.
pub struct LocalHistory {
    storage: LocalStorage,
    entries: Mutex<Vec<HistoryEntry>>,
}

impl LocalHistory {
    /// Load saved history. Unreadable or corrupt state starts empty.
    pub fn load(storage: LocalStorage) -> Self {
        let entries = match storage.get_item(HISTORY_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::error!(error = %e, "Failed to load history from local storage");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to load history from local storage");
                Vec::new()
            }
        };
        Self {
            storage,
            entries: Mutex::new(entries),
        }
    }

    /// Snapshot, newest first.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.lock().clone()
    }

    pub fn get(&self, id: &str) -> Option<HistoryEntry> {
        self.lock().iter().find(|e| e.id == id).cloned()
    }

    /// Entries matching `filter` whose URL or method contains `search`,
    /// case-insensitively. An empty search matches everything.
    pub fn filtered(&self, filter: HistoryFilter, search: &str) -> Vec<HistoryEntry> {
        let needle = search.to_lowercase();
        self.lock()
            .iter()
            .filter(|e| filter.matches(e.response_status))
            .filter(|e| {
                needle.is_empty()
                    || e.url.to_lowercase().contains(&needle)
                    || e.method.as_str().to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    pub fn stats(&self) -> HistoryStats {
        let entries = self.lock();
        let total = entries.len();
        let success = entries.iter().filter(|e| HistoryFilter::Success.matches(e.response_status)).count();
        let error = entries.iter().filter(|e| HistoryFilter::Error.matches(e.response_status)).count();
        let average_response_ms = if total == 0 {
            0
        } else {
            let sum: u128 = entries.iter().map(|e| u128::from(e.response_time_ms)).sum();
            let total = total as u128;
            u64::try_from((sum + total / 2) / total).unwrap_or(u64::MAX)
        };
        HistoryStats {
            total,
            success,
            error,
            average_response_ms,
        }
    }

    /// Write the whole history as pretty JSON to `path`.
    pub fn export(&self, path: &Path) -> std::io::Result<()> {
        let raw = serde_json::to_string_pretty(&*self.lock()).map_err(std::io::Error::from)?;
        std::fs::write(path, raw)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Remove one entry; returns whether it existed.
    pub fn delete(&self, id: &str) -> bool {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|e| e.id != id);
        let removed = entries.len() != before;
        if removed {
            self.save(&entries);
        }
        removed
    }

    pub fn clear(&self) {
        let mut entries = self.lock();
        entries.clear();
        if let Err(e) = self.storage.remove_item(HISTORY_KEY) {
            tracing::error!(error = %e, "Failed to clear history");
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<HistoryEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Called with the lock held so concurrent writers cannot interleave.
    fn save(&self, entries: &[HistoryEntry]) {
        let result = serde_json::to_string(entries)
            .map_err(std::io::Error::from)
            .and_then(|raw| self.storage.set_item(HISTORY_KEY, &raw));
        if let Err(e) = result {
            tracing::error!(error = %e, "Failed to save history to local storage");
        }
    }
}

impl HistoryRecorder for LocalHistory {
    fn record(&self, entry: HistoryEntry) {
        let mut entries = self.lock();
        entries.insert(0, entry);
        self.save(&entries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::ResponseEnvelope;
    use crate::request::{Headers, Method, RequestDescriptor};
    use std::sync::Arc;

    fn entry_with(url: &str, method: Method, status: u16, ms: u64) -> HistoryEntry {
        let envelope = ResponseEnvelope {
            status,
            status_text: String::new(),
            headers: Headers::new(),
            data: serde_json::Value::Null,
            response_time_ms: ms,
            size_bytes: None,
        };
        HistoryEntry::new(&RequestDescriptor::new(url, method), &envelope)
    }

    fn sample_history(dir: &Path) -> LocalHistory {
        let history = LocalHistory::load(LocalStorage::new(dir));
        history.record(entry_with("https://api.example.com/users", Method::Get, 200, 10));
        history.record(entry_with("https://api.example.com/users", Method::Post, 201, 20));
        history.record(entry_with("https://other.example/missing", Method::Get, 404, 30));
        history.record(entry_with("https://other.example/boom", Method::Delete, 500, 41));
        history.record(entry_with("https://down.example/", Method::Get, 0, 0));
        history
    }

    #[test]
    fn test_status_filter() {
        let dir = tempfile::tempdir().unwrap();
        let history = sample_history(dir.path());

        assert_eq!(history.filtered(HistoryFilter::All, "").len(), 5);
        let ok: Vec<u16> = history
            .filtered(HistoryFilter::Success, "")
            .iter()
            .map(|e| e.response_status)
            .collect();
        assert_eq!(ok, vec![201, 200]);
        let failed: Vec<u16> = history
            .filtered(HistoryFilter::Error, "")
            .iter()
            .map(|e| e.response_status)
            .collect();
        assert_eq!(failed, vec![500, 404]);
    }

    #[test]
    fn test_search_matches_url_and_method() {
        let dir = tempfile::tempdir().unwrap();
        let history = sample_history(dir.path());

        assert_eq!(history.filtered(HistoryFilter::All, "USERS").len(), 2);
        assert_eq!(history.filtered(HistoryFilter::All, "delete").len(), 1);
        assert_eq!(history.filtered(HistoryFilter::Success, "post").len(), 1);
        assert!(history.filtered(HistoryFilter::Error, "users").is_empty());
    }

    #[test]
    fn test_filter_parse() {
        assert_eq!("Success".parse::<HistoryFilter>().unwrap(), HistoryFilter::Success);
        assert_eq!("all".parse::<HistoryFilter>().unwrap(), HistoryFilter::All);
        assert!("broken".parse::<HistoryFilter>().is_err());
    }

    #[test]
    fn test_stats() {
        let dir = tempfile::tempdir().unwrap();
        let stats = sample_history(dir.path()).stats();
        assert_eq!(
            stats,
            HistoryStats {
                total: 5,
                success: 2,
                error: 2,
                average_response_ms: 20,
            }
        );

        let empty = tempfile::tempdir().unwrap();
        assert_eq!(LocalHistory::load(LocalStorage::new(empty.path())).stats(), HistoryStats::default());
    }

    #[test]
    fn test_export_writes_full_history() {
        let dir = tempfile::tempdir().unwrap();
        let history = sample_history(dir.path());
        let path = dir.path().join(export_file_name(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()));
        assert!(path.ends_with("devfetch-history-2024-05-01.json"));

        history.export(&path).unwrap();
        let exported: Vec<HistoryEntry> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(exported, history.entries());
    }

    fn entry(url: &str, status: u16) -> HistoryEntry {
        let envelope = ResponseEnvelope {
            status,
            status_text: String::new(),
            headers: Headers::new(),
            data: serde_json::Value::Null,
            response_time_ms: 1,
            size_bytes: None,
        };
        HistoryEntry::new(&RequestDescriptor::new(url, Method::Get), &envelope)
    }

    #[test]
    fn test_record_prepends_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let history = LocalHistory::load(LocalStorage::new(dir.path()));
        history.record(entry("https://a.example", 200));
        history.record(entry("https://b.example", 0));

        let reloaded = LocalHistory::load(LocalStorage::new(dir.path()));
        let urls: Vec<String> = reloaded.entries().into_iter().map(|e| e.url).collect();
        assert_eq!(urls, vec!["https://b.example", "https://a.example"]);
    }

    #[test]
    fn test_delete_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let history = LocalHistory::load(LocalStorage::new(dir.path()));
        let first = entry("https://a.example", 200);
        let id = first.id.clone();
        history.record(first);
        history.record(entry("https://b.example", 200));

        assert!(history.delete(&id));
        assert!(!history.delete(&id));
        assert_eq!(LocalHistory::load(LocalStorage::new(dir.path())).len(), 1);

        history.clear();
        assert!(history.is_empty());
        assert!(LocalHistory::load(LocalStorage::new(dir.path())).is_empty());
    }

    #[test]
    fn test_corrupt_state_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());
        storage.set_item(HISTORY_KEY, "{not json").unwrap();
        assert!(LocalHistory::load(storage).is_empty());
    }

    #[test]
    fn test_concurrent_records_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let history = Arc::new(LocalHistory::load(LocalStorage::new(dir.path())));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let history = history.clone();
                std::thread::spawn(move || {
                    for j in 0..25 {
                        history.record(entry(&format!("https://{i}-{j}.example"), 200));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(history.len(), 100);
        assert_eq!(LocalHistory::load(LocalStorage::new(dir.path())).len(), 100);
    }
}
