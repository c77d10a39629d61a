//! Event log entries.

use serde::{Deserialize, Serialize};

/// Width of the recent-log window attached to check responses (2 hours).
pub const RECENT_LOG_WINDOW_MS: i64 = 2 * 60 * 60 * 1000;

/// A single app event, appended by mutating operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(rename = "eventType")]
    pub event_type: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl LogEntry {
    pub fn new(
        event_type: impl Into<String>,
        timestamp: i64,
        user: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            timestamp,
            user: user.into(),
            data,
        }
    }
}

/// Entries with `timestamp >= now_ms - RECENT_LOG_WINDOW_MS`, in their original order.
pub fn recent_window(entries: &[LogEntry], now_ms: i64) -> Vec<LogEntry> {
    let cutoff = now_ms - RECENT_LOG_WINDOW_MS;
    entries
        .iter()
        .filter(|e| e.timestamp >= cutoff)
        .cloned()
        .collect()
}

/// `entries` with `entry` appended, keeping only the newest `max_entries`.
pub fn append_bounded(
    mut entries: Vec<LogEntry>,
    entry: LogEntry,
    max_entries: usize,
) -> Vec<LogEntry> {
    entries.push(entry);
    let overflow = entries.len().saturating_sub(max_entries);
    entries.drain(..overflow);
    entries
}
