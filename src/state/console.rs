//! Append-only log console fed by push `log_update` events.

use std::collections::VecDeque;

use chrono::Local;

use crate::api::types::{LogEntry, LogLevel};

/// Capacity-capped log list with a client-side platform filter.
///
/// Filtering never re-fetches: all received entries stay in the buffer
/// and the filter only narrows what `visible()` yields. Untagged
/// entries (no platform) show under every filter.
#[derive(Debug, Clone)]
pub struct LogConsole {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    filter: Option<String>,
}

impl LogConsole {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(64)),
            capacity: capacity.max(1),
            filter: None,
        }
    }

    /// Append an entry, evicting the oldest once at capacity.
    pub fn push(&mut self, entry: LogEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Drop all entries and leave a marker so the user can tell the
    /// console was cleared rather than empty.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.entries.push_back(LogEntry {
            message: "Log cleared".to_string(),
            level: LogLevel::Info,
            timestamp: Local::now().format("%H:%M:%S").to_string(),
            platform: None,
        });
    }

    /// Restrict the view to one platform (`None` shows everything).
    pub fn set_filter(&mut self, platform: Option<String>) {
        self.filter = platform;
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// Entries passing the current filter, oldest first.
    pub fn visible(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(move |entry| {
            match (&self.filter, &entry.platform) {
                (None, _) => true,
                (Some(_), None) => true,
                (Some(filter), Some(platform)) => filter == platform,
            }
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(message: &str, platform: Option<&str>) -> LogEntry {
        LogEntry {
            message: message.to_string(),
            level: LogLevel::Info,
            timestamp: String::new(),
            platform: platform.map(String::from),
        }
    }

    #[test]
    fn capacity_evicts_oldest() {
        let mut console = LogConsole::new(3);
        for i in 0..5 {
            console.push(entry(&format!("line {i}"), None));
        }
        assert_eq!(console.len(), 3);
        let first = console.visible().next().unwrap();
        assert_eq!(first.message, "line 2");
    }

    #[test]
    fn platform_filter_keeps_untagged_entries() {
        let mut console = LogConsole::new(10);
        console.push(entry("generic", None));
        console.push(entry("redbus line", Some("redbus")));
        console.push(entry("traveloka line", Some("traveloka")));

        console.set_filter(Some("redbus".to_string()));
        let messages: Vec<&str> =
            console.visible().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["generic", "redbus line"]);

        console.set_filter(None);
        assert_eq!(console.visible().count(), 3);
    }

    #[test]
    fn clear_leaves_marker() {
        let mut console = LogConsole::new(10);
        console.push(entry("a", None));
        console.push(entry("b", None));
        console.clear();

        assert_eq!(console.len(), 1);
        assert_eq!(console.visible().next().unwrap().message, "Log cleared");
    }
}
