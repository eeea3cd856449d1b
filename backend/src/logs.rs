//! Progress logging with fan-out to subscribers.
//!
//! Every entry is printed to stderr and broadcast to all current
//! subscribers. [`LogCapture`] is the subscriber the analysis pipeline uses
//! to hand its progress log back with the results.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A single log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Log level
    pub level: LogLevel,
    /// Log message
    pub message: String,
    /// Optional indentation level (for nested logs)
    #[serde(default)]
    pub indent: u8,
}

impl LogEntry {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Info, message: message.into(), indent: 0 }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Success, message: message.into(), indent: 0 }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Warning, message: message.into(), indent: 0 }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Error, message: message.into(), indent: 0 }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }
}

/// Global log broadcaster
pub static LOG_BROADCASTER: Lazy<LogBroadcaster> = Lazy::new(LogBroadcaster::new);

/// Broadcasts log entries to all subscribers
pub struct LogBroadcaster {
    sender: broadcast::Sender<LogEntry>,
}

impl LogBroadcaster {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }

    /// Send a log entry to all subscribers
    pub fn log(&self, entry: LogEntry) {
        let prefix = match entry.level {
            LogLevel::Info => "   ",
            LogLevel::Success => "   ✓",
            LogLevel::Warning => "   ⚠️",
            LogLevel::Error => "   ❌",
        };
        let indent = "   ".repeat(entry.indent as usize);
        eprintln!("{}{} {}", indent, prefix, entry.message);

        // No receivers is fine
        let _ = self.sender.send(entry);
    }

    /// Get a receiver for the entries logged from now on
    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.sender.subscribe()
    }
}

impl Default for LogBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Collects the entries broadcast between [`LogCapture::start`] and
/// [`LogCapture::finish`].
///
/// The broadcaster is process-wide, so entries logged concurrently by other
/// threads are collected too.
pub struct LogCapture {
    receiver: broadcast::Receiver<LogEntry>,
    entries: Vec<LogEntry>,
}

impl LogCapture {
    /// Subscribe to the global broadcaster.
    pub fn start() -> Self {
        Self::on(&LOG_BROADCASTER)
    }

    pub fn on(broadcaster: &LogBroadcaster) -> Self {
        Self {
            receiver: broadcaster.subscribe(),
            entries: Vec::new(),
        }
    }

    /// Move pending entries out of the channel. Call this during long runs
    /// so the channel does not overflow; overflowed entries are lost.
    pub fn drain(&mut self) {
        loop {
            match self.receiver.try_recv() {
                Ok(entry) => self.entries.push(entry),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
    }

    pub fn finish(mut self) -> Vec<LogEntry> {
        self.drain();
        self.entries
    }
}

/// Convenient logging functions
pub fn log_info(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::info(msg));
}

pub fn log_success(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::success(msg));
}

pub fn log_warning(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::warning(msg));
}

pub fn log_error(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::error(msg));
}

pub fn log_info_indent(msg: impl Into<String>, indent: u8) {
    LOG_BROADCASTER.log(LogEntry::info(msg).with_indent(indent));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscriber_receives_entries() {
        let broadcaster = LogBroadcaster::new();
        let mut rx = broadcaster.subscribe();

        broadcaster.log(LogEntry::success("Read 3 rows"));
        broadcaster.log(LogEntry::warning("1 row filtered").with_indent(1));

        let first = rx.try_recv().unwrap();
        assert_eq!(first.level, LogLevel::Success);
        assert_eq!(first.message, "Read 3 rows");

        let second = rx.try_recv().unwrap();
        assert_eq!(second.indent, 1);
    }

    #[test]
    fn test_late_subscriber_misses_earlier_entries() {
        let broadcaster = LogBroadcaster::default();
        broadcaster.log(LogEntry::error("nobody listening"));

        let mut rx = broadcaster.subscribe();
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn test_capture_collects_in_order() {
        let broadcaster = LogBroadcaster::new();
        broadcaster.log(LogEntry::info("before"));

        let mut capture = LogCapture::on(&broadcaster);
        broadcaster.log(LogEntry::info("slice"));
        capture.drain();
        broadcaster.log(LogEntry::warning("empty chart"));

        let entries = capture.finish();
        let messages: Vec<&str> = entries.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["slice", "empty chart"]);
        assert_eq!(entries[1].level, LogLevel::Warning);
    }

    #[test]
    fn test_capture_survives_overflow() {
        let broadcaster = LogBroadcaster::new();
        let capture = LogCapture::on(&broadcaster);
        for i in 0..300 {
            broadcaster.log(LogEntry::info(format!("row {}", i)));
        }

        let entries = capture.finish();
        assert_eq!(entries.len(), 256);
        assert_eq!(entries.last().map(|e| e.message.as_str()), Some("row 299"));
    }

    #[test]
    fn test_entry_serialization() {
        let json = serde_json::to_value(LogEntry::info("hello").with_indent(2)).unwrap();
        assert_eq!(json, serde_json::json!({ "level": "info", "message": "hello", "indent": 2 }));
    }
}
