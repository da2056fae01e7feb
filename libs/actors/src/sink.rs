//! Log Sinks
//!
//! Behaviors and the failure path write human-readable lines through an
//! injected [`LogSink`] instead of a process-wide logger, so an actor system
//! can be observed in isolation.

use crate::registry::ActorId;
use parking_lot::Mutex;
use std::sync::Arc;

/// Severity of a sink entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Error,
}

/// One line written to a sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub actor: ActorId,
    pub level: LogLevel,
    pub line: String,
}

/// Destination for actor log lines
pub trait LogSink: Send + Sync {
    fn write(&self, entry: LogEntry);
}

/// Forwards entries to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn write(&self, entry: LogEntry) {
        match entry.level {
            LogLevel::Info => tracing::info!(actor_id = %entry.actor, "{}", entry.line),
            LogLevel::Error => tracing::error!(actor_id = %entry.actor, "{}", entry.line),
        }
    }
}

/// Collects entries in memory; clones share the same buffer
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    /// Just the text of every entry, in write order
    pub fn lines(&self) -> Vec<String> {
        self.entries.lock().iter().map(|e| e.line.clone()).collect()
    }

    pub fn contains(&self, line: &str) -> bool {
        self.entries.lock().iter().any(|e| e.line == line)
    }

    pub fn errors(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .iter()
            .filter(|e| e.level == LogLevel::Error)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl LogSink for MemorySink {
    fn write(&self, entry: LogEntry) {
        self.entries.lock().push(entry);
    }
}
