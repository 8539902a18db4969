//! Operator-facing output.
//!
//! Components never print directly. They receive a [`SharedSink`] at
//! construction and report status lines, failures and command feedback
//! through it. Diagnostics that only matter to developers go to `log`.

use std::sync::{Arc, Mutex};

/// Destination for text shown on the control surface.
pub trait OutputSink: Send + Sync {
    fn emit(&self, message: &str);
}

/// Sink shared between the components of one process.
pub type SharedSink = Arc<dyn OutputSink>;

/// Forwards every message to `log::info!` under the `grandmaster` target.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl OutputSink for LogSink {
    fn emit(&self, message: &str) {
        log::info!(target: "grandmaster", "{message}");
    }
}

/// Prints every message on its own line to stdout.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn emit(&self, message: &str) {
        println!("{message}");
    }
}

/// Records messages in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    /// True if any emitted line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }
}

impl OutputSink for MemorySink {
    fn emit(&self, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(message.to_owned());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_records_in_order() {
        let sink = MemorySink::new();
        sink.emit("first");
        sink.emit("second");
        assert_eq!(sink.lines(), vec!["first".to_string(), "second".to_string()]);
        assert!(sink.contains("sec"));
        assert!(!sink.contains("third"));
    }

    #[test]
    fn shared_sink_is_object_safe() {
        let memory = Arc::new(MemorySink::new());
        let shared: SharedSink = memory.clone();
        shared.emit("via trait object");
        assert!(memory.contains("trait object"));
    }
}
