//! Line sinks for human-readable acquisition progress.
//!
//! The coordinator and runner never print directly; they hand each line to an
//! [`OutputSink`] supplied by the caller, so embedders decide where tool
//! output ends up.

use std::sync::Mutex;

use crate::ui;

/// Receives progress, error and forwarded tool output lines.
pub trait OutputSink: Send + Sync {
    fn write_line(&self, line: &str);
}

/// Writes lines to the terminal through [`ui`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl OutputSink for ConsoleSink {
    fn write_line(&self, line: &str) {
        ui::detail(line);
    }
}

/// Collects lines in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every line written so far.
    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }
}

impl OutputSink for MemorySink {
    fn write_line(&self, line: &str) {
        let mut lines = match self.lines.lock() {
            Ok(lines) => lines,
            Err(poisoned) => poisoned.into_inner(),
        };
        lines.push(line.to_string());
    }
}

/// Write to an optional sink.
pub(crate) fn emit(sink: Option<&dyn OutputSink>, line: impl AsRef<str>) {
    if let Some(sink) = sink {
        sink.write_line(line.as_ref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_keeps_order() {
        let sink = MemorySink::new();
        sink.write_line("first");
        sink.write_line("second");
        assert_eq!(sink.lines(), vec!["first", "second"]);
        assert!(sink.contains("sec"));
    }

    #[test]
    fn emit_without_sink_is_noop() {
        emit(None, "ignored");
        let sink = MemorySink::new();
        emit(Some(&sink), "kept");
        assert_eq!(sink.lines(), vec!["kept"]);
    }
}
