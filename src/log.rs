//! Run log accumulated over a single conversion.
//!
//! Every recoverable anomaly (unknown style, unprocessed tag, broken
//! bookmark) is recorded here instead of aborting the run. The log is part
//! of the conversion result so callers can inspect or print it.

use std::fmt;

/// How serious a logged event is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Diagnostic detail, usually uninteresting.
    Debug,
    /// Input was odd but the output is still faithful.
    Info,
    /// Something was dropped or guessed at.
    Warning,
    /// Output is likely wrong in a visible way (e.g. a broken link).
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Debug => write!(f, "debug"),
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// One logged event.
#[derive(Debug, Clone)]
pub struct Entry {
    pub severity: Severity,
    pub message: String,
}

/// Accumulating, severity-tagged log for one conversion run.
#[derive(Debug, Default)]
pub struct RunLog {
    entries: Vec<Entry>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, severity: Severity, message: impl Into<String>) {
        self.entries.push(Entry {
            severity,
            message: message.into(),
        });
    }

    pub fn debug(&mut self, message: impl Into<String>) {
        self.push(Severity::Debug, message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Severity::Info, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Severity::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Severity::Error, message);
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest severity recorded so far, if anything was logged.
    pub fn max_severity(&self) -> Option<Severity> {
        self.entries.iter().map(|e| e.severity).max()
    }

    /// Entries at `min` severity or above, for printing.
    pub fn render(&self, min: Severity) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            if entry.severity >= min {
                out.push_str(&format!("{}: {}\n", entry.severity, entry.message));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severities_order() {
        assert!(Severity::Debug < Severity::Info);
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn render_filters_below_minimum() {
        let mut log = RunLog::new();
        log.debug("noise");
        log.warning("style 'X' already defined");
        let text = log.render(Severity::Warning);
        assert!(text.contains("already defined"));
        assert!(!text.contains("noise"));
        assert_eq!(log.max_severity(), Some(Severity::Warning));
    }
}
