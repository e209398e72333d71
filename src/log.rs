//! Size-bounded diagnostic log
//!
//! Every blame or mining pass returns a [`FilteredLog`] next to its result.
//! Info lines are always kept. Error lines are kept up to a bound; beyond it
//! they are only counted, and a summary line reports how many were dropped.
//! Each recorded line is also forwarded to `tracing` so partial progress is
//! visible even when a pass is cut short.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tracing::{info, warn};

/// Default number of error lines kept per log
pub const DEFAULT_MAX_LINES: usize = 5;

/// Diagnostic log with a bounded number of stored error messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilteredLog {
    title: String,
    max_lines: usize,
    info_messages: Vec<String>,
    errors: Vec<String>,
    /// Total number of errors reported, stored or not
    error_count: usize,
    /// Skipped count last reported through `log_summary`
    #[serde(skip)]
    flushed_skips: usize,
}

impl Default for FilteredLog {
    fn default() -> Self {
        Self::new("Errors while running git-forensics:")
    }
}

impl FilteredLog {
    /// Create a log that keeps at most [`DEFAULT_MAX_LINES`] error lines.
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_max_lines(title, DEFAULT_MAX_LINES)
    }

    /// Create a log that keeps at most `max_lines` error lines.
    pub fn with_max_lines(title: impl Into<String>, max_lines: usize) -> Self {
        Self {
            title: title.into(),
            max_lines,
            info_messages: Vec::new(),
            errors: Vec::new(),
            error_count: 0,
            flushed_skips: 0,
        }
    }

    /// Heading shown above the error lines.
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn max_lines(&self) -> usize {
        self.max_lines
    }

    /// Record an informational message.
    pub fn log_info(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!("{}", message);
        self.info_messages.push(message);
    }

    /// Record an error message.
    pub fn log_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{}", message);
        self.error_count += 1;
        if self.errors.len() < self.max_lines {
            self.errors.push(message);
        }
    }

    /// Record an error message together with the failure that caused it.
    ///
    /// The error's source chain is appended so the root cause stays visible.
    pub fn log_exception(&mut self, error: &dyn std::error::Error, message: impl Display) {
        let mut line = format!("{}: {}", message, error);
        let mut source = error.source();
        while let Some(cause) = source {
            line.push_str(&format!("\n  caused by: {}", cause));
            source = cause.source();
        }
        self.log_error(line);
    }

    /// Report the number of suppressed errors, if it changed since the last call.
    pub fn log_summary(&mut self) {
        let skipped = self.skipped();
        if skipped > self.flushed_skips {
            warn!("{}", summary_line(skipped));
            self.flushed_skips = skipped;
        }
    }

    /// Number of error lines that were counted but not stored.
    pub fn skipped(&self) -> usize {
        self.error_count.saturating_sub(self.errors.len())
    }

    /// Total number of errors reported.
    pub fn size(&self) -> usize {
        self.error_count
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn info_messages(&self) -> &[String] {
        &self.info_messages
    }

    /// Stored error lines, followed by a summary line when errors were skipped.
    pub fn error_messages(&self) -> Vec<String> {
        let mut messages = self.errors.clone();
        let skipped = self.skipped();
        if skipped > 0 {
            messages.push(summary_line(skipped));
        }
        messages
    }

    /// Append the contents of another log.
    ///
    /// Stored lines of `other` are re-filtered against this log's bound, and
    /// its skipped lines still count towards [`size`](Self::size).
    pub fn merge(&mut self, other: FilteredLog) {
        self.info_messages.extend(other.info_messages);
        let other_skipped = other.error_count - other.errors.len();
        for error in other.errors {
            self.error_count += 1;
            if self.errors.len() < self.max_lines {
                self.errors.push(error);
            }
        }
        self.error_count += other_skipped;
    }
}

fn summary_line(skipped: usize) -> String {
    format!("  ... skipped logging of {} additional errors ...", skipped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_errors_up_to_bound() {
        let mut log = FilteredLog::with_max_lines("Errors:", 5);
        for i in 1..=7 {
            log.log_error(format!("error {}", i));
        }
        log.log_summary();

        let messages = log.error_messages();
        assert_eq!(messages.len(), 6);
        assert_eq!(messages[0], "error 1");
        assert_eq!(messages[4], "error 5");
        assert!(messages[5].contains("skipped logging of 2 additional errors"));
        assert_eq!(log.size(), 7);
        assert_eq!(log.skipped(), 2);
    }

    #[test]
    fn test_no_summary_below_bound() {
        let mut log = FilteredLog::new("Errors:");
        log.log_error("only one");
        assert_eq!(log.error_messages(), vec!["only one".to_string()]);
        assert_eq!(log.size(), 1);
        assert_eq!(log.skipped(), 0);
    }

    #[test]
    fn test_info_messages_are_unbounded() {
        let mut log = FilteredLog::with_max_lines("Errors:", 1);
        for i in 0..10 {
            log.log_info(format!("info {}", i));
        }
        assert_eq!(log.info_messages().len(), 10);
        assert!(!log.has_errors());
    }

    #[test]
    fn test_log_exception_includes_cause() {
        let mut log = FilteredLog::new("Errors:");
        let error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        log.log_exception(&error, "Reading 'a.txt' failed");
        assert_eq!(log.error_messages(), vec!["Reading 'a.txt' failed: gone".to_string()]);
    }

    #[test]
    fn test_merge_keeps_counts() {
        let mut first = FilteredLog::with_max_lines("Errors:", 3);
        first.log_error("a");
        first.log_info("first");

        let mut second = FilteredLog::with_max_lines("Errors:", 1);
        second.log_error("b");
        second.log_error("c");
        second.log_info("second");

        first.merge(second);
        assert_eq!(first.size(), 3);
        assert_eq!(first.info_messages(), ["first", "second"]);
        assert_eq!(first.skipped(), 1);
        let messages = first.error_messages();
        assert_eq!(&messages[..2], ["a", "b"]);
        assert!(messages[2].contains("skipped logging of 1 additional errors"));
    }
}
