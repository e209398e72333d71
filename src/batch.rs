//! Per-item execution with cancellation
//!
//! Blame and mining passes walk many files one after the other. A failing
//! file is logged and skipped; an external cancellation request stops the
//! pass between two files and hands the partial result back to the caller.

use crate::log::FilteredLog;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Shared flag used to request that a running pass stops early.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Takes effect before the next item is started.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// A pass was cancelled; carries whatever was collected before the stop.
pub struct Interrupted<T> {
    partial: T,
    completed: usize,
    total: usize,
}

impl<T> Interrupted<T> {
    pub fn new(partial: T, completed: usize, total: usize) -> Self {
        Self {
            partial,
            completed,
            total,
        }
    }

    /// Number of items finished before the interruption.
    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn partial(&self) -> &T {
        &self.partial
    }

    pub fn into_partial(self) -> T {
        self.partial
    }

    /// Transform the partial result, keeping the progress counters.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Interrupted<U> {
        Interrupted {
            partial: f(self.partial),
            completed: self.completed,
            total: self.total,
        }
    }
}

impl<T> fmt::Debug for Interrupted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interrupted")
            .field("completed", &self.completed)
            .field("total", &self.total)
            .finish_non_exhaustive()
    }
}

impl<T> fmt::Display for Interrupted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "interrupted after {} of {} files",
            self.completed, self.total
        )
    }
}

impl<T> std::error::Error for Interrupted<T> {}

/// Outcome of a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    Completed,
    Interrupted { completed: usize },
}

/// Runs an operation for each item, logging failures and honouring cancellation.
pub struct BatchRunner<'a> {
    token: &'a CancellationToken,
    label: &'a str,
}

impl<'a> BatchRunner<'a> {
    /// `label` names the pass in the cancellation notice, e.g. "Git blame".
    pub fn new(token: &'a CancellationToken, label: &'a str) -> Self {
        Self { token, label }
    }

    /// Run `operation` for every item in order.
    ///
    /// An `Err` from `operation` is written to the log with `describe(item)` as
    /// context, and the batch moves on. The log summary is flushed after each
    /// item. Cancellation is checked before every item.
    pub fn run<I, E>(
        &self,
        items: impl IntoIterator<Item = I>,
        log: &mut FilteredLog,
        describe: impl Fn(&I) -> String,
        mut operation: impl FnMut(&I, &mut FilteredLog) -> Result<(), E>,
    ) -> BatchOutcome
    where
        E: std::error::Error,
    {
        let mut completed = 0;
        for item in items {
            if self.token.is_cancelled() {
                log.log_info(format!(
                    "{} has been interrupted after {} files",
                    self.label, completed
                ));
                log.log_summary();
                return BatchOutcome::Interrupted { completed };
            }

            if let Err(e) = operation(&item, log) {
                log.log_exception(&e, describe(&item));
            }
            log.log_summary();

            completed += 1;
            if completed % 100 == 0 {
                debug!("{}: processed {} files", self.label, completed);
            }
        }
        BatchOutcome::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_failures_do_not_abort_batch() {
        let token = CancellationToken::new();
        let runner = BatchRunner::new(&token, "Test");
        let mut log = FilteredLog::new("Errors:");
        let mut seen = Vec::new();

        let outcome = runner.run(
            vec![1, 2, 3],
            &mut log,
            |i| format!("item {}", i),
            |i, _| {
                seen.push(*i);
                if *i == 2 {
                    Err(io::Error::other("boom"))
                } else {
                    Ok(())
                }
            },
        );

        assert_eq!(outcome, BatchOutcome::Completed);
        assert_eq!(seen, vec![1, 2, 3]);
        assert_eq!(log.error_messages(), vec!["item 2: boom".to_string()]);
    }

    #[test]
    fn test_cancellation_stops_before_next_item() {
        let token = CancellationToken::new();
        let runner = BatchRunner::new(&token, "Test");
        let mut log = FilteredLog::new("Errors:");
        let mut seen = Vec::new();

        let outcome = runner.run(
            vec![1, 2, 3],
            &mut log,
            |i| format!("item {}", i),
            |i, _| -> Result<(), io::Error> {
                seen.push(*i);
                if *i == 2 {
                    token.cancel();
                }
                Ok(())
            },
        );

        assert_eq!(outcome, BatchOutcome::Interrupted { completed: 2 });
        assert_eq!(seen, vec![1, 2]);
        assert!(log
            .info_messages()
            .iter()
            .any(|m| m.contains("interrupted after 2 files")));
    }

    #[test]
    fn test_interrupted_carries_partial() {
        let interrupted = Interrupted::new(vec!["a"], 1, 3);
        assert_eq!(interrupted.to_string(), "interrupted after 1 of 3 files");
        let mapped = interrupted.map(|v| v.len());
        assert_eq!(mapped.completed(), 1);
        assert_eq!(mapped.into_partial(), 1);
    }
}
