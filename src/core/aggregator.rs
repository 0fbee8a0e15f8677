//! Event aggregation and run accounting
//!
//! A single consumer drains the task event stream, maintains the run totals,
//! and decides when the run is over. Two independent signals end the loop:
//! the accounting rule (`processed == total_expected`) marks a complete run,
//! and quiescence (every submitted task has finished) guarantees the loop
//! terminates even when failed copies leave the progress count short.

use crate::config::ErrorPolicy;
use crate::core::cancel::CancelToken;
use crate::core::events::{TaskError, TaskEvent};
use crate::progress::ProgressReporter;
use crossbeam::channel::{Receiver, RecvTimeoutError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// How a backup run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every expected entry was accounted for
    Completed,
    /// The caller cancelled the run before it could complete
    Cancelled,
    /// One or more errors occurred, or the accounting fell short
    Failed,
}

/// Final totals for a backup run
#[derive(Debug)]
pub struct RunSummary {
    /// How the run ended
    pub outcome: RunOutcome,
    /// Progress units expected, fixed before the run
    pub total_expected: u64,
    /// Progress units accounted for
    pub processed: u64,
    /// Bytes written to the destination
    pub bytes_copied: u64,
    /// Errors reported by tasks, in arrival order
    pub errors: Vec<TaskError>,
    /// Wall-clock duration of the run
    pub duration: Duration,
}

impl RunSummary {
    /// True when the run completed without errors or cancellation
    pub fn is_complete(&self) -> bool {
        self.outcome == RunOutcome::Completed
    }

    /// Print summary to console
    pub fn print_summary(&self) {
        println!("\n=== Backup Summary ===");
        println!("Outcome:     {:?}", self.outcome);
        println!(
            "Entries:     {}/{}",
            self.processed, self.total_expected
        );
        println!(
            "Bytes:       {}",
            humansize::format_size(self.bytes_copied, humansize::BINARY)
        );
        println!("Duration:    {:.2?}", self.duration);

        if !self.errors.is_empty() {
            println!("\nErrors: {}", self.errors.len());
            for err in &self.errors {
                println!("  {} - {}", err.path.display(), err.detail);
            }
        }
    }
}

/// Single-threaded consumer of the task event stream
pub struct Aggregator<'a> {
    events: Receiver<TaskEvent>,
    submitted: Arc<AtomicU64>,
    total_expected: u64,
    policy: ErrorPolicy,
    cancel: CancelToken,
    progress: Option<&'a ProgressReporter>,
}

impl<'a> Aggregator<'a> {
    /// Create an aggregator for one run
    pub fn new(
        events: Receiver<TaskEvent>,
        submitted: Arc<AtomicU64>,
        total_expected: u64,
        policy: ErrorPolicy,
        cancel: CancelToken,
        progress: Option<&'a ProgressReporter>,
    ) -> Self {
        Self {
            events,
            submitted,
            total_expected,
            policy,
            cancel,
            progress,
        }
    }

    /// Drain events until the run is over and return the totals
    pub fn run(self) -> RunSummary {
        let start = Instant::now();
        let mut processed = 0u64;
        let mut bytes_copied = 0u64;
        let mut finished = 0u64;
        let mut errors: Vec<TaskError> = Vec::new();
        let mut fatal = false;

        loop {
            match self.events.recv_timeout(Duration::from_millis(100)) {
                Ok(TaskEvent::Progress(units)) => {
                    processed += units;
                    if let Some(progress) = self.progress {
                        progress.add_files(units);
                    }
                }
                Ok(TaskEvent::Bytes(bytes)) => {
                    bytes_copied += bytes;
                    if let Some(progress) = self.progress {
                        progress.add_bytes(bytes);
                    }
                }
                Ok(TaskEvent::Status(message)) => {
                    debug!("{message}");
                    if let Some(progress) = self.progress {
                        progress.set_status(&message);
                    }
                }
                Ok(TaskEvent::Error(err)) => {
                    error!(
                        path = %err.path.display(),
                        context = %err.context,
                        fatal = err.fatal,
                        "{}", err.detail
                    );
                    if err.fatal || self.policy == ErrorPolicy::StopOnFirstError {
                        self.cancel.cancel();
                    }
                    fatal |= err.fatal;
                    errors.push(err);
                }
                Ok(TaskEvent::Finished) => {
                    finished += 1;
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            // Children are submitted before their parent finishes, so equal
            // counts mean no task is queued or running
            if finished == self.submitted.load(Ordering::SeqCst) {
                break;
            }
        }

        let outcome = if fatal || !errors.is_empty() {
            RunOutcome::Failed
        } else if self.cancel.is_cancelled() {
            RunOutcome::Cancelled
        } else if processed >= self.total_expected {
            RunOutcome::Completed
        } else {
            RunOutcome::Failed
        };

        RunSummary {
            outcome,
            total_expected: self.total_expected,
            processed,
            bytes_copied,
            errors,
            duration: start.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::events::EventSender;
    use crossbeam::channel::unbounded;

    fn submitted(n: u64) -> Arc<AtomicU64> {
        Arc::new(AtomicU64::new(n))
    }

    #[test]
    fn test_completed_run() {
        let (tx, rx) = unbounded();
        let sender = EventSender::new(tx);

        sender.progress(1);
        sender.bytes(100);
        sender.finished();
        sender.progress(2);
        sender.bytes(50);
        sender.finished();

        let summary = Aggregator::new(
            rx,
            submitted(2),
            3,
            ErrorPolicy::StopOnFirstError,
            CancelToken::new(),
            None,
        )
        .run();

        assert_eq!(summary.outcome, RunOutcome::Completed);
        assert_eq!(summary.processed, 3);
        assert_eq!(summary.bytes_copied, 150);
        assert!(summary.errors.is_empty());
    }

    #[test]
    fn test_stop_on_first_error_cancels_run() {
        let (tx, rx) = unbounded();
        let sender = EventSender::new(tx);
        let cancel = CancelToken::new();

        sender.error(TaskError::new("/a", "copy", "boom"));
        sender.finished();

        let summary = Aggregator::new(
            rx,
            submitted(1),
            5,
            ErrorPolicy::StopOnFirstError,
            cancel.clone(),
            None,
        )
        .run();

        assert_eq!(summary.outcome, RunOutcome::Failed);
        assert!(cancel.is_cancelled());
        assert_eq!(summary.errors.len(), 1);
    }

    #[test]
    fn test_continue_policy_keeps_running() {
        let (tx, rx) = unbounded();
        let sender = EventSender::new(tx);
        let cancel = CancelToken::new();

        sender.error(TaskError::new("/a", "copy", "boom"));
        sender.progress(1);
        sender.finished();

        let summary = Aggregator::new(
            rx,
            submitted(1),
            2,
            ErrorPolicy::ContinueOnError,
            cancel.clone(),
            None,
        )
        .run();

        // recorded but not cancelled; the shortfall still fails the run
        assert!(!cancel.is_cancelled());
        assert_eq!(summary.outcome, RunOutcome::Failed);
        assert_eq!(summary.processed, 1);
    }

    #[test]
    fn test_fatal_error_cancels_under_continue_policy() {
        let (tx, rx) = unbounded();
        let sender = EventSender::new(tx);
        let cancel = CancelToken::new();

        sender.error(TaskError::new("/root", "map to the backup root", "denied").into_fatal());
        sender.finished();

        let summary = Aggregator::new(
            rx,
            submitted(1),
            3,
            ErrorPolicy::ContinueOnError,
            cancel.clone(),
            None,
        )
        .run();

        assert_eq!(summary.outcome, RunOutcome::Failed);
        assert!(cancel.is_cancelled());
    }

    #[test]
    fn test_cancelled_run() {
        let (tx, rx) = unbounded();
        let sender = EventSender::new(tx);
        let cancel = CancelToken::new();
        cancel.cancel();

        sender.status("Backup cancelled");
        sender.finished();

        let summary = Aggregator::new(
            rx,
            submitted(1),
            4,
            ErrorPolicy::StopOnFirstError,
            cancel,
            None,
        )
        .run();

        assert_eq!(summary.outcome, RunOutcome::Cancelled);
        assert_eq!(summary.processed, 0);
    }

    #[test]
    fn test_empty_selection_completes() {
        let (_tx, rx) = unbounded::<TaskEvent>();

        let summary = Aggregator::new(
            rx,
            submitted(0),
            0,
            ErrorPolicy::StopOnFirstError,
            CancelToken::new(),
            None,
        )
        .run();

        assert_eq!(summary.outcome, RunOutcome::Completed);
    }
}
