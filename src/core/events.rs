//! Task event stream
//!
//! Workers report everything through one typed channel: progress units,
//! byte counts, status notes, structured errors, and a terminal marker per
//! task. A single aggregator thread consumes the stream.

use crossbeam::channel::Sender;
use std::path::PathBuf;

/// Structured error carried through the event stream
#[derive(Debug, Clone)]
pub struct TaskError {
    /// Path the task was working on
    pub path: PathBuf,
    /// Underlying error rendered for diagnostics
    pub detail: String,
    /// Operation that failed, e.g. "copy" or "create destination directory"
    pub context: String,
    /// Short message suitable for end users
    pub user_message: String,
    /// Fatal errors abandon the subtree and fail the whole run
    pub fatal: bool,
}

impl TaskError {
    /// Create a recoverable per-entry error
    pub fn new(
        path: impl Into<PathBuf>,
        context: impl Into<String>,
        detail: impl std::fmt::Display,
    ) -> Self {
        let path = path.into();
        let context = context.into();
        let user_message = format!("Backup could not {} '{}'", context, path.display());
        Self {
            path,
            detail: detail.to_string(),
            context,
            user_message,
            fatal: false,
        }
    }

    /// Mark this error as fatal to the run
    pub fn into_fatal(mut self) -> Self {
        self.fatal = true;
        self
    }
}

/// One message from a backup task
#[derive(Debug, Clone)]
pub enum TaskEvent {
    /// Entries accounted for (copied, skipped, or failed-but-counted)
    Progress(u64),
    /// Bytes actually written to the destination
    Bytes(u64),
    /// Human-readable status note
    Status(String),
    /// Structured error; does not imply the task stopped
    Error(TaskError),
    /// Terminal marker, emitted exactly once per task
    Finished,
}

/// Cloneable emitting side of the event stream
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: Sender<TaskEvent>,
}

impl EventSender {
    /// Wrap a channel sender
    pub fn new(tx: Sender<TaskEvent>) -> Self {
        Self { tx }
    }

    /// Report accounted-for entries
    pub fn progress(&self, units: u64) {
        self.send(TaskEvent::Progress(units));
    }

    /// Report bytes written
    pub fn bytes(&self, bytes: u64) {
        self.send(TaskEvent::Bytes(bytes));
    }

    /// Report a status note
    pub fn status(&self, message: impl Into<String>) {
        self.send(TaskEvent::Status(message.into()));
    }

    /// Report a structured error
    pub fn error(&self, error: TaskError) {
        self.send(TaskEvent::Error(error));
    }

    /// Report task completion
    pub fn finished(&self) {
        self.send(TaskEvent::Finished);
    }

    fn send(&self, event: TaskEvent) {
        // A closed channel means the run is already tearing down
        let _ = self.tx.send(event);
    }
}
