//! Backup engine
//!
//! Caller-side orchestration of a run: fix the expected totals, start the
//! worker pool, submit one root task per selection entry, and drive the
//! aggregation loop until the run is over.

use crate::config::BackupConfig;
use crate::core::aggregator::{Aggregator, RunSummary};
use crate::core::cancel::CancelToken;
use crate::core::events::EventSender;
use crate::core::pool::TaskPool;
use crate::core::task::{BackupTask, TaskContext};
use crate::error::{BackupError, Result};
use crate::fs::{count_total_files, ensure_dir, ExclusionSet};
use crate::progress::ProgressReporter;
use crate::report::BackupLogRecord;
use crossbeam::channel::unbounded;
use tracing::{debug, info};

/// Orchestrates one backup run
pub struct BackupEngine {
    config: BackupConfig,
    progress: Option<ProgressReporter>,
    cancel: CancelToken,
}

impl BackupEngine {
    /// Create an engine for the given configuration
    pub fn new(config: BackupConfig) -> Self {
        Self {
            config,
            progress: None,
            cancel: CancelToken::new(),
        }
    }

    /// Attach a progress reporter
    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Get the cancellation token for external control
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Request cancellation of the run
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Run the backup and return the final totals
    pub fn execute(&self) -> Result<RunSummary> {
        ensure_dir(&self.config.destination)?;
        if !self.config.destination.is_dir() {
            return Err(BackupError::DestinationUnavailable(
                self.config.destination.clone(),
            ));
        }

        let exclusions = ExclusionSet::new(
            self.config.excluded_paths.iter().cloned(),
            self.config.excluded_extensions.iter().cloned(),
        );

        if let Some(progress) = &self.progress {
            progress.set_status("Counting files...");
        }
        let total_expected = count_total_files(&self.config.sources, &exclusions);
        debug!(total_expected, "selection counted");

        if let Some(progress) = &self.progress {
            progress.set_total_files(total_expected);
            progress.set_status("Backing up...");
        }

        let pool = TaskPool::new(self.config.threads);
        let (event_tx, event_rx) = unbounded();
        let ctx = TaskContext::new(
            exclusions,
            self.cancel.clone(),
            EventSender::new(event_tx),
            pool.spawner(),
        );

        for source in &self.config.sources {
            pool.spawner().submit(BackupTask::root(
                source.clone(),
                self.config.destination.clone(),
                ctx.clone(),
            ));
        }

        let summary = Aggregator::new(
            event_rx,
            pool.spawner().submitted_counter(),
            total_expected,
            self.config.policy,
            self.cancel.clone(),
            self.progress.as_ref(),
        )
        .run();

        pool.shutdown();

        if let Some(progress) = &self.progress {
            if summary.is_complete() {
                progress.finish_success("Backup complete");
            } else {
                progress.finish_error("Backup did not complete");
            }
        }

        if summary.is_complete() && self.config.write_log {
            let record = BackupLogRecord::new(
                summary.processed,
                summary.bytes_copied,
                self.config.sources.clone(),
                self.config.excluded_paths.clone(),
            );
            let log_path = record.write(&self.config.destination)?;
            info!(path = %log_path.display(), "backup log written");
        }

        info!(
            outcome = ?summary.outcome,
            processed = summary.processed,
            total = summary.total_expected,
            bytes = summary.bytes_copied,
            "backup run finished"
        );

        Ok(summary)
    }
}
