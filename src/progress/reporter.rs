//! Progress reporter implementation
//!
//! Uses indicatif to show the run against the pre-counted file total, the
//! bytes written so far, and the latest status note from the workers.

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Progress reporter for backup runs
pub struct ProgressReporter {
    multi: MultiProgress,
    /// Progress against the pre-counted file total
    files_bar: ProgressBar,
    /// Latest status note from the workers
    status: ProgressBar,
    start_time: Instant,
    total_files: AtomicU64,
    files_done: AtomicU64,
    bytes_copied: AtomicU64,
    enabled: AtomicBool,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        let multi = MultiProgress::new();

        let status = multi.add(ProgressBar::new_spinner());
        status.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("Invalid template"),
        );
        status.enable_steady_tick(Duration::from_millis(120));

        let files_bar = multi.add(ProgressBar::new(0));
        files_bar.set_style(
            ProgressStyle::default_bar()
                .template("{prefix:.bold.dim} [{bar:40.cyan/blue}] {pos}/{len} entries ({percent}%, {msg} written)")
                .expect("Invalid template")
                .progress_chars("=> "),
        );
        files_bar.set_prefix("Backup");
        files_bar.set_message("0 B");

        Self {
            multi,
            files_bar,
            status,
            start_time: Instant::now(),
            total_files: AtomicU64::new(0),
            files_done: AtomicU64::new(0),
            bytes_copied: AtomicU64::new(0),
            enabled: AtomicBool::new(true),
        }
    }

    /// Create a disabled progress reporter (for quiet mode)
    pub fn disabled() -> Self {
        let reporter = Self::new();
        reporter.enabled.store(false, Ordering::SeqCst);
        reporter.multi.set_draw_target(ProgressDrawTarget::hidden());
        reporter
    }

    /// Fix the expected entry total for the run
    pub fn set_total_files(&self, total: u64) {
        self.total_files.store(total, Ordering::Relaxed);
        self.files_bar.set_length(total);
    }

    /// Record accounted-for entries
    pub fn add_files(&self, count: u64) {
        self.files_done.fetch_add(count, Ordering::Relaxed);
        self.files_bar.inc(count);
    }

    /// Record bytes written to the destination
    pub fn add_bytes(&self, bytes: u64) {
        let total = self.bytes_copied.fetch_add(bytes, Ordering::Relaxed) + bytes;
        self.files_bar
            .set_message(humansize::format_size(total, humansize::BINARY));
    }

    /// Set the status note
    pub fn set_status(&self, msg: &str) {
        self.status.set_message(msg.to_string());
    }

    /// Get elapsed time
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Finish with a success message
    pub fn finish_success(&self, message: &str) {
        self.status.finish_with_message(format!("✓ {}", message));
        self.files_bar.finish();
    }

    /// Finish with an error message
    pub fn finish_error(&self, message: &str) {
        self.status.finish_with_message(format!("✗ {}", message));
        self.files_bar.abandon();
    }

    /// Check if progress output is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Snapshot of the current totals
    pub fn summary(&self) -> ProgressSummary {
        ProgressSummary {
            total_files: self.total_files.load(Ordering::Relaxed),
            files_done: self.files_done.load(Ordering::Relaxed),
            bytes_copied: self.bytes_copied.load(Ordering::Relaxed),
            elapsed: self.elapsed(),
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of progress totals
#[derive(Debug, Clone)]
pub struct ProgressSummary {
    /// Expected entry total
    pub total_files: u64,
    /// Entries accounted for
    pub files_done: u64,
    /// Bytes written so far
    pub bytes_copied: u64,
    /// Elapsed time
    pub elapsed: Duration,
}

impl ProgressSummary {
    /// Get completion percentage
    pub fn percentage(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.files_done as f64 / self.total_files as f64) * 100.0
        }
    }
}
