//! # ezbackup - Concurrent Incremental Backup
//!
//! ezbackup mirrors a user-chosen set of files and directories into a backup
//! location. Unchanged files are skipped, excluded paths and file types are
//! pruned, and directory trees fan out across a worker pool so independent
//! subtrees are copied in parallel.
//!
//! ## Features
//!
//! - **Dynamic Fan-Out**: every subdirectory becomes its own worker task
//! - **Incremental Copies**: files are overwritten only when the source is
//!   strictly newer than the existing copy
//! - **Exclusion Rules**: exact paths (pruning whole subtrees) and file name
//!   suffixes
//! - **Typed Event Stream**: progress, bytes, status, and structured errors
//!   aggregated by a single consumer
//! - **Cooperative Cancellation**: one shared token, checked between
//!   entries, never mid-copy
//! - **Backup Log**: JSON record of each completed run at the destination
//!
//! ## Quick Start
//!
//! ```no_run
//! use ezbackup::config::{BackupConfig, ErrorPolicy};
//! use ezbackup::core::BackupEngine;
//! use std::path::PathBuf;
//!
//! let config = BackupConfig {
//!     sources: vec![PathBuf::from("/home/user/docs")],
//!     destination: PathBuf::from("/mnt/backup"),
//!     excluded_paths: vec![],
//!     excluded_extensions: vec![".tmp".to_string()],
//!     threads: 0,
//!     policy: ErrorPolicy::StopOnFirstError,
//!     write_log: true,
//! };
//!
//! let engine = BackupEngine::new(config);
//! let summary = engine.execute().unwrap();
//! summary.print_summary();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod error;
pub mod fs;
pub mod progress;
pub mod report;

// Re-export commonly used types
pub use crate::config::{BackupConfig, BackupSettings, ErrorPolicy};
pub use crate::core::{BackupEngine, RunOutcome, RunSummary};
pub use crate::error::{BackupError, Result};
pub use crate::progress::ProgressReporter;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    //! Convenient re-exports for common usage
    //!
    //! ```no_run
    //! use ezbackup::prelude::*;
    //! ```

    pub use crate::config::{BackupConfig, BackupSettings, CliArgs, ErrorPolicy};
    pub use crate::core::{BackupEngine, CancelToken, RunOutcome, RunSummary, TaskEvent};
    pub use crate::error::{BackupError, Result};
    pub use crate::fs::{count_total_files, ExclusionSet, SelectionEntry, SelectionKind};
    pub use crate::progress::ProgressReporter;
    pub use crate::report::BackupLogRecord;
}
