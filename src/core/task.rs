//! Backup task unit
//!
//! One task handles one selection entry or one directory level. It copies
//! the files it finds, prunes excluded entries, and submits a new task for
//! every subdirectory instead of recursing, so sibling subtrees proceed in
//! parallel. Every outcome is reported through the event stream and every
//! task ends with exactly one `Finished` event.

use crate::core::cancel::CancelToken;
use crate::core::events::{EventSender, TaskError};
use crate::core::pool::TaskSpawner;
use crate::fs::{
    copy_file, ensure_dir, is_source_newer, ExclusionSet, SelectionEntry, SelectionKind,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Run-wide state shared by every task
#[derive(Debug, Clone)]
pub struct TaskContext {
    exclusions: Arc<ExclusionSet>,
    cancel: CancelToken,
    events: EventSender,
    spawner: TaskSpawner,
}

impl TaskContext {
    /// Bundle the shared run state for task construction
    pub fn new(
        exclusions: ExclusionSet,
        cancel: CancelToken,
        events: EventSender,
        spawner: TaskSpawner,
    ) -> Self {
        Self {
            exclusions: Arc::new(exclusions),
            cancel,
            events,
            spawner,
        }
    }
}

/// One unit of backup work
#[derive(Debug, Clone)]
pub struct BackupTask {
    source: PathBuf,
    dest: PathBuf,
    is_root: bool,
    ctx: TaskContext,
}

impl BackupTask {
    /// Task for a user-selected entry; directory selections nest their
    /// destination one level under the selection's base name
    pub fn root(source: PathBuf, dest_root: PathBuf, ctx: TaskContext) -> Self {
        Self {
            source,
            dest: dest_root,
            is_root: true,
            ctx,
        }
    }

    /// Task for a subdirectory discovered during the run; `dest` is the
    /// final destination directory for its contents
    fn child(source: PathBuf, dest: PathBuf, ctx: TaskContext) -> Self {
        Self {
            source,
            dest,
            is_root: false,
            ctx,
        }
    }

    /// Execute the task. Always emits the terminal event.
    pub fn run(self) {
        self.execute();
        self.ctx.events.finished();
    }

    fn execute(&self) {
        match SelectionEntry::from_path(&self.source).kind {
            SelectionKind::Directory => self.backup_directory(),
            SelectionKind::File => self.backup_root_file(),
            SelectionKind::Other => {
                let detail = match std::fs::metadata(&self.source) {
                    Ok(_) => "not a regular file or directory".to_string(),
                    Err(e) => e.to_string(),
                };
                self.ctx
                    .events
                    .error(TaskError::new(&self.source, "read", detail));
            }
        }
    }

    fn backup_directory(&self) {
        let events = &self.ctx.events;

        let dest = if self.is_root {
            match self.source.file_name() {
                Some(name) => self.dest.join(name),
                None => {
                    events.error(
                        TaskError::new(
                            &self.source,
                            "map to the backup root",
                            "selection has no base name",
                        )
                        .into_fatal(),
                    );
                    return;
                }
            }
        } else {
            self.dest.clone()
        };

        if let Err(e) = ensure_dir(&dest) {
            warn!(path = %dest.display(), error = %e, "could not create destination directory");
            let mut err = TaskError::new(&dest, "create destination directory", e);
            if self.is_root {
                err = err.into_fatal();
            }
            events.error(err);
            return;
        }

        let entries = match std::fs::read_dir(&self.source) {
            Ok(entries) => entries,
            Err(e) => {
                events.error(TaskError::new(&self.source, "list directory", e));
                return;
            }
        };

        for entry in entries {
            if self.ctx.cancel.is_cancelled() {
                debug!(path = %self.source.display(), "task stopping, backup cancelled");
                events.status("Backup cancelled");
                return;
            }

            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    events.error(TaskError::new(&self.source, "list directory", e));
                    continue;
                }
            };

            let child = entry.path();

            if self.ctx.exclusions.is_excluded_path(&child) {
                events.progress(1);
                events.status(format!("Skipped excluded path '{}'", child.display()));
                continue;
            }

            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(e) => {
                    events.error(TaskError::new(&child, "read", e));
                    continue;
                }
            };

            let child_dest = dest.join(entry.file_name());

            if file_type.is_dir() {
                self.ctx
                    .spawner
                    .submit(BackupTask::child(child, child_dest, self.ctx.clone()));
            } else {
                self.copy_entry(&child, &child_dest);
            }
        }
    }

    fn backup_root_file(&self) {
        if self.ctx.cancel.is_cancelled() {
            self.ctx.events.status("Backup cancelled");
            return;
        }

        let Some(name) = self.source.file_name() else {
            self.ctx.events.error(TaskError::new(
                &self.source,
                "map to the backup root",
                "selection has no base name",
            ));
            return;
        };

        self.copy_entry(&self.source, &self.dest.join(name));
    }

    /// Copy decision for a single file
    fn copy_entry(&self, source: &Path, dest: &Path) {
        let events = &self.ctx.events;

        if self.ctx.exclusions.matches_suffix(source) {
            events.progress(1);
            events.status(format!("Skipped excluded file type '{}'", source.display()));
            return;
        }

        if !dest.exists() {
            match copy_file(source, dest) {
                Ok(bytes) => {
                    trace!(path = %source.display(), bytes, "copied new file");
                    events.progress(1);
                    events.bytes(bytes);
                }
                Err(e) => {
                    // New files that fail to copy are not accounted for
                    warn!(path = %source.display(), error = %e, "copy failed");
                    events.error(TaskError::new(source, "copy", e));
                }
            }
            return;
        }

        match is_source_newer(source, dest) {
            Ok(true) => match copy_file(source, dest) {
                Ok(bytes) => {
                    trace!(path = %source.display(), bytes, "overwrote stale file");
                    events.bytes(bytes);
                }
                Err(e) => {
                    warn!(path = %source.display(), error = %e, "overwrite failed");
                    events.error(TaskError::new(source, "copy", e));
                }
            },
            Ok(false) => {
                trace!(path = %source.display(), "destination up to date");
            }
            Err(e) => {
                events.error(TaskError::new(source, "compare with the existing copy", e));
            }
        }

        // An entry with an existing copy is accounted for no matter how the
        // overwrite attempt went
        events.progress(1);
    }
}
