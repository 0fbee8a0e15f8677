//! Worker pool
//!
//! A fixed set of OS threads draining an unbounded task channel. The channel
//! is unbounded because running tasks submit child tasks to the same pool; a
//! bounded queue could deadlock the very workers that have to drain it.

use crate::core::task::BackupTask;
use crossbeam::channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// How long workers wait on the queue before re-checking the shutdown flag
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Cloneable handle for submitting tasks to the pool
#[derive(Debug, Clone)]
pub struct TaskSpawner {
    tx: Sender<BackupTask>,
    submitted: Arc<AtomicU64>,
}

impl TaskSpawner {
    pub(crate) fn new(tx: Sender<BackupTask>, submitted: Arc<AtomicU64>) -> Self {
        Self { tx, submitted }
    }

    /// Submit a task for execution
    pub fn submit(&self, task: BackupTask) {
        // Counted before the send so the submitted total is never behind the
        // queue contents when the aggregator checks for quiescence
        self.submitted.fetch_add(1, Ordering::SeqCst);
        let _ = self.tx.send(task);
    }

    /// Total tasks submitted so far
    pub fn submitted_count(&self) -> u64 {
        self.submitted.load(Ordering::SeqCst)
    }

    /// Shared submitted-task counter
    pub fn submitted_counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.submitted)
    }
}

/// Fixed-size worker pool executing backup tasks
pub struct TaskPool {
    spawner: TaskSpawner,
    shutdown: Arc<AtomicBool>,
    workers: Vec<JoinHandle<()>>,
}

impl TaskPool {
    /// Start a pool with the given number of worker threads (0 = one per CPU)
    pub fn new(threads: usize) -> Self {
        let threads = if threads == 0 {
            num_cpus::get()
        } else {
            threads
        };

        let (tx, rx) = unbounded::<BackupTask>();
        let shutdown = Arc::new(AtomicBool::new(false));

        let workers = (0..threads)
            .map(|id| {
                let rx = rx.clone();
                let shutdown = Arc::clone(&shutdown);
                std::thread::Builder::new()
                    .name(format!("backup-worker-{id}"))
                    .spawn(move || worker_loop(rx, shutdown))
                    .expect("failed to spawn backup worker")
            })
            .collect();

        Self {
            spawner: TaskSpawner::new(tx, Arc::new(AtomicU64::new(0))),
            shutdown,
            workers,
        }
    }

    /// Get a submission handle for this pool
    pub fn spawner(&self) -> TaskSpawner {
        self.spawner.clone()
    }

    /// Total tasks submitted so far
    pub fn submitted_count(&self) -> u64 {
        self.spawner.submitted_count()
    }

    /// Stop the workers and wait for them to exit
    pub fn shutdown(mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

fn worker_loop(rx: Receiver<BackupTask>, shutdown: Arc<AtomicBool>) {
    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(task) => task.run(),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::events::{EventSender, TaskEvent};
    use crate::core::task::{BackupTask, TaskContext};
    use crate::core::CancelToken;
    use crate::fs::ExclusionSet;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_pool_runs_fanned_out_tasks() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        fs::create_dir_all(src.path().join("sub/inner")).unwrap();
        File::create(src.path().join("a.txt"))
            .unwrap()
            .write_all(b"a")
            .unwrap();
        File::create(src.path().join("sub/b.txt"))
            .unwrap()
            .write_all(b"b")
            .unwrap();
        File::create(src.path().join("sub/inner/c.txt"))
            .unwrap()
            .write_all(b"c")
            .unwrap();

        let (tx, rx) = crossbeam::channel::unbounded();
        let pool = TaskPool::new(4);
        let ctx = TaskContext::new(
            ExclusionSet::default(),
            CancelToken::new(),
            EventSender::new(tx),
            pool.spawner(),
        );

        pool.spawner().submit(BackupTask::root(
            src.path().to_path_buf(),
            dst.path().to_path_buf(),
            ctx,
        ));

        let mut finished = 0u64;
        let mut progress = 0u64;
        while finished < pool.submitted_count() {
            match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
                TaskEvent::Finished => finished += 1,
                TaskEvent::Progress(units) => progress += units,
                _ => {}
            }
        }

        // root, sub, and inner each became a task
        assert_eq!(pool.submitted_count(), 3);
        assert_eq!(progress, 3);
        pool.shutdown();

        let root_name = src.path().file_name().unwrap();
        assert!(dst.path().join(root_name).join("a.txt").exists());
        assert!(dst
            .path()
            .join(root_name)
            .join("sub/inner/c.txt")
            .exists());
    }
}
