use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Receives progress and answers cancellation queries.
pub trait ProgressMonitor: Send + Sync {
    fn is_cancelled(&self) -> bool;

    fn worked(&self, _task: &str, _units: u32) {}
}

/// A monitor that is cancelled by flipping a flag.
#[derive(Debug, Default)]
pub struct CancellationFlag {
    cancelled: AtomicBool,
}

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

impl ProgressMonitor for CancellationFlag {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

struct NeverCancelled;

impl ProgressMonitor for NeverCancelled {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Handle passed through the pipeline to writers. Sub-tokens share the
/// monitor and extend the task path.
#[derive(Clone)]
pub struct ProgressToken {
    monitor: Arc<dyn ProgressMonitor>,
    task: Arc<str>,
    work: u32,
}

impl ProgressToken {
    pub fn new(monitor: Arc<dyn ProgressMonitor>) -> Self {
        Self {
            monitor,
            task: Arc::from(""),
            work: 0,
        }
    }

    /// A token that is never cancelled and reports nowhere.
    pub fn none() -> Self {
        Self::new(Arc::new(NeverCancelled))
    }

    pub fn is_cancelled(&self) -> bool {
        self.monitor.is_cancelled()
    }

    /// Allocate `work` units of this token to the sub-task `name`.
    pub fn split(&self, name: &str, work: u32) -> Self {
        let task = if self.task.is_empty() {
            Arc::from(name)
        } else {
            Arc::from(format!("{}/{name}", self.task))
        };
        Self {
            monitor: Arc::clone(&self.monitor),
            task,
            work,
        }
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn work(&self) -> u32 {
        self.work
    }

    /// Report the whole allocation as done.
    pub fn done(&self) {
        self.monitor.worked(&self.task, self.work);
    }
}

impl fmt::Debug for ProgressToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressToken")
            .field("task", &self.task)
            .field("work", &self.work)
            .finish()
    }
}
