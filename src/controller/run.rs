//! Run handles and results.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use uuid::Uuid;

use crate::models::{Schedule, UnresolvedSession};
use crate::scheduler::{Progress, RunMetrics, StrategyKind};

/// Lifecycle state of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "cause", rename_all = "snake_case")]
pub enum RunStatus {
    #[default]
    Idle,
    Running,
    Completed,
    /// Failed with the given cause. Nothing was persisted.
    Failed(String),
    /// Cancelled cooperatively. Nothing was persisted.
    Cancelled,
}

impl RunStatus {
    /// Whether the run has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Completed | RunStatus::Failed(_) | RunStatus::Cancelled
        )
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Idle => f.write_str("idle"),
            RunStatus::Running => f.write_str("running"),
            RunStatus::Completed => f.write_str("completed"),
            RunStatus::Failed(cause) => write!(f, "failed: {cause}"),
            RunStatus::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub run_id: Uuid,
    pub schedule: Schedule,
    pub metrics: RunMetrics,
    pub improvements: Vec<String>,
    pub warnings: Vec<String>,
    pub unresolved: Vec<UnresolvedSession>,
    pub strategy: StrategyKind,
    pub iterations: usize,
    pub elapsed: Duration,
}

#[derive(Debug, Default)]
pub(crate) struct RunState {
    pub(crate) status: RunStatus,
    pub(crate) result: Option<RunResult>,
}

/// Handle to a run on its worker thread.
///
/// Cloning is not supported; share the handle behind an `Arc` if several
/// owners need it.
#[derive(Debug)]
pub struct RunHandle {
    id: Uuid,
    cancel: Arc<AtomicBool>,
    state: Arc<RwLock<RunState>>,
    progress: watch::Receiver<Progress>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl RunHandle {
    pub(crate) fn new(
        id: Uuid,
        cancel: Arc<AtomicBool>,
        state: Arc<RwLock<RunState>>,
        progress: watch::Receiver<Progress>,
        worker: JoinHandle<()>,
    ) -> Self {
        Self {
            id,
            cancel,
            state,
            progress,
            worker: Mutex::new(Some(worker)),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn status(&self) -> RunStatus {
        self.state.read().status.clone()
    }

    /// Latest progress snapshot.
    pub fn progress(&self) -> Progress {
        self.progress.borrow().clone()
    }

    /// A receiver that observes every progress update (latest value only).
    pub fn subscribe(&self) -> watch::Receiver<Progress> {
        self.progress.clone()
    }

    /// Result of a completed run; `None` while running or after failure or
    /// cancellation.
    pub fn result(&self) -> Option<RunResult> {
        self.state.read().result.clone()
    }

    /// Requests cooperative cancellation. Observed at the next iteration
    /// boundary, and always before anything is persisted.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn is_finished(&self) -> bool {
        self.status().is_terminal()
    }

    /// Blocks until the run reaches a terminal state.
    pub fn wait(&self) -> RunStatus {
        let worker = self.worker.lock().take();
        if let Some(worker) = worker {
            if worker.join().is_err() {
                let mut state = self.state.write();
                if !state.status.is_terminal() {
                    state.status = RunStatus::Failed("worker thread panicked".into());
                }
            }
        }
        self.status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_terminal() {
        assert!(!RunStatus::Idle.is_terminal());
        assert!(!RunStatus::Running.is_terminal());
        assert!(RunStatus::Completed.is_terminal());
        assert!(RunStatus::Failed("x".into()).is_terminal());
        assert!(RunStatus::Cancelled.is_terminal());
        assert_eq!(RunStatus::Failed("boom".into()).to_string(), "failed: boom");
    }

    #[test]
    fn test_wait_reports_panic() {
        let state = Arc::new(RwLock::new(RunState {
            status: RunStatus::Running,
            result: None,
        }));
        let (_tx, rx) = watch::channel(Progress::default());
        let worker = std::thread::spawn(|| panic!("worker died"));
        let handle = RunHandle::new(Uuid::new_v4(), Arc::default(), state, rx, worker);

        assert!(matches!(handle.wait(), RunStatus::Failed(_)));
        assert!(handle.result().is_none());
    }
}
