//! Search context passed to every strategy.
//!
//! Bundles the read-only problem and evaluator with the per-run mutable
//! state: the seeded RNG, the cooperative cancellation flag, the iteration
//! and wall-clock budget, and the progress sink. Iteration loops call
//! [`SearchContext::checkpoint`] at every boundary; it is the only place a
//! strategy observes cancellation, budgets, or reports progress.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::OptimizationConfig;
use crate::error::{Error, Result};
use crate::fitness::FitnessEvaluator;
use crate::problem::TimetableProblem;

/// Progress snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    /// Iteration within the current stage.
    pub iteration: usize,
    /// Overall completion, 0–100.
    pub percent_complete: f64,
    /// Best score observed so far.
    pub best_score: f64,
    /// Current stage name.
    pub stage: String,
}

/// Receives progress snapshots. Must not block.
pub trait ProgressSink: Send + Sync {
    fn report(&self, progress: Progress);
}

impl<F> ProgressSink for F
where
    F: Fn(Progress) + Send + Sync,
{
    fn report(&self, progress: Progress) {
        self(progress)
    }
}

/// Discards progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _progress: Progress) {}
}

static NO_PROGRESS: NoProgress = NoProgress;

/// Mutable per-run search state.
pub struct SearchContext<'a> {
    evaluator: &'a FitnessEvaluator<'a>,
    config: &'a OptimizationConfig,
    /// Run RNG. Stays on the driving thread so seeded runs are reproducible.
    pub rng: ChaCha8Rng,
    cancel: Option<&'a AtomicBool>,
    progress: &'a dyn ProgressSink,
    deadline: Option<Instant>,
    stage: &'static str,
    stage_index: usize,
    stage_count: usize,
}

impl fmt::Debug for SearchContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchContext")
            .field("stage", &self.stage)
            .field("stage_index", &self.stage_index)
            .field("stage_count", &self.stage_count)
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}

impl<'a> SearchContext<'a> {
    /// Creates a context; the wall-clock budget starts now.
    pub fn new(
        evaluator: &'a FitnessEvaluator<'a>,
        config: &'a OptimizationConfig,
        rng: ChaCha8Rng,
    ) -> Self {
        Self {
            evaluator,
            config,
            rng,
            cancel: None,
            progress: &NO_PROGRESS,
            // A limit beyond the clock's range is no limit.
            deadline: config
                .budget
                .time_limit()
                .and_then(|d| Instant::now().checked_add(d)),
            stage: "search",
            stage_index: 0,
            stage_count: 1,
        }
    }

    /// Observes a cancellation flag.
    pub fn with_cancel(mut self, cancel: &'a AtomicBool) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Reports progress to `sink`.
    pub fn with_progress(mut self, sink: &'a dyn ProgressSink) -> Self {
        self.progress = sink;
        self
    }

    /// Overrides the deadline.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn problem(&self) -> &'a TimetableProblem {
        self.evaluator.problem()
    }

    pub fn evaluator(&self) -> &'a FitnessEvaluator<'a> {
        self.evaluator
    }

    pub fn config(&self) -> &'a OptimizationConfig {
        self.config
    }

    /// Enters stage `index` of `count` (for overall percent).
    pub fn enter_stage(&mut self, name: &'static str, index: usize, count: usize) {
        self.stage = name;
        self.stage_count = count.max(1);
        self.stage_index = index.min(self.stage_count - 1);
    }

    /// Current stage name.
    pub fn stage(&self) -> &'static str {
        self.stage
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_some_and(|c| c.load(Ordering::Relaxed))
    }

    /// Whether the wall-clock budget is spent.
    pub fn is_past_deadline(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Caps a loop's configured iteration count by the budget.
    pub fn iteration_limit(&self, configured: usize) -> usize {
        match self.config.budget.max_iterations {
            Some(cap) => configured.min(cap),
            None => configured,
        }
    }

    /// Iteration boundary.
    ///
    /// Reports progress every `progress_interval` iterations and on the last
    /// one. Returns `Ok(false)` when the wall-clock budget is spent, so the
    /// caller stops with its best solution.
    ///
    /// # Errors
    /// [`Error::Cancelled`] once cancellation is requested.
    pub fn checkpoint(
        &mut self,
        iteration: usize,
        total: usize,
        best_score: impl FnOnce() -> f64,
    ) -> Result<bool> {
        if self.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let interval = self.config.progress_interval.max(1);
        if iteration % interval == 0 || iteration >= total {
            let progress = self.progress_at(iteration, total, best_score());
            debug!(
                event = "progress",
                stage = self.stage,
                iteration,
                percent = progress.percent_complete,
                best_score = progress.best_score,
            );
            self.progress.report(progress);
        }
        Ok(!self.is_past_deadline())
    }

    fn progress_at(&self, iteration: usize, total: usize, best_score: f64) -> Progress {
        let within = if total == 0 {
            1.0
        } else {
            (iteration as f64 / total as f64).min(1.0)
        };
        let percent = (self.stage_index as f64 + within) / self.stage_count as f64 * 100.0;
        Progress {
            iteration,
            percent_complete: percent,
            best_score,
            stage: self.stage.to_string(),
        }
    }
}
