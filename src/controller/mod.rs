//! Optimization controller.
//!
//! Drives one run end to end: load reference data from a [`ScheduleStore`],
//! validate it, seed and run the selected strategy, build the report, and
//! persist the schedule with replace-all semantics.
//!
//! # Lifecycle
//!
//! ```text
//! Idle → Running → Completed
//!                ↘ Failed(cause)
//!                ↘ Cancelled
//! ```
//!
//! The store is written only on the way to `Completed`. A failure or a
//! cancellation at any point leaves the previously stored entries as they
//! were.
//!
//! # Concurrency
//!
//! [`Optimizer::start_run`] executes on a dedicated worker thread and
//! returns a [`RunHandle`] immediately. Progress is published through a
//! `tokio` watch channel (latest value, never blocks); lifecycle events go
//! to a [`NotificationSink`]. [`Optimizer::run_blocking`] runs on the
//! caller's thread instead.

mod events;
mod run;
mod store;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::sync::watch;
use tracing::{info, warn};
use uuid::Uuid;

pub use events::{BroadcastNotifier, NoNotifications, NotificationSink, RunEvent};
pub use run::{RunHandle, RunResult, RunStatus};
pub use store::{InMemoryStore, ScheduleStore};

use run::RunState;

use crate::config::OptimizationConfig;
use crate::error::{Error, Result};
use crate::fitness::FitnessEvaluator;
use crate::generator::generate_random;
use crate::problem::TimetableProblem;
use crate::scheduler::{
    NoProgress, Progress, ProgressSink, RunReport, SearchContext, StrategyKind,
};
use crate::validation::validate_input;

/// Runs optimizations against a store.
pub struct Optimizer<S: ScheduleStore> {
    store: Arc<S>,
    notifier: Arc<dyn NotificationSink>,
    latest: Arc<RwLock<Option<RunResult>>>,
}

impl<S: ScheduleStore> Clone for Optimizer<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            notifier: Arc::clone(&self.notifier),
            latest: Arc::clone(&self.latest),
        }
    }
}

impl<S: ScheduleStore + 'static> Optimizer<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            notifier: Arc::new(NoNotifications),
            latest: Arc::default(),
        }
    }

    /// Sends lifecycle events to `notifier`.
    pub fn with_notifier(mut self, notifier: Arc<dyn NotificationSink>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Result of the most recent completed run. Cleared when a run starts.
    pub fn latest_result(&self) -> Option<RunResult> {
        self.latest.read().clone()
    }

    /// Starts a run with the strategy named in `config`.
    pub fn start_configured(&self, config: OptimizationConfig) -> RunHandle {
        let strategy = config.strategy;
        self.start_run(strategy, config)
    }

    /// Starts a run on a worker thread.
    ///
    /// `strategy` takes precedence over `config.strategy`; use
    /// [`Optimizer::start_configured`] to honor the configured one.
    pub fn start_run(&self, strategy: StrategyKind, config: OptimizationConfig) -> RunHandle {
        let id = Uuid::new_v4();
        let cancel = Arc::new(AtomicBool::new(false));
        let state = Arc::new(RwLock::new(RunState::default()));
        let (progress_tx, progress_rx) = watch::channel(Progress::default());

        *self.latest.write() = None;
        state.write().status = RunStatus::Running;

        let this = self.clone();
        let worker_cancel = Arc::clone(&cancel);
        let worker_state = Arc::clone(&state);
        let worker = std::thread::spawn(move || {
            let sink = move |p: Progress| {
                progress_tx.send_replace(p);
            };
            let outcome = this.execute(id, strategy, config, &worker_cancel, &sink);
            this.finish(id, outcome, &worker_state);
        });

        RunHandle::new(id, cancel, state, progress_rx, worker)
    }

    /// [`Optimizer::run_blocking`] with the strategy named in `config`.
    ///
    /// # Errors
    /// See [`Optimizer::execute`].
    pub fn run_configured(&self, config: OptimizationConfig) -> Result<RunResult> {
        let strategy = config.strategy;
        self.run_blocking(strategy, config)
    }

    /// Runs on the calling thread without cancellation or progress.
    ///
    /// `strategy` takes precedence over `config.strategy`.
    ///
    /// # Errors
    /// See [`Optimizer::execute`].
    pub fn run_blocking(
        &self,
        strategy: StrategyKind,
        config: OptimizationConfig,
    ) -> Result<RunResult> {
        let cancel = AtomicBool::new(false);
        *self.latest.write() = None;
        let id = Uuid::new_v4();
        let outcome = self.execute(id, strategy, config, &cancel, &NoProgress);
        if let Ok(result) = &outcome {
            *self.latest.write() = Some(result.clone());
        }
        outcome
    }

    /// One complete run. `strategy` replaces `config.strategy`.
    ///
    /// # Errors
    /// - [`Error::Config`] for an invalid configuration
    /// - [`Error::Persistence`] when loading or writing fails
    /// - [`Error::InsufficientData`] when subjects, faculty, or rooms are empty
    /// - [`Error::InvalidInput`] when reference data fails validation
    /// - [`Error::Cancelled`] when `cancel` is raised before persisting
    pub fn execute(
        &self,
        run_id: Uuid,
        strategy: StrategyKind,
        config: OptimizationConfig,
        cancel: &AtomicBool,
        progress: &dyn ProgressSink,
    ) -> Result<RunResult> {
        let started = Instant::now();
        let config = config.with_strategy(strategy);
        config.validate()?;

        self.notifier.notify(RunEvent::Started { run_id, strategy });
        info!(event = "run_started", %run_id, %strategy, seed = ?config.seed);

        let mut dataset = self.store.load_dataset()?;
        if dataset.time_slots.is_empty() {
            dataset.time_slots = config.grid.generate();
            info!(
                event = "grid_generated",
                %run_id,
                slots = dataset.time_slots.len()
            );
        }

        let mut missing = Vec::new();
        if dataset.subjects.is_empty() {
            missing.push("subjects");
        }
        if dataset.faculty.is_empty() {
            missing.push("faculty");
        }
        if dataset.rooms.is_empty() {
            missing.push("rooms");
        }
        if !missing.is_empty() {
            return Err(Error::InsufficientData { missing });
        }
        validate_input(&dataset).map_err(Error::InvalidInput)?;

        let problem = TimetableProblem::new(dataset);
        let evaluator = FitnessEvaluator::new(&problem, &config);
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_os_rng(),
        };
        let mut ctx = SearchContext::new(&evaluator, &config, rng)
            .with_cancel(cancel)
            .with_progress(progress);

        let seed = generate_random(&problem, &mut ctx.rng);
        let search = strategy.build(&config);
        let outcome = search.run(seed, &mut ctx)?;

        if cancel.load(Ordering::Relaxed) {
            return Err(Error::Cancelled);
        }

        let report = RunReport::build(&evaluator, &config, &outcome.schedule, &outcome.notes);
        if !report.is_clean() {
            warn!(
                event = "run_needs_review",
                %run_id,
                warnings = report.warnings.len()
            );
        }
        self.store.replace_entries(&outcome.schedule.entries)?;

        let elapsed = started.elapsed();
        info!(
            event = "run_completed",
            %run_id,
            clean = report.is_clean(),
            entries = outcome.schedule.len(),
            unresolved = outcome.schedule.unresolved.len(),
            conflicts = report.metrics.total_conflicts,
            score = report.metrics.overall_score,
            elapsed_ms = elapsed.as_millis() as u64,
        );
        Ok(RunResult {
            run_id,
            unresolved: outcome.schedule.unresolved.clone(),
            schedule: outcome.schedule,
            metrics: report.metrics,
            improvements: report.improvements,
            warnings: report.warnings,
            strategy,
            iterations: outcome.iterations,
            elapsed,
        })
    }

    fn finish(&self, run_id: Uuid, outcome: Result<RunResult>, state: &RwLock<RunState>) {
        match outcome {
            Ok(result) => {
                let metrics = result.metrics.clone();
                *self.latest.write() = Some(result.clone());
                {
                    let mut s = state.write();
                    s.result = Some(result);
                    s.status = RunStatus::Completed;
                }
                self.notifier.notify(RunEvent::Completed { run_id, metrics });
            }
            Err(Error::Cancelled) => {
                info!(event = "run_cancelled", %run_id);
                state.write().status = RunStatus::Cancelled;
                self.notifier.notify(RunEvent::Cancelled { run_id });
            }
            Err(e) => {
                warn!(event = "run_failed", %run_id, error = %e);
                let cause = e.to_string();
                state.write().status = RunStatus::Failed(cause.clone());
                self.notifier.notify(RunEvent::Failed { run_id, error: cause });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::GaConfig;
    use crate::models::{Dataset, ScheduleEntry, Subject};
    use crate::problem::tests::small_dataset;
    use crate::sa::SaConfig;

    fn quick_config() -> OptimizationConfig {
        OptimizationConfig::default()
            .with_seed(7)
            .with_genetic(
                GaConfig::default()
                    .with_population_size(10)
                    .with_generations(10),
            )
            .with_annealing(SaConfig::default().with_iterations(30))
    }

    fn stale_entry() -> ScheduleEntry {
        ScheduleEntry::new(&Subject::new("OLD", "CS"), "F1", "R1", "MON-P3")
    }

    #[test]
    fn test_completed_run_persists() {
        let store = Arc::new(
            InMemoryStore::new(small_dataset()).with_entries(vec![stale_entry()]),
        );
        let notifier = Arc::new(BroadcastNotifier::new(16));
        let mut events = notifier.subscribe();
        let optimizer = Optimizer::new(Arc::clone(&store)).with_notifier(notifier);

        let handle = optimizer.start_run(StrategyKind::Hybrid, quick_config());
        assert_eq!(handle.wait(), RunStatus::Completed);

        let result = handle.result().unwrap();
        assert_eq!(result.run_id, handle.id());
        assert_eq!(result.schedule.len(), 3);
        assert_eq!(result.metrics.total_conflicts, 0);
        assert_eq!(store.entries(), result.schedule.entries);
        assert_eq!(optimizer.latest_result(), Some(result));
        assert!((handle.progress().percent_complete - 100.0).abs() < 1e-9);

        assert!(matches!(events.try_recv().unwrap(), RunEvent::Started { .. }));
        assert!(matches!(events.try_recv().unwrap(), RunEvent::Completed { .. }));
    }

    #[test]
    fn test_seeded_runs_reproducible() {
        let store = Arc::new(InMemoryStore::new(small_dataset()));
        let optimizer = Optimizer::new(store);
        for kind in StrategyKind::ALL {
            let a = optimizer.run_blocking(kind, quick_config()).unwrap();
            let b = optimizer.run_blocking(kind, quick_config()).unwrap();
            assert_eq!(a.schedule, b.schedule, "{kind}");
            assert_eq!(a.strategy, kind);
        }
    }

    #[test]
    fn test_insufficient_data() {
        let mut data = small_dataset();
        data.rooms.clear();
        data.faculty.clear();
        let store = Arc::new(InMemoryStore::new(data).with_entries(vec![stale_entry()]));
        let optimizer = Optimizer::new(Arc::clone(&store));

        let err = optimizer
            .run_blocking(StrategyKind::Greedy, quick_config())
            .unwrap_err();
        match err {
            Error::InsufficientData { missing } => {
                assert_eq!(missing, vec!["faculty", "rooms"])
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(store.entries(), vec![stale_entry()]);
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn test_persistence_failure_leaves_store_untouched() {
        let store = Arc::new(
            InMemoryStore::new(small_dataset()).with_entries(vec![stale_entry()]),
        );
        store.fail_writes(true);
        let optimizer = Optimizer::new(Arc::clone(&store));

        let handle = optimizer.start_run(StrategyKind::Greedy, quick_config());
        match handle.wait() {
            RunStatus::Failed(cause) => assert!(cause.contains("persistence failed")),
            other => panic!("unexpected status: {other}"),
        }
        assert!(handle.result().is_none());
        assert!(optimizer.latest_result().is_none());
        assert_eq!(store.entries(), vec![stale_entry()]);
    }

    #[test]
    fn test_cancel_leaves_store_untouched() {
        let store = Arc::new(
            InMemoryStore::new(small_dataset()).with_entries(vec![stale_entry()]),
        );
        let optimizer = Optimizer::new(Arc::clone(&store));
        let cancel = AtomicBool::new(true);

        let err = optimizer
            .execute(
                Uuid::new_v4(),
                StrategyKind::Genetic,
                quick_config(),
                &cancel,
                &NoProgress,
            )
            .unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(store.entries(), vec![stale_entry()]);
    }

    #[test]
    fn test_cancelled_handle() {
        let store = Arc::new(InMemoryStore::new(small_dataset()));
        let optimizer = Optimizer::new(Arc::clone(&store));
        // Large budget so the cancel lands mid-search.
        let config = quick_config().with_genetic(
            GaConfig::default()
                .with_population_size(20)
                .with_generations(1_000_000),
        );

        let handle = optimizer.start_run(StrategyKind::Genetic, config);
        handle.cancel();
        assert_eq!(handle.wait(), RunStatus::Cancelled);
        assert!(handle.result().is_none());
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn test_rerun_replaces_all() {
        let store = Arc::new(
            InMemoryStore::new(small_dataset()).with_entries(vec![stale_entry()]),
        );
        let optimizer = Optimizer::new(Arc::clone(&store));

        let first = optimizer
            .run_blocking(StrategyKind::Greedy, quick_config())
            .unwrap();
        let second = optimizer
            .run_blocking(StrategyKind::Greedy, quick_config())
            .unwrap();
        assert_eq!(first.schedule, second.schedule);
        assert_eq!(store.entries(), second.schedule.entries);
        assert!(!store.entries().contains(&stale_entry()));
        assert_eq!(store.write_count(), 2);
    }

    #[test]
    fn test_generates_grid_when_store_has_none() {
        let mut data = small_dataset();
        data.time_slots.clear();
        let store = Arc::new(InMemoryStore::new(data));
        let optimizer = Optimizer::new(store);

        let result = optimizer
            .run_blocking(StrategyKind::Greedy, quick_config())
            .unwrap();
        assert_eq!(result.schedule.len(), 3);
        assert!(result
            .schedule
            .entries
            .iter()
            .all(|e| e.time_slot_id.contains("-P")));
    }

    #[test]
    fn test_invalid_input_and_store_outage() {
        let data = small_dataset().with_subject(Subject::new("A", "CS"));
        let store = Arc::new(InMemoryStore::new(data));
        let optimizer = Optimizer::new(Arc::clone(&store));
        assert!(matches!(
            optimizer.run_blocking(StrategyKind::Greedy, quick_config()),
            Err(Error::InvalidInput(_))
        ));

        store.set_dataset(Dataset::new());
        store.fail_reads(true);
        assert!(matches!(
            optimizer.run_blocking(StrategyKind::Greedy, quick_config()),
            Err(Error::Persistence(_))
        ));
    }

    #[test]
    fn test_spent_budget_completes_with_best_so_far() {
        let store = Arc::new(
            InMemoryStore::new(small_dataset()).with_entries(vec![stale_entry()]),
        );
        let optimizer = Optimizer::new(Arc::clone(&store));
        let config = quick_config()
            .with_genetic(
                GaConfig::default()
                    .with_population_size(10)
                    .with_generations(1_000_000),
            )
            .with_time_limit_secs(0);

        let handle = optimizer.start_run(StrategyKind::Hybrid, config);
        assert_eq!(handle.wait(), RunStatus::Completed);

        let result = handle.result().unwrap();
        assert_eq!(result.iterations, 3);
        assert_eq!(result.schedule.len(), 3);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.starts_with("time budget reached")));
        assert_eq!(store.entries(), result.schedule.entries);
    }

    #[test]
    fn test_unbounded_time_limit_completes() {
        let store = Arc::new(InMemoryStore::new(small_dataset()));
        let notifier = Arc::new(BroadcastNotifier::new(16));
        let mut events = notifier.subscribe();
        let optimizer = Optimizer::new(Arc::clone(&store)).with_notifier(notifier);

        let result = optimizer
            .run_blocking(StrategyKind::Greedy, quick_config().with_time_limit_secs(u64::MAX))
            .unwrap();
        assert_eq!(result.schedule.len(), 3);

        let config = quick_config().with_time_limit_secs(u64::MAX);
        let handle = optimizer.start_run(StrategyKind::Hybrid, config);
        assert_eq!(handle.wait(), RunStatus::Completed);
        assert!(matches!(events.try_recv().unwrap(), RunEvent::Started { .. }));
        assert!(matches!(events.try_recv().unwrap(), RunEvent::Started { .. }));
        assert!(matches!(events.try_recv().unwrap(), RunEvent::Completed { .. }));
    }

    #[test]
    fn test_configured_strategy_is_used() {
        let store = Arc::new(InMemoryStore::new(small_dataset()));
        let optimizer = Optimizer::new(store);
        let config = OptimizationConfig::from_toml_str("strategy = \"greedy\"\nseed = 7").unwrap();

        let result = optimizer.run_configured(config.clone()).unwrap();
        assert_eq!(result.strategy, StrategyKind::Greedy);

        let handle = optimizer.start_configured(config);
        assert_eq!(handle.wait(), RunStatus::Completed);
        assert_eq!(handle.result().unwrap().strategy, StrategyKind::Greedy);

        let overridden = optimizer
            .run_blocking(StrategyKind::Annealing, quick_config())
            .unwrap();
        assert_eq!(overridden.strategy, StrategyKind::Annealing);
    }
}
