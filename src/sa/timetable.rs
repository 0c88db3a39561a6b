//! Annealing over timetables.

use rand::Rng;
use tracing::{info, warn};

use super::config::SaConfig;
use super::runner::SaRunner;
use super::types::SaProblem;
use crate::error::Result;
use crate::fitness::FitnessEvaluator;
use crate::generator::{generate_random, reassign};
use crate::models::{Schedule, ScheduleEntry};
use crate::problem::TimetableProblem;
use crate::scheduler::{SearchContext, SearchOutcome, SearchStrategy};

/// Timetable move set for [`SaRunner`].
///
/// Cost is `100 − score`. A move either swaps the assignments of two
/// entries or, with probability `reassign_rate`, reassigns one entry.
#[derive(Debug, Clone)]
pub struct TimetableMoves<'a> {
    evaluator: &'a FitnessEvaluator<'a>,
    reassign_rate: f64,
}

impl<'a> TimetableMoves<'a> {
    pub fn new(evaluator: &'a FitnessEvaluator<'a>, reassign_rate: f64) -> Self {
        Self {
            evaluator,
            reassign_rate,
        }
    }

    fn problem(&self) -> &'a TimetableProblem {
        self.evaluator.problem()
    }
}

/// Swaps the time slots of `a` and `b`, plus faculty and room when each
/// stays eligible for the other's subject.
pub fn swap_assignments(problem: &TimetableProblem, a: &mut ScheduleEntry, b: &mut ScheduleEntry) {
    std::mem::swap(&mut a.time_slot_id, &mut b.time_slot_id);

    std::mem::swap(&mut a.faculty_id, &mut b.faculty_id);
    if !(problem.is_eligible(a) && problem.is_eligible(b)) {
        std::mem::swap(&mut a.faculty_id, &mut b.faculty_id);
    }
    std::mem::swap(&mut a.room_id, &mut b.room_id);
    if !(problem.is_eligible(a) && problem.is_eligible(b)) {
        std::mem::swap(&mut a.room_id, &mut b.room_id);
    }
}

impl SaProblem for TimetableMoves<'_> {
    type Solution = Vec<ScheduleEntry>;

    fn cost(&self, entries: &Vec<ScheduleEntry>) -> f64 {
        self.evaluator.cost(entries)
    }

    fn neighbor<R: Rng>(&self, entries: &Vec<ScheduleEntry>, rng: &mut R) -> Vec<ScheduleEntry> {
        let mut next = entries.clone();
        if next.is_empty() {
            return next;
        }
        if next.len() < 2 || rng.random_bool(self.reassign_rate) {
            let i = rng.random_range(0..next.len());
            reassign(self.problem(), &mut next[i], rng);
            return next;
        }

        let i = rng.random_range(0..next.len());
        let mut j = rng.random_range(0..next.len() - 1);
        if j >= i {
            j += 1;
        }
        let (lo, hi) = (i.min(j), i.max(j));
        let (left, right) = next.split_at_mut(hi);
        swap_assignments(self.problem(), &mut left[lo], &mut right[0]);
        next
    }
}

/// Simulated annealing strategy.
#[derive(Debug, Clone, Default)]
pub struct AnnealingSearch {
    config: SaConfig,
}

impl AnnealingSearch {
    pub fn new(config: SaConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SaConfig {
        &self.config
    }
}

impl SearchStrategy for AnnealingSearch {
    fn name(&self) -> &'static str {
        "annealing"
    }

    fn run(&self, seed: Schedule, ctx: &mut SearchContext<'_>) -> Result<SearchOutcome> {
        let problem = ctx.problem();
        let evaluator = ctx.evaluator();
        let configured = self
            .config
            .iterations
            .unwrap_or_else(|| ctx.config().annealing_iterations());
        let iterations = ctx.iteration_limit(configured);

        let Schedule { entries, unresolved } = seed;
        let initial = if entries.is_empty() && !problem.sessions().is_empty() {
            warn!(event = "seed_empty", sessions = problem.sessions().len());
            generate_random(problem, &mut ctx.rng).entries
        } else {
            entries
        };

        let moves = TimetableMoves::new(evaluator, self.config.reassign_rate);
        // The runner needs the RNG while the callback needs the context.
        let mut rng = ctx.rng.clone();
        let result = SaRunner::run(
            &moves,
            initial,
            &self.config,
            iterations,
            &mut rng,
            |i, best_cost| ctx.checkpoint(i, iterations, || 100.0 - best_cost),
        )?;
        ctx.rng = rng;

        info!(
            event = "annealing_done",
            iterations = result.iterations,
            accepted = result.accepted,
            best_cost = result.best_cost,
            final_temperature = result.final_temperature,
        );
        Ok(SearchOutcome {
            schedule: Schedule {
                entries: result.best,
                unresolved,
            },
            iterations: result.iterations,
            history: result.history.iter().map(|c| 100.0 - c).collect(),
            notes: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OptimizationConfig;
    use crate::models::{Faculty, Room};
    use crate::problem::tests::small_dataset;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::time::{Duration, Instant};

    fn problem() -> TimetableProblem {
        TimetableProblem::new(
            small_dataset()
                .with_faculty(Faculty::new("F3", "CS"))
                .with_room(Room::classroom("R2", 35)),
        )
    }

    #[test]
    fn test_swap_keeps_eligibility() {
        let p = problem();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let s = generate_random(&p, &mut rng);
        // A (CS lecture) and B (EE lab) cannot exchange faculty or rooms.
        let (mut a, mut b) = (s.entries[0].clone(), s.entries[2].clone());
        swap_assignments(&p, &mut a, &mut b);
        assert_eq!(a.time_slot_id, s.entries[2].time_slot_id);
        assert_eq!(b.time_slot_id, s.entries[0].time_slot_id);
        assert_eq!(a.faculty_id, s.entries[0].faculty_id);
        assert_eq!(b.room_id, s.entries[2].room_id);
        assert!(p.is_eligible(&a) && p.is_eligible(&b));
    }

    #[test]
    fn test_neighbor_stays_eligible() {
        let p = problem();
        let config = OptimizationConfig::default();
        let eval = FitnessEvaluator::new(&p, &config);
        let moves = TimetableMoves::new(&eval, 0.2);
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let mut s = generate_random(&p, &mut rng).entries;
        for _ in 0..50 {
            s = moves.neighbor(&s, &mut rng);
            assert_eq!(s.len(), p.sessions().len());
            assert!(s.iter().all(|e| p.is_eligible(e)));
        }
    }

    #[test]
    fn test_best_no_worse_than_seed() {
        let p = problem();
        let config = OptimizationConfig::default();
        let eval = FitnessEvaluator::new(&p, &config);
        let mut ctx = SearchContext::new(&eval, &config, ChaCha8Rng::seed_from_u64(12));
        let seed = generate_random(&p, &mut ctx.rng);
        let seed_score = eval.score(&seed);

        let out = AnnealingSearch::new(SaConfig::default().with_iterations(200))
            .run(seed, &mut ctx)
            .unwrap();
        assert_eq!(out.iterations, 200);
        assert!(eval.score(&out.schedule) >= seed_score);
        for w in out.history.windows(2) {
            assert!(w[1] >= w[0]);
        }
    }

    #[test]
    fn test_past_deadline_keeps_best_so_far() {
        let p = problem();
        let config = OptimizationConfig::default();
        let eval = FitnessEvaluator::new(&p, &config);
        let mut ctx = SearchContext::new(&eval, &config, ChaCha8Rng::seed_from_u64(12))
            .with_deadline(Instant::now() - Duration::from_millis(1));
        let seed = generate_random(&p, &mut ctx.rng);
        let seed_score = eval.score(&seed);

        let out = AnnealingSearch::new(SaConfig::default().with_iterations(10_000))
            .run(seed, &mut ctx)
            .unwrap();
        assert_eq!(out.iterations, 1);
        assert_eq!(out.history.len(), 1);
        assert_eq!(out.schedule.len(), p.sessions().len());
        assert!(eval.score(&out.schedule) >= seed_score);
    }
}
