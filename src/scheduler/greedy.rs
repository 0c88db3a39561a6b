//! Greedy slot scorer.
//!
//! # Algorithm
//!
//! 1. Take sessions in canonical order (subject order, then ordinal).
//! 2. For each session, enumerate eligible faculty × eligible room × every
//!    time slot, in that nesting order.
//! 3. Score each combination with [`FitnessEvaluator::entry_score`] against
//!    the entries placed so far; zero excludes a combination.
//! 4. Keep the strict maximum (ties go to the first enumerated).
//! 5. A session whose every combination scores zero is unresolved.
//!
//! # Complexity
//! O(s · f · r · t · n) where s=sessions, f/r=eligible faculty/rooms,
//! t=slots, n=placed entries.
//!
//! # Reference
//! Carter & Laporte (1998), "Recent developments in practical course
//! timetabling", PATAT II

use tracing::{info, warn};

use super::context::SearchContext;
use super::{SearchOutcome, SearchStrategy};
use crate::error::Result;
use crate::fitness::FitnessEvaluator;
use crate::generator::{place_random, Occupancy};
use crate::models::{Schedule, ScheduleEntry, UnresolvedReason, UnresolvedSession};
use crate::problem::Session;

/// Result of the sequential assignment pass.
#[derive(Debug, Clone, Default)]
pub struct GreedyAssignment {
    /// Entry per placeable session, `None` where no placement was made.
    pub slots: Vec<Option<ScheduleEntry>>,
    /// Sessions with no admissible combination.
    pub infeasible: Vec<UnresolvedSession>,
    /// Sessions processed before the budget ran out.
    pub attempted: usize,
}

impl GreedyAssignment {
    /// Placed entries, in session order.
    pub fn entries(&self) -> impl Iterator<Item = &ScheduleEntry> {
        self.slots.iter().flatten()
    }

    /// Whether every session was processed.
    pub fn is_finished(&self) -> bool {
        self.attempted == self.slots.len()
    }
}

/// One-shot greedy scheduler.
///
/// # Example
///
/// ```
/// use u_timetable::config::OptimizationConfig;
/// use u_timetable::fitness::FitnessEvaluator;
/// use u_timetable::models::{Dataset, Faculty, Room, SlotGridConfig, Subject};
/// use u_timetable::problem::TimetableProblem;
/// use u_timetable::scheduler::{GreedyScheduler, SearchContext};
/// use rand::SeedableRng;
///
/// let data = Dataset::new()
///     .with_subject(Subject::new("CS101", "CS").with_sessions_per_week(2))
///     .with_faculty(Faculty::new("F1", "CS"))
///     .with_room(Room::classroom("R1", 40))
///     .with_time_slots(SlotGridConfig::default().generate());
/// let problem = TimetableProblem::new(data);
/// let config = OptimizationConfig::default();
/// let eval = FitnessEvaluator::new(&problem, &config);
/// let mut ctx = SearchContext::new(&eval, &config, rand_chacha::ChaCha8Rng::seed_from_u64(1));
///
/// let assignment = GreedyScheduler::new().assign(&mut ctx).unwrap();
/// assert_eq!(assignment.entries().count(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GreedyScheduler;

impl GreedyScheduler {
    /// Creates a new scheduler.
    pub fn new() -> Self {
        Self
    }

    /// Best admissible placement for one session, with its entry score.
    pub fn best_placement(
        &self,
        evaluator: &FitnessEvaluator<'_>,
        placed: &[ScheduleEntry],
        session: Session,
    ) -> Option<(ScheduleEntry, f64)> {
        let problem = evaluator.problem();
        let mut best: Option<(ScheduleEntry, f64)> = None;
        for &f in problem.eligible_faculty(session.subject) {
            for &r in problem.eligible_rooms(session.subject) {
                for t in 0..problem.time_slots().len() {
                    let candidate = problem.entry(session, f, r, t);
                    let score = evaluator.entry_score(placed, &candidate);
                    if score <= 0.0 {
                        continue;
                    }
                    if best.as_ref().map_or(true, |(_, s)| score > *s) {
                        best = Some((candidate, score));
                    }
                }
            }
        }
        best
    }

    /// Places every session sequentially.
    ///
    /// Stops early (with `attempted < slots.len()`) when the wall-clock
    /// budget runs out.
    ///
    /// # Errors
    /// [`crate::Error::Cancelled`] when cancellation is requested.
    pub fn assign(&self, ctx: &mut SearchContext<'_>) -> Result<GreedyAssignment> {
        let problem = ctx.problem();
        let evaluator = ctx.evaluator();
        let sessions = problem.sessions();
        let total = sessions.len();

        let mut placed: Vec<ScheduleEntry> = Vec::with_capacity(total);
        let mut out = GreedyAssignment {
            slots: vec![None; total],
            ..GreedyAssignment::default()
        };

        for (i, &session) in sessions.iter().enumerate() {
            match self.best_placement(evaluator, &placed, session) {
                Some((entry, _)) => {
                    placed.push(entry.clone());
                    out.slots[i] = Some(entry);
                }
                None => {
                    let unresolved = problem.unresolved(session, UnresolvedReason::NoFeasibleSlot);
                    warn!(event = "session_unresolved", session = %unresolved);
                    out.infeasible.push(unresolved);
                }
            }
            out.attempted = i + 1;
            if !ctx.checkpoint(i + 1, total, || evaluator.score_entries(&placed))? {
                break;
            }
        }

        Ok(out)
    }
}

impl SearchStrategy for GreedyScheduler {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn run(&self, _seed: Schedule, ctx: &mut SearchContext<'_>) -> Result<SearchOutcome> {
        let problem = ctx.problem();
        let assignment = self.assign(ctx)?;
        let mut notes = Vec::new();

        let mut schedule = Schedule::from_entries(assignment.entries().cloned().collect());
        if !assignment.is_finished() {
            // Budget ran out: place the remaining sessions at random.
            let mut occupancy = Occupancy::from_entries(problem, &schedule.entries);
            for &session in &problem.sessions()[assignment.attempted..] {
                match place_random(problem, session, &mut occupancy, &mut ctx.rng) {
                    Ok(entry) => schedule.add_entry(entry),
                    Err(e) => schedule.unresolved.extend(e.to_unresolved()),
                }
            }
            notes.push(format!(
                "time budget reached after {} of {} sessions; remainder placed at random",
                assignment.attempted,
                problem.sessions().len()
            ));
        }
        schedule.unresolved.extend(assignment.infeasible.iter().cloned());
        schedule.unresolved.extend_from_slice(problem.unplaceable());

        info!(
            event = "greedy_done",
            placed = schedule.len(),
            unresolved = schedule.unresolved.len(),
        );
        Ok(SearchOutcome {
            schedule,
            iterations: assignment.attempted,
            history: Vec::new(),
            notes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OptimizationConfig;
    use crate::conflict::count_conflicts;
    use crate::models::{Constraint, Faculty, Priority, SessionType, Subject};
    use crate::problem::tests::small_dataset;
    use crate::problem::TimetableProblem;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn run(problem: &TimetableProblem, config: &OptimizationConfig) -> SearchOutcome {
        let eval = FitnessEvaluator::new(problem, config);
        let mut ctx = SearchContext::new(&eval, config, ChaCha8Rng::seed_from_u64(9));
        GreedyScheduler::new().run(Schedule::new(), &mut ctx).unwrap()
    }

    #[test]
    fn test_two_subject_scenario() {
        // A: 2 lectures (CS), B: 1 lab (EE); one faculty per department,
        // a classroom and a lab, five slots.
        let p = TimetableProblem::new(small_dataset());
        let out = run(&p, &OptimizationConfig::default());
        let s = out.schedule;

        assert_eq!(s.len(), 3);
        assert!(s.is_complete());
        assert_eq!(count_conflicts(&s.entries), 0);
        for e in s.entries_for_subject("A") {
            assert_eq!(e.room_id, "R1");
            assert_eq!(e.faculty_id, "F1");
        }
        let b = s.entries_for_subject("B");
        assert_eq!(b.len(), 1);
        assert_eq!(b[0].room_id, "L1");
        assert_eq!(b[0].session_type, SessionType::Lab);
    }

    #[test]
    fn test_preferred_windows_chosen() {
        let p = TimetableProblem::new(small_dataset());
        let s = run(&p, &OptimizationConfig::default()).schedule;
        // Lectures take the first morning slots; the lab takes the noon slot.
        assert_eq!(s.entries[0].time_slot_id, "MON-P1");
        assert_eq!(s.entries[1].time_slot_id, "MON-P2");
        assert_eq!(s.entries[2].time_slot_id, "MON-P5");
    }

    #[test]
    fn test_unplaceable_when_slots_exhausted() {
        // Six lectures for one faculty member over five slots.
        let mut data = small_dataset();
        data.subjects[0] = Subject::new("A", "CS").with_sessions_per_week(6);
        let p = TimetableProblem::new(data);
        let s = run(&p, &OptimizationConfig::default()).schedule;

        assert_eq!(count_conflicts(&s.entries), 0);
        assert_eq!(s.len(), 6);
        assert_eq!(s.unresolved.len(), 1);
        assert_eq!(s.unresolved[0].reason, UnresolvedReason::NoFeasibleSlot);
        assert_eq!(s.unresolved[0].session, 6);
    }

    #[test]
    fn test_ineligible_subject_reported() {
        let data = small_dataset().with_subject(Subject::new("Z", "ART"));
        let p = TimetableProblem::new(data);
        let s = run(&p, &OptimizationConfig::default()).schedule;
        assert_eq!(s.len(), 3);
        assert_eq!(s.unresolved[0].reason, UnresolvedReason::NoEligibleFaculty);
    }

    #[test]
    fn test_avoids_constrained_slot() {
        let data = small_dataset().with_constraint(
            Constraint::faculty_unavailable("C1", "F1", "MON-P1").with_priority(Priority::High),
        );
        let p = TimetableProblem::new(data);
        let s = run(&p, &OptimizationConfig::default()).schedule;
        assert!(s
            .entries_for_faculty("F1")
            .iter()
            .all(|e| e.time_slot_id != "MON-P1"));
    }

    #[test]
    fn test_unavailable_faculty_excluded() {
        let mut data = small_dataset();
        data.faculty[1] = Faculty::new("F2", "EE").with_days([crate::models::Weekday::Friday]);
        let p = TimetableProblem::new(data);
        let s = run(&p, &OptimizationConfig::default()).schedule;
        // F2 never works on the Monday-only grid.
        assert_eq!(s.len(), 2);
        assert_eq!(s.unresolved[0].subject_id, "B");
    }
}
