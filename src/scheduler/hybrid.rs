//! Greedy → GA → SA pipeline.
//!
//! 1. **Greedy**: sequential slot scoring gives a constructive start. Sessions
//!    with no admissible slot are left open rather than failing the run.
//! 2. **Fill**: the candidate generator places the open sessions, so the seed
//!    covers every placeable session.
//! 3. **GA**: the seed joins a random population; the best individual ever
//!    observed moves on.
//! 4. **SA**: annealing refines the GA best. Its best is the result.
//!
//! GA and SA never return anything worse than their seed, so the result
//! scores at least as well as the filled greedy schedule.

use tracing::info;

use super::context::SearchContext;
use super::greedy::GreedyScheduler;
use super::{SearchOutcome, SearchStrategy};
use crate::error::Result;
use crate::ga::GeneticSearch;
use crate::generator::fill_missing;
use crate::models::Schedule;
use crate::sa::AnnealingSearch;

const STAGES: usize = 3;

/// Default strategy.
#[derive(Debug, Clone, Default)]
pub struct HybridPipeline {
    greedy: GreedyScheduler,
    genetic: GeneticSearch,
    annealing: AnnealingSearch,
}

impl HybridPipeline {
    pub fn new(genetic: GeneticSearch, annealing: AnnealingSearch) -> Self {
        Self {
            greedy: GreedyScheduler::new(),
            genetic,
            annealing,
        }
    }
}

impl SearchStrategy for HybridPipeline {
    fn name(&self) -> &'static str {
        "hybrid"
    }

    fn run(&self, _seed: Schedule, ctx: &mut SearchContext<'_>) -> Result<SearchOutcome> {
        let problem = ctx.problem();
        let evaluator = ctx.evaluator();
        let mut notes = Vec::new();

        ctx.enter_stage("greedy", 0, STAGES);
        let assignment = self.greedy.assign(ctx)?;
        for u in &assignment.infeasible {
            notes.push(format!(
                "{} session {} has no conflict-free slot; placed by search",
                u.subject_id, u.session
            ));
        }
        if !assignment.is_finished() {
            notes.push(format!(
                "time budget reached after {} of {} sessions in greedy stage",
                assignment.attempted,
                problem.sessions().len()
            ));
        }
        let attempted = assignment.attempted;
        let seed = fill_missing(problem, assignment.slots, &mut ctx.rng);
        info!(
            event = "stage_done",
            stage = "greedy",
            attempted,
            score = evaluator.score(&seed),
        );

        ctx.enter_stage("genetic", 1, STAGES);
        let ga = self.genetic.run(seed, ctx)?;
        info!(
            event = "stage_done",
            stage = "genetic",
            generations = ga.iterations,
            score = evaluator.score(&ga.schedule),
        );

        ctx.enter_stage("annealing", 2, STAGES);
        let sa = self.annealing.run(ga.schedule, ctx)?;
        info!(
            event = "stage_done",
            stage = "annealing",
            iterations = sa.iterations,
            score = evaluator.score(&sa.schedule),
        );

        let mut history = ga.history;
        history.extend(sa.history);
        notes.extend(ga.notes);
        notes.extend(sa.notes);
        Ok(SearchOutcome {
            schedule: sa.schedule,
            iterations: attempted + ga.iterations + sa.iterations,
            history,
            notes,
        })
    }
}
