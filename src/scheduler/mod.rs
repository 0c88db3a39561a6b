//! Search strategies, the search context, and run KPIs.
//!
//! Every strategy implements [`SearchStrategy`]: it receives a seed schedule
//! from the candidate generator and a [`SearchContext`], and returns the best
//! schedule it found. Strategies are interchangeable behind
//! [`StrategyKind`], which configuration selects.
//!
//! | Kind | Strategy |
//! |------|----------|
//! | `greedy` | [`GreedyScheduler`] |
//! | `genetic` | [`crate::ga::GeneticSearch`] |
//! | `annealing` | [`crate::sa::AnnealingSearch`] |
//! | `hybrid` | [`HybridPipeline`] (default) |
//!
//! # KPI
//!
//! [`RunMetrics`] and [`RunReport`] summarize the final schedule: conflicts,
//! utilization, satisfaction, and itemized improvements and warnings.
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling", AI Review 13(2)
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"

mod context;
mod greedy;
mod hybrid;
mod kpi;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use context::{NoProgress, Progress, ProgressSink, SearchContext};
pub use greedy::{GreedyAssignment, GreedyScheduler};
pub use hybrid::HybridPipeline;
pub use kpi::{RunMetrics, RunReport};

use crate::config::OptimizationConfig;
use crate::error::Result;
use crate::ga::GeneticSearch;
use crate::models::Schedule;
use crate::sa::AnnealingSearch;

/// What a strategy returns.
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    /// Best schedule found.
    pub schedule: Schedule,
    /// Iterations performed (sessions, generations, or moves).
    pub iterations: usize,
    /// Best score per iteration, where the strategy tracks one.
    pub history: Vec<f64>,
    /// Notes for the run report.
    pub notes: Vec<String>,
}

/// A schedule search strategy.
pub trait SearchStrategy: Send + Sync + fmt::Debug {
    /// Short identifier.
    fn name(&self) -> &'static str;

    /// Searches from `seed`.
    ///
    /// # Errors
    /// [`crate::Error::Cancelled`] when the context's flag is raised.
    fn run(&self, seed: Schedule, ctx: &mut SearchContext<'_>) -> Result<SearchOutcome>;
}

/// Strategy selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Greedy,
    Genetic,
    Annealing,
    #[default]
    Hybrid,
}

impl StrategyKind {
    /// All kinds.
    pub const ALL: [StrategyKind; 4] = [
        StrategyKind::Greedy,
        StrategyKind::Genetic,
        StrategyKind::Annealing,
        StrategyKind::Hybrid,
    ];

    /// Builds the strategy with the configured settings.
    pub fn build(self, config: &OptimizationConfig) -> Box<dyn SearchStrategy> {
        let annealing = config
            .annealing
            .clone()
            .with_iterations(config.annealing_iterations());
        match self {
            StrategyKind::Greedy => Box::new(GreedyScheduler::new()),
            StrategyKind::Genetic => Box::new(GeneticSearch::new(config.genetic.clone())),
            StrategyKind::Annealing => Box::new(AnnealingSearch::new(annealing)),
            StrategyKind::Hybrid => Box::new(HybridPipeline::new(
                GeneticSearch::new(config.genetic.clone()),
                AnnealingSearch::new(annealing),
            )),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StrategyKind::Greedy => "greedy",
            StrategyKind::Genetic => "genetic",
            StrategyKind::Annealing => "annealing",
            StrategyKind::Hybrid => "hybrid",
        })
    }
}
