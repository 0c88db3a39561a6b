//! Genetic operators for timetables.
//!
//! A chromosome is the entry list of a schedule, aligned with the problem's
//! sessions (gene `i` places session `i`). Operators never touch their
//! inputs; children are fresh copies.
//!
//! | Operator | Behavior |
//! |----------|----------|
//! | Tournament selection | Best of `k` uniform draws (with replacement) |
//! | Single-point crossover | Cut at `1..len`, swap tails |
//! | Reassignment mutation | One gene's faculty, room, or slot redrawn from eligible values |
//!
//! # Reference
//! Goldberg (1989), "Genetic Algorithms in Search, Optimization and Machine Learning"

use rand::Rng;

use crate::generator::reassign;
use crate::models::ScheduleEntry;
use crate::problem::TimetableProblem;

/// An evaluated chromosome. Higher fitness is better.
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    pub genes: Vec<ScheduleEntry>,
    pub fitness: f64,
}

impl Individual {
    pub fn new(genes: Vec<ScheduleEntry>, fitness: f64) -> Self {
        Self { genes, fitness }
    }
}

/// Tournament selection.
///
/// Returns `None` only for an empty population.
pub fn tournament_select<'a, R: Rng>(
    population: &'a [Individual],
    size: usize,
    rng: &mut R,
) -> Option<&'a Individual> {
    if population.is_empty() {
        return None;
    }
    let mut best: Option<&Individual> = None;
    for _ in 0..size.max(1) {
        let candidate = &population[rng.random_range(0..population.len())];
        if best.map_or(true, |b| candidate.fitness > b.fitness) {
            best = Some(candidate);
        }
    }
    best
}

/// Single-point crossover.
///
/// Children take `a[..cut] + b[cut..]` and `b[..cut] + a[cut..]`. Parents
/// shorter than two genes are copied through.
pub fn single_point_crossover<R: Rng>(
    a: &[ScheduleEntry],
    b: &[ScheduleEntry],
    rng: &mut R,
) -> (Vec<ScheduleEntry>, Vec<ScheduleEntry>) {
    let len = a.len().min(b.len());
    if len < 2 {
        return (a.to_vec(), b.to_vec());
    }
    let cut = rng.random_range(1..len);
    let mut c1 = a[..cut].to_vec();
    c1.extend_from_slice(&b[cut..]);
    let mut c2 = b[..cut].to_vec();
    c2.extend_from_slice(&a[cut..]);
    (c1, c2)
}

/// Reassigns one random gene. Returns the gene index, or `None` if nothing
/// changed.
pub fn mutate<R: Rng>(
    problem: &TimetableProblem,
    genes: &mut [ScheduleEntry],
    rng: &mut R,
) -> Option<usize> {
    if genes.is_empty() {
        return None;
    }
    let i = rng.random_range(0..genes.len());
    reassign(problem, &mut genes[i], rng).then_some(i)
}
