//! Core trait for simulated annealing.

use rand::Rng;

/// A simulated annealing problem.
///
/// The implementor supplies cost evaluation and neighbor generation; the
/// runner handles temperature, acceptance, and cooling.
///
/// # Minimization
///
/// SA minimizes cost. For a higher-is-better score, return its negation or
/// its distance from a ceiling.
pub trait SaProblem: Send + Sync {
    /// Solution representation.
    type Solution: Clone + Send;

    /// Cost of a solution. Lower is better.
    fn cost(&self, solution: &Self::Solution) -> f64;

    /// A small perturbation of `solution`.
    ///
    /// The neighborhood should be connected: any solution reachable from any
    /// other through a sequence of moves.
    fn neighbor<R: Rng>(&self, solution: &Self::Solution, rng: &mut R) -> Self::Solution;
}
