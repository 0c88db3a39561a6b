//! Simulated annealing loop.

use rand::Rng;

use super::config::SaConfig;
use super::types::SaProblem;
use crate::error::Result;

/// Result of an annealing run.
#[derive(Debug, Clone)]
pub struct SaResult<S> {
    /// Lowest-cost solution seen.
    pub best: S,
    /// Its cost.
    pub best_cost: f64,
    /// Iterations performed.
    pub iterations: usize,
    /// Accepted moves.
    pub accepted: usize,
    /// Best cost after each iteration.
    pub history: Vec<f64>,
    /// Temperature at the end.
    pub final_temperature: f64,
}

/// Runs simulated annealing.
///
/// # Algorithm
///
/// 1. `current = best = initial`, `T = initial_temperature`.
/// 2. Each iteration draws a neighbor and computes `Δ = cost(neighbor) −
///    cost(current)`. The neighbor is accepted when `Δ < 0`, or with
///    probability `exp(−Δ/T)` otherwise.
/// 3. The best solution is tracked separately and only replaced on strict
///    improvement.
/// 4. `T ← cooling_rate · T`. No reheating.
///
/// `on_iteration(iteration, best_cost)` runs after every iteration; returning
/// `Ok(false)` stops early and an error aborts the run.
pub struct SaRunner;

impl SaRunner {
    pub fn run<P, R, F>(
        problem: &P,
        initial: P::Solution,
        config: &SaConfig,
        iterations: usize,
        rng: &mut R,
        mut on_iteration: F,
    ) -> Result<SaResult<P::Solution>>
    where
        P: SaProblem,
        R: Rng,
        F: FnMut(usize, f64) -> Result<bool>,
    {
        let mut current_cost = problem.cost(&initial);
        let mut current = initial;
        let mut best = current.clone();
        let mut best_cost = current_cost;
        let mut temperature = config.initial_temperature;
        let mut accepted = 0;
        let mut performed = 0;
        let mut history = Vec::with_capacity(iterations);

        for iteration in 1..=iterations {
            let candidate = problem.neighbor(&current, rng);
            let candidate_cost = problem.cost(&candidate);
            let delta = candidate_cost - current_cost;

            let accept = delta < 0.0
                || (temperature > 0.0 && rng.random::<f64>() < (-delta / temperature).exp());
            if accept {
                current = candidate;
                current_cost = candidate_cost;
                accepted += 1;
                if current_cost < best_cost {
                    best = current.clone();
                    best_cost = current_cost;
                }
            }

            temperature *= config.cooling_rate;
            history.push(best_cost);
            performed = iteration;

            if !on_iteration(iteration, best_cost)? {
                break;
            }
        }

        Ok(SaResult {
            best,
            best_cost,
            iterations: performed,
            accepted,
            history,
            final_temperature: temperature,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// Minimize (x − 7)² over integers with ±1 steps.
    struct Parabola;

    impl SaProblem for Parabola {
        type Solution = i64;

        fn cost(&self, x: &i64) -> f64 {
            ((x - 7) * (x - 7)) as f64
        }

        fn neighbor<R: Rng>(&self, x: &i64, rng: &mut R) -> i64 {
            if rng.random_bool(0.5) {
                x + 1
            } else {
                x - 1
            }
        }
    }

    #[test]
    fn test_finds_minimum() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let config = SaConfig::default().with_initial_temperature(10.0);
        let result =
            SaRunner::run(&Parabola, -20, &config, 2000, &mut rng, |_, _| Ok(true)).unwrap();
        assert_eq!(result.best, 7);
        assert!(result.best_cost.abs() < 1e-10);
        assert!(result.final_temperature < 10.0);
    }

    #[test]
    fn test_history_non_increasing() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let config = SaConfig::default();
        let result = SaRunner::run(&Parabola, 0, &config, 300, &mut rng, |_, _| Ok(true)).unwrap();
        assert_eq!(result.history.len(), 300);
        for w in result.history.windows(2) {
            assert!(w[1] <= w[0]);
        }
        assert!(result.best_cost <= 49.0);
    }

    #[test]
    fn test_callback_stops_and_aborts() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let config = SaConfig::default();
        let stopped =
            SaRunner::run(&Parabola, 0, &config, 100, &mut rng, |i, _| Ok(i < 5)).unwrap();
        assert_eq!(stopped.iterations, 5);

        let aborted = SaRunner::run(&Parabola, 0, &SaConfig::default(), 100, &mut rng, |_, _| {
            Err(Error::Cancelled)
        });
        assert!(matches!(aborted, Err(Error::Cancelled)));
    }
}
