//! Simulated annealing settings.

use serde::{Deserialize, Serialize};

/// SA parameters.
///
/// Cooling is geometric: `T_{k+1} = cooling_rate · T_k`, applied after every
/// iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaConfig {
    /// Starting temperature.
    pub initial_temperature: f64,
    /// Multiplicative cooling factor in `(0, 1)`.
    pub cooling_rate: f64,
    /// Iterations; `None` follows the GA generation count.
    pub iterations: Option<usize>,
    /// Probability a move reassigns one entry instead of swapping two.
    pub reassign_rate: f64,
}

impl Default for SaConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 1000.0,
            cooling_rate: 0.95,
            iterations: None,
            reassign_rate: 0.2,
        }
    }
}

impl SaConfig {
    pub fn with_initial_temperature(mut self, temperature: f64) -> Self {
        self.initial_temperature = temperature;
        self
    }

    pub fn with_cooling_rate(mut self, rate: f64) -> Self {
        self.cooling_rate = rate;
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = Some(iterations);
        self
    }

    pub fn with_reassign_rate(mut self, rate: f64) -> Self {
        self.reassign_rate = rate;
        self
    }

    /// Checks parameter ranges.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.initial_temperature > 0.0) {
            return Err("annealing.initial_temperature must be positive".into());
        }
        if !(self.cooling_rate > 0.0 && self.cooling_rate < 1.0) {
            return Err("annealing.cooling_rate must be in (0, 1)".into());
        }
        if !(0.0..=1.0).contains(&self.reassign_rate) {
            return Err("annealing.reassign_rate must be in [0, 1]".into());
        }
        Ok(())
    }
}
