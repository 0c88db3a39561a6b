//! Genetic algorithm settings.

use serde::{Deserialize, Serialize};

/// GA parameters.
///
/// # Example
///
/// ```
/// use u_timetable::ga::GaConfig;
///
/// let config = GaConfig::default()
///     .with_population_size(40)
///     .with_generations(100)
///     .with_mutation_rate(0.2);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaConfig {
    /// Individuals per generation.
    pub population_size: usize,
    /// Generations to evolve.
    pub generations: usize,
    /// Probability a child is mutated.
    pub mutation_rate: f64,
    /// Probability a parent pair is recombined.
    pub crossover_rate: f64,
    /// Individuals drawn per tournament.
    pub tournament_size: usize,
    /// Best individuals copied unmodified into the next generation.
    pub elite_count: usize,
    /// Evaluate the population on the rayon pool.
    pub parallel: bool,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            generations: 500,
            mutation_rate: 0.1,
            crossover_rate: 0.8,
            tournament_size: 3,
            elite_count: 1,
            parallel: true,
        }
    }
}

impl GaConfig {
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    pub fn with_generations(mut self, generations: usize) -> Self {
        self.generations = generations;
        self
    }

    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    pub fn with_tournament_size(mut self, size: usize) -> Self {
        self.tournament_size = size;
        self
    }

    pub fn with_elite_count(mut self, count: usize) -> Self {
        self.elite_count = count;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Checks parameter ranges.
    pub fn validate(&self) -> Result<(), String> {
        if self.population_size < 2 {
            return Err("genetic.population_size must be at least 2".into());
        }
        if self.generations == 0 {
            return Err("genetic.generations must be at least 1".into());
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err("genetic.mutation_rate must be in [0, 1]".into());
        }
        if !(0.0..=1.0).contains(&self.crossover_rate) {
            return Err("genetic.crossover_rate must be in [0, 1]".into());
        }
        if self.tournament_size == 0 {
            return Err("genetic.tournament_size must be at least 1".into());
        }
        if self.elite_count == 0 {
            return Err("genetic.elite_count must be at least 1".into());
        }
        if self.elite_count >= self.population_size {
            return Err("genetic.elite_count must be below population_size".into());
        }
        Ok(())
    }
}
