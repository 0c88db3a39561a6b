//! Generational GA loop.

use rand::Rng;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::config::GaConfig;
use super::operators::{mutate, single_point_crossover, tournament_select, Individual};
use crate::error::Result;
use crate::fitness::FitnessEvaluator;
use crate::generator::generate_random;
use crate::models::{Schedule, ScheduleEntry};
use crate::scheduler::{SearchContext, SearchOutcome, SearchStrategy};

/// Genetic search over session-aligned entry lists.
///
/// # Algorithm
///
/// 1. Population = the seed plus random schedules from the candidate
///    generator.
/// 2. Each generation: copy the `elite_count` best unchanged, then fill the
///    rest with tournament-selected parents, recombined with
///    `crossover_rate` and mutated with `mutation_rate`.
/// 3. The best individual is replaced only on strict improvement, so the
///    best-score history never decreases.
///
/// All random draws happen on the calling thread; only fitness evaluation
/// runs on the rayon pool.
#[derive(Debug, Clone, Default)]
pub struct GeneticSearch {
    config: GaConfig,
}

impl GeneticSearch {
    pub fn new(config: GaConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    fn evaluate(
        &self,
        evaluator: &FitnessEvaluator<'_>,
        genes: Vec<Vec<ScheduleEntry>>,
    ) -> Vec<Individual> {
        if self.config.parallel {
            genes
                .into_par_iter()
                .map(|g| {
                    let fitness = evaluator.score_entries(&g);
                    Individual::new(g, fitness)
                })
                .collect()
        } else {
            genes
                .into_iter()
                .map(|g| {
                    let fitness = evaluator.score_entries(&g);
                    Individual::new(g, fitness)
                })
                .collect()
        }
    }

    /// Breeds the next population from one sorted best-first.
    ///
    /// At least one elite is always kept, so the current best survives
    /// unmodified. The result is sorted best-first.
    fn next_generation<R: Rng>(
        &self,
        mut population: Vec<Individual>,
        evaluator: &FitnessEvaluator<'_>,
        rng: &mut R,
    ) -> Vec<Individual> {
        let problem = evaluator.problem();
        let size = population.len();
        let elite = self.config.elite_count.clamp(1, size.saturating_sub(1).max(1));
        let mut offspring: Vec<Vec<ScheduleEntry>> = Vec::with_capacity(size - elite);

        while offspring.len() < size - elite {
            let (Some(p1), Some(p2)) = (
                tournament_select(&population, self.config.tournament_size, rng),
                tournament_select(&population, self.config.tournament_size, rng),
            ) else {
                break;
            };
            let (mut c1, mut c2) = if rng.random_bool(self.config.crossover_rate) {
                single_point_crossover(&p1.genes, &p2.genes, rng)
            } else {
                (p1.genes.clone(), p2.genes.clone())
            };
            if rng.random_bool(self.config.mutation_rate) {
                mutate(problem, &mut c1, rng);
            }
            if rng.random_bool(self.config.mutation_rate) {
                mutate(problem, &mut c2, rng);
            }
            offspring.push(c1);
            if offspring.len() < size - elite {
                offspring.push(c2);
            }
        }

        let mut next: Vec<Individual> = population.drain(..elite).collect();
        next.extend(self.evaluate(evaluator, offspring));
        sort_descending(&mut next);
        next
    }
}

fn sort_descending(population: &mut [Individual]) {
    population.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
}

impl SearchStrategy for GeneticSearch {
    fn name(&self) -> &'static str {
        "genetic"
    }

    fn run(&self, seed: Schedule, ctx: &mut SearchContext<'_>) -> Result<SearchOutcome> {
        let problem = ctx.problem();
        let evaluator = ctx.evaluator();
        let generations = ctx.iteration_limit(self.config.generations);
        let size = self.config.population_size.max(2);

        let Schedule { entries, unresolved } = seed;
        let seed_genes = if entries.len() == problem.sessions().len() {
            entries
        } else {
            warn!(
                event = "seed_misaligned",
                entries = entries.len(),
                sessions = problem.sessions().len(),
            );
            generate_random(problem, &mut ctx.rng).entries
        };

        let mut initial = Vec::with_capacity(size);
        initial.push(seed_genes);
        while initial.len() < size {
            initial.push(generate_random(problem, &mut ctx.rng).entries);
        }
        let mut population = self.evaluate(evaluator, initial);
        sort_descending(&mut population);

        let mut best = population[0].clone();
        let mut history = Vec::with_capacity(generations);
        let mut performed = 0;

        for generation in 1..=generations {
            population = self.next_generation(population, evaluator, &mut ctx.rng);

            if population[0].fitness > best.fitness {
                best = population[0].clone();
            }
            history.push(best.fitness);
            performed = generation;

            debug!(
                event = "generation",
                generation,
                best = best.fitness,
                population_best = population[0].fitness,
            );

            let best_fitness = best.fitness;
            if !ctx.checkpoint(generation, generations, || best_fitness)? {
                break;
            }
        }

        info!(
            event = "genetic_done",
            generations = performed,
            best = best.fitness
        );
        Ok(SearchOutcome {
            schedule: Schedule {
                entries: best.genes,
                unresolved,
            },
            iterations: performed,
            history,
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
    use crate::problem::TimetableProblem;
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

    fn small_ga() -> GaConfig {
        GaConfig::default()
            .with_population_size(12)
            .with_generations(15)
    }

    fn run_with(problem: &TimetableProblem, seed: u64) -> (Schedule, SearchOutcome) {
        let config = OptimizationConfig::default();
        let eval = FitnessEvaluator::new(problem, &config);
        let mut ctx = SearchContext::new(&eval, &config, ChaCha8Rng::seed_from_u64(seed));
        let initial = generate_random(problem, &mut ctx.rng);
        let out = GeneticSearch::new(small_ga())
            .run(initial.clone(), &mut ctx)
            .unwrap();
        (initial, out)
    }

    #[test]
    fn test_history_non_decreasing() {
        let p = problem();
        let (_, out) = run_with(&p, 3);
        assert_eq!(out.iterations, 15);
        assert_eq!(out.history.len(), 15);
        for w in out.history.windows(2) {
            assert!(w[1] >= w[0]);
        }
    }

    #[test]
    fn test_never_worse_than_seed() {
        let p = problem();
        let config = OptimizationConfig::default();
        let eval = FitnessEvaluator::new(&p, &config);
        let (initial, out) = run_with(&p, 11);

        assert_eq!(out.schedule.len(), p.sessions().len());
        assert!(eval.score(&out.schedule) >= eval.score(&initial));
        assert!(out.schedule.entries.iter().all(|e| p.is_eligible(e)));
    }

    #[test]
    fn test_seeded_runs_match() {
        let p = problem();
        let (_, a) = run_with(&p, 21);
        let (_, b) = run_with(&p, 21);
        assert_eq!(a.schedule, b.schedule);
        assert_eq!(a.history, b.history);
    }

    #[test]
    fn test_iteration_cap() {
        let p = problem();
        let config = OptimizationConfig::default().with_max_iterations(4);
        let eval = FitnessEvaluator::new(&p, &config);
        let mut ctx = SearchContext::new(&eval, &config, ChaCha8Rng::seed_from_u64(1));
        let out = GeneticSearch::new(small_ga().with_parallel(false))
            .run(Schedule::new(), &mut ctx)
            .unwrap();
        assert_eq!(out.iterations, 4);
        assert_eq!(out.schedule.len(), p.sessions().len());
    }

    #[test]
    fn test_best_survives_unmodified() {
        let p = problem();
        let config = OptimizationConfig::default();
        let eval = FitnessEvaluator::new(&p, &config);
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let ga = GeneticSearch::new(
            small_ga()
                .with_elite_count(0)
                .with_mutation_rate(1.0)
                .with_parallel(false),
        );

        let genes = (0..12)
            .map(|_| generate_random(&p, &mut rng).entries)
            .collect();
        let mut population = ga.evaluate(&eval, genes);
        sort_descending(&mut population);

        for _ in 0..10 {
            let best = population[0].clone();
            population = ga.next_generation(population, &eval, &mut rng);
            assert_eq!(population.len(), 12);
            assert!(population
                .iter()
                .any(|i| i.genes == best.genes && i.fitness == best.fitness));
            assert!(population[0].fitness >= best.fitness);
        }
    }

    #[test]
    fn test_past_deadline_keeps_best_so_far() {
        let p = problem();
        let config = OptimizationConfig::default();
        let eval = FitnessEvaluator::new(&p, &config);
        let mut ctx = SearchContext::new(&eval, &config, ChaCha8Rng::seed_from_u64(2))
            .with_deadline(Instant::now() - Duration::from_millis(1));
        let initial = generate_random(&p, &mut ctx.rng);

        let out = GeneticSearch::new(small_ga().with_generations(10_000))
            .run(initial.clone(), &mut ctx)
            .unwrap();
        assert_eq!(out.iterations, 1);
        assert_eq!(out.history.len(), 1);
        assert_eq!(out.schedule.len(), p.sessions().len());
        assert!(eval.score(&out.schedule) >= eval.score(&initial));
    }
}
