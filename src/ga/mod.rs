//! Genetic algorithm over timetables.
//!
//! # Encoding
//!
//! A chromosome is the entry list of a schedule, aligned with
//! [`crate::problem::TimetableProblem::sessions`]: gene `i` carries the
//! faculty, room, and slot of session `i`. Because every gene is drawn from
//! the session's eligible values, offspring stay structurally valid; the
//! fitness evaluator handles conflicts.
//!
//! # Submodules
//!
//! - [`operators`]: selection, crossover, and mutation
//!
//! # Reference
//! - Colorni, Dorigo & Maniezzo (1998), "Metaheuristics for high school
//!   timetabling", Computational Optimization and Applications 9(3)

mod config;
pub mod operators;
mod runner;

pub use config::GaConfig;
pub use runner::GeneticSearch;
