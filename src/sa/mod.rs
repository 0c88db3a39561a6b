//! Simulated Annealing (SA).
//!
//! A single-solution trajectory search that accepts worsening moves with a
//! probability that shrinks as the temperature cools, so it can leave local
//! optima early and settles later.
//!
//! [`SaRunner`] is generic over [`SaProblem`]; [`TimetableMoves`] supplies
//! the timetable move set and [`AnnealingSearch`] wires it into the
//! strategy interface.
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Abramson (1991), "Constructing school timetables using simulated
//!   annealing", Management Science 37(1)

mod config;
mod runner;
mod timetable;
mod types;

pub use config::SaConfig;
pub use runner::{SaResult, SaRunner};
pub use timetable::{swap_assignments, AnnealingSearch, TimetableMoves};
pub use types::SaProblem;
