//! Academic timetabling engine.
//!
//! Assigns every required session of every subject to a faculty member, a
//! room, and a weekly time slot, so that no faculty member, room, or student
//! batch is double-booked, while scoring soft goals such as workload limits,
//! room fit, and time-of-day preferences.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Subject`, `Faculty`, `Room`, `TimeSlot`,
//!   `Constraint`, `Schedule`, `ScheduleEntry`
//! - **`validation`**: Input integrity checks (duplicate ids, references,
//!   prerequisite cycles)
//! - **`problem`**: Indexed, immutable view of one run's reference data
//! - **`conflict`**: Hard-conflict detection
//! - **`fitness`**: Schedule scoring
//! - **`generator`**: Random candidate schedules
//! - **`scheduler`**: Search strategies (greedy, hybrid), search context, KPIs
//! - **`ga`**: Genetic algorithm
//! - **`sa`**: Simulated annealing
//! - **`controller`**: Run lifecycle, store access, progress, notifications
//! - **`config`**: TOML-loadable run configuration
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use u_timetable::config::OptimizationConfig;
//! use u_timetable::controller::{InMemoryStore, Optimizer, RunStatus};
//! use u_timetable::ga::GaConfig;
//! use u_timetable::models::{Dataset, Faculty, Room, Subject};
//! use u_timetable::scheduler::StrategyKind;
//!
//! let data = Dataset::new()
//!     .with_subject(Subject::new("CS101", "CS").with_sessions_per_week(3))
//!     .with_faculty(Faculty::new("F1", "CS"))
//!     .with_room(Room::classroom("R1", 40));
//! let optimizer = Optimizer::new(Arc::new(InMemoryStore::new(data)));
//! let config = OptimizationConfig::default()
//!     .with_seed(42)
//!     .with_genetic(GaConfig::default().with_population_size(20).with_generations(20));
//!
//! let handle = optimizer.start_run(StrategyKind::Hybrid, config);
//! assert_eq!(handle.wait(), RunStatus::Completed);
//! assert_eq!(handle.result().unwrap().metrics.total_conflicts, 0);
//! ```
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"

pub mod config;
pub mod conflict;
pub mod controller;
pub mod error;
pub mod fitness;
pub mod ga;
pub mod generator;
pub mod models;
pub mod problem;
pub mod sa;
pub mod scheduler;
pub mod validation;

pub use error::{Error, Result};
