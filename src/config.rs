//! Run configuration.
//!
//! Loaded from TOML (or built in code) and validated before a run starts.
//!
//! # Example
//!
//! ```
//! use u_timetable::config::OptimizationConfig;
//! use u_timetable::scheduler::StrategyKind;
//!
//! let config = OptimizationConfig::from_toml_str(r#"
//!     strategy = "genetic"
//!     seed = 7
//!
//!     [genetic]
//!     population_size = 40
//!     generations = 50
//!
//!     [preferences]
//!     avoid_back_to_back = true
//! "#).unwrap();
//!
//! assert_eq!(config.strategy, StrategyKind::Genetic);
//! assert_eq!(config.genetic.population_size, 40);
//! assert!(config.preferences.avoid_back_to_back);
//! assert!(config.validate().is_ok());
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ga::GaConfig;
use crate::models::{SessionType, SlotGridConfig, TimeWindow, MINUTES_PER_DAY};
use crate::sa::SaConfig;
use crate::scheduler::StrategyKind;

/// Configuration loading error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// The five named fitness weights.
///
/// They must sum to [`OptimizationConfig::weight_total`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstraintWeights {
    /// Conflict avoidance. Scales the per-conflict penalty.
    pub conflict: f64,
    /// Faculty workload (daily/weekly limits and workload preferences).
    pub workload: f64,
    /// Room capacity fit.
    pub room_fit: f64,
    /// Time-of-day preference.
    pub time_preference: f64,
    /// Institutional constraint priority.
    pub constraint_priority: f64,
}

impl Default for ConstraintWeights {
    fn default() -> Self {
        Self {
            conflict: 40.0,
            workload: 20.0,
            room_fit: 15.0,
            time_preference: 15.0,
            constraint_priority: 10.0,
        }
    }
}

impl ConstraintWeights {
    /// Sum of all five weights.
    pub fn total(&self) -> f64 {
        self.conflict + self.soft_total()
    }

    /// Sum of the four soft weights.
    pub fn soft_total(&self) -> f64 {
        self.workload + self.room_fit + self.time_preference + self.constraint_priority
    }

    fn values(&self) -> [(&'static str, f64); 5] {
        [
            ("conflict", self.conflict),
            ("workload", self.workload),
            ("room_fit", self.room_fit),
            ("time_preference", self.time_preference),
            ("constraint_priority", self.constraint_priority),
        ]
    }
}

/// Preference toggles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub prefer_morning_lectures: bool,
    pub prefer_afternoon_labs: bool,
    pub avoid_back_to_back: bool,
    pub balance_weekly_load: bool,
    pub minimize_faculty_travel: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            prefer_morning_lectures: true,
            prefer_afternoon_labs: true,
            avoid_back_to_back: false,
            balance_weekly_load: true,
            minimize_faculty_travel: false,
        }
    }
}

/// Part of the teaching day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayPart {
    Morning,
    Afternoon,
}

/// Time-of-day windows for the preference bonus.
///
/// Lectures map to the morning and labs to the afternoon when the matching
/// toggle is on. Tutorials and seminars get a bonus only when a part of day
/// is configured for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferenceWindows {
    pub morning: TimeWindow,
    pub afternoon: TimeWindow,
    pub tutorial: Option<DayPart>,
    pub seminar: Option<DayPart>,
}

impl Default for PreferenceWindows {
    fn default() -> Self {
        Self {
            morning: TimeWindow::hours(8, 12),
            afternoon: TimeWindow::hours(12, 18),
            tutorial: None,
            seminar: None,
        }
    }
}

impl PreferenceWindows {
    /// Window for a part of day.
    pub fn window(&self, part: DayPart) -> TimeWindow {
        match part {
            DayPart::Morning => self.morning,
            DayPart::Afternoon => self.afternoon,
        }
    }

    /// Preferred window for a session type, if any preference applies.
    pub fn preferred(&self, session_type: SessionType, prefs: &Preferences) -> Option<TimeWindow> {
        let part = match session_type {
            SessionType::Lecture if prefs.prefer_morning_lectures => Some(DayPart::Morning),
            SessionType::Lab if prefs.prefer_afternoon_labs => Some(DayPart::Afternoon),
            SessionType::Tutorial => self.tutorial,
            SessionType::Seminar => self.seminar,
            _ => None,
        };
        part.map(|p| self.window(p))
    }
}

/// Search budget. Exceeding it ends the search with the best solution found.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Budget {
    /// Cap on iterations of every search loop.
    pub max_iterations: Option<usize>,
    /// Wall-clock limit for the whole run (seconds).
    pub time_limit_secs: Option<u64>,
}

impl Budget {
    /// Wall-clock limit, if configured.
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_secs.map(Duration::from_secs)
    }
}

/// Full run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizationConfig {
    /// Search strategy.
    pub strategy: StrategyKind,
    /// Random seed for reproducible runs. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Genetic algorithm settings.
    pub genetic: GaConfig,
    /// Simulated annealing settings.
    pub annealing: SaConfig,
    /// Fitness weights.
    pub weights: ConstraintWeights,
    /// Required sum of `weights`.
    pub weight_total: f64,
    /// Preference toggles.
    pub preferences: Preferences,
    /// Time-of-day windows.
    pub windows: PreferenceWindows,
    /// Search budget.
    pub budget: Budget,
    /// Slot grid used when the store provides none.
    pub grid: SlotGridConfig,
    /// Report progress every N iterations.
    pub progress_interval: usize,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            seed: None,
            genetic: GaConfig::default(),
            annealing: SaConfig::default(),
            weights: ConstraintWeights::default(),
            weight_total: 100.0,
            preferences: Preferences::default(),
            windows: PreferenceWindows::default(),
            budget: Budget::default(),
            grid: SlotGridConfig::default(),
            progress_interval: 10,
        }
    }
}

impl OptimizationConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Sets the strategy.
    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the GA settings.
    pub fn with_genetic(mut self, genetic: GaConfig) -> Self {
        self.genetic = genetic;
        self
    }

    /// Sets the SA settings.
    pub fn with_annealing(mut self, annealing: SaConfig) -> Self {
        self.annealing = annealing;
        self
    }

    /// Sets the preference toggles.
    pub fn with_preferences(mut self, preferences: Preferences) -> Self {
        self.preferences = preferences;
        self
    }

    /// Sets the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.budget.max_iterations = Some(max_iterations);
        self
    }

    /// Sets the wall-clock limit.
    pub fn with_time_limit_secs(mut self, seconds: u64) -> Self {
        self.budget.time_limit_secs = Some(seconds);
        self
    }

    /// SA iteration count: explicit, or the GA generation count.
    pub fn annealing_iterations(&self) -> usize {
        self.annealing.iterations.unwrap_or(self.genetic.generations)
    }

    /// Checks ranges and the weight total.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, w) in self.weights.values() {
            if !w.is_finite() || w < 0.0 {
                return Err(invalid(format!("weight '{name}' must be a non-negative number")));
            }
        }
        if (self.weights.total() - self.weight_total).abs() > 1e-6 {
            return Err(invalid(format!(
                "weights sum to {} but weight_total is {}",
                self.weights.total(),
                self.weight_total
            )));
        }
        self.genetic.validate().map_err(invalid)?;
        self.annealing.validate().map_err(invalid)?;
        if self.progress_interval == 0 {
            return Err(invalid("progress_interval must be at least 1"));
        }
        let windows = [
            ("morning", self.windows.morning),
            ("afternoon", self.windows.afternoon),
        ];
        for (name, w) in windows {
            if w.start_minute >= w.end_minute {
                return Err(invalid(format!("{name} window is empty")));
            }
        }
        if self.grid.period_minutes == 0 || self.grid.period_minutes > MINUTES_PER_DAY {
            return Err(invalid("grid.period_minutes must be in 1..=1440"));
        }
        if self.grid.day_start_minute >= MINUTES_PER_DAY {
            return Err(invalid("grid.day_start_minute must be before midnight"));
        }
        if self.grid.break_minutes > MINUTES_PER_DAY {
            return Err(invalid("grid.break_minutes must not exceed 1440"));
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(message.into())
}
