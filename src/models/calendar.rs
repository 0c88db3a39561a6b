//! Weekly calendar models: weekdays, hour windows, and the time slot grid.
//!
//! # Time Model
//! Times of day are minutes since midnight (`0..=1440`). A week is a set of
//! [`Weekday`]s; the slot grid is the cartesian product of teaching days and
//! periods, generated once per run and treated as a closed set.
//!
//! # Intervals
//! [`TimeWindow`] is half-open: includes start, excludes end.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Minutes in a day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Day of the teaching week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// Monday through Saturday, the default teaching week.
    pub const TEACHING_WEEK: [Weekday; 6] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];

    /// Three-letter uppercase code, used in generated slot ids.
    pub fn code(self) -> &'static str {
        match self {
            Weekday::Monday => "MON",
            Weekday::Tuesday => "TUE",
            Weekday::Wednesday => "WED",
            Weekday::Thursday => "THU",
            Weekday::Friday => "FRI",
            Weekday::Saturday => "SAT",
            Weekday::Sunday => "SUN",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A time-of-day interval [start, end) in minutes since midnight.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeWindow {
    /// Interval start (minutes, inclusive).
    pub start_minute: u32,
    /// Interval end (minutes, exclusive).
    pub end_minute: u32,
}

impl TimeWindow {
    /// Creates a new window.
    pub fn new(start_minute: u32, end_minute: u32) -> Self {
        Self {
            start_minute,
            end_minute,
        }
    }

    /// Creates a window from whole hours, e.g. `hours(8, 12)` is 08:00–12:00.
    pub fn hours(start_hour: u32, end_hour: u32) -> Self {
        Self::new(start_hour * 60, end_hour * 60)
    }

    /// The whole day.
    pub fn all_day() -> Self {
        Self::new(0, MINUTES_PER_DAY)
    }

    /// Duration of this window (minutes).
    #[inline]
    pub fn duration_minutes(&self) -> u32 {
        self.end_minute.saturating_sub(self.start_minute)
    }

    /// Whether a minute-of-day falls within this window.
    #[inline]
    pub fn contains(&self, minute: u32) -> bool {
        minute >= self.start_minute && minute < self.end_minute
    }

    /// Whether `[start, end)` lies entirely inside this window.
    pub fn covers(&self, start_minute: u32, end_minute: u32) -> bool {
        start_minute >= self.start_minute && end_minute <= self.end_minute
    }

    /// Whether two windows overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start_minute < other.end_minute && other.start_minute < self.end_minute
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self::all_day()
    }
}

/// One cell of the weekly slot grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Unique slot identifier.
    pub id: String,
    /// Day of week.
    pub day: Weekday,
    /// Start (minutes since midnight).
    pub start_minute: u32,
    /// End (minutes since midnight, exclusive).
    pub end_minute: u32,
    /// Display label, e.g. "Period 3".
    pub label: String,
}

impl TimeSlot {
    /// Creates a slot.
    pub fn new(id: impl Into<String>, day: Weekday, start_minute: u32, end_minute: u32) -> Self {
        Self {
            id: id.into(),
            day,
            start_minute,
            end_minute,
            label: String::new(),
        }
    }

    /// Sets the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Slot length in minutes.
    #[inline]
    pub fn duration_minutes(&self) -> u32 {
        self.end_minute.saturating_sub(self.start_minute)
    }

    /// Slot length in hours (teaching load unit).
    #[inline]
    pub fn duration_hours(&self) -> f64 {
        self.duration_minutes() as f64 / 60.0
    }

    /// The slot as a time-of-day window.
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start_minute, self.end_minute)
    }

    /// Whether `other` starts exactly when this slot ends on the same day.
    pub fn is_followed_by(&self, other: &TimeSlot) -> bool {
        self.day == other.day && self.end_minute == other.start_minute
    }
}

/// Generator settings for the weekly slot grid.
///
/// The default is Monday–Saturday, eight 60-minute periods from 08:00 with a
/// 60-minute break after the fourth period (08–12, 13–17).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SlotGridConfig {
    /// Teaching days, in order.
    pub days: Vec<Weekday>,
    /// Periods per day.
    pub periods_per_day: u32,
    /// First period start (minutes since midnight).
    pub day_start_minute: u32,
    /// Period length (minutes).
    pub period_minutes: u32,
    /// Insert a break after this many periods (1-based), if set.
    pub break_after_period: Option<u32>,
    /// Break length (minutes).
    pub break_minutes: u32,
}

impl Default for SlotGridConfig {
    fn default() -> Self {
        Self {
            days: Weekday::TEACHING_WEEK.to_vec(),
            periods_per_day: 8,
            day_start_minute: 8 * 60,
            period_minutes: 60,
            break_after_period: Some(4),
            break_minutes: 60,
        }
    }
}

impl SlotGridConfig {
    /// Generates the slot grid.
    ///
    /// Deterministic: ids are `{DAY}-P{n}` in day-major, period-minor order.
    /// Periods that would run past midnight are dropped.
    pub fn generate(&self) -> Vec<TimeSlot> {
        let mut slots = Vec::with_capacity(self.days.len() * self.periods_per_day as usize);
        for &day in &self.days {
            let mut start = self.day_start_minute;
            for period in 1..=self.periods_per_day {
                let Some(end) = start
                    .checked_add(self.period_minutes)
                    .filter(|&end| end <= MINUTES_PER_DAY)
                else {
                    break;
                };
                slots.push(
                    TimeSlot::new(format!("{}-P{period}", day.code()), day, start, end)
                        .with_label(format!("Period {period}")),
                );
                start = end;
                if self.break_after_period == Some(period) {
                    start = start.saturating_add(self.break_minutes);
                }
            }
        }
        slots
    }
}
