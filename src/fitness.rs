//! Schedule fitness evaluation.
//!
//! Scores are higher-is-better. A schedule's score is a base of 100, a hard
//! part that loses a fixed penalty `W` per conflicting pair, and a soft part
//! in `[-SOFT_RANGE, SOFT_RANGE]`:
//!
//! ```text
//! score = max(0, 100 + W·(P − c) + soft)
//! ```
//!
//! where `c` is the conflict count and `P = n(n−1)/2` is the largest
//! possible count for `n` entries. `W` exceeds the whole soft span, so one
//! conflict fewer always outranks any soft improvement, and the score never
//! goes negative.
//!
//! The soft part is the weighted mean of four terms, each in `[-1, 1]`:
//!
//! | Term | Items |
//! |------|-------|
//! | workload | +0.25 per faculty-day / faculty-week within limits, −1.0 over |
//! | workload (optional) | back-to-back, weekly balance, and travel penalties |
//! | room fit | +0.3 capacity within 1–1.5× class size, −1.0 undersized, −0.1 oversized |
//! | time preference | 1.0 when the slot starts in the session type's preferred window |
//! | constraint priority | −Σ priority weight / (5n) |
//!
//! # Reference
//! Burke & Petrovic (2002), "Recent research directions in automated
//! timetabling", EJOR 140(2)

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::config::{ConstraintWeights, OptimizationConfig, PreferenceWindows, Preferences};
use crate::conflict::{conflicts_with_any, count_conflicts};
use crate::models::{
    Constraint, Faculty, Priority, Room, Schedule, ScheduleEntry, Subject, TimeSlot, Weekday,
};
use crate::problem::TimetableProblem;

/// Half-width of the soft score range.
pub const SOFT_RANGE: f64 = 100.0;

const BASE_SCORE: f64 = 100.0;
const WITHIN_LIMIT: f64 = 0.25;
const OVER_LIMIT: f64 = -1.0;
const PREFERENCE_PENALTY: f64 = -0.5;
const ROOM_FIT: f64 = 0.3;
const ROOM_UNDERSIZED: f64 = -1.0;
const ROOM_OVERSIZED: f64 = -0.1;
const ROOM_SLACK: f64 = 1.5;
const EPS: f64 = 1e-9;

/// Per-term score detail.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Conflicting pairs.
    pub conflicts: usize,
    /// Workload term, `[-1, 1]`.
    pub workload: f64,
    /// Room fit term, `[-1, 1]`.
    pub room_fit: f64,
    /// Time preference term, `[0, 1]`.
    pub time_preference: f64,
    /// Constraint priority term, `[-1, 0]`.
    pub constraint_priority: f64,
    /// Weighted soft part, `[-SOFT_RANGE, SOFT_RANGE]`.
    pub soft: f64,
    /// Total score.
    pub score: f64,
    /// Display quality, 0–100.
    pub quality: f64,
}

/// A reason an entry is penalized by the constraint term.
#[derive(Debug, Clone, PartialEq)]
pub enum Violation<'a> {
    /// An institutional constraint matches the entry.
    Constraint(&'a Constraint),
    /// The faculty member is not available for the slot.
    FacultyUnavailable,
    /// The room is not bookable for the slot.
    RoomUnavailable,
    /// The entry references an unknown subject, faculty, room, or slot.
    UnknownReference,
}

impl Violation<'_> {
    /// Penalty weight; availability breaches count as high priority.
    pub fn weight(&self) -> f64 {
        match self {
            Violation::Constraint(c) => c.penalty(),
            _ => Priority::High.weight(),
        }
    }
}

struct Resolved<'p> {
    subject: Option<&'p Subject>,
    faculty: Option<&'p Faculty>,
    room: Option<&'p Room>,
    slot: Option<&'p TimeSlot>,
}

/// Scores schedules against one problem.
#[derive(Debug, Clone)]
pub struct FitnessEvaluator<'p> {
    problem: &'p TimetableProblem,
    weights: ConstraintWeights,
    preferences: Preferences,
    windows: PreferenceWindows,
    grid_days: Vec<Weekday>,
}

impl<'p> FitnessEvaluator<'p> {
    /// Creates an evaluator with the configured weights and preferences.
    pub fn new(problem: &'p TimetableProblem, config: &OptimizationConfig) -> Self {
        let grid_days: BTreeSet<Weekday> = problem.time_slots().iter().map(|s| s.day).collect();
        Self {
            problem,
            weights: config.weights.clone(),
            preferences: config.preferences.clone(),
            windows: config.windows.clone(),
            grid_days: grid_days.into_iter().collect(),
        }
    }

    /// The scored problem.
    pub fn problem(&self) -> &'p TimetableProblem {
        self.problem
    }

    /// Penalty per conflicting pair.
    pub fn conflict_penalty(&self) -> f64 {
        2.0 * SOFT_RANGE + 1.0 + self.weights.conflict * 20.0
    }

    /// Total score of a schedule.
    pub fn score(&self, schedule: &Schedule) -> f64 {
        self.score_entries(&schedule.entries)
    }

    /// Total score of an entry list.
    pub fn score_entries(&self, entries: &[ScheduleEntry]) -> f64 {
        self.breakdown_entries(entries).score
    }

    /// Minimization view of the score: `100 − score`.
    pub fn cost(&self, entries: &[ScheduleEntry]) -> f64 {
        BASE_SCORE - self.score_entries(entries)
    }

    /// Every term of a schedule's score.
    pub fn breakdown(&self, schedule: &Schedule) -> ScoreBreakdown {
        self.breakdown_entries(&schedule.entries)
    }

    /// Every term of an entry list's score.
    pub fn breakdown_entries(&self, entries: &[ScheduleEntry]) -> ScoreBreakdown {
        let resolved: Vec<Resolved<'p>> = entries.iter().map(|e| self.resolve(e)).collect();
        let conflicts = count_conflicts(entries);

        let workload = self.workload_term(entries, &resolved);
        let room_fit = mean(resolved.iter().filter_map(|r| Some(room_fit(r.subject?, r.room?))));
        let time_preference =
            mean(resolved.iter().filter_map(|r| self.time_fit(r.subject?, r.slot?)));
        let penalty: f64 = entries
            .iter()
            .zip(&resolved)
            .map(|(e, r)| self.violations_of(e, r).iter().map(Violation::weight).sum::<f64>())
            .sum();
        let constraint_priority = if entries.is_empty() {
            0.0
        } else {
            -(penalty / (Priority::High.weight() * entries.len() as f64)).min(1.0)
        };

        let soft =
            SOFT_RANGE * self.weighted(workload, room_fit, time_preference, constraint_priority);
        let n = entries.len() as f64;
        let max_pairs = n * (n - 1.0).max(0.0) / 2.0;
        let hard = self.conflict_penalty() * (max_pairs - conflicts as f64);
        let score = (BASE_SCORE + hard + soft).max(0.0);
        let quality = ((BASE_SCORE + soft) / 2.0 - 10.0 * conflicts as f64).clamp(0.0, 100.0);

        ScoreBreakdown {
            conflicts,
            workload,
            room_fit,
            time_preference,
            constraint_priority,
            soft,
            score,
            quality,
        }
    }

    /// Contribution of `candidate` as a tentative addition to `placed`.
    ///
    /// Zero when the candidate conflicts with a placed entry, its faculty or
    /// room is unavailable for the slot, or it references an unknown entity.
    /// Otherwise `100 + 50 × weighted mean` of the per-entry terms, so every
    /// admissible candidate scores in `[50, 150]`.
    pub fn entry_score(&self, placed: &[ScheduleEntry], candidate: &ScheduleEntry) -> f64 {
        let r = self.resolve(candidate);
        let (Some(subject), Some(faculty), Some(room), Some(slot)) =
            (r.subject, r.faculty, r.room, r.slot)
        else {
            return 0.0;
        };
        if !faculty.is_available(slot)
            || !room.is_available(slot)
            || conflicts_with_any(placed, candidate)
        {
            return 0.0;
        }

        let hours = slot.duration_hours();
        let (mut day_hours, mut week_hours) = (hours, hours);
        let mut adjacency = 0.0;
        for e in placed.iter().filter(|e| e.faculty_id == candidate.faculty_id) {
            let Some(other) = self.problem.slot(&e.time_slot_id) else {
                continue;
            };
            week_hours += other.duration_hours();
            if other.day != slot.day {
                continue;
            }
            day_hours += other.duration_hours();
            if other.is_followed_by(slot) || slot.is_followed_by(other) {
                if self.preferences.avoid_back_to_back {
                    adjacency += PREFERENCE_PENALTY;
                }
                if self.preferences.minimize_faculty_travel && e.room_id != candidate.room_id {
                    adjacency += PREFERENCE_PENALTY;
                }
            }
        }
        let workload = ((limit_item(day_hours, faculty.max_hours_per_day)
            + limit_item(week_hours, faculty.max_hours_per_week)
            + adjacency)
            / 2.0)
            .clamp(-1.0, 1.0);

        let penalty: f64 = self
            .violations_of(candidate, &r)
            .iter()
            .map(Violation::weight)
            .sum();
        let constraint = -(penalty / Priority::High.weight()).min(1.0);

        let mean = self.weighted(
            workload,
            room_fit(subject, room),
            self.time_fit(subject, slot).unwrap_or(0.0),
            constraint,
        );
        BASE_SCORE + 50.0 * mean
    }

    /// Everything the constraint term penalizes for one entry.
    pub fn violations(&self, entry: &ScheduleEntry) -> Vec<Violation<'p>> {
        let r = self.resolve(entry);
        self.violations_of(entry, &r)
    }

    fn violations_of(&self, entry: &ScheduleEntry, r: &Resolved<'p>) -> Vec<Violation<'p>> {
        let mut out = Vec::new();
        let (Some(_), Some(faculty), Some(room), Some(slot)) =
            (r.subject, r.faculty, r.room, r.slot)
        else {
            out.push(Violation::UnknownReference);
            return out;
        };
        if !faculty.is_available(slot) {
            out.push(Violation::FacultyUnavailable);
        }
        if !room.is_available(slot) {
            out.push(Violation::RoomUnavailable);
        }
        out.extend(
            self.problem
                .constraints()
                .iter()
                .filter(|c| c.is_violated_by(entry, slot))
                .map(Violation::Constraint),
        );
        out
    }

    fn resolve(&self, entry: &ScheduleEntry) -> Resolved<'p> {
        Resolved {
            subject: self.problem.subject(&entry.subject_id),
            faculty: self.problem.faculty_member(&entry.faculty_id),
            room: self.problem.room(&entry.room_id),
            slot: self.problem.slot(&entry.time_slot_id),
        }
    }

    fn weighted(&self, workload: f64, room_fit: f64, time_preference: f64, constraint: f64) -> f64 {
        let w = &self.weights;
        let total = w.soft_total();
        if total <= 0.0 {
            return 0.0;
        }
        (w.workload * workload
            + w.room_fit * room_fit
            + w.time_preference * time_preference
            + w.constraint_priority * constraint)
            / total
    }

    /// 1.0 inside the preferred window, 0.0 outside, `None` without preference.
    fn time_fit(&self, subject: &Subject, slot: &TimeSlot) -> Option<f64> {
        let window = self.windows.preferred(subject.session_type, &self.preferences)?;
        Some(if window.contains(slot.start_minute) { 1.0 } else { 0.0 })
    }

    fn workload_term(&self, entries: &[ScheduleEntry], resolved: &[Resolved<'p>]) -> f64 {
        // BTreeMap keeps float summation order stable across runs.
        let mut daily: BTreeMap<(&str, Weekday), f64> = BTreeMap::new();
        let mut weekly: BTreeMap<&str, (&Faculty, f64)> = BTreeMap::new();
        let mut placed: BTreeMap<&str, Vec<(&TimeSlot, &str)>> = BTreeMap::new();

        for (e, r) in entries.iter().zip(resolved) {
            let (Some(faculty), Some(slot)) = (r.faculty, r.slot) else {
                continue;
            };
            let hours = slot.duration_hours();
            *daily.entry((faculty.id.as_str(), slot.day)).or_insert(0.0) += hours;
            weekly.entry(faculty.id.as_str()).or_insert((faculty, 0.0)).1 += hours;
            placed
                .entry(faculty.id.as_str())
                .or_default()
                .push((slot, e.room_id.as_str()));
        }
        if weekly.is_empty() {
            return 0.0;
        }

        let mut sum = 0.0;
        let mut items = 0usize;
        for (&(fid, _), &hours) in &daily {
            let limit = weekly[fid].0.max_hours_per_day;
            sum += limit_item(hours, limit);
            items += 1;
        }
        for (faculty, hours) in weekly.values() {
            sum += limit_item(*hours, faculty.max_hours_per_week);
            items += 1;
        }

        let prefs = &self.preferences;
        if prefs.avoid_back_to_back || prefs.minimize_faculty_travel {
            for slots in placed.values_mut() {
                slots.sort_by_key(|(s, _)| (s.day, s.start_minute));
                for pair in slots.windows(2) {
                    let ((a, room_a), (b, room_b)) = (pair[0], pair[1]);
                    if !a.is_followed_by(b) {
                        continue;
                    }
                    if prefs.avoid_back_to_back {
                        sum += PREFERENCE_PENALTY;
                    }
                    if prefs.minimize_faculty_travel && room_a != room_b {
                        sum += PREFERENCE_PENALTY;
                    }
                }
            }
        }

        if prefs.balance_weekly_load {
            for (fid, (faculty, _)) in &weekly {
                let mut days: BTreeSet<Weekday> = self
                    .grid_days
                    .iter()
                    .copied()
                    .filter(|d| faculty.works_on(*d))
                    .collect();
                days.extend(
                    daily
                        .range((*fid, Weekday::Monday)..=(*fid, Weekday::Sunday))
                        .map(|((_, d), _)| *d),
                );
                let loads: Vec<f64> = days
                    .iter()
                    .map(|d| daily.get(&(*fid, *d)).copied().unwrap_or(0.0))
                    .collect();
                let max = loads.iter().copied().fold(0.0, f64::max);
                if max > 0.0 {
                    let avg = loads.iter().sum::<f64>() / loads.len() as f64;
                    sum += PREFERENCE_PENALTY * (max - avg) / max;
                }
            }
        }

        (sum / items as f64).clamp(-1.0, 1.0)
    }
}

fn limit_item(hours: f64, limit: u32) -> f64 {
    if hours <= limit as f64 + EPS {
        WITHIN_LIMIT
    } else {
        OVER_LIMIT
    }
}

fn room_fit(subject: &Subject, room: &Room) -> f64 {
    let size = subject.expected_enrollment as f64;
    let capacity = room.capacity as f64;
    if capacity < size {
        ROOM_UNDERSIZED
    } else if capacity <= size * ROOM_SLACK {
        ROOM_FIT
    } else {
        ROOM_OVERSIZED
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
