//! Timetable quality metrics (KPIs) and the run report.
//!
//! Computes summary indicators from a finished schedule and classifies the
//! outcome into improvements and warnings.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Total conflicts | Conflicting entry pairs |
//! | Faculty utilization | Assigned teaching hours / Σ weekly limits, capped at 100% |
//! | Room utilization | Occupied (room, slot) pairs / (rooms × slots) |
//! | Student satisfaction | Entries fitting the room, in the preferred window, clash-free |
//! | Overall score | Fitness quality, 0–100 |
//!
//! A report never claims a clean result while conflicts remain: every
//! conflict, overload, unresolved session, and constraint violation is
//! itemized as a warning.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::config::OptimizationConfig;
use crate::conflict::{find_conflicts, ConflictKind};
use crate::fitness::{FitnessEvaluator, Violation};
use crate::models::{Schedule, Weekday};

const GOOD_FACULTY_UTILIZATION: f64 = 70.0;
const GOOD_ROOM_UTILIZATION: f64 = 60.0;
const GOOD_SATISFACTION: f64 = 80.0;

/// Summary indicators of a schedule. Percentages are 0–100.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    pub total_conflicts: usize,
    pub faculty_utilization_pct: f64,
    pub room_utilization_pct: f64,
    pub student_satisfaction_pct: f64,
    pub overall_score: f64,
}

impl RunMetrics {
    /// Computes metrics for `schedule`.
    pub fn calculate(
        evaluator: &FitnessEvaluator<'_>,
        config: &OptimizationConfig,
        schedule: &Schedule,
    ) -> Self {
        let problem = evaluator.problem();
        let entries = &schedule.entries;
        let breakdown = evaluator.breakdown(schedule);

        // Faculty utilization
        let capacity: f64 = problem
            .faculty()
            .iter()
            .map(|f| f.max_hours_per_week as f64)
            .sum();
        let assigned: f64 = entries
            .iter()
            .filter(|e| problem.faculty_member(&e.faculty_id).is_some())
            .filter_map(|e| problem.slot(&e.time_slot_id))
            .map(|s| s.duration_hours())
            .sum();
        let faculty_utilization_pct = percent(assigned, capacity).min(100.0);

        // Room utilization
        let cells = problem.rooms().len() * problem.time_slots().len();
        let occupied: HashSet<(&str, &str)> = entries
            .iter()
            .filter(|e| {
                problem.room(&e.room_id).is_some() && problem.slot(&e.time_slot_id).is_some()
            })
            .map(|e| (e.room_id.as_str(), e.time_slot_id.as_str()))
            .collect();
        let room_utilization_pct = percent(occupied.len() as f64, cells as f64);

        // Student satisfaction
        let batch_clashes: HashSet<usize> = find_conflicts(entries)
            .into_iter()
            .filter(|c| c.kinds.contains(&ConflictKind::Batch))
            .flat_map(|c| [c.first, c.second])
            .collect();
        let satisfied = entries
            .iter()
            .enumerate()
            .filter(|(i, e)| {
                let (Some(subject), Some(room), Some(slot)) = (
                    problem.subject(&e.subject_id),
                    problem.room(&e.room_id),
                    problem.slot(&e.time_slot_id),
                ) else {
                    return false;
                };
                let in_window = config
                    .windows
                    .preferred(subject.session_type, &config.preferences)
                    .map_or(true, |w| w.contains(slot.start_minute));
                !batch_clashes.contains(i)
                    && room.capacity >= subject.expected_enrollment
                    && in_window
            })
            .count();
        let student_satisfaction_pct = percent(satisfied as f64, entries.len() as f64);

        Self {
            total_conflicts: breakdown.conflicts,
            faculty_utilization_pct,
            room_utilization_pct,
            student_satisfaction_pct,
            overall_score: breakdown.quality,
        }
    }
}

fn percent(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 {
        0.0
    } else {
        part / whole * 100.0
    }
}

/// Metrics plus the itemized classification of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub metrics: RunMetrics,
    pub improvements: Vec<String>,
    pub warnings: Vec<String>,
}

impl RunReport {
    /// Builds the report. `notes` are strategy remarks, appended as warnings.
    pub fn build(
        evaluator: &FitnessEvaluator<'_>,
        config: &OptimizationConfig,
        schedule: &Schedule,
        notes: &[String],
    ) -> Self {
        let metrics = RunMetrics::calculate(evaluator, config, schedule);
        let problem = evaluator.problem();
        let entries = &schedule.entries;

        let mut improvements = Vec::new();
        if metrics.total_conflicts == 0 && !entries.is_empty() {
            improvements.push("no scheduling conflicts".to_string());
        }
        if schedule.is_complete() && !entries.is_empty() {
            improvements.push(format!("all {} sessions placed", entries.len()));
        }
        if metrics.faculty_utilization_pct >= GOOD_FACULTY_UTILIZATION {
            improvements.push(format!(
                "high faculty utilization ({:.1}%)",
                metrics.faculty_utilization_pct
            ));
        }
        if metrics.room_utilization_pct >= GOOD_ROOM_UTILIZATION {
            improvements.push(format!(
                "high room utilization ({:.1}%)",
                metrics.room_utilization_pct
            ));
        }
        if metrics.student_satisfaction_pct >= GOOD_SATISFACTION {
            improvements.push(format!(
                "student satisfaction {:.1}%",
                metrics.student_satisfaction_pct
            ));
        }

        let mut warnings: Vec<String> = find_conflicts(entries)
            .iter()
            .map(|c| format!("conflict: {}", c.describe(entries)))
            .collect();

        // Overloaded faculty
        let mut daily: BTreeMap<(&str, Weekday), f64> = BTreeMap::new();
        let mut weekly: BTreeMap<&str, f64> = BTreeMap::new();
        for e in entries {
            if let Some(slot) = problem.slot(&e.time_slot_id) {
                let hours = slot.duration_hours();
                *daily.entry((e.faculty_id.as_str(), slot.day)).or_insert(0.0) += hours;
                *weekly.entry(e.faculty_id.as_str()).or_insert(0.0) += hours;
            }
        }
        for ((fid, day), hours) in &daily {
            if let Some(f) = problem.faculty_member(fid) {
                if *hours > f.max_hours_per_day as f64 {
                    warnings.push(format!(
                        "{fid} teaches {hours:.1}h on {day}, over the {}h daily limit",
                        f.max_hours_per_day
                    ));
                }
            }
        }
        for (fid, hours) in &weekly {
            if let Some(f) = problem.faculty_member(fid) {
                if *hours > f.max_hours_per_week as f64 {
                    warnings.push(format!(
                        "{fid} teaches {hours:.1}h this week, over the {}h weekly limit",
                        f.max_hours_per_week
                    ));
                }
            }
        }

        warnings.extend(schedule.unresolved.iter().map(|u| format!("unresolved: {u}")));

        let mut seen = BTreeSet::new();
        for e in entries {
            for v in evaluator.violations(e) {
                let message = match v {
                    Violation::Constraint(c) => format!(
                        "{} in {} violates constraint {} ({:?} priority)",
                        e.subject_id, e.time_slot_id, c.id, c.priority
                    ),
                    Violation::FacultyUnavailable => {
                        format!("{} is unavailable in {}", e.faculty_id, e.time_slot_id)
                    }
                    Violation::RoomUnavailable => {
                        format!("{} is unavailable in {}", e.room_id, e.time_slot_id)
                    }
                    Violation::UnknownReference => {
                        format!("{} references an unknown entity", e.subject_id)
                    }
                };
                if seen.insert(message.clone()) {
                    warnings.push(message);
                }
            }
        }

        warnings.extend(notes.iter().cloned());

        Self {
            metrics,
            improvements,
            warnings,
        }
    }

    /// Whether the run reported nothing to fix.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Constraint, Faculty, ScheduleEntry};
    use crate::problem::tests::small_dataset;
    use crate::problem::TimetableProblem;

    fn entry(
        p: &TimetableProblem,
        subject: &str,
        faculty: &str,
        room: &str,
        slot: &str,
    ) -> ScheduleEntry {
        ScheduleEntry::new(p.subject(subject).unwrap(), faculty, room, slot)
    }

    fn clean(p: &TimetableProblem) -> Schedule {
        Schedule::from_entries(vec![
            entry(p, "A", "F1", "R1", "MON-P1"),
            entry(p, "A", "F1", "R1", "MON-P2"),
            entry(p, "B", "F2", "L1", "MON-P5"),
        ])
    }

    #[test]
    fn test_metrics_clean_schedule() {
        let p = TimetableProblem::new(small_dataset());
        let config = OptimizationConfig::default();
        let eval = FitnessEvaluator::new(&p, &config);
        let m = RunMetrics::calculate(&eval, &config, &clean(&p));

        assert_eq!(m.total_conflicts, 0);
        // 3h of 40h weekly capacity
        assert!((m.faculty_utilization_pct - 7.5).abs() < 1e-9);
        // 3 of 2 × 5 cells
        assert!((m.room_utilization_pct - 30.0).abs() < 1e-9);
        assert!((m.student_satisfaction_pct - 100.0).abs() < 1e-9);
        assert!(m.overall_score > 0.0 && m.overall_score <= 100.0);
    }

    #[test]
    fn test_report_itemizes_problems() {
        let mut data = small_dataset()
            .with_constraint(Constraint::faculty_unavailable("C1", "F1", "MON-P1"));
        data.faculty[0] = Faculty::new("F1", "CS").with_limits(1, 20);
        let p = TimetableProblem::new(data);
        let config = OptimizationConfig::default();
        let eval = FitnessEvaluator::new(&p, &config);

        // A twice in MON-P1: faculty, room, and batch clash.
        let mut s = Schedule::from_entries(vec![
            entry(&p, "A", "F1", "R1", "MON-P1"),
            entry(&p, "A", "F1", "R1", "MON-P1"),
            entry(&p, "B", "F2", "L1", "MON-P5"),
        ]);
        s.add_unresolved(crate::models::UnresolvedSession {
            subject_id: "A".into(),
            session: 3,
            reason: crate::models::UnresolvedReason::NoFeasibleSlot,
        });
        let report = RunReport::build(&eval, &config, &s, &["budget reached".to_string()]);

        assert_eq!(report.metrics.total_conflicts, 1);
        assert!(!report.is_clean());
        assert!(!report.improvements.iter().any(|i| i == "no scheduling conflicts"));
        let has = |needle: &str| report.warnings.iter().any(|w| w.contains(needle));
        assert!(has("conflict: A and A clash in MON-P1 (faculty, room, batch)"));
        assert!(has("over the 1h daily limit"));
        assert!(has("unresolved: A session 3"));
        assert!(has("violates constraint C1"));
        assert!(has("budget reached"));
        // The constraint warning is reported once even though two entries match.
        assert_eq!(report.warnings.iter().filter(|w| w.contains("C1")).count(), 1);
    }

    #[test]
    fn test_report_clean_run() {
        let p = TimetableProblem::new(small_dataset());
        let config = OptimizationConfig::default();
        let eval = FitnessEvaluator::new(&p, &config);
        let report = RunReport::build(&eval, &config, &clean(&p), &[]);

        assert!(report.is_clean());
        assert!(report.improvements.contains(&"no scheduling conflicts".to_string()));
        assert!(report.improvements.contains(&"all 3 sessions placed".to_string()));
    }
}
