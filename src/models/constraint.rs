//! Institutional scheduling constraints.
//!
//! A constraint forbids a target entity (faculty, room, subject, batch) from
//! a restricted part of the week. Constraints are soft-to-hard by priority:
//! every matching entry is penalized with the priority weight and reported,
//! never dropped.

use serde::{Deserialize, Serialize};

use super::{ScheduleEntry, TimeSlot, TimeWindow, Weekday};

/// Which entity a constraint targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    /// Target is a faculty id.
    FacultyUnavailable,
    /// Target is a room id.
    RoomUnavailable,
    /// Target is a subject id.
    SubjectTiming,
    /// Target is a batch label (`{department}_SEM{semester}`).
    BatchRestriction,
    /// Target matches any of faculty, room, subject, or batch.
    Custom,
}

/// The forbidden part of the week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Restriction {
    /// One specific slot.
    TimeSlot { time_slot_id: String },
    /// A whole day.
    Day { day: Weekday },
    /// An hours window on every day.
    Hours { window: TimeWindow },
}

/// Constraint priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Penalty weight (5:2:1).
    pub fn weight(self) -> f64 {
        match self {
            Priority::Low => 1.0,
            Priority::Medium => 2.0,
            Priority::High => 5.0,
        }
    }
}

/// A scheduling constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    /// Unique constraint identifier.
    pub id: String,
    /// Target classification.
    pub kind: ConstraintKind,
    /// Targeted entity id (or batch label).
    pub target_id: String,
    /// Forbidden part of the week.
    pub restriction: Restriction,
    /// Priority.
    pub priority: Priority,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
}

impl Constraint {
    /// Creates a constraint.
    pub fn new(
        id: impl Into<String>,
        kind: ConstraintKind,
        target_id: impl Into<String>,
        restriction: Restriction,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            target_id: target_id.into(),
            restriction,
            priority: Priority::Medium,
            description: String::new(),
        }
    }

    /// Faculty member may not teach in the given slot.
    pub fn faculty_unavailable(
        id: impl Into<String>,
        faculty_id: impl Into<String>,
        time_slot_id: impl Into<String>,
    ) -> Self {
        Self::new(
            id,
            ConstraintKind::FacultyUnavailable,
            faculty_id,
            Restriction::TimeSlot {
                time_slot_id: time_slot_id.into(),
            },
        )
    }

    /// Room may not be booked on the given day.
    pub fn room_closed_on(id: impl Into<String>, room_id: impl Into<String>, day: Weekday) -> Self {
        Self::new(id, ConstraintKind::RoomUnavailable, room_id, Restriction::Day { day })
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Whether `entry` involves the targeted entity.
    pub fn targets(&self, entry: &ScheduleEntry) -> bool {
        let t = self.target_id.as_str();
        match self.kind {
            ConstraintKind::FacultyUnavailable => entry.faculty_id == t,
            ConstraintKind::RoomUnavailable => entry.room_id == t,
            ConstraintKind::SubjectTiming => entry.subject_id == t,
            ConstraintKind::BatchRestriction => entry.batch == t,
            ConstraintKind::Custom => {
                entry.faculty_id == t
                    || entry.room_id == t
                    || entry.subject_id == t
                    || entry.batch == t
            }
        }
    }

    /// Whether the restriction covers `slot`.
    pub fn restricts(&self, slot: &TimeSlot) -> bool {
        match &self.restriction {
            Restriction::TimeSlot { time_slot_id } => slot.id == *time_slot_id,
            Restriction::Day { day } => slot.day == *day,
            Restriction::Hours { window } => window.overlaps(&slot.window()),
        }
    }

    /// Whether `entry` placed in `slot` violates this constraint.
    pub fn is_violated_by(&self, entry: &ScheduleEntry, slot: &TimeSlot) -> bool {
        self.targets(entry) && self.restricts(slot)
    }

    /// Penalty weight for one violation.
    pub fn penalty(&self) -> f64 {
        self.priority.weight()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SessionType, WeekType};

    fn entry() -> ScheduleEntry {
        ScheduleEntry {
            subject_id: "CS101".into(),
            faculty_id: "F1".into(),
            room_id: "R1".into(),
            time_slot_id: "MON-P1".into(),
            batch: "CS_SEM1".into(),
            week_type: WeekType::Both,
            session_type: SessionType::Lecture,
        }
    }

    #[test]
    fn test_priority_weights() {
        assert!((Priority::High.weight() - 5.0).abs() < 1e-10);
        assert!((Priority::Medium.weight() - 2.0).abs() < 1e-10);
        assert!((Priority::Low.weight() - 1.0).abs() < 1e-10);
        assert!(Priority::High > Priority::Low);
    }

    #[test]
    fn test_faculty_slot_constraint() {
        let c = Constraint::faculty_unavailable("C1", "F1", "MON-P1").with_priority(Priority::High);
        let mon1 = TimeSlot::new("MON-P1", Weekday::Monday, 480, 540);
        let mon2 = TimeSlot::new("MON-P2", Weekday::Monday, 540, 600);
        assert!(c.is_violated_by(&entry(), &mon1));
        assert!(!c.is_violated_by(&entry(), &mon2));

        let mut other = entry();
        other.faculty_id = "F2".into();
        assert!(!c.is_violated_by(&other, &mon1));
    }

    #[test]
    fn test_day_and_hours_restrictions() {
        let c = Constraint::room_closed_on("C2", "R1", Weekday::Monday);
        let mon = TimeSlot::new("MON-P1", Weekday::Monday, 480, 540);
        let tue = TimeSlot::new("TUE-P1", Weekday::Tuesday, 480, 540);
        assert!(c.is_violated_by(&entry(), &mon));
        assert!(!c.is_violated_by(&entry(), &tue));

        let late = Constraint::new(
            "C3",
            ConstraintKind::BatchRestriction,
            "CS_SEM1",
            Restriction::Hours {
                window: TimeWindow::hours(8, 9),
            },
        );
        assert!(late.is_violated_by(&entry(), &tue));
    }

    #[test]
    fn test_custom_matches_any_target() {
        let c = Constraint::new(
            "C4",
            ConstraintKind::Custom,
            "CS101",
            Restriction::Day {
                day: Weekday::Monday,
            },
        );
        assert!(c.targets(&entry()));
        assert!((c.penalty() - 2.0).abs() < 1e-10); // Medium default
    }

    #[test]
    fn test_restriction_serde_tag() {
        let r = Restriction::TimeSlot {
            time_slot_id: "MON-P1".into(),
        };
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains("\"type\":\"time_slot\""));
        let back: Restriction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }
}
