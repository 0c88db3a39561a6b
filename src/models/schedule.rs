//! Schedule (solution) model.
//!
//! A schedule is an ordered list of entries, one per placed session, plus an
//! explicit record of the sessions that could not be placed. Entries are the
//! atomic scheduling decision: subject × faculty × room × time slot.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::{SessionType, Subject};

/// Which weeks of the term an entry runs in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekType {
    Odd,
    Even,
    #[default]
    Both,
}

/// One placed session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Subject taught.
    pub subject_id: String,
    /// Faculty teaching.
    pub faculty_id: String,
    /// Room hosting.
    pub room_id: String,
    /// Slot occupied.
    pub time_slot_id: String,
    /// Student batch (`{department}_SEM{semester}`).
    pub batch: String,
    /// Odd/even/both weeks.
    #[serde(default)]
    pub week_type: WeekType,
    /// Session type (copied from the subject).
    pub session_type: SessionType,
}

impl ScheduleEntry {
    /// Creates an entry for `subject`, deriving batch and session type.
    pub fn new(
        subject: &Subject,
        faculty_id: impl Into<String>,
        room_id: impl Into<String>,
        time_slot_id: impl Into<String>,
    ) -> Self {
        Self {
            subject_id: subject.id.clone(),
            faculty_id: faculty_id.into(),
            room_id: room_id.into(),
            time_slot_id: time_slot_id.into(),
            batch: subject.batch(),
            week_type: WeekType::Both,
            session_type: subject.session_type,
        }
    }

    /// Sets the week type.
    pub fn with_week_type(mut self, week_type: WeekType) -> Self {
        self.week_type = week_type;
        self
    }
}

/// Why a session has no entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedReason {
    /// No faculty member may teach the subject.
    NoEligibleFaculty,
    /// No room accepts the session type.
    NoEligibleRoom,
    /// The slot grid is empty.
    NoTimeSlots,
    /// Every candidate placement was excluded (conflict or unavailability).
    NoFeasibleSlot,
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UnresolvedReason::NoEligibleFaculty => "no eligible faculty",
            UnresolvedReason::NoEligibleRoom => "no eligible room",
            UnresolvedReason::NoTimeSlots => "no time slots",
            UnresolvedReason::NoFeasibleSlot => "no conflict-free slot",
        };
        f.write_str(s)
    }
}

/// A required session that the schedule does not contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedSession {
    /// Subject.
    pub subject_id: String,
    /// Session number within the week (1-based).
    pub session: u32,
    /// Cause.
    pub reason: UnresolvedReason,
}

impl fmt::Display for UnresolvedSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} session {}: {}", self.subject_id, self.session, self.reason)
    }
}

/// A timetable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Placed sessions.
    pub entries: Vec<ScheduleEntry>,
    /// Sessions that could not be placed.
    #[serde(default)]
    pub unresolved: Vec<UnresolvedSession>,
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a schedule from entries.
    pub fn from_entries(entries: Vec<ScheduleEntry>) -> Self {
        Self {
            entries,
            unresolved: Vec::new(),
        }
    }

    /// Adds an entry.
    pub fn add_entry(&mut self, entry: ScheduleEntry) {
        self.entries.push(entry);
    }

    /// Records an unresolved session.
    pub fn add_unresolved(&mut self, session: UnresolvedSession) {
        self.unresolved.push(session);
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether every required session was placed.
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }

    /// Entries for a subject.
    pub fn entries_for_subject(&self, subject_id: &str) -> Vec<&ScheduleEntry> {
        self.entries
            .iter()
            .filter(|e| e.subject_id == subject_id)
            .collect()
    }

    /// Entries taught by a faculty member.
    pub fn entries_for_faculty(&self, faculty_id: &str) -> Vec<&ScheduleEntry> {
        self.entries
            .iter()
            .filter(|e| e.faculty_id == faculty_id)
            .collect()
    }

    /// Entries hosted in a room.
    pub fn entries_for_room(&self, room_id: &str) -> Vec<&ScheduleEntry> {
        self.entries.iter().filter(|e| e.room_id == room_id).collect()
    }

    /// Entry count per faculty id.
    pub fn sessions_by_faculty(&self) -> HashMap<&str, usize> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for e in &self.entries {
            *counts.entry(e.faculty_id.as_str()).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schedule() -> Schedule {
        let cs = Subject::new("CS101", "CS").with_semester(2);
        let lab = Subject::new("CS102", "CS")
            .with_semester(2)
            .with_session_type(SessionType::Lab);
        let mut s = Schedule::new();
        s.add_entry(ScheduleEntry::new(&cs, "F1", "R1", "MON-P1"));
        s.add_entry(ScheduleEntry::new(&cs, "F1", "R1", "TUE-P1"));
        s.add_entry(ScheduleEntry::new(&lab, "F2", "L1", "MON-P5"));
        s
    }

    #[test]
    fn test_entry_derives_batch_and_type() {
        let lab = Subject::new("CS102", "CS")
            .with_semester(4)
            .with_session_type(SessionType::Lab);
        let e = ScheduleEntry::new(&lab, "F1", "L1", "MON-P1");
        assert_eq!(e.batch, "CS_SEM4");
        assert_eq!(e.session_type, SessionType::Lab);
        assert_eq!(e.week_type, WeekType::Both);
        let odd = e.with_week_type(WeekType::Odd);
        assert_eq!(odd.week_type, WeekType::Odd);
    }

    #[test]
    fn test_schedule_queries() {
        let s = sample_schedule();
        assert_eq!(s.len(), 3);
        assert_eq!(s.entries_for_subject("CS101").len(), 2);
        assert_eq!(s.entries_for_faculty("F2").len(), 1);
        assert_eq!(s.entries_for_room("R1").len(), 2);
        assert_eq!(s.sessions_by_faculty()["F1"], 2);
    }

    #[test]
    fn test_completeness() {
        let mut s = sample_schedule();
        assert!(s.is_complete());
        s.add_unresolved(UnresolvedSession {
            subject_id: "CS103".into(),
            session: 1,
            reason: UnresolvedReason::NoEligibleRoom,
        });
        assert!(!s.is_complete());
        assert_eq!(s.unresolved[0].to_string(), "CS103 session 1: no eligible room");
    }

    #[test]
    fn test_empty_schedule() {
        let s = Schedule::new();
        assert!(s.is_empty());
        assert!(s.is_complete());
        assert!(s.sessions_by_faculty().is_empty());
    }

    #[test]
    fn test_schedule_serde() {
        let s = sample_schedule();
        let json = serde_json::to_string(&s).unwrap();
        let back: Schedule = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
