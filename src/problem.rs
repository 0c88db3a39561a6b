//! Read-only problem index over one dataset.
//!
//! Built once per run and shared immutably by every component: id lookups,
//! per-subject eligible faculty and rooms, and the canonical list of weekly
//! sessions. Search strategies represent a schedule as one entry per
//! placeable session, in [`TimetableProblem::sessions`] order.

use std::collections::HashMap;

use crate::models::{
    Constraint, Dataset, Faculty, Room, ScheduleEntry, Subject, TimeSlot, UnresolvedReason,
    UnresolvedSession,
};

/// One required weekly session of a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    /// Subject index.
    pub subject: usize,
    /// Session ordinal within the week (1-based).
    pub ordinal: u32,
}

/// Indexed view of a dataset.
#[derive(Debug, Clone)]
pub struct TimetableProblem {
    data: Dataset,
    subject_index: HashMap<String, usize>,
    faculty_index: HashMap<String, usize>,
    room_index: HashMap<String, usize>,
    slot_index: HashMap<String, usize>,
    subject_batch: Vec<usize>,
    eligible_faculty: Vec<Vec<usize>>,
    eligible_rooms: Vec<Vec<usize>>,
    sessions: Vec<Session>,
    unplaceable: Vec<UnresolvedSession>,
}

fn index_by<T>(items: &[T], id: impl Fn(&T) -> &str) -> HashMap<String, usize> {
    let mut map = HashMap::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        // First occurrence wins; duplicates are a validation error.
        map.entry(id(item).to_string()).or_insert(i);
    }
    map
}

impl TimetableProblem {
    /// Indexes a dataset.
    pub fn new(data: Dataset) -> Self {
        let subject_index = index_by(&data.subjects, |s| s.id.as_str());
        let faculty_index = index_by(&data.faculty, |f| f.id.as_str());
        let room_index = index_by(&data.rooms, |r| r.id.as_str());
        let slot_index = index_by(&data.time_slots, |t| t.id.as_str());

        let mut batches: HashMap<String, usize> = HashMap::new();
        let subject_batch = data
            .subjects
            .iter()
            .map(|s| {
                let next = batches.len();
                *batches.entry(s.batch()).or_insert(next)
            })
            .collect();

        let eligible_faculty: Vec<Vec<usize>> = data
            .subjects
            .iter()
            .map(|s| {
                data.faculty
                    .iter()
                    .enumerate()
                    .filter(|(_, f)| f.can_teach(s))
                    .map(|(i, _)| i)
                    .collect()
            })
            .collect();
        let eligible_rooms: Vec<Vec<usize>> = data
            .subjects
            .iter()
            .map(|s| {
                data.rooms
                    .iter()
                    .enumerate()
                    .filter(|(_, r)| r.accepts(s.session_type))
                    .map(|(i, _)| i)
                    .collect()
            })
            .collect();

        let mut sessions = Vec::new();
        let mut unplaceable = Vec::new();
        for (si, subject) in data.subjects.iter().enumerate() {
            let reason = if eligible_faculty[si].is_empty() {
                Some(UnresolvedReason::NoEligibleFaculty)
            } else if eligible_rooms[si].is_empty() {
                Some(UnresolvedReason::NoEligibleRoom)
            } else if data.time_slots.is_empty() {
                Some(UnresolvedReason::NoTimeSlots)
            } else {
                None
            };
            for ordinal in 1..=subject.sessions_per_week {
                match reason {
                    Some(reason) => unplaceable.push(UnresolvedSession {
                        subject_id: subject.id.clone(),
                        session: ordinal,
                        reason,
                    }),
                    None => sessions.push(Session {
                        subject: si,
                        ordinal,
                    }),
                }
            }
        }

        Self {
            data,
            subject_index,
            faculty_index,
            room_index,
            slot_index,
            subject_batch,
            eligible_faculty,
            eligible_rooms,
            sessions,
            unplaceable,
        }
    }

    /// The underlying dataset.
    pub fn dataset(&self) -> &Dataset {
        &self.data
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.data.subjects
    }

    pub fn faculty(&self) -> &[Faculty] {
        &self.data.faculty
    }

    pub fn rooms(&self) -> &[Room] {
        &self.data.rooms
    }

    pub fn time_slots(&self) -> &[TimeSlot] {
        &self.data.time_slots
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.data.constraints
    }

    /// Looks up a subject by id.
    pub fn subject(&self, id: &str) -> Option<&Subject> {
        self.subject_index.get(id).map(|&i| &self.data.subjects[i])
    }

    /// Looks up a faculty member by id.
    pub fn faculty_member(&self, id: &str) -> Option<&Faculty> {
        self.faculty_index.get(id).map(|&i| &self.data.faculty[i])
    }

    /// Looks up a room by id.
    pub fn room(&self, id: &str) -> Option<&Room> {
        self.room_index.get(id).map(|&i| &self.data.rooms[i])
    }

    /// Looks up a time slot by id.
    pub fn slot(&self, id: &str) -> Option<&TimeSlot> {
        self.slot_index.get(id).map(|&i| &self.data.time_slots[i])
    }

    /// Position of a subject.
    pub fn subject_position(&self, id: &str) -> Option<usize> {
        self.subject_index.get(id).copied()
    }

    /// Position of a faculty member.
    pub fn faculty_position(&self, id: &str) -> Option<usize> {
        self.faculty_index.get(id).copied()
    }

    /// Position of a room.
    pub fn room_position(&self, id: &str) -> Option<usize> {
        self.room_index.get(id).copied()
    }

    /// Dense batch number of a subject index; subjects sharing a batch label
    /// share the number.
    pub fn batch_of(&self, subject: usize) -> usize {
        self.subject_batch[subject]
    }

    /// Grid position of a time slot.
    pub fn slot_position(&self, id: &str) -> Option<usize> {
        self.slot_index.get(id).copied()
    }

    /// Faculty indices eligible for a subject index.
    pub fn eligible_faculty(&self, subject: usize) -> &[usize] {
        &self.eligible_faculty[subject]
    }

    /// Room indices eligible for a subject index.
    pub fn eligible_rooms(&self, subject: usize) -> &[usize] {
        &self.eligible_rooms[subject]
    }

    /// Placeable sessions in canonical order (subject order, then ordinal).
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// Sessions with no eligible faculty, room, or slot.
    pub fn unplaceable(&self) -> &[UnresolvedSession] {
        &self.unplaceable
    }

    /// Total weekly sessions required (placeable or not).
    pub fn required_sessions(&self) -> usize {
        self.sessions.len() + self.unplaceable.len()
    }

    /// Builds the entry for a session from faculty, room, and slot indices.
    pub fn entry(
        &self,
        session: Session,
        faculty: usize,
        room: usize,
        slot: usize,
    ) -> ScheduleEntry {
        ScheduleEntry::new(
            &self.data.subjects[session.subject],
            &self.data.faculty[faculty].id,
            &self.data.rooms[room].id,
            &self.data.time_slots[slot].id,
        )
    }

    /// Whether the entry's faculty may teach its subject and its room accepts
    /// the session type.
    pub fn is_eligible(&self, entry: &ScheduleEntry) -> bool {
        let (Some(subject), Some(faculty), Some(room)) = (
            self.subject(&entry.subject_id),
            self.faculty_member(&entry.faculty_id),
            self.room(&entry.room_id),
        ) else {
            return false;
        };
        faculty.can_teach(subject) && room.accepts(subject.session_type)
    }

    /// Unresolved record for a placeable session.
    pub fn unresolved(&self, session: Session, reason: UnresolvedReason) -> UnresolvedSession {
        UnresolvedSession {
            subject_id: self.data.subjects[session.subject].id.clone(),
            session: session.ordinal,
            reason,
        }
    }
}
