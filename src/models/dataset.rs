//! Input bundle for one optimization run.

use serde::{Deserialize, Serialize};

use super::{Constraint, Faculty, Room, Subject, TimeSlot};

/// All reference data a run reads.
///
/// An empty `time_slots` list means "generate the grid from configuration".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
    pub subjects: Vec<Subject>,
    pub faculty: Vec<Faculty>,
    pub rooms: Vec<Room>,
    pub time_slots: Vec<TimeSlot>,
    pub constraints: Vec<Constraint>,
}

impl Dataset {
    /// Creates an empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a subject.
    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.subjects.push(subject);
        self
    }

    /// Adds a faculty member.
    pub fn with_faculty(mut self, faculty: Faculty) -> Self {
        self.faculty.push(faculty);
        self
    }

    /// Adds a room.
    pub fn with_room(mut self, room: Room) -> Self {
        self.rooms.push(room);
        self
    }

    /// Replaces the slot grid.
    pub fn with_time_slots(mut self, slots: Vec<TimeSlot>) -> Self {
        self.time_slots = slots;
        self
    }

    /// Adds a constraint.
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Total weekly sessions required by all subjects.
    pub fn required_sessions(&self) -> usize {
        self.subjects
            .iter()
            .map(|s| s.sessions_per_week as usize)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_sessions() {
        let d = Dataset::new()
            .with_subject(Subject::new("A", "CS").with_sessions_per_week(2))
            .with_subject(Subject::new("B", "EE").with_sessions_per_week(3));
        assert_eq!(d.required_sessions(), 5);
        assert!(d.time_slots.is_empty());
    }

    #[test]
    fn test_dataset_deserialize_defaults() {
        let d: Dataset = serde_json::from_str("{}").unwrap();
        assert!(d.subjects.is_empty());
        assert!(d.constraints.is_empty());
    }
}
