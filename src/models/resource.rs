//! Teaching resources: faculty members and rooms.
//!
//! Both carry a weekly availability pattern (weekdays + hours window).
//! An empty weekday list means available every day.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{SessionType, Subject, TimeSlot, TimeWindow, Weekday};

/// A faculty member who can teach sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Faculty {
    /// Unique faculty identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Home department.
    pub department: String,
    /// Specialization tags (subject ids, names, or departments).
    #[serde(default)]
    pub specializations: BTreeSet<String>,
    /// Days the faculty member teaches. Empty = every day.
    #[serde(default)]
    pub available_days: Vec<Weekday>,
    /// Hours the faculty member teaches.
    #[serde(default)]
    pub available_hours: TimeWindow,
    /// Maximum teaching hours per day.
    pub max_hours_per_day: u32,
    /// Maximum teaching hours per week.
    pub max_hours_per_week: u32,
}

/// Room classification.
///
/// Determines which session types a room can host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomType {
    Classroom,
    Lab,
    Auditorium,
    SeminarHall,
}

impl RoomType {
    /// Whether this room type can host a session of the given type.
    ///
    /// | Session | Rooms |
    /// |---------|-------|
    /// | Lecture | Classroom, Auditorium |
    /// | Lab | Lab |
    /// | Tutorial | Classroom, SeminarHall |
    /// | Seminar | SeminarHall, Classroom |
    pub fn accepts(self, session_type: SessionType) -> bool {
        matches!(
            (session_type, self),
            (SessionType::Lecture, RoomType::Classroom | RoomType::Auditorium)
                | (SessionType::Lab, RoomType::Lab)
                | (SessionType::Tutorial, RoomType::Classroom | RoomType::SeminarHall)
                | (SessionType::Seminar, RoomType::SeminarHall | RoomType::Classroom)
        )
    }
}

/// A room that hosts sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    /// Unique room identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Room classification.
    pub room_type: RoomType,
    /// Seats.
    pub capacity: u32,
    /// Days the room is bookable. Empty = every day.
    #[serde(default)]
    pub available_days: Vec<Weekday>,
    /// Hours the room is bookable.
    #[serde(default)]
    pub available_hours: TimeWindow,
}

fn available(days: &[Weekday], hours: &TimeWindow, slot: &TimeSlot) -> bool {
    (days.is_empty() || days.contains(&slot.day))
        && hours.covers(slot.start_minute, slot.end_minute)
}

impl Faculty {
    /// Creates a faculty member with 4h/day and 20h/week limits.
    pub fn new(id: impl Into<String>, department: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            department: department.into(),
            specializations: BTreeSet::new(),
            available_days: Vec::new(),
            available_hours: TimeWindow::all_day(),
            max_hours_per_day: 4,
            max_hours_per_week: 20,
        }
    }

    /// Sets the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a specialization tag.
    pub fn with_specialization(mut self, tag: impl Into<String>) -> Self {
        self.specializations.insert(tag.into());
        self
    }

    /// Restricts teaching days.
    pub fn with_days(mut self, days: impl IntoIterator<Item = Weekday>) -> Self {
        self.available_days = days.into_iter().collect();
        self
    }

    /// Restricts teaching hours.
    pub fn with_hours(mut self, window: TimeWindow) -> Self {
        self.available_hours = window;
        self
    }

    /// Sets workload limits.
    pub fn with_limits(mut self, max_hours_per_day: u32, max_hours_per_week: u32) -> Self {
        self.max_hours_per_day = max_hours_per_day;
        self.max_hours_per_week = max_hours_per_week;
        self
    }

    /// Whether this faculty member may teach `subject`.
    ///
    /// Same department, or a specialization tag equal (case-insensitive) to
    /// the subject's id, name, or department.
    pub fn can_teach(&self, subject: &Subject) -> bool {
        if self.department.eq_ignore_ascii_case(&subject.department) {
            return true;
        }
        self.specializations.iter().any(|tag| {
            tag.eq_ignore_ascii_case(&subject.id)
                || (!subject.name.is_empty() && tag.eq_ignore_ascii_case(&subject.name))
                || tag.eq_ignore_ascii_case(&subject.department)
        })
    }

    /// Whether the faculty member is available for the whole slot.
    pub fn is_available(&self, slot: &TimeSlot) -> bool {
        available(&self.available_days, &self.available_hours, slot)
    }

    /// Whether the faculty member teaches on `day`.
    pub fn works_on(&self, day: Weekday) -> bool {
        self.available_days.is_empty() || self.available_days.contains(&day)
    }
}

impl Room {
    /// Creates a room.
    pub fn new(id: impl Into<String>, room_type: RoomType, capacity: u32) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            room_type,
            capacity,
            available_days: Vec::new(),
            available_hours: TimeWindow::all_day(),
        }
    }

    /// Creates a classroom.
    pub fn classroom(id: impl Into<String>, capacity: u32) -> Self {
        Self::new(id, RoomType::Classroom, capacity)
    }

    /// Creates a lab.
    pub fn lab(id: impl Into<String>, capacity: u32) -> Self {
        Self::new(id, RoomType::Lab, capacity)
    }

    /// Sets the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Restricts bookable days.
    pub fn with_days(mut self, days: impl IntoIterator<Item = Weekday>) -> Self {
        self.available_days = days.into_iter().collect();
        self
    }

    /// Restricts bookable hours.
    pub fn with_hours(mut self, window: TimeWindow) -> Self {
        self.available_hours = window;
        self
    }

    /// Whether this room can host a session of the given type.
    pub fn accepts(&self, session_type: SessionType) -> bool {
        self.room_type.accepts(session_type)
    }

    /// Whether the room is bookable for the whole slot.
    pub fn is_available(&self, slot: &TimeSlot) -> bool {
        available(&self.available_days, &self.available_hours, slot)
    }
}
