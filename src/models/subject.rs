//! Subject (course) model.
//!
//! A subject is catalog reference data: it requires a number of weekly
//! sessions of one session type, taught to one batch of students.

use serde::{Deserialize, Serialize};

/// Default expected class size when the catalog does not provide one.
pub const DEFAULT_ENROLLMENT: u32 = 30;

/// Kind of teaching session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Lecture,
    Lab,
    Tutorial,
    Seminar,
}

/// A subject to be timetabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    /// Unique subject identifier (course code).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Owning department.
    pub department: String,
    /// Semester the batch is in.
    pub semester: u32,
    /// Credit count.
    pub credits: u32,
    /// Session type for every weekly session.
    pub session_type: SessionType,
    /// Required sessions per week.
    pub sessions_per_week: u32,
    /// Prerequisite subject ids.
    #[serde(default)]
    pub prerequisites: Vec<String>,
    /// Expected class size.
    #[serde(default = "default_enrollment")]
    pub expected_enrollment: u32,
}

fn default_enrollment() -> u32 {
    DEFAULT_ENROLLMENT
}

impl Subject {
    /// Creates a lecture subject with one weekly session.
    pub fn new(id: impl Into<String>, department: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            department: department.into(),
            semester: 1,
            credits: 0,
            session_type: SessionType::Lecture,
            sessions_per_week: 1,
            prerequisites: Vec::new(),
            expected_enrollment: DEFAULT_ENROLLMENT,
        }
    }

    /// Sets the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the semester.
    pub fn with_semester(mut self, semester: u32) -> Self {
        self.semester = semester;
        self
    }

    /// Sets the credit count.
    pub fn with_credits(mut self, credits: u32) -> Self {
        self.credits = credits;
        self
    }

    /// Sets the session type.
    pub fn with_session_type(mut self, session_type: SessionType) -> Self {
        self.session_type = session_type;
        self
    }

    /// Sets the weekly session count.
    pub fn with_sessions_per_week(mut self, sessions: u32) -> Self {
        self.sessions_per_week = sessions;
        self
    }

    /// Adds a prerequisite.
    pub fn with_prerequisite(mut self, subject_id: impl Into<String>) -> Self {
        self.prerequisites.push(subject_id.into());
        self
    }

    /// Sets the expected class size.
    pub fn with_enrollment(mut self, students: u32) -> Self {
        self.expected_enrollment = students;
        self
    }

    /// Student batch label: `{department}_SEM{semester}`.
    pub fn batch(&self) -> String {
        format!("{}_SEM{}", self.department, self.semester)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_builder() {
        let s = Subject::new("CS101", "CS")
            .with_name("Programming I")
            .with_semester(3)
            .with_credits(4)
            .with_session_type(SessionType::Lab)
            .with_sessions_per_week(2)
            .with_prerequisite("CS100")
            .with_enrollment(45);

        assert_eq!(s.id, "CS101");
        assert_eq!(s.session_type, SessionType::Lab);
        assert_eq!(s.sessions_per_week, 2);
        assert_eq!(s.prerequisites, vec!["CS100".to_string()]);
        assert_eq!(s.expected_enrollment, 45);
        assert_eq!(s.batch(), "CS_SEM3");
    }

    #[test]
    fn test_enrollment_default_on_deserialize() {
        let json = r#"{
            "id": "MA201", "name": "Calculus", "department": "MATH",
            "semester": 2, "credits": 3, "session_type": "lecture",
            "sessions_per_week": 3
        }"#;
        let s: Subject = serde_json::from_str(json).unwrap();
        assert_eq!(s.expected_enrollment, DEFAULT_ENROLLMENT);
        assert!(s.prerequisites.is_empty());
    }
}
