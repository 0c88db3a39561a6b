//! Input validation for timetabling datasets.
//!
//! Checks structural integrity of subjects, faculty, rooms, time slots, and
//! constraints before scheduling. Detects:
//! - Duplicate IDs
//! - Constraints referencing unknown entities or slots
//! - Unknown prerequisites and circular prerequisite chains (DAG validation)
//! - Malformed time slots
//! - Subjects with no weekly sessions
//!
//! Eligibility gaps (a subject nobody can teach) are not validation errors;
//! they surface as unresolved sessions in the run result.
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4 (Topological Sort)

use crate::models::{ConstraintKind, Dataset, Restriction, Subject, MINUTES_PER_DAY};
use std::collections::{HashMap, HashSet};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A constraint targets an entity that doesn't exist.
    InvalidConstraintTarget,
    /// A constraint restricts a time slot that doesn't exist.
    InvalidTimeSlotReference,
    /// A subject lists a prerequisite that doesn't exist.
    InvalidPrerequisite,
    /// Prerequisite graph contains a cycle.
    CyclicDependency,
    /// A time slot is empty or runs past midnight.
    InvalidTimeSlot,
    /// A subject requires zero sessions per week.
    EmptySubject,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

fn check_unique<'a>(
    label: &str,
    ids: impl Iterator<Item = &'a str>,
    errors: &mut Vec<ValidationError>,
) -> HashSet<&'a str> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate {label} ID: {id}"),
            ));
        }
    }
    seen
}

/// Validates a dataset.
///
/// Checks:
/// 1. No duplicate subject, faculty, room, time slot, or constraint IDs
/// 2. Every time slot ends after it starts and before midnight
/// 3. Every subject requires at least one session per week
/// 4. All prerequisite references point to existing subjects
/// 5. No circular prerequisite chains
/// 6. All constraint targets and restricted slots exist
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(data: &Dataset) -> ValidationResult {
    let mut errors = Vec::new();

    let subject_ids = check_unique(
        "subject",
        data.subjects.iter().map(|s| s.id.as_str()),
        &mut errors,
    );
    let faculty_ids = check_unique(
        "faculty",
        data.faculty.iter().map(|f| f.id.as_str()),
        &mut errors,
    );
    let room_ids = check_unique("room", data.rooms.iter().map(|r| r.id.as_str()), &mut errors);
    let slot_ids = check_unique(
        "time slot",
        data.time_slots.iter().map(|t| t.id.as_str()),
        &mut errors,
    );
    check_unique(
        "constraint",
        data.constraints.iter().map(|c| c.id.as_str()),
        &mut errors,
    );

    for slot in &data.time_slots {
        if slot.start_minute >= slot.end_minute || slot.end_minute > MINUTES_PER_DAY {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidTimeSlot,
                format!(
                    "Time slot '{}' has invalid bounds {}..{}",
                    slot.id, slot.start_minute, slot.end_minute
                ),
            ));
        }
    }

    for subject in &data.subjects {
        if subject.sessions_per_week == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptySubject,
                format!("Subject '{}' has no weekly sessions", subject.id),
            ));
        }
        for pre in &subject.prerequisites {
            if !subject_ids.contains(pre.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidPrerequisite,
                    format!(
                        "Subject '{}' references unknown prerequisite '{}'",
                        subject.id, pre
                    ),
                ));
            }
        }
    }

    if let Some(cycle_err) = detect_cycles(&data.subjects) {
        errors.push(cycle_err);
    }

    let batches: HashSet<String> = data.subjects.iter().map(Subject::batch).collect();
    for c in &data.constraints {
        let t = c.target_id.as_str();
        let known = match c.kind {
            ConstraintKind::FacultyUnavailable => faculty_ids.contains(t),
            ConstraintKind::RoomUnavailable => room_ids.contains(t),
            ConstraintKind::SubjectTiming => subject_ids.contains(t),
            ConstraintKind::BatchRestriction => batches.contains(t),
            ConstraintKind::Custom => {
                faculty_ids.contains(t)
                    || room_ids.contains(t)
                    || subject_ids.contains(t)
                    || batches.contains(t)
            }
        };
        if !known {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidConstraintTarget,
                format!("Constraint '{}' targets unknown entity '{}'", c.id, t),
            ));
        }
        if let Restriction::TimeSlot { time_slot_id } = &c.restriction {
            if !slot_ids.contains(time_slot_id.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidTimeSlotReference,
                    format!(
                        "Constraint '{}' references unknown time slot '{}'",
                        c.id, time_slot_id
                    ),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Detects cycles in the prerequisite graph using DFS.
///
/// # Algorithm
/// Topological sort via DFS. If a back-edge is found (visiting a node
/// currently in the recursion stack), a cycle exists.
fn detect_cycles(subjects: &[Subject]) -> Option<ValidationError> {
    // prerequisite → dependents
    let mut adj: HashMap<&str, Vec<&str>> = HashMap::new();
    for s in subjects {
        for pre in &s.prerequisites {
            adj.entry(pre.as_str()).or_default().push(s.id.as_str());
        }
    }

    let mut visited = HashSet::new();
    let mut in_stack = HashSet::new();

    // Subject order keeps the reported node deterministic.
    for s in subjects {
        let node = s.id.as_str();
        if !visited.contains(node) && has_cycle_dfs(node, &adj, &mut visited, &mut in_stack) {
            return Some(ValidationError::new(
                ValidationErrorKind::CyclicDependency,
                format!("Circular prerequisite chain involving subject '{node}'"),
            ));
        }
    }

    None
}

fn has_cycle_dfs<'a>(
    node: &'a str,
    adj: &HashMap<&'a str, Vec<&'a str>>,
    visited: &mut HashSet<&'a str>,
    in_stack: &mut HashSet<&'a str>,
) -> bool {
    visited.insert(node);
    in_stack.insert(node);

    if let Some(neighbors) = adj.get(node) {
        for &next in neighbors {
            if in_stack.contains(next) {
                return true; // Back edge
            }
            if !visited.contains(next) && has_cycle_dfs(next, adj, visited, in_stack) {
                return true;
            }
        }
    }

    in_stack.remove(node);
    false
}
