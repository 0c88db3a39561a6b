//! Hard-conflict detection.
//!
//! Two entries conflict when they occupy the same time slot and share a
//! faculty member, a room, or a student batch. Detection compares every
//! pair, reports each conflicting pair once, and lists every shared resource.
//!
//! Week type is not considered: the contract is time-slot equality.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::ScheduleEntry;

/// Shared resource behind a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    Faculty,
    Room,
    Batch,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConflictKind::Faculty => "faculty",
            ConflictKind::Room => "room",
            ConflictKind::Batch => "batch",
        })
    }
}

/// One conflicting pair of entries (`first < second`, indices into the
/// scanned slice).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictPair {
    pub first: usize,
    pub second: usize,
    pub time_slot_id: String,
    pub kinds: Vec<ConflictKind>,
}

impl ConflictPair {
    /// Human-readable description against the scanned entries.
    pub fn describe(&self, entries: &[ScheduleEntry]) -> String {
        let kinds: Vec<String> = self.kinds.iter().map(ToString::to_string).collect();
        format!(
            "{} and {} clash in {} ({})",
            entries[self.first].subject_id,
            entries[self.second].subject_id,
            self.time_slot_id,
            kinds.join(", ")
        )
    }
}

/// Shared resources of two entries in the same slot (empty if none).
pub fn conflict_kinds(a: &ScheduleEntry, b: &ScheduleEntry) -> Vec<ConflictKind> {
    let mut kinds = Vec::new();
    if a.time_slot_id != b.time_slot_id {
        return kinds;
    }
    if a.faculty_id == b.faculty_id {
        kinds.push(ConflictKind::Faculty);
    }
    if a.room_id == b.room_id {
        kinds.push(ConflictKind::Room);
    }
    if a.batch == b.batch {
        kinds.push(ConflictKind::Batch);
    }
    kinds
}

/// Whether two entries conflict.
#[inline]
pub fn conflicts_with(a: &ScheduleEntry, b: &ScheduleEntry) -> bool {
    a.time_slot_id == b.time_slot_id
        && (a.faculty_id == b.faculty_id || a.room_id == b.room_id || a.batch == b.batch)
}

/// Whether `candidate` conflicts with any placed entry.
pub fn conflicts_with_any(placed: &[ScheduleEntry], candidate: &ScheduleEntry) -> bool {
    placed.iter().any(|e| conflicts_with(e, candidate))
}

/// Enumerates all conflicting pairs, ordered by `(first, second)`.
pub fn find_conflicts(entries: &[ScheduleEntry]) -> Vec<ConflictPair> {
    (0..entries.len())
        .into_par_iter()
        .flat_map_iter(|i| {
            let a = &entries[i];
            entries[i + 1..]
                .iter()
                .enumerate()
                .filter_map(move |(k, b)| {
                    let kinds = conflict_kinds(a, b);
                    (!kinds.is_empty()).then(|| ConflictPair {
                        first: i,
                        second: i + 1 + k,
                        time_slot_id: a.time_slot_id.clone(),
                        kinds,
                    })
                })
        })
        .collect()
}

/// Number of conflicting pairs, without allocating.
pub fn count_conflicts(entries: &[ScheduleEntry]) -> usize {
    entries
        .iter()
        .enumerate()
        .map(|(i, a)| {
            entries[i + 1..]
                .iter()
                .filter(|b| conflicts_with(a, b))
                .count()
        })
        .sum()
}
