//! Random candidate schedules.
//!
//! Produces structurally valid schedules: every entry pairs a session with an
//! eligible faculty member and room. Placement prefers a slot where the
//! faculty, room, and batch are free and both resources are available, and
//! falls back to any eligible combination after [`MAX_PLACEMENT_ATTEMPTS`]
//! draws, accepting a conflict rather than dropping the session.
//!
//! Output is aligned with [`TimetableProblem::sessions`]: entry `i` places
//! session `i`. Unplaceable sessions are carried as unresolved records, so
//! `entries + unresolved` always equals the required session count.

use std::collections::HashSet;

use rand::seq::IndexedRandom;
use rand::Rng;

use crate::error::{Error, Result};
use crate::models::{Schedule, ScheduleEntry, UnresolvedReason};
use crate::problem::{Session, TimetableProblem};

/// Random draws per session before accepting a conflicting placement.
pub const MAX_PLACEMENT_ATTEMPTS: usize = 50;

/// Faculty, room, and batch bookings per slot.
#[derive(Debug, Clone, Default)]
pub struct Occupancy {
    faculty: HashSet<(usize, usize)>,
    rooms: HashSet<(usize, usize)>,
    batches: HashSet<(usize, usize)>,
}

impl Occupancy {
    /// Creates an empty occupancy map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Books every entry that references known entities.
    pub fn from_entries<'e>(
        problem: &TimetableProblem,
        entries: impl IntoIterator<Item = &'e ScheduleEntry>,
    ) -> Self {
        let mut occ = Self::new();
        for e in entries {
            let (Some(subject), Some(faculty), Some(room), Some(slot)) = (
                problem.subject_position(&e.subject_id),
                problem.faculty_position(&e.faculty_id),
                problem.room_position(&e.room_id),
                problem.slot_position(&e.time_slot_id),
            ) else {
                continue;
            };
            occ.book(problem, subject, faculty, room, slot);
        }
        occ
    }

    /// Whether faculty, room, and the subject's batch are all free in `slot`.
    pub fn is_free(
        &self,
        problem: &TimetableProblem,
        subject: usize,
        faculty: usize,
        room: usize,
        slot: usize,
    ) -> bool {
        !self.faculty.contains(&(faculty, slot))
            && !self.rooms.contains(&(room, slot))
            && !self.batches.contains(&(problem.batch_of(subject), slot))
    }

    /// Marks faculty, room, and batch as busy in `slot`.
    pub fn book(
        &mut self,
        problem: &TimetableProblem,
        subject: usize,
        faculty: usize,
        room: usize,
        slot: usize,
    ) {
        self.faculty.insert((faculty, slot));
        self.rooms.insert((room, slot));
        self.batches.insert((problem.batch_of(subject), slot));
    }
}

/// Places one session at random, booking it in `occupancy`.
///
/// # Errors
/// [`Error::NoEligibleAssignment`] when the session has no eligible faculty,
/// no eligible room, or the grid is empty.
pub fn place_random<R: Rng>(
    problem: &TimetableProblem,
    session: Session,
    occupancy: &mut Occupancy,
    rng: &mut R,
) -> Result<ScheduleEntry> {
    let faculty = problem.eligible_faculty(session.subject);
    let rooms = problem.eligible_rooms(session.subject);
    let slots = problem.time_slots();
    let unresolved = |reason| Error::NoEligibleAssignment {
        subject_id: problem.subjects()[session.subject].id.clone(),
        session: session.ordinal,
        reason,
    };
    if faculty.is_empty() {
        return Err(unresolved(UnresolvedReason::NoEligibleFaculty));
    }
    if rooms.is_empty() {
        return Err(unresolved(UnresolvedReason::NoEligibleRoom));
    }
    if slots.is_empty() {
        return Err(unresolved(UnresolvedReason::NoTimeSlots));
    }

    let mut draw = (0, 0, 0);
    for _ in 0..MAX_PLACEMENT_ATTEMPTS {
        let (Some(&f), Some(&r)) = (faculty.choose(rng), rooms.choose(rng)) else {
            break;
        };
        let t = rng.random_range(0..slots.len());
        draw = (f, r, t);
        if occupancy.is_free(problem, session.subject, f, r, t)
            && problem.faculty()[f].is_available(&slots[t])
            && problem.rooms()[r].is_available(&slots[t])
        {
            break;
        }
    }

    let (f, r, t) = draw;
    occupancy.book(problem, session.subject, f, r, t);
    Ok(problem.entry(session, f, r, t))
}

/// Generates a random schedule covering every placeable session.
pub fn generate_random<R: Rng>(problem: &TimetableProblem, rng: &mut R) -> Schedule {
    fill_missing(problem, Vec::new(), rng)
}

/// Completes a partial assignment aligned with the problem's sessions.
///
/// `slots[i]` is the entry for session `i`, or `None` if unplaced; a short
/// vector counts as trailing `None`s. Existing entries are kept and booked
/// first, so new placements avoid them when possible.
pub fn fill_missing<R: Rng>(
    problem: &TimetableProblem,
    mut slots: Vec<Option<ScheduleEntry>>,
    rng: &mut R,
) -> Schedule {
    slots.resize(problem.sessions().len(), None);
    let mut occupancy = Occupancy::from_entries(problem, slots.iter().flatten());
    let mut schedule = Schedule::new();

    for (&session, slot) in problem.sessions().iter().zip(slots) {
        let placed = match slot {
            Some(entry) => Ok(entry),
            None => place_random(problem, session, &mut occupancy, rng),
        };
        match placed {
            Ok(entry) => schedule.add_entry(entry),
            Err(e) => {
                if let Some(u) = e.to_unresolved() {
                    schedule.add_unresolved(u);
                }
            }
        }
    }

    schedule.unresolved.extend_from_slice(problem.unplaceable());
    schedule
}

/// Changes one of `entry`'s faculty, room, or slot to a random eligible value.
///
/// Returns `false` when the entry's subject is unknown.
pub fn reassign<R: Rng>(
    problem: &TimetableProblem,
    entry: &mut ScheduleEntry,
    rng: &mut R,
) -> bool {
    let Some(subject) = problem.subject_position(&entry.subject_id) else {
        return false;
    };
    match rng.random_range(0..3) {
        0 => {
            if let Some(&f) = problem.eligible_faculty(subject).choose(rng) {
                entry.faculty_id = problem.faculty()[f].id.clone();
            }
        }
        1 => {
            if let Some(&r) = problem.eligible_rooms(subject).choose(rng) {
                entry.room_id = problem.rooms()[r].id.clone();
            }
        }
        _ => {
            if let Some(slot) = problem.time_slots().choose(rng) {
                entry.time_slot_id = slot.id.clone();
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conflict::count_conflicts;
    use crate::models::{Faculty, Room, SessionType, Subject};
    use crate::problem::tests::small_dataset;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_generate_covers_every_session() {
        let data = small_dataset()
            .with_subject(Subject::new("C", "CS").with_sessions_per_week(3))
            .with_subject(
                Subject::new("X", "BIO")
                    .with_session_type(SessionType::Seminar)
                    .with_sessions_per_week(2),
            );
        let p = TimetableProblem::new(data);
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for _ in 0..20 {
            let s = generate_random(&p, &mut rng);
            assert_eq!(s.len() + s.unresolved.len(), p.required_sessions());
            assert_eq!(s.len(), p.sessions().len());
            assert_eq!(s.unresolved.len(), 2);
            for (e, session) in s.entries.iter().zip(p.sessions()) {
                assert_eq!(e.subject_id, p.subjects()[session.subject].id);
                assert!(p.is_eligible(e));
            }
        }
    }

    #[test]
    fn test_prefers_conflict_free_slots() {
        let p = TimetableProblem::new(small_dataset());
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        // Three sessions over five slots: free slots are always easy to find.
        for _ in 0..20 {
            let s = generate_random(&p, &mut rng);
            assert_eq!(count_conflicts(&s.entries), 0);
        }
    }

    #[test]
    fn test_deterministic_with_seed() {
        let p = TimetableProblem::new(small_dataset());
        let a = generate_random(&p, &mut ChaCha8Rng::seed_from_u64(3));
        let b = generate_random(&p, &mut ChaCha8Rng::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn test_fill_missing_keeps_existing() {
        let p = TimetableProblem::new(small_dataset());
        let fixed = p.entry(p.sessions()[0], 0, 0, 0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let s = fill_missing(&p, vec![Some(fixed.clone())], &mut rng);
        assert_eq!(s.len(), 3);
        assert_eq!(s.entries[0], fixed);
        // Second lecture shares F1, R1, and the batch with the fixed entry.
        assert_ne!(s.entries[1].time_slot_id, "MON-P1");
    }

    #[test]
    fn test_place_random_reports_ineligible() {
        let data = small_dataset().with_subject(Subject::new("Z", "ART"));
        let mut p = TimetableProblem::new(data.clone());
        let session = Session {
            subject: 2,
            ordinal: 1,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let err = place_random(&p, session, &mut Occupancy::new(), &mut rng).unwrap_err();
        let u = err.to_unresolved().unwrap();
        assert_eq!(u.reason, UnresolvedReason::NoEligibleFaculty);

        p = TimetableProblem::new(
            data.with_faculty(Faculty::new("F9", "ART"))
                .with_room(Room::classroom("R9", 30)),
        );
        assert!(place_random(&p, session, &mut Occupancy::new(), &mut rng).is_ok());
    }

    #[test]
    fn test_reassign_stays_eligible() {
        let data = small_dataset()
            .with_faculty(Faculty::new("F3", "CS"))
            .with_room(Room::classroom("R2", 40));
        let p = TimetableProblem::new(data);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut e = p.entry(p.sessions()[0], 0, 0, 0);
        for _ in 0..50 {
            assert!(reassign(&p, &mut e, &mut rng));
            assert!(p.is_eligible(&e));
            assert!(p.slot(&e.time_slot_id).is_some());
        }

        let mut ghost = e.clone();
        ghost.subject_id = "none".into();
        assert!(!reassign(&p, &mut ghost, &mut rng));
    }
}
