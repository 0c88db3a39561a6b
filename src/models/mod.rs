//! Timetabling domain models.
//!
//! Reference data (subjects, faculty, rooms, slots, constraints) is loaded
//! once per run and never mutated; schedules are the only values the search
//! creates and changes.
//!
//! # Domain Mappings
//!
//! | u-timetable | Generic scheduling |
//! |-------------|--------------------|
//! | Subject session | Activity |
//! | Faculty, Room | Resource |
//! | TimeSlot | Time bucket |
//! | Schedule | Solution |

mod calendar;
mod constraint;
mod dataset;
mod resource;
mod schedule;
mod subject;

pub use calendar::{SlotGridConfig, TimeSlot, TimeWindow, Weekday, MINUTES_PER_DAY};
pub use constraint::{Constraint, ConstraintKind, Priority, Restriction};
pub use dataset::Dataset;
pub use resource::{Faculty, Room, RoomType};
pub use schedule::{Schedule, ScheduleEntry, UnresolvedReason, UnresolvedSession, WeekType};
pub use subject::{SessionType, Subject, DEFAULT_ENROLLMENT};
