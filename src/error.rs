//! Error taxonomy.
//!
//! Per-session placement failures ([`Error::NoEligibleAssignment`]) are
//! recovered locally into [`UnresolvedSession`] records; every other variant
//! ends a run. [`Error::Cancelled`] is a terminal state, not a failure.

use thiserror::Error;

use crate::config::ConfigError;
use crate::models::{UnresolvedReason, UnresolvedSession};
use crate::validation::ValidationError;

/// Failure reported by an external schedule store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("write rejected: {0}")]
    WriteRejected(String),
}

/// Engine error.
#[derive(Debug, Error)]
pub enum Error {
    #[error("insufficient data: no {}", .missing.join(", no "))]
    InsufficientData { missing: Vec<&'static str> },

    #[error("no eligible assignment for {subject_id} session {session}: {reason}")]
    NoEligibleAssignment {
        subject_id: String,
        session: u32,
        reason: UnresolvedReason,
    },

    #[error("persistence failed: {0}")]
    Persistence(#[from] StoreError),

    #[error("optimization cancelled")]
    Cancelled,

    #[error("invalid input: {}", summarize(.0))]
    InvalidInput(Vec<ValidationError>),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result alias.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this is the cooperative-cancellation outcome.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// Converts a placement failure into its unresolved-session record.
    ///
    /// Returns `None` for every other variant.
    pub fn to_unresolved(&self) -> Option<UnresolvedSession> {
        match self {
            Error::NoEligibleAssignment {
                subject_id,
                session,
                reason,
            } => Some(UnresolvedSession {
                subject_id: subject_id.clone(),
                session: *session,
                reason: *reason,
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data_message() {
        let e = Error::InsufficientData {
            missing: vec!["subjects", "rooms"],
        };
        assert_eq!(e.to_string(), "insufficient data: no subjects, no rooms");
    }

    #[test]
    fn test_to_unresolved() {
        let e = Error::NoEligibleAssignment {
            subject_id: "CS101".into(),
            session: 2,
            reason: UnresolvedReason::NoEligibleFaculty,
        };
        let u = e.to_unresolved().unwrap();
        assert_eq!(u.subject_id, "CS101");
        assert_eq!(u.session, 2);
        assert!(Error::Cancelled.to_unresolved().is_none());
        assert!(Error::Cancelled.is_cancelled());
    }

    #[test]
    fn test_persistence_from_store_error() {
        let e: Error = StoreError::WriteRejected("disk full".into()).into();
        assert_eq!(e.to_string(), "persistence failed: write rejected: disk full");
    }
}
