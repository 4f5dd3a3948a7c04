//! Error and failure types.
//!
//! [`AssignError`] aborts a run. Capacity shortfalls are not errors: they are
//! collected as [`AssignmentFailure`] entries and returned with the result.

use std::fmt;

use crate::model::ReservationId;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Malformed assignment policy.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("policy could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("policy has no zone list for special team {0}")]
    MissingSpecialTeam(String),
    #[error("special team {0} has an empty zone list")]
    EmptySpecialTeam(String),
    #[error("team size rule {min_size}..={max_size} is invalid")]
    InvalidSizeRule { min_size: usize, max_size: usize },
}

/// Fatal conditions that stop a run before (or after) placement.
#[derive(Debug, thiserror::Error)]
pub enum AssignError {
    #[error(transparent)]
    Policy(#[from] PolicyError),
    #[error("loading data for date {date} failed: {source}")]
    Source {
        date: i64,
        #[source]
        source: BoxError,
    },
    #[error("saving assignments for date {date} failed: {source}")]
    Store {
        date: i64,
        #[source]
        source: BoxError,
    },
}

/// A reservation or team the planner could not seat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentFailure {
    /// Special team larger than the capacity of its eligible zones.
    SpecialTeamShortfall { team: String, unassigned: usize },
    /// Single-member team with no desk left in any eligible zone type.
    SoloTeamUnplaced { team: String },
    /// Reservation left without a desk after annealing.
    ReservationUnplaced { reservation: ReservationId },
}

impl AssignmentFailure {
    /// Number of reservations this failure accounts for.
    pub fn reservation_count(&self) -> usize {
        match self {
            AssignmentFailure::SpecialTeamShortfall { unassigned, .. } => *unassigned,
            AssignmentFailure::SoloTeamUnplaced { .. } => 1,
            AssignmentFailure::ReservationUnplaced { .. } => 1,
        }
    }
}

impl fmt::Display for AssignmentFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentFailure::SpecialTeamShortfall { team, unassigned } => {
                write!(f, "{team}: {unassigned} users could not be assigned.")
            }
            AssignmentFailure::SoloTeamUnplaced { team } => {
                write!(f, "Team {team}: no desk could be assigned")
            }
            AssignmentFailure::ReservationUnplaced { reservation } => {
                write!(f, "Reservation {reservation} could not be assigned.")
            }
        }
    }
}
