//! Collaborator traits for the desk planner.
//!
//! Storage is deliberately kept outside the planner. Concrete apps implement
//! these traits over their own persistence layer; [`crate::memory`] provides
//! an in-memory implementation.

use crate::error::BoxError;
use crate::model::{Desk, DeskId, Reservation, ReservationId, Team, Zone};
use crate::policy::AssignmentPolicy;

/// Supplies the reservations booked for a date.
pub trait ReservationSource {
    /// All reservations for `date` (unix timestamp, date only), with the team
    /// already resolved through the reserving user.
    fn reservations_for(&self, date: i64) -> Result<Vec<Reservation>, BoxError>;
}

/// Supplies the static office layout.
pub trait InventorySource {
    fn zones(&self) -> Result<Vec<Zone>, BoxError>;

    fn desks(&self) -> Result<Vec<Desk>, BoxError>;

    fn teams(&self) -> Result<Vec<Team>, BoxError>;
}

/// Supplies the assignment policy for a run.
pub trait PolicySource {
    fn policy(&self) -> Result<AssignmentPolicy, BoxError>;
}

/// Persists the outcome of a run.
pub trait AssignmentStore {
    /// Replace the assigned desk of every listed reservation in one batch.
    fn save_assignments(
        &self,
        date: i64,
        assignments: &[(ReservationId, Option<DeskId>)],
    ) -> Result<(), BoxError>;
}

/// A policy value is its own source.
impl PolicySource for AssignmentPolicy {
    fn policy(&self) -> Result<AssignmentPolicy, BoxError> {
        Ok(self.clone())
    }
}
