//! In-memory office backing all collaborator traits.
//!
//! Useful for tests and for embedding the planner without a database.

use std::sync::{Mutex, MutexGuard};

use crate::error::BoxError;
use crate::model::{Desk, DeskId, Reservation, ReservationId, Team, Zone};
use crate::policy::AssignmentPolicy;
use crate::traits::{AssignmentStore, InventorySource, PolicySource, ReservationSource};

#[derive(Debug, Default)]
pub struct InMemoryOffice {
    zones: Vec<Zone>,
    desks: Vec<Desk>,
    teams: Vec<Team>,
    policy: AssignmentPolicy,
    reservations: Mutex<Vec<Reservation>>,
}

impl InMemoryOffice {
    pub fn new(zones: Vec<Zone>, desks: Vec<Desk>, teams: Vec<Team>, policy: AssignmentPolicy) -> Self {
        Self {
            zones,
            desks,
            teams,
            policy,
            reservations: Mutex::new(Vec::new()),
        }
    }

    pub fn with_reservations(self, reservations: Vec<Reservation>) -> Self {
        Self {
            reservations: Mutex::new(reservations),
            ..self
        }
    }

    pub fn add_reservation(&self, reservation: Reservation) -> Result<(), BoxError> {
        self.lock()?.push(reservation);
        Ok(())
    }

    /// Copy of every stored reservation, all dates included.
    pub fn reservations(&self) -> Result<Vec<Reservation>, BoxError> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Reservation>>, BoxError> {
        self.reservations
            .lock()
            .map_err(|_| BoxError::from("reservation store lock poisoned"))
    }
}

impl ReservationSource for InMemoryOffice {
    fn reservations_for(&self, date: i64) -> Result<Vec<Reservation>, BoxError> {
        let mut found: Vec<Reservation> = self
            .lock()?
            .iter()
            .filter(|reservation| reservation.date == date)
            .cloned()
            .collect();
        found.sort_by_key(|reservation| (reservation.created_at, reservation.id));
        Ok(found)
    }
}

impl InventorySource for InMemoryOffice {
    fn zones(&self) -> Result<Vec<Zone>, BoxError> {
        Ok(self.zones.clone())
    }

    fn desks(&self) -> Result<Vec<Desk>, BoxError> {
        Ok(self.desks.clone())
    }

    fn teams(&self) -> Result<Vec<Team>, BoxError> {
        Ok(self.teams.clone())
    }
}

impl PolicySource for InMemoryOffice {
    fn policy(&self) -> Result<AssignmentPolicy, BoxError> {
        Ok(self.policy.clone())
    }
}

impl AssignmentStore for InMemoryOffice {
    fn save_assignments(&self, date: i64, assignments: &[(ReservationId, Option<DeskId>)]) -> Result<(), BoxError> {
        let mut reservations = self.lock()?;

        // Resolve every row before touching any, so a bad id leaves the batch unapplied.
        let rows = assignments
            .iter()
            .map(|&(id, desk)| {
                reservations
                    .iter()
                    .position(|reservation| reservation.id == id && reservation.date == date)
                    .map(|index| (index, desk))
                    .ok_or_else(|| BoxError::from(format!("reservation {id} not found for date {date}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        for (index, desk) in rows {
            reservations[index].assigned_desk = desk;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DeskType;

    fn reservation(id: u32, date: i64, created_at: i64) -> Reservation {
        Reservation {
            id,
            user_id: id,
            team_id: 1,
            date,
            created_at,
            desired_desk_type: DeskType::Standard,
            assigned_desk: None,
        }
    }

    #[test]
    fn test_reservations_filtered_by_date_and_ordered() {
        let office = InMemoryOffice::default().with_reservations(vec![
            reservation(1, 10, 5),
            reservation(2, 11, 1),
            reservation(3, 10, 2),
        ]);

        let ids: Vec<u32> = office.reservations_for(10).unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_save_assignments_updates_rows() {
        let office = InMemoryOffice::default().with_reservations(vec![reservation(1, 10, 0), reservation(2, 10, 0)]);

        office.save_assignments(10, &[(1, Some(7)), (2, None)]).unwrap();

        let stored = office.reservations().unwrap();
        assert_eq!(stored[0].assigned_desk, Some(7));
        assert_eq!(stored[1].assigned_desk, None);
    }

    #[test]
    fn test_save_assignments_rejects_unknown_reservation() {
        let office = InMemoryOffice::default();
        assert!(office.save_assignments(10, &[(99, Some(1))]).is_err());
    }

    #[test]
    fn test_failed_batch_leaves_rows_untouched() {
        let office = InMemoryOffice::default().with_reservations(vec![reservation(1, 10, 0), reservation(2, 11, 0)]);

        // Reservation 2 exists, but on another date.
        assert!(office.save_assignments(10, &[(1, Some(1)), (2, Some(2))]).is_err());
        assert!(office.save_assignments(10, &[(1, Some(1)), (999, Some(2))]).is_err());

        let stored = office.reservations().unwrap();
        assert!(stored.iter().all(|reservation| reservation.assigned_desk.is_none()));
    }
}
