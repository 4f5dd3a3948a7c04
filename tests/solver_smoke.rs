//! Smoke tests for the date-level service over the in-memory office.

mod fixtures;

use desk_planner::error::{AssignError, BoxError};
use desk_planner::memory::InMemoryOffice;
use desk_planner::model::{Desk, DeskId, DeskType, Problem, Reservation, ReservationId, Team, Zone, ZoneType};
use desk_planner::policy::AssignmentPolicy;
use desk_planner::service::DeskAssigner;
use desk_planner::traits::{AssignmentStore, InventorySource, PolicySource, ReservationSource};

use fixtures::*;

fn office(problem: Problem) -> InMemoryOffice {
    InMemoryOffice::new(problem.zones, problem.desks, problem.teams, policy()).with_reservations(problem.reservations)
}

#[test]
fn test_assign_persists_desks() {
    let store = office(
        OfficeBuilder::new()
            .zone("Focus 1", ZoneType::Focus, 0, 2)
            .zone("Open 1", ZoneType::Open, 0, 5)
            .team("North", 5)
            .team("Solo", 1)
            .build(),
    );
    let assigner = DeskAssigner::new(&store, seeded(1));

    let failures = assigner.assign(DAY).unwrap();

    assert!(failures.is_empty());
    let stored = store.reservations().unwrap();
    assert!(stored.iter().all(|reservation| reservation.assigned_desk.is_some()));
}

#[test]
fn test_assign_reports_failures_and_clears_previous_desks() {
    let store = office(
        OfficeBuilder::new()
            .zone("Open 1", ZoneType::Open, 0, 2)
            .team("North", 3)
            .build(),
    );
    let assigner = DeskAssigner::new(&store, seeded(2));

    let first = assigner.assign(DAY).unwrap();
    let second = assigner.assign(DAY).unwrap();

    assert_eq!(first.len(), 1);
    assert_eq!(second, first);
    let stored = store.reservations().unwrap();
    assert_eq!(stored.iter().filter(|r| r.assigned_desk.is_some()).count(), 2);
}

#[test]
fn test_validate_and_availability() {
    let store = office(
        OfficeBuilder::new()
            .zone("HR Room", ZoneType::Hr, 0, 2)
            .zone("Focus 1", ZoneType::Focus, 0, 2)
            .zone("Open 1", ZoneType::Open, 0, 4)
            .team("North", 4)
            .build(),
    );
    let assigner = DeskAssigner::new(&store, seeded(3));

    let report = assigner.validate(DAY).unwrap();
    assert!(report.all_teams_fit);

    let before = assigner.availability(DAY).unwrap();
    assert_eq!((before.all.free, before.all.total), (6, 6));
    assert_eq!((before.focus.free, before.focus.total), (2, 2));

    assigner.assign(DAY).unwrap();

    let after = assigner.availability(DAY).unwrap();
    assert_eq!(after.all.free, 2);
    assert!(after.any_available);
}

#[test]
fn test_assign_dates_keeps_days_apart() {
    let problem = OfficeBuilder::new()
        .zone("Open 1", ZoneType::Open, 0, 3)
        .team("North", 3)
        .book(1, 2, DeskType::Standard, DAY + 86_400)
        .build();
    let store = office(problem);
    let assigner = DeskAssigner::new(&store, seeded(4));

    let results = assigner.assign_dates(&[DAY, DAY + 86_400]);

    assert_eq!(results.len(), 2);
    for (_, result) in &results {
        assert!(result.as_ref().unwrap().is_complete());
    }
    let stored = store.reservations().unwrap();
    assert!(stored.iter().all(|reservation| reservation.assigned_desk.is_some()));

    let stats = assigner.placement_stats(results[0].1.as_ref().unwrap()).unwrap();
    assert_eq!(stats[0].team_name, "North");
    assert_eq!(stats[0].zones_count, 1);
}

/// Store whose reservation lookups always fail.
struct BrokenStore;

impl ReservationSource for BrokenStore {
    fn reservations_for(&self, _date: i64) -> Result<Vec<Reservation>, BoxError> {
        Err("database unavailable".into())
    }
}

impl InventorySource for BrokenStore {
    fn zones(&self) -> Result<Vec<Zone>, BoxError> {
        Ok(Vec::new())
    }

    fn desks(&self) -> Result<Vec<Desk>, BoxError> {
        Ok(Vec::new())
    }

    fn teams(&self) -> Result<Vec<Team>, BoxError> {
        Ok(Vec::new())
    }
}

impl PolicySource for BrokenStore {
    fn policy(&self) -> Result<AssignmentPolicy, BoxError> {
        Ok(policy())
    }
}

impl AssignmentStore for BrokenStore {
    fn save_assignments(&self, _date: i64, _rows: &[(ReservationId, Option<DeskId>)]) -> Result<(), BoxError> {
        panic!("nothing should be saved");
    }
}

#[test]
fn test_source_error_aborts_before_saving() {
    let assigner = DeskAssigner::new(&BrokenStore, seeded(5));

    let err = assigner.assign(DAY).unwrap_err();

    assert!(matches!(err, AssignError::Source { date: DAY, .. }));
    assert!(err.to_string().contains("database unavailable"));
}
