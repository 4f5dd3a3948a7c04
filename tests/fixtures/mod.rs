//! Test fixtures for desk-planner.
//!
//! Builders for office layouts, reservations and policies.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};

use desk_planner::annealing::AnnealingOptions;
use desk_planner::model::{Desk, DeskId, DeskType, Problem, Reservation, Team, TeamId, Zone, ZoneId, ZoneType};
use desk_planner::policy::AssignmentPolicy;
use desk_planner::solver::{AssignmentOutcome, SolveOptions};

pub const DAY: i64 = 1_767_225_600;

pub const POLICY: &str = r#"{
    "specialTeams": {
        "HR": ["HR Room"],
        "Executive": ["Exec Room"]
    },
    "teamSizeRules": [
        { "minSize": 1, "maxSize": 1, "priorityTypes": ["Focus", "DuoFocus", "Open"] },
        { "minSize": 2, "maxSize": 200, "priorityTypes": ["Collaboration", "Open", "WarRoom", "Focus", "DuoFocus"] }
    ]
}"#;

pub fn policy() -> AssignmentPolicy {
    AssignmentPolicy::from_json_str(POLICY).unwrap()
}

/// Reproducible options with a short annealing run.
pub fn seeded(seed: u64) -> SolveOptions {
    SolveOptions {
        annealing: AnnealingOptions {
            seed: Some(seed),
            max_iterations: 20_000,
            ..AnnealingOptions::default()
        },
        ..SolveOptions::default()
    }
}

/// Builder for an office with its teams and a day of reservations.
#[derive(Debug, Default)]
pub struct OfficeBuilder {
    zones: Vec<Zone>,
    desks: Vec<Desk>,
    teams: Vec<Team>,
    reservations: Vec<Reservation>,
}

impl OfficeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zone with `size` standard desks.
    pub fn zone(self, name: &str, zone_type: ZoneType, floor: i32, size: u32) -> Self {
        self.typed_zone(name, zone_type, floor, &[(DeskType::Standard, size)])
    }

    pub fn typed_zone(mut self, name: &str, zone_type: ZoneType, floor: i32, counts: &[(DeskType, u32)]) -> Self {
        let id = self.zones.len() as ZoneId + 1;
        let typed_desks: BTreeMap<DeskType, u32> = counts.iter().copied().collect();
        for &(desk_type, count) in counts {
            for _ in 0..count {
                let desk_id = self.desks.len() as DeskId + 1;
                self.desks.push(Desk {
                    id: desk_id,
                    zone_id: id,
                    desk_type,
                    name: format!("{name}-{desk_id}"),
                });
            }
        }
        self.zones.push(Zone {
            id,
            name: name.to_string(),
            zone_type,
            floor,
            total_desks: typed_desks.values().sum(),
            typed_desks,
        });
        self
    }

    /// Team `name` booking `size` standard desks on [`DAY`].
    pub fn team(self, name: &str, size: usize) -> Self {
        self.team_wanting(name, size, DeskType::Standard)
    }

    pub fn team_wanting(mut self, name: &str, size: usize, desk_type: DeskType) -> Self {
        let team_id = match self.teams.iter().find(|team| team.name == name) {
            Some(team) => team.id,
            None => {
                let id = self.teams.len() as TeamId + 1;
                self.teams.push(Team { id, name: name.to_string() });
                id
            }
        };
        self.book(team_id, size, desk_type, DAY)
    }

    pub fn book(mut self, team_id: TeamId, size: usize, desk_type: DeskType, date: i64) -> Self {
        for _ in 0..size {
            let id = self.reservations.len() as u32 + 1;
            self.reservations.push(Reservation {
                id,
                user_id: 1000 + id,
                team_id,
                date,
                created_at: i64::from(id),
                desired_desk_type: desk_type,
                assigned_desk: None,
            });
        }
        self
    }

    pub fn team_id(&self, name: &str) -> TeamId {
        self.teams.iter().find(|team| team.name == name).map(|team| team.id).unwrap()
    }

    pub fn zone_id(&self, name: &str) -> ZoneId {
        self.zones.iter().find(|zone| zone.name == name).map(|zone| zone.id).unwrap()
    }

    pub fn build(self) -> Problem {
        Problem {
            reservations: self.reservations,
            desks: self.desks,
            zones: self.zones,
            teams: self.teams,
        }
    }
}

/// Zone of every seated reservation of `team`.
pub fn team_zones(problem: &Problem, outcome: &AssignmentOutcome, team: TeamId) -> HashSet<ZoneId> {
    let desk_zone: HashMap<DeskId, ZoneId> = problem.desks.iter().map(|desk| (desk.id, desk.zone_id)).collect();
    outcome
        .assignments
        .iter()
        .filter(|assignment| assignment.team_id == team)
        .filter_map(|assignment| assignment.desk_id)
        .map(|desk| desk_zone[&desk])
        .collect()
}

/// Panics if any desk is handed out twice.
pub fn assert_no_double_booking(outcome: &AssignmentOutcome) {
    let mut seen = HashSet::new();
    for desk in outcome.assignments.iter().filter_map(|assignment| assignment.desk_id) {
        assert!(seen.insert(desk), "desk {desk} assigned twice");
    }
}
