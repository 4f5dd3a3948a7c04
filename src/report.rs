//! Read-only views over a day's seating: desk availability and how
//! fragmented each team ended up.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::Serialize;

use crate::model::{Desk, Reservation, Team, TeamId, Zone, ZoneId, ZoneType};
use crate::solver::AssignmentOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeskCount {
    pub free: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilitySummary {
    pub date: i64,
    /// Desks outside HR zones.
    pub all: DeskCount,
    /// Desks in focus-type zones.
    pub focus: DeskCount,
    pub any_available: bool,
}

/// Free and total desks for a date, from the reservations' assigned desks.
pub fn availability(date: i64, zones: &[Zone], desks: &[Desk], reservations: &[Reservation]) -> AvailabilitySummary {
    let zone_types: HashMap<ZoneId, ZoneType> = zones.iter().map(|zone| (zone.id, zone.zone_type)).collect();
    let taken: HashSet<_> = reservations
        .iter()
        .filter(|reservation| reservation.date == date)
        .filter_map(|reservation| reservation.assigned_desk)
        .collect();

    let mut all = DeskCount { free: 0, total: 0 };
    let mut focus = DeskCount { free: 0, total: 0 };
    for desk in desks {
        let Some(&zone_type) = zone_types.get(&desk.zone_id) else {
            continue;
        };
        let free = !taken.contains(&desk.id);
        if zone_type != ZoneType::Hr {
            all.total += 1;
            all.free += usize::from(free);
        }
        if zone_type.is_focus() {
            focus.total += 1;
            focus.free += usize::from(free);
        }
    }

    AvailabilitySummary {
        date,
        all,
        focus,
        any_available: all.free > 0,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamPlacement {
    pub team_id: TeamId,
    pub team_name: String,
    pub reservation_count: usize,
    pub zones_count: usize,
    pub floors_count: usize,
}

/// Per-team spread of an outcome, largest teams first.
pub fn placement_stats(outcome: &AssignmentOutcome, zones: &[Zone], desks: &[Desk], teams: &[Team]) -> Vec<TeamPlacement> {
    let floors: HashMap<ZoneId, i32> = zones.iter().map(|zone| (zone.id, zone.floor)).collect();
    let desk_zone: HashMap<_, ZoneId> = desks.iter().map(|desk| (desk.id, desk.zone_id)).collect();
    let names: HashMap<TeamId, &str> = teams.iter().map(|team| (team.id, team.name.as_str())).collect();

    let mut per_team: BTreeMap<TeamId, (usize, BTreeSet<ZoneId>, BTreeSet<i32>)> = BTreeMap::new();
    for assignment in &outcome.assignments {
        let entry = per_team.entry(assignment.team_id).or_default();
        entry.0 += 1;
        let Some(&zone_id) = assignment.desk_id.and_then(|desk| desk_zone.get(&desk)) else {
            continue;
        };
        entry.1.insert(zone_id);
        if let Some(&floor) = floors.get(&zone_id) {
            entry.2.insert(floor);
        }
    }

    let mut stats: Vec<TeamPlacement> = per_team
        .into_iter()
        .map(|(team_id, (count, zones, floors))| TeamPlacement {
            team_id,
            team_name: names.get(&team_id).map_or_else(|| format!("#{team_id}"), |name| name.to_string()),
            reservation_count: count,
            zones_count: zones.len(),
            floors_count: floors.len(),
        })
        .collect();
    stats.sort_by(|a, b| b.reservation_count.cmp(&a.reservation_count).then(a.team_id.cmp(&b.team_id)));
    stats
}
