//! Capacity pre-flight check.
//!
//! Cheaper than a full run: no desks are assigned. Each team needs a single
//! zone with enough declared desks of the type its first reservation asks
//! for; zones are tried in zone type order and a working counter is
//! decremented as teams claim capacity.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::debug;

use crate::grouper::{TeamDirectory, TeamGroups};
use crate::model::{DeskType, Reservation, Team, Zone, ZoneId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub all_teams_fit: bool,
    pub failed_teams: Vec<String>,
}

pub fn validate_capacity(reservations: &[Reservation], zones: &[Zone], teams: &[Team]) -> ValidationReport {
    let mut ordered: Vec<&Zone> = zones.iter().collect();
    ordered.sort_by_key(|zone| (zone.zone_type, zone.id));

    let mut remaining: HashMap<ZoneId, BTreeMap<DeskType, u32>> = ordered
        .iter()
        .map(|zone| (zone.id, zone.typed_desks.clone()))
        .collect();

    let directory = TeamDirectory::new(teams);
    let groups = TeamGroups::group_by_team(reservations);
    let mut failed_teams = Vec::new();

    for (team, members) in groups.teams() {
        let size = members.len() as u32;
        let desk_type = reservations[members[0]].desired_desk_type;

        let claimed = ordered.iter().find_map(|zone| {
            let free = remaining.get_mut(&zone.id)?.get_mut(&desk_type)?;
            if *free >= size {
                *free -= size;
                Some(zone.id)
            } else {
                None
            }
        });

        match claimed {
            Some(zone_id) => debug!(team, zone_id, size, "team fits"),
            None => failed_teams.push(directory.name(team)),
        }
    }

    ValidationReport {
        all_teams_fit: failed_teams.is_empty(),
        failed_teams,
    }
}
