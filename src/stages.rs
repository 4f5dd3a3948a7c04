//! Rule-based placement stages.
//!
//! Stages run in a fixed order: special teams, single-member teams, then
//! whole teams that exactly fit an empty zone. Each stage pops desks from the
//! [`Inventory`] and removes the teams it handled from the [`TeamGroups`];
//! whatever is left afterwards goes to the annealing stage.

use tracing::{debug, info, warn};

use crate::error::AssignmentFailure;
use crate::grouper::{TeamDirectory, TeamGroups};
use crate::inventory::Inventory;
use crate::model::{DeskId, TeamId, ZoneId};
use crate::policy::{AssignmentPolicy, HR_TEAM};

/// Read-only inputs shared by every stage.
#[derive(Debug, Clone, Copy)]
pub struct StageContext<'a> {
    pub policy: &'a AssignmentPolicy,
    pub teams: &'a TeamDirectory,
}

/// Desk per reservation (parallel to the reservation slice) plus the
/// shortfalls recorded so far.
#[derive(Debug, Clone, Default)]
pub struct Seating {
    pub seats: Vec<Option<DeskId>>,
    pub failures: Vec<AssignmentFailure>,
}

impl Seating {
    pub fn new(reservation_count: usize) -> Self {
        Self {
            seats: vec![None; reservation_count],
            failures: Vec::new(),
        }
    }

    pub fn seated(&self) -> usize {
        self.seats.iter().filter(|seat| seat.is_some()).count()
    }
}

// ============================================================================
// Special teams
// ============================================================================

/// Seat policy-designated special teams in their eligible zones.
///
/// Zones are filled one after another in policy order. A team that does not
/// fit is recorded as a shortfall; either way it leaves the general pool.
/// The first HR zone is withdrawn afterwards so no other team can use it.
pub fn place_special_teams(
    ctx: StageContext<'_>,
    inventory: &mut Inventory,
    groups: &mut TeamGroups,
    seating: &mut Seating,
) {
    for team_name in ctx.policy.special_team_order() {
        let zone_ids = resolve_zones(inventory, team_name, ctx.policy.special_zones(team_name));

        for team in ctx.teams.ids_named(team_name) {
            let Some(members) = groups.remove(team) else {
                continue;
            };

            let assigned = fill_sequentially(&members, &zone_ids, inventory, seating);
            info!(team = team_name, size = members.len(), assigned, "special team placed");

            if assigned < members.len() {
                let unassigned = members.len() - assigned;
                warn!(team = team_name, unassigned, "special team exceeds its zone capacity");
                seating.failures.push(AssignmentFailure::SpecialTeamShortfall {
                    team: team_name.to_string(),
                    unassigned,
                });
            }

            if team_name != HR_TEAM {
                if let Some(&primary) = zone_ids.first() {
                    reserve_primary_zone(primary, &members, inventory, groups, seating);
                }
            }
        }

        // The HR room never goes to general teams, HR present or not.
        if team_name == HR_TEAM {
            if let Some(&primary) = zone_ids.first() {
                let withdrawn = inventory.withdraw(primary);
                debug!(zone_id = primary, desks = withdrawn.len(), "HR zone closed to other teams");
            }
        }
    }
}

fn resolve_zones(inventory: &Inventory, team_name: &str, zone_names: &[String]) -> Vec<ZoneId> {
    zone_names
        .iter()
        .filter_map(|zone_name| match inventory.zone_by_name(zone_name) {
            Some(zone) => Some(zone.id),
            None => {
                warn!(team = team_name, zone = %zone_name, "policy references unknown zone, skipping");
                None
            }
        })
        .collect()
}

/// Take desks zone by zone until the members are seated or the zones run dry.
fn fill_sequentially(
    members: &[usize],
    zone_ids: &[ZoneId],
    inventory: &mut Inventory,
    seating: &mut Seating,
) -> usize {
    let mut assigned = 0;
    for &zone_id in zone_ids {
        while assigned < members.len() {
            let Some(desk) = inventory.pop_desk(zone_id) else {
                break;
            };
            seating.seats[members[assigned]] = Some(desk);
            assigned += 1;
        }
        if assigned == members.len() {
            break;
        }
    }
    assigned
}

/// Keep a special team's first zone to itself once it has moved in.
///
/// The leftover desks are only withdrawn when the rest of the office can
/// still seat every reservation not yet placed.
fn reserve_primary_zone(
    primary: ZoneId,
    members: &[usize],
    inventory: &mut Inventory,
    groups: &TeamGroups,
    seating: &Seating,
) {
    if inventory.is_exhausted(primary) {
        return;
    }

    let moved_in = members.iter().any(|&member| {
        seating.seats[member]
            .and_then(|desk| inventory.desk(desk))
            .is_some_and(|desk| desk.zone_id == primary)
    });
    if !moved_in {
        return;
    }

    let outside = inventory.total_available() - inventory.available(primary);
    if groups.reservation_count() <= outside {
        let withdrawn = inventory.withdraw(primary);
        debug!(zone_id = primary, desks = withdrawn.len(), "special zone reserved");
    }
}

// ============================================================================
// Single-member teams
// ============================================================================

/// Seat every team with exactly one reservation, walking zone types in the
/// order the policy gives for size one.
pub fn place_single_member_teams(
    ctx: StageContext<'_>,
    inventory: &mut Inventory,
    groups: &mut TeamGroups,
    seating: &mut Seating,
) {
    let solo_teams: Vec<TeamId> = groups
        .teams()
        .filter(|(_, members)| members.len() == 1)
        .map(|(team, _)| team)
        .collect();
    let type_order = ctx.policy.priority_types(1);

    let mut placed = 0;
    for team in solo_teams {
        let Some(members) = groups.remove(team) else {
            continue;
        };

        let desk = type_order.iter().find_map(|&zone_type| {
            let zone_ids: Vec<ZoneId> = inventory.zones_of_type(zone_type).map(|zone| zone.id).collect();
            zone_ids.into_iter().find_map(|zone_id| inventory.pop_desk(zone_id))
        });

        match desk {
            Some(desk) => {
                seating.seats[members[0]] = Some(desk);
                placed += 1;
                debug!(team, desk, "single-member team placed");
            }
            None => {
                let name = ctx.teams.name(team);
                warn!(team = %name, "no desk left for single-member team");
                seating.failures.push(AssignmentFailure::SoloTeamUnplaced { team: name });
            }
        }
    }

    info!(placed, "single-member teams placed");
}

// ============================================================================
// Best fit
// ============================================================================

/// Seat whole teams in empty zones whose desk count equals the team size.
///
/// Larger teams choose first. Teams without an exact match stay in the groups
/// for the annealing stage; nothing is split here.
pub fn place_best_fit_teams(
    ctx: StageContext<'_>,
    inventory: &mut Inventory,
    groups: &mut TeamGroups,
    seating: &mut Seating,
) {
    let mut empty_zones: Vec<ZoneId> = inventory
        .zones()
        .filter(|zone| inventory.is_zone_empty(zone.id))
        .map(|zone| zone.id)
        .collect();

    let mut teams: Vec<(TeamId, usize)> = groups
        .teams()
        .map(|(team, members)| (team, members.len()))
        .collect();
    teams.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut placed = 0;
    for (team, size) in teams {
        let candidate = empty_zones
            .iter()
            .enumerate()
            .filter(|(_, zone_id)| inventory.capacity(**zone_id) == size)
            .min_by_key(|(_, zone_id)| {
                let rank = inventory
                    .zone(**zone_id)
                    .map_or(usize::MAX, |zone| ctx.policy.type_rank(size, zone.zone_type));
                (rank, **zone_id)
            })
            .map(|(position, zone_id)| (position, *zone_id));

        let Some((position, zone_id)) = candidate else {
            continue;
        };
        empty_zones.remove(position);

        let Some(members) = groups.remove(team) else {
            continue;
        };
        for member in members {
            seating.seats[member] = inventory.pop_desk(zone_id);
        }
        placed += 1;
        debug!(team, zone_id, size, "team seated in exactly fitting zone");
    }

    info!(placed, remaining = groups.len(), "best-fit stage finished");
}
