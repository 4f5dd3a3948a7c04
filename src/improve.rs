//! Local improvement passes applied to a complete seating.
//!
//! Both passes only exchange desks between reservations of the same team or
//! within the same zone, so the set of zones and floors each team occupies is
//! left untouched.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::grouper::TeamGroups;
use crate::inventory::Inventory;
use crate::model::{DeskId, Reservation, TeamId, ZoneId};

/// Number of seated reservations whose desk matches the requested type.
pub fn preference_matches(reservations: &[Reservation], seats: &[Option<DeskId>], inventory: &Inventory) -> usize {
    reservations
        .iter()
        .zip(seats)
        .filter(|(reservation, seat)| {
            seat.and_then(|desk| inventory.desk_type(desk)) == Some(reservation.desired_desk_type)
        })
        .count()
}

/// Pull team members next to each other within every zone.
///
/// Occupied desks of a zone are walked in desk id order. Whenever a team's
/// run is shorter than its head count in that zone, the next member found
/// further along is swapped into the position right after the run.
/// Returns the number of swaps made.
pub fn reorganize_seating(reservations: &[Reservation], seats: &mut [Option<DeskId>], inventory: &Inventory) -> usize {
    let mut by_zone: BTreeMap<ZoneId, Vec<(DeskId, usize)>> = BTreeMap::new();
    for (index, seat) in seats.iter().enumerate() {
        let Some(desk) = *seat else {
            continue;
        };
        if let Some(zone) = inventory.zone_of(desk) {
            by_zone.entry(zone.id).or_default().push((desk, index));
        }
    }

    let mut swaps = 0;
    for (zone_id, mut occupied) in by_zone {
        occupied.sort_unstable();
        let desks: Vec<DeskId> = occupied.iter().map(|(desk, _)| *desk).collect();
        let mut order: Vec<usize> = occupied.iter().map(|(_, index)| *index).collect();
        let team_of = |index: usize| reservations[index].team_id;

        let mut head_count: HashMap<TeamId, usize> = HashMap::new();
        for &index in &order {
            *head_count.entry(team_of(index)).or_default() += 1;
        }

        for i in 0..order.len() {
            let team = team_of(order[i]);
            let mut run_start = i;
            while run_start > 0 && team_of(order[run_start - 1]) == team {
                run_start -= 1;
            }
            if i - run_start + 1 >= head_count[&team] {
                continue;
            }
            if let Some(j) = (i + 1..order.len()).find(|&j| team_of(order[j]) == team) {
                if j != i + 1 {
                    order.swap(i + 1, j);
                    swaps += 1;
                }
            }
        }

        for (index, desk) in order.into_iter().zip(desks) {
            seats[index] = Some(desk);
        }
        debug!(zone_id, "zone seating reorganized");
    }
    swaps
}

/// Swap desks between two teammates when that gives both of them the desk
/// type they asked for. Returns the number of swaps made.
pub fn improve_desk_type_match(
    reservations: &[Reservation],
    seats: &mut [Option<DeskId>],
    inventory: &Inventory,
) -> usize {
    let groups = TeamGroups::group_by_team(reservations);
    let desk_type = |seat: Option<DeskId>| seat.and_then(|desk| inventory.desk_type(desk));

    let mut swaps = 0;
    for (_, members) in groups.teams() {
        let seated: Vec<usize> = members.iter().copied().filter(|&index| seats[index].is_some()).collect();
        if seated.len() <= 1 {
            continue;
        }

        for i in 0..seated.len() {
            let a = seated[i];
            let wants_a = Some(reservations[a].desired_desk_type);
            if desk_type(seats[a]) == wants_a {
                continue;
            }

            for &b in &seated[i + 1..] {
                let wants_b = Some(reservations[b].desired_desk_type);
                if desk_type(seats[b]) == wants_b {
                    continue;
                }
                if desk_type(seats[b]) == wants_a && desk_type(seats[a]) == wants_b {
                    seats.swap(a, b);
                    swaps += 1;
                    break;
                }
            }
        }
    }
    swaps
}
