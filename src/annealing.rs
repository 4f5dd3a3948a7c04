//! Simulated annealing over the reservations the rule-based stages left over.
//!
//! The only move is swapping the desks of two seated reservations, so the set
//! of occupied desks never changes and every neighbor is feasible. The search
//! returns the best snapshot it has seen, not the state it ends in.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::model::{DeskId, TeamId, ZoneId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnealingOptions {
    pub initial_temperature: f64,
    /// The search stops once the temperature drops to this floor.
    pub end_temperature: f64,
    /// Geometric cooling factor applied every iteration.
    pub cooling_rate: f64,
    /// Hard cap on iterations, whatever the temperature.
    pub max_iterations: usize,
    /// Optional wall-clock budget for the search.
    pub time_limit: Option<Duration>,
    /// Fixed RNG seed for reproducible runs; fresh entropy when `None`.
    pub seed: Option<u64>,
}

impl Default for AnnealingOptions {
    fn default() -> Self {
        Self {
            initial_temperature: 100_000.0,
            end_temperature: 1.0,
            cooling_rate: 0.9998,
            max_iterations: 200_000,
            time_limit: None,
            seed: None,
        }
    }
}

/// Weights of the fragmentation penalty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenaltyWeights {
    /// Charged once per team spread over more than one floor.
    pub floor_split: u64,
    /// Per-member charge for a team spread over more than one zone.
    pub zone_split: u64,
}

impl Default for PenaltyWeights {
    fn default() -> Self {
        Self {
            floor_split: 10_000_000,
            zone_split: 500,
        }
    }
}

/// Penalty for one team of `size` seated members spanning `floors` floors
/// and `zones` zones.
pub fn split_penalty(size: usize, floors: usize, zones: usize, weights: &PenaltyWeights) -> u64 {
    if size == 0 {
        return 0;
    }

    let mut penalty = 0;
    if floors > 1 {
        penalty += weights.floor_split;
    }
    let size = size as u64;
    match zones {
        0 | 1 => {}
        2 => penalty += weights.zone_split * size,
        n => penalty += 2 * weights.zone_split * (n as u64 - 1) * size,
    }
    penalty
}

/// A desk the annealer may hand out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateDesk {
    pub id: DeskId,
    pub zone_id: ZoneId,
    pub floor: i32,
}

/// A team still waiting for desks; members are reservation indices.
#[derive(Debug, Clone)]
pub struct PendingTeam {
    pub team: TeamId,
    pub members: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct AnnealingOutcome {
    /// Reservation index with the desk it ended up with.
    pub seats: Vec<(usize, Option<DeskId>)>,
    pub initial_score: u64,
    pub best_score: u64,
    pub iterations: usize,
}

impl AnnealingOutcome {
    pub fn unassigned(&self) -> impl Iterator<Item = usize> + '_ {
        self.seats
            .iter()
            .filter(|(_, desk)| desk.is_none())
            .map(|(reservation, _)| *reservation)
    }
}

/// Flattened problem: one slot per pending reservation.
struct Layout<'a> {
    desks: Vec<CandidateDesk>,
    slot_team: Vec<usize>,
    members: Vec<Vec<usize>>,
    weights: &'a PenaltyWeights,
}

impl Layout<'_> {
    fn team_penalty(&self, team: usize, solution: &[Option<usize>]) -> u64 {
        let mut floors = Vec::new();
        let mut zones = Vec::new();
        for &slot in &self.members[team] {
            if let Some(desk) = solution[slot] {
                floors.push(self.desks[desk].floor);
                zones.push(self.desks[desk].zone_id);
            }
        }
        let size = zones.len();
        floors.sort_unstable();
        floors.dedup();
        zones.sort_unstable();
        zones.dedup();
        split_penalty(size, floors.len(), zones.len(), self.weights)
    }
}

/// Assign every pending reservation to the remaining desks, minimising team
/// fragmentation.
///
/// `pools` holds the remaining desks of each zone in hand-out order.
pub fn refine<R: Rng>(
    teams: &[PendingTeam],
    pools: Vec<Vec<CandidateDesk>>,
    options: &AnnealingOptions,
    weights: &PenaltyWeights,
    rng: &mut R,
) -> AnnealingOutcome {
    let mut desks = Vec::new();
    let mut desk_pools: Vec<(ZoneId, VecDeque<usize>)> = Vec::with_capacity(pools.len());
    for pool in pools {
        let Some(zone_id) = pool.first().map(|desk| desk.zone_id) else {
            continue;
        };
        let indices = pool
            .into_iter()
            .map(|desk| {
                desks.push(desk);
                desks.len() - 1
            })
            .collect();
        desk_pools.push((zone_id, indices));
    }

    let mut slot_reservation = Vec::new();
    let mut slot_team = Vec::new();
    let mut members = Vec::with_capacity(teams.len());
    for (team_index, team) in teams.iter().enumerate() {
        let mut slots = Vec::with_capacity(team.members.len());
        for &reservation in &team.members {
            slots.push(slot_reservation.len());
            slot_reservation.push(reservation);
            slot_team.push(team_index);
        }
        members.push(slots);
    }

    let layout = Layout {
        desks,
        slot_team,
        members,
        weights,
    };

    let initial = initial_solution(&layout, desk_pools);
    let mut team_scores: Vec<u64> = (0..layout.members.len())
        .map(|team| layout.team_penalty(team, &initial))
        .collect();
    let initial_score: u64 = team_scores.iter().sum();

    let holders: Vec<usize> = (0..initial.len()).filter(|&slot| initial[slot].is_some()).collect();

    let mut current = initial;
    let mut current_score = initial_score;
    let mut best = current.clone();
    let mut best_score = current_score;

    let started = Instant::now();
    let mut temperature = options.initial_temperature;
    let mut iterations = 0;

    if holders.len() >= 2 {
        while temperature > options.end_temperature && iterations < options.max_iterations {
            if best_score == 0 {
                break;
            }
            if let Some(limit) = options.time_limit {
                if iterations % 1024 == 0 && started.elapsed() >= limit {
                    debug!(iterations, "annealing time limit reached");
                    break;
                }
            }
            iterations += 1;

            let a = holders[rng.gen_range(0..holders.len())];
            let b = holders[rng.gen_range(0..holders.len())];
            let (team_a, team_b) = (layout.slot_team[a], layout.slot_team[b]);

            if team_a != team_b {
                current.swap(a, b);
                let score_a = layout.team_penalty(team_a, &current);
                let score_b = layout.team_penalty(team_b, &current);
                let neighbor_score =
                    current_score - team_scores[team_a] - team_scores[team_b] + score_a + score_b;

                if accept(current_score, neighbor_score, temperature, rng) {
                    team_scores[team_a] = score_a;
                    team_scores[team_b] = score_b;
                    current_score = neighbor_score;
                    if current_score < best_score {
                        best.clone_from(&current);
                        best_score = current_score;
                    }
                } else {
                    current.swap(a, b);
                }
            }

            temperature *= options.cooling_rate;
        }
    }

    info!(
        slots = slot_reservation.len(),
        initial_score,
        best_score,
        iterations,
        "annealing finished"
    );

    let seats = slot_reservation
        .into_iter()
        .zip(best)
        .map(|(reservation, desk)| (reservation, desk.map(|index| layout.desks[index].id)))
        .collect();

    AnnealingOutcome {
        seats,
        initial_score,
        best_score,
        iterations,
    }
}

/// Whole teams go into the first (largest-first) pool that can hold them;
/// stragglers take any desk left, first come first served.
fn initial_solution(layout: &Layout<'_>, mut pools: Vec<(ZoneId, VecDeque<usize>)>) -> Vec<Option<usize>> {
    pools.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then(a.0.cmp(&b.0)));

    let mut solution = vec![None; layout.slot_team.len()];

    for slots in &layout.members {
        if let Some((_, pool)) = pools.iter_mut().find(|(_, pool)| pool.len() >= slots.len()) {
            for &slot in slots {
                solution[slot] = pool.pop_front();
            }
        }
    }

    for seat in solution.iter_mut().filter(|seat| seat.is_none()) {
        *seat = pools
            .iter_mut()
            .find(|(_, pool)| !pool.is_empty())
            .and_then(|(_, pool)| pool.pop_front());
    }

    solution
}

fn accept<R: Rng>(current: u64, neighbor: u64, temperature: f64, rng: &mut R) -> bool {
    if neighbor <= current {
        return true;
    }
    let probability = ((current as f64 - neighbor as f64) / temperature).exp();
    rng.gen_range(0.0..1.0) < probability
}
