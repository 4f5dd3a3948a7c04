//! Desk assignment pipeline.
//!
//! `solve` is a pure function over data loaded up front: rule-based stages,
//! simulated annealing for whatever is left, then local improvement passes.
//! Capacity shortfalls end up in [`AssignmentOutcome::failures`]; only a
//! malformed policy aborts the run.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, warn};

use crate::annealing::{self, AnnealingOptions, CandidateDesk, PenaltyWeights, PendingTeam};
use crate::error::{AssignmentFailure, PolicyError};
use crate::grouper::{TeamDirectory, TeamGroups};
use crate::improve;
use crate::inventory::Inventory;
use crate::model::{DeskId, Problem, ReservationId, TeamId};
use crate::policy::AssignmentPolicy;
use crate::stages::{self, Seating, StageContext};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolveOptions {
    pub annealing: AnnealingOptions,
    pub penalties: PenaltyWeights,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatAssignment {
    pub reservation_id: ReservationId,
    pub team_id: TeamId,
    pub desk_id: Option<DeskId>,
}

/// Scores of the annealing stage, when it ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnealingSummary {
    pub initial_score: u64,
    pub best_score: u64,
    pub iterations: usize,
}

#[derive(Debug, Clone)]
pub struct AssignmentOutcome {
    /// One entry per input reservation, in input order.
    pub assignments: Vec<SeatAssignment>,
    pub failures: Vec<AssignmentFailure>,
    pub annealing: Option<AnnealingSummary>,
}

impl AssignmentOutcome {
    pub fn failure_messages(&self) -> Vec<String> {
        self.failures.iter().map(ToString::to_string).collect()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn desk_of(&self, reservation_id: ReservationId) -> Option<DeskId> {
        self.assignments
            .iter()
            .find(|assignment| assignment.reservation_id == reservation_id)
            .and_then(|assignment| assignment.desk_id)
    }

    pub fn assigned_count(&self) -> usize {
        self.assignments
            .iter()
            .filter(|assignment| assignment.desk_id.is_some())
            .count()
    }

    /// `(reservation, desk)` pairs ready for the store.
    pub fn store_rows(&self) -> Vec<(ReservationId, Option<DeskId>)> {
        self.assignments
            .iter()
            .map(|assignment| (assignment.reservation_id, assignment.desk_id))
            .collect()
    }
}

/// Run the full pipeline, seeding the RNG from the options (or from entropy).
pub fn solve(
    problem: &Problem,
    policy: &AssignmentPolicy,
    options: &SolveOptions,
) -> Result<AssignmentOutcome, PolicyError> {
    let mut rng = match options.annealing.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    solve_with_rng(problem, policy, options, &mut rng)
}

/// Solve independent problems (one per date) in parallel.
///
/// With a fixed seed, problem `i` is solved with `seed + i`.
pub fn solve_many(
    problems: &[Problem],
    policy: &AssignmentPolicy,
    options: &SolveOptions,
) -> Vec<Result<AssignmentOutcome, PolicyError>> {
    problems
        .par_iter()
        .enumerate()
        .map(|(index, problem)| {
            let mut options = options.clone();
            options.annealing.seed = options.annealing.seed.map(|seed| seed.wrapping_add(index as u64));
            solve(problem, policy, &options)
        })
        .collect()
}

pub fn solve_with_rng<R: Rng>(
    problem: &Problem,
    policy: &AssignmentPolicy,
    options: &SolveOptions,
    rng: &mut R,
) -> Result<AssignmentOutcome, PolicyError> {
    policy.validate()?;

    let reservations = &problem.reservations;
    let _span = info_span!("assign", reservations = reservations.len(), desks = problem.desks.len()).entered();

    let mut inventory = Inventory::new(&problem.zones, &problem.desks);
    let teams = TeamDirectory::new(&problem.teams);
    let mut groups = TeamGroups::group_by_team(reservations);
    let mut seating = Seating::new(reservations.len());
    let ctx = StageContext {
        policy,
        teams: &teams,
    };

    stages::place_special_teams(ctx, &mut inventory, &mut groups, &mut seating);
    stages::place_single_member_teams(ctx, &mut inventory, &mut groups, &mut seating);
    stages::place_best_fit_teams(ctx, &mut inventory, &mut groups, &mut seating);

    let mut annealing_summary = None;
    let mut complete = true;

    if !groups.is_empty() {
        let pending: Vec<PendingTeam> = groups
            .teams()
            .map(|(team, members)| PendingTeam {
                team,
                members: members.to_vec(),
            })
            .collect();

        let remaining = inventory.drain_remaining();
        let pools: Vec<Vec<CandidateDesk>> = remaining
            .into_iter()
            .map(|(zone_id, desks)| {
                let floor = inventory.zone(zone_id).map_or(0, |zone| zone.floor);
                desks
                    .into_iter()
                    .map(|id| CandidateDesk { id, zone_id, floor })
                    .collect()
            })
            .collect();

        let outcome = annealing::refine(&pending, pools, &options.annealing, &options.penalties, rng);
        annealing_summary = Some(AnnealingSummary {
            initial_score: outcome.initial_score,
            best_score: outcome.best_score,
            iterations: outcome.iterations,
        });

        for &(index, desk) in &outcome.seats {
            seating.seats[index] = desk;
            if desk.is_none() {
                complete = false;
                warn!(reservation = reservations[index].id, "reservation left without a desk");
                seating.failures.push(AssignmentFailure::ReservationUnplaced {
                    reservation: reservations[index].id,
                });
            }
        }
    }

    if complete {
        let moved = improve::reorganize_seating(reservations, &mut seating.seats, &inventory);
        let swapped = improve::improve_desk_type_match(reservations, &mut seating.seats, &inventory);
        info!(moved, swapped, "local improvement passes applied");
    } else {
        info!("skipping local improvement passes, seating is incomplete");
    }

    let assignments = reservations
        .iter()
        .zip(&seating.seats)
        .map(|(reservation, desk)| SeatAssignment {
            reservation_id: reservation.id,
            team_id: reservation.team_id,
            desk_id: *desk,
        })
        .collect();

    info!(
        seated = seating.seated(),
        failures = seating.failures.len(),
        "assignment finished"
    );

    Ok(AssignmentOutcome {
        assignments,
        failures: seating.failures,
        annealing: annealing_summary,
    })
}
