//! Date-level entry point wiring the collaborators to the solver.
//!
//! A run loads everything for a date up front, solves in memory and persists
//! the whole outcome in one batch. Nothing is written if loading or solving
//! fails.

use tracing::{info, info_span, warn};

use crate::error::{AssignError, BoxError};
use crate::model::Problem;
use crate::policy::AssignmentPolicy;
use crate::report::{self, AvailabilitySummary, TeamPlacement};
use crate::solver::{self, AssignmentOutcome, SolveOptions};
use crate::traits::{AssignmentStore, InventorySource, PolicySource, ReservationSource};
use crate::validate::{self, ValidationReport};

pub struct DeskAssigner<'a, S> {
    store: &'a S,
    options: SolveOptions,
}

impl<'a, S> DeskAssigner<'a, S>
where
    S: ReservationSource + InventorySource + PolicySource + AssignmentStore,
{
    pub fn new(store: &'a S, options: SolveOptions) -> Self {
        Self { store, options }
    }

    pub fn options(&self) -> &SolveOptions {
        &self.options
    }

    /// Load the problem for `date` with any previous assignment cleared.
    pub fn load(&self, date: i64) -> Result<(Problem, AssignmentPolicy), AssignError> {
        let source = |source: BoxError| AssignError::Source { date, source };

        let mut reservations = self.store.reservations_for(date).map_err(source)?;
        for reservation in &mut reservations {
            reservation.assigned_desk = None;
        }
        let problem = Problem {
            reservations,
            desks: self.store.desks().map_err(source)?,
            zones: self.store.zones().map_err(source)?,
            teams: self.store.teams().map_err(source)?,
        };
        let policy = self.store.policy().map_err(source)?;
        Ok((problem, policy))
    }

    /// Assign desks for `date`, persist them and return the outcome.
    pub fn assign_outcome(&self, date: i64) -> Result<AssignmentOutcome, AssignError> {
        let _span = info_span!("assign_date", date).entered();
        let (problem, policy) = self.load(date)?;
        let outcome = solver::solve(&problem, &policy, &self.options)?;
        self.persist(date, &outcome)?;
        Ok(outcome)
    }

    /// Assign desks for `date` and return the failure messages.
    pub fn assign(&self, date: i64) -> Result<Vec<String>, AssignError> {
        self.assign_outcome(date).map(|outcome| outcome.failure_messages())
    }

    /// Assign several dates, solving them in parallel.
    ///
    /// Loading and persisting stay sequential. A failing date does not stop
    /// the others.
    pub fn assign_dates(&self, dates: &[i64]) -> Vec<(i64, Result<AssignmentOutcome, AssignError>)> {
        let mut results: Vec<(i64, Result<AssignmentOutcome, AssignError>)> = Vec::with_capacity(dates.len());
        let mut loaded = Vec::new();

        for &date in dates {
            match self.load(date) {
                Ok(problem) => loaded.push((date, problem)),
                Err(err) => {
                    warn!(date, error = %err, "skipping date");
                    results.push((date, Err(err)));
                }
            }
        }

        // The policy is shared by every date; take the first one loaded.
        let Some(policy) = loaded.first().map(|(_, (_, policy))| policy.clone()) else {
            return results;
        };
        let (days, problems): (Vec<i64>, Vec<Problem>) =
            loaded.into_iter().map(|(date, (problem, _))| (date, problem)).unzip();

        let solved = solver::solve_many(&problems, &policy, &self.options);
        for (date, outcome) in days.into_iter().zip(solved) {
            let result = outcome
                .map_err(AssignError::from)
                .and_then(|outcome| self.persist(date, &outcome).map(|()| outcome));
            results.push((date, result));
        }

        info!(dates = results.len(), "multi-date assignment finished");
        results
    }

    /// Capacity pre-flight for `date`; assigns nothing.
    pub fn validate(&self, date: i64) -> Result<ValidationReport, AssignError> {
        let (problem, _) = self.load(date)?;
        Ok(validate::validate_capacity(&problem.reservations, &problem.zones, &problem.teams))
    }

    /// Free and total desks for `date` as currently stored.
    pub fn availability(&self, date: i64) -> Result<AvailabilitySummary, AssignError> {
        let source = |source: BoxError| AssignError::Source { date, source };
        let reservations = self.store.reservations_for(date).map_err(source)?;
        let zones = self.store.zones().map_err(source)?;
        let desks = self.store.desks().map_err(source)?;
        Ok(report::availability(date, &zones, &desks, &reservations))
    }

    /// Per-team spread of an outcome over the stored layout.
    pub fn placement_stats(&self, outcome: &AssignmentOutcome) -> Result<Vec<TeamPlacement>, BoxError> {
        Ok(report::placement_stats(
            outcome,
            &self.store.zones()?,
            &self.store.desks()?,
            &self.store.teams()?,
        ))
    }

    fn persist(&self, date: i64, outcome: &AssignmentOutcome) -> Result<(), AssignError> {
        self.store
            .save_assignments(date, &outcome.store_rows())
            .map_err(|source| AssignError::Store { date, source })?;
        info!(
            date,
            assigned = outcome.assigned_count(),
            failures = outcome.failures.len(),
            "assignments saved"
        );
        Ok(())
    }
}
