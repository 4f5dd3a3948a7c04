//! Assignment policy: which zones special teams may use and which zone types
//! each team size should try first.
//!
//! The policy is validated once, before any placement starts. Zone types are
//! parsed into [`ZoneType`] at load time, so an unknown type name fails the
//! load instead of surfacing halfway through a run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::PolicyError;
use crate::model::ZoneType;

/// Team whose first zone is closed to everyone else.
pub const HR_TEAM: &str = "HR";

/// Special teams every policy must configure, in processing order.
pub const REQUIRED_SPECIAL_TEAMS: [&str; 2] = [HR_TEAM, "Executive"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSizeRule {
    pub min_size: usize,
    pub max_size: usize,
    pub priority_types: Vec<ZoneType>,
}

impl TeamSizeRule {
    pub fn covers(&self, team_size: usize) -> bool {
        (self.min_size..=self.max_size).contains(&team_size)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentPolicy {
    /// Special team name -> eligible zone names, tried in order.
    pub special_teams: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub team_size_rules: Vec<TeamSizeRule>,
}

impl AssignmentPolicy {
    /// Parse and validate a JSON policy document.
    pub fn from_json_str(json: &str) -> Result<Self, PolicyError> {
        let policy: AssignmentPolicy = serde_json::from_str(json)?;
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), PolicyError> {
        for name in REQUIRED_SPECIAL_TEAMS {
            match self.special_teams.get(name) {
                None => return Err(PolicyError::MissingSpecialTeam(name.to_string())),
                Some(zones) if zones.is_empty() => {
                    return Err(PolicyError::EmptySpecialTeam(name.to_string()));
                }
                Some(_) => {}
            }
        }

        for (name, zones) in &self.special_teams {
            if zones.is_empty() {
                return Err(PolicyError::EmptySpecialTeam(name.clone()));
            }
        }

        for rule in &self.team_size_rules {
            if rule.min_size == 0 || rule.min_size > rule.max_size {
                return Err(PolicyError::InvalidSizeRule {
                    min_size: rule.min_size,
                    max_size: rule.max_size,
                });
            }
        }

        if self.priority_types(1).is_empty() {
            warn!("policy has no zone types for single-member teams");
        }

        Ok(())
    }

    /// Special team names in processing order: required teams first, then
    /// any additional team in name order.
    pub fn special_team_order(&self) -> Vec<&str> {
        let mut order: Vec<&str> = REQUIRED_SPECIAL_TEAMS
            .iter()
            .copied()
            .filter(|name| self.special_teams.contains_key(*name))
            .collect();
        order.extend(
            self.special_teams
                .keys()
                .map(String::as_str)
                .filter(|name| !REQUIRED_SPECIAL_TEAMS.contains(name)),
        );
        order
    }

    pub fn special_zones(&self, team_name: &str) -> &[String] {
        self.special_teams
            .get(team_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_special(&self, team_name: &str) -> bool {
        self.special_teams.contains_key(team_name)
    }

    /// Zone types to try for a team of `team_size`, from the first matching rule.
    pub fn priority_types(&self, team_size: usize) -> &[ZoneType] {
        self.team_size_rules
            .iter()
            .find(|rule| rule.covers(team_size))
            .map(|rule| rule.priority_types.as_slice())
            .unwrap_or(&[])
    }

    /// Rank of `zone_type` for a team of `team_size`; unlisted types rank last.
    pub fn type_rank(&self, team_size: usize, zone_type: ZoneType) -> usize {
        let types = self.priority_types(team_size);
        types
            .iter()
            .position(|t| *t == zone_type)
            .unwrap_or(types.len())
    }
}
