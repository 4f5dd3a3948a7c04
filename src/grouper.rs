//! Reservation grouping by team.
//!
//! Groups hold indices into the run's reservation slice rather than the
//! reservations themselves, so every stage writes to one shared assignment
//! vector.

use std::collections::{BTreeMap, HashMap};

use tracing::warn;

use crate::model::{Reservation, Team, TeamId};

/// Team id to name lookup.
#[derive(Debug, Clone, Default)]
pub struct TeamDirectory {
    names: HashMap<TeamId, String>,
}

impl TeamDirectory {
    pub fn new(teams: &[Team]) -> Self {
        let mut names = HashMap::with_capacity(teams.len());
        for team in teams {
            if names.insert(team.id, team.name.clone()).is_some() {
                warn!(team_id = team.id, "duplicate team id, keeping the last name");
            }
        }
        Self { names }
    }

    /// Team name, or a placeholder for a team missing from the directory.
    pub fn name(&self, team: TeamId) -> String {
        match self.names.get(&team) {
            Some(name) => name.clone(),
            None => format!("#{team}"),
        }
    }

    /// Ids of every team carrying `name`, ascending.
    pub fn ids_named(&self, name: &str) -> Vec<TeamId> {
        let mut ids: Vec<TeamId> = self
            .names
            .iter()
            .filter(|(_, team_name)| team_name.as_str() == name)
            .map(|(&id, _)| id)
            .collect();
        ids.sort_unstable();
        ids
    }
}

#[derive(Debug, Clone, Default)]
pub struct TeamGroups {
    groups: BTreeMap<TeamId, Vec<usize>>,
}

impl TeamGroups {
    /// Partition reservations by team. Members are ordered by booking time,
    /// then reservation id, so early bookings are seated first.
    pub fn group_by_team(reservations: &[Reservation]) -> Self {
        let mut groups: BTreeMap<TeamId, Vec<usize>> = BTreeMap::new();
        for (index, reservation) in reservations.iter().enumerate() {
            groups.entry(reservation.team_id).or_default().push(index);
        }
        for members in groups.values_mut() {
            members.sort_by_key(|&index| (reservations[index].created_at, reservations[index].id));
        }
        Self { groups }
    }

    pub fn get(&self, team: TeamId) -> Option<&[usize]> {
        self.groups.get(&team).map(Vec::as_slice)
    }

    /// Drop a team from further consideration, returning its members.
    pub fn remove(&mut self, team: TeamId) -> Option<Vec<usize>> {
        self.groups.remove(&team)
    }

    /// Remaining teams in ascending id order.
    pub fn teams(&self) -> impl Iterator<Item = (TeamId, &[usize])> + '_ {
        self.groups
            .iter()
            .map(|(&team, members)| (team, members.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn reservation_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DeskType;

    fn reservation(id: u32, team_id: TeamId, created_at: i64) -> Reservation {
        Reservation {
            id,
            user_id: id,
            team_id,
            date: 0,
            created_at,
            desired_desk_type: DeskType::Standard,
            assigned_desk: None,
        }
    }

    #[test]
    fn test_groups_by_team_in_booking_order() {
        let reservations = vec![
            reservation(1, 7, 30),
            reservation(2, 3, 10),
            reservation(3, 7, 10),
            reservation(4, 7, 10),
        ];
        let groups = TeamGroups::group_by_team(&reservations);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups.get(3), Some(&[1][..]));
        assert_eq!(groups.get(7), Some(&[2, 3, 0][..]));
        assert_eq!(groups.teams().map(|(team, _)| team).collect::<Vec<_>>(), vec![3, 7]);
        assert_eq!(groups.reservation_count(), 4);
    }

    #[test]
    fn test_directory_lookup() {
        let directory = TeamDirectory::new(&[
            Team { id: 2, name: "HR".into() },
            Team { id: 1, name: "Backend".into() },
        ]);
        assert_eq!(directory.name(1), "Backend");
        assert_eq!(directory.name(9), "#9");
        assert_eq!(directory.ids_named("HR"), vec![2]);
        assert!(directory.ids_named("Executive").is_empty());
    }

    #[test]
    fn test_remove_team() {
        let reservations = vec![reservation(1, 1, 0), reservation(2, 2, 0)];
        let mut groups = TeamGroups::group_by_team(&reservations);

        assert_eq!(groups.remove(1), Some(vec![0]));
        assert_eq!(groups.remove(1), None);
        assert_eq!(groups.len(), 1);
        assert!(!groups.is_empty());
    }
}
