//! Office data model consumed by the planner.
//!
//! Desks, zones and teams are immutable for the duration of a run. The only
//! field the planner writes is [`Reservation::assigned_desk`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub type DeskId = u32;
pub type ZoneId = u32;
pub type TeamId = u32;
pub type UserId = u32;
pub type ReservationId = u32;

/// Equipment class of a desk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeskType {
    WideMonitor,
    DualMonitor,
    Standard,
    Supercharged,
}

impl fmt::Display for DeskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeskType::WideMonitor => "WideMonitor",
            DeskType::DualMonitor => "DualMonitor",
            DeskType::Standard => "Standard",
            DeskType::Supercharged => "Supercharged",
        };
        f.write_str(name)
    }
}

/// Zone classification.
///
/// The declaration order is the zone ranking used by the capacity validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ZoneType {
    Focus,
    DuoFocus,
    WarRoom,
    Collaboration,
    Open,
    #[serde(rename = "HR")]
    Hr,
    Executive,
}

impl ZoneType {
    /// Quiet zone types counted separately in availability reports.
    pub fn is_focus(self) -> bool {
        matches!(self, ZoneType::Focus | ZoneType::DuoFocus | ZoneType::WarRoom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Desk {
    pub id: DeskId,
    pub zone_id: ZoneId,
    pub desk_type: DeskType,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    pub zone_type: ZoneType,
    pub floor: i32,
    /// Declared desk counts per desk type.
    #[serde(default)]
    pub typed_desks: BTreeMap<DeskType, u32>,
    pub total_desks: u32,
}

impl Zone {
    /// Declared number of desks of `desk_type`.
    pub fn declared(&self, desk_type: DeskType) -> u32 {
        self.typed_desks.get(&desk_type).copied().unwrap_or(0)
    }

    /// Whether the typed counts add up to the declared total.
    pub fn counts_consistent(&self) -> bool {
        self.typed_desks.values().sum::<u32>() == self.total_desks
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: ReservationId,
    pub user_id: UserId,
    /// Team of the reserving user.
    pub team_id: TeamId,
    /// Reservation day (unix timestamp, date only).
    pub date: i64,
    /// Creation time (unix seconds).
    pub created_at: i64,
    pub desired_desk_type: DeskType,
    #[serde(default)]
    pub assigned_desk: Option<DeskId>,
}

/// Everything a single run needs, loaded up front.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Problem {
    pub reservations: Vec<Reservation>,
    pub desks: Vec<Desk>,
    pub zones: Vec<Zone>,
    pub teams: Vec<Team>,
}
