//! desk-planner
//!
//! Assigns office desks to a day's reservations so that teams sit together:
//! special teams in their reserved zones, single members in quiet zones,
//! other teams in zones that fit them exactly, and simulated annealing for
//! everyone left over.

pub mod annealing;
pub mod error;
pub mod grouper;
pub mod improve;
pub mod inventory;
pub mod memory;
pub mod model;
pub mod policy;
pub mod report;
pub mod service;
pub mod solver;
pub mod stages;
pub mod traits;
pub mod validate;
