//! Assignments bind a pilot and a drone to a mission
//!
//! The mission owns its assignment (`assigned_pilot` / `assigned_drone`).
//! Pilots and drones keep [`AssignmentRef`] back-references for lookup; the
//! store rebuilds them from the missions on every save.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::id::{DroneId, MissionId, PilotId};
use super::window::TimeWindow;

/// Back-reference from a pilot or drone to a mission it is assigned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssignmentRef {
    pub mission: MissionId,
    pub window: TimeWindow,
}

/// Current staffing of one non-completed mission
///
/// Either side may be missing while a mission is partially staffed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub mission: MissionId,
    pub pilot: Option<PilotId>,
    pub drone: Option<DroneId>,
    pub window: TimeWindow,
}

/// A pilot or drone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Resource {
    Pilot(PilotId),
    Drone(DroneId),
}

impl Resource {
    pub fn role(&self) -> Role {
        match self {
            Resource::Pilot(_) => Role::Pilot,
            Resource::Drone(_) => Role::Drone,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Pilot(id) => write!(f, "pilot {}", id),
            Resource::Drone(id) => write!(f, "drone {}", id),
        }
    }
}

/// The slot a resource fills on a mission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Pilot,
    Drone,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::Pilot => "pilot",
            Role::Drone => "drone",
        }
    }
}
