//! Drone fleet model

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::assignment::AssignmentRef;
use super::id::DroneId;
use super::location::Location;
use super::requirements::normalize_term;
use super::transition::TransitionError;
use super::window::TimeWindow;

/// Operational state of a drone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DroneStatus {
    #[default]
    Available,
    #[serde(alias = "in_use")]
    Deployed,
    Maintenance,
}

impl DroneStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DroneStatus::Available => "available",
            DroneStatus::Deployed => "deployed",
            DroneStatus::Maintenance => "maintenance",
        }
    }

    /// `Available <-> Deployed`, `Available -> Maintenance -> Available`
    pub fn can_transition_to(&self, next: DroneStatus) -> bool {
        use DroneStatus::*;
        matches!(
            (self, next),
            (Available, Deployed)
                | (Deployed, Available)
                | (Available, Maintenance)
                | (Maintenance, Available)
        )
    }

    pub fn is_serviceable(&self) -> bool {
        !matches!(self, DroneStatus::Maintenance)
    }
}

impl fmt::Display for DroneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for DroneStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_term(s).as_str() {
            "available" => Ok(DroneStatus::Available),
            "deployed" | "in use" => Ok(DroneStatus::Deployed),
            "maintenance" => Ok(DroneStatus::Maintenance),
            _ => Err(format!(
                "unknown drone status '{}' (available, deployed, maintenance)",
                s
            )),
        }
    }
}

/// A drone in the fleet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drone {
    pub id: DroneId,

    #[serde(default)]
    pub model: String,

    #[serde(default)]
    pub capabilities: BTreeSet<String>,

    pub location: Location,

    #[serde(default)]
    pub status: DroneStatus,

    /// Scheduled maintenance windows
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub maintenance: Vec<TimeWindow>,

    /// Missions this drone is assigned to (rebuilt from missions on save)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assignments: Vec<AssignmentRef>,
}

impl Drone {
    pub fn new(id: DroneId, model: impl Into<String>, location: Location) -> Self {
        Self {
            id,
            model: model.into(),
            capabilities: BTreeSet::new(),
            location,
            status: DroneStatus::Available,
            maintenance: Vec::new(),
            assignments: Vec::new(),
        }
    }

    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.insert(capability.into());
        self
    }

    pub fn with_status(mut self, status: DroneStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_maintenance(mut self, window: TimeWindow) -> Self {
        self.schedule_maintenance(window);
        self
    }

    /// Adds a maintenance window, keeping the list sorted and unique
    pub fn schedule_maintenance(&mut self, window: TimeWindow) {
        if !self.maintenance.contains(&window) {
            self.maintenance.push(window);
            self.maintenance.sort();
        }
    }

    /// Maintenance windows that intersect the given window
    pub fn maintenance_during<'a>(
        &'a self,
        window: &'a TimeWindow,
    ) -> impl Iterator<Item = &'a TimeWindow> + 'a {
        self.maintenance.iter().filter(move |m| m.overlaps(window))
    }

    pub fn set_status(&mut self, next: DroneStatus) -> Result<(), TransitionError> {
        if self.status == next {
            return Ok(());
        }
        if !self.status.can_transition_to(next) {
            return Err(TransitionError::new(
                "Drone",
                self.id,
                self.status.label(),
                next.label(),
            ));
        }
        self.status = next;
        Ok(())
    }
}
