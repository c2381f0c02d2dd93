//! Mission domain model
//!
//! A mission owns its assignment. Lifecycle:
//! `Unassigned -> Assigned -> InProgress -> Completed`, and
//! `Assigned -> Unassigned` when a conflict is resolved or a cascade
//! displaces one of its resources.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::assignment::{Assignment, Resource, Role};
use super::id::{DroneId, MissionId, PilotId};
use super::location::Location;
use super::requirements::{normalize_term, Requirements};
use super::transition::TransitionError;
use super::window::TimeWindow;

/// Mission priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    #[default]
    #[serde(alias = "standard", alias = "high", alias = "low")]
    Normal,
    Urgent,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Normal => "normal",
            Priority::Urgent => "urgent",
        }
    }

    pub fn is_urgent(&self) -> bool {
        matches!(self, Priority::Urgent)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_term(s).as_str() {
            "normal" | "standard" | "high" | "low" => Ok(Priority::Normal),
            "urgent" => Ok(Priority::Urgent),
            _ => Err(format!("unknown priority '{}' (normal, urgent)", s)),
        }
    }
}

/// Mission lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissionStatus {
    #[default]
    Unassigned,
    Assigned,
    InProgress,
    Completed,
}

impl MissionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            MissionStatus::Unassigned => "unassigned",
            MissionStatus::Assigned => "assigned",
            MissionStatus::InProgress => "in_progress",
            MissionStatus::Completed => "completed",
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, MissionStatus::Completed)
    }

    /// Returns true if a cascade may take resources away from the mission
    pub fn is_preemptible(&self) -> bool {
        matches!(self, MissionStatus::Unassigned | MissionStatus::Assigned)
    }
}

impl fmt::Display for MissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// A mission (project) needing one pilot and one drone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mission {
    pub id: MissionId,

    #[serde(default)]
    pub client: String,

    pub location: Location,

    #[serde(default, skip_serializing_if = "Requirements::is_empty")]
    pub requirements: Requirements,

    #[serde(default)]
    pub priority: Priority,

    pub window: TimeWindow,

    #[serde(default)]
    pub status: MissionStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_pilot: Option<PilotId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_drone: Option<DroneId>,
}

impl Mission {
    pub fn new(id: MissionId, location: Location, window: TimeWindow) -> Self {
        Self {
            id,
            client: String::new(),
            location,
            requirements: Requirements::new(),
            priority: Priority::Normal,
            window,
            status: MissionStatus::Unassigned,
            assigned_pilot: None,
            assigned_drone: None,
        }
    }

    pub fn with_requirements(mut self, requirements: Requirements) -> Self {
        self.requirements = requirements;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_client(mut self, client: impl Into<String>) -> Self {
        self.client = client.into();
        self
    }

    /// Returns the current staffing, or None for completed missions
    pub fn assignment(&self) -> Option<Assignment> {
        if self.status.is_complete() {
            return None;
        }
        if self.assigned_pilot.is_none() && self.assigned_drone.is_none() {
            return None;
        }
        Some(Assignment {
            mission: self.id,
            pilot: self.assigned_pilot,
            drone: self.assigned_drone,
            window: self.window,
        })
    }

    /// Returns true if neither role is missing
    pub fn is_staffed(&self) -> bool {
        self.assigned_pilot.is_some() && self.assigned_drone.is_some()
    }

    /// Roles not yet filled
    pub fn open_roles(&self) -> Vec<Role> {
        let mut roles = Vec::new();
        if self.assigned_pilot.is_none() {
            roles.push(Role::Pilot);
        }
        if self.assigned_drone.is_none() {
            roles.push(Role::Drone);
        }
        roles
    }

    /// Returns the resource in the given role, if any
    pub fn resource(&self, role: Role) -> Option<Resource> {
        match role {
            Role::Pilot => self.assigned_pilot.map(Resource::Pilot),
            Role::Drone => self.assigned_drone.map(Resource::Drone),
        }
    }

    /// Returns true if the mission references the resource
    pub fn uses(&self, resource: Resource) -> bool {
        match resource {
            Resource::Pilot(id) => self.assigned_pilot == Some(id),
            Resource::Drone(id) => self.assigned_drone == Some(id),
        }
    }

    fn invalid(&self, to: MissionStatus) -> TransitionError {
        TransitionError::new("Mission", self.id, self.status.label(), to.label())
    }

    /// Puts a resource into its slot; the mission becomes Assigned once fully staffed
    pub fn fill(&mut self, resource: Resource) -> Result<(), TransitionError> {
        if !self.status.is_preemptible() {
            return Err(self.invalid(MissionStatus::Assigned));
        }
        match resource {
            Resource::Pilot(id) => self.assigned_pilot = Some(id),
            Resource::Drone(id) => self.assigned_drone = Some(id),
        }
        if self.is_staffed() {
            self.status = MissionStatus::Assigned;
        }
        Ok(())
    }

    /// Assigns a pilot and a drone: `Unassigned -> Assigned`
    ///
    /// Returns whatever the mission still held from a partial staffing
    /// and no longer uses.
    pub fn assign(&mut self, pilot: PilotId, drone: DroneId) -> Result<Vec<Resource>, TransitionError> {
        if self.status != MissionStatus::Unassigned {
            return Err(self.invalid(MissionStatus::Assigned));
        }
        let replaced = [Role::Pilot, Role::Drone]
            .into_iter()
            .filter_map(|role| self.resource(role))
            .filter(|r| *r != Resource::Pilot(pilot) && *r != Resource::Drone(drone))
            .collect();
        self.assigned_pilot = Some(pilot);
        self.assigned_drone = Some(drone);
        self.status = MissionStatus::Assigned;
        Ok(replaced)
    }

    /// Takes one resource away; the mission falls back to Unassigned
    pub fn release(&mut self, role: Role) -> Result<Option<Resource>, TransitionError> {
        if !self.status.is_preemptible() {
            return Err(self.invalid(MissionStatus::Unassigned));
        }
        let released = self.resource(role);
        match role {
            Role::Pilot => self.assigned_pilot = None,
            Role::Drone => self.assigned_drone = None,
        }
        self.status = MissionStatus::Unassigned;
        Ok(released)
    }

    /// Clears the assignment: `Assigned -> Unassigned`
    pub fn unassign(&mut self) -> Result<Vec<Resource>, TransitionError> {
        if !self.status.is_preemptible() {
            return Err(self.invalid(MissionStatus::Unassigned));
        }
        let released = [Role::Pilot, Role::Drone]
            .into_iter()
            .filter_map(|role| self.resource(role))
            .collect();
        self.assigned_pilot = None;
        self.assigned_drone = None;
        self.status = MissionStatus::Unassigned;
        Ok(released)
    }

    /// `Assigned -> InProgress`
    pub fn start(&mut self) -> Result<(), TransitionError> {
        if self.status != MissionStatus::Assigned {
            return Err(self.invalid(MissionStatus::InProgress));
        }
        self.status = MissionStatus::InProgress;
        Ok(())
    }

    /// `InProgress -> Completed`
    pub fn complete(&mut self) -> Result<(), TransitionError> {
        if self.status != MissionStatus::InProgress {
            return Err(self.invalid(MissionStatus::Completed));
        }
        self.status = MissionStatus::Completed;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn mission() -> Mission {
        let window = TimeWindow::new(
            Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 2, 17, 0, 0).unwrap(),
        )
        .unwrap();
        Mission::new(MissionId::new(1), Location::named("Bangalore"), window)
    }

    #[test]
    fn lifecycle_transitions() {
        let mut m = mission();
        assert!(m.start().is_err());

        m.assign(PilotId::new(1), DroneId::new(1)).unwrap();
        assert_eq!(m.status, MissionStatus::Assigned);

        m.start().unwrap();
        assert!(m.unassign().is_err());
        m.complete().unwrap();
        assert_eq!(m.status, MissionStatus::Completed);
        assert!(m.assignment().is_none());
    }

    #[test]
    fn release_keeps_other_resource() {
        let mut m = mission();
        m.assign(PilotId::new(1), DroneId::new(2)).unwrap();

        let released = m.release(Role::Pilot).unwrap();
        assert_eq!(released, Some(Resource::Pilot(PilotId::new(1))));
        assert_eq!(m.status, MissionStatus::Unassigned);
        assert_eq!(m.assigned_drone, Some(DroneId::new(2)));
        assert_eq!(m.open_roles(), vec![Role::Pilot]);
    }

    #[test]
    fn assign_reports_replaced_resources() {
        let mut m = mission();
        m.fill(Resource::Drone(DroneId::new(2))).unwrap();

        let replaced = m.assign(PilotId::new(1), DroneId::new(3)).unwrap();
        assert_eq!(replaced, vec![Resource::Drone(DroneId::new(2))]);

        let mut kept = mission();
        kept.fill(Resource::Drone(DroneId::new(2))).unwrap();
        assert!(kept.assign(PilotId::new(1), DroneId::new(2)).unwrap().is_empty());
    }

    #[test]
    fn fill_completes_partial_staffing() {
        let mut m = mission();
        m.fill(Resource::Drone(DroneId::new(2))).unwrap();
        assert_eq!(m.status, MissionStatus::Unassigned);

        m.fill(Resource::Pilot(PilotId::new(4))).unwrap();
        assert_eq!(m.status, MissionStatus::Assigned);
        assert!(m.uses(Resource::Pilot(PilotId::new(4))));
    }

    #[test]
    fn priority_aliases_from_sheets() {
        assert_eq!("Standard".parse::<Priority>(), Ok(Priority::Normal));
        assert_eq!("URGENT".parse::<Priority>(), Ok(Priority::Urgent));

        let p: Priority = serde_json::from_str("\"high\"").unwrap();
        assert_eq!(p, Priority::Normal);
    }

    #[test]
    fn serde_roundtrip_skips_empty_fields() {
        let m = mission();
        let json = serde_json::to_string(&m).unwrap();
        assert!(!json.contains("assigned_pilot"));

        let parsed: Mission = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, m);
    }
}
