//! Mutable working set of records behind every store command
//!
//! Commands load [`Records`], change them through the methods here, and
//! hand them back to the project to validate and save. Pilot and drone
//! statuses follow their assignments: a resource picked up by a mission
//! becomes Deployed, one with nothing left to fly becomes Available.

use thiserror::Error;

use crate::domain::{
    rebuild_back_references, DataIntegrityError, Drone, DroneId, DroneStatus, Mission,
    MissionId, Pilot, PilotId, PilotStatus, Resource, Role, Snapshot, TransitionError,
};
use crate::engine::Plan;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Pilot not found: {0}")]
    PilotNotFound(PilotId),

    #[error("Drone not found: {0}")]
    DroneNotFound(DroneId),

    #[error("Mission not found: {0}")]
    MissionNotFound(MissionId),

    #[error("{0} already exists")]
    Duplicate(String),

    #[error("Plan no longer matches the records: {0}")]
    StalePlan(String),

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// All pilots, drones and missions of a project
#[derive(Debug, Clone, Default)]
pub struct Records {
    pub pilots: Vec<Pilot>,
    pub drones: Vec<Drone>,
    pub missions: Vec<Mission>,
}

impl Records {
    pub fn next_pilot_id(&self) -> PilotId {
        PilotId::new(self.pilots.iter().map(|p| p.id.number()).max().unwrap_or(0) + 1)
    }

    pub fn next_drone_id(&self) -> DroneId {
        DroneId::new(self.drones.iter().map(|d| d.id.number()).max().unwrap_or(0) + 1)
    }

    pub fn next_mission_id(&self) -> MissionId {
        MissionId::new(self.missions.iter().map(|m| m.id.number()).max().unwrap_or(0) + 1)
    }

    pub fn add_pilot(&mut self, pilot: Pilot) -> Result<(), RecordError> {
        if self.pilots.iter().any(|p| p.id == pilot.id) {
            return Err(RecordError::Duplicate(format!("Pilot {}", pilot.id)));
        }
        self.pilots.push(pilot);
        Ok(())
    }

    pub fn add_drone(&mut self, drone: Drone) -> Result<(), RecordError> {
        if self.drones.iter().any(|d| d.id == drone.id) {
            return Err(RecordError::Duplicate(format!("Drone {}", drone.id)));
        }
        self.drones.push(drone);
        Ok(())
    }

    pub fn add_mission(&mut self, mission: Mission) -> Result<(), RecordError> {
        if self.missions.iter().any(|m| m.id == mission.id) {
            return Err(RecordError::Duplicate(format!("Mission {}", mission.id)));
        }
        self.missions.push(mission);
        Ok(())
    }

    pub fn pilot_mut(&mut self, id: PilotId) -> Result<&mut Pilot, RecordError> {
        self.pilots
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RecordError::PilotNotFound(id))
    }

    pub fn drone_mut(&mut self, id: DroneId) -> Result<&mut Drone, RecordError> {
        self.drones
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(RecordError::DroneNotFound(id))
    }

    pub fn mission_mut(&mut self, id: MissionId) -> Result<&mut Mission, RecordError> {
        self.missions
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(RecordError::MissionNotFound(id))
    }

    /// Assigns a pilot and a drone to an unassigned mission
    pub fn assign(&mut self, mission: MissionId, pilot: PilotId, drone: DroneId) -> Result<(), RecordError> {
        self.pilot_mut(pilot)?;
        self.drone_mut(drone)?;
        let replaced = self.mission_mut(mission)?.assign(pilot, drone)?;
        self.settle(Resource::Pilot(pilot));
        self.settle(Resource::Drone(drone));
        for resource in replaced {
            self.settle(resource);
        }
        Ok(())
    }

    /// Clears a mission's assignment, returning the released resources
    pub fn unassign(&mut self, mission: MissionId) -> Result<Vec<Resource>, RecordError> {
        let released = self.mission_mut(mission)?.unassign()?;
        for resource in &released {
            self.settle(*resource);
        }
        Ok(released)
    }

    pub fn start(&mut self, mission: MissionId) -> Result<(), RecordError> {
        self.mission_mut(mission)?.start()?;
        Ok(())
    }

    /// Completes a mission and frees its resources when nothing else needs them
    pub fn complete(&mut self, mission: MissionId) -> Result<(), RecordError> {
        let m = self.mission_mut(mission)?;
        m.complete()?;
        let held: Vec<Resource> = [Role::Pilot, Role::Drone]
            .into_iter()
            .filter_map(|role| m.resource(role))
            .collect();
        for resource in held {
            self.settle(resource);
        }
        Ok(())
    }

    /// Applies a cascade plan: releases every preempted resource, then fills
    pub fn apply(&mut self, plan: &Plan) -> Result<(), RecordError> {
        for mv in &plan.moves {
            let from = self.mission_mut(mv.from)?;
            if !from.uses(mv.resource) {
                return Err(RecordError::StalePlan(format!(
                    "{} no longer holds {}",
                    mv.from, mv.resource
                )));
            }
            from.release(mv.resource.role())?;
        }

        let fills = plan
            .moves
            .iter()
            .map(|mv| (mv.resource, mv.to))
            .chain(plan.allocations.iter().map(|a| (a.resource, a.to)));

        let mut filled = Vec::new();
        for (resource, to) in fills {
            if filled.contains(&resource) {
                continue;
            }
            let mission = self.mission_mut(to)?;
            if mission.resource(resource.role()).is_some() {
                return Err(RecordError::StalePlan(format!(
                    "{} already has a {}",
                    to,
                    resource.role().label()
                )));
            }
            mission.fill(resource)?;
            filled.push(resource);
        }

        for resource in filled {
            self.settle(resource);
        }
        Ok(())
    }

    /// Reconciles a resource's status with its assignments
    fn settle(&mut self, resource: Resource) {
        let committed = self
            .missions
            .iter()
            .any(|m| !m.status.is_complete() && m.uses(resource));

        match resource {
            Resource::Pilot(id) => {
                if let Some(pilot) = self.pilots.iter_mut().find(|p| p.id == id) {
                    match (pilot.status, committed) {
                        (PilotStatus::Available, true) => pilot.status = PilotStatus::Deployed,
                        (PilotStatus::Deployed, false) => pilot.status = PilotStatus::Available,
                        _ => {}
                    }
                }
            }
            Resource::Drone(id) => {
                if let Some(drone) = self.drones.iter_mut().find(|d| d.id == id) {
                    match (drone.status, committed) {
                        (DroneStatus::Available, true) => drone.status = DroneStatus::Deployed,
                        (DroneStatus::Deployed, false) => drone.status = DroneStatus::Available,
                        _ => {}
                    }
                }
            }
        }
    }

    /// Rebuilds back-references and validates the result
    pub fn into_snapshot(mut self) -> Result<Snapshot, DataIntegrityError> {
        rebuild_back_references(&mut self.pilots, &mut self.drones, &self.missions);
        Snapshot::new(self.pilots, self.drones, self.missions)
    }
}

impl From<Snapshot> for Records {
    fn from(snapshot: Snapshot) -> Self {
        let (pilots, drones, missions) = snapshot.into_parts();
        Self {
            pilots,
            drones,
            missions,
        }
    }
}
