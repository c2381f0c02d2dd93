//! Point-in-time view of the roster, fleet and missions
//!
//! A [`Snapshot`] is validated once at construction; every engine
//! computation afterwards can assume referential integrity.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use thiserror::Error;

use super::assignment::{Assignment, AssignmentRef, Resource};
use super::drone::Drone;
use super::id::{DroneId, MissionId, PilotId};
use super::mission::{Mission, MissionStatus};
use super::pilot::Pilot;
use super::window::TimeWindow;

/// One integrity problem found in a snapshot
#[derive(Debug, Clone, Error, PartialEq)]
pub enum IntegrityIssue {
    #[error("Duplicate pilot ID: {0}")]
    DuplicatePilot(PilotId),

    #[error("Duplicate drone ID: {0}")]
    DuplicateDrone(DroneId),

    #[error("Duplicate mission ID: {0}")]
    DuplicateMission(MissionId),

    #[error("Mission {mission} references unknown pilot {pilot}")]
    UnknownPilot { mission: MissionId, pilot: PilotId },

    #[error("Mission {mission} references unknown drone {drone}")]
    UnknownDrone { mission: MissionId, drone: DroneId },

    #[error("Mission {0} is {1} but lacks a pilot or drone")]
    IncompleteAssignment(MissionId, MissionStatus),

    #[error("{resource} lists mission {mission}, which does not assign it for that window")]
    StaleBackReference { resource: Resource, mission: MissionId },
}

/// A snapshot failed validation
#[derive(Debug, Clone, Error, PartialEq)]
pub struct DataIntegrityError {
    pub issues: Vec<IntegrityIssue>,
}

impl fmt::Display for DataIntegrityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Data integrity check failed ({} issue(s))", self.issues.len())?;
        for issue in &self.issues {
            write!(f, "\n  - {}", issue)?;
        }
        Ok(())
    }
}

/// Validated, immutable view of all pilots, drones and missions
#[derive(Debug, Clone)]
pub struct Snapshot {
    pilots: BTreeMap<PilotId, Pilot>,
    drones: BTreeMap<DroneId, Drone>,
    missions: BTreeMap<MissionId, Mission>,

    /// Non-completed missions referencing each resource, in id order
    commitments: BTreeMap<Resource, Vec<MissionId>>,

    /// Store version this snapshot was read at, if any
    version: Option<String>,
}

impl Snapshot {
    /// Builds and validates a snapshot
    pub fn new(
        pilots: impl IntoIterator<Item = Pilot>,
        drones: impl IntoIterator<Item = Drone>,
        missions: impl IntoIterator<Item = Mission>,
    ) -> Result<Self, DataIntegrityError> {
        let mut issues = Vec::new();

        let mut pilot_map = BTreeMap::new();
        for pilot in pilots {
            let id = pilot.id;
            if pilot_map.insert(id, pilot).is_some() {
                issues.push(IntegrityIssue::DuplicatePilot(id));
            }
        }

        let mut drone_map = BTreeMap::new();
        for drone in drones {
            let id = drone.id;
            if drone_map.insert(id, drone).is_some() {
                issues.push(IntegrityIssue::DuplicateDrone(id));
            }
        }

        let mut mission_map = BTreeMap::new();
        for mission in missions {
            let id = mission.id;
            if mission_map.insert(id, mission).is_some() {
                issues.push(IntegrityIssue::DuplicateMission(id));
            }
        }

        let mut commitments: BTreeMap<Resource, Vec<MissionId>> = BTreeMap::new();
        for mission in mission_map.values() {
            if let Some(pilot) = mission.assigned_pilot {
                if !pilot_map.contains_key(&pilot) {
                    issues.push(IntegrityIssue::UnknownPilot {
                        mission: mission.id,
                        pilot,
                    });
                }
            }
            if let Some(drone) = mission.assigned_drone {
                if !drone_map.contains_key(&drone) {
                    issues.push(IntegrityIssue::UnknownDrone {
                        mission: mission.id,
                        drone,
                    });
                }
            }
            if matches!(
                mission.status,
                MissionStatus::Assigned | MissionStatus::InProgress
            ) && !mission.is_staffed()
            {
                issues.push(IntegrityIssue::IncompleteAssignment(mission.id, mission.status));
            }

            if let Some(assignment) = mission.assignment() {
                for resource in assignment_resources(&assignment) {
                    commitments.entry(resource).or_default().push(mission.id);
                }
            }
        }

        for pilot in pilot_map.values() {
            let resource = Resource::Pilot(pilot.id);
            check_back_references(resource, &pilot.assignments, &mission_map, &mut issues);
        }
        for drone in drone_map.values() {
            let resource = Resource::Drone(drone.id);
            check_back_references(resource, &drone.assignments, &mission_map, &mut issues);
        }

        if !issues.is_empty() {
            return Err(DataIntegrityError { issues });
        }

        Ok(Self {
            pilots: pilot_map,
            drones: drone_map,
            missions: mission_map,
            commitments,
            version: None,
        })
    }

    /// Stamps the snapshot with the store version it was read at
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn pilots(&self) -> impl Iterator<Item = &Pilot> {
        self.pilots.values()
    }

    pub fn drones(&self) -> impl Iterator<Item = &Drone> {
        self.drones.values()
    }

    pub fn missions(&self) -> impl Iterator<Item = &Mission> {
        self.missions.values()
    }

    pub fn pilot(&self, id: PilotId) -> Option<&Pilot> {
        self.pilots.get(&id)
    }

    pub fn drone(&self, id: DroneId) -> Option<&Drone> {
        self.drones.get(&id)
    }

    pub fn mission(&self, id: MissionId) -> Option<&Mission> {
        self.missions.get(&id)
    }

    /// Non-completed missions referencing the resource
    pub fn commitments(&self, resource: Resource) -> &[MissionId] {
        self.commitments
            .get(&resource)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every resource with at least one commitment, in resource order
    pub fn committed_resources(&self) -> impl Iterator<Item = (Resource, &[MissionId])> {
        self.commitments.iter().map(|(r, ids)| (*r, ids.as_slice()))
    }

    /// Commitments of the resource overlapping the window, ignoring one mission
    pub fn overlapping_commitments(
        &self,
        resource: Resource,
        window: &TimeWindow,
        except: Option<MissionId>,
    ) -> Vec<MissionId> {
        self.commitments(resource)
            .iter()
            .copied()
            .filter(|id| Some(*id) != except)
            .filter(|id| {
                self.missions
                    .get(id)
                    .map(|m| m.window.overlaps(window))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Consumes the snapshot, returning its records
    pub fn into_parts(self) -> (Vec<Pilot>, Vec<Drone>, Vec<Mission>) {
        (
            self.pilots.into_values().collect(),
            self.drones.into_values().collect(),
            self.missions.into_values().collect(),
        )
    }
}

fn assignment_resources(assignment: &Assignment) -> impl Iterator<Item = Resource> {
    assignment
        .pilot
        .map(Resource::Pilot)
        .into_iter()
        .chain(assignment.drone.map(Resource::Drone))
}

fn check_back_references(
    resource: Resource,
    refs: &[AssignmentRef],
    missions: &BTreeMap<MissionId, Mission>,
    issues: &mut Vec<IntegrityIssue>,
) {
    for back in refs {
        let matches = missions
            .get(&back.mission)
            .map(|m| m.uses(resource) && m.window == back.window)
            .unwrap_or(false);
        if !matches {
            issues.push(IntegrityIssue::StaleBackReference {
                resource,
                mission: back.mission,
            });
        }
    }
}

/// Recomputes pilot and drone back-references from the missions
///
/// Completed missions are kept as history; they are not commitments.
pub fn rebuild_back_references(pilots: &mut [Pilot], drones: &mut [Drone], missions: &[Mission]) {
    let mut by_resource: BTreeMap<Resource, BTreeSet<AssignmentRef>> = BTreeMap::new();
    for mission in missions {
        let back = AssignmentRef {
            mission: mission.id,
            window: mission.window,
        };
        if let Some(pilot) = mission.assigned_pilot {
            by_resource.entry(Resource::Pilot(pilot)).or_default().insert(back);
        }
        if let Some(drone) = mission.assigned_drone {
            by_resource.entry(Resource::Drone(drone)).or_default().insert(back);
        }
    }

    for pilot in pilots.iter_mut() {
        pilot.assignments = by_resource
            .remove(&Resource::Pilot(pilot.id))
            .map(|refs| refs.into_iter().collect())
            .unwrap_or_default();
    }
    for drone in drones.iter_mut() {
        drone.assignments = by_resource
            .remove(&Resource::Drone(drone.id))
            .map(|refs| refs.into_iter().collect())
            .unwrap_or_default();
    }
}
