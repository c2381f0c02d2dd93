//! Conflict detection over current assignments

use serde::Serialize;
use std::fmt;
use tracing::debug;

use super::similarity::requirement_confidence;
use super::EngineConfig;
use crate::domain::{
    missing_terms, CertificationCheck, Drone, DroneStatus, Mission, MissionId, Pilot,
    PilotStatus, Resource, Snapshot,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    DoubleBooking,
    SkillMismatch,
    LocationMismatch,
    MaintenanceCollision,
    Availability,
}

impl ConflictKind {
    pub fn label(&self) -> &'static str {
        match self {
            ConflictKind::DoubleBooking => "double_booking",
            ConflictKind::SkillMismatch => "skill_mismatch",
            ConflictKind::LocationMismatch => "location_mismatch",
            ConflictKind::MaintenanceCollision => "maintenance_collision",
            ConflictKind::Availability => "availability",
        }
    }
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// A detected problem with one resource's assignments
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub resource: Resource,

    /// Missions involved, in id order
    pub missions: Vec<MissionId>,

    pub severity: Severity,
    pub detail: String,
}

impl Conflict {
    fn new(
        kind: ConflictKind,
        severity: Severity,
        resource: Resource,
        missions: Vec<MissionId>,
        detail: String,
    ) -> Self {
        Self {
            kind,
            resource,
            missions,
            severity,
            detail,
        }
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.kind, self.detail)
    }
}

pub(crate) fn detect_conflicts(config: &EngineConfig, snapshot: &Snapshot) -> Vec<Conflict> {
    let mut conflicts = Vec::new();

    double_bookings(snapshot, &mut conflicts);

    for mission in snapshot.missions().filter(|m| !m.status.is_complete()) {
        if let Some(pilot) = mission.assigned_pilot.and_then(|id| snapshot.pilot(id)) {
            pilot_conflicts(config, pilot, mission, &mut conflicts);
        }
        if let Some(drone) = mission.assigned_drone.and_then(|id| snapshot.drone(id)) {
            drone_conflicts(config, drone, mission, &mut conflicts);
        }
    }

    conflicts.sort();
    conflicts.dedup();
    debug!(conflicts = conflicts.len(), "conflict scan");
    conflicts
}

fn double_bookings(snapshot: &Snapshot, out: &mut Vec<Conflict>) {
    for (resource, missions) in snapshot.committed_resources() {
        let committed: Vec<&Mission> = missions.iter().filter_map(|id| snapshot.mission(*id)).collect();
        for (i, first) in committed.iter().enumerate() {
            for second in &committed[i + 1..] {
                if first.window.overlaps(&second.window) {
                    out.push(Conflict::new(
                        ConflictKind::DoubleBooking,
                        Severity::Critical,
                        resource,
                        vec![first.id, second.id],
                        format!(
                            "{} is assigned to overlapping missions {} ({}) and {} ({})",
                            resource, first.id, first.window, second.id, second.window
                        ),
                    ));
                }
            }
        }
    }
}

fn pilot_conflicts(config: &EngineConfig, pilot: &Pilot, mission: &Mission, out: &mut Vec<Conflict>) {
    let resource = Resource::Pilot(pilot.id);
    let one = || vec![mission.id];

    let missing = missing_terms(&mission.requirements.skills, &pilot.skills);
    if !missing.is_empty() {
        let confidence = requirement_confidence(&mission.requirements.skills, &pilot.skills);
        let (severity, detail) = if confidence >= config.similarity_threshold {
            (
                Severity::Medium,
                format!(
                    "{} only approximately matches skills for {} (confidence {:.2}): {}",
                    resource,
                    mission.id,
                    confidence,
                    missing.join(", ")
                ),
            )
        } else {
            (
                Severity::High,
                format!("{} lacks skills for {}: {}", resource, mission.id, missing.join(", ")),
            )
        };
        out.push(Conflict::new(ConflictKind::SkillMismatch, severity, resource, one(), detail));
    }

    for cert in &mission.requirements.certifications {
        let problem = match pilot.check_certification(cert, &mission.window) {
            CertificationCheck::Valid => continue,
            CertificationCheck::Missing => format!("{} lacks certification {} for {}", resource, cert, mission.id),
            CertificationCheck::Expired(at) => format!(
                "{} certification {} expires {} before {} ends",
                resource,
                cert,
                at.format("%Y-%m-%d"),
                mission.id
            ),
        };
        out.push(Conflict::new(ConflictKind::SkillMismatch, Severity::High, resource, one(), problem));
    }

    if let Some(conflict) = location_conflict(config, resource, &pilot.location, mission) {
        out.push(conflict);
    }

    match pilot.status {
        PilotStatus::OnLeave | PilotStatus::Unavailable => out.push(Conflict::new(
            ConflictKind::Availability,
            Severity::High,
            resource,
            one(),
            format!("{} is {} but assigned to {}", resource, pilot.status, mission.id),
        )),
        PilotStatus::Available | PilotStatus::Deployed => {}
    }

    if !pilot.available_by(&mission.window) {
        if let Some(from) = pilot.available_from {
            out.push(Conflict::new(
                ConflictKind::Availability,
                Severity::High,
                resource,
                one(),
                format!(
                    "{} is available from {} but {} starts {}",
                    resource,
                    from.format("%Y-%m-%d %H:%M"),
                    mission.id,
                    mission.window.start().format("%Y-%m-%d %H:%M")
                ),
            ));
        }
    }
}

fn drone_conflicts(config: &EngineConfig, drone: &Drone, mission: &Mission, out: &mut Vec<Conflict>) {
    let resource = Resource::Drone(drone.id);
    let one = || vec![mission.id];

    let missing = missing_terms(&mission.requirements.capabilities, &drone.capabilities);
    if !missing.is_empty() {
        let confidence = requirement_confidence(&mission.requirements.capabilities, &drone.capabilities);
        let severity = if confidence >= config.similarity_threshold {
            Severity::Medium
        } else {
            Severity::High
        };
        out.push(Conflict::new(
            ConflictKind::SkillMismatch,
            severity,
            resource,
            one(),
            format!(
                "{} lacks capabilities for {}: {}",
                resource,
                mission.id,
                missing.join(", ")
            ),
        ));
    }

    if let Some(conflict) = location_conflict(config, resource, &drone.location, mission) {
        out.push(conflict);
    }

    for window in drone.maintenance_during(&mission.window) {
        out.push(Conflict::new(
            ConflictKind::MaintenanceCollision,
            Severity::High,
            resource,
            one(),
            format!(
                "{} has maintenance {} during {} ({})",
                resource, window, mission.id, mission.window
            ),
        ));
    }

    if drone.status == DroneStatus::Maintenance {
        out.push(Conflict::new(
            ConflictKind::Availability,
            Severity::High,
            resource,
            one(),
            format!("{} is in maintenance but assigned to {}", resource, mission.id),
        ));
    }
}

fn location_conflict(
    config: &EngineConfig,
    resource: Resource,
    location: &crate::domain::Location,
    mission: &Mission,
) -> Option<Conflict> {
    if location.within(&mission.location, config.proximity_radius_km).is_some() {
        return None;
    }
    let distance = match location.distance_km(&mission.location) {
        Some(km) => format!("{:.1} km", km),
        None => "unknown distance".to_string(),
    };
    Some(Conflict::new(
        ConflictKind::LocationMismatch,
        Severity::Medium,
        resource,
        vec![mission.id],
        format!(
            "{} is at {} but {} is at {} ({})",
            resource, location, mission.id, mission.location, distance
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DroneId, Location, PilotId, Requirements, TimeWindow};
    use chrono::{TimeZone, Utc};

    fn window(start: (u32, u32), end: (u32, u32)) -> TimeWindow {
        TimeWindow::new(
            Utc.with_ymd_and_hms(2026, 3, 2, start.0, start.1, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 2, end.0, end.1, 0).unwrap(),
        )
        .unwrap()
    }

    fn assigned(id: u32, window: TimeWindow, pilot: u32, drone: u32) -> Mission {
        let mut m = Mission::new(MissionId::new(id), Location::named("Bangalore"), window);
        m.assign(PilotId::new(pilot), DroneId::new(drone)).unwrap();
        m
    }

    fn pilot(id: u32) -> Pilot {
        Pilot::new(PilotId::new(id), "Arjun", Location::named("Bangalore"))
    }

    fn drone(id: u32) -> Drone {
        Drone::new(DroneId::new(id), "M300", Location::named("Bangalore"))
    }

    fn detect(pilots: Vec<Pilot>, drones: Vec<Drone>, missions: Vec<Mission>) -> Vec<Conflict> {
        let snapshot = Snapshot::new(pilots, drones, missions).unwrap();
        detect_conflicts(&EngineConfig::default(), &snapshot)
    }

    #[test]
    fn overlapping_pilot_is_double_booked() {
        let conflicts = detect(
            vec![pilot(1)],
            vec![drone(1), drone(2)],
            vec![
                assigned(1, window((9, 0), (10, 0)), 1, 1),
                assigned(2, window((9, 30), (10, 30)), 1, 2),
            ],
        );

        assert_eq!(conflicts.len(), 1);
        let c = &conflicts[0];
        assert_eq!(c.kind, ConflictKind::DoubleBooking);
        assert_eq!(c.severity, Severity::Critical);
        assert_eq!(c.resource, Resource::Pilot(PilotId::new(1)));
        assert_eq!(c.missions, vec![MissionId::new(1), MissionId::new(2)]);
    }

    #[test]
    fn touching_windows_do_not_conflict() {
        let conflicts = detect(
            vec![pilot(1)],
            vec![drone(1)],
            vec![
                assigned(1, window((9, 0), (10, 0)), 1, 1),
                assigned(2, window((10, 0), (11, 0)), 1, 1),
            ],
        );
        assert!(conflicts.is_empty());
    }

    #[test]
    fn completed_missions_are_ignored() {
        let mut done = assigned(1, window((9, 0), (10, 0)), 1, 1);
        done.start().unwrap();
        done.complete().unwrap();

        let conflicts = detect(
            vec![pilot(1)],
            vec![drone(1)],
            vec![done, assigned(2, window((9, 0), (10, 0)), 1, 1)],
        );
        assert!(conflicts.is_empty());
    }

    #[test]
    fn skill_mismatch_severity_depends_on_similarity() {
        let mut m = assigned(1, window((9, 0), (10, 0)), 1, 1);
        m.requirements = Requirements::new().skill("thermal imaging");

        let close = detect(vec![pilot(1).with_skill("thermal")], vec![drone(1)], vec![m.clone()]);
        assert_eq!(close.len(), 1);
        assert_eq!(close[0].severity, Severity::Medium);

        let far = detect(vec![pilot(1).with_skill("mapping")], vec![drone(1)], vec![m]);
        assert_eq!(far.len(), 1);
        assert_eq!(far[0].severity, Severity::High);
    }

    #[test]
    fn maintenance_and_location_reported() {
        let m = assigned(1, window((9, 0), (12, 0)), 1, 1);
        let d = Drone::new(DroneId::new(1), "M300", Location::named("Mumbai"))
            .with_maintenance(window((11, 0), (13, 0)));

        let kinds: Vec<ConflictKind> = detect(vec![pilot(1)], vec![d], vec![m])
            .into_iter()
            .map(|c| c.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![ConflictKind::LocationMismatch, ConflictKind::MaintenanceCollision]
        );
    }

    #[test]
    fn pilot_on_leave_is_unavailable() {
        let m = assigned(1, window((9, 0), (10, 0)), 1, 1);
        let conflicts = detect(
            vec![pilot(1).with_status(PilotStatus::OnLeave)],
            vec![drone(1)],
            vec![m],
        );
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::Availability);
    }
}
