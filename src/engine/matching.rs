//! Eligibility checks and candidate ranking

use serde::Serialize;
use std::cmp::Ordering;
use tracing::debug;

use super::similarity::requirement_confidence;
use super::EngineConfig;
use crate::domain::{
    missing_terms, CertificationCheck, Drone, DroneId, DroneStatus, Mission, Pilot, PilotId,
    PilotStatus, Resource, Snapshot,
};

/// Whether a candidate meets every requirement literally
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchQuality {
    Exact,
    Degraded,
}

/// A ranked pilot/drone pair for a mission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub pilot: PilotId,
    pub drone: DroneId,
    pub quality: MatchQuality,

    /// 1.0 for exact matches, the weakest similarity score otherwise
    pub confidence: f64,

    pub pilot_distance_km: f64,
    pub drone_distance_km: f64,
}

impl Candidate {
    pub fn distance_km(&self) -> f64 {
        self.pilot_distance_km + self.drone_distance_km
    }

    pub fn is_degraded(&self) -> bool {
        self.quality == MatchQuality::Degraded
    }

    fn rank(&self, other: &Self) -> Ordering {
        self.quality
            .cmp(&other.quality)
            .then_with(|| other.confidence.total_cmp(&self.confidence))
            .then_with(|| distance_m(self.distance_km()).cmp(&distance_m(other.distance_km())))
            .then_with(|| self.pilot.cmp(&other.pilot))
            .then_with(|| self.drone.cmp(&other.drone))
    }
}

/// Distances compare in whole metres so float noise cannot reorder ties
pub(crate) fn distance_m(km: f64) -> u64 {
    (km * 1000.0).round() as u64
}

/// Which resources a fit check considers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pool {
    /// Available status and no commitment overlapping the mission
    Free,
    /// Any on-duty pilot or serviceable drone; commitments are the caller's concern
    OnDuty,
}

/// How well one resource fits a mission
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Fit {
    /// Every required term is offered literally, after normalization
    pub exact: bool,
    pub confidence: f64,
    pub distance_km: f64,
}

impl Fit {
    pub fn is_exact(&self) -> bool {
        self.exact
    }
}

fn is_free(resource: Resource, mission: &Mission, snapshot: &Snapshot) -> bool {
    snapshot
        .overlapping_commitments(resource, &mission.window, Some(mission.id))
        .is_empty()
}

pub(crate) fn pilot_fit(
    config: &EngineConfig,
    pilot: &Pilot,
    mission: &Mission,
    snapshot: &Snapshot,
    pool: Pool,
) -> Option<Fit> {
    let status_ok = match pool {
        Pool::Free => pilot.status == PilotStatus::Available,
        Pool::OnDuty => pilot.status.is_on_duty(),
    };
    if !status_ok || !pilot.available_by(&mission.window) {
        return None;
    }

    let certified = mission
        .requirements
        .certifications
        .iter()
        .all(|c| pilot.check_certification(c, &mission.window) == CertificationCheck::Valid);
    if !certified {
        return None;
    }

    let confidence = requirement_confidence(&mission.requirements.skills, &pilot.skills);
    if confidence < config.similarity_threshold {
        return None;
    }

    let distance_km = pilot
        .location
        .within(&mission.location, config.proximity_radius_km)?;

    if pool == Pool::Free && !is_free(Resource::Pilot(pilot.id), mission, snapshot) {
        return None;
    }

    Some(Fit {
        exact: missing_terms(&mission.requirements.skills, &pilot.skills).is_empty(),
        confidence,
        distance_km,
    })
}

pub(crate) fn drone_fit(
    config: &EngineConfig,
    drone: &Drone,
    mission: &Mission,
    snapshot: &Snapshot,
    pool: Pool,
) -> Option<Fit> {
    let status_ok = match pool {
        Pool::Free => drone.status == DroneStatus::Available,
        Pool::OnDuty => drone.status.is_serviceable(),
    };
    if !status_ok || drone.maintenance_during(&mission.window).next().is_some() {
        return None;
    }

    let confidence = requirement_confidence(&mission.requirements.capabilities, &drone.capabilities);
    if confidence < config.similarity_threshold {
        return None;
    }

    let distance_km = drone
        .location
        .within(&mission.location, config.proximity_radius_km)?;

    if pool == Pool::Free && !is_free(Resource::Drone(drone.id), mission, snapshot) {
        return None;
    }

    Some(Fit {
        exact: missing_terms(&mission.requirements.capabilities, &drone.capabilities).is_empty(),
        confidence,
        distance_km,
    })
}

pub(crate) fn find_eligible(
    config: &EngineConfig,
    mission: &Mission,
    snapshot: &Snapshot,
) -> Vec<Candidate> {
    let pilots: Vec<(PilotId, Fit)> = snapshot
        .pilots()
        .filter_map(|p| pilot_fit(config, p, mission, snapshot, Pool::Free).map(|f| (p.id, f)))
        .collect();
    let drones: Vec<(DroneId, Fit)> = snapshot
        .drones()
        .filter_map(|d| drone_fit(config, d, mission, snapshot, Pool::Free).map(|f| (d.id, f)))
        .collect();

    debug!(
        mission = %mission.id,
        pilots = pilots.len(),
        drones = drones.len(),
        "eligible resources"
    );

    let mut candidates: Vec<Candidate> = pilots
        .iter()
        .flat_map(|(pilot, pf)| {
            drones.iter().map(move |(drone, df)| {
                let exact = pf.is_exact() && df.is_exact();
                Candidate {
                    pilot: *pilot,
                    drone: *drone,
                    quality: if exact {
                        MatchQuality::Exact
                    } else {
                        MatchQuality::Degraded
                    },
                    confidence: pf.confidence.min(df.confidence),
                    pilot_distance_km: pf.distance_km,
                    drone_distance_km: df.distance_km,
                }
            })
        })
        .collect();

    if candidates.iter().any(|c| !c.is_degraded()) {
        candidates.retain(|c| !c.is_degraded());
    }
    candidates.sort_by(Candidate::rank);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Certification, GeoPoint, Location, MissionId, Requirements, TimeWindow,
    };
    use chrono::{TimeZone, Utc};

    fn window(start_h: u32, end_h: u32) -> TimeWindow {
        TimeWindow::new(
            Utc.with_ymd_and_hms(2026, 3, 2, start_h, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 2, end_h, 0, 0).unwrap(),
        )
        .unwrap()
    }

    fn site(name: &str, lat: f64, lon: f64) -> Location {
        Location::named(name).with_coordinates(GeoPoint::new(lat, lon).unwrap())
    }

    fn mission(requirements: Requirements) -> Mission {
        Mission::new(MissionId::new(1), Location::named("Bangalore"), window(9, 17))
            .with_requirements(requirements)
    }

    fn run(mission: &Mission, pilots: Vec<Pilot>, drones: Vec<Drone>) -> Vec<Candidate> {
        let snapshot = Snapshot::new(pilots, drones, Vec::new()).unwrap();
        find_eligible(&EngineConfig::default(), mission, &snapshot)
    }

    #[test]
    fn exact_match_excludes_degraded() {
        let m = mission(Requirements::new().skill("thermal imaging"));
        let pilots = vec![
            Pilot::new(PilotId::new(1), "Arjun", Location::named("Bangalore")).with_skill("Thermal"),
            Pilot::new(PilotId::new(2), "Neha", Location::named("Bangalore"))
                .with_skill("Thermal Imaging"),
        ];
        let drones = vec![Drone::new(DroneId::new(1), "M300", Location::named("Bangalore"))];

        let found = run(&m, pilots, drones);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].pilot, PilotId::new(2));
        assert_eq!(found[0].quality, MatchQuality::Exact);
    }

    #[test]
    fn degraded_offered_when_nothing_exact() {
        let m = mission(Requirements::new().skill("thermal imaging"));
        let pilots =
            vec![Pilot::new(PilotId::new(1), "Arjun", Location::named("Bangalore")).with_skill("Thermal")];
        let drones = vec![Drone::new(DroneId::new(1), "M300", Location::named("Bangalore"))];

        let found = run(&m, pilots, drones);
        assert_eq!(found.len(), 1);
        assert!(found[0].is_degraded());
        assert!(found[0].confidence < 1.0);
    }

    #[test]
    fn joined_words_are_not_an_exact_match() {
        let m = mission(Requirements::new().skill("night ops"));
        let pilots =
            vec![Pilot::new(PilotId::new(1), "Arjun", Location::named("Bangalore")).with_skill("nightops")];
        let drones = vec![Drone::new(DroneId::new(1), "M300", Location::named("Bangalore"))];

        let found = run(&m, pilots, drones);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].quality, MatchQuality::Degraded);
    }

    #[test]
    fn certifications_never_fuzzy() {
        let m = mission(Requirements::new().certification("DGCA"));
        let pilots = vec![
            Pilot::new(PilotId::new(1), "Arjun", Location::named("Bangalore"))
                .with_certification(Certification::new("DGCA-2")),
        ];
        let drones = vec![Drone::new(DroneId::new(1), "M300", Location::named("Bangalore"))];

        assert!(run(&m, pilots, drones).is_empty());
    }

    #[test]
    fn expired_certification_excludes_pilot() {
        let m = mission(Requirements::new().certification("DGCA"));
        let expires = Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap();
        let pilots = vec![
            Pilot::new(PilotId::new(1), "Arjun", Location::named("Bangalore"))
                .with_certification(Certification::expiring("DGCA", expires)),
        ];
        let drones = vec![Drone::new(DroneId::new(1), "M300", Location::named("Bangalore"))];

        assert!(run(&m, pilots, drones).is_empty());
    }

    #[test]
    fn ranks_by_distance_then_identifier() {
        let hq = site("Bangalore", 12.9716, 77.5946);
        let m = Mission::new(MissionId::new(1), hq.clone(), window(9, 17));
        let pilots = vec![
            Pilot::new(PilotId::new(3), "Far", site("Hosur", 12.7409, 77.8253)),
            Pilot::new(PilotId::new(2), "Near", hq.clone()),
            Pilot::new(PilotId::new(1), "Near too", hq.clone()),
            Pilot::new(PilotId::new(4), "Too far", site("Mysore", 12.2958, 76.6394)),
        ];
        let drones = vec![Drone::new(DroneId::new(1), "M300", hq)];

        let order: Vec<PilotId> = run(&m, pilots, drones).iter().map(|c| c.pilot).collect();
        assert_eq!(order, vec![PilotId::new(1), PilotId::new(2), PilotId::new(3)]);
    }

    #[test]
    fn busy_and_maintenance_resources_excluded() {
        let m = mission(Requirements::new());
        let pilots = vec![
            Pilot::new(PilotId::new(1), "Arjun", Location::named("Bangalore"))
                .with_status(PilotStatus::OnLeave),
        ];
        let drones = vec![Drone::new(DroneId::new(1), "M300", Location::named("Bangalore"))];
        assert!(run(&m, pilots, drones).is_empty());

        let pilots = vec![Pilot::new(PilotId::new(1), "Arjun", Location::named("Bangalore"))];
        let drones = vec![Drone::new(DroneId::new(1), "M300", Location::named("Bangalore"))
            .with_maintenance(window(16, 20))];
        assert!(run(&m, pilots, drones).is_empty());
    }

    #[test]
    fn overlapping_commitment_excludes_resource() {
        let p = Pilot::new(PilotId::new(1), "Arjun", Location::named("Bangalore"));
        let d1 = Drone::new(DroneId::new(1), "M300", Location::named("Bangalore"));
        let d2 = Drone::new(DroneId::new(2), "Mavic", Location::named("Bangalore"));
        let mut busy = Mission::new(MissionId::new(2), Location::named("Bangalore"), window(8, 10));
        busy.assign(PilotId::new(9), DroneId::new(1)).unwrap();
        let p9 = Pilot::new(PilotId::new(9), "Other", Location::named("Bangalore"));

        let snapshot = Snapshot::new(vec![p, p9], vec![d1, d2], vec![busy]).unwrap();
        let found = find_eligible(&EngineConfig::default(), &mission(Requirements::new()), &snapshot);

        assert!(found.iter().all(|c| c.drone == DroneId::new(2)));
        assert!(found.iter().all(|c| c.pilot == PilotId::new(1)));
        assert_eq!(found.len(), 1);
    }
}
