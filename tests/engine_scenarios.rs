//! End-to-end engine scenarios through the library API

use chrono::{DateTime, TimeZone, Utc};
use fleetops::domain::{
    Certification, Drone, DroneId, DroneStatus, GeoPoint, Location, Mission, MissionId,
    MissionStatus, Pilot, PilotId, PilotStatus, Priority, Requirements, Resource, Snapshot,
    TimeWindow,
};
use fleetops::engine::{
    ConflictKind, Engine, EngineConfig, InfeasibleReason, MatchQuality, ReassignOutcome,
    Severity, TieBreak,
};
use fleetops::storage::Records;

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 4, hour, minute, 0).unwrap()
}

fn window(start: (u32, u32), end: (u32, u32)) -> TimeWindow {
    TimeWindow::new(at(start.0, start.1), at(end.0, end.1)).unwrap()
}

fn site_a() -> Location {
    Location::named("Site A").with_coordinates(GeoPoint::new(12.97, 77.59).unwrap())
}

fn site_far() -> Location {
    Location::named("Far Site").with_coordinates(GeoPoint::new(19.07, 72.87).unwrap())
}

fn engine(depth: usize) -> Engine {
    Engine::new(EngineConfig {
        cascade_depth: depth,
        ..EngineConfig::default()
    })
}

#[test]
fn single_exact_pair_is_eligible() {
    let pilot = Pilot::new(PilotId::new(1), "Arjun", site_a()).with_skill("thermal");
    let drone = Drone::new(DroneId::new(1), "M30T", site_a()).with_capability("thermal");
    let mission = Mission::new(MissionId::new(1), site_a(), window((9, 0), (11, 0)))
        .with_requirements(Requirements::new().skill("thermal").capability("thermal"));
    let snapshot = Snapshot::new(vec![pilot], vec![drone], vec![mission.clone()]).unwrap();

    let candidates = Engine::default().find_eligible(&mission, &snapshot);

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].pilot, PilotId::new(1));
    assert_eq!(candidates[0].drone, DroneId::new(1));
    assert_eq!(candidates[0].quality, MatchQuality::Exact);
    assert_eq!(candidates[0].confidence, 1.0);
}

#[test]
fn overlapping_missions_double_book_the_pilot() {
    let pilot = Pilot::new(PilotId::new(1), "Neha", site_a());
    let drones = vec![
        Drone::new(DroneId::new(1), "Mavic 3E", site_a()),
        Drone::new(DroneId::new(2), "Mavic 3E", site_a()),
    ];
    let mut m1 = Mission::new(MissionId::new(1), site_a(), window((9, 0), (10, 0)));
    m1.assign(PilotId::new(1), DroneId::new(1)).unwrap();
    let mut m2 = Mission::new(MissionId::new(2), site_a(), window((9, 30), (10, 30)));
    m2.assign(PilotId::new(1), DroneId::new(2)).unwrap();
    let snapshot = Snapshot::new(vec![pilot], drones, vec![m1, m2]).unwrap();

    let conflicts = Engine::default().detect_conflicts(&snapshot);

    assert_eq!(conflicts.len(), 1, "{:?}", conflicts);
    let conflict = &conflicts[0];
    assert_eq!(conflict.kind, ConflictKind::DoubleBooking);
    assert_eq!(conflict.resource, Resource::Pilot(PilotId::new(1)));
    assert_eq!(conflict.missions, vec![MissionId::new(1), MissionId::new(2)]);
}

#[test]
fn touching_windows_are_not_a_double_booking() {
    let pilot = Pilot::new(PilotId::new(1), "Neha", site_a());
    let drones = vec![
        Drone::new(DroneId::new(1), "Mavic 3E", site_a()),
        Drone::new(DroneId::new(2), "Mavic 3E", site_a()),
    ];
    let mut m1 = Mission::new(MissionId::new(1), site_a(), window((9, 0), (10, 0)));
    m1.assign(PilotId::new(1), DroneId::new(1)).unwrap();
    let mut m2 = Mission::new(MissionId::new(2), site_a(), window((10, 0), (11, 0)));
    m2.assign(PilotId::new(1), DroneId::new(2)).unwrap();
    let snapshot = Snapshot::new(vec![pilot], drones, vec![m1, m2]).unwrap();

    assert!(Engine::default().detect_conflicts(&snapshot).is_empty());
}

#[test]
fn urgent_mission_takes_the_only_qualified_pilot() {
    let pilots = vec![
        Pilot::new(PilotId::new(1), "Arjun", site_a())
            .with_skill("thermal")
            .with_status(PilotStatus::Deployed),
        Pilot::new(PilotId::new(2), "Rohit", site_a()).with_skill("mapping"),
    ];
    let drones = vec![
        Drone::new(DroneId::new(1), "M30T", site_a())
            .with_capability("thermal")
            .with_status(DroneStatus::Deployed),
        Drone::new(DroneId::new(2), "M30T", site_a()).with_capability("thermal"),
    ];
    let mut normal = Mission::new(MissionId::new(1), site_a(), window((9, 0), (12, 0)))
        .with_requirements(Requirements::new().skill("thermal"));
    normal.assign(PilotId::new(1), DroneId::new(1)).unwrap();
    let urgent = Mission::new(MissionId::new(2), site_a(), window((10, 0), (11, 0)))
        .with_priority(Priority::Urgent)
        .with_requirements(Requirements::new().skill("thermal").capability("thermal"));
    let snapshot = Snapshot::new(pilots, drones, vec![normal, urgent])
        .unwrap()
        .with_version("v1");

    let outcome = engine(1).reassign_urgent(MissionId::new(2), &snapshot).unwrap();
    let plan = outcome.plan().expect("a plan").clone();

    assert_eq!(plan.moves.len(), 1);
    assert_eq!(plan.moves[0].resource, Resource::Pilot(PilotId::new(1)));
    assert_eq!(plan.moves[0].from, MissionId::new(1));
    assert_eq!(plan.moves[0].to, MissionId::new(2));
    assert_eq!(plan.unassigned, vec![MissionId::new(1)]);
    assert_eq!(plan.depth, 1);
    assert_eq!(plan.based_on.as_deref(), Some("v1"));

    let mut records = Records::from(snapshot);
    records.apply(&plan).unwrap();
    let after = records.into_snapshot().unwrap();

    let displaced = after.mission(MissionId::new(1)).unwrap();
    assert_eq!(displaced.status, MissionStatus::Unassigned);
    assert_eq!(displaced.assigned_pilot, None);
    assert_eq!(displaced.assigned_drone, Some(DroneId::new(1)));

    let staffed = after.mission(MissionId::new(2)).unwrap();
    assert_eq!(staffed.status, MissionStatus::Assigned);
    assert_eq!(staffed.assigned_pilot, Some(PilotId::new(1)));
    assert_eq!(staffed.assigned_drone, Some(DroneId::new(2)));
    assert_eq!(after.drone(DroneId::new(2)).unwrap().status, DroneStatus::Deployed);
}

#[test]
fn nothing_qualifies_anywhere() {
    let pilots = vec![Pilot::new(PilotId::new(1), "Rohit", site_a()).with_skill("mapping")];
    let drones = vec![Drone::new(DroneId::new(1), "M30T", site_a())];
    let urgent = Mission::new(MissionId::new(1), site_a(), window((9, 0), (10, 0)))
        .with_priority(Priority::Urgent)
        .with_requirements(Requirements::new().certification("BVLOS"));
    let snapshot = Snapshot::new(pilots, drones, vec![urgent]).unwrap();

    match engine(2).reassign_urgent(MissionId::new(1), &snapshot).unwrap() {
        ReassignOutcome::Infeasible(infeasible) => {
            assert_eq!(infeasible.mission, MissionId::new(1));
            assert_eq!(infeasible.reason, InfeasibleReason::NoQualifiedResources);
        }
        other => panic!("expected infeasible, got {:?}", other),
    }
}

#[test]
fn distant_and_expired_pilots_are_not_candidates() {
    let expired = Certification::expiring("DGCA RPC", at(8, 0));
    let pilots = vec![
        Pilot::new(PilotId::new(1), "Far", site_far()).with_certification(Certification::new("DGCA RPC")),
        Pilot::new(PilotId::new(2), "Lapsed", site_a()).with_certification(expired),
        Pilot::new(PilotId::new(3), "Ready", site_a()).with_certification(Certification::new("DGCA RPC")),
    ];
    let drones = vec![Drone::new(DroneId::new(1), "Mavic 3E", site_a())];
    let mission = Mission::new(MissionId::new(1), site_a(), window((9, 0), (10, 0)))
        .with_requirements(Requirements::new().certification("DGCA RPC"));
    let snapshot = Snapshot::new(pilots, drones, vec![mission.clone()]).unwrap();

    let candidates = Engine::default().find_eligible(&mission, &snapshot);
    let pilots: Vec<PilotId> = candidates.iter().map(|c| c.pilot).collect();
    assert_eq!(pilots, vec![PilotId::new(3)]);
}

#[test]
fn degraded_matches_only_when_no_exact_match() {
    let pilots = vec![Pilot::new(PilotId::new(1), "Kiran", site_a()).with_skill("thermal imaging")];
    let drones = vec![Drone::new(DroneId::new(1), "M30T", site_a())];
    let mission = Mission::new(MissionId::new(1), site_a(), window((9, 0), (10, 0)))
        .with_requirements(Requirements::new().skill("thermal"));
    let snapshot = Snapshot::new(pilots, drones, vec![mission.clone()]).unwrap();

    let candidates = Engine::default().find_eligible(&mission, &snapshot);
    assert_eq!(candidates.len(), 1);
    assert!(candidates[0].is_degraded());
    assert!(candidates[0].confidence < 1.0);
}

#[test]
fn matching_and_conflicts_agree_on_joined_words() {
    let pilots = vec![Pilot::new(PilotId::new(1), "Kiran", site_a()).with_skill("nightops")];
    let drones = vec![Drone::new(DroneId::new(1), "M30T", site_a())];
    let mut mission = Mission::new(MissionId::new(1), site_a(), window((9, 0), (10, 0)))
        .with_requirements(Requirements::new().skill("night ops"));
    let snapshot = Snapshot::new(pilots.clone(), drones.clone(), vec![mission.clone()]).unwrap();

    let candidates = Engine::default().find_eligible(&mission, &snapshot);
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].quality, MatchQuality::Degraded);

    mission.assign(PilotId::new(1), DroneId::new(1)).unwrap();
    let assigned = Snapshot::new(pilots, drones, vec![mission]).unwrap();
    let conflicts = Engine::default().detect_conflicts(&assigned);
    assert_eq!(conflicts.len(), 1, "{:?}", conflicts);
    assert_eq!(conflicts[0].kind, ConflictKind::SkillMismatch);
    assert_eq!(conflicts[0].severity, Severity::Medium);
}

#[test]
fn maintenance_overlap_is_a_collision() {
    let pilots = vec![Pilot::new(PilotId::new(1), "Arjun", site_a())];
    let drones = vec![Drone::new(DroneId::new(1), "M300", site_a()).with_maintenance(window((9, 30), (12, 0)))];
    let mut mission = Mission::new(MissionId::new(1), site_a(), window((9, 0), (10, 0)));
    mission.assign(PilotId::new(1), DroneId::new(1)).unwrap();
    let snapshot = Snapshot::new(pilots, drones, vec![mission]).unwrap();

    let conflicts = Engine::default().detect_conflicts(&snapshot);
    assert!(conflicts.iter().any(|c| c.kind == ConflictKind::MaintenanceCollision
        && c.resource == Resource::Drone(DroneId::new(1))
        && c.severity == Severity::High));
}

#[test]
fn refusing_ties_reports_the_alternatives() {
    let pilots = vec![
        Pilot::new(PilotId::new(1), "Arjun", site_a()).with_skill("thermal"),
        Pilot::new(PilotId::new(2), "Meera", site_a()).with_skill("thermal"),
    ];
    let drones = vec![
        Drone::new(DroneId::new(1), "M30T", site_a()),
        Drone::new(DroneId::new(2), "M30T", site_a()),
        Drone::new(DroneId::new(3), "M30T", site_a()),
    ];
    let mut first = Mission::new(MissionId::new(1), site_a(), window((9, 0), (12, 0)));
    first.assign(PilotId::new(1), DroneId::new(1)).unwrap();
    let mut second = Mission::new(MissionId::new(2), site_a(), window((9, 0), (12, 0)));
    second.assign(PilotId::new(2), DroneId::new(2)).unwrap();
    let urgent = Mission::new(MissionId::new(3), site_a(), window((10, 0), (11, 0)))
        .with_priority(Priority::Urgent)
        .with_requirements(Requirements::new().skill("thermal"));
    let snapshot = Snapshot::new(pilots, drones, vec![first, second, urgent]).unwrap();

    for refusing in [engine(1), Engine::default()] {
        match refusing.reassign_urgent(MissionId::new(3), &snapshot).unwrap() {
            ReassignOutcome::Infeasible(infeasible) => match infeasible.reason {
                InfeasibleReason::Ambiguous { alternatives } => assert!(alternatives.len() >= 2),
                other => panic!("expected ambiguous, got {:?}", other),
            },
            other => panic!("expected infeasible, got {:?}", other),
        }
    }

    let by_identifier = Engine::new(EngineConfig {
        cascade_depth: 1,
        tie_break: TieBreak::Identifier,
        ..EngineConfig::default()
    });
    let plan = by_identifier
        .reassign_urgent(MissionId::new(3), &snapshot)
        .unwrap()
        .plan()
        .cloned()
        .expect("identifier tie-break picks a plan");
    assert_eq!(plan.moves[0].resource, Resource::Pilot(PilotId::new(1)));
}
