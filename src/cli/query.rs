//! Query commands: match, conflicts, status

use std::cmp::Reverse;

use anyhow::Result;

use super::output::Output;
use crate::domain::{DroneStatus, MissionId, MissionStatus, PilotStatus};
use crate::engine::{Conflict, Engine, EngineConfig, Severity};
use crate::storage::{short_version, Project};

/// Project engine settings with per-invocation overrides applied
pub fn engine_for(project: &Project, radius: Option<f64>, depth: Option<usize>) -> Result<Engine> {
    let mut config: EngineConfig = project.config().project.engine.clone();
    if let Some(radius) = radius {
        config.proximity_radius_km = radius;
    }
    if let Some(depth) = depth {
        config.cascade_depth = depth;
    }
    config.validate()?;
    Ok(Engine::new(config))
}

/// Ranked candidates for a mission
pub fn match_mission(output: &Output, id: &str, radius: Option<f64>, limit: Option<usize>) -> Result<()> {
    let id: MissionId = id.parse()?;
    let project = Project::open_current()?;
    let snapshot = project.load_snapshot()?;
    let mission = snapshot
        .mission(id)
        .ok_or_else(|| anyhow::anyhow!("Mission not found: {}", id))?;

    let engine = engine_for(&project, radius, None)?;
    let mut candidates = engine.find_eligible(mission, &snapshot);
    output.verbose_ctx("match", &format!("{} candidate pair(s) for {}", candidates.len(), id));
    if let Some(limit) = limit {
        candidates.truncate(limit);
    }

    if output.is_json() {
        output.data(&serde_json::json!({
            "mission": id,
            "candidates": candidates,
        }));
    } else if candidates.is_empty() {
        println!("No eligible pilot/drone pairs for {}", id);
    } else {
        if candidates[0].is_degraded() {
            output.warn("No exact match; showing skill similarity matches");
        }
        println!(
            "{:<5} {:<6} {:<6} {:<9} {:>10} {:>12}",
            "RANK", "PILOT", "DRONE", "MATCH", "CONFIDENCE", "DISTANCE"
        );
        println!("{}", "-".repeat(53));
        for (rank, candidate) in candidates.iter().enumerate() {
            let quality = if candidate.is_degraded() { "degraded" } else { "exact" };
            println!(
                "{:<5} {:<6} {:<6} {:<9} {:>10.2} {:>9.1} km",
                rank + 1,
                candidate.pilot,
                candidate.drone,
                quality,
                candidate.confidence,
                candidate.distance_km()
            );
        }
    }
    Ok(())
}

/// Most severe first, then in detection order
fn by_severity(mut conflicts: Vec<Conflict>) -> Vec<Conflict> {
    conflicts.sort_by_key(|c| Reverse(c.severity));
    conflicts
}

pub fn conflicts(output: &Output, mission: Option<&str>, radius: Option<f64>) -> Result<()> {
    let filter = mission.map(str::parse::<MissionId>).transpose()?;
    let project = Project::open_current()?;
    let snapshot = project.load_snapshot()?;
    let engine = engine_for(&project, radius, None)?;

    let conflicts: Vec<Conflict> = by_severity(engine.detect_conflicts(&snapshot))
        .into_iter()
        .filter(|c| filter.map(|m| c.missions.contains(&m)).unwrap_or(true))
        .collect();

    if output.is_json() {
        output.data(&conflicts);
    } else if conflicts.is_empty() {
        println!("No conflicts");
    } else {
        println!("{:<9} {:<22} {:<10} {:<18} DETAIL", "SEVERITY", "KIND", "RESOURCE", "MISSIONS");
        println!("{}", "-".repeat(90));
        for conflict in &conflicts {
            let missions: Vec<String> = conflict.missions.iter().map(|m| m.to_string()).collect();
            println!(
                "{:<9} {:<22} {:<10} {:<18} {}",
                conflict.severity,
                conflict.kind,
                conflict.resource.to_string(),
                missions.join(","),
                conflict.detail
            );
        }
        println!();
        println!("Found {} conflict(s)", conflicts.len());
    }
    Ok(())
}

pub fn status(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let snapshot = project.load_snapshot()?;
    let conflicts = project.engine().detect_conflicts(&snapshot);

    let pilots = |s: PilotStatus| snapshot.pilots().filter(|p| p.status == s).count();
    let drones = |s: DroneStatus| snapshot.drones().filter(|d| d.status == s).count();
    let missions = |s: MissionStatus| snapshot.missions().filter(|m| m.status == s).count();
    let critical = conflicts.iter().filter(|c| c.severity == Severity::Critical).count();
    let waiting: Vec<MissionId> = snapshot
        .missions()
        .filter(|m| m.priority.is_urgent() && m.status == MissionStatus::Unassigned)
        .map(|m| m.id)
        .collect();

    if output.is_json() {
        output.data(&serde_json::json!({
            "version": snapshot.version(),
            "pilots": {
                "total": snapshot.pilots().count(),
                "available": pilots(PilotStatus::Available),
                "deployed": pilots(PilotStatus::Deployed),
                "on_leave": pilots(PilotStatus::OnLeave),
                "unavailable": pilots(PilotStatus::Unavailable),
            },
            "drones": {
                "total": snapshot.drones().count(),
                "available": drones(DroneStatus::Available),
                "deployed": drones(DroneStatus::Deployed),
                "maintenance": drones(DroneStatus::Maintenance),
            },
            "missions": {
                "total": snapshot.missions().count(),
                "unassigned": missions(MissionStatus::Unassigned),
                "assigned": missions(MissionStatus::Assigned),
                "in_progress": missions(MissionStatus::InProgress),
                "completed": missions(MissionStatus::Completed),
                "urgent_unassigned": waiting,
            },
            "conflicts": {
                "total": conflicts.len(),
                "critical": critical,
            },
        }));
        return Ok(());
    }

    println!("Fleet Status");
    println!("{}", "=".repeat(40));
    if let Some(version) = snapshot.version() {
        println!("Version: {}", short_version(version));
    }
    println!();
    println!("Pilots: {} total", snapshot.pilots().count());
    println!("  Available:   {}", pilots(PilotStatus::Available));
    println!("  Deployed:    {}", pilots(PilotStatus::Deployed));
    println!("  On leave:    {}", pilots(PilotStatus::OnLeave));
    println!("  Unavailable: {}", pilots(PilotStatus::Unavailable));
    println!();
    println!("Drones: {} total", snapshot.drones().count());
    println!("  Available:   {}", drones(DroneStatus::Available));
    println!("  Deployed:    {}", drones(DroneStatus::Deployed));
    println!("  Maintenance: {}", drones(DroneStatus::Maintenance));
    println!();
    println!("Missions: {} total", snapshot.missions().count());
    println!("  [ ] Unassigned:  {}", missions(MissionStatus::Unassigned));
    println!("  [+] Assigned:    {}", missions(MissionStatus::Assigned));
    println!("  [~] In Progress: {}", missions(MissionStatus::InProgress));
    println!("  [x] Completed:   {}", missions(MissionStatus::Completed));
    println!();
    println!("Conflicts: {} ({} critical)", conflicts.len(), critical);

    if !waiting.is_empty() {
        println!();
        println!("Urgent missions waiting:");
        for id in &waiting {
            println!("  {} (try 'fleet urgent {}')", id, id);
        }
    }
    Ok(())
}
