//! Mission commands

use anyhow::Result;
use clap::Subcommand;

use super::args;
use super::output::Output;
use crate::domain::{
    DroneId, Mission, MissionId, MissionStatus, PilotId, Priority, Requirements, Resource,
};
use crate::engine::Conflict;
use crate::storage::Project;

#[derive(Subcommand)]
pub enum MissionCommands {
    /// Add a mission
    ///
    /// Examples:
    ///   fleet mission add --location Bangalore --start 2026-03-02 --end 2026-03-04 --skills Mapping
    ///   fleet mission add --location Mumbai --start 2026-03-05T09:00:00Z --end 2026-03-05T17:00:00Z --priority urgent
    Add {
        /// Mission site
        #[arg(long)]
        location: String,

        /// Site coordinates as `lat,lon`
        #[arg(long)]
        coords: Option<String>,

        /// Window start (RFC 3339 or date)
        #[arg(long)]
        start: String,

        /// Window end (RFC 3339 or date, inclusive day)
        #[arg(long)]
        end: String,

        /// Client name
        #[arg(long, default_value = "")]
        client: String,

        /// Comma-separated pilot skills
        #[arg(long)]
        skills: Option<String>,

        /// Comma-separated pilot certifications
        #[arg(long)]
        certs: Option<String>,

        /// Comma-separated drone capabilities
        #[arg(long)]
        capabilities: Option<String>,

        /// normal or urgent
        #[arg(long, default_value = "normal")]
        priority: String,

        /// Explicit ID (defaults to the next free PRJ-number)
        #[arg(long)]
        id: Option<String>,
    },

    /// List missions
    List {
        /// Only missions with this status
        #[arg(long)]
        status: Option<String>,

        /// Only urgent missions
        #[arg(long)]
        urgent: bool,
    },

    /// Show mission details
    Show {
        /// Mission ID
        id: String,
    },

    /// Assign a pilot and a drone, refusing if that creates conflicts
    Assign {
        /// Mission ID
        mission: String,

        /// Pilot ID
        pilot: String,

        /// Drone ID
        drone: String,

        /// Assign even if conflicts are detected
        #[arg(long)]
        force: bool,
    },

    /// Clear a mission's assignment
    Unassign {
        /// Mission ID
        id: String,
    },

    /// Mark an assigned mission as in progress
    Start {
        /// Mission ID
        id: String,
    },

    /// Mark a mission in progress as completed
    Complete {
        /// Mission ID
        id: String,
    },

    /// Change a mission's priority
    Priority {
        /// Mission ID
        id: String,

        /// normal or urgent
        priority: String,
    },
}

pub fn run(cmd: MissionCommands, output: &Output) -> Result<()> {
    match cmd {
        MissionCommands::Add {
            location,
            coords,
            start,
            end,
            client,
            skills,
            certs,
            capabilities,
            priority,
            id,
        } => {
            let priority: Priority = priority.parse().map_err(anyhow::Error::msg)?;
            let requirements = Requirements {
                skills: args::terms(skills.as_deref()),
                certifications: args::terms(certs.as_deref()),
                capabilities: args::terms(capabilities.as_deref()),
            };
            let mission = Mission::new(
                MissionId::new(0),
                args::location(&location, coords.as_deref())?,
                args::window(&start, &end)?,
            )
            .with_client(client.trim())
            .with_requirements(requirements)
            .with_priority(priority);
            let id = id.as_deref().map(str::parse::<MissionId>).transpose()?;
            add_mission(output, mission, id)
        }
        MissionCommands::List { status, urgent } => list_missions(output, status.as_deref(), urgent),
        MissionCommands::Show { id } => show_mission(output, &id),
        MissionCommands::Assign {
            mission,
            pilot,
            drone,
            force,
        } => assign(output, &mission, &pilot, &drone, force),
        MissionCommands::Unassign { id } => unassign(output, &id),
        MissionCommands::Start { id } => transition(output, &id, Step::Start),
        MissionCommands::Complete { id } => transition(output, &id, Step::Complete),
        MissionCommands::Priority { id, priority } => set_priority(output, &id, &priority),
    }
}

fn add_mission(output: &Output, mut mission: Mission, id: Option<MissionId>) -> Result<()> {
    let project = Project::open_current()?;

    let (mission, _) = project.update(|records| {
        mission.id = id.unwrap_or_else(|| records.next_mission_id());
        records.add_mission(mission.clone())?;
        Ok(mission)
    })?;

    if output.is_json() {
        output.data(&mission);
    } else {
        output.success(&format!(
            "Added mission: {} at {} ({}, {})",
            mission.id, mission.location, mission.window, mission.priority
        ));
    }
    Ok(())
}

fn parse_status(s: &str) -> Result<MissionStatus> {
    let status = match crate::domain::normalize_term(s).as_str() {
        "unassigned" => MissionStatus::Unassigned,
        "assigned" => MissionStatus::Assigned,
        "in progress" | "active" => MissionStatus::InProgress,
        "completed" | "done" => MissionStatus::Completed,
        _ => anyhow::bail!(
            "unknown mission status '{}' (unassigned, assigned, in_progress, completed)",
            s
        ),
    };
    Ok(status)
}

fn list_missions(output: &Output, status: Option<&str>, urgent_only: bool) -> Result<()> {
    let filter = status.map(parse_status).transpose()?;

    let project = Project::open_current()?;
    let snapshot = project.load_snapshot()?;
    let missions: Vec<&Mission> = snapshot
        .missions()
        .filter(|m| filter.map(|s| m.status == s).unwrap_or(true))
        .filter(|m| !urgent_only || m.priority.is_urgent())
        .collect();

    if output.is_json() {
        output.data(&missions);
    } else if missions.is_empty() {
        println!("No missions");
    } else {
        println!(
            "{:<8} {:<12} {:<8} {:<14} {:<36} CREW",
            "ID", "STATUS", "PRIORITY", "LOCATION", "WINDOW"
        );
        println!("{}", "-".repeat(96));
        for mission in missions {
            println!(
                "{:<8} {:<12} {:<8} {:<14} {:<36} {}",
                mission.id,
                mission.status,
                mission.priority,
                mission.location,
                mission.window.to_string(),
                crew(mission)
            );
        }
    }
    Ok(())
}

fn crew(mission: &Mission) -> String {
    let pilot = mission
        .assigned_pilot
        .map(|p| p.to_string())
        .unwrap_or_else(|| "-".to_string());
    let drone = mission
        .assigned_drone
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!("{} / {}", pilot, drone)
}

fn show_mission(output: &Output, id: &str) -> Result<()> {
    let id: MissionId = id.parse()?;
    let project = Project::open_current()?;
    let snapshot = project.load_snapshot()?;
    let mission = snapshot
        .mission(id)
        .ok_or_else(|| anyhow::anyhow!("Mission not found: {}", id))?;
    let conflicts: Vec<Conflict> = project
        .engine()
        .detect_conflicts(&snapshot)
        .into_iter()
        .filter(|c| c.missions.contains(&id))
        .collect();

    if output.is_json() {
        output.data(&serde_json::json!({
            "mission": mission,
            "conflicts": conflicts,
        }));
        return Ok(());
    }

    println!("Mission: {}", mission.id);
    if !mission.client.is_empty() {
        println!("Client: {}", mission.client);
    }
    println!("Status: {}", mission.status);
    println!("Priority: {}", mission.priority);
    println!("Location: {}", mission.location);
    println!("Window: {}", mission.window);
    println!("Crew: {}", crew(mission));

    let req = &mission.requirements;
    if !req.is_empty() {
        println!("\nRequirements:");
        println!("  Skills: {}", args::joined(&req.skills));
        println!("  Certifications: {}", args::joined(&req.certifications));
        println!("  Capabilities: {}", args::joined(&req.capabilities));
    }

    if !conflicts.is_empty() {
        println!("\nConflicts:");
        for conflict in &conflicts {
            println!("  {}", conflict);
        }
    }
    Ok(())
}

fn assign(output: &Output, mission: &str, pilot: &str, drone: &str, force: bool) -> Result<()> {
    let mission: MissionId = mission.parse()?;
    let pilot: PilotId = pilot.parse()?;
    let drone: DroneId = drone.parse()?;

    let project = Project::open_current()?;
    let engine = project.engine();

    let (conflicts, _) = project.update(|records| {
        records.assign(mission, pilot, drone)?;

        let trial = records.clone().into_snapshot()?;
        let conflicts: Vec<Conflict> = engine
            .detect_conflicts(&trial)
            .into_iter()
            .filter(|c| c.missions.contains(&mission))
            .collect();

        if !conflicts.is_empty() && !force {
            let listing: Vec<String> = conflicts.iter().map(|c| format!("  - {}", c)).collect();
            anyhow::bail!(
                "Cannot assign {} to {}: {} conflict(s)\n{}\nUse --force to assign anyway",
                pilot,
                mission,
                conflicts.len(),
                listing.join("\n")
            );
        }
        Ok(conflicts)
    })?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "mission": mission,
            "pilot": pilot,
            "drone": drone,
            "conflicts": conflicts,
        }));
    } else {
        for conflict in &conflicts {
            output.warn(&conflict.to_string());
        }
        output.success(&format!("Assigned {} and {} to {}", pilot, drone, mission));
    }
    Ok(())
}

fn unassign(output: &Output, id: &str) -> Result<()> {
    let id: MissionId = id.parse()?;
    let project = Project::open_current()?;

    let (released, _) = project.update(|records| Ok(records.unassign(id)?))?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "mission": id,
            "released": released,
        }));
    } else {
        let names: Vec<String> = released.iter().map(Resource::to_string).collect();
        output.success(&format!("Unassigned {} (released {})", id, names.join(", ")));
    }
    Ok(())
}

#[derive(Clone, Copy)]
enum Step {
    Start,
    Complete,
}

fn transition(output: &Output, id: &str, step: Step) -> Result<()> {
    let id: MissionId = id.parse()?;
    let project = Project::open_current()?;

    let (status, _) = project.update(|records| {
        match step {
            Step::Start => records.start(id)?,
            Step::Complete => records.complete(id)?,
        }
        Ok(records.mission_mut(id)?.status)
    })?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "mission": id,
            "status": status,
        }));
    } else {
        output.success(&format!("Mission {} is now {}", id, status));
    }
    Ok(())
}

fn set_priority(output: &Output, id: &str, priority: &str) -> Result<()> {
    let id: MissionId = id.parse()?;
    let priority: Priority = priority.parse().map_err(anyhow::Error::msg)?;
    let project = Project::open_current()?;

    project.update(|records| {
        let mission = records.mission_mut(id)?;
        if mission.status.is_complete() {
            anyhow::bail!("Mission {} is already completed", id);
        }
        mission.priority = priority;
        Ok(())
    })?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "mission": id,
            "priority": priority,
        }));
    } else {
        output.success(&format!("Mission {} priority set to {}", id, priority));
    }
    Ok(())
}
