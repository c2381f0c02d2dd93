//! Drone fleet commands

use anyhow::Result;
use clap::Subcommand;

use super::args;
use super::output::Output;
use crate::domain::{Drone, DroneId, DroneStatus};
use crate::storage::Project;

#[derive(Subcommand)]
pub enum DroneCommands {
    /// Add a drone to the fleet
    Add {
        /// Drone model
        model: String,

        /// Base site
        #[arg(long)]
        location: String,

        /// Site coordinates as `lat,lon`
        #[arg(long)]
        coords: Option<String>,

        /// Comma-separated capabilities
        #[arg(long)]
        capabilities: Option<String>,

        /// Explicit ID (defaults to the next free D-number)
        #[arg(long)]
        id: Option<String>,
    },

    /// List drones
    List {
        /// Only drones with this status
        #[arg(long)]
        status: Option<String>,
    },

    /// Show drone details
    Show {
        /// Drone ID
        id: String,
    },

    /// Change a drone's status (available, deployed, maintenance)
    Status {
        /// Drone ID
        id: String,

        /// New status
        status: String,
    },

    /// Schedule a maintenance window
    Maintenance {
        /// Drone ID
        id: String,

        /// Window start (RFC 3339 or date)
        start: String,

        /// Window end (RFC 3339 or date, inclusive day)
        end: String,
    },
}

pub fn run(cmd: DroneCommands, output: &Output) -> Result<()> {
    match cmd {
        DroneCommands::Add {
            model,
            location,
            coords,
            capabilities,
            id,
        } => {
            let mut drone = Drone::new(
                DroneId::new(0),
                model.trim(),
                args::location(&location, coords.as_deref())?,
            );
            drone.capabilities = args::terms(capabilities.as_deref());
            let id = id.as_deref().map(str::parse::<DroneId>).transpose()?;
            add_drone(output, drone, id)
        }
        DroneCommands::List { status } => list_drones(output, status.as_deref()),
        DroneCommands::Show { id } => show_drone(output, &id),
        DroneCommands::Status { id, status } => set_status(output, &id, &status),
        DroneCommands::Maintenance { id, start, end } => schedule(output, &id, &start, &end),
    }
}

fn add_drone(output: &Output, mut drone: Drone, id: Option<DroneId>) -> Result<()> {
    let project = Project::open_current()?;

    let (drone, _) = project.update(|records| {
        drone.id = id.unwrap_or_else(|| records.next_drone_id());
        records.add_drone(drone.clone())?;
        Ok(drone)
    })?;

    if output.is_json() {
        output.data(&drone);
    } else {
        output.success(&format!("Added drone: {} - {}", drone.id, drone.model));
    }
    Ok(())
}

fn list_drones(output: &Output, status: Option<&str>) -> Result<()> {
    let filter = status
        .map(str::parse::<DroneStatus>)
        .transpose()
        .map_err(anyhow::Error::msg)?;

    let project = Project::open_current()?;
    let snapshot = project.load_snapshot()?;
    let drones: Vec<&Drone> = snapshot
        .drones()
        .filter(|d| filter.map(|s| d.status == s).unwrap_or(true))
        .collect();

    if output.is_json() {
        output.data(&drones);
    } else if drones.is_empty() {
        println!("No drones");
    } else {
        println!("{:<6} {:<16} {:<12} {:<14} CAPABILITIES", "ID", "MODEL", "STATUS", "LOCATION");
        println!("{}", "-".repeat(72));
        for drone in drones {
            println!(
                "{:<6} {:<16} {:<12} {:<14} {}",
                drone.id,
                drone.model,
                drone.status,
                drone.location,
                args::joined(&drone.capabilities)
            );
        }
    }
    Ok(())
}

fn show_drone(output: &Output, id: &str) -> Result<()> {
    let id: DroneId = id.parse()?;
    let project = Project::open_current()?;
    let snapshot = project.load_snapshot()?;
    let drone = snapshot
        .drone(id)
        .ok_or_else(|| anyhow::anyhow!("Drone not found: {}", id))?;

    if output.is_json() {
        output.data(drone);
        return Ok(());
    }

    println!("Drone: {}", drone.id);
    println!("Model: {}", drone.model);
    println!("Status: {}", drone.status);
    println!("Location: {}", drone.location);
    println!("Capabilities: {}", args::joined(&drone.capabilities));

    if !drone.maintenance.is_empty() {
        println!("\nMaintenance:");
        for window in &drone.maintenance {
            println!("  {}", window);
        }
    }

    if !drone.assignments.is_empty() {
        println!("\nAssignments:");
        for back in &drone.assignments {
            println!("  {} {}", back.mission, back.window);
        }
    }
    Ok(())
}

fn set_status(output: &Output, id: &str, status: &str) -> Result<()> {
    let id: DroneId = id.parse()?;
    let next: DroneStatus = status.parse().map_err(anyhow::Error::msg)?;
    let project = Project::open_current()?;

    let (previous, _) = project.update(|records| {
        let drone = records.drone_mut(id)?;
        let previous = drone.status;
        drone.set_status(next)?;
        Ok(previous)
    })?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": id,
            "previous": previous,
            "status": next,
        }));
    } else {
        output.success(&format!("Drone {}: {} -> {}", id, previous, next));
    }
    Ok(())
}

fn schedule(output: &Output, id: &str, start: &str, end: &str) -> Result<()> {
    let id: DroneId = id.parse()?;
    let window = args::window(start, end)?;
    let project = Project::open_current()?;

    project.update(|records| {
        records.drone_mut(id)?.schedule_maintenance(window);
        Ok(())
    })?;
    output.verbose_ctx("drone", &format!("Maintenance {} for {}", window, id));

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": id,
            "maintenance": window,
        }));
    } else {
        output.success(&format!("Scheduled maintenance for {}: {}", id, window));
        output.verbose("Run 'fleet conflicts' to check assignments against the new window");
    }
    Ok(())
}
