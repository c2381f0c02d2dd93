//! Pilot roster commands

use anyhow::{Context, Result};
use clap::Subcommand;

use super::args;
use super::output::Output;
use crate::domain::{parse_start, Pilot, PilotId, PilotStatus, Snapshot};
use crate::storage::Project;

#[derive(Subcommand)]
pub enum PilotCommands {
    /// Add a pilot to the roster
    ///
    /// Examples:
    ///   fleet pilot add "Arjun" --location Bangalore --skills "Mapping,Survey"
    ///   fleet pilot add "Neha" --location Mumbai --certs "DGCA@2026-12-31"
    Add {
        /// Pilot name
        name: String,

        /// Home site
        #[arg(long)]
        location: String,

        /// Site coordinates as `lat,lon`
        #[arg(long)]
        coords: Option<String>,

        /// Comma-separated skills
        #[arg(long)]
        skills: Option<String>,

        /// Comma-separated certifications, each optionally `name@expiry`
        #[arg(long)]
        certs: Option<String>,

        /// Earliest date the pilot can start a mission
        #[arg(long)]
        available_from: Option<String>,

        /// Explicit ID (defaults to the next free P-number)
        #[arg(long)]
        id: Option<String>,
    },

    /// List pilots
    List {
        /// Only pilots with this status
        #[arg(long)]
        status: Option<String>,
    },

    /// Show pilot details
    Show {
        /// Pilot ID
        id: String,
    },

    /// Change a pilot's status (available, deployed, on_leave, unavailable)
    Status {
        /// Pilot ID
        id: String,

        /// New status
        status: String,
    },
}

pub fn run(cmd: PilotCommands, output: &Output) -> Result<()> {
    match cmd {
        PilotCommands::Add {
            name,
            location,
            coords,
            skills,
            certs,
            available_from,
            id,
        } => {
            let mut pilot = Pilot::new(
                PilotId::new(0),
                name.trim(),
                args::location(&location, coords.as_deref())?,
            );
            pilot.skills = args::terms(skills.as_deref());
            pilot.certifications = args::certifications(certs.as_deref())?;
            pilot.available_from = available_from
                .as_deref()
                .map(parse_start)
                .transpose()
                .context("Invalid --available-from")?;
            let id = id.as_deref().map(str::parse::<PilotId>).transpose()?;
            add_pilot(output, pilot, id)
        }
        PilotCommands::List { status } => list_pilots(output, status.as_deref()),
        PilotCommands::Show { id } => show_pilot(output, &id),
        PilotCommands::Status { id, status } => set_status(output, &id, &status),
    }
}

fn add_pilot(output: &Output, mut pilot: Pilot, id: Option<PilotId>) -> Result<()> {
    if pilot.name.is_empty() {
        anyhow::bail!("Pilot name cannot be empty");
    }
    let project = Project::open_current()?;

    let (pilot, _) = project.update(|records| {
        pilot.id = id.unwrap_or_else(|| records.next_pilot_id());
        records.add_pilot(pilot.clone())?;
        Ok(pilot)
    })?;
    output.verbose_ctx("pilot", &format!("Added {} at {}", pilot.id, pilot.location));

    if output.is_json() {
        output.data(&pilot);
    } else {
        output.success(&format!("Added pilot: {} - {}", pilot.id, pilot.name));
    }
    Ok(())
}

fn list_pilots(output: &Output, status: Option<&str>) -> Result<()> {
    let filter = status
        .map(str::parse::<PilotStatus>)
        .transpose()
        .map_err(anyhow::Error::msg)?;

    let project = Project::open_current()?;
    let snapshot = project.load_snapshot()?;
    let pilots: Vec<&Pilot> = snapshot
        .pilots()
        .filter(|p| filter.map(|s| p.status == s).unwrap_or(true))
        .collect();

    if output.is_json() {
        output.data(&pilots);
    } else if pilots.is_empty() {
        println!("No pilots");
    } else {
        println!("{:<6} {:<20} {:<12} {:<14} SKILLS", "ID", "NAME", "STATUS", "LOCATION");
        println!("{}", "-".repeat(72));
        for pilot in pilots {
            println!(
                "{:<6} {:<20} {:<12} {:<14} {}",
                pilot.id,
                pilot.name,
                pilot.status,
                pilot.location,
                args::joined(&pilot.skills)
            );
        }
    }
    Ok(())
}

fn find<'a>(snapshot: &'a Snapshot, id: &str) -> Result<&'a Pilot> {
    let id: PilotId = id.parse()?;
    snapshot
        .pilot(id)
        .ok_or_else(|| anyhow::anyhow!("Pilot not found: {}", id))
}

fn show_pilot(output: &Output, id: &str) -> Result<()> {
    let project = Project::open_current()?;
    let snapshot = project.load_snapshot()?;
    let pilot = find(&snapshot, id)?;

    if output.is_json() {
        output.data(pilot);
        return Ok(());
    }

    println!("Pilot: {}", pilot.id);
    println!("Name: {}", pilot.name);
    println!("Status: {}", pilot.status);
    println!("Location: {}", pilot.location);
    if let Some(point) = pilot.location.coordinates {
        println!("Coordinates: {:.4}, {:.4}", point.lat, point.lon);
    }
    println!("Skills: {}", args::joined(&pilot.skills));
    if let Some(from) = pilot.available_from {
        println!("Available from: {}", from.format("%Y-%m-%d %H:%M"));
    }

    if !pilot.certifications.is_empty() {
        println!("\nCertifications:");
        for cert in &pilot.certifications {
            println!("  {}", cert);
        }
    }

    if !pilot.assignments.is_empty() {
        println!("\nAssignments:");
        for back in &pilot.assignments {
            let status = snapshot
                .mission(back.mission)
                .map(|m| m.status.label())
                .unwrap_or("?");
            println!("  {} {} ({})", back.mission, back.window, status);
        }
    }
    Ok(())
}

fn set_status(output: &Output, id: &str, status: &str) -> Result<()> {
    let id: PilotId = id.parse()?;
    let next: PilotStatus = status.parse().map_err(anyhow::Error::msg)?;
    let project = Project::open_current()?;

    let (previous, _) = project.update(|records| {
        let pilot = records.pilot_mut(id)?;
        let previous = pilot.status;
        pilot.set_status(next)?;
        Ok(previous)
    })?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": id,
            "previous": previous,
            "status": next,
        }));
    } else {
        output.success(&format!("Pilot {}: {} -> {}", id, previous, next));
    }
    Ok(())
}
