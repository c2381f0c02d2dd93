//! Main CLI application structure

use clap::{Parser, Subcommand};
use anyhow::Result;

use super::output::{Output, OutputFormat};
use super::{drone, logging, mission, pilot, query, urgent};
use crate::storage::{Config, Project};

#[derive(Parser)]
#[command(name = "fleet")]
#[command(author, version, about = "Pilot and drone scheduling for field operations")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new fleet project
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Manage the pilot roster
    #[command(subcommand)]
    Pilot(pilot::PilotCommands),

    /// Manage the drone fleet
    #[command(subcommand)]
    Drone(drone::DroneCommands),

    /// Manage missions and assignments
    #[command(subcommand)]
    Mission(mission::MissionCommands),

    /// Rank eligible pilot/drone pairs for a mission
    Match {
        /// Mission ID
        mission: String,

        /// Override the proximity radius (km)
        #[arg(long)]
        radius: Option<f64>,

        /// Show at most this many candidates
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },

    /// Show scheduling conflicts, most severe first
    Conflicts {
        /// Only conflicts involving this mission
        #[arg(long)]
        mission: Option<String>,

        /// Override the proximity radius (km)
        #[arg(long)]
        radius: Option<f64>,
    },

    /// Plan staffing for an urgent mission, preempting lower-priority work
    Urgent {
        /// Mission ID
        mission: String,

        /// Override the cascade depth bound
        #[arg(long)]
        depth: Option<usize>,

        /// Override the proximity radius (km)
        #[arg(long)]
        radius: Option<f64>,

        /// Carry out the plan if the data has not changed
        #[arg(long)]
        apply: bool,
    },

    /// Show roster, fleet, and mission overview
    Status,
}

fn default_format() -> OutputFormat {
    Config::load()
        .map(|config| config.global.default_format.into())
        .unwrap_or_default()
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    let format = cli.format.unwrap_or_else(default_format);
    let output = Output::new(format, cli.verbose);

    output.verbose("fleet starting");

    match cli.command {
        Commands::Init { path } => {
            output.verbose_ctx("init", &format!("Initializing project at: {}", path));
            let project = Project::init(&path)?;
            output.verbose_ctx("init", &format!("Created .fleet directory at: {}", project.fleet_dir().display()));
            if output.is_json() {
                output.data(&serde_json::json!({
                    "initialized": true,
                    "path": project.root().display().to_string(),
                }));
            } else {
                output.success(&format!("Initialized fleet project at {}", project.root().display()));
            }
        }

        Commands::Pilot(cmd) => pilot::run(cmd, &output)?,
        Commands::Drone(cmd) => drone::run(cmd, &output)?,
        Commands::Mission(cmd) => mission::run(cmd, &output)?,

        Commands::Match { mission, radius, limit } => {
            output.verbose_ctx("match", &format!("Matching {}, radius override: {:?}", mission, radius));
            query::match_mission(&output, &mission, radius, limit)?
        }
        Commands::Conflicts { mission, radius } => {
            output.verbose_ctx("conflicts", &format!("Detecting conflicts, mission filter: {:?}", mission));
            query::conflicts(&output, mission.as_deref(), radius)?
        }
        Commands::Urgent { mission, depth, radius, apply } => {
            output.verbose_ctx("urgent", &format!("Planning {}: depth={:?}, apply={}", mission, depth, apply));
            urgent::run(&output, &mission, depth, radius, apply)?
        }
        Commands::Status => {
            output.verbose("Gathering fleet status");
            query::status(&output)?
        }
    }

    output.verbose("Command completed successfully");
    Ok(())
}
