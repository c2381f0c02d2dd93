//! Project management
//!
//! Handles project initialization, snapshot loading and atomic updates.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use super::{Config, JsonlStore, Records};
use crate::domain::{Drone, Mission, Pilot, Snapshot};
use crate::engine::{Engine, Plan};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not in a fleet project. Run 'fleet init' first.")]
    NotInProject,

    #[error("Project data failed validation")]
    Integrity,
}

/// Why a plan was not applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectReason {
    /// The store changed after the plan was computed
    StaleVersion {
        expected: Option<String>,
        found: String,
    },

    /// The plan no longer fits the stored records
    Invalid { detail: String },
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::StaleVersion { expected, found } => write!(
                f,
                "store is at version {} but the plan was computed against {}",
                short_version(found),
                expected.as_deref().map(short_version).unwrap_or("no version")
            ),
            RejectReason::Invalid { detail } => f.write_str(detail),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ApplyOutcome {
    Applied { version: String },
    Rejected(RejectReason),
}

/// First 12 hex digits, enough to tell versions apart on screen
pub fn short_version(version: &str) -> &str {
    version.get(..12).unwrap_or(version)
}

/// Held while a command reads, changes and writes the records
pub struct ProjectLock {
    _file: File,
}

/// A Fleet Ops project
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens an existing project at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.join(".fleet").is_dir() {
            return Err(ProjectError::NotInProject.into());
        }

        let config = Config::for_project(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the project at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_project_root().ok_or(ProjectError::NotInProject)?;

        Self::open(root)
    }

    /// Initializes a new project at the given path
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let fleet_dir = root.join(".fleet");

        fs::create_dir_all(&fleet_dir).with_context(|| {
            format!("Failed to create .fleet directory: {}", fleet_dir.display())
        })?;

        let config_path = fleet_dir.join("config.toml");
        if !config_path.exists() {
            let default_config = r#"# Fleet Ops configuration

[engine]
# Maximum distance (km) between a pilot or drone and the mission site
proximity_radius_km = 50.0

# Maximum length of a displacement chain for urgent reassignment
cascade_depth = 2

# Minimum confidence (0-1] for a degraded skill match
similarity_threshold = 0.5

# "refuse" reports equal-cost plans as a tie, "identifier" picks the lowest ids
tie_break = "refuse"

# Maximum search expansions per urgent reassignment
search_budget = 50000
"#;
            fs::write(&config_path, default_config)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        let gitignore_path = fleet_dir.join(".gitignore");
        if !gitignore_path.exists() {
            fs::write(&gitignore_path, "# Lock file held during updates\n.lock\n*.tmp\n").with_context(
                || format!("Failed to write .gitignore: {}", gitignore_path.display()),
            )?;
        }

        Self::open(root)
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .fleet directory path
    pub fn fleet_dir(&self) -> PathBuf {
        self.root.join(".fleet")
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns an engine configured for this project
    pub fn engine(&self) -> Engine {
        Engine::new(self.config.project.engine.clone())
    }

    pub fn pilot_store(&self) -> JsonlStore<Pilot> {
        JsonlStore::for_project(&self.root)
    }

    pub fn drone_store(&self) -> JsonlStore<Drone> {
        JsonlStore::for_project(&self.root)
    }

    pub fn mission_store(&self) -> JsonlStore<Mission> {
        JsonlStore::for_project(&self.root)
    }

    /// Takes the exclusive project lock
    pub fn lock(&self) -> Result<ProjectLock> {
        let path = self.fleet_dir().join(".lock");
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .with_context(|| format!("Failed to open lock file: {}", path.display()))?;
        file.lock_exclusive()
            .context("Failed to acquire project lock")?;
        Ok(ProjectLock { _file: file })
    }

    /// Digest of the three record files
    pub fn version(&self) -> Result<String> {
        let mut hasher = blake3::Hasher::new();
        self.pilot_store().digest_into(&mut hasher)?;
        self.drone_store().digest_into(&mut hasher)?;
        self.mission_store().digest_into(&mut hasher)?;
        Ok(hasher.finalize().to_hex().to_string())
    }

    /// Reads the raw records without validating them
    pub fn read_records(&self) -> Result<Records> {
        Ok(Records {
            pilots: self.pilot_store().read_all()?,
            drones: self.drone_store().read_all()?,
            missions: self.mission_store().read_all()?,
        })
    }

    /// Loads a validated snapshot stamped with the current version
    pub fn load_snapshot(&self) -> Result<Snapshot> {
        let version = self.version()?;
        let records = self.read_records()?;
        let snapshot = Snapshot::new(records.pilots, records.drones, records.missions)
            .map_err(anyhow::Error::new)
            .context(ProjectError::Integrity)?;

        debug!(
            version = short_version(&version),
            pilots = snapshot.pilots().count(),
            drones = snapshot.drones().count(),
            missions = snapshot.missions().count(),
            "snapshot loaded"
        );
        Ok(snapshot.with_version(version))
    }

    /// Validates the records and writes all three files
    ///
    /// Every file is written out in full before any of them is replaced.
    pub fn save(&self, records: Records) -> Result<Snapshot> {
        let snapshot = records
            .into_snapshot()
            .map_err(anyhow::Error::new)
            .context(ProjectError::Integrity)?;

        let pilots: Vec<Pilot> = snapshot.pilots().cloned().collect();
        let drones: Vec<Drone> = snapshot.drones().cloned().collect();
        let missions: Vec<Mission> = snapshot.missions().cloned().collect();

        let staged = [
            self.pilot_store().stage(&pilots)?,
            self.drone_store().stage(&drones)?,
            self.mission_store().stage(&missions)?,
        ];
        for file in staged {
            file.commit()?;
        }

        let version = self.version()?;
        Ok(snapshot.with_version(version))
    }

    /// Reads, changes and saves the records under the project lock
    pub fn update<T>(&self, change: impl FnOnce(&mut Records) -> Result<T>) -> Result<(T, Snapshot)> {
        let _lock = self.lock()?;
        let mut records = self.read_records()?;
        let value = change(&mut records)?;
        let snapshot = self.save(records)?;
        Ok((value, snapshot))
    }

    /// Applies a plan if the store has not moved past the plan's version
    pub fn apply_plan(&self, plan: &Plan) -> Result<ApplyOutcome> {
        let _lock = self.lock()?;

        let found = self.version()?;
        if plan.based_on.as_deref() != Some(found.as_str()) {
            return Ok(ApplyOutcome::Rejected(RejectReason::StaleVersion {
                expected: plan.based_on.clone(),
                found,
            }));
        }

        let mut records = self.read_records()?;
        if let Err(e) = records.apply(plan) {
            return Ok(ApplyOutcome::Rejected(RejectReason::Invalid {
                detail: e.to_string(),
            }));
        }

        let snapshot = self.save(records)?;
        let version = snapshot.version().unwrap_or_default().to_string();
        info!(
            mission = %plan.mission,
            moves = plan.moves.len(),
            allocations = plan.allocations.len(),
            version = short_version(&version),
            "plan applied"
        );
        Ok(ApplyOutcome::Applied { version })
    }
}
