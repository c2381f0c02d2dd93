//! # Storage Layer
//!
//! Persistence layer for Fleet Ops with git-friendly file formats.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Pilots | JSONL (one JSON per line) | `.fleet/pilots.jsonl` |
//! | Drones | JSONL (one JSON per line) | `.fleet/drones.jsonl` |
//! | Missions | JSONL (one JSON per line) | `.fleet/missions.jsonl` |
//! | Config | TOML | `.fleet/config.toml` |
//!
//! ## Concurrency Safety
//!
//! - [`JsonlStore`] uses file locking (`fs2`) for concurrent access
//! - [`Project::update`] and [`Project::apply_plan`] hold an exclusive
//!   project lock across read, change and write
//! - All writes are atomic (temp file + rename)
//! - The snapshot version is a `blake3` digest of the three record files;
//!   a plan computed against an older version is rejected
//!
//! ## Project Structure
//!
//! ```text
//! .fleet/
//! ├── pilots.jsonl
//! ├── drones.jsonl
//! ├── missions.jsonl
//! ├── config.toml           # Project configuration
//! └── .gitignore            # Ignores the lock file
//! ```

mod jsonl;
mod records;
mod config;
mod project;

pub use jsonl::{JsonlStore, Record, Staged};
pub use records::{RecordError, Records};
pub use config::{Config, ConfigError, GlobalConfig, OutputFormat, ProjectConfig};
pub use project::{short_version, ApplyOutcome, Project, ProjectError, ProjectLock, RejectReason};
