//! Domain models for Fleet Ops
//!
//! Contains the roster, fleet and mission records without any I/O concerns.

mod id;
mod window;
mod location;
mod requirements;
mod transition;
mod assignment;
mod pilot;
mod drone;
mod mission;
mod snapshot;

pub use id::{DroneId, IdError, MissionId, PilotId};
pub use window::{parse_end, parse_start, TimeWindow, WindowError};
pub use location::{GeoPoint, Location, LocationError};
pub use requirements::{has_term, missing_terms, normalize_term, parse_terms, Requirements};
pub use transition::TransitionError;
pub use assignment::{Assignment, AssignmentRef, Resource, Role};
pub use pilot::{Certification, CertificationCheck, Pilot, PilotStatus};
pub use drone::{Drone, DroneStatus};
pub use mission::{Mission, MissionStatus, Priority};
pub use snapshot::{rebuild_back_references, DataIntegrityError, IntegrityIssue, Snapshot};
