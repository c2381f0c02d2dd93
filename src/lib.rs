//! Fleet Ops - Pilot and drone scheduling for field operations
//!
//! Fleet Ops keeps a roster of pilots, a fleet of drones, and a mission
//! schedule in a `.fleet` directory. Its engine ranks eligible pilot/drone
//! pairs, detects scheduling conflicts, and plans urgent reassignments
//! that preempt lower-priority work within a bounded cascade.

pub mod domain;
pub mod engine;
pub mod storage;
pub mod cli;

pub use domain::{Drone, DroneId, Mission, MissionId, Pilot, PilotId, Snapshot};
pub use engine::{Engine, EngineConfig};
