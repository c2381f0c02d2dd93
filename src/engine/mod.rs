//! # Matching & Conflict Engine
//!
//! Pure computations over a validated [`Snapshot`]:
//!
//! | Operation | Result | Never fails? |
//! |-----------|--------|--------------|
//! | [`Engine::find_eligible`] | ranked `(pilot, drone)` candidates | yes |
//! | [`Engine::detect_conflicts`] | sorted set of [`Conflict`]s | yes |
//! | [`Engine::reassign_urgent`] | a cascade [`Plan`] or [`Infeasible`] | caller errors only |
//!
//! The engine never mutates the snapshot. Plans are proposals that the
//! store applies atomically (see `storage::Project::apply_plan`).

mod similarity;
mod matching;
mod conflict;
mod reassign;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Mission, MissionId, MissionStatus, Snapshot};

pub use similarity::{requirement_confidence, term_similarity};
pub use matching::{Candidate, MatchQuality};
pub use conflict::{Conflict, ConflictKind, Severity};
pub use reassign::{Allocation, Infeasible, InfeasibleReason, Move, Plan, ReassignOutcome};

/// How to settle two cascade plans of identical cost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Report the mission infeasible instead of picking one
    #[default]
    Refuse,
    /// Prefer the plan whose moves sort first by resource and mission id
    Identifier,
}

/// Tunable constants for matching and reassignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum distance between a resource and the mission site
    pub proximity_radius_km: f64,

    /// Maximum length of a displacement chain
    pub cascade_depth: usize,

    /// Minimum confidence for a degraded skill/capability match
    pub similarity_threshold: f64,

    /// Tie-break policy for equal-cost plans
    pub tie_break: TieBreak,

    /// Maximum number of search expansions per reassignment
    pub search_budget: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            proximity_radius_km: 50.0,
            cascade_depth: 2,
            similarity_threshold: 0.5,
            tie_break: TieBreak::Refuse,
            search_budget: 50_000,
        }
    }
}

impl EngineConfig {
    /// Checks the values are usable
    pub fn validate(&self) -> Result<(), EngineConfigError> {
        if !self.proximity_radius_km.is_finite() || self.proximity_radius_km < 0.0 {
            return Err(EngineConfigError::ProximityRadius(self.proximity_radius_km));
        }
        if !(self.similarity_threshold > 0.0 && self.similarity_threshold <= 1.0) {
            return Err(EngineConfigError::SimilarityThreshold(self.similarity_threshold));
        }
        if self.search_budget == 0 {
            return Err(EngineConfigError::SearchBudget);
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum EngineConfigError {
    #[error("proximity_radius_km must be a non-negative number, got {0}")]
    ProximityRadius(f64),

    #[error("similarity_threshold must be in (0, 1], got {0}")]
    SimilarityThreshold(f64),

    #[error("search_budget must be at least 1")]
    SearchBudget,
}

#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("Mission not found: {0}")]
    UnknownMission(MissionId),

    #[error("Mission {0} is not urgent")]
    NotUrgent(MissionId),

    #[error("Mission {0} is {1}; only unassigned missions can be reassigned")]
    NotOpen(MissionId, MissionStatus),

    #[error("Mission {0} already has a pilot and a drone")]
    AlreadyStaffed(MissionId),
}

/// The matching and conflict engine
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Ranked pilot/drone pairs able to fly the mission
    ///
    /// The mission does not have to be part of the snapshot. Its own
    /// assignment, if any, does not count as a commitment.
    pub fn find_eligible(&self, mission: &Mission, snapshot: &Snapshot) -> Vec<Candidate> {
        matching::find_eligible(&self.config, mission, snapshot)
    }

    /// Every conflict in the snapshot's current assignments
    pub fn detect_conflicts(&self, snapshot: &Snapshot) -> Vec<Conflict> {
        conflict::detect_conflicts(&self.config, snapshot)
    }

    /// Plans how to staff an urgent mission, preempting normal missions if needed
    pub fn reassign_urgent(
        &self,
        mission: MissionId,
        snapshot: &Snapshot,
    ) -> Result<ReassignOutcome, EngineError> {
        reassign::reassign_urgent(&self.config, mission, snapshot)
    }
}
