//! Urgent-mission reassignment
//!
//! Bounded depth-first search over partial proposals. Each proposal fills
//! open slots (mission + role) in FIFO order, either from a resource with
//! no overlapping commitment or by preempting the Normal missions holding
//! a qualified resource. Every preempted mission gets its own slot at
//! `depth + 1`, refilled the same way or left unfilled.
//!
//! Cost, compared lexicographically, lower is better:
//!
//! 1. missions left unfilled
//! 2. preemption moves
//! 3. cascade depth
//! 4. total distance of the resources to their new missions
//!
//! Every component only grows as a proposal is extended, so partial
//! proposals worse than the best complete plan are pruned.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;
use tracing::{debug, trace};

use super::matching::{distance_m, drone_fit, pilot_fit, Fit, Pool};
use super::{EngineConfig, EngineError, TieBreak};
use crate::domain::{Mission, MissionId, MissionStatus, Priority, Resource, Role, Snapshot};

/// A resource taken from one mission and given to another
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Move {
    pub resource: Resource,
    pub from: MissionId,
    pub to: MissionId,
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} -> {}", self.resource, self.from, self.to)
    }
}

/// A resource with no overlapping commitment given to a mission
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Allocation {
    pub resource: Resource,
    pub to: MissionId,
}

impl fmt::Display for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: free -> {}", self.resource, self.to)
    }
}

/// A proposed cascade; applying it is the store's job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// The urgent mission being staffed
    pub mission: MissionId,

    /// Snapshot version the plan was computed against
    pub based_on: Option<String>,

    /// Preemptions, in the order they were decided
    pub moves: Vec<Move>,

    pub allocations: Vec<Allocation>,

    /// Displaced missions that could not be refilled
    pub unassigned: Vec<MissionId>,

    pub depth: usize,
    pub distance_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum InfeasibleReason {
    /// No qualified pilot or drone exists, even by preemption
    NoQualifiedResources,

    /// A cascade exists only beyond the depth bound
    DepthExceeded { bound: usize },

    /// Equal-cost plans exist and the tie-break policy refuses to guess
    Ambiguous { alternatives: Vec<Vec<Move>> },

    SearchBudgetExhausted { budget: usize },
}

impl fmt::Display for InfeasibleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InfeasibleReason::NoQualifiedResources => {
                f.write_str("no qualified pilot and drone, even by preemption")
            }
            InfeasibleReason::DepthExceeded { bound } => {
                write!(f, "every cascade is deeper than the bound of {}", bound)
            }
            InfeasibleReason::Ambiguous { alternatives } => {
                write!(f, "{} plans have equal cost", alternatives.len())
            }
            InfeasibleReason::SearchBudgetExhausted { budget } => {
                write!(f, "search gave up after {} expansions", budget)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Infeasible {
    pub mission: MissionId,

    #[serde(flatten)]
    pub reason: InfeasibleReason,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReassignOutcome {
    Planned(Plan),
    Infeasible(Infeasible),
}

impl ReassignOutcome {
    pub fn plan(&self) -> Option<&Plan> {
        match self {
            ReassignOutcome::Planned(plan) => Some(plan),
            ReassignOutcome::Infeasible(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    mission: MissionId,
    role: Role,
    depth: usize,
}

/// Arena entry for a preempted mission
#[derive(Debug, Clone, Copy)]
struct Displacement {
    by: MissionId,
}

#[derive(Debug, Clone, Default)]
struct Proposal {
    moves: Vec<Move>,
    allocations: Vec<Allocation>,
    claimed: BTreeSet<Resource>,
    displaced: BTreeMap<MissionId, Displacement>,
    pending: VecDeque<Slot>,
    unfilled: BTreeSet<MissionId>,
    depth: usize,
    distance_m: u64,
}

type Cost = (usize, usize, usize, u64);

impl Proposal {
    fn cost(&self) -> Cost {
        (
            self.unfilled.len(),
            self.moves.len(),
            self.depth,
            self.distance_m,
        )
    }

    fn signature(&self) -> (Vec<Move>, Vec<Allocation>) {
        let mut moves = self.moves.clone();
        let mut allocations = self.allocations.clone();
        moves.sort();
        allocations.sort();
        (moves, allocations)
    }
}

/// One way to fill a slot
struct SlotOption {
    resource: Resource,
    /// Missions the resource is taken from; empty when it is free
    from: Vec<MissionId>,
    distance_m: u64,
}

struct CascadeSearch<'a> {
    config: &'a EngineConfig,
    snapshot: &'a Snapshot,
    target: &'a Mission,
    expansions: usize,
    depth_limited: bool,
    best: Option<Proposal>,
    rival: Option<Proposal>,
}

impl<'a> CascadeSearch<'a> {
    fn run(mut self) -> ReassignOutcome {
        let mut initial = Proposal::default();
        for role in self.target.open_roles() {
            initial.pending.push_back(Slot {
                mission: self.target.id,
                role,
                depth: 0,
            });
        }

        let mut stack = vec![initial];
        while let Some(mut proposal) = stack.pop() {
            self.expansions += 1;
            if self.expansions > self.config.search_budget {
                debug!(mission = %self.target.id, "cascade search budget exhausted");
                return self.infeasible(InfeasibleReason::SearchBudgetExhausted {
                    budget: self.config.search_budget,
                });
            }
            if self.pruned(&proposal) {
                continue;
            }

            let Some(slot) = proposal.pending.pop_front() else {
                self.offer(proposal);
                continue;
            };
            trace!(
                mission = %slot.mission,
                role = slot.role.label(),
                depth = slot.depth,
                "expand"
            );

            let children = self.expand(&proposal, slot);
            stack.extend(children.into_iter().rev());
        }

        debug!(
            mission = %self.target.id,
            expansions = self.expansions,
            found = self.best.is_some(),
            "cascade search finished"
        );
        self.finish()
    }

    fn pruned(&self, proposal: &Proposal) -> bool {
        match &self.best {
            Some(best) => proposal.cost() > best.cost(),
            None => false,
        }
    }

    fn offer(&mut self, proposal: Proposal) {
        let Some(best) = &self.best else {
            self.best = Some(proposal);
            return;
        };

        match proposal.cost().cmp(&best.cost()) {
            std::cmp::Ordering::Less => {
                self.best = Some(proposal);
                self.rival = None;
            }
            std::cmp::Ordering::Equal => {
                let (mine, theirs) = (proposal.signature(), best.signature());
                if mine < theirs {
                    self.rival = self.best.replace(proposal);
                } else if mine != theirs && self.rival.is_none() {
                    self.rival = Some(proposal);
                }
            }
            std::cmp::Ordering::Greater => {}
        }
    }

    fn expand(&mut self, proposal: &Proposal, slot: Slot) -> Vec<Proposal> {
        let snapshot = self.snapshot;
        let Some(mission) = snapshot.mission(slot.mission) else {
            return Vec::new();
        };

        let mut children: Vec<Proposal> = self
            .options(proposal, mission, slot)
            .into_iter()
            .map(|option| fill(proposal, slot, option))
            .collect();

        if slot.mission != self.target.id {
            let mut child = proposal.clone();
            child.unfilled.insert(slot.mission);
            children.push(child);
        }
        children
    }

    fn options(&mut self, proposal: &Proposal, mission: &Mission, slot: Slot) -> Vec<SlotOption> {
        let (config, snapshot) = (self.config, self.snapshot);

        let qualified: Vec<(Resource, Fit)> = match slot.role {
            Role::Pilot => snapshot
                .pilots()
                .filter_map(|p| {
                    pilot_fit(config, p, mission, snapshot, Pool::OnDuty)
                        .map(|f| (Resource::Pilot(p.id), f))
                })
                .collect(),
            Role::Drone => snapshot
                .drones()
                .filter_map(|d| {
                    drone_fit(config, d, mission, snapshot, Pool::OnDuty)
                        .map(|f| (Resource::Drone(d.id), f))
                })
                .collect(),
        };

        let mut options = Vec::new();
        for (resource, fit) in qualified {
            if !fit.is_exact() || proposal.claimed.contains(&resource) {
                continue;
            }

            let blockers = snapshot.overlapping_commitments(resource, &mission.window, Some(mission.id));
            let option = SlotOption {
                resource,
                from: blockers,
                distance_m: distance_m(fit.distance_km),
            };
            if option.from.is_empty() {
                options.push(option);
                continue;
            }

            if !option.from.iter().all(|b| self.preemptible(proposal, *b, slot.mission)) {
                continue;
            }
            if slot.depth + 1 > config.cascade_depth {
                self.depth_limited = true;
                continue;
            }
            options.push(option);
        }

        options.sort_by_key(|o| (o.from.len(), o.distance_m, o.resource));
        options
    }

    /// Whether `filling` may take a resource away from `blocker`
    fn preemptible(&self, proposal: &Proposal, blocker: MissionId, filling: MissionId) -> bool {
        if blocker == self.target.id {
            return false;
        }
        let Some(mission) = self.snapshot.mission(blocker) else {
            return false;
        };
        if mission.priority != Priority::Normal || !mission.status.is_preemptible() {
            return false;
        }
        match proposal.displaced.get(&blocker) {
            Some(displacement) => displacement.by == filling,
            None => true,
        }
    }

    fn infeasible(&self, reason: InfeasibleReason) -> ReassignOutcome {
        ReassignOutcome::Infeasible(Infeasible {
            mission: self.target.id,
            reason,
        })
    }

    fn finish(mut self) -> ReassignOutcome {
        let Some(best) = self.best.take() else {
            let reason = if self.depth_limited {
                InfeasibleReason::DepthExceeded {
                    bound: self.config.cascade_depth,
                }
            } else {
                InfeasibleReason::NoQualifiedResources
            };
            return self.infeasible(reason);
        };

        if self.config.tie_break == TieBreak::Refuse {
            if let Some(rival) = self.rival.take() {
                return self.infeasible(InfeasibleReason::Ambiguous {
                    alternatives: vec![best.signature().0, rival.signature().0],
                });
            }
        }

        ReassignOutcome::Planned(Plan {
            mission: self.target.id,
            based_on: self.snapshot.version().map(str::to_string),
            moves: best.moves,
            allocations: best.allocations,
            unassigned: best.unfilled.into_iter().collect(),
            depth: best.depth,
            distance_km: best.distance_m as f64 / 1000.0,
        })
    }
}

fn fill(proposal: &Proposal, slot: Slot, option: SlotOption) -> Proposal {
    let mut child = proposal.clone();
    child.claimed.insert(option.resource);
    child.distance_m += option.distance_m;

    if option.from.is_empty() {
        child.allocations.push(Allocation {
            resource: option.resource,
            to: slot.mission,
        });
        return child;
    }

    let depth = slot.depth + 1;
    child.depth = child.depth.max(depth);
    for from in option.from {
        child.moves.push(Move {
            resource: option.resource,
            from,
            to: slot.mission,
        });
        child
            .displaced
            .entry(from)
            .or_insert(Displacement { by: slot.mission });
        child.pending.push_back(Slot {
            mission: from,
            role: slot.role,
            depth,
        });
    }
    child
}

pub(crate) fn reassign_urgent(
    config: &EngineConfig,
    mission: MissionId,
    snapshot: &Snapshot,
) -> Result<ReassignOutcome, EngineError> {
    let target = snapshot
        .mission(mission)
        .ok_or(EngineError::UnknownMission(mission))?;
    if !target.priority.is_urgent() {
        return Err(EngineError::NotUrgent(mission));
    }
    if target.status != MissionStatus::Unassigned {
        return Err(EngineError::NotOpen(mission, target.status));
    }
    if target.is_staffed() {
        return Err(EngineError::AlreadyStaffed(mission));
    }

    debug!(
        mission = %mission,
        depth = config.cascade_depth,
        budget = config.search_budget,
        "cascade search"
    );

    let search = CascadeSearch {
        config,
        snapshot,
        target,
        expansions: 0,
        depth_limited: false,
        best: None,
        rival: None,
    };
    Ok(search.run())
}
