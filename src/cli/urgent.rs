//! Urgent reassignment command

use anyhow::Result;

use super::output::Output;
use super::query::engine_for;
use crate::domain::MissionId;
use crate::engine::{Plan, ReassignOutcome};
use crate::storage::{ApplyOutcome, Project};

pub fn run(
    output: &Output,
    id: &str,
    depth: Option<usize>,
    radius: Option<f64>,
    apply: bool,
) -> Result<()> {
    let id: MissionId = id.parse()?;
    let project = Project::open_current()?;
    let snapshot = project.load_snapshot()?;
    let engine = engine_for(&project, radius, depth)?;

    let outcome = engine.reassign_urgent(id, &snapshot)?;
    let applied = match (&outcome, apply) {
        (ReassignOutcome::Planned(plan), true) => Some(project.apply_plan(plan)?),
        _ => None,
    };

    if output.is_json() {
        output.data(&serde_json::json!({
            "result": outcome,
            "applied": applied,
        }));
    } else {
        match &outcome {
            ReassignOutcome::Planned(plan) => print_plan(plan),
            ReassignOutcome::Infeasible(infeasible) => {
                println!("Cannot staff {}: {}", infeasible.mission, infeasible.reason);
            }
        }
    }

    ensure_applied(id, applied.as_ref())?;

    if !output.is_json() {
        match applied {
            Some(_) => {
                println!();
                output.success(&format!("Applied plan for {}", id));
            }
            None if outcome.plan().is_some() => {
                println!();
                println!("Run with --apply to carry out this plan");
            }
            None => {}
        }
    }
    Ok(())
}

/// A plan the store turned down fails the command in every format
fn ensure_applied(id: MissionId, applied: Option<&ApplyOutcome>) -> Result<()> {
    match applied {
        Some(ApplyOutcome::Rejected(reason)) => {
            anyhow::bail!("Plan for {} was not applied: {}", id, reason)
        }
        _ => Ok(()),
    }
}

fn print_plan(plan: &Plan) {
    println!("Plan for {}", plan.mission);
    println!("{}", "-".repeat(40));

    for allocation in &plan.allocations {
        println!("  assign  {}", allocation);
    }
    for mv in &plan.moves {
        println!("  move    {}", mv);
    }

    println!();
    println!(
        "Moves: {}  Depth: {}  Distance: {:.1} km",
        plan.moves.len(),
        plan.depth,
        plan.distance_km
    );
    if plan.unassigned.is_empty() {
        println!("Every displaced mission is refilled");
    } else {
        let ids: Vec<String> = plan.unassigned.iter().map(|m| m.to_string()).collect();
        println!("Falls back to unassigned: {}", ids.join(", "));
    }
}
