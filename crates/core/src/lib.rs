pub mod normalize;
pub mod problem;
pub mod scoring;
pub mod search;

use async_trait::async_trait;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use thiserror::Error;

pub use normalize::{Project, ScheduleData};
pub use problem::{ScheduleProblem, State, StateError};
pub use scoring::{CostBreakdown, ImpossibleCost, Score, IMPOSSIBLE_COST};
pub use search::{
    hill_climbing, hill_climbing_with, LocalSearch, SearchLimits, SearchOutcome, StopReason,
};
pub use types::{
    Assignment, CostWeights, Policy, ProjectName, ProjectSpec, ScheduleResult, SlotCode,
    Snapshot, SolveEnvelope, SolveParams, Username,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no slots available to schedule {projects} projects")]
    NoSlots { projects: usize },
    #[error("invalid snapshot: {0}")]
    Invalid(String),
}

/// Structural checks on a snapshot. Every problem found is reported, joined with `; `.
pub fn validate(snap: &Snapshot) -> Result<(), ConfigError> {
    if snap.available_slots.is_empty() && !snap.projects.is_empty() {
        return Err(ConfigError::NoSlots {
            projects: snap.projects.len(),
        });
    }

    let mut errors: Vec<String> = Vec::new();

    fn chk_unique<I: ToString>(name: &str, ids: impl Iterator<Item = I>, errors: &mut Vec<String>) {
        use std::collections::HashSet;
        let mut seen = HashSet::new();
        for id in ids {
            let s = id.to_string();
            if !seen.insert(s.clone()) {
                errors.push(format!("duplicate {name} code: {s}"));
            }
        }
    }
    chk_unique("slot", snap.available_slots.iter(), &mut errors);

    if snap.available_slots.iter().any(|s| s.0.trim().is_empty()) {
        errors.push("slot code is empty".into());
    }

    let slots = snap.slot_set();

    for (name, p) in &snap.projects {
        if name.0.trim().is_empty() {
            errors.push("project name is empty".into());
        }
        if p.difficult_level == 0 {
            errors.push(format!("project {name} has difficult_level=0"));
        }
        for slot in &p.priority_slots {
            if !slots.contains(slot) {
                errors.push(format!("project {name} prefers unknown slot {slot}"));
            }
        }
    }

    for (user, available) in &snap.responsable_available_slots {
        for slot in available {
            if !slots.contains(slot) {
                errors.push(format!("user {user} is available in unknown slot {slot}"));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Invalid(errors.join("; ")))
    }
}

#[async_trait]
pub trait Solver: Send + Sync + 'static {
    /// `cancel` is raised by the caller when it gives up on the result.
    async fn solve(
        &self,
        env: SolveEnvelope,
        cancel: Arc<AtomicBool>,
    ) -> anyhow::Result<ScheduleResult>;
}
