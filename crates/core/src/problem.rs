use rand::Rng;
use std::collections::HashMap;
use thiserror::Error;
use types::{Assignment, CostWeights, Policy, ProjectName, Snapshot};

use crate::normalize::ScheduleData;
use crate::scoring::{CostBreakdown, ImpossibleCost, Score, Scorer};
use crate::search::LocalSearch;
use crate::ConfigError;

/// One slot index per project, in the problem's project order.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct State {
    slots: Vec<usize>,
}

impl State {
    pub fn slot_indices(&self) -> &[usize] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("assignment references unknown project {0}")]
    UnknownProject(ProjectName),
    #[error("project {project} assigned to unknown slot {slot}")]
    UnknownSlot { project: ProjectName, slot: String },
    #[error("project {0} assigned more than once")]
    DuplicateProject(ProjectName),
    #[error("project {0} has no assignment")]
    MissingProject(ProjectName),
}

/// Immutable once built; every move yields a fresh [`State`].
#[derive(Clone, Debug)]
pub struct ScheduleProblem {
    data: ScheduleData,
    scorer: Scorer,
}

impl ScheduleProblem {
    pub fn new(data: ScheduleData, weights: &CostWeights) -> Self {
        let scorer = Scorer::new(data.projects(), weights);
        Self { data, scorer }
    }

    pub fn from_snapshot(snap: &Snapshot, policy: &Policy) -> Result<Self, ConfigError> {
        let data = ScheduleData::from_snapshot(snap)?;
        Ok(Self::new(data, &policy.weights))
    }

    pub fn data(&self) -> &ScheduleData {
        &self.data
    }

    pub fn project_list(&self) -> Vec<&ProjectName> {
        self.data.project_list()
    }

    pub fn total_participants(&self) -> usize {
        self.data.total_participants()
    }

    pub fn impossible_cost(&self) -> ImpossibleCost {
        self.scorer.impossible()
    }

    /// Uniform slot per project, drawn independently. No constraint filtering.
    pub fn generate_random_state<R: Rng + ?Sized>(&self, rng: &mut R) -> State {
        let slot_count = self.data.slots().len();
        let slots = self
            .data
            .projects()
            .iter()
            .map(|_| rng.gen_range(0..slot_count))
            .collect();
        State { slots }
    }

    /// Every single reassignment, then every swap of two projects on different slots.
    pub fn neighbors(&self, state: &State) -> Vec<State> {
        let p = state.slots.len();
        let s = self.data.slots().len();
        let mut out = Vec::with_capacity(p * s.saturating_sub(1) + p * p.saturating_sub(1) / 2);

        for (i, &current) in state.slots.iter().enumerate() {
            for other in (0..s).filter(|&x| x != current) {
                let mut next = state.clone();
                next.slots[i] = other;
                out.push(next);
            }
        }

        for i in 0..p {
            for j in i + 1..p {
                if state.slots[i] == state.slots[j] {
                    continue;
                }
                let mut next = state.clone();
                next.slots.swap(i, j);
                out.push(next);
            }
        }
        out
    }

    pub fn value(&self, state: &State) -> Score {
        self.breakdown(state).score
    }

    /// `state` must come from this problem: one slot per project, each in range.
    pub fn breakdown(&self, state: &State) -> CostBreakdown {
        self.check_state(state);
        self.scorer.breakdown(&state.slots, self.data.slots().len())
    }

    fn check_state(&self, state: &State) {
        let slot_count = self.data.slots().len();
        debug_assert_eq!(
            state.slots.len(),
            self.data.projects().len(),
            "state does not belong to this problem"
        );
        debug_assert!(
            state.slots.iter().all(|&s| s < slot_count),
            "state uses a slot outside 0..{slot_count}"
        );
    }

    /// Co-scheduled project pairs that share a responsable.
    pub fn conflicts(&self, state: &State) -> Vec<(&ProjectName, &ProjectName)> {
        let mut out = Vec::new();
        for i in 0..state.slots.len() {
            for j in i + 1..state.slots.len() {
                if state.slots[i] == state.slots[j] && self.scorer.hard_collision(i, j) {
                    let projects = self.data.projects();
                    out.push((&projects[i].name, &projects[j].name));
                }
            }
        }
        out
    }

    /// One assignment per project; `state` must come from this problem.
    pub fn assignments(&self, state: &State) -> Vec<Assignment> {
        self.check_state(state);
        let slots = self.data.slots();
        self.data
            .projects()
            .iter()
            .zip(&state.slots)
            .map(|(p, &s)| Assignment {
                project: p.name.clone(),
                slot: slots[s].clone(),
            })
            .collect()
    }

    pub fn state_from_assignments(&self, assignments: &[Assignment]) -> Result<State, StateError> {
        let idx_project: HashMap<&str, usize> = self
            .data
            .projects()
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name.0.as_str(), i))
            .collect();
        let idx_slot: HashMap<&str, usize> = self
            .data
            .slots()
            .iter()
            .enumerate()
            .map(|(i, s)| (s.0.as_str(), i))
            .collect();

        let mut slots: Vec<Option<usize>> = vec![None; self.data.projects().len()];
        for a in assignments {
            let Some(&pi) = idx_project.get(a.project.0.as_str()) else {
                return Err(StateError::UnknownProject(a.project.clone()));
            };
            let Some(&si) = idx_slot.get(a.slot.0.as_str()) else {
                return Err(StateError::UnknownSlot {
                    project: a.project.clone(),
                    slot: a.slot.0.clone(),
                });
            };
            if slots[pi].replace(si).is_some() {
                return Err(StateError::DuplicateProject(a.project.clone()));
            }
        }

        let projects = self.data.projects();
        let slots = slots
            .into_iter()
            .enumerate()
            .map(|(i, s)| s.ok_or_else(|| StateError::MissingProject(projects[i].name.clone())))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(State { slots })
    }
}

impl LocalSearch for ScheduleProblem {
    type State = State;
    type Score = Score;

    fn neighbors(&self, state: &State) -> Vec<State> {
        ScheduleProblem::neighbors(self, state)
    }

    fn value(&self, state: &State) -> Score {
        ScheduleProblem::value(self, state)
    }
}
