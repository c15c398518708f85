//! Steepest-ascent hill climbing over any neighborhood.

use serde::Serialize;
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

pub trait LocalSearch {
    type State: Clone;
    type Score: Ord + Copy + Debug;

    fn neighbors(&self, state: &Self::State) -> Vec<Self::State>;
    fn value(&self, state: &Self::State) -> Self::Score;
}

#[derive(Clone, Debug, Default)]
pub struct SearchLimits {
    pub max_steps: Option<usize>,
    pub cancel: Option<Arc<AtomicBool>>,
}

impl SearchLimits {
    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map_or(false, |flag| flag.load(Ordering::Relaxed))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    LocalOptimum,
    IterationLimit,
    Cancelled,
}

#[derive(Clone, Debug)]
pub struct SearchOutcome<S, V> {
    pub state: S,
    pub score: V,
    pub steps: usize,
    pub stop: StopReason,
}

/// Climbs until no neighbor is strictly better and returns that local optimum.
pub fn hill_climbing<P: LocalSearch>(problem: &P, initial: P::State) -> P::State {
    hill_climbing_with(problem, initial, &SearchLimits::default()).state
}

/// Same trajectory as [`hill_climbing`], but stops early on the step cap or
/// when the cancel flag is raised. The state returned is the best reached.
///
/// A state with no better neighbor always reports `LocalOptimum`, even when
/// the step cap is also reached there.
pub fn hill_climbing_with<P: LocalSearch>(
    problem: &P,
    initial: P::State,
    limits: &SearchLimits,
) -> SearchOutcome<P::State, P::Score> {
    let mut current = initial;
    let mut current_score = problem.value(&current);
    let mut steps = 0usize;

    let stop = loop {
        if limits.cancelled() {
            break StopReason::Cancelled;
        }

        // strict `>` keeps the first of equally good neighbors
        let mut best: Option<(P::State, P::Score)> = None;
        for n in problem.neighbors(&current) {
            let v = problem.value(&n);
            if v > current_score && best.as_ref().map_or(true, |(_, b)| v > *b) {
                best = Some((n, v));
            }
        }

        match best {
            None => break StopReason::LocalOptimum,
            Some(_) if limits.max_steps.map_or(false, |max| steps >= max) => {
                break StopReason::IterationLimit;
            }
            Some((n, v)) => {
                trace!(step = steps, score = ?v, "moved to better neighbor");
                current = n;
                current_score = v;
                steps += 1;
            }
        }
    };

    debug!(steps, score = ?current_score, ?stop, "hill climbing finished");
    SearchOutcome {
        state: current,
        score: current_score,
        steps,
        stop,
    }
}
