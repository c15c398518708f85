use serde::Serialize;
use types::CostWeights;

use crate::normalize::Project;

/// Floor for the cost of one hard violation.
pub const IMPOSSIBLE_COST: u64 = 10_000_000;

/// Schedule quality. Never positive; 0 means no conflicts at all.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Score(pub i64);

/// Cost of a single hard violation for one problem. Always above the soft
/// cost of any state of that problem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ImpossibleCost(u64);

impl ImpossibleCost {
    pub fn above(soft_ceiling: u64) -> Self {
        Self(IMPOSSIBLE_COST.max(soft_ceiling.saturating_add(1)))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CostBreakdown {
    pub responsible_collisions: u64,
    pub shared_voters: u64,
    pub same_difficulty_pairs: u64,
    pub same_theme_pairs: u64,
    /// Sum of squared project counts over occupied slots.
    pub slot_population: u64,
    /// Votes of projects sharing a slot with a more voted one.
    pub most_voted: u64,
    pub hard: u64,
    pub soft: u64,
    pub score: Score,
}

#[derive(Clone, Copy, Debug, Default)]
struct PairCost {
    collision: bool,
    shared_voters: u32,
    same_level: bool,
    same_theme: bool,
}

/// Pairwise facts are fixed per problem, so they are computed once.
#[derive(Clone, Debug)]
pub(crate) struct Scorer {
    n: usize,
    pairs: Vec<PairCost>,
    votes: Vec<u64>,
    weights: CostWeights,
    impossible: ImpossibleCost,
}

impl Scorer {
    pub(crate) fn new(projects: &[Project], weights: &CostWeights) -> Self {
        let n = projects.len();
        let mut pairs = vec![PairCost::default(); n * n];
        for (i, a) in projects.iter().enumerate() {
            for (j, b) in projects.iter().enumerate().skip(i + 1) {
                let collision = a.responsables.intersection(&b.responsables).next().is_some();
                let shared = if collision {
                    0
                } else {
                    a.votes.intersection(&b.votes).count() as u32
                };
                let same_theme = match (&a.theme, &b.theme) {
                    (Some(x), Some(y)) => x == y,
                    _ => false,
                };
                let cost = PairCost {
                    collision,
                    shared_voters: shared,
                    same_level: a.difficult_level == b.difficult_level,
                    same_theme,
                };
                pairs[i * n + j] = cost;
                pairs[j * n + i] = cost;
            }
        }

        let mut scorer = Self {
            n,
            pairs,
            votes: projects.iter().map(|p| p.votes.len() as u64).collect(),
            weights: weights.clone(),
            impossible: ImpossibleCost::above(0),
        };
        // Every pair term and both slot terms peak when all projects share one slot.
        let ceiling = scorer.breakdown(&vec![0; n], 1).soft;
        scorer.impossible = ImpossibleCost::above(ceiling);
        scorer
    }

    pub(crate) fn impossible(&self) -> ImpossibleCost {
        self.impossible
    }

    pub(crate) fn hard_collision(&self, a: usize, b: usize) -> bool {
        self.pairs[a * self.n + b].collision
    }

    /// `slot_of[i]` is the slot index of project `i`.
    pub(crate) fn breakdown(&self, slot_of: &[usize], slot_count: usize) -> CostBreakdown {
        let mut groups: Vec<Vec<usize>> = vec![Vec::new(); slot_count];
        for (project, &slot) in slot_of.iter().enumerate() {
            groups[slot].push(project);
        }

        let mut out = CostBreakdown::default();
        for group in groups.iter().filter(|g| !g.is_empty()) {
            for (k, &a) in group.iter().enumerate() {
                for &b in &group[k + 1..] {
                    let pc = self.pairs[a * self.n + b];
                    if pc.collision {
                        out.responsible_collisions += 1;
                    } else {
                        out.shared_voters += pc.shared_voters as u64;
                    }
                    out.same_difficulty_pairs += pc.same_level as u64;
                    out.same_theme_pairs += pc.same_theme as u64;
                }
            }

            let k = group.len() as u64;
            out.slot_population += k * k;

            let total: u64 = group.iter().map(|&p| self.votes[p]).sum();
            let top = group.iter().map(|&p| self.votes[p]).max().unwrap_or(0);
            out.most_voted += total - top;
        }

        let w = &self.weights;
        out.hard = out.responsible_collisions;
        out.soft = out.shared_voters * w.voter_overlap as u64
            + out.same_difficulty_pairs * w.same_difficulty as u64
            + out.same_theme_pairs * w.same_theme as u64
            + out.slot_population * w.slot_population as u64
            + out.most_voted * w.most_voted as u64;

        let total = out
            .hard
            .saturating_mul(self.impossible.get())
            .saturating_add(out.soft);
        out.score = Score(-(total.min(i64::MAX as u64) as i64));
        out
    }
}
