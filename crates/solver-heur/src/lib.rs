use async_trait::async_trait;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sched_core::{
    hill_climbing_with, ConfigError, ScheduleProblem, ScheduleResult, SearchLimits, SolveEnvelope,
    Solver, StateError,
};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum SolveError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("base schedule rejected: {0}")]
    Base(#[from] StateError),
}

pub struct HeurSolver;
impl HeurSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HeurSolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Solver for HeurSolver {
    async fn solve(
        &self,
        env: SolveEnvelope,
        cancel: Arc<AtomicBool>,
    ) -> anyhow::Result<ScheduleResult> {
        let res = tokio::task::spawn_blocking(move || optimize(&env, Some(cancel))).await??;
        Ok(res)
    }
}

/// Single hill-climbing run. Starts from `env.base` when given, otherwise
/// from a random state seeded with `env.params.seed`.
pub fn optimize(
    env: &SolveEnvelope,
    cancel: Option<Arc<AtomicBool>>,
) -> Result<ScheduleResult, SolveError> {
    let problem = ScheduleProblem::from_snapshot(&env.snapshot, &env.policy)?;
    let data = problem.data();
    info!(
        projects = data.projects().len(),
        slots = data.slots().len(),
        participants = data.total_participants(),
        "scheduling projects"
    );

    let (initial, start) = if env.base.is_empty() {
        let mut rng = ChaCha8Rng::seed_from_u64(env.params.seed);
        (problem.generate_random_state(&mut rng), "random")
    } else {
        (problem.state_from_assignments(&env.base)?, "base")
    };
    let initial_score = problem.value(&initial);

    let limits = SearchLimits {
        max_steps: env.params.max_iterations,
        cancel,
    };
    let out = hill_climbing_with(&problem, initial, &limits);
    let breakdown = problem.breakdown(&out.state);
    let conflicts: Vec<serde_json::Value> = problem
        .conflicts(&out.state)
        .into_iter()
        .map(|(a, b)| serde_json::json!([a, b]))
        .collect();

    let status = if breakdown.hard == 0 { "solved" } else { "conflicting" };
    info!(status, score = out.score.0, steps = out.steps, "schedule ready");

    Ok(ScheduleResult {
        status: status.into(),
        score: out.score.0,
        hard_violations: breakdown.hard,
        assignments: problem.assignments(&out.state),
        stats: serde_json::json!({
            "method": "hill_climbing",
            "start": start,
            "seed": env.params.seed,
            "steps": out.steps,
            "stop": out.stop,
            "initial_score": initial_score,
            "projects": data.projects().len(),
            "slots": data.slots().len(),
            "participants": data.total_participants(),
            "impossible_cost": problem.impossible_cost(),
            "breakdown": breakdown,
            "conflicts": conflicts,
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sched_core::{Assignment, ProjectSpec, SlotCode, Snapshot, SolveParams, Username};

    fn spec(resp: &[&str], votes: &[&str], level: u8, theme: &str) -> ProjectSpec {
        ProjectSpec {
            responsables: resp.iter().map(|&u| Username::from(u)).collect(),
            votes: votes.iter().map(|&u| Username::from(u)).collect(),
            difficult_level: level,
            theme: Some(theme.into()),
            priority_slots: vec![],
        }
    }

    fn envelope(seed: u64) -> SolveEnvelope {
        let mut snap = Snapshot {
            available_slots: ["A1", "A2", "B1", "B2"].iter().map(|&s| SlotCode::from(s)).collect(),
            ..Default::default()
        };
        snap.projects.insert("proyecto1".into(), spec(&["pepe"], &["juan", "maria"], 1, "django"));
        snap.projects.insert("proyecto2".into(), spec(&["pepe"], &["juan"], 1, "django"));
        snap.projects.insert("proyecto3".into(), spec(&["ana"], &["carlos", "maria"], 2, "flask"));
        snap.projects.insert("proyecto4".into(), spec(&["ana"], &["lucia"], 3, "rust"));
        SolveEnvelope {
            snapshot: snap,
            params: SolveParams {
                seed,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn separates_shared_responsables() {
        for seed in 0..10 {
            let res = optimize(&envelope(seed), None).unwrap();
            assert_eq!(res.status, "solved");
            assert_eq!(res.hard_violations, 0);
            assert_eq!(res.assignments.len(), 4);
            assert_eq!(res.stats["stop"], "local_optimum");
            assert!(res.score >= res.stats["initial_score"].as_i64().unwrap());
        }
    }

    #[test]
    fn same_seed_same_schedule() {
        let a = optimize(&envelope(11), None).unwrap();
        let b = optimize(&envelope(11), None).unwrap();
        assert_eq!(a.assignments, b.assignments);
        assert_eq!(a.score, b.score);
    }

    #[test]
    fn starts_from_base_schedule() {
        let mut env = envelope(0);
        env.base = vec![
            Assignment::new("proyecto1", "A1"),
            Assignment::new("proyecto2", "A1"),
            Assignment::new("proyecto3", "B1"),
            Assignment::new("proyecto4", "B2"),
        ];
        env.params.max_iterations = Some(0);
        let res = optimize(&env, None).unwrap();
        assert_eq!(res.assignments, env.base);
        assert_eq!(res.status, "conflicting");
        assert_eq!(res.stats["start"], "base");
        assert_eq!(res.stats["stop"], "iteration_limit");
        assert_eq!(res.stats["conflicts"][0][0], "proyecto1");
    }

    #[test]
    fn rejects_incomplete_base() {
        let mut env = envelope(0);
        env.base = vec![Assignment::new("proyecto1", "A1")];
        let err = optimize(&env, None).unwrap_err();
        assert!(matches!(err, SolveError::Base(StateError::MissingProject(_))));
    }

    #[test]
    fn surfaces_config_errors() {
        let mut env = envelope(0);
        env.snapshot.available_slots.clear();
        let err = optimize(&env, None).unwrap_err();
        assert!(matches!(err, SolveError::Config(ConfigError::NoSlots { projects: 4 })));
    }

    #[tokio::test]
    async fn solver_trait_runs_on_blocking_pool() {
        let res = HeurSolver::new()
            .solve(envelope(3), Arc::new(AtomicBool::new(false)))
            .await
            .unwrap();
        assert_eq!(res.status, "solved");
    }
}
