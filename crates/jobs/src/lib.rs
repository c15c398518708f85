use parking_lot::RwLock;
use sched_core::{ScheduleResult, SolveEnvelope, Solver};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};
use uuid::Uuid;

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct JobId(pub String);

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(tag = "status")]
pub enum JobStatus {
    Queued,
    Running,
    Solved { result: ScheduleResult },
    TimedOut { limit_sec: u64 },
    Failed { message: String },
}

impl JobStatus {
    pub fn is_finished(&self) -> bool {
        !matches!(self, JobStatus::Queued | JobStatus::Running)
    }
}

#[derive(Clone)]
pub struct InMemJobs<S: Solver> {
    inner: Arc<RwLock<HashMap<String, JobStatus>>>,
    solver: Arc<S>,
}

impl<S: Solver> InMemJobs<S> {
    pub fn new(solver: S) -> Self {
        Self {
            inner: Default::default(),
            solver: Arc::new(solver),
        }
    }

    /// Must be called from within a tokio runtime.
    pub fn enqueue(&self, env: SolveEnvelope) -> JobId {
        let id = Uuid::new_v4().to_string();
        self.inner.write().insert(id.clone(), JobStatus::Queued);

        let map = self.inner.clone();
        let solver = self.solver.clone();
        let id_for_task = id.clone();
        let limit = env.params.time_limit_sec;

        tokio::spawn(async move {
            {
                let mut w = map.write();
                w.insert(id_for_task.clone(), JobStatus::Running);
            }
            let cancel = Arc::new(AtomicBool::new(false));
            let run = solver.solve(env, cancel.clone());

            let outcome = match limit {
                Some(secs) => match tokio::time::timeout(Duration::from_secs(secs), run).await {
                    Ok(res) => res.map_err(Some),
                    Err(_) => {
                        cancel.store(true, Ordering::Relaxed);
                        Err(None)
                    }
                },
                None => run.await.map_err(Some),
            };

            let status = match outcome {
                Ok(result) => JobStatus::Solved { result },
                Err(Some(e)) => {
                    error!(?e, job = %id_for_task, "job failed");
                    JobStatus::Failed {
                        message: e.to_string(),
                    }
                }
                Err(None) => {
                    let limit_sec = limit.unwrap_or_default();
                    warn!(job = %id_for_task, limit_sec, "job timed out");
                    JobStatus::TimedOut { limit_sec }
                }
            };
            map.write().insert(id_for_task, status);
        });

        JobId(id)
    }

    pub fn get(&self, id: &str) -> Option<JobStatus> {
        self.inner.read().get(id).cloned()
    }

    /// Drops a finished job and hands back its final status. Queued and
    /// running jobs stay put and yield `None`.
    pub fn remove(&self, id: &str) -> Option<JobStatus> {
        let mut w = self.inner.write();
        if !w.get(id)?.is_finished() {
            return None;
        }
        w.remove(id)
    }

    /// Drops every finished job; returns how many were evicted.
    pub fn purge_finished(&self) -> usize {
        let mut w = self.inner.write();
        let before = w.len();
        w.retain(|_, status| !status.is_finished());
        let purged = before - w.len();
        if purged > 0 {
            debug!(purged, "evicted finished jobs");
        }
        purged
    }
}
