use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use sched_core::{BwmIlpResult, CoreError, DatasetLoader, SchedulePersister, Solver};
use tracing::error;
use types::{DatasetId, ScheduleEntry};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, ToSchema)]
pub struct JobId(pub String);

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, ToSchema)]
#[serde(tag = "status")]
pub enum JobStatus {
    Queued,
    Running,
    Solved { result: BwmIlpResult },
    Infeasible,
    Failed { message: String },
}

/// Queues `run_bwm_ilp` runs against datasets loaded through `L` and
/// persisted through `P`. The solve itself runs on `spawn_blocking` rather
/// than as a bare async task, since `run_bwm_ilp` is synchronous CPU-bound
/// work and would otherwise stall the executor.
pub struct InMemJobs<L: DatasetLoader, S: Solver, P: SchedulePersister> {
    inner: Arc<RwLock<HashMap<String, JobStatus>>>,
    loader: Arc<L>,
    solver: Arc<S>,
    persister: Arc<P>,
}

impl<L: DatasetLoader, S: Solver, P: SchedulePersister> Clone for InMemJobs<L, S, P> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            loader: self.loader.clone(),
            solver: self.solver.clone(),
            persister: self.persister.clone(),
        }
    }
}

impl<L: DatasetLoader, S: Solver, P: SchedulePersister> InMemJobs<L, S, P> {
    /// Takes the loader and persister as `Arc`s so callers can share one
    /// backing store as both (the common case with an in-memory or
    /// database-backed store), instead of forcing two disconnected copies.
    pub fn new(loader: Arc<L>, solver: S, persister: Arc<P>) -> Self {
        Self {
            inner: Default::default(),
            loader,
            solver: Arc::new(solver),
            persister,
        }
    }

    pub fn enqueue(&self, dataset_id: DatasetId) -> JobId {
        let id = Uuid::new_v4().to_string();
        self.inner.write().insert(id.clone(), JobStatus::Queued);

        let map = self.inner.clone();
        let loader = self.loader.clone();
        let solver = self.solver.clone();
        let persister = self.persister.clone();
        let id_for_task = id.clone();

        tokio::spawn(async move {
            map.write().insert(id_for_task.clone(), JobStatus::Running);

            let status = match loader.load(dataset_id).await {
                Ok(bundle) => run_and_persist(bundle, solver, persister).await,
                Err(e) => {
                    error!(?e, "job failed to load dataset");
                    JobStatus::Failed { message: e.to_string() }
                }
            };
            map.write().insert(id_for_task, status);
        });

        JobId(id)
    }

    pub fn get(&self, id: &str) -> Option<JobStatus> {
        self.inner.read().get(id).cloned()
    }
}

async fn run_and_persist<S: Solver, P: SchedulePersister>(
    bundle: types::DatasetBundle,
    solver: Arc<S>,
    persister: Arc<P>,
) -> JobStatus {
    let dataset_id = bundle.dataset.id;
    let solve_result = tokio::task::spawn_blocking(move || {
        sched_core::run_bwm_ilp(&bundle, solver.as_ref()).map(|result| (bundle, result))
    })
    .await;

    let (bundle, result) = match solve_result {
        Ok(Ok(pair)) => pair,
        Ok(Err(CoreError::NoFeasibleSchedule)) => return JobStatus::Infeasible,
        Ok(Err(e)) => {
            error!(?e, "job failed during solve");
            return JobStatus::Failed { message: e.to_string() };
        }
        Err(join_err) => {
            error!(?join_err, "job panicked during solve");
            return JobStatus::Failed {
                message: "solver task panicked".into(),
            };
        }
    };

    let entries = schedule_entries(&bundle, &result);
    if let Err(e) = persister.replace_schedule(dataset_id, &entries).await {
        error!(?e, "job failed to persist schedule");
        return JobStatus::Failed { message: e.to_string() };
    }

    JobStatus::Solved { result }
}

fn schedule_entries(bundle: &types::DatasetBundle, result: &BwmIlpResult) -> Vec<ScheduleEntry> {
    let lecturer_id_by_code: HashMap<&str, types::LecturerId> = bundle
        .lecturers
        .iter()
        .map(|l| (l.code.0.as_str(), l.id))
        .collect();

    result
        .assignments
        .iter()
        .filter_map(|a| {
            let lecturer_id = *lecturer_id_by_code.get(a.lecturer_code.0.as_str())?;
            Some(ScheduleEntry {
                dataset_id: result.dataset_id,
                class_id: a.class_id,
                lecturer_id,
                room_id: a.room_id,
                timeslot_id: a.timeslot_id,
                status: "simulated".into(),
                penalty: a.penalty,
            })
        })
        .collect()
}
