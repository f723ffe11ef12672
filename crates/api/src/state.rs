use std::sync::Arc;

use jobs::InMemJobs;
use solver_milp::MilpSolver;
use store_mem::MemStore;

pub type AppJobs = InMemJobs<MemStore, MilpSolver, MemStore>;

#[derive(Clone)]
pub struct AppState {
    pub jobs: Arc<AppJobs>,
}

impl AppState {
    /// Seeds the demo dataset store-mem ships so the API has something to
    /// solve out of the box. Real deployments would wire a database-backed
    /// `DatasetLoader`/`SchedulePersister` pair here instead.
    pub fn new_default() -> Self {
        let store = Arc::new(MemStore::new());
        store
            .seed(store_mem::fixtures::minimal_bundle())
            .expect("bundled demo dataset is well-formed");

        let jobs = InMemJobs::new(store.clone(), MilpSolver::new(), store);
        Self { jobs: Arc::new(jobs) }
    }
}
