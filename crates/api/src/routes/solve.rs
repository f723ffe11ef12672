use axum::extract::{Path, State};
use axum::Json;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(serde::Serialize, ToSchema)]
pub struct JobCreated {
    pub job_id: String,
    pub status: &'static str,
}

#[utoipa::path(
    post,
    path = "/v1/datasets/{id}/solve",
    params(("id" = i64, Path, description = "Dataset ID")),
    responses((status = 200, description = "Job enqueued", body = JobCreated))
)]
pub async fn solve_dataset(State(state): State<AppState>, Path(id): Path<i64>) -> Json<JobCreated> {
    let job_id = state.jobs.enqueue(types::DatasetId(id));
    Json(JobCreated {
        job_id: job_id.0,
        status: "queued",
    })
}
