mod state;
mod telemetry;
pub mod routes {
    pub mod health;
    pub mod jobs;
    pub mod solve;
}

use axum::{
    routing::{get, post},
    Router,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health::health,
        routes::solve::solve_dataset,
        routes::jobs::status,
        routes::jobs::result,
    ),
    components(schemas(
        types::Dataset, types::Course, types::Class, types::Lecturer, types::Room,
        types::Timeslot, types::Availability, types::Preference, types::Enrollment,
        types::CourseEquipmentRequirement, types::PenaltyWeight, types::DatasetBundle,
        types::ScheduleEntry, types::Assignment, types::SolverStatus, types::SolutionStatus,
        types::BwmIlpResult, types::SessionType, types::RoomType, types::AvailabilityStatus,
        types::DayOfWeek, types::SoftConstraint,
        jobs::JobId, jobs::JobStatus,
        routes::solve::JobCreated,
    )),
    tags(
        (name = "timetable", description = "BWM-ILP university timetabling API")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let app_state = state::AppState::new_default();

    let app = Router::new()
        .route("/v1/health", get(routes::health::health))
        .route("/v1/datasets/:id/solve", post(routes::solve::solve_dataset))
        .route("/v1/jobs/:id", get(routes::jobs::status))
        .route("/v1/jobs/:id/result", get(routes::jobs::result))
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(telemetry::stack())
        .with_state(app_state);

    let port = std::env::var("TIMETABLE__SERVER__PORT").unwrap_or_else(|_| "8080".into());
    let addr: std::net::SocketAddr = format!("0.0.0.0:{}", port)
        .parse()
        .expect("invalid listen addr");
    tracing::info!(%addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
