use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use procwatch_supervisor::{RestartOutcome, Supervisor};
use std::sync::Arc;
use tracing::info;

pub const UNHEALTHY: &str = "One or more processes are not healthy";
pub const RESTART_IN_PROGRESS: &str = "Restart already in progress";

pub fn build_router(supervisor: Arc<Supervisor>) -> Router {
    Router::new()
        .route("/health", get(health))
        // GET kept for pollers that cannot send POST
        .route("/restart", get(restart).post(restart))
        .with_state(supervisor)
}

async fn health(State(supervisor): State<Arc<Supervisor>>) -> (StatusCode, &'static str) {
    info!("External health check request received");
    if supervisor.check_health().await {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, UNHEALTHY)
    }
}

async fn restart(State(supervisor): State<Arc<Supervisor>>) -> (StatusCode, &'static str) {
    info!("External restart request received");
    match supervisor.restart().await {
        RestartOutcome::Performed { stopped } => {
            info!(stopped, "Processes restarted");
            (StatusCode::OK, "Processes restarted")
        }
        RestartOutcome::NotNeeded => (
            StatusCode::OK,
            "All processes are healthy, no restart needed",
        ),
        RestartOutcome::Skipped => (StatusCode::SERVICE_UNAVAILABLE, RESTART_IN_PROGRESS),
    }
}
