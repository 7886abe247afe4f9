//! Readiness probe backed by the configured store.

use crate::state::AppState;
use axum::{extract::State, response::Response};
use axum_helpers::server::{HealthCheckFuture, run_health_checks};

/// Responds 200 when the store answers a ping, 503 otherwise.
pub async fn ready_handler(State(state): State<AppState>) -> Response {
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![(
        "store",
        Box::pin(async {
            state
                .context
                .ping()
                .await
                .map_err(|e| format!("Store ping failed: {}", e))
        }),
    )];

    run_health_checks(checks).await
}
