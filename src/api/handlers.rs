use crate::api::ApiState;
use crate::error::GradBridgeError;
use crate::health::HealthStatus;
use crate::metrics;
use crate::models::TaskKind;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Enqueue response: the task was accepted by the broker, nothing more.
#[derive(Debug, Serialize)]
pub struct EnqueuedResponse {
    pub status: &'static str,
    pub task: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for GradBridgeError {
    fn into_response(self) -> axum::response::Response {
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

/// Queue an ingest run. Publish failure is the only error the caller sees;
/// the pipeline's outcome is asynchronous.
pub async fn enqueue_ingest(State(state): State<ApiState>) -> impl IntoResponse {
    enqueue(&state, TaskKind::Ingest).await
}

/// Queue an analytics recompute.
pub async fn enqueue_recompute(State(state): State<ApiState>) -> impl IntoResponse {
    enqueue(&state, TaskKind::Recompute).await
}

async fn enqueue(state: &ApiState, kind: TaskKind) -> axum::response::Response {
    match state.publisher.publish(kind).await {
        Ok(_) => (
            StatusCode::ACCEPTED,
            Json(EnqueuedResponse {
                status: "queued",
                task: kind.as_str(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to publish '{}' task: {}", kind.as_str(), e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: "publish_failed".to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Component health rollup.
pub async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let system_health = state.health.get_system_health().await;

    let status_code = match system_health.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(system_health))
}

/// Prometheus text exposition.
pub async fn metrics_export() -> impl IntoResponse {
    metrics::export()
}

/// Current dashboard aggregates, computed on demand.
pub async fn analytics(
    State(state): State<ApiState>,
) -> Result<impl IntoResponse, GradBridgeError> {
    let summary = state.analytics.recompute().await?;
    Ok(Json(summary))
}

#[derive(Debug, Deserialize)]
pub struct DeadTasksQuery {
    #[serde(default = "default_dead_limit")]
    pub limit: usize,
}

fn default_dead_limit() -> usize {
    50
}

/// Terminally failed tasks, newest first, for operator inspection.
pub async fn dead_tasks(
    State(state): State<ApiState>,
    Query(query): Query<DeadTasksQuery>,
) -> Result<impl IntoResponse, GradBridgeError> {
    let dead = state.broker.dead_tasks(query.limit).await?;
    Ok(Json(dead))
}
