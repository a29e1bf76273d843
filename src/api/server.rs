use crate::api::{handlers, ApiState};
use crate::config::ApiConfig;
use crate::error::{GradBridgeError, Result};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tracing::info;

pub struct ApiServer {
    config: ApiConfig,
    state: ApiState,
}

impl ApiServer {
    pub fn new(config: ApiConfig, state: ApiState) -> Self {
        Self { config, state }
    }

    pub async fn start(self) -> Result<()> {
        let mut router = Router::new()
            .route("/tasks/ingest", post(handlers::enqueue_ingest))
            .route("/tasks/recompute", post(handlers::enqueue_recompute))
            .route("/tasks/dead", get(handlers::dead_tasks))
            .route("/analytics", get(handlers::analytics))
            .route("/health", get(handlers::health))
            .route("/metrics", get(handlers::metrics_export))
            .with_state(self.state);

        if self.config.cors.enabled {
            router = router.layer(CorsLayer::permissive());
        }

        let addr = format!("{}:{}", self.config.host, self.config.port);
        info!("API server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| GradBridgeError::Config(format!("Failed to bind {}: {}", addr, e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| GradBridgeError::Pipeline(format!("API server failed: {}", e)))?;

        Ok(())
    }
}
