use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Health status of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Health check result for a component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub status: HealthStatus,
    pub message: Option<String>,
    pub last_check: chrono::DateTime<chrono::Utc>,
}

impl HealthCheckResult {
    pub fn healthy() -> Self {
        Self {
            status: HealthStatus::Healthy,
            message: None,
            last_check: chrono::Utc::now(),
        }
    }

    pub fn unhealthy(message: String) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            message: Some(message),
            last_check: chrono::Utc::now(),
        }
    }
}

/// Overall system health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemHealth {
    pub status: HealthStatus,
    pub components: HashMap<String, HealthCheckResult>,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Trait for components that can report health
#[async_trait::async_trait]
pub trait HealthCheck: Send + Sync {
    async fn check_health(&self) -> HealthCheckResult;

    fn component_name(&self) -> &'static str;
}

/// Health check registry
pub struct HealthRegistry {
    components: Arc<RwLock<HashMap<String, Box<dyn HealthCheck>>>>,
    start_time: std::time::Instant,
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self {
            components: Arc::new(RwLock::new(HashMap::new())),
            start_time: std::time::Instant::now(),
        }
    }

    pub async fn register(&self, component: Box<dyn HealthCheck>) {
        let name = component.component_name().to_string();
        let mut components = self.components.write().await;
        components.insert(name, component);
    }

    pub async fn get_system_health(&self) -> SystemHealth {
        let components = self.components.read().await;
        let mut results = HashMap::new();
        let mut overall = HealthStatus::Healthy;

        for (name, component) in components.iter() {
            let result = component.check_health().await;

            match result.status {
                HealthStatus::Unhealthy => overall = HealthStatus::Unhealthy,
                HealthStatus::Degraded => {
                    if overall == HealthStatus::Healthy {
                        overall = HealthStatus::Degraded;
                    }
                }
                HealthStatus::Healthy => {}
            }

            results.insert(name.clone(), result);
        }

        SystemHealth {
            status: overall,
            components: results,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }
}

impl Default for HealthRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// PostgreSQL health check
pub struct PostgresHealthCheck {
    connector: crate::storage::PostgresConnector,
}

impl PostgresHealthCheck {
    pub fn new(connector: crate::storage::PostgresConnector) -> Self {
        Self { connector }
    }
}

#[async_trait::async_trait]
impl HealthCheck for PostgresHealthCheck {
    async fn check_health(&self) -> HealthCheckResult {
        match self.connector.get_client().await {
            Ok(client) => match client.simple_query("SELECT 1").await {
                Ok(_) => HealthCheckResult::healthy(),
                Err(e) => HealthCheckResult::unhealthy(format!("Query failed: {}", e)),
            },
            Err(e) => HealthCheckResult::unhealthy(format!("Failed to get client: {}", e)),
        }
    }

    fn component_name(&self) -> &'static str {
        "postgresql"
    }
}

/// Redis health check
pub struct RedisHealthCheck {
    url: String,
}

impl RedisHealthCheck {
    pub fn new(url: String) -> Self {
        Self { url }
    }
}

#[async_trait::async_trait]
impl HealthCheck for RedisHealthCheck {
    async fn check_health(&self) -> HealthCheckResult {
        let client = match redis::Client::open(self.url.as_str()) {
            Ok(client) => client,
            Err(e) => {
                return HealthCheckResult::unhealthy(format!("Failed to create client: {}", e))
            }
        };

        match client.get_multiplexed_async_connection().await {
            Ok(mut conn) => {
                let ping: Result<String, redis::RedisError> =
                    redis::cmd("PING").query_async(&mut conn).await;
                match ping {
                    Ok(response) if response == "PONG" => HealthCheckResult::healthy(),
                    Ok(_) => HealthCheckResult::unhealthy("Unexpected PING response".to_string()),
                    Err(e) => HealthCheckResult::unhealthy(format!("PING failed: {}", e)),
                }
            }
            Err(e) => HealthCheckResult::unhealthy(format!("Connection failed: {}", e)),
        }
    }

    fn component_name(&self) -> &'static str {
        "redis"
    }
}
