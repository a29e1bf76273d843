use serde::{Deserialize, Serialize};

mod api;
mod database;
mod enrichment;
mod loader;
mod queue;
mod redis;
mod source;

pub use api::*;
pub use database::*;
pub use enrichment::*;
pub use loader::*;
pub use queue::*;
pub use redis::*;
pub use source::*;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Application metadata
    #[serde(default)]
    pub app: AppConfig,

    /// PostgreSQL store configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Redis broker configuration
    #[serde(default)]
    pub redis: RedisConfig,

    /// Survey source configuration
    #[serde(default)]
    pub source: GradCafeConfig,

    /// Enrichment service configuration
    #[serde(default)]
    pub enrichment: EnrichmentConfig,

    /// Task queue configuration
    #[serde(default)]
    pub queue: QueueConfig,

    /// API server configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Analytics configuration
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app: AppConfig::default(),
            database: DatabaseConfig::default(),
            redis: RedisConfig::default(),
            source: GradCafeConfig::default(),
            enrichment: EnrichmentConfig::default(),
            queue: QueueConfig::default(),
            api: ApiConfig::default(),
            analytics: AnalyticsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_instance_id")]
    pub instance_id: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            instance_id: default_instance_id(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalyticsConfig {
    /// Term the dashboard aggregates focus on.
    #[serde(default = "default_term")]
    pub term: String,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            term: default_term(),
        }
    }
}

fn default_name() -> String {
    "gradbridge".to_string()
}

fn default_instance_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn default_term() -> String {
    "Fall 2025".to_string()
}
