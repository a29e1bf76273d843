use crate::config::DatabaseConfig;
use crate::error::{GradBridgeError, Result};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod, Runtime};
use tokio_postgres::{Config as PgConfig, NoTls};
use tracing::info;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS applicants (
    p_id BIGSERIAL PRIMARY KEY,
    program TEXT,
    comments TEXT,
    date_added TEXT,
    url TEXT,
    status TEXT,
    term TEXT,
    us_or_international TEXT,
    gpa DOUBLE PRECISION,
    gre DOUBLE PRECISION,
    gre_v DOUBLE PRECISION,
    gre_aw DOUBLE PRECISION,
    degree TEXT,
    llm_generated_program TEXT,
    llm_generated_university TEXT
);

CREATE UNIQUE INDEX IF NOT EXISTS applicants_url_key ON applicants (url);

CREATE TABLE IF NOT EXISTS ingestion_watermarks (
    source TEXT PRIMARY KEY,
    last_seen BIGINT NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
"#;

/// Pooled PostgreSQL access shared by the stores.
#[derive(Clone)]
pub struct PostgresConnector {
    pool: Pool,
}

impl PostgresConnector {
    pub fn new(config: &DatabaseConfig) -> Result<Self> {
        let mut pg_config = config
            .url
            .parse::<PgConfig>()
            .map_err(|e| GradBridgeError::Config(format!("Invalid database URL: {}", e)))?;
        pg_config.application_name("gradbridge");

        let manager_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };
        let manager = Manager::from_config(pg_config, NoTls, manager_config);
        let pool = Pool::builder(manager)
            .max_size(config.pool.max_size)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| GradBridgeError::Database(format!("Failed to create pool: {}", e)))?;

        Ok(Self { pool })
    }

    /// Verify connectivity with a trivial query.
    pub async fn connect(&self) -> Result<()> {
        info!("Connecting to PostgreSQL...");
        let client = self.get_client().await?;
        client
            .simple_query("SELECT 1")
            .await
            .map_err(|e| GradBridgeError::Database(format!("Connection test failed: {}", e)))?;
        info!("Successfully connected to PostgreSQL");
        Ok(())
    }

    /// Create the applicants and watermark tables if they do not exist.
    pub async fn ensure_schema(&self) -> Result<()> {
        let client = self.get_client().await?;
        client
            .batch_execute(SCHEMA)
            .await
            .map_err(|e| GradBridgeError::Database(format!("Failed to ensure schema: {}", e)))?;
        Ok(())
    }

    pub async fn get_client(&self) -> Result<deadpool_postgres::Object> {
        self.pool.get().await.map_err(|e| {
            GradBridgeError::Database(format!("Failed to get connection from pool: {}", e))
        })
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }
}
