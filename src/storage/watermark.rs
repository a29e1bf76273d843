use crate::error::{GradBridgeError, Result};
use crate::storage::PostgresConnector;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Durable high-water mark per source.
///
/// Read once at the start of a run to bound the crawl; written only after
/// the run's records are durably persisted. The stored value never
/// decreases.
#[async_trait]
pub trait WatermarkStore: Send + Sync {
    async fn get(&self, source: &str) -> Result<Option<i64>>;

    /// Upsert; keeps the maximum of the existing and new values.
    async fn set(&self, source: &str, last_seen: i64) -> Result<()>;
}

/// In-memory watermark store (tests and dry runs).
pub struct MemoryWatermarkStore {
    marks: Arc<RwLock<HashMap<String, i64>>>,
}

impl MemoryWatermarkStore {
    pub fn new() -> Self {
        Self {
            marks: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for MemoryWatermarkStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WatermarkStore for MemoryWatermarkStore {
    async fn get(&self, source: &str) -> Result<Option<i64>> {
        let marks = self.marks.read().await;
        Ok(marks.get(source).copied())
    }

    async fn set(&self, source: &str, last_seen: i64) -> Result<()> {
        let mut marks = self.marks.write().await;
        let entry = marks.entry(source.to_string()).or_insert(last_seen);
        if last_seen > *entry {
            *entry = last_seen;
        }
        debug!("Watermark for '{}' now {}", source, *entry);
        Ok(())
    }
}

/// PostgreSQL-backed watermark store.
pub struct PostgresWatermarkStore {
    connector: PostgresConnector,
}

impl PostgresWatermarkStore {
    pub fn new(connector: PostgresConnector) -> Self {
        Self { connector }
    }
}

#[async_trait]
impl WatermarkStore for PostgresWatermarkStore {
    async fn get(&self, source: &str) -> Result<Option<i64>> {
        let client = self.connector.get_client().await?;
        let row = client
            .query_opt(
                "SELECT last_seen FROM ingestion_watermarks WHERE source = $1",
                &[&source],
            )
            .await
            .map_err(|e| GradBridgeError::Database(format!("Failed to read watermark: {}", e)))?;

        Ok(row.map(|r| r.get::<_, i64>(0)))
    }

    async fn set(&self, source: &str, last_seen: i64) -> Result<()> {
        let client = self.connector.get_client().await?;
        client
            .execute(
                "INSERT INTO ingestion_watermarks (source, last_seen, updated_at) \
                 VALUES ($1, $2, now()) \
                 ON CONFLICT (source) DO UPDATE \
                 SET last_seen = GREATEST(ingestion_watermarks.last_seen, EXCLUDED.last_seen), \
                     updated_at = now()",
                &[&source, &last_seen],
            )
            .await
            .map_err(|e| GradBridgeError::Database(format!("Failed to update watermark: {}", e)))?;

        debug!("Watermark for '{}' advanced to {}", source, last_seen);
        Ok(())
    }
}
