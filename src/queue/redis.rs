use crate::config::{QueueConfig, RedisConfig};
use crate::error::{GradBridgeError, Result};
use crate::models::TaskMessage;
use crate::queue::{DeadTask, Delivery, TaskBroker};
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Redis-backed reliable queue.
///
/// Three lists derive from the queue name: `pending` (published tasks),
/// `processing` (the at-most-one in-flight delivery) and `dead` (terminal
/// failures). Delivery atomically moves the payload from pending to
/// processing; ack removes it from processing; nack removes it and records a
/// dead-task envelope.
pub struct RedisBroker {
    client: redis::Client,
    consume_conn: Mutex<Option<redis::aio::Connection>>,
    pending_key: String,
    processing_key: String,
    dead_key: String,
    poll_timeout_secs: u64,
    reconnect_delay: Duration,
}

impl RedisBroker {
    pub fn new(redis_config: &RedisConfig, queue_config: &QueueConfig) -> Result<Self> {
        let client = redis::Client::open(redis_config.url.as_str())
            .map_err(|e| GradBridgeError::Config(format!("Failed to create Redis client: {}", e)))?;

        let base = format!("{}:{}", redis_config.key_prefix, queue_config.name);

        Ok(Self {
            client,
            consume_conn: Mutex::new(None),
            pending_key: format!("{}:pending", base),
            processing_key: format!("{}:processing", base),
            dead_key: format!("{}:dead", base),
            poll_timeout_secs: queue_config.poll_timeout_secs,
            reconnect_delay: Duration::from_secs(queue_config.reconnect_delay_secs),
        })
    }

    /// Block until the broker answers a PING, retrying with a fixed delay.
    ///
    /// The worker is a long-lived background process; waiting out a broker
    /// restart beats crashing into a supervisor loop.
    pub async fn wait_until_ready(&self) {
        loop {
            match self.ping().await {
                Ok(()) => {
                    info!("Connected to Redis task broker");
                    return;
                }
                Err(e) => {
                    warn!(
                        "Broker connection failed, retrying in {}s: {}",
                        self.reconnect_delay.as_secs(),
                        e
                    );
                    tokio::time::sleep(self.reconnect_delay).await;
                }
            }
        }
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.get_connection().await?;
        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| GradBridgeError::Redis(format!("Ping failed: {}", e)))?;
        Ok(())
    }

    async fn get_connection(&self) -> Result<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| GradBridgeError::Redis(format!("Failed to connect to Redis: {}", e)))
    }

    /// Remove a payload from the processing list and record it on the dead
    /// list, atomically.
    async fn bury(&self, raw: &str, error: &str) -> Result<()> {
        let dead = DeadTask::new(raw.to_string(), error.to_string());
        let dead_json = serde_json::to_string(&dead)?;

        let mut conn = self.get_connection().await?;
        redis::pipe()
            .atomic()
            .cmd("LREM")
            .arg(&self.processing_key)
            .arg(1)
            .arg(raw)
            .cmd("LPUSH")
            .arg(&self.dead_key)
            .arg(&dead_json)
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e| GradBridgeError::Redis(format!("Failed to nack task: {}", e)))?;

        warn!("Nacked task onto '{}': {}", self.dead_key, error);
        Ok(())
    }
}

#[async_trait]
impl TaskBroker for RedisBroker {
    async fn publish(&self, task: &TaskMessage) -> Result<()> {
        let raw = task.to_wire()?;
        let mut conn = self.get_connection().await?;

        redis::cmd("LPUSH")
            .arg(&self.pending_key)
            .arg(&raw)
            .query_async::<_, i64>(&mut conn)
            .await
            .map_err(|e| GradBridgeError::Redis(format!("Failed to publish task: {}", e)))?;

        debug!("Published task to '{}'", self.pending_key);
        Ok(())
    }

    async fn receive(&self) -> Result<Option<Delivery>> {
        // Dedicated connection: the pop blocks, and the consumer owns it.
        let mut guard = self.consume_conn.lock().await;
        if guard.is_none() {
            let conn = self.client.get_async_connection().await.map_err(|e| {
                GradBridgeError::Redis(format!("Failed to open consume connection: {}", e))
            })?;
            *guard = Some(conn);
        }
        let conn = match guard.as_mut() {
            Some(conn) => conn,
            None => return Ok(None),
        };

        let popped: redis::RedisResult<Option<String>> = redis::cmd("BRPOPLPUSH")
            .arg(&self.pending_key)
            .arg(&self.processing_key)
            .arg(self.poll_timeout_secs)
            .query_async(conn)
            .await;

        let raw = match popped {
            Ok(raw) => raw,
            Err(e) => {
                // Drop the connection so the next poll reconnects.
                *guard = None;
                return Err(GradBridgeError::Redis(format!("Failed to receive task: {}", e)));
            }
        };

        let Some(raw) = raw else {
            return Ok(None);
        };

        match TaskMessage::from_wire(&raw) {
            Ok(task) => Ok(Some(Delivery { task, raw })),
            Err(e) => {
                // An unparseable payload can never succeed; dead-letter it
                // immediately instead of wedging the queue.
                error!("Discarding malformed task payload: {}", e);
                drop(guard);
                self.bury(&raw, &format!("Malformed payload: {}", e)).await?;
                Ok(None)
            }
        }
    }

    async fn ack(&self, delivery: &Delivery) -> Result<()> {
        let mut conn = self.get_connection().await?;

        redis::cmd("LREM")
            .arg(&self.processing_key)
            .arg(1)
            .arg(&delivery.raw)
            .query_async::<_, i64>(&mut conn)
            .await
            .map_err(|e| GradBridgeError::Redis(format!("Failed to ack task: {}", e)))?;

        debug!("Acked task on '{}'", self.processing_key);
        Ok(())
    }

    async fn nack(&self, delivery: &Delivery, error: &str) -> Result<()> {
        self.bury(&delivery.raw, error).await
    }

    async fn recover_inflight(&self) -> Result<usize> {
        let mut conn = self.get_connection().await?;
        let mut recovered = 0;

        // Single consumer: anything on the processing list was stranded by a
        // crash before its ack and is safe to redeliver.
        loop {
            let moved: Option<String> = redis::cmd("RPOPLPUSH")
                .arg(&self.processing_key)
                .arg(&self.pending_key)
                .query_async(&mut conn)
                .await
                .map_err(|e| {
                    GradBridgeError::Redis(format!("Failed to recover in-flight task: {}", e))
                })?;

            if moved.is_none() {
                break;
            }
            recovered += 1;
        }

        if recovered > 0 {
            info!("Recovered {} stranded in-flight task(s)", recovered);
        }
        Ok(recovered)
    }

    async fn dead_tasks(&self, limit: usize) -> Result<Vec<DeadTask>> {
        let mut conn = self.get_connection().await?;

        let entries: Vec<String> = redis::cmd("LRANGE")
            .arg(&self.dead_key)
            .arg(0)
            .arg(limit.saturating_sub(1) as i64)
            .query_async(&mut conn)
            .await
            .map_err(|e| GradBridgeError::Redis(format!("Failed to list dead tasks: {}", e)))?;

        let mut dead = Vec::with_capacity(entries.len());
        for entry in entries {
            match serde_json::from_str::<DeadTask>(&entry) {
                Ok(task) => dead.push(task),
                Err(e) => error!("Failed to deserialize dead task entry: {}", e),
            }
        }
        Ok(dead)
    }
}
