//! Durable at-least-once task queue.
//!
//! Task lifecycle: `published -> delivered -> {acked | nacked}`. The broker
//! hands the single consumer at most one unacknowledged task at a time, so
//! pipeline executions are serialized by construction. A nack never
//! requeues: the failed delivery is recorded on the dead-task list for an
//! operator to inspect and re-trigger.

mod memory;
mod redis;

pub use memory::MemoryBroker;
pub use redis::RedisBroker;

use crate::error::Result;
use crate::models::{TaskKind, TaskMessage};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// One delivered task. `raw` is the exact wire payload; acking and nacking
/// identify the delivery by it.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub task: TaskMessage,
    pub raw: String,
}

/// A task whose processing failed terminally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadTask {
    pub id: String,
    pub raw_task: String,
    pub error: String,
    pub failed_at: DateTime<Utc>,
}

impl DeadTask {
    pub fn new(raw_task: String, error: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            raw_task,
            error,
            failed_at: Utc::now(),
        }
    }
}

#[async_trait]
pub trait TaskBroker: Send + Sync {
    /// Publish a task. Success means the broker accepted it, not that it was
    /// processed.
    async fn publish(&self, task: &TaskMessage) -> Result<()>;

    /// Receive the next task, or `None` when nothing is available within the
    /// poll window. Never yields a second delivery while one is outstanding.
    async fn receive(&self) -> Result<Option<Delivery>>;

    /// Acknowledge successful processing; the task is gone for good.
    async fn ack(&self, delivery: &Delivery) -> Result<()>;

    /// Record terminal failure. The task is not requeued.
    async fn nack(&self, delivery: &Delivery, error: &str) -> Result<()>;

    /// Return deliveries stranded in-flight by a crash to the pending queue.
    /// Safe under the single-consumer assumption.
    async fn recover_inflight(&self) -> Result<usize>;

    /// Most recent dead tasks, newest first.
    async fn dead_tasks(&self, limit: usize) -> Result<Vec<DeadTask>>;
}

/// Producer-side handle used by the API: builds the envelope and publishes.
pub struct TaskPublisher {
    broker: Arc<dyn TaskBroker>,
}

impl TaskPublisher {
    pub fn new(broker: Arc<dyn TaskBroker>) -> Self {
        Self { broker }
    }

    pub async fn publish(&self, kind: TaskKind) -> Result<TaskMessage> {
        let task = TaskMessage::new(kind);
        self.broker.publish(&task).await?;
        info!("Published '{}' task", kind.as_str());
        Ok(task)
    }
}
