use crate::error::{GradBridgeError, Result};
use crate::models::TaskMessage;
use crate::queue::{DeadTask, Delivery, TaskBroker};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

/// In-memory broker for tests and single-process runs.
///
/// Mirrors the Redis broker's semantics exactly: one delivery in flight at a
/// time, nack goes to the dead list, recovery puts a stranded delivery back
/// at the head of the queue.
pub struct MemoryBroker {
    pending: Arc<Mutex<VecDeque<String>>>,
    in_flight: Arc<Mutex<Option<String>>>,
    dead: Arc<Mutex<Vec<DeadTask>>>,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self {
            pending: Arc::new(Mutex::new(VecDeque::new())),
            in_flight: Arc::new(Mutex::new(None)),
            dead: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn pending_len(&self) -> usize {
        self.pending.lock().await.len()
    }

    pub async fn has_inflight(&self) -> bool {
        self.in_flight.lock().await.is_some()
    }
}

impl Default for MemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskBroker for MemoryBroker {
    async fn publish(&self, task: &TaskMessage) -> Result<()> {
        let raw = task.to_wire()?;
        self.pending.lock().await.push_back(raw);
        Ok(())
    }

    async fn receive(&self) -> Result<Option<Delivery>> {
        let mut in_flight = self.in_flight.lock().await;
        if in_flight.is_some() {
            // Prefetch limit: the previous delivery is still unresolved.
            return Ok(None);
        }

        let mut pending = self.pending.lock().await;
        match pending.pop_front() {
            Some(raw) => {
                let task = TaskMessage::from_wire(&raw)?;
                *in_flight = Some(raw.clone());
                Ok(Some(Delivery { task, raw }))
            }
            None => Ok(None),
        }
    }

    async fn ack(&self, delivery: &Delivery) -> Result<()> {
        let mut in_flight = self.in_flight.lock().await;
        match in_flight.take_if(|raw| *raw == delivery.raw) {
            Some(_) => Ok(()),
            None => Err(GradBridgeError::Queue(
                "Ack for a delivery that is not in flight".to_string(),
            )),
        }
    }

    async fn nack(&self, delivery: &Delivery, error: &str) -> Result<()> {
        let mut in_flight = self.in_flight.lock().await;
        match in_flight.take_if(|raw| *raw == delivery.raw) {
            Some(raw) => {
                self.dead
                    .lock()
                    .await
                    .push(DeadTask::new(raw, error.to_string()));
                Ok(())
            }
            None => Err(GradBridgeError::Queue(
                "Nack for a delivery that is not in flight".to_string(),
            )),
        }
    }

    async fn recover_inflight(&self) -> Result<usize> {
        let mut in_flight = self.in_flight.lock().await;
        match in_flight.take() {
            Some(raw) => {
                self.pending.lock().await.push_front(raw);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn dead_tasks(&self, limit: usize) -> Result<Vec<DeadTask>> {
        let dead = self.dead.lock().await;
        Ok(dead.iter().rev().take(limit).cloned().collect())
    }
}
