use crate::analytics::AnalyticsView;
use crate::error::Result;
use crate::metrics;
use crate::models::TaskKind;
use crate::pipeline::IngestPipeline;
use crate::queue::{Delivery, TaskBroker};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Single-consumer worker: receives one task at a time, runs it to
/// completion, then acks or nacks before asking for the next.
pub struct Worker {
    broker: Arc<dyn TaskBroker>,
    pipeline: IngestPipeline,
    analytics: Arc<dyn AnalyticsView>,
    idle_delay: Duration,
    error_backoff: Duration,
}

impl Worker {
    pub fn new(
        broker: Arc<dyn TaskBroker>,
        pipeline: IngestPipeline,
        analytics: Arc<dyn AnalyticsView>,
    ) -> Self {
        Self {
            broker,
            pipeline,
            analytics,
            idle_delay: Duration::from_millis(50),
            error_backoff: Duration::from_secs(5),
        }
    }

    /// Consume until the shutdown signal flips.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        // Anything stranded by a previous crash is redelivered first; the
        // idempotent writer and the re-read watermark absorb the replay.
        match self.broker.recover_inflight().await {
            Ok(0) => {}
            Ok(n) => info!("Requeued {} stranded task(s) from a previous run", n),
            Err(e) => warn!("In-flight recovery failed: {}", e),
        }

        info!("Worker started, waiting for tasks");

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("Worker received shutdown signal");
                        break;
                    }
                }
                received = self.broker.receive() => {
                    match received {
                        Ok(Some(delivery)) => self.handle_delivery(delivery).await,
                        Ok(None) => {
                            // A broker with a blocking pop already waited out
                            // its poll window; this only paces the in-memory
                            // broker's immediate returns.
                            tokio::time::sleep(self.idle_delay).await;
                        }
                        Err(e) => {
                            error!("Broker receive failed: {}", e);
                            tokio::time::sleep(self.error_backoff).await;
                        }
                    }
                }
            }
        }

        info!("Worker stopped");
        Ok(())
    }

    /// Run one delivered task and resolve it.
    ///
    /// Ack only happens after the pipeline's durable state is committed; any
    /// error nacks the delivery without requeue.
    pub async fn handle_delivery(&self, delivery: Delivery) {
        let kind = delivery.task.kind;
        info!("Processing '{}' task", kind.as_str());

        let timer = metrics::PIPELINE_DURATION_SECONDS
            .with_label_values(&[kind.as_str()])
            .start_timer();

        let result = match kind {
            TaskKind::Ingest => self.pipeline.run().await.map(|report| {
                if report.no_new_data() {
                    info!("No new data to ingest");
                }
            }),
            TaskKind::Recompute => self.analytics.recompute().await.map(|summary| {
                info!(
                    "Analytics recomputed: {} total entries",
                    summary.total_entries
                );
            }),
        };

        timer.observe_duration();

        match result {
            Ok(()) => {
                if let Err(e) = self.broker.ack(&delivery).await {
                    // The task succeeded but the ack did not reach the
                    // broker; the redelivery will be absorbed as a replay.
                    error!("Failed to ack '{}' task: {}", kind.as_str(), e);
                } else {
                    metrics::TASKS_CONSUMED_TOTAL
                        .with_label_values(&[kind.as_str(), "acked"])
                        .inc();
                    info!("'{}' task completed successfully", kind.as_str());
                }
            }
            Err(task_err) => {
                error!("'{}' task failed: {}", kind.as_str(), task_err);
                if let Err(e) = self
                    .broker
                    .nack(&delivery, &task_err.to_string())
                    .await
                {
                    error!("Failed to nack '{}' task: {}", kind.as_str(), e);
                } else {
                    metrics::TASKS_CONSUMED_TOTAL
                        .with_label_values(&[kind.as_str(), "nacked"])
                        .inc();
                    metrics::DEAD_TASKS_TOTAL
                        .with_label_values(&[kind.as_str()])
                        .inc();
                }
            }
        }
    }
}
