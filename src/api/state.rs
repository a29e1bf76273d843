use crate::analytics::AnalyticsView;
use crate::health::HealthRegistry;
use crate::queue::{TaskBroker, TaskPublisher};
use std::sync::Arc;

/// Shared state for the API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub publisher: Arc<TaskPublisher>,
    pub broker: Arc<dyn TaskBroker>,
    pub analytics: Arc<dyn AnalyticsView>,
    pub health: Arc<HealthRegistry>,
}

impl ApiState {
    pub fn new(
        broker: Arc<dyn TaskBroker>,
        analytics: Arc<dyn AnalyticsView>,
        health: Arc<HealthRegistry>,
    ) -> Self {
        Self {
            publisher: Arc::new(TaskPublisher::new(broker.clone())),
            broker,
            analytics,
            health,
        }
    }
}
