use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueueConfig {
    /// Base name of the task queue; the pending, processing and dead lists
    /// derive from it.
    #[serde(default = "default_queue_name")]
    pub name: String,

    /// How long one blocking poll waits before the consumer loop re-checks
    /// for shutdown, in seconds.
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,

    /// Fixed delay between broker connection attempts, in seconds.
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_secs: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            name: default_queue_name(),
            poll_timeout_secs: default_poll_timeout(),
            reconnect_delay_secs: default_reconnect_delay(),
        }
    }
}

fn default_queue_name() -> String {
    "tasks".to_string()
}

fn default_poll_timeout() -> u64 {
    5
}

fn default_reconnect_delay() -> u64 {
    5
}
