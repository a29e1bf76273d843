use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};

lazy_static! {
    /// Total number of records pulled from the source
    pub static ref RECORDS_FETCHED_TOTAL: CounterVec = register_counter_vec!(
        "gradbridge_records_fetched_total",
        "Total number of records pulled from the source",
        &["source"]
    ).unwrap();

    /// Total number of records written to the database
    pub static ref RECORDS_WRITTEN_TOTAL: CounterVec = register_counter_vec!(
        "gradbridge_records_written_total",
        "Total number of records written to the database",
        &["source"]
    ).unwrap();

    /// Tasks consumed, by kind and outcome
    pub static ref TASKS_CONSUMED_TOTAL: CounterVec = register_counter_vec!(
        "gradbridge_tasks_consumed_total",
        "Total number of tasks consumed",
        &["kind", "outcome"]
    ).unwrap();

    /// Tasks that failed terminally and were dead-lettered
    pub static ref DEAD_TASKS_TOTAL: CounterVec = register_counter_vec!(
        "gradbridge_dead_tasks_total",
        "Total number of tasks sent to the dead-task list",
        &["kind"]
    ).unwrap();

    /// Wall-clock duration of one task execution
    pub static ref PIPELINE_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "gradbridge_pipeline_duration_seconds",
        "Duration of one task execution",
        &["kind"],
        vec![0.1, 0.5, 1.0, 5.0, 15.0, 60.0, 300.0]
    ).unwrap();
}

/// Render all registered metrics in the Prometheus text format.
pub fn export() -> String {
    let encoder = TextEncoder::new();
    let families = prometheus::gather();
    let mut buffer = Vec::new();
    if encoder.encode(&families, &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
