mod ingest;
mod worker;

pub use ingest::{IngestPipeline, IngestReport};
pub use worker::Worker;
