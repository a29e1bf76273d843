//! Batch enrichment of canonical records.
//!
//! The enrichment service standardizes program and university names. It is a
//! black box behind the [`Enricher`] trait so the pipeline does not care
//! whether it runs as a subprocess, over HTTP, or in-process in tests.
//!
//! Exchange contract: request is one compact JSON array of canonical
//! records; response is JSONL, one enriched object per line, same
//! cardinality and order as the input. Any deviation fails the whole batch.

mod http;
mod subprocess;

pub use http::HttpEnricher;
pub use subprocess::SubprocessEnricher;

use crate::config::{EnrichmentConfig, EnrichmentMode};
use crate::error::{GradBridgeError, Result};
use crate::models::{CanonicalRecord, EnrichedRecord};
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait Enricher: Send + Sync {
    /// Enrich one batch. All-or-nothing: a failure leaves the caller free to
    /// retry the identical batch on the next run.
    async fn enrich(&self, records: Vec<CanonicalRecord>) -> Result<Vec<EnrichedRecord>>;
}

/// Build the configured enricher implementation.
pub fn from_config(config: &EnrichmentConfig) -> Result<Arc<dyn Enricher>> {
    match config.mode {
        EnrichmentMode::Subprocess => Ok(Arc::new(SubprocessEnricher::new(config)?)),
        EnrichmentMode::Http => Ok(Arc::new(HttpEnricher::new(config)?)),
    }
}

/// Encode a batch as the newline-free JSON array the service consumes.
pub fn encode_request(records: &[CanonicalRecord]) -> Result<String> {
    Ok(serde_json::to_string(records)?)
}

/// Decode a JSONL response, enforcing the cardinality contract.
pub fn decode_response(body: &str, expected: usize) -> Result<Vec<EnrichedRecord>> {
    let mut enriched = Vec::with_capacity(expected);

    for (lineno, line) in body.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record: EnrichedRecord = serde_json::from_str(line).map_err(|e| {
            GradBridgeError::Enrichment(format!(
                "Malformed response on line {}: {}",
                lineno + 1,
                e
            ))
        })?;
        enriched.push(record);
    }

    if enriched.len() != expected {
        return Err(GradBridgeError::Enrichment(format!(
            "Response cardinality mismatch: sent {} records, got {} back",
            expected,
            enriched.len()
        )));
    }

    Ok(enriched)
}
