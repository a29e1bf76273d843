use crate::config::EnrichmentConfig;
use crate::enrich::{decode_response, encode_request, Enricher};
use crate::error::{GradBridgeError, Result};
use crate::models::{CanonicalRecord, EnrichedRecord};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

/// Runs the enrichment service as a child process: JSON array on stdin,
/// JSONL on stdout. A non-zero exit is total failure for the batch.
pub struct SubprocessEnricher {
    command: Vec<String>,
    timeout: Duration,
}

impl SubprocessEnricher {
    pub fn new(config: &EnrichmentConfig) -> Result<Self> {
        if config.command.is_empty() {
            return Err(GradBridgeError::Config(
                "Enrichment command cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            command: config.command.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }
}

#[async_trait]
impl Enricher for SubprocessEnricher {
    async fn enrich(&self, records: Vec<CanonicalRecord>) -> Result<Vec<EnrichedRecord>> {
        let request = encode_request(&records)?;

        info!(
            "Enriching {} records via '{}'",
            records.len(),
            self.command.join(" ")
        );

        let mut child = Command::new(&self.command[0])
            .args(&self.command[1..])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                GradBridgeError::Enrichment(format!("Failed to spawn enrichment process: {}", e))
            })?;

        let mut stdin = child.stdin.take().ok_or_else(|| {
            GradBridgeError::Enrichment("Enrichment process has no stdin".to_string())
        })?;
        stdin.write_all(request.as_bytes()).await.map_err(|e| {
            GradBridgeError::Enrichment(format!("Failed to write enrichment request: {}", e))
        })?;
        drop(stdin);

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                GradBridgeError::Enrichment(format!(
                    "Enrichment process timed out after {}s",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| {
                GradBridgeError::Enrichment(format!("Enrichment process failed: {}", e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GradBridgeError::Enrichment(format!(
                "Enrichment process exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let enriched = decode_response(&stdout, records.len())?;
        debug!("Enrichment returned {} records", enriched.len());
        Ok(enriched)
    }
}
