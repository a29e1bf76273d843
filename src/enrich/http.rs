use crate::config::EnrichmentConfig;
use crate::enrich::{decode_response, encode_request, Enricher};
use crate::error::{GradBridgeError, Result};
use crate::models::{CanonicalRecord, EnrichedRecord};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

/// Calls the enrichment service over HTTP. The request body is the JSON
/// array; the response body is JSONL.
pub struct HttpEnricher {
    http: reqwest::Client,
    url: String,
}

impl HttpEnricher {
    pub fn new(config: &EnrichmentConfig) -> Result<Self> {
        let url = config.url.clone().ok_or_else(|| {
            GradBridgeError::Config("Enrichment URL must be set in http mode".to_string())
        })?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                GradBridgeError::Enrichment(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self { http, url })
    }
}

#[async_trait]
impl Enricher for HttpEnricher {
    async fn enrich(&self, records: Vec<CanonicalRecord>) -> Result<Vec<EnrichedRecord>> {
        let request = encode_request(&records)?;

        info!("Enriching {} records via {}", records.len(), self.url);

        let response = self
            .http
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(request)
            .send()
            .await
            .map_err(|e| GradBridgeError::Enrichment(format!("Enrichment call failed: {}", e)))?;

        let response = response.error_for_status().map_err(|e| {
            GradBridgeError::Enrichment(format!("Enrichment service returned error: {}", e))
        })?;

        let body = response.text().await.map_err(|e| {
            GradBridgeError::Enrichment(format!("Failed to read enrichment response: {}", e))
        })?;

        let enriched = decode_response(&body, records.len())?;
        debug!("Enrichment returned {} records", enriched.len());
        Ok(enriched)
    }
}
