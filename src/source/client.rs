use crate::config::GradCafeConfig;
use crate::error::{GradBridgeError, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Transport boundary for the survey source: one HTML page per call.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, page: u32) -> Result<String>;
}

/// HTTP implementation over the public survey listing.
pub struct HttpPageFetcher {
    http: reqwest::Client,
    base_url: String,
}

impl HttpPageFetcher {
    pub fn new(config: &GradCafeConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("gradbridge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GradBridgeError::Source(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_page(&self, page: u32) -> Result<String> {
        let url = format!("{}{}", self.base_url, page);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| GradBridgeError::Source(format!("Request for page {} failed: {}", page, e)))?;

        let response = response.error_for_status().map_err(|e| {
            GradBridgeError::Source(format!("Page {} returned error status: {}", page, e))
        })?;

        response
            .text()
            .await
            .map_err(|e| GradBridgeError::Source(format!("Failed to read page {} body: {}", page, e)))
    }
}
