use serde::{Deserialize, Serialize};

/// Configuration for the paginated survey source.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GradCafeConfig {
    /// Name used to key the ingestion watermark.
    #[serde(default = "default_source_name")]
    pub source_name: String,

    /// Page URL prefix; the page number is appended verbatim.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Hard cap on pages fetched per run. Bounds the crawl when the stop
    /// condition is never met.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for GradCafeConfig {
    fn default() -> Self {
        Self {
            source_name: default_source_name(),
            base_url: default_base_url(),
            max_pages: default_max_pages(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_source_name() -> String {
    "TheGradCafe".to_string()
}

fn default_base_url() -> String {
    "https://www.thegradcafe.com/survey/?page=".to_string()
}

fn default_max_pages() -> u32 {
    50
}

fn default_request_timeout() -> u64 {
    30
}
