use serde::{Deserialize, Serialize};

/// How the enrichment service is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentMode {
    Subprocess,
    Http,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnrichmentConfig {
    #[serde(default = "default_mode")]
    pub mode: EnrichmentMode,

    /// Command line for subprocess mode. The batch is written to stdin as a
    /// JSON array; one enriched JSON object per line is read from stdout.
    #[serde(default = "default_command")]
    pub command: Vec<String>,

    /// Endpoint for http mode.
    #[serde(default)]
    pub url: Option<String>,

    /// Upper bound on one batch call, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            command: default_command(),
            url: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_mode() -> EnrichmentMode {
    EnrichmentMode::Subprocess
}

fn default_command() -> Vec<String> {
    vec!["python3".to_string(), "llm_hosting/app.py".to_string()]
}

fn default_timeout() -> u64 {
    300
}
