use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Bucket-Sync
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Remote endpoint configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Wiki `api.php` endpoint that serves `action=bucket`
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// User agent sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Upper bound for a single request, in seconds
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://runescape.wiki/api.php".to_string(),
            user_agent: format!(
                "bucket-sync/{} (+https://github.com/rs-planner)",
                env!("CARGO_PKG_VERSION")
            ),
            request_timeout_secs: 60,
        }
    }
}

/// Pagination and pacing configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Records requested per chunk (the query's `limit`)
    #[serde(rename = "page-size")]
    pub page_size: u64,

    /// Consecutive empty chunks that end the run
    #[serde(rename = "max-empty-chunks")]
    pub max_empty_chunks: u32,

    /// Save a checkpoint every N fetched chunks
    #[serde(rename = "checkpoint-interval")]
    pub checkpoint_interval: u32,

    /// Pause between consecutive requests (milliseconds)
    #[serde(rename = "courtesy-delay-ms")]
    pub courtesy_delay_ms: u64,

    /// Pause before retrying a failed chunk (milliseconds)
    #[serde(rename = "retry-backoff-ms")]
    pub retry_backoff_ms: u64,
}

impl FetchConfig {
    pub fn courtesy_delay(&self) -> Duration {
        Duration::from_millis(self.courtesy_delay_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            page_size: 5000,
            max_empty_chunks: 3,
            checkpoint_interval: 10,
            courtesy_delay_ms: 500,
            retry_backoff_ms: 5000,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the JSON dump file
    #[serde(rename = "dump-path")]
    pub dump_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dump_path: PathBuf::from("data/recipes.json"),
        }
    }
}
