//! Bucket-Sync: a resumable dump tool for wiki Bucket data
//!
//! This crate pages through a wiki's Bucket API, deduplicates the returned
//! records by a content-derived key, and keeps the accumulated dataset in a
//! local JSON dump that is written atomically and merged on the next run.

pub mod bucket;
pub mod config;
pub mod output;
pub mod recipe;
pub mod storage;
pub mod sync;

use thiserror::Error;

/// Main error type for Bucket-Sync operations
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Failure of a single Bucket API request
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status}: {reason}")]
    Status { status: u16, reason: String },

    #[error("Malformed Bucket response: {0}")]
    Envelope(#[source] serde_json::Error),

    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),
}

/// Failure to decode one record returned by the Bucket API
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Record does not match the expected shape: {0}")]
    Record(#[source] serde_json::Error),

    #[error("Embedded payload is not valid JSON: {0}")]
    Payload(#[source] serde_json::Error),
}

/// Result type alias for Bucket-Sync operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for transport operations
pub type TransportResult<T> = std::result::Result<T, TransportError>;

// Re-export commonly used types
pub use bucket::{build_query, BucketQuery, BucketResponse, BucketTransport, HttpTransport};
pub use config::Config;
pub use recipe::{generate_recipe_key, ParsedRecipe, RecipeSource};
pub use storage::{DatabaseDump, DumpMetadata, DumpStorage, JsonDumpStore};
pub use sync::{run_sync, BucketSource, Coordinator, KeySet, SyncOptions, SyncReport};
