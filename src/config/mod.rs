//! Configuration module for Bucket-Sync
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional; anything left out falls back to the defaults
//! used against the RuneScape Wiki.
//!
//! # Example
//!
//! ```no_run
//! use bucket_sync::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("bucket-sync.toml")).unwrap();
//! println!("Page size: {}", config.fetch.page_size);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{ApiConfig, Config, FetchConfig, OutputConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
