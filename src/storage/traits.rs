//! Storage traits and error types
//!
//! This module defines the trait interface for dump backends and
//! associated error types.

use crate::storage::{DatabaseDump, DumpMetadata};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while saving a dump
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid dump path: {0}")]
    InvalidPath(PathBuf),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for dump backends
pub trait DumpStorage {
    /// Loads the previous dump
    ///
    /// Returns `None` when there is nothing usable to resume from; a
    /// missing or unreadable dump is never an error.
    fn load<T: DeserializeOwned>(&self) -> Option<DatabaseDump<T>>;

    /// Persists `items` as the complete dataset
    ///
    /// Each call replaces the previous dump entirely. Returns the metadata
    /// that was written.
    fn save<T: Serialize>(&self, items: &[T], last_data_offset: u64)
        -> StorageResult<DumpMetadata>;
}
