//! Storage module for persisting the accumulated dataset
//!
//! This module handles:
//! - The on-disk dump format (`items` plus run metadata)
//! - Loading a previous dump to resume from
//! - Crash-safe saving through a temporary file and an atomic rename

mod json;
mod traits;

pub use json::{load_dump, save_dump, JsonDumpStore};
pub use traits::{DumpStorage, StorageError, StorageResult};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted form of a run's dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct DatabaseDump<T> {
    #[serde(default)]
    pub items: Vec<T>,
    #[serde(default)]
    pub metadata: DumpMetadata,
}

impl<T> DatabaseDump<T> {
    /// Wraps `items` with metadata stamped now
    pub fn new(items: Vec<T>, last_data_offset: u64) -> Self {
        let metadata = DumpMetadata::now(items.len(), last_data_offset);
        Self { items, metadata }
    }
}

/// Metadata written alongside the items
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DumpMetadata {
    /// Number of items in the dump at write time
    pub total_items: usize,

    /// Offset to resume from; 0 for sources without a stable ordering
    pub last_data_offset: u64,

    /// When the dump was written
    pub last_fetch_time: DateTime<Utc>,
}

impl DumpMetadata {
    pub fn now(total_items: usize, last_data_offset: u64) -> Self {
        Self {
            total_items,
            last_data_offset,
            last_fetch_time: Utc::now(),
        }
    }
}
