//! Deduplication of fetched records
//!
//! Records are identified by the key their source derives from them. A
//! single [`KeySet`] is threaded through every batch of a run, so repeats
//! within one batch and across batches are both dropped.

use crate::sync::source::BucketSource;
use std::collections::HashSet;

/// Every dedup key seen so far in a run, including keys from a loaded dump
///
/// Keys are only ever added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySet {
    keys: HashSet<String>,
}

impl KeySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the key set for records that are already accumulated
    pub fn from_records<S: BucketSource>(source: &S, records: &[S::Record]) -> Self {
        Self {
            keys: records
                .iter()
                .map(|record| source.key(record).to_string())
                .collect(),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Adds `key`, returning `false` if it was already present
    pub fn insert(&mut self, key: String) -> bool {
        self.keys.insert(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Result of filtering one batch
#[derive(Debug)]
pub struct FilterOutcome<R> {
    /// Records with a previously unseen key, in batch order
    pub added: Vec<R>,

    /// Records dropped because their key was already known
    pub duplicates: usize,

    /// Records dropped because they failed to decode
    pub decode_errors: usize,
}

/// Keeps the records of `batch` whose key is new and adds those keys to `seen`
///
/// Rows that fail to decode are logged and counted, never returned as errors.
pub fn filter_new<S: BucketSource>(
    source: &S,
    batch: Vec<serde_json::Value>,
    seen: &mut KeySet,
) -> FilterOutcome<S::Record> {
    let mut outcome = FilterOutcome {
        added: Vec::new(),
        duplicates: 0,
        decode_errors: 0,
    };

    for raw in batch {
        let record = match source.parse(raw) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("Dropping undecodable {} record: {}", source.name(), e);
                outcome.decode_errors += 1;
                continue;
            }
        };

        if seen.insert(source.key(&record).to_string()) {
            outcome.added.push(record);
        } else {
            outcome.duplicates += 1;
        }
    }

    outcome
}
