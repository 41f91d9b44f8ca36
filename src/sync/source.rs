use crate::bucket::BucketQuery;
use crate::DecodeError;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A bucket the sync driver knows how to page through and deduplicate
pub trait BucketSource {
    /// Decoded record as stored in the dump
    type Record: Serialize + DeserializeOwned;

    /// Human-readable name used in logs
    fn name(&self) -> &str;

    /// Query for the bucket, without `limit`/`offset`
    fn base_query(&self) -> BucketQuery;

    /// Decodes one row of an API response
    fn parse(&self, raw: serde_json::Value) -> Result<Self::Record, DecodeError>;

    /// Decodes one item read back from a saved dump
    fn restore(&self, stored: serde_json::Value) -> Result<Self::Record, DecodeError> {
        serde_json::from_value(stored).map_err(DecodeError::Record)
    }

    /// Dedup key of a decoded record
    fn key<'a>(&self, record: &'a Self::Record) -> &'a str;

    /// Whether offsets are stable between runs
    ///
    /// Sources without a reliable ordering always start at offset 0 and
    /// record 0 as their resume offset.
    fn has_reliable_ordering(&self) -> bool {
        false
    }
}
