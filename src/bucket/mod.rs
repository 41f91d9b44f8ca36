//! Bucket API module
//!
//! This module contains everything that talks the wiki's Bucket dialect:
//! - Building query strings from structured options
//! - Sending a query to `api.php?action=bucket` and decoding the envelope

mod client;
mod query;

pub use client::{build_http_client, BucketResponse, BucketTransport, HttpTransport};
pub use query::{
    build_query, BucketQuery, Direction, JoinSpec, Operator, OrderBy, Value, WhereCondition,
};
