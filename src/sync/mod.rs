//! Sync module - paging, dedup and checkpointing
//!
//! This module contains the core sync logic, including:
//! - The [`BucketSource`] seam describing what is fetched and how it is keyed
//! - Deduplication of fetched rows against everything seen so far
//! - The coordinator loop with retry, empty-chunk termination and checkpoints
//! - An injectable sleep capability for pacing

mod coordinator;
mod dedup;
mod pacing;
mod source;
mod state;

pub use coordinator::{Coordinator, SyncOptions, SyncReport};
pub use dedup::{filter_new, FilterOutcome, KeySet};
pub use pacing::{RecordingSleeper, Sleeper, TokioSleeper};
pub use source::BucketSource;
pub use state::FetchState;

use crate::bucket::HttpTransport;
use crate::config::Config;
use crate::recipe::RecipeSource;
use crate::storage::JsonDumpStore;

/// Runs a complete recipe sync
///
/// This is the main entry point for a sync. It will:
/// 1. Load the previous dump from `config.output.dump_path` (unless `force_refresh`)
/// 2. Page through the `recipe` bucket until it runs dry
/// 3. Save the merged dataset along the way and once more at the end
///
/// # Returns
///
/// * `Ok(SyncReport)` - Sync completed
/// * `Err(SyncError)` - The HTTP client could not be built or a save failed
pub async fn run_sync(config: &Config, force_refresh: bool) -> crate::Result<SyncReport> {
    let transport = HttpTransport::from_config(&config.api)?;
    let store = JsonDumpStore::new(&config.output.dump_path);
    let options = SyncOptions::from_config(&config.fetch, force_refresh);

    Coordinator::new(RecipeSource, transport, store, TokioSleeper, options)
        .run()
        .await
}
