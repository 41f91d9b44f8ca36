//! Sync coordinator - the paginated fetch loop
//!
//! This module drives a run from start to finish:
//! - Loading the previous dump (unless a full refresh is forced)
//! - Requesting fixed-size chunks at increasing offsets
//! - Deduplicating each chunk into the accumulated dataset
//! - Checkpointing periodically, on empty chunks, and before every retry
//! - Stopping after a run of consecutive empty chunks
//!
//! Offsets advance past empty chunks too, so gaps in the remote data
//! shorter than `max_empty_chunks * page_size` rows are stepped over.
//! A longer gap ends the run early.

use crate::bucket::BucketTransport;
use crate::config::FetchConfig;
use crate::storage::DumpStorage;
use crate::sync::dedup::filter_new;
use crate::sync::pacing::Sleeper;
use crate::sync::source::BucketSource;
use crate::sync::state::FetchState;
use crate::SyncError;
use std::time::Duration;

/// Tunables for a sync run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Rows requested per chunk
    pub page_size: u64,

    /// Consecutive empty chunks that end the run
    pub max_empty_chunks: u32,

    /// Checkpoint every N fetched chunks
    pub checkpoint_interval: u32,

    /// Pause after every fetched chunk
    pub courtesy_delay: Duration,

    /// Pause after a failed fetch, before retrying the same offset
    pub retry_backoff: Duration,

    /// Ignore any previous dump and start from nothing
    pub force_refresh: bool,
}

impl SyncOptions {
    pub fn from_config(config: &FetchConfig, force_refresh: bool) -> Self {
        Self {
            page_size: config.page_size,
            max_empty_chunks: config.max_empty_chunks,
            checkpoint_interval: config.checkpoint_interval,
            courtesy_delay: config.courtesy_delay(),
            retry_backoff: config.retry_backoff(),
            force_refresh,
        }
    }
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self::from_config(&FetchConfig::default(), false)
    }
}

/// Summary of a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Items in the final dump
    pub total_items: usize,

    /// Items loaded from the previous dump
    pub initial_items: usize,

    /// Items added by this run
    pub new_items: usize,

    /// Successful chunk requests, empty ones included
    pub chunks_fetched: u64,

    /// Chunks that came back empty
    pub empty_chunks: u64,

    /// Requests that failed and were retried
    pub failed_attempts: u64,

    /// Rows dropped as duplicates
    pub duplicates: usize,

    /// Rows dropped because they did not decode
    pub decode_errors: usize,

    /// Items of the previous dump dropped because they did not decode
    pub unreadable_items: usize,

    /// Offset the run stopped at
    pub final_offset: u64,
}

/// Drives one source through the fetch/dedup/checkpoint loop
pub struct Coordinator<S, T, D, P> {
    source: S,
    transport: T,
    store: D,
    sleeper: P,
    options: SyncOptions,
}

impl<S, T, D, P> Coordinator<S, T, D, P>
where
    S: BucketSource,
    T: BucketTransport,
    D: DumpStorage,
    P: Sleeper,
{
    pub fn new(source: S, transport: T, store: D, sleeper: P, options: SyncOptions) -> Self {
        Self {
            source,
            transport,
            store,
            sleeper,
            options,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn store(&self) -> &D {
        &self.store
    }

    pub fn sleeper(&self) -> &P {
        &self.sleeper
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Builds the starting state from the previous dump, if any
    pub fn initial_state(&self) -> FetchState<S::Record> {
        let mut state = match self.store.load::<serde_json::Value>() {
            Some(dump) => {
                let state = FetchState::from_dump(&self.source, dump);
                tracing::info!(
                    "Loaded existing data: {} {}",
                    state.initial_count,
                    self.source.name()
                );
                if state.unreadable_items > 0 {
                    tracing::warn!(
                        "{} items of the existing dump could not be read and will be dropped",
                        state.unreadable_items
                    );
                }
                state
            }
            None => {
                tracing::info!("No existing data found, starting fresh");
                FetchState::fresh()
            }
        };

        if self.options.force_refresh {
            tracing::info!("Forcing complete refresh, discarding loaded data");
            state.reset();
        } else if state.initial_count > 0 && !self.source.has_reliable_ordering() {
            tracing::info!(
                "{} have no reliable ordering; doing a full pass and merging with existing data",
                self.source.name()
            );
        }

        state
    }

    /// Runs the sync to completion
    ///
    /// Transport failures are retried indefinitely at the same offset.
    /// Every attempt is followed by the courtesy delay; a failed one waits
    /// out the retry backoff first. The only error returned is a failed save.
    pub async fn run(&self) -> crate::Result<SyncReport> {
        let mut state = self.initial_state();
        let mut report = SyncReport {
            initial_items: state.initial_count,
            unreadable_items: state.unreadable_items,
            ..SyncReport::default()
        };

        let base_query = self.source.base_query();
        let page_size = self.options.page_size;
        let mut consecutive_empty = 0u32;

        tracing::info!(
            "Starting to fetch {} from offset {}",
            self.source.name(),
            state.offset
        );

        while consecutive_empty < self.options.max_empty_chunks {
            let query = base_query.page(page_size, state.offset).build();
            tracing::info!("Fetching chunk at offset {}...", state.offset);
            tracing::debug!("Query: {}", query);

            match self.transport.fetch(&query).await {
                Ok(response) => self.absorb_chunk(
                    response.bucket,
                    &mut state,
                    &mut report,
                    &mut consecutive_empty,
                )?,
                Err(e) => {
                    report.failed_attempts += 1;
                    tracing::error!("Failed to fetch chunk at offset {}: {}", state.offset, e);
                    tracing::info!("Saving current progress before retrying...");
                    self.checkpoint(&state)?;
                    tracing::info!("Waiting {:?} before retry...", self.options.retry_backoff);
                    self.sleeper.sleep(self.options.retry_backoff).await;
                }
            }

            self.sleeper.sleep(self.options.courtesy_delay).await;
        }

        self.checkpoint(&state)?;

        report.total_items = state.accumulated.len();
        report.new_items = state.new_items();
        report.final_offset = state.offset;

        tracing::info!(
            "{} dump complete: {} total, {} new this run",
            self.source.name(),
            report.total_items,
            report.new_items
        );

        Ok(report)
    }

    /// Folds one successful response into the state and advances the offset
    fn absorb_chunk(
        &self,
        rows: Vec<serde_json::Value>,
        state: &mut FetchState<S::Record>,
        report: &mut SyncReport,
        consecutive_empty: &mut u32,
    ) -> Result<(), SyncError> {
        let page_size = self.options.page_size;
        let fetched = rows.len();
        report.chunks_fetched += 1;
        tracing::info!("Fetched {} rows", fetched);

        if fetched == 0 {
            *consecutive_empty += 1;
            report.empty_chunks += 1;
            tracing::info!(
                "Empty chunk {}/{} at offset {}",
                consecutive_empty,
                self.options.max_empty_chunks,
                state.offset
            );
        } else {
            *consecutive_empty = 0;
            let outcome = filter_new(&self.source, rows, &mut state.seen_keys);
            report.duplicates += outcome.duplicates;
            report.decode_errors += outcome.decode_errors;

            if outcome.added.is_empty() {
                tracing::info!(
                    "No new {} in this chunk ({} duplicates filtered)",
                    self.source.name(),
                    outcome.duplicates
                );
            } else {
                tracing::info!(
                    "Added {} new {} ({} duplicates filtered)",
                    outcome.added.len(),
                    self.source.name(),
                    outcome.duplicates
                );
            }
            if outcome.decode_errors > 0 {
                tracing::warn!("{} rows failed to decode", outcome.decode_errors);
            }

            state.accumulated.extend(outcome.added);
            state.resume_offset = state.offset + page_size;
        }

        state.offset += page_size;

        let interval = u64::from(self.options.checkpoint_interval.max(1));
        if fetched == 0 || report.chunks_fetched % interval == 0 {
            self.checkpoint(state)?;
        }

        Ok(())
    }

    /// Saves the accumulated dataset
    fn checkpoint(&self, state: &FetchState<S::Record>) -> Result<(), SyncError> {
        let resume_offset = if self.source.has_reliable_ordering() {
            state.resume_offset
        } else {
            0
        };
        self.store.save(&state.accumulated, resume_offset)?;
        Ok(())
    }
}
