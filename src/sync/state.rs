use crate::storage::DatabaseDump;
use serde_json::Value;
use crate::sync::dedup::KeySet;
use crate::sync::source::BucketSource;

/// Mutable state of one sync run
///
/// Owned by the coordinator for the duration of [`Coordinator::run`](crate::sync::Coordinator::run).
#[derive(Debug)]
pub struct FetchState<R> {
    /// Every record kept so far, loaded ones first, in fetch order
    pub accumulated: Vec<R>,

    /// Keys of everything in `accumulated`
    pub seen_keys: KeySet,

    /// Offset of the next chunk to request
    pub offset: u64,

    /// Offset just past the last non-empty chunk, used as the resume hint
    pub resume_offset: u64,

    /// Size of `accumulated` when the run started
    pub initial_count: usize,

    /// Dump items dropped because they no longer decode
    pub unreadable_items: usize,
}

impl<R> FetchState<R> {
    /// State for a run with nothing to resume from
    pub fn fresh() -> Self {
        Self {
            accumulated: Vec::new(),
            seen_keys: KeySet::new(),
            offset: 0,
            resume_offset: 0,
            initial_count: 0,
            unreadable_items: 0,
        }
    }

    /// Seeds the state from a previously saved dump
    ///
    /// Items are decoded one by one through the source; an item that fails
    /// is dropped and counted, the rest are kept. The dump's offset is only
    /// honoured for sources with a reliable ordering.
    pub fn from_dump<S>(source: &S, dump: DatabaseDump<Value>) -> Self
    where
        S: BucketSource<Record = R>,
    {
        let offset = if source.has_reliable_ordering() {
            dump.metadata.last_data_offset
        } else {
            0
        };

        let mut accumulated = Vec::with_capacity(dump.items.len());
        let mut unreadable_items = 0;
        for (index, stored) in dump.items.into_iter().enumerate() {
            match source.restore(stored) {
                Ok(record) => accumulated.push(record),
                Err(e) => {
                    unreadable_items += 1;
                    tracing::warn!("Dropping unreadable dump item {}: {}", index, e);
                }
            }
        }

        let seen_keys = KeySet::from_records(source, &accumulated);
        let initial_count = accumulated.len();

        Self {
            accumulated,
            seen_keys,
            offset,
            resume_offset: offset,
            initial_count,
            unreadable_items,
        }
    }

    /// Discards everything, as for a forced full refresh
    pub fn reset(&mut self) {
        *self = Self::fresh();
    }

    /// Records added since the run started
    pub fn new_items(&self) -> usize {
        self.accumulated.len().saturating_sub(self.initial_count)
    }
}
