//! Output module for console reporting
//!
//! This module handles:
//! - The summary printed when a sync finishes
//! - Inspecting an existing dump for `--stats`

pub mod stats;

pub use stats::{format_report, print_dump_statistics, print_report, DumpStatistics};

use crate::storage::load_dump;
use std::path::Path;

/// Loads statistics for the dump at `path`
///
/// Items are read as raw JSON so any dump can be inspected, whatever
/// source produced it. Returns `None` if the file is missing or unreadable.
pub fn load_dump_statistics(path: &Path) -> Option<DumpStatistics> {
    load_dump::<serde_json::Value>(path).map(|dump| DumpStatistics::from_dump(&dump))
}
