//! Run and dump statistics
//!
//! This module provides the console reports printed at the end of a sync
//! and by `--stats`.

use crate::storage::DatabaseDump;
use crate::sync::SyncReport;
use std::path::Path;

/// Overview of a dump file on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpStatistics {
    /// Items actually present in the file
    pub items: usize,

    /// `totalItems` as recorded in the metadata
    pub recorded_total: usize,

    /// Resume offset recorded in the metadata
    pub last_data_offset: u64,

    /// When the dump was written, RFC 3339
    pub last_fetch_time: String,
}

impl DumpStatistics {
    pub fn from_dump<T>(dump: &DatabaseDump<T>) -> Self {
        Self {
            items: dump.items.len(),
            recorded_total: dump.metadata.total_items,
            last_data_offset: dump.metadata.last_data_offset,
            last_fetch_time: dump.metadata.last_fetch_time.to_rfc3339(),
        }
    }

    /// Whether the recorded total agrees with the items present
    pub fn is_consistent(&self) -> bool {
        self.items == self.recorded_total
    }
}

/// Renders the end-of-run summary
pub fn format_report(report: &SyncReport, dump_path: &Path) -> String {
    let mut lines = vec![
        "=== Sync Complete ===".to_string(),
        String::new(),
        format!("Total items in dump: {}", report.total_items),
    ];

    if report.new_items > 0 {
        lines.push(format!("New items added this run: {}", report.new_items));
    } else {
        lines.push("No new items were added this run.".to_string());
    }

    lines.push(format!(
        "Chunks fetched: {} ({} empty, {} failed attempts)",
        report.chunks_fetched, report.empty_chunks, report.failed_attempts
    ));
    lines.push(format!(
        "Rows dropped: {} duplicates, {} undecodable",
        report.duplicates, report.decode_errors
    ));
    if report.unreadable_items > 0 {
        lines.push(format!(
            "Dropped {} unreadable items from the previous dump",
            report.unreadable_items
        ));
    }
    lines.push(format!("Output file: {}", dump_path.display()));

    lines.join("\n")
}

/// Prints the end-of-run summary to stdout
pub fn print_report(report: &SyncReport, dump_path: &Path) {
    println!("\n{}", format_report(report, dump_path));
}

/// Prints dump statistics to stdout
pub fn print_dump_statistics(stats: &DumpStatistics, dump_path: &Path) {
    println!("=== Dump Statistics ===\n");
    println!("File: {}", dump_path.display());
    println!("  Items: {}", stats.items);
    println!("  Recorded total: {}", stats.recorded_total);
    println!("  Resume offset: {}", stats.last_data_offset);
    println!("  Last fetch: {}", stats.last_fetch_time);

    if !stats.is_consistent() {
        println!(
            "\n! Metadata total ({}) does not match item count ({})",
            stats.recorded_total, stats.items
        );
    }
}
