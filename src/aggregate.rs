//! Process-wide consumption totals per database.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::metrics::OperationMetrics;

/// Rolled-up consumption for one database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseMetrics {
    /// Database name.
    pub database: String,
    /// Number of finalized operations merged into this entry.
    pub operations: u64,
    /// Sum of every merged operation's metrics.
    pub metrics: OperationMetrics,
}

#[derive(Default)]
struct DatabaseCounters {
    operations: AtomicU64,
    doc_bytes_read: AtomicU64,
    doc_units_read: AtomicU64,
    idx_entries_read: AtomicU64,
    keys_sorted: AtomicU64,
    doc_bytes_written: AtomicU64,
    doc_units_written: AtomicU64,
    doc_units_returned: AtomicU64,
    cpu_millis: AtomicU64,
}

impl DatabaseCounters {
    fn add(&self, metrics: &OperationMetrics) {
        self.doc_bytes_read
            .fetch_add(metrics.doc_bytes_read, Ordering::Relaxed);
        self.doc_units_read
            .fetch_add(metrics.doc_units_read, Ordering::Relaxed);
        self.idx_entries_read
            .fetch_add(metrics.idx_entries_read, Ordering::Relaxed);
        self.keys_sorted
            .fetch_add(metrics.keys_sorted, Ordering::Relaxed);
        self.doc_bytes_written
            .fetch_add(metrics.doc_bytes_written, Ordering::Relaxed);
        self.doc_units_written
            .fetch_add(metrics.doc_units_written, Ordering::Relaxed);
        self.doc_units_returned
            .fetch_add(metrics.doc_units_returned, Ordering::Relaxed);
        self.cpu_millis
            .fetch_add(metrics.cpu_millis, Ordering::Relaxed);
        self.operations.fetch_add(1, Ordering::Relaxed);
    }

    fn load(&self, database: &str) -> DatabaseMetrics {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        DatabaseMetrics {
            database: database.to_string(),
            operations: load(&self.operations),
            metrics: OperationMetrics {
                doc_bytes_read: load(&self.doc_bytes_read),
                doc_units_read: load(&self.doc_units_read),
                idx_entries_read: load(&self.idx_entries_read),
                keys_sorted: load(&self.keys_sorted),
                doc_bytes_written: load(&self.doc_bytes_written),
                doc_units_written: load(&self.doc_units_written),
                doc_units_returned: load(&self.doc_units_returned),
                cpu_millis: load(&self.cpu_millis),
            },
        }
    }
}

/// Process-wide consumption totals keyed by database name.
///
/// Entries are created lazily by the first merge against a database and live
/// until [`reset`](Self::reset). Merges hold the shared lock while adding, so
/// concurrent merges into the same entry never lose an update and a reset
/// never races with a half-applied merge.
#[derive(Default)]
pub struct DatabaseAggregator {
    entries: RwLock<FxHashMap<String, DatabaseCounters>>,
}

impl DatabaseAggregator {
    /// Creates an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a finalized operation's metrics into `database`'s total.
    pub fn merge(&self, database: &str, metrics: &OperationMetrics) {
        {
            let entries = self.entries.read();
            if let Some(counters) = entries.get(database) {
                counters.add(metrics);
                return;
            }
        }
        let mut entries = self.entries.write();
        entries
            .entry(database.to_string())
            .or_default()
            .add(metrics);
    }

    /// Totals for one database, if any operation has been merged into it.
    pub fn get(&self, database: &str) -> Option<DatabaseMetrics> {
        self.entries
            .read()
            .get(database)
            .map(|counters| counters.load(database))
    }

    /// Totals for every database, ordered by name.
    pub fn snapshot(&self) -> Vec<DatabaseMetrics> {
        let entries = self.entries.read();
        let mut out: Vec<DatabaseMetrics> = entries
            .iter()
            .map(|(name, counters)| counters.load(name))
            .collect();
        out.sort_by(|a, b| a.database.cmp(&b.database));
        out
    }

    /// Number of databases with an entry.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether no database has an entry.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drops every entry.
    pub fn reset(&self) {
        self.entries.write().clear();
    }
}

impl std::fmt::Debug for DatabaseAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseAggregator")
            .field("databases", &self.len())
            .finish()
    }
}
