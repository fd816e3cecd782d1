//! Accumulator for a single logical operation.

use std::time::Duration;

#[cfg(debug_assertions)]
use tracing::warn;

use crate::metrics::{OperationMetrics, RawCounters};
use crate::units::UnitSize;

/// Mutable accumulator bound to one logical operation or a nested sub-task.
///
/// Counters only grow while the scope is open. A scope created while
/// measurement is disabled ignores every event with a single branch.
#[derive(Debug, Clone)]
pub struct OperationScope {
    counters: RawCounters,
    database: Option<String>,
    enabled: bool,
    closed: bool,
}

impl OperationScope {
    /// Creates an open scope. `enabled` is sampled once by the caller and
    /// fixed for the lifetime of the scope.
    pub fn new(enabled: bool) -> Self {
        Self {
            counters: RawCounters::default(),
            database: None,
            enabled,
            closed: false,
        }
    }

    /// Sets the database the operation targets.
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Database the operation targets, if any.
    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    /// Whether this scope measures anything.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether [`finalize`](Self::finalize) has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Records `bytes` of document data read from storage.
    #[inline]
    pub fn record_doc_read(&mut self, bytes: u64) {
        if self.accepting("record_doc_read") {
            self.counters.doc_bytes_read = self.counters.doc_bytes_read.saturating_add(bytes);
        }
    }

    /// Records `bytes` of document data written to storage.
    #[inline]
    pub fn record_doc_written(&mut self, bytes: u64) {
        if self.accepting("record_doc_written") {
            self.counters.doc_bytes_written =
                self.counters.doc_bytes_written.saturating_add(bytes);
        }
    }

    /// Records `count` index entries examined.
    #[inline]
    pub fn record_idx_entries_read(&mut self, count: u64) {
        if self.accepting("record_idx_entries_read") {
            self.counters.idx_entries_read = self.counters.idx_entries_read.saturating_add(count);
        }
    }

    /// Records `count` keys passed through a sort.
    #[inline]
    pub fn record_keys_sorted(&mut self, count: u64) {
        if self.accepting("record_keys_sorted") {
            self.counters.keys_sorted = self.counters.keys_sorted.saturating_add(count);
        }
    }

    /// Records `count` document units returned to the client.
    #[inline]
    pub fn record_docs_returned(&mut self, count: u64) {
        if self.accepting("record_docs_returned") {
            self.counters.doc_units_returned =
                self.counters.doc_units_returned.saturating_add(count);
        }
    }

    /// Records CPU time spent on the operation.
    #[inline]
    pub fn record_cpu(&mut self, duration: Duration) {
        if self.accepting("record_cpu") {
            self.counters.add_cpu(duration);
        }
    }

    /// Current totals without closing the scope.
    pub fn snapshot(&self, unit_size: UnitSize) -> OperationMetrics {
        self.counters.to_metrics(unit_size)
    }

    /// Closes the scope and returns its quantized totals.
    ///
    /// Finalizing twice returns the same snapshot.
    pub fn finalize(&mut self, unit_size: UnitSize) -> OperationMetrics {
        self.closed = true;
        self.counters.to_metrics(unit_size)
    }

    /// Creates an open child scope that shares this scope's settings.
    pub(crate) fn child(&self) -> Self {
        Self {
            counters: RawCounters::default(),
            database: self.database.clone(),
            enabled: self.enabled,
            closed: false,
        }
    }

    /// Adds a popped child's raw totals into this scope.
    pub(crate) fn absorb(&mut self, child: &OperationScope) {
        if self.accepting("absorb") {
            self.counters.merge(&child.counters);
        }
    }

    #[inline]
    fn accepting(&self, _op: &'static str) -> bool {
        if !self.enabled {
            return false;
        }
        if self.closed {
            #[cfg(debug_assertions)]
            warn!(op = _op, "metering.scope.record_after_finalize");
            return false;
        }
        true
    }
}
