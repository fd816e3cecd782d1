//! Reportable metrics snapshot and the raw counters behind it.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::units::UnitSize;

/// Immutable resource-consumption snapshot for one finalized operation.
///
/// Every dimension is always present; an operation that did no work of a
/// given kind reports zero for it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationMetrics {
    /// Bytes of document data read from storage.
    pub doc_bytes_read: u64,
    /// `doc_bytes_read` quantized into document units.
    pub doc_units_read: u64,
    /// Index entries examined.
    pub idx_entries_read: u64,
    /// Keys passed through a sort.
    pub keys_sorted: u64,
    /// Bytes of document data written to storage.
    pub doc_bytes_written: u64,
    /// `doc_bytes_written` quantized into document units.
    pub doc_units_written: u64,
    /// Document units returned to the client.
    pub doc_units_returned: u64,
    /// CPU time spent on the operation, in whole milliseconds.
    pub cpu_millis: u64,
}

impl OperationMetrics {
    /// Returns `true` when every dimension is zero.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Raw counters accumulated by a scope before quantization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct RawCounters {
    pub(crate) doc_bytes_read: u64,
    pub(crate) idx_entries_read: u64,
    pub(crate) keys_sorted: u64,
    pub(crate) doc_bytes_written: u64,
    pub(crate) doc_units_returned: u64,
    pub(crate) cpu_nanos: u64,
}

impl RawCounters {
    /// Adds `other` into `self`. Counters saturate instead of wrapping so they
    /// never decrease.
    pub(crate) fn merge(&mut self, other: &RawCounters) {
        self.doc_bytes_read = self.doc_bytes_read.saturating_add(other.doc_bytes_read);
        self.idx_entries_read = self.idx_entries_read.saturating_add(other.idx_entries_read);
        self.keys_sorted = self.keys_sorted.saturating_add(other.keys_sorted);
        self.doc_bytes_written = self
            .doc_bytes_written
            .saturating_add(other.doc_bytes_written);
        self.doc_units_returned = self
            .doc_units_returned
            .saturating_add(other.doc_units_returned);
        self.cpu_nanos = self.cpu_nanos.saturating_add(other.cpu_nanos);
    }

    pub(crate) fn add_cpu(&mut self, duration: Duration) {
        let nanos = duration.as_nanos().min(u64::MAX as u128) as u64;
        self.cpu_nanos = self.cpu_nanos.saturating_add(nanos);
    }

    pub(crate) fn to_metrics(self, unit_size: UnitSize) -> OperationMetrics {
        OperationMetrics {
            doc_bytes_read: self.doc_bytes_read,
            doc_units_read: unit_size.units(self.doc_bytes_read),
            idx_entries_read: self.idx_entries_read,
            keys_sorted: self.keys_sorted,
            doc_bytes_written: self.doc_bytes_written,
            doc_units_written: unit_size.units(self.doc_bytes_written),
            doc_units_returned: self.doc_units_returned,
            cpu_millis: self.cpu_nanos / 1_000_000,
        }
    }
}
