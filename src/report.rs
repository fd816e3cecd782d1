//! Rendering of finalized metrics for the profiler and the slow-operation log.

use std::time::Duration;

use serde_json::{json, Map, Value};
use tracing::field::display;
use tracing::info;

use crate::error::Result;
use crate::metrics::OperationMetrics;
use crate::operation::OperationRecord;

/// Key under which metrics are embedded in profiler entries and log lines.
pub const OPERATION_METRICS_KEY: &str = "operationMetrics";

/// Log id carried by slow-operation log lines.
pub const SLOW_OPERATION_LOG_ID: u32 = 51803;

/// Returns the `operationMetrics` sub-document for `metrics`.
///
/// All eight dimensions are present, zero or not.
pub fn to_profile_document(metrics: &OperationMetrics) -> Value {
    json!({
        "docBytesRead": metrics.doc_bytes_read,
        "docUnitsRead": metrics.doc_units_read,
        "idxEntriesRead": metrics.idx_entries_read,
        "keysSorted": metrics.keys_sorted,
        "docBytesWritten": metrics.doc_bytes_written,
        "docUnitsWritten": metrics.doc_units_written,
        "docUnitsReturned": metrics.doc_units_returned,
        "cpuMillis": metrics.cpu_millis,
    })
}

/// Serializes `metrics` to compact JSON with a fixed field order.
pub fn render(metrics: &OperationMetrics) -> Result<String> {
    Ok(serde_json::to_string(metrics)?)
}

/// Builds the profiler entry for a completed operation.
///
/// Operations that ran with measurement disabled carry no `operationMetrics`
/// field, or an empty object when `empty_when_disabled` is set.
pub fn profile_entry(record: &OperationRecord, empty_when_disabled: bool) -> Value {
    let mut entry = Map::new();
    entry.insert("op".into(), Value::from(record.kind.as_str()));
    if let Some(ns) = &record.namespace {
        entry.insert("ns".into(), Value::from(ns.to_string()));
    }
    entry.insert("command".into(), record.command.clone());
    entry.insert("millis".into(), Value::from(duration_millis(record.duration)));
    match &record.metrics {
        Some(metrics) => {
            entry.insert(OPERATION_METRICS_KEY.into(), to_profile_document(metrics));
        }
        None if empty_when_disabled => {
            entry.insert(OPERATION_METRICS_KEY.into(), Value::Object(Map::new()));
        }
        None => {}
    }
    Value::Object(entry)
}

/// Emits the slow-operation log line when `record` took at least `threshold`.
///
/// The metrics are written exactly as [`render`] produces them. A zero
/// threshold logs every operation. Returns whether a line was emitted.
pub fn log_slow_operation(record: &OperationRecord, threshold: Duration) -> bool {
    if record.duration < threshold {
        return false;
    }
    let metrics = record
        .metrics
        .as_ref()
        .and_then(|metrics| render(metrics).ok());
    info!(
        id = SLOW_OPERATION_LOG_ID,
        op = record.kind.as_str(),
        ns = record.namespace.as_ref().map(|ns| ns.to_string()),
        command = %record.command,
        duration_ms = duration_millis(record.duration),
        operationMetrics = metrics.as_deref().map(display),
        "metering.slow_op"
    );
    true
}

fn duration_millis(duration: Duration) -> u64 {
    duration.as_millis().min(u64::MAX as u128) as u64
}
