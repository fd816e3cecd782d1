//! Interface to the profiling store.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{Map, Value};

use crate::operation::{Namespace, OperationKind, OperationRecord};

/// Destination for completed operations, the profiling store.
///
/// Exactly one record is delivered per logical operation, cursor
/// continuations included.
pub trait ProfileSink: Send + Sync {
    /// Stores the record of a completed operation.
    fn record(&self, record: &OperationRecord);
}

/// A [`ProfileSink`] that discards every record.
#[derive(Debug, Default)]
pub struct NoopProfileSink;

impl ProfileSink for NoopProfileSink {
    fn record(&self, _record: &OperationRecord) {}
}

/// Selects profiler entries by operation kind, namespace and command shape.
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    kind: Option<OperationKind>,
    namespace: Option<Namespace>,
    command: Map<String, Value>,
}

impl EntryFilter {
    /// Matches every entry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to one operation kind.
    pub fn kind(mut self, kind: OperationKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Restricts to one namespace.
    pub fn namespace(mut self, namespace: Namespace) -> Self {
        self.namespace = Some(namespace);
        self
    }

    /// Requires the command's top-level `field` to equal `value` exactly.
    pub fn command_field(mut self, field: impl Into<String>, value: Value) -> Self {
        self.command.insert(field.into(), value);
        self
    }

    /// Whether `record` satisfies every condition.
    pub fn matches(&self, record: &OperationRecord) -> bool {
        if self.kind.is_some_and(|kind| kind != record.kind) {
            return false;
        }
        if let Some(namespace) = &self.namespace {
            if record.namespace.as_ref() != Some(namespace) {
                return false;
            }
        }
        self.command
            .iter()
            .all(|(field, expected)| record.command.get(field) == Some(expected))
    }
}

/// In-memory profiling store, in arrival order.
#[derive(Debug, Default)]
pub struct MemoryProfileSink {
    entries: Mutex<Vec<OperationRecord>>,
}

impl MemoryProfileSink {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries matching `filter`, oldest first.
    pub fn find(&self, filter: &EntryFilter) -> Vec<OperationRecord> {
        self.entries
            .lock()
            .iter()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect()
    }

    /// Every stored entry, oldest first.
    pub fn entries(&self) -> Vec<OperationRecord> {
        self.entries.lock().clone()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drops every stored entry.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl ProfileSink for MemoryProfileSink {
    fn record(&self, record: &OperationRecord) {
        self.entries.lock().push(record.clone());
    }
}

/// Returns the default sink, which discards everything.
pub fn default_sink() -> Arc<dyn ProfileSink> {
    Arc::new(NoopProfileSink)
}
