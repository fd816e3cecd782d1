//! Lifecycle of one metered client operation.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::cpu::CpuTimer;
use crate::metrics::OperationMetrics;
use crate::runtime::Metering;
use crate::scope::OperationScope;
use crate::stack::ScopeStack;

/// Classification of a logical operation, used only to file and filter
/// profiler entries. Accounting never branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Generic command (`create`, `aggregate`, `distinct`, `explain`, ...).
    Command,
    /// `find` query.
    Query,
    /// Document insertion.
    Insert,
    /// Document update.
    Update,
    /// Document removal.
    Remove,
    /// Cursor continuation.
    GetMore,
}

impl OperationKind {
    /// Name used in the profiler's `op` field.
    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::Command => "command",
            OperationKind::Query => "query",
            OperationKind::Insert => "insert",
            OperationKind::Update => "update",
            OperationKind::Remove => "remove",
            OperationKind::GetMore => "getmore",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target of an operation: a database and optionally a collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Namespace {
    database: String,
    collection: Option<String>,
}

impl Namespace {
    /// Namespace for `collection` inside `database`.
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            collection: Some(collection.into()),
        }
    }

    /// Namespace for a database-level command.
    pub fn database_only(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            collection: None,
        }
    }

    /// Parses `db` or `db.collection`. Returns `None` for an empty database.
    pub fn parse(ns: &str) -> Option<Self> {
        let (database, collection) = match ns.split_once('.') {
            Some((db, coll)) => (db, Some(coll)),
            None => (ns, None),
        };
        if database.is_empty() {
            return None;
        }
        Some(Self {
            database: database.to_string(),
            collection: collection.filter(|c| !c.is_empty()).map(str::to_string),
        })
    }

    /// Database name.
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Collection name, if any.
    pub fn collection(&self) -> Option<&str> {
        self.collection.as_deref()
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.collection {
            Some(coll) => write!(f, "{}.{}", self.database, coll),
            None => f.write_str(&self.database),
        }
    }
}

/// What the profiler receives for one completed operation.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRecord {
    /// Operation classification.
    pub kind: OperationKind,
    /// Target namespace, if the command has one.
    pub namespace: Option<Namespace>,
    /// The command document as issued by the client.
    pub command: Value,
    /// Wall-clock latency.
    pub duration: Duration,
    /// Finalized metrics, `None` when measurement was disabled.
    pub metrics: Option<OperationMetrics>,
}

/// One logical operation in flight.
///
/// Owns the operation's [`ScopeStack`]; storage code records into it through
/// `Deref`. [`finish`](Self::finish) finalizes, merges into the per-database
/// totals and hands the record to the profiler. Dropping an unfinished
/// operation still finalizes and merges whatever was recorded, but produces
/// no profiler entry.
///
/// CPU time is measured per thread. An operation moved to another thread
/// should be detached before the move and attached after it; otherwise the
/// stretch spent away from the starting thread is charged as wall-clock time.
pub struct MeteredOperation {
    metering: Metering,
    kind: OperationKind,
    namespace: Option<Namespace>,
    command: Value,
    stack: ScopeStack,
    cpu: Option<CpuTimer>,
    started: Instant,
    done: bool,
}

impl MeteredOperation {
    pub(crate) fn begin(
        metering: Metering,
        kind: OperationKind,
        namespace: Option<Namespace>,
        command: Value,
    ) -> Self {
        let enabled = metering.is_enabled();
        let mut root = OperationScope::new(enabled);
        if let Some(ns) = namespace.as_ref().filter(|_| enabled) {
            root = root.with_database(ns.database());
        }
        let stack = ScopeStack::new(root, metering.unit_size());
        Self {
            metering,
            kind,
            namespace,
            command,
            stack,
            cpu: enabled.then(CpuTimer::start),
            started: Instant::now(),
            done: false,
        }
    }

    /// Operation classification.
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Target namespace.
    pub fn namespace(&self) -> Option<&Namespace> {
        self.namespace.as_ref()
    }

    /// Whether this operation measures anything.
    pub fn is_enabled(&self) -> bool {
        self.stack.is_enabled()
    }

    /// Stops charging CPU time to this operation on the current thread.
    ///
    /// Call before handing the operation to another thread, then
    /// [`attach_thread`](Self::attach_thread) on the receiving one.
    pub fn detach_thread(&mut self) {
        if let Some(cpu) = self.cpu.as_mut() {
            cpu.detach();
        }
    }

    /// Resumes charging CPU time on the current thread.
    pub fn attach_thread(&mut self) {
        if let Some(cpu) = self.cpu.as_mut() {
            cpu.attach();
        }
    }

    /// Completes the operation and returns its profiler record.
    pub fn finish(mut self) -> OperationRecord {
        let metrics = self.complete();
        let record = OperationRecord {
            kind: self.kind,
            namespace: self.namespace.take(),
            command: std::mem::take(&mut self.command),
            duration: self.started.elapsed(),
            metrics,
        };
        self.metering.publish(&record);
        record
    }

    fn complete(&mut self) -> Option<OperationMetrics> {
        self.done = true;
        if !self.stack.is_enabled() {
            return None;
        }
        while self.stack.depth() > 1 {
            self.stack.pop();
        }
        if let Some(cpu) = self.cpu.take() {
            self.stack.record_cpu(cpu.elapsed());
        }
        let metrics = self.stack.finalize();
        if let Some(database) = self.stack.root().database() {
            self.metering.aggregator().merge(database, &metrics);
        }
        Some(metrics)
    }
}

impl Deref for MeteredOperation {
    type Target = ScopeStack;

    fn deref(&self) -> &Self::Target {
        &self.stack
    }
}

impl DerefMut for MeteredOperation {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.stack
    }
}

impl Drop for MeteredOperation {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        let metrics = self.complete();
        debug!(
            op = self.kind.as_str(),
            ns = self.namespace.as_ref().map(|ns| ns.to_string()),
            doc_bytes_read = metrics.map(|m| m.doc_bytes_read),
            "metering.operation.abandoned"
        );
    }
}

impl fmt::Debug for MeteredOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeteredOperation")
            .field("kind", &self.kind)
            .field("namespace", &self.namespace)
            .field("stack", &self.stack)
            .field("done", &self.done)
            .finish()
    }
}
