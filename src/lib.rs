//! Per-operation resource-consumption accounting.
//!
//! Every client operation accumulates how much storage work it performed
//! (document bytes and units read and written, index entries read, keys
//! sorted, document units returned, CPU time) into an [`OperationScope`].
//! Nested sub-tasks push child scopes on the operation's [`ScopeStack`] and
//! fold into their parent when popped. Finalized totals are merged into the
//! process-wide [`DatabaseAggregator`] and rendered as the `operationMetrics`
//! document attached to profiler entries and slow-operation log lines.
//!
//! ```
//! use opmeter::{Metering, MeteringConfig, Namespace, OperationKind};
//! use serde_json::json;
//!
//! let metering = Metering::start(&MeteringConfig::enabled()).unwrap();
//! let mut op = metering.begin(
//!     OperationKind::Query,
//!     Some(Namespace::new("test", "coll")),
//!     json!({"find": "coll", "filter": {"_id": 1}}),
//! );
//! op.record_idx_entries_read(1);
//! op.record_doc_read(29);
//! let record = op.finish();
//! assert_eq!(record.metrics.unwrap().doc_bytes_read, 29);
//! ```

#![warn(missing_docs)]

pub mod aggregate;
pub mod config;
pub mod cpu;
pub mod error;
pub mod metrics;
pub mod operation;
pub mod profiler;
pub mod report;
pub mod runtime;
pub mod scope;
pub mod stack;
pub mod units;

pub use aggregate::{DatabaseAggregator, DatabaseMetrics};
pub use config::MeteringConfig;
pub use error::{MeteringError, Result};
pub use metrics::OperationMetrics;
pub use operation::{MeteredOperation, Namespace, OperationKind, OperationRecord};
pub use profiler::{EntryFilter, MemoryProfileSink, NoopProfileSink, ProfileSink};
pub use report::{to_profile_document, OPERATION_METRICS_KEY};
pub use runtime::Metering;
pub use scope::OperationScope;
pub use stack::{ChildScope, PauseGuard, ScopeStack};
pub use units::{bytes_to_units, UnitSize};
