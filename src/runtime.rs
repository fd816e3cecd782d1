//! Process-scoped state: toggle, totals and profiler sink.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::info;

use crate::aggregate::{DatabaseAggregator, DatabaseMetrics};
use crate::config::MeteringConfig;
use crate::error::Result;
use crate::operation::{MeteredOperation, Namespace, OperationKind, OperationRecord};
use crate::profiler::{default_sink, ProfileSink};
use crate::report;
use crate::units::UnitSize;

/// Process-scoped handle to the accounting subsystem.
///
/// Created once at process start with [`Metering::start`] and cloned into
/// whatever opens operations. Clones share the toggle, the per-database
/// totals and the profiler sink.
#[derive(Clone)]
pub struct Metering {
    inner: Arc<Inner>,
}

struct Inner {
    enabled: AtomicBool,
    unit_size: UnitSize,
    slow_op_threshold: Duration,
    empty_document_when_disabled: bool,
    aggregator: DatabaseAggregator,
    sink: Arc<dyn ProfileSink>,
}

impl Metering {
    /// Starts the subsystem with a sink that discards profiler entries.
    pub fn start(config: &MeteringConfig) -> Result<Self> {
        Self::with_sink(config, default_sink())
    }

    /// Starts the subsystem, delivering profiler entries to `sink`.
    pub fn with_sink(config: &MeteringConfig, sink: Arc<dyn ProfileSink>) -> Result<Self> {
        config.validate()?;
        let metering = Self {
            inner: Arc::new(Inner {
                enabled: AtomicBool::new(config.measure_operation_resource_consumption),
                unit_size: config.unit_size(),
                slow_op_threshold: config.slow_op_threshold(),
                empty_document_when_disabled: config.empty_document_when_disabled,
                aggregator: DatabaseAggregator::new(),
                sink,
            }),
        };
        info!(
            enabled = config.measure_operation_resource_consumption,
            unit_size_bytes = config.document_unit_size_bytes,
            slow_op_threshold_ms = config.slow_op_threshold_ms,
            "metering.start"
        );
        Ok(metering)
    }

    /// Stops measuring new operations and returns the final per-database totals.
    pub fn shutdown(&self) -> Vec<DatabaseMetrics> {
        self.inner.enabled.store(false, Ordering::Release);
        let totals = self.inner.aggregator.snapshot();
        info!(databases = totals.len(), "metering.shutdown");
        totals
    }

    /// Whether newly opened operations are measured.
    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.load(Ordering::Acquire)
    }

    /// Flips the process-wide toggle. Operations already in flight keep the
    /// mode they started with.
    pub fn set_enabled(&self, enabled: bool) {
        let previous = self.inner.enabled.swap(enabled, Ordering::AcqRel);
        if previous != enabled {
            info!(enabled, "metering.toggle");
        }
    }

    /// Document unit size.
    pub fn unit_size(&self) -> UnitSize {
        self.inner.unit_size
    }

    /// Per-database totals.
    pub fn aggregator(&self) -> &DatabaseAggregator {
        &self.inner.aggregator
    }

    /// Opens a logical operation. The toggle is sampled here, once.
    pub fn begin(
        &self,
        kind: OperationKind,
        namespace: Option<Namespace>,
        command: Value,
    ) -> MeteredOperation {
        MeteredOperation::begin(self.clone(), kind, namespace, command)
    }

    /// Profiler entry document for `record` under this configuration.
    pub fn profile_entry(&self, record: &OperationRecord) -> Value {
        report::profile_entry(record, self.inner.empty_document_when_disabled)
    }

    pub(crate) fn publish(&self, record: &OperationRecord) {
        self.inner.sink.record(record);
        report::log_slow_operation(record, self.inner.slow_op_threshold);
    }
}

impl std::fmt::Debug for Metering {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metering")
            .field("enabled", &self.is_enabled())
            .field("unit_size", &self.inner.unit_size)
            .field("slow_op_threshold", &self.inner.slow_op_threshold)
            .field("aggregator", &self.inner.aggregator)
            .finish()
    }
}
