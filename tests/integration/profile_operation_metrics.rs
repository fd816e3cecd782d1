#![allow(missing_docs)]

//! Drives a small in-memory document collection through the accounting core
//! the way a server's command layer would, then checks the profiler entry of
//! each operation.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::io;
use std::sync::Arc;

use opmeter::{
    EntryFilter, MemoryProfileSink, MeteredOperation, Metering, MeteringConfig, Namespace,
    OperationKind, OperationMetrics, OperationRecord, ScopeStack, OPERATION_METRICS_KEY,
};
use parking_lot::Mutex;
use serde_json::{json, Map, Value};

const DB: &str = "profile_operation_metrics";
const COLL: &str = "coll";

fn ns() -> Namespace {
    Namespace::new(DB, COLL)
}

fn encoded_len(doc: &Value) -> u64 {
    serde_json::to_vec(doc).expect("encode document").len() as u64
}

#[derive(Debug, PartialEq)]
enum WriteError {
    DuplicateKey,
}

struct Cursor {
    pending: VecDeque<i64>,
    batch_size: usize,
}

/// A single collection with an `_id` index, an optional unique index on `a`
/// and the catalog entry describing it.
#[derive(Default)]
struct Collection {
    docs: BTreeMap<i64, Value>,
    unique_a: Option<BTreeMap<i64, i64>>,
    next_auto_id: i64,
    catalog: Value,
}

impl Collection {
    fn read_doc(&self, stack: &mut ScopeStack, id: i64) -> Option<&Value> {
        let doc = self.docs.get(&id)?;
        stack.record_doc_read(encoded_len(doc));
        Some(doc)
    }

    fn apply_insert(
        &mut self,
        stack: &mut ScopeStack,
        id: i64,
        doc: &Value,
    ) -> Result<(), WriteError> {
        let a = doc.get("a").and_then(Value::as_i64);
        if let (Some(index), Some(a)) = (self.unique_a.as_mut(), a) {
            // uniqueness check
            stack.record_idx_entries_read(1);
            if index.contains_key(&a) {
                return Err(WriteError::DuplicateKey);
            }
            index.insert(a, id);
        }
        stack.record_doc_written(encoded_len(doc));
        self.docs.insert(id, doc.clone());
        Ok(())
    }

    fn read_catalog(&self, stack: &mut ScopeStack) -> Value {
        stack.record_doc_read(encoded_len(&self.catalog));
        self.catalog.clone()
    }

    fn write_catalog(&mut self, stack: &mut ScopeStack, entry: Value) {
        stack.record_doc_written(encoded_len(&entry));
        self.catalog = entry;
    }

    fn seek_id(&self, stack: &mut ScopeStack, id: i64) -> Option<i64> {
        stack.record_idx_entries_read(1);
        self.docs.contains_key(&id).then_some(id)
    }
}

struct Server {
    metering: Metering,
    sink: Arc<MemoryProfileSink>,
    coll: Collection,
    cursors: HashMap<u64, Cursor>,
    next_cursor: u64,
}

impl Server {
    fn new(enabled: bool) -> Self {
        let sink = Arc::new(MemoryProfileSink::new());
        let config = MeteringConfig {
            measure_operation_resource_consumption: enabled,
            slow_op_threshold_ms: 0,
            ..MeteringConfig::default()
        };
        let metering = Metering::with_sink(&config, sink.clone()).expect("start metering");
        Self {
            metering,
            sink,
            coll: Collection {
                catalog: json!({"name": COLL, "indexes": ["_id_"]}),
                ..Collection::default()
            },
            cursors: HashMap::new(),
            next_cursor: 1,
        }
    }

    fn begin(&self, kind: OperationKind, command: Value) -> MeteredOperation {
        self.metering.begin(kind, Some(ns()), command)
    }

    fn insert(&mut self, mut doc: Value) -> Result<(), WriteError> {
        let mut op = self.begin(
            OperationKind::Insert,
            json!({"insert": COLL, "documents": [doc.clone()]}),
        );
        let id = match doc.get("_id").and_then(Value::as_i64) {
            Some(id) => id,
            None => {
                self.coll.next_auto_id += 1;
                let id = 1_000_000 + self.coll.next_auto_id;
                doc["_id"] = json!(id);
                id
            }
        };
        let result = self.coll.apply_insert(&mut op, id, &doc);
        op.finish();
        result
    }

    fn find_by_id(&mut self, id: i64) -> Option<Value> {
        let mut op = self.begin(
            OperationKind::Query,
            json!({"find": COLL, "filter": {"_id": id}}),
        );
        let found = self
            .coll
            .seek_id(&mut op, id)
            .and_then(|id| self.coll.read_doc(&mut op, id).cloned());
        if let Some(doc) = &found {
            let units = op.unit_size().units(encoded_len(doc));
            op.record_docs_returned(units);
        }
        op.finish();
        found
    }

    /// Collection scan returning the first batch and a cursor id for the rest.
    fn find_all(&mut self, batch_size: usize) -> (Vec<Value>, Option<u64>) {
        let mut op = self.begin(OperationKind::Query, json!({"find": COLL, "filter": {}}));
        let pending: VecDeque<i64> = self.coll.docs.keys().copied().collect();
        let mut cursor = Cursor {
            pending,
            batch_size,
        };
        let batch = self.next_batch(&mut op, &mut cursor);
        op.finish();
        if cursor.pending.is_empty() {
            return (batch, None);
        }
        let cursor_id = self.next_cursor;
        self.next_cursor += 1;
        self.cursors.insert(cursor_id, cursor);
        (batch, Some(cursor_id))
    }

    fn get_more(&mut self, cursor_id: u64) -> Vec<Value> {
        let mut op = self.begin(
            OperationKind::GetMore,
            json!({"getMore": cursor_id, "collection": COLL}),
        );
        let Some(mut cursor) = self.cursors.remove(&cursor_id) else {
            op.finish();
            return Vec::new();
        };
        let batch = self.next_batch(&mut op, &mut cursor);
        op.finish();
        if !cursor.pending.is_empty() {
            self.cursors.insert(cursor_id, cursor);
        }
        batch
    }

    fn next_batch(&self, stack: &mut ScopeStack, cursor: &mut Cursor) -> Vec<Value> {
        let mut batch = Vec::new();
        while batch.len() < cursor.batch_size {
            let Some(id) = cursor.pending.pop_front() else {
                break;
            };
            if let Some(doc) = self.coll.read_doc(stack, id) {
                let units = stack.unit_size().units(encoded_len(doc));
                stack.record_docs_returned(units);
                batch.push(doc.clone());
            }
        }
        batch
    }

    fn count(&mut self) -> u64 {
        let op = self.begin(OperationKind::Command, json!({"count": COLL}));
        let n = self.coll.docs.len() as u64;
        op.finish();
        n
    }

    fn distinct_id(&mut self) -> Vec<i64> {
        let mut op = self.begin(
            OperationKind::Command,
            json!({"distinct": COLL, "key": "_id"}),
        );
        let ids: Vec<i64> = self.coll.docs.keys().copied().collect();
        op.record_idx_entries_read(ids.len() as u64);
        op.finish();
        ids
    }

    fn explain_find(&mut self, execute: bool) {
        let verbosity = if execute {
            "allPlansExecution"
        } else {
            "queryPlanner"
        };
        let mut op = self.begin(
            OperationKind::Command,
            json!({"explain": {"find": COLL, "filter": {}}, "verbosity": verbosity}),
        );
        if execute {
            // the trial run is a nested sub-operation charged to the explain
            let mut trial = op.push();
            let mut cursor = Cursor {
                pending: self.coll.docs.keys().copied().collect(),
                batch_size: usize::MAX,
            };
            self.next_batch(&mut trial, &mut cursor);
        }
        op.finish();
    }

    fn sort_by_a(&mut self) -> Vec<Value> {
        let mut op = self.begin(
            OperationKind::Command,
            json!({"aggregate": COLL, "pipeline": [{"$sort": {"a": 1}}]}),
        );
        let mut cursor = Cursor {
            pending: self.coll.docs.keys().copied().collect(),
            batch_size: usize::MAX,
        };
        let mut docs = self.next_batch(&mut op, &mut cursor);
        op.record_keys_sorted(docs.len() as u64);
        docs.sort_by_key(|doc| doc.get("a").and_then(Value::as_i64));
        op.finish();
        docs
    }

    fn update_by_id(&mut self, id: i64, a: i64) {
        let mut op = self.begin(
            OperationKind::Update,
            json!({"q": {"_id": id}, "u": {"$set": {"a": a}}}),
        );
        if let Some(found) = self.coll.seek_id(&mut op, id) {
            let mut doc = self
                .coll
                .read_doc(&mut op, found)
                .cloned()
                .expect("indexed document exists");
            doc["a"] = json!(a);
            op.record_doc_written(encoded_len(&doc));
            self.coll.docs.insert(found, doc);
        }
        op.finish();
    }

    fn remove_by_id(&mut self, id: i64) -> u64 {
        let mut op = self.begin(OperationKind::Remove, json!({"q": {"_id": id}}));
        let targets: Vec<i64> = self.coll.seek_id(&mut op, id).into_iter().collect();
        let removed = self.remove_located(&mut op, targets);
        op.finish();
        removed
    }

    fn remove_all(&mut self) -> u64 {
        let mut op = self.begin(OperationKind::Remove, json!({"q": {}}));
        let targets: Vec<i64> = self.coll.docs.keys().copied().collect();
        let removed = self.remove_located(&mut op, targets);
        op.finish();
        removed
    }

    /// Locates each target by reading it, then reads it again before removal.
    fn remove_located(&mut self, stack: &mut ScopeStack, targets: Vec<i64>) -> u64 {
        let mut removed = 0;
        for id in targets {
            if self.coll.read_doc(stack, id).is_none() {
                continue;
            }
            {
                let mut delete_stage = stack.push();
                if self.coll.read_doc(&mut delete_stage, id).is_some() {
                    self.coll.docs.remove(&id);
                    removed += 1;
                }
            }
        }
        removed
    }

    /// Read-before-write issued as a command.
    fn find_and_modify(&mut self, id: i64, a: i64) -> Option<Value> {
        let mut op = self.begin(
            OperationKind::Command,
            json!({
                "findAndModify": COLL,
                "query": {"_id": id},
                "update": {"$set": {"a": a}},
            }),
        );
        let before = self
            .coll
            .seek_id(&mut op, id)
            .and_then(|id| self.coll.read_doc(&mut op, id).cloned());
        if let Some(doc) = &before {
            let mut updated = doc.clone();
            updated["a"] = json!(a);
            op.record_doc_written(encoded_len(&updated));
            let units = op.unit_size().units(encoded_len(doc));
            op.record_docs_returned(units);
            self.coll.docs.insert(id, updated);
        }
        op.finish();
        before
    }

    fn aggregate_project_a(&mut self) -> Vec<Value> {
        let mut op = self.begin(
            OperationKind::Command,
            json!({"aggregate": COLL, "pipeline": [{"$project": {"a": 1}}]}),
        );
        let ids: Vec<i64> = self.coll.docs.keys().copied().collect();
        let mut projected = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(doc) = self.coll.read_doc(&mut op, id) {
                let a = doc.get("a").cloned().unwrap_or(Value::Null);
                let out = json!({"_id": id, "a": a});
                let units = op.unit_size().units(encoded_len(&out));
                op.record_docs_returned(units);
                projected.push(out);
            }
        }
        op.finish();
        projected
    }

    /// Catalog commands read the collection's catalog entry and never touch
    /// an index.
    fn catalog_command(&mut self, name: &str) {
        let mut command = Map::new();
        command.insert(name.to_string(), json!(COLL));
        let mut op = self.begin(OperationKind::Command, Value::Object(command));
        let mut entry = self.coll.read_catalog(&mut op);
        match name {
            "create" => {}
            "createIndexes" => {
                if let Some(indexes) = entry["indexes"].as_array_mut() {
                    indexes.push(json!("a_1"));
                }
                self.coll.write_catalog(&mut op, entry);
            }
            "dropIndexes" => {
                entry["indexes"] = json!(["_id_"]);
                self.coll.write_catalog(&mut op, entry);
            }
            "drop" => {
                self.coll.docs.clear();
                self.coll.catalog = Value::Null;
            }
            other => panic!("unknown catalog command {other}"),
        }
        op.finish();
    }

    fn internal_catalog_read(&mut self, bytes: u64) {
        let mut op = self.begin(OperationKind::Command, json!({"listIndexes": COLL}));
        op.record_doc_read(bytes);
        {
            let mut paused = op.pause();
            // bookkeeping reads are not charged to the client operation
            paused.record_doc_read(10_000);
        }
        op.finish();
    }

    fn single(&self, filter: EntryFilter) -> OperationRecord {
        let mut found = self.sink.find(&filter);
        assert_eq!(found.len(), 1, "expected exactly one profiler entry: {found:?}");
        found.remove(0)
    }

    fn metrics(&self, filter: EntryFilter) -> OperationMetrics {
        let record = self.single(filter);
        let metrics = record.metrics.expect("operationMetrics present");
        let doc = self.metering.profile_entry(&record);
        assert!(doc.get(OPERATION_METRICS_KEY).is_some());
        metrics
    }

    fn reset_profile(&self) {
        self.sink.clear();
    }
}

fn seeded() -> (Server, Value) {
    let mut server = Server::new(true);
    let doc = json!({"_id": 1, "a": 0});
    server.insert(doc.clone()).expect("insert");
    (server, doc)
}

#[test]
fn insert_performs_no_reads() {
    let (server, doc) = seeded();
    let metrics = server.metrics(EntryFilter::new().kind(OperationKind::Insert));
    assert_eq!(metrics.doc_bytes_read, 0);
    assert_eq!(metrics.idx_entries_read, 0);
    assert_eq!(metrics.doc_bytes_written, encoded_len(&doc));
    assert_eq!(metrics.doc_units_written, 1);
}

#[test]
fn point_lookup_reads_one_entry_and_one_document() {
    let (mut server, doc) = seeded();
    assert_eq!(server.find_by_id(1), Some(doc.clone()));
    let metrics = server.metrics(
        EntryFilter::new()
            .kind(OperationKind::Query)
            .command_field("filter", json!({"_id": 1})),
    );
    assert_eq!(metrics.doc_bytes_read, encoded_len(&doc));
    assert_eq!(metrics.doc_units_read, 1);
    assert_eq!(metrics.idx_entries_read, 1);
    assert_eq!(metrics.doc_units_returned, 1);
}

#[test]
fn collection_scan_reads_no_index_entries() {
    let (mut server, doc) = seeded();
    let (batch, cursor) = server.find_all(101);
    assert_eq!(batch.len(), 1);
    assert!(cursor.is_none());
    let metrics = server.metrics(
        EntryFilter::new()
            .kind(OperationKind::Query)
            .command_field("filter", json!({})),
    );
    assert_eq!(metrics.doc_bytes_read, encoded_len(&doc));
    assert_eq!(metrics.idx_entries_read, 0);
}

#[test]
fn fast_count_and_distinct_do_not_read_documents() {
    let (mut server, _doc) = seeded();
    assert_eq!(server.count(), 1);
    assert_eq!(server.distinct_id(), vec![1]);

    let count = server.metrics(EntryFilter::new().command_field("count", json!(COLL)));
    assert_eq!(count.doc_bytes_read, 0);
    assert_eq!(count.idx_entries_read, 0);

    let distinct = server.metrics(EntryFilter::new().command_field("distinct", json!(COLL)));
    assert_eq!(distinct.doc_bytes_read, 0);
    assert_eq!(distinct.idx_entries_read, 1);
}

#[test]
fn update_charges_its_read_before_write() {
    let (mut server, doc) = seeded();
    server.update_by_id(1, 2);
    let metrics = server.metrics(EntryFilter::new().kind(OperationKind::Update));
    assert_eq!(metrics.doc_bytes_read, encoded_len(&doc));
    assert_eq!(metrics.idx_entries_read, 1);
    assert_eq!(metrics.doc_bytes_written, encoded_len(&json!({"_id": 1, "a": 2})));
}

#[test]
fn explain_reads_only_when_executing() {
    let (mut server, doc) = seeded();
    server.explain_find(false);
    let planner = server.metrics(EntryFilter::new().kind(OperationKind::Command));
    assert_eq!(planner.doc_bytes_read, 0);
    assert_eq!(planner.idx_entries_read, 0);

    server.reset_profile();
    server.explain_find(true);
    let executed = server.metrics(EntryFilter::new().kind(OperationKind::Command));
    assert_eq!(executed.doc_bytes_read, encoded_len(&doc));
    assert_eq!(executed.idx_entries_read, 0);
}

#[test]
fn get_more_is_accounted_separately() {
    let (mut server, first) = seeded();
    let second = json!({"_id": 2, "a": 2222});
    server.insert(second.clone()).expect("insert");
    server.reset_profile();

    let (batch, cursor) = server.find_all(1);
    assert_eq!(batch, vec![first.clone()]);
    let cursor = cursor.expect("cursor stays open");
    assert_eq!(server.get_more(cursor), vec![second.clone()]);

    let initial = server.metrics(
        EntryFilter::new()
            .kind(OperationKind::Query)
            .command_field("filter", json!({})),
    );
    assert_eq!(initial.doc_bytes_read, encoded_len(&first));

    let continuation = server.metrics(
        EntryFilter::new()
            .kind(OperationKind::GetMore)
            .command_field("collection", json!(COLL)),
    );
    assert_eq!(continuation.doc_bytes_read, encoded_len(&second));
    assert_eq!(continuation.idx_entries_read, 0);
    assert_eq!(continuation.doc_units_returned, 1);
}

#[test]
fn remove_by_id_reads_the_document_twice() {
    let (mut server, doc) = seeded();
    assert_eq!(server.remove_by_id(1), 1);
    let metrics = server.metrics(
        EntryFilter::new()
            .kind(OperationKind::Remove)
            .command_field("q", json!({"_id": 1})),
    );
    assert_eq!(metrics.doc_bytes_read, 2 * encoded_len(&doc));
    assert_eq!(metrics.idx_entries_read, 1);
}

#[test]
fn collection_scan_remove_reads_the_document_twice() {
    let (mut server, doc) = seeded();
    assert_eq!(server.remove_all(), 1);
    let metrics = server.metrics(
        EntryFilter::new()
            .kind(OperationKind::Remove)
            .command_field("q", json!({})),
    );
    assert_eq!(metrics.doc_bytes_read, 2 * encoded_len(&doc));
    assert_eq!(metrics.idx_entries_read, 0);
}

#[test]
fn unique_index_insert_reads_one_key_even_on_failure() {
    let (mut server, _doc) = seeded();
    server.coll.unique_a = Some(BTreeMap::from([(0, 1)]));

    server.reset_profile();
    server.insert(json!({"a": 200})).expect("unique insert");
    let unique = server.metrics(EntryFilter::new().kind(OperationKind::Insert));
    assert_eq!(unique.doc_bytes_read, 0);
    assert_eq!(unique.idx_entries_read, 1);

    server.reset_profile();
    assert_eq!(
        server.insert(json!({"a": 0})),
        Err(WriteError::DuplicateKey)
    );
    let dup = server.metrics(EntryFilter::new().kind(OperationKind::Insert));
    assert_eq!(dup.doc_bytes_read, 0);
    assert_eq!(dup.idx_entries_read, 1);
    assert_eq!(dup.doc_bytes_written, 0);
}

#[test]
fn find_and_modify_reads_before_writing() {
    let (mut server, doc) = seeded();
    assert_eq!(server.find_and_modify(1, 5), Some(doc.clone()));
    let metrics =
        server.metrics(EntryFilter::new().command_field("findAndModify", json!(COLL)));
    assert_eq!(metrics.doc_bytes_read, encoded_len(&doc));
    assert_eq!(metrics.doc_units_read, 1);
    assert_eq!(metrics.idx_entries_read, 1);
    assert_eq!(metrics.doc_bytes_written, encoded_len(&json!({"_id": 1, "a": 5})));
    assert_eq!(metrics.doc_units_returned, 1);
}

#[test]
fn aggregate_projection_scans_without_sorting() {
    let (mut server, doc) = seeded();
    assert_eq!(server.aggregate_project_a(), vec![doc.clone()]);
    let metrics = server.metrics(EntryFilter::new().command_field("aggregate", json!(COLL)));
    assert_eq!(metrics.doc_bytes_read, encoded_len(&doc));
    assert_eq!(metrics.idx_entries_read, 0);
    assert_eq!(metrics.keys_sorted, 0);
    assert_eq!(metrics.doc_units_returned, 1);
}

#[test]
fn catalog_commands_read_the_catalog_but_no_index() {
    let (mut server, _doc) = seeded();
    for name in ["create", "createIndexes", "dropIndexes", "drop"] {
        server.reset_profile();
        server.catalog_command(name);
        let metrics = server.metrics(EntryFilter::new().command_field(name, json!(COLL)));
        assert!(metrics.doc_bytes_read > 0, "{name} read nothing");
        assert_eq!(metrics.idx_entries_read, 0, "{name} read an index");
    }
}

#[test]
fn sort_counts_keys() {
    let (mut server, _doc) = seeded();
    for i in 2..=5 {
        server.insert(json!({"_id": i, "a": -i})).expect("insert");
    }
    let sorted = server.sort_by_a();
    assert_eq!(sorted.first().and_then(|d| d.get("_id")), Some(&json!(5)));
    let metrics = server.metrics(EntryFilter::new().command_field("aggregate", json!(COLL)));
    assert_eq!(metrics.keys_sorted, 5);
    assert!(metrics.doc_bytes_read > 0);
}

#[test]
fn paused_reads_are_not_charged() {
    let (mut server, _doc) = seeded();
    server.internal_catalog_read(42);
    let metrics = server.metrics(EntryFilter::new().command_field("listIndexes", json!(COLL)));
    assert_eq!(metrics.doc_bytes_read, 42);
}

#[test]
fn one_entry_per_logical_operation() {
    let (mut server, _doc) = seeded();
    server.find_by_id(1);
    server.find_by_id(7);
    server.count();
    let entries = server.sink.entries();
    assert_eq!(entries.len(), 4);
    assert!(entries.iter().all(|record| record.metrics.is_some()));
}

#[test]
fn per_database_totals_follow_operations() {
    let (mut server, doc) = seeded();
    server.find_by_id(1);
    server.remove_by_id(1);
    let total = server
        .metering
        .aggregator()
        .get(DB)
        .expect("aggregate for database");
    assert_eq!(total.operations, 3);
    assert_eq!(total.metrics.doc_bytes_read, 3 * encoded_len(&doc));
    assert_eq!(total.metrics.idx_entries_read, 2);
    assert_eq!(total.metrics.doc_bytes_written, encoded_len(&doc));
}

#[test]
fn disabled_metering_produces_no_metrics_document() {
    let mut server = Server::new(false);
    server.insert(json!({"_id": 1, "a": 0})).expect("insert");
    server.find_by_id(1);
    let record = server.single(
        EntryFilter::new()
            .kind(OperationKind::Query)
            .command_field("filter", json!({"_id": 1})),
    );
    assert!(record.metrics.is_none());
    assert!(server
        .metering
        .profile_entry(&record)
        .get(OPERATION_METRICS_KEY)
        .is_none());
    assert!(server.metering.aggregator().is_empty());
}

#[test]
fn disabled_metering_can_emit_empty_document() {
    let sink = Arc::new(MemoryProfileSink::new());
    let config = MeteringConfig {
        empty_document_when_disabled: true,
        ..MeteringConfig::default()
    };
    let metering = Metering::with_sink(&config, sink.clone()).expect("start metering");
    let record = metering
        .begin(OperationKind::Command, Some(ns()), json!({"count": COLL}))
        .finish();
    assert_eq!(metering.profile_entry(&record)[OPERATION_METRICS_KEY], json!({}));
}

#[derive(Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn slow_operation_log_carries_metrics() {
    let log = CapturedLog::default();
    let writer = log.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();

    let (mut server, doc) = seeded();
    tracing::subscriber::with_default(subscriber, || {
        server.find_by_id(1);
    });

    let output = String::from_utf8(log.0.lock().clone()).expect("utf8 log");
    let line = output
        .lines()
        .find(|line| line.contains("metering.slow_op") && line.contains("find"))
        .expect("slow operation line for find");
    assert!(line.contains("51803"));
    assert!(line.contains("docBytesRead"));
    assert!(line.contains(&encoded_len(&doc).to_string()));
}
