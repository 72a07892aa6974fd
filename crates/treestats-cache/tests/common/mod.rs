#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use treestats_core::{ActionRecord, CheckTally, Timestamp, TreeNode, UpdateRecord};

pub fn ts(secs: i64) -> Timestamp {
    Utc.timestamp_opt(secs, 0).unwrap()
}

pub fn action(id: u64, mtime_secs: i64) -> ActionRecord {
    ActionRecord {
        id,
        mtime: ts(mtime_secs),
        snippet: format!("action {}", id),
    }
}

/// Tree fixture with settable raw statistics and invocation counters.
///
/// Parents are held weakly so diamond-shaped graphs can be built without
/// reference cycles.
pub struct TestNode {
    key: String,
    total: AtomicU64,
    translated: AtomicU64,
    fuzzy: AtomicU64,
    suggestions: AtomicU64,
    checks: RwLock<CheckTally>,
    last_action: RwLock<ActionRecord>,
    mtime: RwLock<Timestamp>,
    last_updated: RwLock<UpdateRecord>,
    children: RwLock<Vec<Arc<TestNode>>>,
    parents: RwLock<Vec<Weak<TestNode>>>,
    pub children_calls: AtomicUsize,
    pub raw_reads: AtomicUsize,
}

impl TestNode {
    pub fn new(key: &str) -> Arc<TestNode> {
        Arc::new(TestNode {
            key: key.to_string(),
            total: AtomicU64::new(0),
            translated: AtomicU64::new(0),
            fuzzy: AtomicU64::new(0),
            suggestions: AtomicU64::new(0),
            checks: RwLock::new(CheckTally::default()),
            last_action: RwLock::new(ActionRecord::default()),
            mtime: RwLock::new(treestats_core::timestamp_min()),
            last_updated: RwLock::new(UpdateRecord::default()),
            children: RwLock::new(Vec::new()),
            parents: RwLock::new(Vec::new()),
            children_calls: AtomicUsize::new(0),
            raw_reads: AtomicUsize::new(0),
        })
    }

    pub fn attach(parent: &Arc<TestNode>, child: &Arc<TestNode>) {
        parent.children.write().push(child.clone());
        child.parents.write().push(Arc::downgrade(parent));
    }

    pub fn set_total(&self, value: u64) {
        self.total.store(value, Ordering::SeqCst);
    }

    pub fn set_translated(&self, value: u64) {
        self.translated.store(value, Ordering::SeqCst);
    }

    pub fn set_fuzzy(&self, value: u64) {
        self.fuzzy.store(value, Ordering::SeqCst);
    }

    pub fn set_suggestions(&self, value: u64) {
        self.suggestions.store(value, Ordering::SeqCst);
    }

    pub fn set_checks(&self, tally: CheckTally) {
        *self.checks.write() = tally;
    }

    pub fn set_last_action(&self, record: ActionRecord) {
        *self.last_action.write() = record;
    }

    pub fn set_mtime(&self, value: Timestamp) {
        *self.mtime.write() = value;
    }

    pub fn set_last_updated(&self, record: UpdateRecord) {
        *self.last_updated.write() = record;
    }
}

impl TreeNode for TestNode {
    fn cache_key(&self) -> String {
        self.key.clone()
    }

    fn children(&self) -> Vec<Arc<dyn TreeNode>> {
        self.children_calls.fetch_add(1, Ordering::SeqCst);
        self.children
            .read()
            .iter()
            .map(|child| child.clone() as Arc<dyn TreeNode>)
            .collect()
    }

    fn parents(&self) -> Vec<Arc<dyn TreeNode>> {
        self.parents
            .read()
            .iter()
            .filter_map(Weak::upgrade)
            .map(|parent| parent as Arc<dyn TreeNode>)
            .collect()
    }

    fn own_total_wordcount(&self) -> u64 {
        self.raw_reads.fetch_add(1, Ordering::SeqCst);
        self.total.load(Ordering::SeqCst)
    }

    fn own_translated_wordcount(&self) -> u64 {
        self.translated.load(Ordering::SeqCst)
    }

    fn own_fuzzy_wordcount(&self) -> u64 {
        self.fuzzy.load(Ordering::SeqCst)
    }

    fn own_suggestion_count(&self) -> u64 {
        self.suggestions.load(Ordering::SeqCst)
    }

    fn own_checks(&self) -> CheckTally {
        self.checks.read().clone()
    }

    fn own_last_action(&self) -> ActionRecord {
        self.last_action.read().clone()
    }

    fn own_mtime(&self) -> Timestamp {
        *self.mtime.read()
    }

    fn own_last_updated(&self) -> UpdateRecord {
        self.last_updated.read().clone()
    }
}
