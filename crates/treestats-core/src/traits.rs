use crate::{timestamp_min, ActionRecord, CheckTally, Timestamp, UpdateRecord};
use std::sync::Arc;

/// Capability set of one entity in the statistics tree.
///
/// `cache_key`, `children` and `parents` are required. Every raw
/// statistic producer defaults to its zero value, so concrete node types
/// only override the contributions they actually have. Edges may form a
/// DAG (a node can have several parents) but must stay acyclic.
pub trait TreeNode: Send + Sync {
    /// Unique key namespacing this node's cache entries.
    fn cache_key(&self) -> String;

    /// Short code identifying the node among its siblings in snapshots.
    fn code(&self) -> String {
        self.cache_key()
    }

    /// Direct children, in display order. Leaf nodes return an empty
    /// list.
    fn children(&self) -> Vec<Arc<dyn TreeNode>>;

    /// Direct parents, walked during upward invalidation. Root nodes
    /// return an empty list.
    fn parents(&self) -> Vec<Arc<dyn TreeNode>>;

    /// This node's own wordcount, children excluded.
    fn own_total_wordcount(&self) -> u64 {
        0
    }

    fn own_translated_wordcount(&self) -> u64 {
        0
    }

    fn own_fuzzy_wordcount(&self) -> u64 {
        0
    }

    fn own_suggestion_count(&self) -> u64 {
        0
    }

    fn own_checks(&self) -> CheckTally {
        CheckTally::default()
    }

    fn own_last_action(&self) -> ActionRecord {
        ActionRecord::default()
    }

    fn own_mtime(&self) -> Timestamp {
        timestamp_min()
    }

    fn own_last_updated(&self) -> UpdateRecord {
        UpdateRecord::default()
    }
}
