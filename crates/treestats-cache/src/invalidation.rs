use crate::aggregator::StatsAggregator;
use crate::keys::stat_cache_key;
use std::collections::HashSet;
use tracing::debug;
use treestats_core::{ActionRecord, Result, StatKind, TreeNode};

impl StatsAggregator {
    /// Stages statistics for deletion on `node`. Set-union semantics:
    /// flagging a statistic twice is the same as flagging it once.
    pub fn flag_for_deletion(&self, node: &dyn TreeNode, stats: &[StatKind]) {
        self.pending
            .entry(node.cache_key())
            .or_default()
            .extend(stats.iter().copied());
    }

    /// Drains `node`'s staged statistics and deletes their cache entries.
    ///
    /// With `parents`, the same statistic set is also deleted on every
    /// ancestor, walking up until nodes with no parents; with `children`,
    /// it is deleted downward through the whole subtree instead. Shared
    /// ancestors in a diamond-shaped DAG are visited once per path;
    /// deletion is idempotent, so the repeat is redundant work, not a
    /// correctness problem. Evicted entries are recomputed lazily on the
    /// next read.
    pub fn clear_flagged_cache(
        &self,
        node: &dyn TreeNode,
        parents: bool,
        children: bool,
    ) -> Result<()> {
        let flagged = self
            .pending
            .remove(&node.cache_key())
            .map(|(_, stats)| stats)
            .unwrap_or_default();
        self.delete_entries(node, &flagged, parents, children)
    }

    /// Flags every statistic and clears them in one call.
    pub fn clear_all_cache(&self, node: &dyn TreeNode, children: bool, parents: bool) -> Result<()> {
        self.flag_for_deletion(node, &StatKind::ALL);
        self.clear_flagged_cache(node, parents, children)
    }

    fn delete_entries(
        &self,
        node: &dyn TreeNode,
        stats: &HashSet<StatKind>,
        parents: bool,
        children: bool,
    ) -> Result<()> {
        let item_key = node.cache_key();
        for stat in stats {
            self.store.delete(&stat_cache_key(&item_key, *stat))?;
        }
        if !stats.is_empty() {
            let names: Vec<&str> = stats.iter().map(StatKind::as_str).collect();
            debug!("{:?} deleted from {} cache", names, item_key);
        }

        if parents {
            for parent in node.parents() {
                self.delete_entries(parent.as_ref(), stats, true, false)?;
            }
        }
        if children {
            for child in self.children_of(node).iter() {
                self.delete_entries(child.as_ref(), stats, false, true)?;
            }
        }
        Ok(())
    }

    /// Eager-write fast path for a brand-new action.
    ///
    /// Writes the action straight into `node`'s `last_action` entry,
    /// bypassing the combine rule, then pushes it to every ancestor whose
    /// cached entry is absent or carries an earlier `mtime`. An ancestor
    /// already holding something newer stops the walk on that path, so
    /// the common "latest edit" case costs one write per stale ancestor
    /// instead of a subtree recompute.
    pub fn set_last_action(&self, node: &dyn TreeNode, action: &ActionRecord) -> Result<()> {
        self.write_entry(&stat_cache_key(&node.cache_key(), StatKind::LastAction), action)?;

        for parent in node.parents() {
            let cached: Option<ActionRecord> =
                self.read_entry(&stat_cache_key(&parent.cache_key(), StatKind::LastAction))?;
            let stale = match &cached {
                Some(existing) => existing.mtime < action.mtime,
                None => true,
            };
            if stale {
                self.set_last_action(parent.as_ref(), action)?;
            }
        }
        Ok(())
    }
}
