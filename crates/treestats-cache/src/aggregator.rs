use crate::keys::stat_cache_key;
use crate::observer::StatsObserver;
use crate::store::CacheStore;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use treestats_core::{
    ActionRecord, CheckTally, Result, StatKind, StatsSnapshot, Timestamp, TreeNode, UpdateRecord,
};

/// Hierarchical statistics engine.
///
/// Combines each node's raw contribution with its children's aggregates
/// and result-caches per node per statistic in the injected store. Reads
/// are lazy: a cold entry triggers a recursive recompute over the
/// subtree, bounded by cache hits wherever a descendant is already warm.
/// A cache entry, when present, always equals a from-scratch
/// recomputation; invalidation removes entries, it never corrects them.
pub struct StatsAggregator {
    pub(crate) store: Arc<dyn CacheStore>,
    observer: Option<Arc<dyn StatsObserver>>,
    /// Memoized tree shape, one child list per item key for the lifetime
    /// of the engine. Statistic values are invalidated separately; the
    /// shape is not.
    children: DashMap<String, Arc<Vec<Arc<dyn TreeNode>>>>,
    /// Statistics staged for deletion, per item key.
    pub(crate) pending: DashMap<String, HashSet<StatKind>>,
}

impl StatsAggregator {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            observer: None,
            children: DashMap::new(),
            pending: DashMap::new(),
        }
    }

    /// Engine with an observability hook notified after each cold-cache
    /// computation.
    pub fn with_observer(store: Arc<dyn CacheStore>, observer: Arc<dyn StatsObserver>) -> Self {
        Self {
            store,
            observer: Some(observer),
            children: DashMap::new(),
            pending: DashMap::new(),
        }
    }

    /// Materializes `node`'s child list exactly once per engine lifetime.
    /// Later calls return the memoized list without touching the
    /// navigator again; the map entry lock serializes a concurrent first
    /// initialization.
    pub(crate) fn children_of(&self, node: &dyn TreeNode) -> Arc<Vec<Arc<dyn TreeNode>>> {
        self.children
            .entry(node.cache_key())
            .or_insert_with(|| Arc::new(node.children()))
            .clone()
    }

    pub(crate) fn read_entry<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.store.get(key)? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub(crate) fn write_entry<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.store.set(key, serde_json::to_value(value)?)
    }

    /// Cache-aside wrapper shared by every getter: probe the store, and
    /// on a miss materialize children, run the combine closure, then
    /// persist and report the result. A failing child computation fails
    /// the whole call; no partial aggregate is ever stored.
    fn cached<T, F>(&self, node: &dyn TreeNode, stat: StatKind, combine: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&[Arc<dyn TreeNode>]) -> Result<T>,
    {
        let item_key = node.cache_key();
        let entry_key = stat_cache_key(&item_key, stat);
        if let Some(value) = self.read_entry(&entry_key)? {
            return Ok(value);
        }

        let children = self.children_of(node);
        let started = Instant::now();
        let value = combine(&children)?;
        self.write_entry(&entry_key, &value)?;
        if let Some(observer) = &self.observer {
            observer.record(stat, &item_key, started.elapsed());
        }
        Ok(value)
    }

    /// Total wordcount of the node and every descendant.
    pub fn total_wordcount(&self, node: &dyn TreeNode) -> Result<u64> {
        self.cached(node, StatKind::TotalWordcount, |children| {
            let mut total = node.own_total_wordcount();
            for child in children {
                total += self.total_wordcount(child.as_ref())?;
            }
            Ok(total)
        })
    }

    /// Translated wordcount of the node and every descendant.
    pub fn translated_wordcount(&self, node: &dyn TreeNode) -> Result<u64> {
        self.cached(node, StatKind::TranslatedWordcount, |children| {
            let mut total = node.own_translated_wordcount();
            for child in children {
                total += self.translated_wordcount(child.as_ref())?;
            }
            Ok(total)
        })
    }

    /// Fuzzy wordcount of the node and every descendant.
    pub fn fuzzy_wordcount(&self, node: &dyn TreeNode) -> Result<u64> {
        self.cached(node, StatKind::FuzzyWordcount, |children| {
            let mut total = node.own_fuzzy_wordcount();
            for child in children {
                total += self.fuzzy_wordcount(child.as_ref())?;
            }
            Ok(total)
        })
    }

    /// Pending suggestions across the node and every descendant.
    pub fn suggestion_count(&self, node: &dyn TreeNode) -> Result<u64> {
        self.cached(node, StatKind::SuggestionCount, |children| {
            let mut total = node.own_suggestion_count();
            for child in children {
                total += self.suggestion_count(child.as_ref())?;
            }
            Ok(total)
        })
    }

    /// Most recent action in the subtree, ordered by `mtime`. The first
    /// maximal record wins a tie: own contribution first, then children
    /// in order.
    pub fn last_action(&self, node: &dyn TreeNode) -> Result<ActionRecord> {
        self.cached(node, StatKind::LastAction, |children| {
            let mut latest = node.own_last_action();
            for child in children {
                let candidate = self.last_action(child.as_ref())?;
                if candidate.mtime > latest.mtime {
                    latest = candidate;
                }
            }
            Ok(latest)
        })
    }

    /// Latest modification time across the subtree.
    pub fn mtime(&self, node: &dyn TreeNode) -> Result<Timestamp> {
        self.cached(node, StatKind::Mtime, |children| {
            let mut latest = node.own_mtime();
            for child in children {
                latest = latest.max(self.mtime(child.as_ref())?);
            }
            Ok(latest)
        })
    }

    /// Most recently created unit in the subtree, ordered by
    /// `creation_time`.
    pub fn last_updated(&self, node: &dyn TreeNode) -> Result<UpdateRecord> {
        self.cached(node, StatKind::LastUpdated, |children| {
            let mut latest = node.own_last_updated();
            for child in children {
                let candidate = self.last_updated(child.as_ref())?;
                if candidate.creation_time > latest.creation_time {
                    latest = candidate;
                }
            }
            Ok(latest)
        })
    }

    /// Quality-check tallies summed over the subtree.
    pub fn checks(&self, node: &dyn TreeNode) -> Result<CheckTally> {
        self.cached(node, StatKind::Checks, |children| {
            let mut tally = node.own_checks();
            for child in children {
                tally.absorb(&self.checks(child.as_ref())?);
            }
            Ok(tally)
        })
    }

    /// Count of units with failing checks, derived from [`Self::checks`].
    pub fn error_unit_count(&self, node: &dyn TreeNode) -> Result<u64> {
        Ok(self.checks(node)?.unit_count)
    }

    /// Snapshot of every statistic on `node`. With `include_children`,
    /// adds exactly one generation: each immediate child's own snapshot
    /// keyed by its code, children-of-children excluded.
    pub fn stats(&self, node: &dyn TreeNode, include_children: bool) -> Result<StatsSnapshot> {
        let checks = self.checks(node)?;
        let mut snapshot = StatsSnapshot {
            total: self.total_wordcount(node)?,
            translated: self.translated_wordcount(node)?,
            fuzzy: self.fuzzy_wordcount(node)?,
            suggestions: self.suggestion_count(node)?,
            last_action: self.last_action(node)?,
            mtime: self.mtime(node)?,
            last_updated: self.last_updated(node)?,
            critical: checks.unit_count,
            checks,
            children: None,
        };

        if include_children {
            let mut per_child = HashMap::new();
            for child in self.children_of(node).iter() {
                per_child.insert(child.code(), self.stats(child.as_ref(), false)?);
            }
            snapshot.children = Some(per_child);
        }

        Ok(snapshot)
    }

    /// Recomputes every statistic from current raw data.
    ///
    /// Children are refreshed first when `include_children` is set, then
    /// this node's own entries are dropped and re-read, so each node in
    /// the walk is cleared and recomputed exactly once, children before
    /// parents. No upward propagation happens here; ancestors outside the
    /// refreshed subtree are the caller's responsibility via
    /// [`Self::clear_flagged_cache`].
    pub fn refresh_stats(&self, node: &dyn TreeNode, include_children: bool) -> Result<()> {
        if include_children {
            for child in self.children_of(node).iter() {
                self.refresh_stats(child.as_ref(), true)?;
            }
        }

        self.flag_for_deletion(node, &StatKind::ALL);
        self.clear_flagged_cache(node, false, false)?;

        self.total_wordcount(node)?;
        self.translated_wordcount(node)?;
        self.fuzzy_wordcount(node)?;
        self.suggestion_count(node)?;
        self.last_action(node)?;
        self.checks(node)?;
        self.mtime(node)?;
        self.last_updated(node)?;
        Ok(())
    }
}
