use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Wall-clock instant attached to actions and modification metadata.
pub type Timestamp = DateTime<Utc>;

/// Zero value for timestamps: the epoch. Records whose sort field was
/// absent in the serialized form decode to this and sort below every
/// real modification time.
pub fn timestamp_min() -> Timestamp {
    DateTime::<Utc>::UNIX_EPOCH
}

/// The statistics the engine aggregates and caches, one cache entry per
/// node per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatKind {
    TotalWordcount,
    TranslatedWordcount,
    FuzzyWordcount,
    SuggestionCount,
    LastAction,
    Mtime,
    LastUpdated,
    Checks,
}

impl StatKind {
    /// Every cached statistic. Flagging all of these clears a node
    /// completely.
    pub const ALL: [StatKind; 8] = [
        StatKind::TotalWordcount,
        StatKind::TranslatedWordcount,
        StatKind::FuzzyWordcount,
        StatKind::SuggestionCount,
        StatKind::LastAction,
        StatKind::Mtime,
        StatKind::LastUpdated,
        StatKind::Checks,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatKind::TotalWordcount => "total_wordcount",
            StatKind::TranslatedWordcount => "translated_wordcount",
            StatKind::FuzzyWordcount => "fuzzy_wordcount",
            StatKind::SuggestionCount => "suggestion_count",
            StatKind::LastAction => "last_action",
            StatKind::Mtime => "mtime",
            StatKind::LastUpdated => "last_updated",
            StatKind::Checks => "checks",
        }
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Most recent edit in a subtree, ordered by `mtime`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub id: u64,
    #[serde(default = "timestamp_min")]
    pub mtime: Timestamp,
    pub snippet: String,
}

impl Default for ActionRecord {
    fn default() -> Self {
        Self {
            id: 0,
            mtime: timestamp_min(),
            snippet: String::new(),
        }
    }
}

/// Most recently created unit in a subtree, ordered by `creation_time`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRecord {
    pub id: u64,
    #[serde(default = "timestamp_min")]
    pub creation_time: Timestamp,
    pub snippet: String,
}

impl Default for UpdateRecord {
    fn default() -> Self {
        Self {
            id: 0,
            creation_time: timestamp_min(),
            snippet: String::new(),
        }
    }
}

/// Quality-check totals: units carrying failures plus per-category counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckTally {
    pub unit_count: u64,
    pub checks: HashMap<String, u64>,
}

impl CheckTally {
    /// Merges another tally into this one. Counts sum key-wise; a
    /// category absent on either side counts as zero.
    pub fn absorb(&mut self, other: &CheckTally) {
        self.unit_count += other.unit_count;
        for (category, count) in &other.checks {
            *self.checks.entry(category.clone()).or_insert(0) += count;
        }
    }
}

/// Point-in-time view of every statistic on one node.
///
/// `children` carries exactly one extra generation when requested, never
/// more, so the snapshot size stays bounded by the immediate fan-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total: u64,
    pub translated: u64,
    pub fuzzy: u64,
    pub suggestions: u64,
    pub last_action: ActionRecord,
    pub mtime: Timestamp,
    pub last_updated: UpdateRecord,
    pub checks: CheckTally,
    /// Count of units with failing checks, derived from `checks`.
    pub critical: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<HashMap<String, StatsSnapshot>>,
}
