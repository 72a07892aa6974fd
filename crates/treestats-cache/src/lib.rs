pub mod aggregator;
pub mod keys;
pub mod observer;
pub mod store;

mod invalidation;

pub use aggregator::*;
pub use keys::*;
pub use observer::*;
pub use store::*;

// Re-export common types for convenience
pub use treestats_core::{
    ActionRecord, CheckTally, Result, StatKind, StatsSnapshot, Timestamp, TreeNode, TreeStatsError,
    UpdateRecord,
};
