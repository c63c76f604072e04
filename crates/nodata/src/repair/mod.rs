//! Sentinel detection and repair.

mod detector;
mod engine;
mod flags;
mod report;

pub use detector::{SentinelDetector, SentinelSummary};
pub use engine::{FlagPolicy, RepairConfig, RepairEngine, RepairOutcome};
pub use flags::{Checkpoint, MissingFlags};
pub use report::{ColumnRepair, FillAudit, RepairReport};
