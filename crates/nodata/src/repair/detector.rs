//! Sentinel detection over numeric columns.

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::schema::{Dataset, NumericColumnSet};

/// Sentinel counts per numeric column, in column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentinelSummary {
    pub counts: IndexMap<String, usize>,
}

impl SentinelSummary {
    /// Total number of sentinel cells across all numeric columns.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Columns with at least one sentinel.
    pub fn affected_columns(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts
            .iter()
            .filter(|(_, c)| **c > 0)
            .map(|(name, c)| (name.as_str(), *c))
    }
}

/// Counts sentinel cells without touching the dataset.
pub struct SentinelDetector;

impl SentinelDetector {
    /// Count cells exactly equal to -9999 in each numeric column.
    ///
    /// Columns outside `numeric` are never inspected, so a text column holding
    /// the literal "-9999" is not reported.
    pub fn detect(dataset: &Dataset, numeric: &NumericColumnSet) -> SentinelSummary {
        let mut counts = IndexMap::with_capacity(numeric.len());
        for (position, name) in numeric.iter() {
            let count = dataset
                .column_values(position)
                .filter(|v| v.is_sentinel())
                .count();
            counts.insert(name.to_string(), count);
        }

        let summary = SentinelSummary { counts };
        debug!(
            "Sentinel scan: {} cells across {} numeric columns",
            summary.total(),
            numeric.len()
        );
        summary
    }
}
