//! Per-row missing-value flags used for diagnostics.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::schema::{Dataset, NumericColumnSet};

/// When a set of flags was evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Checkpoint {
    /// Right after sentinel substitution, before imputation.
    Before,
    /// After forward-fill.
    PostFill,
}

/// `true` for each row where any numeric column is null.
///
/// Flags live beside the dataset, keyed by row identifier, and are never
/// written into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingFlags {
    pub checkpoint: Checkpoint,
    flags: IndexMap<usize, bool>,
}

impl MissingFlags {
    /// Evaluate the flags for every row of `dataset`, in row order.
    pub fn compute(
        dataset: &Dataset,
        numeric: &NumericColumnSet,
        checkpoint: Checkpoint,
    ) -> Self {
        let flags = dataset
            .rows
            .iter()
            .map(|row| (row.index, row.has_null_in(numeric)))
            .collect();
        Self { checkpoint, flags }
    }

    /// Flag for a row identifier.
    pub fn get(&self, row_index: usize) -> Option<bool> {
        self.flags.get(&row_index).copied()
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Number of rows flagged as missing.
    pub fn true_count(&self) -> usize {
        self.flags.values().filter(|&&f| f).count()
    }

    /// Flags in the order rows were evaluated.
    pub fn values(&self) -> Vec<bool> {
        self.flags.values().copied().collect()
    }

    /// Row identifiers whose flag is true.
    pub fn flagged_rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.flags.iter().filter(|(_, f)| **f).map(|(i, _)| *i)
    }
}
