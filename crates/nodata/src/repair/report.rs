//! Audit trail of a repair pass.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::schema::Value;

/// Result of repairing one dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepairReport {
    /// Whether the stable sort by row index moved any row.
    pub rows_reordered: bool,

    /// Per numeric column changes, in column order.
    pub columns: Vec<ColumnRepair>,
}

/// Changes made to a single numeric column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnRepair {
    /// Column affected.
    pub column: String,

    /// Sentinel cells converted to null.
    pub sentinels_replaced: usize,

    /// Null cells given a value by forward-fill.
    pub values_filled: usize,

    /// Null cells left after forward-fill (leading nulls).
    pub still_missing: usize,

    /// Per-cell fill audit.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fills: Vec<FillAudit>,
}

/// Audit information for a single filled cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillAudit {
    /// Identifier of the row that was filled.
    pub row: usize,

    /// Identifier of the row the value was carried from.
    pub source_row: usize,

    /// Value written.
    pub value: Value,
}

impl RepairReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the entry for a column, creating it on first use.
    pub fn column_mut(&mut self, column: &str) -> &mut ColumnRepair {
        let pos = match self.columns.iter().position(|c| c.column == column) {
            Some(pos) => pos,
            None => {
                self.columns.push(ColumnRepair {
                    column: column.to_string(),
                    ..ColumnRepair::default()
                });
                self.columns.len() - 1
            }
        };
        &mut self.columns[pos]
    }

    pub fn column(&self, column: &str) -> Option<&ColumnRepair> {
        self.columns.iter().find(|c| c.column == column)
    }

    pub fn sentinels_replaced(&self) -> usize {
        self.columns.iter().map(|c| c.sentinels_replaced).sum()
    }

    pub fn values_filled(&self) -> usize {
        self.columns.iter().map(|c| c.values_filled).sum()
    }

    pub fn still_missing(&self) -> usize {
        self.columns.iter().map(|c| c.still_missing).sum()
    }

    /// Nulls remaining per column after cleaning.
    pub fn missing_after(&self) -> IndexMap<String, usize> {
        self.columns
            .iter()
            .map(|c| (c.column.clone(), c.still_missing))
            .collect()
    }

    /// One-line summary for status output.
    pub fn description(&self) -> String {
        format!(
            "Replaced {} sentinel(s), filled {} value(s), {} still missing across {} column(s)",
            self.sentinels_replaced(),
            self.values_filled(),
            self.still_missing(),
            self.columns.len()
        )
    }
}
