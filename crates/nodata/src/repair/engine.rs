//! Repair engine: sentinel substitution followed by forward-fill.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::schema::{Dataset, NumericColumnSet, Value};

use super::flags::{Checkpoint, MissingFlags};
use super::report::{FillAudit, RepairReport};

/// Which datasets get diagnostic missing flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagPolicy {
    /// Only datasets that carry geometry.
    #[default]
    SpatialOnly,
    /// Every dataset.
    Always,
    /// No dataset.
    Never,
}

impl FlagPolicy {
    fn applies_to(&self, dataset: &Dataset) -> bool {
        match self {
            FlagPolicy::SpatialOnly => dataset.has_geometry(),
            FlagPolicy::Always => true,
            FlagPolicy::Never => false,
        }
    }
}

/// Repair engine configuration.
#[derive(Debug, Clone, Default)]
pub struct RepairConfig {
    /// When to compute the before/post-fill missing flags.
    pub flag_policy: FlagPolicy,
    /// Record a `FillAudit` for every filled cell.
    pub audit_fills: bool,
}

/// Everything a repair pass produces.
#[derive(Debug, Clone)]
pub struct RepairOutcome {
    /// The repaired dataset, the only one meant for export.
    pub dataset: Dataset,
    /// Copy taken after sentinel substitution and before imputation.
    pub snapshot: Dataset,
    /// Flags evaluated on `snapshot`.
    pub before: Option<MissingFlags>,
    /// Flags evaluated on `dataset`.
    pub post_fill: Option<MissingFlags>,
    pub report: RepairReport,
}

/// Replaces -9999 sentinels with nulls and imputes them by forward-fill.
pub struct RepairEngine {
    config: RepairConfig,
}

impl RepairEngine {
    /// Create a repair engine with default configuration.
    pub fn new() -> Self {
        Self::with_config(RepairConfig::default())
    }

    pub fn with_config(config: RepairConfig) -> Self {
        Self { config }
    }

    /// Run the full repair pass over an owned dataset.
    pub fn repair(&self, mut dataset: Dataset, numeric: &NumericColumnSet) -> RepairOutcome {
        let mut report = RepairReport::new();
        let with_flags = self.config.flag_policy.applies_to(&dataset);

        if numeric.is_empty() {
            debug!("No numeric columns; dataset left unchanged");
        }

        Self::replace_sentinels(&mut dataset, numeric, &mut report);

        let before =
            with_flags.then(|| MissingFlags::compute(&dataset, numeric, Checkpoint::Before));
        let snapshot = dataset.clone();

        if !numeric.is_empty() {
            report.rows_reordered = Self::sort_by_index(&mut dataset);
        }
        self.forward_fill(&mut dataset, numeric, &mut report);

        let post_fill =
            with_flags.then(|| MissingFlags::compute(&dataset, numeric, Checkpoint::PostFill));

        info!("{}", report.description());

        RepairOutcome {
            dataset,
            snapshot,
            before,
            post_fill,
            report,
        }
    }

    /// Replace every numeric cell equal to -9999 with null.
    ///
    /// Idempotent: a second pass finds nothing to replace. Returns the number of
    /// cells replaced.
    pub fn replace_sentinels(
        dataset: &mut Dataset,
        numeric: &NumericColumnSet,
        report: &mut RepairReport,
    ) -> usize {
        let mut total = 0;
        for (position, name) in numeric.iter() {
            let mut replaced = 0;
            for row in &mut dataset.rows {
                if let Some(value) = row.values.get_mut(position) {
                    if value.is_sentinel() {
                        *value = Value::Null;
                        replaced += 1;
                    }
                }
            }
            report.column_mut(name).sentinels_replaced += replaced;
            total += replaced;
        }
        debug!("Replaced {} sentinel cell(s)", total);
        total
    }

    /// Stable sort by row identifier. Returns true if any row moved.
    pub fn sort_by_index(dataset: &mut Dataset) -> bool {
        if dataset.rows.is_sorted_by_key(|r| r.index) {
            return false;
        }
        dataset.rows.sort_by_key(|r| r.index);
        debug!("Restored row order by index");
        true
    }

    /// Carry the last non-null value of each numeric column into following nulls.
    ///
    /// Columns are filled independently. Nulls with no preceding value in their
    /// column stay null and are counted as still missing.
    pub fn forward_fill(
        &self,
        dataset: &mut Dataset,
        numeric: &NumericColumnSet,
        report: &mut RepairReport,
    ) {
        for (position, name) in numeric.iter() {
            let entry = report.column_mut(name);
            let mut last: Option<(usize, Value)> = None;

            for row in &mut dataset.rows {
                let Some(value) = row.values.get_mut(position) else {
                    continue;
                };

                if !value.is_null() {
                    last = Some((row.index, value.clone()));
                    continue;
                }

                match &last {
                    Some((source_row, carried)) => {
                        *value = carried.clone();
                        entry.values_filled += 1;
                        if self.config.audit_fills {
                            entry.fills.push(FillAudit {
                                row: row.index,
                                source_row: *source_row,
                                value: carried.clone(),
                            });
                        }
                    }
                    None => entry.still_missing += 1,
                }
            }

            debug!(
                "Forward-filled '{}': {} filled, {} still missing",
                name, entry.values_filled, entry.still_missing
            );
        }
    }
}

impl Default for RepairEngine {
    fn default() -> Self {
        Self::new()
    }
}
