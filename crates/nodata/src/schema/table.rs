//! In-memory tabular dataset.

use serde::{Deserialize, Serialize};

use super::column::{Column, NumericColumnSet};
use super::geometry::Geometry;
use super::types::Value;

/// One record of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Row identifier, assigned in file order at load and never rewritten.
    pub index: usize,
    /// One value per column, in schema order.
    pub values: Vec<Value>,
    /// Spatial geometry, present only for rows of a spatial dataset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
}

impl Row {
    pub fn new(index: usize, values: Vec<Value>) -> Self {
        Self {
            index,
            values,
            geometry: None,
        }
    }

    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// True if any of the given columns holds a null in this row.
    pub fn has_null_in(&self, numeric: &NumericColumnSet) -> bool {
        numeric
            .positions()
            .iter()
            .any(|&p| self.values.get(p).is_none_or(Value::is_null))
    }
}

/// An ordered sequence of records with a declared schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Column definitions, in order.
    pub columns: Vec<Column>,
    /// Rows, in order. Imputation depends on this order.
    pub rows: Vec<Row>,
    /// Whether the dataset was loaded from a spatial format.
    pub spatial: bool,
}

impl Dataset {
    /// Create a non-spatial dataset.
    pub fn new(columns: Vec<Column>, rows: Vec<Row>) -> Self {
        Self {
            columns,
            rows,
            spatial: false,
        }
    }

    /// Create a spatial dataset. Every row is expected to carry geometry.
    pub fn spatial(columns: Vec<Column>, rows: Vec<Row>) -> Self {
        Self {
            columns,
            rows,
            spatial: true,
        }
    }

    pub fn has_geometry(&self) -> bool {
        self.spatial
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get a column index by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// The numeric columns of this dataset's schema.
    pub fn numeric_columns(&self) -> NumericColumnSet {
        NumericColumnSet::from_columns(&self.columns)
    }

    /// Get all values for a column by index, in row order.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Value> {
        self.rows
            .iter()
            .map(move |row| row.values.get(index).unwrap_or(&Value::Null))
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, col: usize) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.values.get(col))
    }

    /// Row identifiers in current row order.
    pub fn row_indices(&self) -> Vec<usize> {
        self.rows.iter().map(|r| r.index).collect()
    }
}
