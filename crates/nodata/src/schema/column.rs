//! Column definitions and the numeric column set.

use serde::{Deserialize, Serialize};

use super::types::ColumnType;

/// Schema for a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Declared data type.
    pub column_type: ColumnType,
}

impl Column {
    /// Create a new column.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.column_type.is_numeric()
    }
}

/// The columns whose declared type is numeric.
///
/// Computed once from the schema when a dataset is loaded and handed to every
/// stage that scans or rewrites cells, so identifier and categorical columns
/// can never be touched even if a later stage changes how values look.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericColumnSet {
    positions: Vec<usize>,
    names: Vec<String>,
}

impl NumericColumnSet {
    /// Select the numeric columns of a schema, in schema order.
    pub fn from_columns(columns: &[Column]) -> Self {
        let mut set = Self::default();
        for (position, column) in columns.iter().enumerate() {
            if column.is_numeric() {
                set.positions.push(position);
                set.names.push(column.name.clone());
            }
        }
        set
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Column positions within the dataset schema.
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Iterate `(position, name)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.positions
            .iter()
            .copied()
            .zip(self.names.iter().map(|n| n.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_set_skips_text_and_bool() {
        let columns = vec![
            Column::new("id", ColumnType::Text),
            Column::new("elev", ColumnType::Float),
            Column::new("valid", ColumnType::Boolean),
            Column::new("count", ColumnType::Integer),
        ];
        let set = NumericColumnSet::from_columns(&columns);

        assert_eq!(set.positions(), &[1, 3]);
        assert_eq!(set.names(), &["elev".to_string(), "count".to_string()]);
    }

    #[test]
    fn test_empty_set() {
        let set = NumericColumnSet::from_columns(&[Column::new("name", ColumnType::Text)]);
        assert!(set.is_empty());
        assert_eq!(set.iter().count(), 0);
    }
}
