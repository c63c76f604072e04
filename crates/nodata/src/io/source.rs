//! Source formats, source metadata and the raw text table.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{NodataError, Result};
use crate::schema::{Column, ColumnType, Dataset, Row, Value};

/// Input container, selected by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFormat {
    /// Delimited text (`.csv`).
    Delimited,
    /// Spreadsheet workbook (`.xlsx`, `.xls`).
    Spreadsheet,
    /// ESRI shapefile (`.shp` plus sibling `.dbf`).
    Shapefile,
}

impl InputFormat {
    /// Pick the format from a path's extension, case-insensitively.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" => Ok(InputFormat::Delimited),
            "xlsx" | "xls" => Ok(InputFormat::Spreadsheet),
            "shp" => Ok(InputFormat::Shapefile),
            "" => Err(NodataError::UnsupportedFormat(format!(
                "'{}' has no extension; only .shp, .csv, .xlsx files are supported",
                path.display()
            ))),
            other => Err(NodataError::UnsupportedFormat(format!(
                ".{}; only .shp, .csv, .xlsx files are supported",
                other
            ))),
        }
    }
}

/// Metadata about the source data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Detected format (csv, tsv, xlsx, shp, etc.).
    pub format: String,
    /// Number of data rows (excluding header).
    pub row_count: usize,
    /// Number of columns (excluding geometry).
    pub column_count: usize,
    /// When the file was loaded.
    pub loaded_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Create metadata for a file that has been loaded.
    pub fn new(
        path: PathBuf,
        hash: String,
        size_bytes: u64,
        format: String,
        row_count: usize,
        column_count: usize,
    ) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            file,
            path,
            hash,
            size_bytes,
            format,
            row_count,
            column_count,
            loaded_at: Utc::now(),
        }
    }

    /// File name without extension, used as the prefix of derived files.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Parsed tabular data before typing: every cell is still text.
#[derive(Debug, Clone)]
pub struct DataTable {
    /// Column headers.
    pub headers: Vec<String>,
    /// Row data as strings (row-major order).
    pub rows: Vec<Vec<String>>,
}

impl DataTable {
    /// Create a new data table.
    ///
    /// Repeated header names are made unique: `v, v` becomes `v, v.1`.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            headers: unique_names(headers),
            rows,
        }
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Get the number of rows (excluding header).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get all values for a column by index.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(move |row| row.get(index).map(|s| s.as_str()).unwrap_or(""))
    }

    /// Check if a value represents a missing/null value.
    pub fn is_null_value(value: &str) -> bool {
        let trimmed = value.trim();
        trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("na")
            || trimmed.eq_ignore_ascii_case("n/a")
            || trimmed.eq_ignore_ascii_case("nan")
            || trimmed.eq_ignore_ascii_case("null")
            || trimmed.eq_ignore_ascii_case("none")
            || trimmed.eq_ignore_ascii_case("#n/a")
    }

    /// Declare a type for a column from its non-null cells.
    ///
    /// Integer if every cell parses as `i64`, float if every cell parses as
    /// `f64`, boolean if every cell is true/false, text otherwise. A column
    /// with no non-null cell is float.
    pub fn infer_column_type(&self, index: usize) -> ColumnType {
        let mut all_int = true;
        let mut all_float = true;
        let mut all_bool = true;

        for value in self.column_values(index) {
            if Self::is_null_value(value) {
                continue;
            }
            let trimmed = value.trim();
            all_int = all_int && trimmed.parse::<i64>().is_ok();
            all_float = all_float && trimmed.parse::<f64>().is_ok();
            all_bool = all_bool && parse_bool(trimmed).is_some();
            if !all_int && !all_float && !all_bool {
                return ColumnType::Text;
            }
        }

        if all_int && !all_bool {
            ColumnType::Integer
        } else if all_float && !all_bool {
            ColumnType::Float
        } else if all_bool && !all_float {
            ColumnType::Boolean
        } else {
            // Only reachable when the column has no non-null cell.
            ColumnType::Float
        }
    }

    /// Type every column and convert the cells into a dataset.
    pub fn into_dataset(self) -> Dataset {
        let columns: Vec<Column> = (0..self.column_count())
            .map(|i| Column::new(self.headers[i].clone(), self.infer_column_type(i)))
            .collect();

        for column in &columns {
            debug!("Column '{}' declared {}", column.name, column.column_type);
        }

        let rows = self
            .rows
            .into_iter()
            .enumerate()
            .map(|(index, cells)| {
                let values = cells
                    .into_iter()
                    .zip(&columns)
                    .map(|(cell, column)| typed_value(cell, column.column_type))
                    .collect();
                Row::new(index, values)
            })
            .collect();

        Dataset::new(columns, rows)
    }
}

/// Rename repeated names to `name.1`, `name.2`, ... keeping the first as is.
pub(crate) fn unique_names(names: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(names.len());
    let mut counts: HashMap<String, usize> = HashMap::new();

    names
        .into_iter()
        .map(|name| {
            if seen.insert(name.clone()) {
                return name;
            }
            let count = counts.entry(name.clone()).or_insert(0);
            let renamed = loop {
                *count += 1;
                let candidate = format!("{}.{}", name, count);
                if seen.insert(candidate.clone()) {
                    break candidate;
                }
            };
            debug!("Renamed duplicate column '{}' to '{}'", name, renamed);
            renamed
        })
        .collect()
}

fn parse_bool(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn typed_value(cell: String, column_type: ColumnType) -> Value {
    if DataTable::is_null_value(&cell) {
        return Value::Null;
    }
    let trimmed = cell.trim();
    match column_type {
        ColumnType::Integer | ColumnType::Float => trimmed
            .parse::<f64>()
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ColumnType::Boolean => parse_bool(trimmed).map(Value::Bool).unwrap_or(Value::Null),
        ColumnType::Text => Value::Text(cell),
    }
}
