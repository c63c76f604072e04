//! Writer: serializes a dataset to csv, xlsx or shp.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use log::info;
use serde::{Deserialize, Serialize};

use super::shp;
use super::spreadsheet;
use crate::error::{NodataError, Result};
use crate::schema::Dataset;

/// Output format for export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    Csv,
    Xlsx,
    Shp,
}

impl ExportFormat {
    /// File extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Shp => "shp",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = NodataError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim_start_matches('.').to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" | "xls" => Ok(ExportFormat::Xlsx),
            "shp" => Ok(ExportFormat::Shp),
            _ => Err(NodataError::UnsupportedFormat(format!(
                "{}; use csv, xlsx, or shp",
                s
            ))),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".{}", self.extension())
    }
}

/// Writes datasets to disk.
pub struct Writer;

impl Writer {
    /// Write `dataset` to `path` in `format`.
    ///
    /// Fails with an export error when shapefile output is requested for a
    /// dataset without geometry.
    pub fn write(dataset: &Dataset, path: impl AsRef<Path>, format: ExportFormat) -> Result<()> {
        let path = path.as_ref();
        match format {
            ExportFormat::Csv => write_csv(dataset, path)?,
            ExportFormat::Xlsx => spreadsheet::write_workbook(dataset, path)?,
            ExportFormat::Shp => shp::write_shapefile(dataset, path)?,
        }
        info!(
            "Exported {} rows to {} ({})",
            dataset.row_count(),
            path.display(),
            format
        );
        Ok(())
    }
}

/// Nulls become empty cells; spatial datasets get a trailing WKT column.
fn write_csv(dataset: &Dataset, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| NodataError::export(path, e))?;

    let mut header: Vec<&str> = dataset.column_names();
    if dataset.has_geometry() {
        header.push("geometry");
    }
    writer
        .write_record(&header)
        .map_err(|e| NodataError::export(path, e))?;

    for row in &dataset.rows {
        let mut record: Vec<String> = row.values.iter().map(|v| v.to_string()).collect();
        if dataset.has_geometry() {
            record.push(
                row.geometry
                    .as_ref()
                    .map(|g| g.to_wkt())
                    .unwrap_or_default(),
            );
        }
        writer
            .write_record(&record)
            .map_err(|e| NodataError::export(path, e))?;
    }

    writer.flush().map_err(|e| NodataError::export(path, e))?;
    Ok(())
}
