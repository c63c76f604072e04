//! Spreadsheet (xlsx/xls) reading and xlsx writing.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use log::debug;
use rust_xlsxwriter::Workbook;

use super::source::DataTable;
use crate::error::{NodataError, Result};
use crate::schema::{Dataset, Value};

/// Read the first worksheet. The first row is the header.
pub(crate) fn read_first_sheet(path: &Path, max_rows: Option<usize>) -> Result<DataTable> {
    let mut workbook = open_workbook_auto(path).map_err(|e| NodataError::parse(path, e))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| NodataError::parse(path, "workbook has no worksheets"))?
        .map_err(|e| NodataError::parse(path, e))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let name = cell_text(cell);
                if name.trim().is_empty() {
                    format!("Unnamed: {}", i)
                } else {
                    name.trim().to_string()
                }
            })
            .collect(),
        None => return Err(NodataError::parse(path, "worksheet is empty")),
    };

    if headers.is_empty() {
        return Err(NodataError::parse(path, "no columns found"));
    }

    let limit = max_rows.unwrap_or(usize::MAX);
    let body: Vec<Vec<String>> = rows
        .take(limit)
        .map(|row| {
            let mut cells: Vec<String> = row.iter().map(cell_text).collect();
            cells.resize(headers.len(), String::new());
            cells
        })
        .collect();

    if body.is_empty() {
        return Err(NodataError::parse(path, "no data rows found"));
    }

    debug!(
        "Read {} rows x {} columns from first worksheet of {}",
        body.len(),
        headers.len(),
        path.display()
    );
    Ok(DataTable::new(headers, body))
}

/// Text form of a cell, fed through the same typing as delimited input.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Write the dataset to a single-sheet xlsx workbook.
///
/// Nulls are left as blank cells. Spatial datasets get a trailing WKT
/// `geometry` column.
pub(crate) fn write_workbook(dataset: &Dataset, path: &Path) -> Result<()> {
    let err = |e: rust_xlsxwriter::XlsxError| NodataError::export(path, e);

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    let geometry_col = dataset.column_count();
    for (col, column) in dataset.columns.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, column.name.as_str())
            .map_err(err)?;
    }
    if dataset.has_geometry() {
        worksheet
            .write_string(0, geometry_col as u16, "geometry")
            .map_err(err)?;
    }

    for (i, row) in dataset.rows.iter().enumerate() {
        let r = (i + 1) as u32;
        for (col, value) in row.values.iter().enumerate() {
            let c = col as u16;
            match value {
                Value::Null => {}
                Value::Number(n) => {
                    worksheet.write_number(r, c, *n).map_err(err)?;
                }
                Value::Bool(b) => {
                    worksheet.write_boolean(r, c, *b).map_err(err)?;
                }
                Value::Text(s) => {
                    worksheet.write_string(r, c, s.as_str()).map_err(err)?;
                }
            }
        }
        if let Some(geometry) = &row.geometry {
            worksheet
                .write_string(r, geometry_col as u16, geometry.to_wkt())
                .map_err(err)?;
        }
    }

    workbook.save(path).map_err(err)?;
    Ok(())
}
