//! Delimited text parser with delimiter detection.

use std::io::{BufRead, BufReader};
use std::path::Path;

use log::warn;

use super::loader::LoaderConfig;
use super::source::DataTable;
use crate::error::{NodataError, Result};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Format label for a delimiter.
pub(crate) fn format_name(delimiter: u8) -> &'static str {
    match delimiter {
        b'\t' => "tsv",
        b',' => "csv",
        b';' => "csv-semicolon",
        b'|' => "psv",
        _ => "delimited",
    }
}

/// Parse delimited bytes into a text table.
pub(crate) fn parse_bytes(
    path: &Path,
    bytes: &[u8],
    delimiter: u8,
    config: &LoaderConfig,
) -> Result<DataTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(config.has_header)
        .quote(config.quote)
        .flexible(true)
        .from_reader(bytes);

    let mut records = reader.records().peekable();

    let headers: Vec<String> = if config.has_header {
        reader_headers(path, bytes, delimiter, config)?
    } else {
        match records.peek() {
            Some(Ok(record)) => (0..record.len())
                .map(|i| format!("column_{}", i + 1))
                .collect(),
            Some(Err(e)) => return Err(NodataError::parse(path, e)),
            None => return Err(NodataError::parse(path, "no data rows found")),
        }
    };

    if headers.is_empty() {
        return Err(NodataError::parse(path, "no columns found"));
    }

    let expected_cols = headers.len();
    let mut rows = Vec::new();
    let mut ragged = 0usize;

    for (row_idx, result) in records.enumerate() {
        if let Some(max) = config.max_rows {
            if row_idx >= max {
                break;
            }
        }

        let record = result.map_err(|e| NodataError::parse(path, e))?;
        let mut row: Vec<String> = record.iter().map(|s| s.to_string()).collect();

        if row.len() != expected_cols {
            ragged += 1;
        }
        row.resize(expected_cols, String::new());
        rows.push(row);
    }

    if ragged > 0 {
        warn!(
            "{}: {} row(s) did not have {} fields and were padded or truncated",
            path.display(),
            ragged,
            expected_cols
        );
    }

    if rows.is_empty() {
        return Err(NodataError::parse(path, "no data rows found"));
    }

    Ok(DataTable::new(headers, rows))
}

fn reader_headers(
    path: &Path,
    bytes: &[u8],
    delimiter: u8,
    config: &LoaderConfig,
) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .quote(config.quote)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader.headers().map_err(|e| NodataError::parse(path, e))?;
    Ok(headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let h = h.trim();
            if h.is_empty() {
                format!("Unnamed: {}", i)
            } else {
                h.to_string()
            }
        })
        .collect())
}

/// Detect the delimiter by analyzing the first few lines.
pub(crate) fn detect_delimiter(path: &Path, bytes: &[u8]) -> Result<u8> {
    let reader = BufReader::new(bytes);
    let lines: Vec<String> = reader
        .lines()
        .take(10)
        .map_while(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(NodataError::parse(path, "no lines to analyze"));
    }

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        let consistent = counts.iter().all(|&c| c == first_count);
        let variance: f64 = if counts.len() > 1 {
            let mean = counts.iter().sum::<usize>() as f64 / counts.len() as f64;
            counts.iter().map(|&c| (c as f64 - mean).powi(2)).sum::<f64>() / counts.len() as f64
        } else {
            0.0
        };

        // Higher count with lower variance wins; ties go to tab.
        let score = if consistent {
            first_count * 1000 + (if delim == b'\t' { 100 } else { 0 })
        } else if variance < 1.0 {
            first_count * 100
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p() -> &'static Path {
        Path::new("test.csv")
    }

    #[test]
    fn test_detect_delimiter_csv() {
        let data = b"a,b,c\n1,2,3\n4,5,6";
        assert_eq!(detect_delimiter(p(), data).unwrap(), b',');
    }

    #[test]
    fn test_detect_delimiter_semicolon() {
        let data = b"x;y;elev\n1,5;2,5;-9999\n3,0;4,0;12";
        assert_eq!(detect_delimiter(p(), data).unwrap(), b';');
    }

    #[test]
    fn test_detect_delimiter_empty() {
        assert!(matches!(
            detect_delimiter(p(), b"\n\n"),
            Err(NodataError::Parse { .. })
        ));
    }

    #[test]
    fn test_parse_csv() {
        let data = b"name,elev,zone\nA,-9999,N\nB,25,S";
        let table = parse_bytes(p(), data, b',', &LoaderConfig::default()).unwrap();

        assert_eq!(table.headers, vec!["name", "elev", "zone"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[0][1], "-9999");
        assert_eq!(table.rows[1][0], "B");
    }

    #[test]
    fn test_ragged_rows_are_padded() {
        let data = b"a,b,c\n1,2\n4,5,6,7";
        let table = parse_bytes(p(), data, b',', &LoaderConfig::default()).unwrap();

        assert_eq!(table.rows[0], vec!["1", "2", ""]);
        assert_eq!(table.rows[1], vec!["4", "5", "6"]);
    }

    #[test]
    fn test_headerless_and_max_rows() {
        let config = LoaderConfig {
            has_header: false,
            max_rows: Some(2),
            ..LoaderConfig::default()
        };
        let data = b"1,2\n3,4\n5,6";
        let table = parse_bytes(p(), data, b',', &config).unwrap();

        assert_eq!(table.headers, vec!["column_1", "column_2"]);
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_header_only_is_error() {
        let result = parse_bytes(p(), b"a,b\n", b',', &LoaderConfig::default());
        assert!(matches!(result, Err(NodataError::Parse { .. })));
    }
}
