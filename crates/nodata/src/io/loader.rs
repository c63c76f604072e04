//! Loader: reads a source file into a dataset, dispatching on extension.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::info;
use sha2::{Digest, Sha256};

use super::delimited;
use super::shp;
use super::source::{InputFormat, SourceMetadata};
use super::spreadsheet;
use crate::error::{NodataError, Result};
use crate::schema::Dataset;

/// Loader configuration.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Delimiter for delimited text (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Whether delimited text has a header row.
    pub has_header: bool,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
    /// Quote character for delimited text.
    pub quote: u8,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: true,
            max_rows: None,
            quote: b'"',
        }
    }
}

/// Loads csv, xlsx/xls and shp files.
pub struct Loader {
    config: LoaderConfig,
}

impl Loader {
    /// Create a loader with default configuration.
    pub fn new() -> Self {
        Self {
            config: LoaderConfig::default(),
        }
    }

    /// Create a loader with custom configuration.
    pub fn with_config(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// Load a file and return the dataset and its source metadata.
    ///
    /// The dataset carries geometry iff the source is a shapefile.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<(Dataset, SourceMetadata)> {
        let path = path.as_ref();
        let format = InputFormat::from_path(path)?;

        let contents = read_all(path)?;
        let size_bytes = contents.len() as u64;

        let mut hasher = Sha256::new();
        hasher.update(&contents);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let (dataset, format_name) = match format {
            InputFormat::Delimited => {
                let delimiter = match self.config.delimiter {
                    Some(d) => d,
                    None => delimited::detect_delimiter(path, &contents)?,
                };
                let table = delimited::parse_bytes(path, &contents, delimiter, &self.config)?;
                (table.into_dataset(), delimited::format_name(delimiter).to_string())
            }
            InputFormat::Spreadsheet => {
                let table = spreadsheet::read_first_sheet(path, self.config.max_rows)?;
                let ext = path
                    .extension()
                    .map(|e| e.to_string_lossy().to_ascii_lowercase())
                    .unwrap_or_default();
                (table.into_dataset(), ext)
            }
            InputFormat::Shapefile => (
                shp::read_shapefile(path, self.config.max_rows)?,
                "shp".to_string(),
            ),
        };

        let source = SourceMetadata::new(
            path.to_path_buf(),
            hash,
            size_bytes,
            format_name,
            dataset.row_count(),
            dataset.column_count(),
        );

        info!(
            "Loaded {} ({}): {} rows, {} columns{}",
            source.file,
            source.format,
            source.row_count,
            source.column_count,
            if dataset.has_geometry() { ", with geometry" } else { "" }
        );

        Ok((dataset, source))
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

fn read_all(path: &Path) -> Result<Vec<u8>> {
    let mut file = File::open(path).map_err(|e| NodataError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut contents = Vec::new();
    file.read_to_end(&mut contents).map_err(|e| NodataError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(contents)
}
