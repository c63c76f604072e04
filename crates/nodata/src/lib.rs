//! Nodata: sentinel detection and forward-fill repair for tabular and GIS data.
//!
//! Many environmental and GIS exports encode "no data" as the numeric
//! sentinel `-9999`. Nodata loads CSV, Excel and shapefile inputs, turns that
//! sentinel into real missing values in numeric columns, forward-fills each
//! numeric column in row order, and writes the result back out.
//!
//! # Core Principles
//!
//! - **Numeric only**: Text and boolean columns are never touched
//! - **Non-destructive**: The loaded dataset is kept; cleaning works on a copy
//! - **Auditable**: Per-column counts and, for spatial data, before/after maps
//!
//! # Example
//!
//! ```no_run
//! use nodata::{Cleaner, ExportFormat};
//!
//! let cleaner = Cleaner::new();
//! let loaded = cleaner.load("stations.shp").unwrap();
//! println!("Sentinels: {}", loaded.sentinels.total());
//!
//! let cleaned = cleaner.clean(&loaded);
//! cleaner.visualize(&cleaned, None).unwrap();
//! cleaner.export(&cleaned, "stations_cleaned.csv", ExportFormat::Csv).unwrap();
//! ```

pub mod diagnostics;
pub mod error;
pub mod io;
pub mod repair;
pub mod schema;

mod cleaner;
mod session;

pub use crate::cleaner::{
    CleanSummary, CleanedDataset, Cleaner, CleanerConfig, LoadedDataset, TIMESTAMP_FORMAT,
};
pub use crate::session::Session;
pub use diagnostics::{Diagnostics, PngRenderer, RenderConfig, Renderer};
pub use error::{NodataError, Result};
pub use io::{ExportFormat, LoaderConfig, SourceMetadata};
pub use repair::{FlagPolicy, MissingFlags, RepairConfig, RepairReport, SentinelSummary};
pub use schema::{ColumnType, Dataset, Geometry, NumericColumnSet, Row, SENTINEL, Value};
