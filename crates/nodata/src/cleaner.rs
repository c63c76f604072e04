//! Main Cleaner struct and public API.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use indexmap::IndexMap;
use log::info;
use serde::{Deserialize, Serialize};

use crate::diagnostics::{
    Diagnostics, DiagnosticsRecorder, PngRenderer, RenderConfig, Renderer,
};
use crate::error::{NodataError, Result};
use crate::io::{ExportFormat, Loader, LoaderConfig, SourceMetadata, Writer};
use crate::repair::{
    RepairConfig, RepairEngine, RepairOutcome, RepairReport, SentinelDetector, SentinelSummary,
};
use crate::schema::{Dataset, NumericColumnSet};

/// Timestamp format used in diagnostic file names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Configuration for the cleaning pipeline.
#[derive(Debug, Clone, Default)]
pub struct CleanerConfig {
    /// Loader configuration.
    pub loader: LoaderConfig,
    /// Repair engine configuration.
    pub repair: RepairConfig,
    /// Canvas configuration for the default PNG renderer.
    pub render: RenderConfig,
}

/// A loaded dataset with its numeric columns and sentinel counts.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    /// Metadata about the source file.
    pub source: SourceMetadata,
    pub dataset: Dataset,
    /// Computed once here and reused by every later stage.
    pub numeric: NumericColumnSet,
    /// Sentinel counts per numeric column.
    pub sentinels: SentinelSummary,
}

/// Result of cleaning a loaded dataset.
#[derive(Debug, Clone)]
pub struct CleanedDataset {
    pub source: SourceMetadata,
    pub numeric: NumericColumnSet,
    /// Sentinel counts seen at load time.
    pub sentinels: SentinelSummary,
    pub outcome: RepairOutcome,
}

impl CleanedDataset {
    /// The repaired dataset.
    pub fn dataset(&self) -> &Dataset {
        &self.outcome.dataset
    }

    pub fn report(&self) -> &RepairReport {
        &self.outcome.report
    }

    /// Diagnostic layers for this result.
    pub fn diagnostics(&self) -> Diagnostics {
        DiagnosticsRecorder::from_outcome(&self.outcome)
    }

    /// Summary for status output.
    pub fn summary(&self) -> CleanSummary {
        CleanSummary {
            file: self.source.file.clone(),
            format: self.source.format.clone(),
            rows: self.outcome.dataset.row_count(),
            numeric_columns: self.numeric.names().to_vec(),
            sentinels: self.sentinels.counts.clone(),
            sentinels_replaced: self.outcome.report.sentinels_replaced(),
            values_filled: self.outcome.report.values_filled(),
            missing_after: self.outcome.report.missing_after(),
            rows_missing_before: self.outcome.before.as_ref().map(|f| f.true_count()),
            rows_missing_after: self.outcome.post_fill.as_ref().map(|f| f.true_count()),
        }
    }
}

/// Summary of a cleaning pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanSummary {
    pub file: String,
    pub format: String,
    pub rows: usize,
    pub numeric_columns: Vec<String>,
    /// Sentinel counts per numeric column at load.
    pub sentinels: IndexMap<String, usize>,
    pub sentinels_replaced: usize,
    pub values_filled: usize,
    /// Nulls left per numeric column after forward-fill.
    pub missing_after: IndexMap<String, usize>,
    /// Rows flagged before imputation (when flags were computed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows_missing_before: Option<usize>,
    /// Rows still flagged after imputation (when flags were computed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows_missing_after: Option<usize>,
}

/// The sentinel cleaning pipeline.
pub struct Cleaner {
    loader: Loader,
    engine: RepairEngine,
    renderer: Arc<dyn Renderer>,
}

impl Cleaner {
    /// Create a Cleaner with default configuration.
    pub fn new() -> Self {
        Self::with_config(CleanerConfig::default())
    }

    /// Create a Cleaner with custom configuration.
    pub fn with_config(config: CleanerConfig) -> Self {
        Self {
            loader: Loader::with_config(config.loader),
            engine: RepairEngine::with_config(config.repair),
            renderer: Arc::new(PngRenderer::with_config(config.render)),
        }
    }

    /// Replace the renderer used by `visualize`.
    pub fn with_renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Arc::new(renderer);
        self
    }

    /// Load a file and count its sentinels.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<LoadedDataset> {
        let (dataset, source) = self.loader.load(path)?;
        let numeric = dataset.numeric_columns();
        let sentinels = SentinelDetector::detect(&dataset, &numeric);

        info!(
            "{} sentinel value(s) in {} of {} numeric column(s)",
            sentinels.total(),
            sentinels.affected_columns().count(),
            numeric.len()
        );

        Ok(LoadedDataset {
            source,
            dataset,
            numeric,
            sentinels,
        })
    }

    /// Repair a loaded dataset. The loaded dataset is left as it was.
    pub fn clean(&self, loaded: &LoadedDataset) -> CleanedDataset {
        let outcome = self.engine.repair(loaded.dataset.clone(), &loaded.numeric);
        CleanedDataset {
            source: loaded.source.clone(),
            numeric: loaded.numeric.clone(),
            sentinels: loaded.sentinels.clone(),
            outcome,
        }
    }

    /// Render the diagnostic maps, stamped with the current local time.
    ///
    /// `output_dir` defaults to the directory of the source file.
    pub fn visualize(
        &self,
        cleaned: &CleanedDataset,
        output_dir: Option<&Path>,
    ) -> Result<Vec<PathBuf>> {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        self.visualize_at(cleaned, output_dir, &timestamp)
    }

    /// Render the diagnostic maps with an explicit timestamp.
    pub fn visualize_at(
        &self,
        cleaned: &CleanedDataset,
        output_dir: Option<&Path>,
        timestamp: &str,
    ) -> Result<Vec<PathBuf>> {
        let diagnostics = cleaned.diagnostics();
        if !diagnostics.is_applicable() {
            return Err(NodataError::Visualization(
                "visualization only available for spatial datasets (shapefiles)".to_string(),
            ));
        }

        let dir = match output_dir {
            Some(dir) => dir.to_path_buf(),
            None => cleaned
                .source
                .path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        };

        self.renderer
            .render(diagnostics.layers(), &dir, &cleaned.source.stem(), timestamp)
    }

    /// Write the repaired dataset.
    pub fn export(
        &self,
        cleaned: &CleanedDataset,
        path: impl AsRef<Path>,
        format: ExportFormat,
    ) -> Result<()> {
        Writer::write(cleaned.dataset(), path, format)
    }
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::new()
    }
}
