//! Stateful load → clean → visualize/export workflow.

use std::path::{Path, PathBuf};

use log::debug;

use crate::cleaner::{CleanedDataset, Cleaner, LoadedDataset};
use crate::error::{NodataError, Result};
use crate::io::ExportFormat;

/// Holds the most recent loaded and cleaned datasets.
///
/// Actions that need an earlier step fail with `NodataError::Precondition`
/// and leave the state unchanged.
pub struct Session {
    cleaner: Cleaner,
    loaded: Option<LoadedDataset>,
    cleaned: Option<CleanedDataset>,
}

impl Session {
    pub fn new() -> Self {
        Self::with_cleaner(Cleaner::new())
    }

    pub fn with_cleaner(cleaner: Cleaner) -> Self {
        Self {
            cleaner,
            loaded: None,
            cleaned: None,
        }
    }

    /// Load a file, replacing the current dataset and discarding any
    /// cleaned result. A failed load keeps the previous state.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<&LoadedDataset> {
        let loaded = self.cleaner.load(path)?;
        self.cleaned = None;
        Ok(self.loaded.insert(loaded))
    }

    /// Clean the loaded dataset.
    pub fn clean(&mut self) -> Result<&CleanedDataset> {
        let loaded = self
            .loaded
            .as_ref()
            .ok_or_else(|| NodataError::Precondition("no dataset loaded".to_string()))?;
        let cleaned = self.cleaner.clean(loaded);
        debug!("Session holds cleaned {}", cleaned.source.file);
        Ok(self.cleaned.insert(cleaned))
    }

    /// Render diagnostics for the cleaned dataset.
    pub fn visualize(&self, output_dir: Option<&Path>) -> Result<Vec<PathBuf>> {
        let cleaned = self.require_cleaned()?;
        self.cleaner.visualize(cleaned, output_dir)
    }

    /// Export the cleaned dataset. The cleaned dataset is kept on failure.
    pub fn export(&self, path: impl AsRef<Path>, format: ExportFormat) -> Result<()> {
        let cleaned = self.require_cleaned()?;
        self.cleaner.export(cleaned, path, format)
    }

    pub fn loaded(&self) -> Option<&LoadedDataset> {
        self.loaded.as_ref()
    }

    pub fn cleaned(&self) -> Option<&CleanedDataset> {
        self.cleaned.as_ref()
    }

    fn require_cleaned(&self) -> Result<&CleanedDataset> {
        self.cleaned
            .as_ref()
            .ok_or_else(|| NodataError::Precondition("no cleaned data; run clean first".to_string()))
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn csv_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_clean_requires_load() {
        let mut session = Session::new();
        assert!(matches!(session.clean(), Err(NodataError::Precondition(_))));
    }

    #[test]
    fn test_export_and_visualize_require_clean() {
        let file = csv_file("v\n-9999\n");
        let mut session = Session::new();
        session.load(file.path()).unwrap();

        let out = file.path().with_extension("out.csv");
        assert!(matches!(
            session.export(&out, ExportFormat::Csv),
            Err(NodataError::Precondition(_))
        ));
        assert!(matches!(session.visualize(None), Err(NodataError::Precondition(_))));
    }

    #[test]
    fn test_failed_load_keeps_state() {
        let file = csv_file("v\n1\n");
        let mut session = Session::new();
        session.load(file.path()).unwrap();
        session.clean().unwrap();

        assert!(session.load("missing.txt").is_err());
        assert!(session.loaded().is_some());
        assert!(session.cleaned().is_some());
    }

    #[test]
    fn test_load_clears_cleaned() {
        let first = csv_file("v\n1\n");
        let second = csv_file("w\n2\n");
        let mut session = Session::new();
        session.load(first.path()).unwrap();
        session.clean().unwrap();

        session.load(second.path()).unwrap();
        assert!(session.cleaned().is_none());
        assert_eq!(session.loaded().unwrap().numeric.names(), &["w".to_string()]);
    }
}
