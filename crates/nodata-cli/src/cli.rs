//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use nodata::ExportFormat;
use std::path::PathBuf;

/// Nodata: detect and repair -9999 sentinel values in tabular and GIS data
#[derive(Parser)]
#[command(name = "nodata")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load a file and report -9999 counts per numeric column
    Inspect {
        /// Path to the data file (SHP/CSV/XLSX)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replace -9999 with missing values, forward-fill, and export
    Clean {
        /// Path to the data file (SHP/CSV/XLSX)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output path (default: <stem>_cleaned.<ext> next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (csv, xlsx, shp)
        #[arg(short, long, default_value = "csv")]
        format: ExportFormat,

        /// Render before/after diagnostic maps (spatial data only)
        #[arg(long)]
        plots: bool,

        /// Directory for diagnostic maps (default: next to the input)
        #[arg(long, requires = "plots")]
        plot_dir: Option<PathBuf>,

        /// Compute missing flags for non-spatial data too
        #[arg(long)]
        flag_all: bool,

        /// Output summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show program information and supported formats
    About,
}
