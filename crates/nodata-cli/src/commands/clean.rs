//! Clean command - repair sentinels, optionally plot, and export.

use std::path::{Path, PathBuf};

use colored::Colorize;
use log::debug;
use nodata::{Cleaner, CleanerConfig, ExportFormat, FlagPolicy};

/// Arguments of the clean command.
pub struct CleanArgs {
    pub file: PathBuf,
    pub output: Option<PathBuf>,
    pub format: ExportFormat,
    pub plots: bool,
    pub plot_dir: Option<PathBuf>,
    pub flag_all: bool,
    pub json: bool,
}

pub fn run(args: CleanArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = CleanerConfig::default();
    if args.flag_all {
        config.repair.flag_policy = FlagPolicy::Always;
    }
    let cleaner = Cleaner::with_config(config);

    let loaded = cleaner.load(&args.file)?;
    let cleaned = cleaner.clean(&loaded);
    let summary = cleaned.summary();

    let mut plots = Vec::new();
    let mut note = None;
    if args.plots {
        match cleaner.visualize(&cleaned, args.plot_dir.as_deref()) {
            Ok(files) => plots = files,
            Err(e) if e.is_informational() => note = Some(e.to_string()),
            Err(e) => return Err(e.into()),
        }
    }

    let output = args
        .output
        .unwrap_or_else(|| default_output_path(&args.file, args.format));
    debug!("Exporting to {}", output.display());
    cleaner.export(&cleaned, &output, args.format)?;

    if args.json {
        let report = serde_json::json!({
            "summary": summary,
            "output": output,
            "plots": plots,
            "note": note,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} {} ({} rows)",
        "Cleaned".cyan().bold(),
        summary.file.white(),
        summary.rows
    );
    println!(
        "  Replaced {} -9999 value(s), forward-filled {}",
        summary.sentinels_replaced.to_string().white().bold(),
        summary.values_filled.to_string().green()
    );
    println!();

    if summary.missing_after.is_empty() {
        println!("{}", "No numeric columns; data left unchanged.".yellow());
    } else {
        println!("{}", "Missing values after cleaning:".yellow().bold());
        for (column, count) in &summary.missing_after {
            let count_str = if *count > 0 {
                count.to_string().red()
            } else {
                count.to_string().green()
            };
            println!("  {:<24} {}", column, count_str);
        }
    }
    println!();

    if let Some(note) = note {
        println!("{} {}", "Note:".blue().bold(), note);
    }
    for plot in &plots {
        println!("  {} {}", "Plot:".dimmed(), plot.display());
    }

    println!(
        "{} {}",
        "Exported to".green().bold(),
        output.display().to_string().white()
    );

    Ok(())
}

/// `<stem>_cleaned.<ext>` next to the input.
fn default_output_path(input: &Path, format: ExportFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{}_cleaned.{}", stem, format.extension()))
}
