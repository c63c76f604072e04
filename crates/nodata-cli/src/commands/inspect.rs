//! Inspect command - load a file and report sentinel counts.

use std::path::PathBuf;

use colored::Colorize;
use nodata::Cleaner;

/// Rows shown in the preview table.
const PREVIEW_ROWS: usize = 5;

pub fn run(file: PathBuf, json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    let loaded = Cleaner::new().load(&file)?;
    let dataset = &loaded.dataset;

    if json_output {
        let columns: Vec<_> = dataset
            .columns
            .iter()
            .map(|c| serde_json::json!({ "name": c.name, "type": c.column_type }))
            .collect();
        let report = serde_json::json!({
            "source": loaded.source,
            "spatial": dataset.has_geometry(),
            "columns": columns,
            "numeric_columns": loaded.numeric.names(),
            "sentinels": loaded.sentinels.counts,
            "total_sentinels": loaded.sentinels.total(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} {} ({}, {} rows, {} columns{})",
        "Loaded".cyan().bold(),
        loaded.source.file.white(),
        loaded.source.format,
        loaded.source.row_count,
        loaded.source.column_count,
        if dataset.has_geometry() { ", spatial" } else { "" }
    );
    println!();

    println!("{}", "Preview:".yellow().bold());
    let header = dataset.column_names().join(" | ");
    println!("  {}", header.bold());
    for row in dataset.rows.iter().take(PREVIEW_ROWS) {
        let cells: Vec<String> = row.values.iter().map(|v| v.to_string()).collect();
        println!("  {}", cells.join(" | "));
    }
    if dataset.row_count() > PREVIEW_ROWS {
        println!("  {}", format!("... {} more rows", dataset.row_count() - PREVIEW_ROWS).dimmed());
    }
    println!();

    if loaded.numeric.is_empty() {
        println!("{}", "No numeric columns; nothing to clean.".yellow());
        return Ok(());
    }

    println!("{}", "Count of -9999 values per numeric column:".yellow().bold());
    for (column, count) in &loaded.sentinels.counts {
        let count_str = if *count > 0 {
            count.to_string().red()
        } else {
            count.to_string().green()
        };
        println!("  {:<24} {}", column, count_str);
    }
    println!();

    if loaded.sentinels.total() > 0 {
        println!(
            "Run {} to repair.",
            format!("nodata clean {}", file.display()).cyan().bold()
        );
    } else {
        println!("{}", "No -9999 values found.".green().bold());
    }

    Ok(())
}
