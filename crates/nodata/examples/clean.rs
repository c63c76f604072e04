//! Example: Clean a data file with Nodata.
//!
//! Usage:
//!   cargo run --example clean -- <file_path>
//!
//! Example:
//!   cargo run --example clean -- data/stations.shp

use std::env;
use std::path::Path;

use nodata::{Cleaner, ExportFormat};

fn main() -> nodata::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: cargo run --example clean -- <file_path>");
        std::process::exit(1);
    }

    let path = Path::new(&args[1]);
    if !path.exists() {
        eprintln!("Error: File not found: {}", path.display());
        std::process::exit(1);
    }

    let cleaner = Cleaner::new();
    let loaded = cleaner.load(path)?;

    println!("=== Source ===");
    println!("File: {}", loaded.source.file);
    println!("Format: {}", loaded.source.format);
    println!("Rows: {}", loaded.source.row_count);
    println!();

    println!("=== -9999 per numeric column ===");
    for (column, count) in &loaded.sentinels.counts {
        println!("  {:<20} {}", column, count);
    }
    println!();

    let cleaned = cleaner.clean(&loaded);
    println!("=== Repair ===");
    println!("{}", cleaned.report().description());
    for (column, count) in cleaned.report().missing_after() {
        println!("  {:<20} {} still missing", column, count);
    }

    match cleaner.visualize(&cleaned, None) {
        Ok(files) => {
            for file in files {
                println!("Plot: {}", file.display());
            }
        }
        Err(e) if e.is_informational() => println!("Note: {}", e),
        Err(e) => return Err(e),
    }

    let stem = loaded.source.stem();
    let output = path.with_file_name(format!("{}_cleaned.csv", stem));
    cleaner.export(&cleaned, &output, ExportFormat::Csv)?;
    println!("Exported to {}", output.display());

    Ok(())
}
