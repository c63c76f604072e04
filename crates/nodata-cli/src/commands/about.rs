//! About command - program information.

use colored::Colorize;
use nodata::SENTINEL;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!(
        "{} {}",
        "nodata".cyan().bold(),
        env!("CARGO_PKG_VERSION").white()
    );
    println!();
    println!(
        "Detects the no-data sentinel {} in numeric columns, replaces it with",
        SENTINEL.to_string().yellow()
    );
    println!("missing values, and forward-fills each column in row order.");
    println!();
    println!("{}", "Supported formats:".yellow().bold());
    println!("  Input:  .shp (with .dbf), .csv, .xlsx, .xls");
    println!("  Output: .csv, .xlsx, .shp (spatial input only)");
    println!();
    println!(
        "Before/after maps are available for shapefile input with {}.",
        "nodata clean --plots".cyan()
    );

    Ok(())
}
