//! Nodata CLI - -9999 sentinel cleaner for tabular and GIS data.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    let result = match cli.command {
        Commands::Inspect { file, json } => commands::inspect::run(file, json),

        Commands::Clean {
            file,
            output,
            format,
            plots,
            plot_dir,
            flag_all,
            json,
        } => commands::clean::run(commands::clean::CleanArgs {
            file,
            output,
            format,
            plots,
            plot_dir,
            flag_all,
            json,
        }),

        Commands::About => commands::about::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
