//! SatSky CLI - command-line interface
//!
//! Renders all-sky satellite frames ahead of real time and consumes them
//! headlessly, plus catalog checks and configuration management.

mod commands;
mod error;
mod logging;
mod runner;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use satsky::pick::DEFAULT_PICK_RADIUS;

use commands::check::CheckArgs;
use commands::config::ConfigCommands;
use commands::run::{parse_pixel, RunArgs};
use error::CliError;
use runner::CliRunner;

#[derive(Parser)]
#[command(name = "satsky")]
#[command(version = satsky::VERSION)]
#[command(about = "All-sky satellite projection frames, rendered ahead of real time", long_about = None)]
struct Cli {
    /// Configuration file (defaults to <config dir>/satsky/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Produce and consume frames in real time
    Run {
        /// Directory of *.tle element files (overrides catalog.tle_dir)
        #[arg(long)]
        tle_dir: Option<PathBuf>,

        /// First frame instant, RFC 3339 (default: now + timing.start_delay_secs)
        #[arg(long)]
        start: Option<DateTime<Utc>>,

        /// Stop after showing this many seconds of frames
        #[arg(long)]
        duration: Option<u64>,

        /// Write frames as PNG files into this directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only write every Nth frame
        #[arg(long, default_value_t = 1)]
        save_every: usize,

        /// Select the object nearest ROW,COL in the first frame and track it
        #[arg(long, value_parser = parse_pixel)]
        pick: Option<(i64, i64)>,

        /// Search radius in pixels for picking and tracking
        #[arg(long, default_value_t = DEFAULT_PICK_RADIUS)]
        pick_radius: u32,
    },

    /// Parse and validate an element catalog
    Check {
        /// Directory of *.tle element files (overrides catalog.tle_dir)
        #[arg(long)]
        tle_dir: Option<PathBuf>,

        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Config { command } => commands::config::run(command, cli.config.as_deref()),
        Commands::Check { tle_dir, json } => {
            let runner = CliRunner::new(cli.config.as_deref(), cli.verbose)?;
            commands::check::run(runner, CheckArgs { tle_dir, json })
        }
        Commands::Run {
            tle_dir,
            start,
            duration,
            output,
            save_every,
            pick,
            pick_radius,
        } => {
            let runner = CliRunner::new(cli.config.as_deref(), cli.verbose)?;
            commands::run::run(
                runner,
                RunArgs {
                    tle_dir,
                    start,
                    duration: duration.map(Duration::from_secs),
                    output,
                    save_every,
                    pick,
                    pick_radius,
                },
            )
        }
    }
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
