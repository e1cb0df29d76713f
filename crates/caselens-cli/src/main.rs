//! CLI application for batch extraction of court-judgment metadata.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use commands::{config, inspect, run, status};

/// Court judgment metadata extraction - PDFs in, one spreadsheet per batch out
#[derive(Parser)]
#[command(name = "caselens")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process the next batch of unprocessed PDFs
    Run(run::RunArgs),

    /// Run every extractor on a single PDF and print the fields
    Inspect(inspect::InspectArgs),

    /// Show how many PDFs are processed and remaining
    Status(status::StatusArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

/// Console log filter: `RUST_LOG` if set, otherwise the `-v` level.
pub(crate) fn console_filter(verbose: u8) -> EnvFilter {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy()
}

fn main() -> anyhow::Result<()> {
    execute(Cli::parse())
}

/// Runs one command under a console subscriber scoped to this call.
/// `run` installs its own per-run subscriber on top of it.
fn execute(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        verbose,
        config: config_file,
        command,
    } = cli;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(console_filter(verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let config_path = config_file.as_deref();
        match command {
            Commands::Run(args) => run::run(args, config_path, verbose),
            Commands::Inspect(args) => inspect::run(args, config_path),
            Commands::Status(args) => status::run(args, config_path),
            Commands::Config(args) => config::run(args, config_path),
        }
    })
}
