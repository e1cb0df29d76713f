//! Status command - report progress without processing anything.

use std::path::{Path, PathBuf};

use clap::Args;
use console::style;

use caselens_core::{BatchDriver, BatchJob};

use super::load_config;

/// Arguments for the status command.
#[derive(Args)]
pub struct StatusArgs {
    /// Directory containing the judgment PDFs
    input_dir: PathBuf,

    /// Output file template used for the runs
    output_file: PathBuf,
}

pub fn run(args: StatusArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let job = BatchJob::from_config(&args.input_dir, &args.output_file, &config.batch);
    let plan = BatchDriver::from_config(&config).plan(&job)?;

    println!("Input directory: {}", job.input_dir.display());
    println!("Ledger:          {}", job.ledger().path().display());
    println!("PDFs found:      {}", plan.discovered);
    println!("Processed:       {}", plan.processed);
    println!("Remaining:       {}", plan.remaining.len());

    if plan.remaining.is_empty() {
        println!("{} All PDFs have been processed", style("✓").green());
    } else {
        let batches = plan.remaining.len().div_ceil(job.batch_size);
        println!(
            "{} Next run writes {} ({} more run(s) of up to {} PDFs)",
            style("ℹ").blue(),
            job.names().final_path(plan.next_batch).display(),
            batches,
            job.batch_size
        );
    }
    Ok(())
}
