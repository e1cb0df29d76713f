//! Run command - process the next batch of PDFs.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, Layer};

use caselens_core::error::SinkError;
use caselens_core::{BatchDriver, BatchJob, BatchObserver, BatchOutcome, CaseLensConfig, ExtractionRecord};

use super::load_config;
use crate::console_filter;

/// Arguments for the run command.
#[derive(Args)]
pub struct RunArgs {
    /// Directory containing the judgment PDFs
    input_dir: PathBuf,

    /// Output file template; batches are saved as <name>_batch_<N>.xlsx beside it
    output_file: PathBuf,

    /// Maximum PDFs processed in this run
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Cap on the number of PDFs ever considered in the input directory
    #[arg(short, long)]
    max_documents: Option<usize>,
}

pub fn run(args: RunArgs, config_path: Option<&Path>, verbose: u8) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let mut job = BatchJob::from_config(&args.input_dir, &args.output_file, &config.batch);
    if let Some(batch_size) = args.batch_size {
        job = job.with_batch_size(batch_size);
    }
    if let Some(max_documents) = args.max_documents {
        job = job.with_max_documents(max_documents);
    }

    let log_path = job.names().dir().join(&config.logging.log_file);
    let file_layer = match open_log(&log_path) {
        Ok(file) => Some(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false)
                .with_filter(LevelFilter::INFO),
        ),
        Err(e) => {
            eprintln!(
                "{} Cannot write log file {}: {e}",
                style("⚠").yellow(),
                log_path.display()
            );
            None
        }
    };

    let subscriber = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(console_filter(verbose)),
        )
        .with(file_layer);

    tracing::subscriber::with_default(subscriber, || execute(&job, &config))
}

fn open_log(path: &Path) -> std::io::Result<File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

fn execute(job: &BatchJob, config: &CaseLensConfig) -> anyhow::Result<()> {
    let driver = BatchDriver::from_config(config);
    let observer = CliObserver::new();

    let outcome = driver.run(job, &observer);
    observer.bar.finish_and_clear();

    match outcome? {
        BatchOutcome::AllProcessed { discovered } => {
            println!(
                "{} All PDFs have been processed ({discovered} found)",
                style("✓").green()
            );
        }
        BatchOutcome::Completed(summary) => {
            println!(
                "{} Batch {} of {} PDFs processed. Results saved to {}",
                style("✓").green(),
                summary.batch_number,
                summary.documents,
                summary.artifact.display()
            );
            if summary.writer != "xlsx" {
                println!("  Saved with the {} writer", summary.writer);
            }
            if summary.failed_extractions > 0 {
                println!(
                    "{} {} extractor result(s) recorded as errors",
                    style("⚠").yellow(),
                    summary.failed_extractions
                );
            }
            if summary.remaining > 0 {
                println!(
                    "{} {} PDF(s) remaining. Run again to process the next batch.",
                    style("ℹ").blue(),
                    summary.remaining
                );
            } else {
                println!("{} All PDFs have been processed", style("✓").green());
            }
        }
    }

    Ok(())
}

/// Progress bar over the documents of one batch.
struct CliObserver {
    bar: ProgressBar,
}

impl CliObserver {
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.green} {prefix} [{bar:40.cyan/blue}] {pos}/{len} {wide_msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        Self { bar }
    }
}

impl BatchObserver for CliObserver {
    fn batch_started(&self, batch_number: u32, documents: usize) {
        self.bar.set_length(documents as u64);
        self.bar.set_prefix(format!("Batch {batch_number}"));
    }

    fn document_started(&self, _index: usize, document: &str) {
        self.bar.set_message(document.to_string());
    }

    fn document_recorded(&self, record: &ExtractionRecord, _temp_path: &Path) {
        let markers = record.marker_count();
        if markers > 0 {
            self.bar.println(format!(
                "{} {}: {markers} extractor(s) failed",
                style("⚠").yellow(),
                record.document
            ));
        }
        self.bar.inc(1);
    }

    fn snapshot_failed(&self, document: &str, error: &SinkError) {
        self.bar.println(format!(
            "{} Failed to save intermediate results for {document}: {error}",
            style("✗").red()
        ));
    }
}
