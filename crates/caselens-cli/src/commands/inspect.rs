//! Inspect command - run every extractor on one PDF.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, ValueEnum};
use console::style;
use tracing::info;

use caselens_core::{BatchDriver, ExtractionRecord, ExtractorOutcome, FieldValue};

use super::load_config;

/// Output format for inspect results.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

/// Arguments for the inspect command.
#[derive(Args)]
pub struct InspectArgs {
    /// Judgment PDF to inspect
    input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

pub fn run(args: InspectArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    if !args.input.is_file() {
        anyhow::bail!("File not found: {}", args.input.display());
    }

    let config = load_config(config_path)?;
    let start = Instant::now();
    let record = BatchDriver::from_config(&config).process_document(&args.input);
    info!("Inspected {} in {:?}", record.document, start.elapsed());

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&record)?),
        OutputFormat::Text => print!("{}", format_record_text(&record)),
    }
    Ok(())
}

fn format_record_text(record: &ExtractionRecord) -> String {
    let mut output = String::new();
    output.push_str(&format!("{}\n", style(&record.document).bold()));

    for section in &record.sections {
        output.push_str(&format!("\n== {} ==\n", section.extractor));
        match &section.outcome {
            ExtractorOutcome::Fields(fields) => {
                for (name, value) in fields {
                    let value = match value {
                        FieldValue::Text(text) => text.clone(),
                        FieldValue::Flag(true) => "Yes".to_string(),
                        FieldValue::Flag(false) => "No".to_string(),
                    };
                    output.push_str(&format!("{name}: {value}\n"));
                }
            }
            ExtractorOutcome::Empty => output.push_str("(empty result)\n"),
            ExtractorOutcome::Failed(message) => {
                output.push_str(&format!("{} {message}\n", style("error:").red()));
            }
        }
    }
    output
}
