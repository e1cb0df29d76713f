//! Config command - manage configuration.

use std::fs;
use std::path::Path;

use anyhow::Context;
use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use caselens_core::CaseLensConfig;

use super::default_config_path;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Write a configuration file with default values
    Init {
        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },

    /// Get a specific configuration value
    Get {
        /// Configuration key (e.g., "batch.batch_size")
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// New value (JSON, or a plain string)
        value: String,
    },

    /// Show configuration file path
    Path,
}

/// Every subcommand works on the `-c` file when given, else the default location.
pub fn run(args: ConfigArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let path = config_path.map(Path::to_path_buf).unwrap_or_else(default_config_path);

    match args.command {
        ConfigCommand::Show => {
            let config = read_or_default(&path)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigCommand::Init { force } => init_config(&path, force)?,
        ConfigCommand::Get { key } => {
            let json = serde_json::to_value(read_or_default(&path)?)?;
            let value = lookup(&json, &key).with_context(|| format!("Configuration key not found: {key}"))?;
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        ConfigCommand::Set { key, value } => set_config(&path, &key, &value)?,
        ConfigCommand::Path => show_path(&path),
    }
    Ok(())
}

fn read_or_default(path: &Path) -> anyhow::Result<CaseLensConfig> {
    if !path.exists() {
        return Ok(CaseLensConfig::default());
    }
    CaseLensConfig::from_file(path).with_context(|| format!("failed to read {}", path.display()))
}

fn write_config(path: &Path, config: &CaseLensConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    config
        .save(path)
        .with_context(|| format!("failed to write {}", path.display()))
}

fn init_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    write_config(path, &CaseLensConfig::default())?;
    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        path.display()
    );
    Ok(())
}

fn set_config(path: &Path, key: &str, raw: &str) -> anyhow::Result<()> {
    let value: Value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));

    let mut json = serde_json::to_value(read_or_default(path)?)?;
    assign(&mut json, key, value.clone())?;
    let config: CaseLensConfig =
        serde_json::from_value(json).with_context(|| format!("Invalid value for {key}: {raw}"))?;
    write_config(path, &config)?;

    println!(
        "{} Set {} = {}",
        style("✓").green(),
        key,
        serde_json::to_string(&value)?
    );
    Ok(())
}

fn show_path(path: &Path) {
    println!("Configuration file: {}", path.display());

    if path.exists() {
        println!("Status: {}", style("exists").green());
    } else {
        println!("Status: {}", style("not created").yellow());
        println!();
        println!("Run 'caselens config init' to create a configuration file.");
    }
}

/// Value at a dotted key path.
fn lookup<'a>(json: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.').try_fold(json, |current, part| current.get(part))
}

/// Replace the value at an existing dotted key path. Unknown keys are rejected.
fn assign(json: &mut Value, key: &str, value: Value) -> anyhow::Result<()> {
    let mut current = json;
    for part in key.split('.') {
        current = current
            .get_mut(part)
            .with_context(|| format!("Configuration key not found: {key}"))?;
    }
    if current.is_object() {
        anyhow::bail!("{key} is a section, set one of its keys instead");
    }
    *current = value;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup() {
        let json = serde_json::to_value(CaseLensConfig::default()).unwrap();
        assert_eq!(lookup(&json, "batch.batch_size"), Some(&json!(200)));
        assert_eq!(lookup(&json, "batch.missing"), None);
    }

    #[test]
    fn test_assign_rejects_unknown_and_sections() {
        let mut json = serde_json::to_value(CaseLensConfig::default()).unwrap();
        assign(&mut json, "extraction.max_outcome_sentences", json!(20)).unwrap();
        assert_eq!(lookup(&json, "extraction.max_outcome_sentences"), Some(&json!(20)));

        assert!(assign(&mut json, "batch.nope", json!(1)).is_err());
        assert!(assign(&mut json, "batch", json!(1)).is_err());
    }

    #[test]
    fn test_set_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        set_config(&path, "batch.ledger_file", "done.txt").unwrap();

        let config = CaseLensConfig::from_file(&path).unwrap();
        assert_eq!(config.batch.ledger_file, "done.txt");
        assert!(set_config(&path, "batch.batch_size", "\"many\"").is_err());
    }
}
