//! CLI commands.

pub mod config;
pub mod inspect;
pub mod run;
pub mod status;

use std::path::{Path, PathBuf};

use anyhow::Context;
use caselens_core::CaseLensConfig;

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("caselens")
        .join("config.json")
}

/// The `-c` file if given (it must exist), else the default file if present, else defaults.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<CaseLensConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let path = default_config_path();
            if !path.exists() {
                return Ok(CaseLensConfig::default());
            }
            path
        }
    };

    CaseLensConfig::from_file(&path).with_context(|| format!("failed to load config from {}", path.display()))
}
