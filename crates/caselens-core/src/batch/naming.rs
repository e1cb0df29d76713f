//! Artifact file names derived from the output file template.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::debug;

/// Naming scheme for `<base>_batch_<N>.xlsx` and `<base>_batch_<N>_temp.xlsx`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNames {
    dir: PathBuf,
    base: String,
}

impl ArtifactNames {
    /// Directory and base name from an output file path such as `out/results.xlsx`.
    pub fn from_template(output_file: &Path) -> Self {
        let dir = match output_file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let base = output_file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "results".to_string());
        Self { dir, base }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn final_path(&self, batch: u32) -> PathBuf {
        self.dir.join(format!("{}_batch_{batch}.xlsx", self.base))
    }

    pub fn temp_path(&self, batch: u32) -> PathBuf {
        self.dir.join(format!("{}_batch_{batch}_temp.xlsx", self.base))
    }

    /// One more than the highest batch number in the directory, final or temp.
    /// A leftover temp artifact still holds its batch, so its number is never reused.
    /// A missing directory gives 1.
    pub fn next_batch_number(&self) -> u32 {
        let pattern = format!(r"^{}_batch_(\d+)(?:_temp)?\.xlsx$", regex::escape(&self.base));
        let Ok(artifact_name) = Regex::new(&pattern) else {
            return 1;
        };

        let highest = fs::read_dir(&self.dir)
            .into_iter()
            .flatten()
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name();
                let caps = artifact_name.captures(name.to_str()?)?;
                caps[1].parse::<u32>().ok()
            })
            .max()
            .unwrap_or(0);

        debug!("Highest existing batch for {} is {}", self.base, highest);
        highest.saturating_add(1)
    }
}
