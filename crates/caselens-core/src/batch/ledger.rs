//! Append-only record of processed document names.

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::LedgerError;

/// Plain text file, one document name per line.
#[derive(Debug, Clone)]
pub struct ProgressLedger {
    path: PathBuf,
}

impl ProgressLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every recorded name. A missing file is an empty ledger.
    pub fn load_all(&self) -> Result<HashSet<String>, LedgerError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(HashSet::new()),
            Err(source) => {
                return Err(LedgerError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let names: HashSet<String> = content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        debug!("Loaded {} processed name(s) from {}", names.len(), self.path.display());
        Ok(names)
    }

    /// Append one name and sync it to disk before returning.
    pub fn mark(&self, document: &str) -> Result<(), LedgerError> {
        let append = || -> std::io::Result<()> {
            let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
            writeln!(file, "{document}")?;
            file.flush()?;
            file.sync_data()
        };
        append().map_err(|source| LedgerError::Append {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ProgressLedger::new(dir.path().join("processed_files.txt"));
        assert!(ledger.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_mark_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ProgressLedger::new(dir.path().join("processed_files.txt"));
        ledger.mark("a.pdf").unwrap();
        ledger.mark("b.pdf").unwrap();
        fs::write(
            ledger.path(),
            format!("{}\n\n", fs::read_to_string(ledger.path()).unwrap()),
        )
        .unwrap();

        let names = ledger.load_all().unwrap();
        assert_eq!(names.len(), 2);
        assert!(names.contains("a.pdf"));
        assert!(names.contains("b.pdf"));
        assert_eq!(fs::read_to_string(ledger.path()).unwrap().lines().next(), Some("a.pdf"));
    }

    #[test]
    fn test_mark_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ProgressLedger::new(dir.path().join("missing").join("ledger.txt"));
        assert!(matches!(ledger.mark("a.pdf"), Err(LedgerError::Append { .. })));
    }
}
