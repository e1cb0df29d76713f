//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};

/// Main configuration for the caselens pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseLensConfig {
    /// Batch driver configuration.
    pub batch: BatchConfig,

    /// Extractor configuration.
    pub extraction: ExtractionConfig,

    /// Log file configuration.
    pub logging: LoggingConfig,
}

/// Batch driver configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Maximum number of documents processed per invocation.
    pub batch_size: usize,

    /// Cap on the number of input documents ever considered.
    pub max_documents: usize,

    /// Ledger file name, created next to the output artifacts.
    pub ledger_file: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 200,
            max_documents: 700,
            ledger_file: "processed_files.txt".to_string(),
        }
    }
}

/// Extractor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Number of trailing sentences searched for the case outcome.
    pub max_outcome_sentences: usize,

    /// Sentences kept when no outcome keyword matches.
    pub fallback_outcome_sentences: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_outcome_sentences: 50,
            fallback_outcome_sentences: 4,
        }
    }
}

/// Log file configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log file name, created in the output directory.
    pub log_file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_file: "pipeline_log.txt".to_string(),
        }
    }
}

impl CaseLensConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CaseLensConfig::default();
        assert_eq!(config.batch.batch_size, 200);
        assert_eq!(config.batch.max_documents, 700);
        assert_eq!(config.batch.ledger_file, "processed_files.txt");
        assert_eq!(config.logging.log_file, "pipeline_log.txt");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: CaseLensConfig =
            serde_json::from_str(r#"{ "batch": { "batch_size": 25 } }"#).unwrap();
        assert_eq!(config.batch.batch_size, 25);
        assert_eq!(config.batch.max_documents, 700);
        assert_eq!(config.extraction.max_outcome_sentences, 50);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = CaseLensConfig::default();
        config.batch.ledger_file = "done.txt".to_string();
        config.save(&path).unwrap();

        let loaded = CaseLensConfig::from_file(&path).unwrap();
        assert_eq!(loaded.batch.ledger_file, "done.txt");
    }
}
