//! Data models: configuration and extraction records.

pub mod config;
pub mod record;

pub use config::{BatchConfig, CaseLensConfig, ExtractionConfig, LoggingConfig};
pub use record::{ExtractionRecord, ExtractorId, ExtractorOutcome, ExtractorSection, FieldMap, FieldValue};
