//! Judgment field extraction module.
//!
//! Each extractor reads the shared page texts of a [`CaseDocument`] and returns
//! a flat, ordered map of named fields. Extractors hold no mutable state and
//! never touch the filesystem beyond the document's own lazy load.

pub mod rules;

use crate::error::ExtractError;
use crate::models::{ExtractionConfig, ExtractorId, FieldMap, FieldValue};
use crate::pdf::CaseDocument;

pub use rules::patterns::NOT_FOUND;
pub use rules::{
    ActsExtractor, BackgroundExtractor, CaseDetailsExtractor, CaseOutcomesExtractor,
    CitationExtractor, CrimeInfoExtractor, JudgesExtractor, LegalDetailsExtractor,
    LegalReferencesExtractor, PartiesExtractor,
};

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Trait for judgment field extractors.
pub trait Extractor {
    /// Which extractor this is. Also decides the column prefix in the output.
    fn id(&self) -> ExtractorId;

    /// Extract fields from a document.
    fn extract(&self, doc: &CaseDocument) -> Result<FieldMap>;
}

/// The full extractor sequence, in run order.
pub fn default_extractors(config: &ExtractionConfig) -> Vec<Box<dyn Extractor>> {
    vec![
        Box::new(LegalDetailsExtractor::new()),
        Box::new(PartiesExtractor::new()),
        Box::new(JudgesExtractor::new()),
        Box::new(LegalReferencesExtractor::new()),
        Box::new(ActsExtractor::new()),
        Box::new(CitationExtractor::new()),
        Box::new(BackgroundExtractor::new()),
        Box::new(CrimeInfoExtractor::new()),
        Box::new(CaseOutcomesExtractor::from_config(config)),
        Box::new(CaseDetailsExtractor::new()),
    ]
}

/// Insert a text field.
pub(crate) fn put(fields: &mut FieldMap, name: &str, value: impl Into<String>) {
    fields.insert(name.to_string(), FieldValue::Text(value.into()));
}

/// Insert a text field, or [`NOT_FOUND`] when absent.
pub(crate) fn put_or_not_found(fields: &mut FieldMap, name: &str, value: Option<String>) {
    put(fields, name, value.unwrap_or_else(|| NOT_FOUND.to_string()));
}
