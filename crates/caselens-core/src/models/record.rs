//! Per-document extraction records.
//!
//! A record is keyed by the identity of the extractor that produced each
//! section. Column names are rendered only when a record is written out.

use indexmap::IndexMap;
use serde::Serialize;

/// Ordered field name to value mapping returned by one extractor.
pub type FieldMap = IndexMap<String, FieldValue>;

/// Value of an extracted field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Free text.
    Text(String),
    /// Yes/no flag.
    Flag(bool),
}

impl FieldValue {
    /// Text content, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Flag(_) => None,
        }
    }

    /// Flag content, if this is a boolean value.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            FieldValue::Flag(b) => Some(*b),
            FieldValue::Text(_) => None,
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

/// Identity of each extractor, in the order the driver runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractorId {
    LegalDetails,
    Parties,
    Judges,
    LegalReferences,
    Acts,
    Citation,
    Background,
    CrimeInfo,
    CaseOutcomes,
    CaseDetails,
}

impl ExtractorId {
    /// All extractors in run order.
    pub const ALL: [ExtractorId; 10] = [
        ExtractorId::LegalDetails,
        ExtractorId::Parties,
        ExtractorId::Judges,
        ExtractorId::LegalReferences,
        ExtractorId::Acts,
        ExtractorId::Citation,
        ExtractorId::Background,
        ExtractorId::CrimeInfo,
        ExtractorId::CaseOutcomes,
        ExtractorId::CaseDetails,
    ];

    /// Human readable label, used as the column prefix.
    pub fn label(&self) -> &'static str {
        match self {
            ExtractorId::LegalDetails => "Legal Details",
            ExtractorId::Parties => "Parties",
            ExtractorId::Judges => "Judges",
            ExtractorId::LegalReferences => "Legal References",
            ExtractorId::Acts => "Acts",
            ExtractorId::Citation => "Citation",
            ExtractorId::Background => "Background",
            ExtractorId::CrimeInfo => "Crime Info",
            ExtractorId::CaseOutcomes => "Case Outcomes",
            ExtractorId::CaseDetails => "Case Details",
        }
    }
}

impl std::fmt::Display for ExtractorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// What one extractor produced for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum ExtractorOutcome {
    /// Extracted fields.
    Fields(FieldMap),
    /// The extractor ran but found nothing.
    Empty,
    /// The extractor failed with this message.
    Failed(String),
}

impl ExtractorOutcome {
    /// Whether this outcome is a failure or empty marker.
    pub fn is_marker(&self) -> bool {
        !matches!(self, ExtractorOutcome::Fields(_))
    }
}

/// One extractor's section of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractorSection {
    pub extractor: ExtractorId,
    pub outcome: ExtractorOutcome,
}

/// Merged result for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionRecord {
    /// Document identifier (file name).
    pub document: String,

    /// Sections in extractor run order.
    pub sections: Vec<ExtractorSection>,
}

impl ExtractionRecord {
    /// Create an empty record for a document.
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            sections: Vec::new(),
        }
    }

    /// Add an extractor's outcome.
    pub fn push(&mut self, extractor: ExtractorId, outcome: ExtractorOutcome) {
        self.sections.push(ExtractorSection { extractor, outcome });
    }

    /// Outcome recorded for an extractor.
    pub fn outcome(&self, extractor: ExtractorId) -> Option<&ExtractorOutcome> {
        self.sections
            .iter()
            .find(|s| s.extractor == extractor)
            .map(|s| &s.outcome)
    }

    /// Look up one field value.
    pub fn field(&self, extractor: ExtractorId, name: &str) -> Option<&FieldValue> {
        match self.outcome(extractor)? {
            ExtractorOutcome::Fields(fields) => fields.get(name),
            _ => None,
        }
    }

    /// Number of sections that carry a failure or empty marker.
    pub fn marker_count(&self) -> usize {
        self.sections.iter().filter(|s| s.outcome.is_marker()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_lookup() {
        let mut fields = FieldMap::new();
        fields.insert("Case Title".to_string(), "A v. B".into());

        let mut record = ExtractionRecord::new("a.pdf");
        record.push(ExtractorId::LegalDetails, ExtractorOutcome::Fields(fields));
        record.push(ExtractorId::Parties, ExtractorOutcome::Failed("boom".to_string()));

        assert_eq!(
            record.field(ExtractorId::LegalDetails, "Case Title"),
            Some(&FieldValue::Text("A v. B".to_string()))
        );
        assert_eq!(record.field(ExtractorId::Parties, "Case Title"), None);
        assert_eq!(record.marker_count(), 1);
    }

    #[test]
    fn test_serialize_outcomes() {
        let mut record = ExtractionRecord::new("a.pdf");
        record.push(ExtractorId::CrimeInfo, ExtractorOutcome::Empty);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["document"], "a.pdf");
        assert_eq!(json["sections"][0]["extractor"], "crime_info");
        assert_eq!(json["sections"][0]["outcome"]["status"], "empty");
    }
}
