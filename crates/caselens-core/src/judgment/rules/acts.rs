//! The "List of Acts" section, verbatim.

use lazy_static::lazy_static;
use regex::Regex;

use crate::judgment::{put_or_not_found, Extractor, Result};
use crate::models::{ExtractorId, FieldMap};
use crate::pdf::CaseDocument;

lazy_static! {
    static ref LIST_OF_ACTS: Regex = Regex::new(r"(?i)List of Acts").unwrap();
    static ref NEXT_SECTION: Regex = Regex::new(r"(?i)\n(?:List of Keywords|Case Arising From)").unwrap();
}

/// Acts extractor.
pub struct ActsExtractor;

impl ActsExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ActsExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for ActsExtractor {
    fn id(&self) -> ExtractorId {
        ExtractorId::Acts
    }

    fn extract(&self, doc: &CaseDocument) -> Result<FieldMap> {
        let mut fields = FieldMap::new();
        put_or_not_found(&mut fields, "List of Acts", list_of_acts(doc.text()?));
        Ok(fields)
    }
}

/// From the heading up to the next section heading or the end of the text.
fn list_of_acts(text: &str) -> Option<String> {
    let start = LIST_OF_ACTS.find(text)?.start();
    let end = NEXT_SECTION
        .find(&text[start..])
        .map(|m| start + m.start())
        .unwrap_or(text.len());
    Some(text[start..end].trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_of_acts_stops_at_next_section() {
        let text = "Headnotes\n...\nList of Acts\nIndian Penal Code, 1860\nList of Keywords\nMurder";
        assert_eq!(list_of_acts(text).unwrap(), "List of Acts\nIndian Penal Code, 1860");
    }

    #[test]
    fn test_list_of_acts_runs_to_end() {
        let text = "List of Acts\nArbitration and Conciliation Act, 1996\n";
        assert_eq!(list_of_acts(text).unwrap(), "List of Acts\nArbitration and Conciliation Act, 1996");
    }

    #[test]
    fn test_missing_section() {
        let doc = CaseDocument::from_pages("a.pdf", vec!["no acts listed".to_string()]);
        let fields = ActsExtractor::new().extract(&doc).unwrap();
        assert_eq!(fields["List of Acts"].as_text(), Some("Not found"));
    }
}
