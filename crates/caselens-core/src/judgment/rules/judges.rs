//! Sections of law mentioned, document language and country.

use lazy_static::lazy_static;
use regex::Regex;

use super::patterns::{is_reference_text, BODY_HEADINGS, PARAGRAPH_BREAK};
use super::{dedup_ordered, join_or_none, split_paragraphs};
use crate::judgment::{put, put_or_not_found, Extractor, Result};
use crate::models::{ExtractorId, FieldMap};
use crate::pdf::CaseDocument;

lazy_static! {
    static ref SECTION_PATTERNS: Vec<Regex> = [
        r"(?i)Section\s+\d+[A-Za-z]?(?:\(\d+\))?\s*(?:of\s+)?(?:the\s+)?[A-Za-z\s]+(?:Act|Code|Rules|Regulation|Ordinance)(?:,\s*\d{4})?",
        r"(?i)Article\s+\d+[A-Za-z]?(?:\(\d+\))?\s*(?:of\s+)?(?:the\s+)?[A-Za-z\s]+Constitution(?:,\s*\d{4})?",
        r"(?i)Rule\s+\d+[A-Za-z]?(?:\(\d+\))?\s*(?:of\s+)?(?:the\s+)?[A-Za-z\s]+(?:Rules|Regulations)(?:,\s*\d{4})?",
        r"(?i)\bSec\.\s+\d+[A-Za-z]?(?:\(\d+\))?",
        r"(?i)\bArt\.\s+\d+[A-Za-z]?(?:\(\d+\))?",
        r"(?i)Section\s+\d+[A-Za-z]?/[A-Za-z\s]+(?:Act|Code|Rules|Regulation|Ordinance)(?:,\s*\d{4})?",
        r"(?i)Clause\s+\d+[A-Za-z]?\s*(?:of\s+)?(?:the\s+)?[A-Za-z\s]+(?:Act|Code|Rules|Constitution)(?:,\s*\d{4})?",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect();
}

/// Judges extractor: provisions cited, language and jurisdiction.
pub struct JudgesExtractor;

impl JudgesExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JudgesExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for JudgesExtractor {
    fn id(&self) -> ExtractorId {
        ExtractorId::Judges
    }

    fn extract(&self, doc: &CaseDocument) -> Result<FieldMap> {
        let text = doc.text()?;

        let mut fields = FieldMap::new();
        put_or_not_found(&mut fields, "Section (Law Mentioned)", join_or_none(&extract_sections(text)));
        put(&mut fields, "Language of the Document", detect_language(text));
        put(&mut fields, "Country", "India");
        Ok(fields)
    }
}

/// Provisions mentioned in the whole text, then in each non-citation paragraph.
fn extract_sections(text: &str) -> Vec<String> {
    let scan = |haystack: &str| -> Vec<String> {
        SECTION_PATTERNS
            .iter()
            .flat_map(|pattern| pattern.find_iter(haystack).map(|m| m.as_str().trim().to_string()))
            .collect()
    };

    let mut found = scan(text);
    for paragraph in split_paragraphs(text, &PARAGRAPH_BREAK, Some(&*BODY_HEADINGS)) {
        if !is_reference_text(paragraph) {
            found.extend(scan(paragraph));
        }
    }
    dedup_ordered(found)
}

/// Language by dominant script in the opening text.
fn detect_language(text: &str) -> &'static str {
    let (mut latin, mut devanagari, mut tamil) = (0usize, 0usize, 0usize);
    for c in text.chars().take(1000) {
        match c {
            'a'..='z' | 'A'..='Z' => latin += 1,
            '\u{0900}'..='\u{097F}' => devanagari += 1,
            '\u{0B80}'..='\u{0BFF}' => tamil += 1,
            _ => {}
        }
    }

    if devanagari > latin && devanagari >= tamil {
        "Hindi"
    } else if tamil > latin {
        "Tamil"
    } else {
        "English"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_sections() {
        let text = "The appellant was convicted under Section 302 of the Indian Penal Code.\n\n\
                    Relief was sought under Art. 32 and Sec. 482.";
        let sections = extract_sections(text);
        assert_eq!(
            sections,
            vec!["Section 302 of the Indian Penal Code", "Sec. 482", "Art. 32"]
        );
    }

    #[test]
    fn test_detect_language() {
        assert_eq!(detect_language("The appeal is dismissed"), "English");
        assert_eq!(detect_language("अपील खारिज की जाती है"), "Hindi");
        assert_eq!(detect_language("மேல்முறையீடு தள்ளுபடி"), "Tamil");
    }

    #[test]
    fn test_extract_fields() {
        let doc = CaseDocument::from_pages("a.pdf", vec!["No provisions here".to_string()]);
        let fields = JudgesExtractor::new().extract(&doc).unwrap();
        assert_eq!(fields["Section (Law Mentioned)"].as_text(), Some("Not found"));
        assert_eq!(fields["Language of the Document"].as_text(), Some("English"));
        assert_eq!(fields["Country"].as_text(), Some("India"));
    }
}
