//! Conclusion of the judgment, searched from the last page backwards.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use super::patterns::PARAGRAPH_BREAK;
use super::{split_paragraphs, Rule, RuleSet};
use crate::error::ExtractError;
use crate::judgment::{put, Extractor, Result};
use crate::models::{ExtractorId, FieldMap};
use crate::pdf::CaseDocument;

lazy_static! {
    static ref PAGE_HEADINGS: Regex = Regex::new(
        r"\b(?:Judgment|Conclusion|Appearances|Facts|Background|Issue)\b"
    ).unwrap();

    static ref CONCLUSION_HEADINGS: RuleSet = RuleSet::new(vec![
        Rule::new("conclusion", r"(?i)Conclusions?\b"),
        Rule::new("our_conclusion", r"(?i)OUR CONCLUSION\b"),
        Rule::new("final_remarks", r"(?i)Final Remarks\b"),
        Rule::new("summary_of_findings", r"(?i)Summary of Findings\b"),
        Rule::new("judgment_summary", r"(?i)Judgment Summary\b"),
        Rule::new("concluding_remarks", r"(?i)Concluding Remarks\b"),
    ]);
}

/// Case details extractor.
pub struct CaseDetailsExtractor;

impl CaseDetailsExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CaseDetailsExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for CaseDetailsExtractor {
    fn id(&self) -> ExtractorId {
        ExtractorId::CaseDetails
    }

    fn extract(&self, doc: &CaseDocument) -> Result<FieldMap> {
        let pages: Vec<&str> = doc.pages()?.iter().map(|p| p.trim()).collect();
        if pages.iter().all(|p| p.is_empty()) {
            return Err(ExtractError::NoText);
        }

        let mut fields = FieldMap::new();
        put(&mut fields, "Conclusion", conclusion(&pages));
        Ok(fields)
    }
}

/// The conclusion paragraph onwards, through the end of the document.
/// Without a conclusion heading, the last two pages.
fn conclusion(pages: &[&str]) -> String {
    for (idx, page) in pages.iter().enumerate().rev() {
        let paragraphs = split_paragraphs(page, &PARAGRAPH_BREAK, Some(&*PAGE_HEADINGS));
        if let Some(start) = paragraphs.iter().position(|p| CONCLUSION_HEADINGS.is_match(p)) {
            debug!("Conclusion found on page {}", idx + 1);
            let mut parts = paragraphs[start..].to_vec();
            parts.extend(&pages[idx + 1..]);
            return parts.join("\n");
        }
    }

    debug!("No conclusion heading, using the closing pages");
    pages[pages.len().saturating_sub(2)..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pages(texts: &[&str]) -> CaseDocument {
        CaseDocument::from_pages("details.pdf", texts.iter().map(|t| t.to_string()).collect())
    }

    fn extract(doc: &CaseDocument) -> String {
        let fields = CaseDetailsExtractor::new().extract(doc).unwrap();
        fields["Conclusion"].as_text().unwrap().to_string()
    }

    #[test]
    fn test_conclusion_with_following_pages() {
        let doc = pages(&[
            "Facts of the case",
            "Analysis\n\nConclusion\nThe appeal must fail",
            "Appeal dismissed.",
        ]);
        assert_eq!(extract(&doc), "Conclusion\nThe appeal must fail\nAppeal dismissed.");
    }

    #[test]
    fn test_latest_conclusion_wins() {
        let doc = pages(&["Conclusion of the trial court", "Some discussion", "Final Remarks: dismissed"]);
        assert_eq!(extract(&doc), "Final Remarks: dismissed");
    }

    #[test]
    fn test_fallback_to_last_two_pages() {
        let doc = pages(&["one", "two", "three"]);
        assert_eq!(extract(&doc), "two\nthree");

        let single = pages(&["only page"]);
        assert_eq!(extract(&single), "only page");
    }

    #[test]
    fn test_blank_pages() {
        let doc = pages(&["", "  "]);
        let err = CaseDetailsExtractor::new().extract(&doc).unwrap_err();
        assert_eq!(err, ExtractError::NoText);
    }
}
