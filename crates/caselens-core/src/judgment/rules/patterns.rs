//! Common regex patterns for Indian Supreme Court judgments.

use lazy_static::lazy_static;
use regex::Regex;

use super::{Rule, RuleSet};

/// Value used for any text field that could not be extracted.
pub const NOT_FOUND: &str = "Not found";

lazy_static! {
    pub static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();

    pub static ref SENTENCE_BREAK: Regex = Regex::new(r"[.!?]+").unwrap();

    // Numbered paragraph starts and blank lines
    pub static ref PARAGRAPH_BREAK: Regex = Regex::new(r"\n\s*\d+\.\s+|\n{2,}").unwrap();

    // Headings that open a new paragraph in the judgment body
    pub static ref BODY_HEADINGS: Regex = Regex::new(
        r"\b(?:Headnotes|Judgment|Order|List of Citations|Appearances|Conclusion|Discussion|Issue for Consideration|Question for Consideration)\b"
    ).unwrap();

    // Report annotation on the first line, e.g. "[2024] 10 S.C.R. 961 : 2024 INSC 789"
    pub static ref SCR_ANNOTATION: Regex = Regex::new(
        r"\[\d{4}\]\s+\d+\s+S\.C\.R\.\s+\d+\s*:\s*\d+\s+INSC\s+\d+"
    ).unwrap();

    pub static ref SCR_ANNOTATION_CI: Regex = Regex::new(
        r"(?i)\[\d{4}\]\s+\d+\s+S\.C\.R\.\s+\d+\s*:\s*\d+\s+INSC\s+\d+"
    ).unwrap();

    pub static ref TRAILING_PAREN: Regex = Regex::new(r"\s*\(.*?\)$").unwrap();

    pub static ref TRAILING_ETC: Regex = Regex::new(r"(?i)\s*etc\.?$").unwrap();

    /// Sentences and paragraphs that quote or cite other decisions.
    pub static ref REFERENCE_TEXT: RuleSet = RuleSet::new(vec![
        Rule::new("air", r"(?i)\bAIR\s+\d{4}\b"),
        Rule::new("scc", r"(?i)\bSCC\s+\d+\b"),
        Rule::new("scr", r"(?i)\b\d{4}\s+SCR\s+\d+\b"),
        Rule::new("sc", r"(?i)\[\d{4}\]\s+\d+\s+SC\s+\d+\b"),
        Rule::new("versus_year", r"(?i)\bvs?\.\s+[A-Za-z\s]+,\s*\d{4}\b"),
        Rule::new("quoted", r"(?i)\bquoted\s+in\b"),
        Rule::new("relied", r"(?i)\brelied\s+upon\b"),
        Rule::new("case_of", r"(?i)\bcase\s+of\s+[A-Za-z\s]+\s+v\s+"),
        Rule::new("referred", r"(?i)\breferred\s+to\s+in\b"),
    ]);

    /// Case name followed by a bracketed year, e.g. "Ram Lal v State, [1999]".
    pub static ref CASE_NAME_CITATION: Regex = Regex::new(
        r"(?i)\b[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*\s+v\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*,\s*\[\d{4}\]"
    ).unwrap();
}

/// Whether a passage cites or quotes another decision.
pub fn is_reference_text(text: &str) -> bool {
    REFERENCE_TEXT.is_match(text)
}
