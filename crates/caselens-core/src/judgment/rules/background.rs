//! Where the case came from: the "Case Arising From" block.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::judgment::{put_or_not_found, Extractor, Result};
use crate::models::{ExtractorId, FieldMap};
use crate::pdf::CaseDocument;

/// Line prefixes that close a background block.
const CLOSING_HEADINGS: &[&str] = &["judgment / order of the supreme court", "list of acts"];

lazy_static! {
    static ref CASE_ARISING: Regex = Regex::new(r"(?i)Case Arising From").unwrap();

    static ref LOWER_COURT_ORDER: Regex = Regex::new(
        r"(?i)From the Judgment and Orders?|Judgment and Order dated|Judgment dated|Order of the Court|Arising From"
    ).unwrap();
}

/// Background extractor.
pub struct BackgroundExtractor;

impl BackgroundExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BackgroundExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for BackgroundExtractor {
    fn id(&self) -> ExtractorId {
        ExtractorId::Background
    }

    fn extract(&self, doc: &CaseDocument) -> Result<FieldMap> {
        let text = doc.text()?;
        let mut fields = FieldMap::new();
        put_or_not_found(&mut fields, "Case Arising From", case_arising_from(text));
        Ok(fields)
    }
}

fn case_arising_from(text: &str) -> Option<String> {
    if let Some(heading) = CASE_ARISING.find(text) {
        return Some(block_around(text, heading.start(), heading.end()));
    }

    let blocks: Vec<String> = LOWER_COURT_ORDER
        .find_iter(text)
        .map(|m| block_around(text, m.start(), m.end()))
        .collect();
    debug!("No explicit heading, {} lower court reference(s) found", blocks.len());

    let preferred = blocks
        .iter()
        .position(|b| b.to_uppercase().contains("JURISDICTION"))
        .unwrap_or(0);
    blocks.into_iter().nth(preferred)
}

/// The block holding the match at `start..end`.
///
/// A match at the start of a line pulls in the previous line, and the one
/// before that too when it names the jurisdiction. The block runs until the
/// line before the next closing line.
fn block_around(text: &str, start: usize, end: usize) -> String {
    let mut begin = start;
    let heading_line = line_start(text, start);
    if heading_line > 0 && text[heading_line..start].trim().is_empty() {
        begin = line_start(text, heading_line - 1);
        if begin > 0 {
            let before = line_start(text, begin - 1);
            if text[before..begin].to_uppercase().contains("JURISDICTION") {
                begin = before;
            }
        }
    }

    let mut finish = text.len();
    let mut pos = end;
    while let Some(offset) = text[pos..].find('\n') {
        let next_start = pos + offset + 1;
        let next_end = text[next_start..]
            .find('\n')
            .map(|i| next_start + i)
            .unwrap_or(text.len());
        if is_closing_line(&text[next_start..next_end]) {
            finish = pos + offset;
            break;
        }
        pos = next_start;
    }

    text[begin..finish].trim().to_string()
}

fn line_start(text: &str, pos: usize) -> usize {
    text[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0)
}

/// Page numbers, single letters, all-letter heading lines and the known
/// section headings.
fn is_closing_line(line: &str) -> bool {
    let line = line.trim();
    if line.is_empty() {
        return false;
    }
    let chars = line.chars().count();
    let lower = line.to_lowercase();

    (chars >= 10 && line.chars().all(|c| c.is_ascii_alphabetic() || c.is_whitespace()))
        || (chars <= 4 && line.chars().all(|c| c.is_ascii_digit()))
        || (chars == 1 && line.chars().all(|c| c.is_ascii_alphabetic()))
        || CLOSING_HEADINGS.iter().any(|h| lower.starts_with(h))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_case_arising_block() {
        let text = "CIVIL APPELLATE JURISDICTION\nCivil Appeal No. 1 of 2020\nCase Arising From\n\
                    High Court of Delhi at New Delhi, 12.01.2019\n12\nrest of the judgment";
        assert_eq!(
            case_arising_from(text).unwrap(),
            "CIVIL APPELLATE JURISDICTION\nCivil Appeal No. 1 of 2020\nCase Arising From\n\
             High Court of Delhi at New Delhi, 12.01.2019"
        );
    }

    #[test]
    fn test_block_stops_at_list_of_acts() {
        let text = "Case Arising From: Order dated 01.02.2020\nList of Acts\nCode of Civil Procedure, 1908";
        assert_eq!(case_arising_from(text).unwrap(), "Case Arising From: Order dated 01.02.2020");
    }

    #[test]
    fn test_fallback_prefers_jurisdiction() {
        let text = "the Judgment dated 3.4.2010 was relied on\nX\n\
                    CRIMINAL APPELLATE JURISDICTION\nCriminal Appeal No. 9 of 2011\n\
                    From the Judgment and Order of 5.6.2010 of the High Court, 2010\n7";
        let block = case_arising_from(text).unwrap();
        assert!(block.starts_with("CRIMINAL APPELLATE JURISDICTION"), "{block}");
        assert!(block.ends_with("of the High Court, 2010"), "{block}");
    }

    #[test]
    fn test_closing_lines() {
        assert!(is_closing_line("HEADNOTES AND SUMMARY"));
        assert!(is_closing_line("123"));
        assert!(is_closing_line("A"));
        assert!(is_closing_line("Judgment / Order of the Supreme Court"));
        assert!(!is_closing_line("Order dated 01.02.2020"));
        assert!(!is_closing_line(""));
    }

    #[test]
    fn test_missing_background() {
        let doc = CaseDocument::from_pages("a.pdf", vec!["Nothing to see".to_string()]);
        let fields = BackgroundExtractor::new().extract(&doc).unwrap();
        assert_eq!(fields["Case Arising From"].as_text(), Some("Not found"));
    }
}
