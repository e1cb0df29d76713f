//! Law report citation on the first page, with repair of misread digits.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

use crate::judgment::{put_or_not_found, Extractor, Result};
use crate::models::{ExtractorId, FieldMap};
use crate::pdf::CaseDocument;

lazy_static! {
    // Tokens made of digits and the letters commonly misread as digits
    static ref NUMERIC_TOKEN: Regex = Regex::new(r"\b[0-9OIT]*[0-9][0-9OIT]*\b").unwrap();

    // "[2024] 10 S.C.R. 961", page optional
    static ref REPORT_CITATION: Regex = Regex::new(
        r"\[(\d{4})\]\s*(\d+)\s*(S\.C\.R\.|SCC|AIR|INSC)(?:\s*(\d+))?"
    ).unwrap();

    // Looser shapes such as "2024 INSC 789" or "(2019) 4 SCC 353 : 2019 SCR 12"
    static ref GENERIC_CITATION: Regex = Regex::new(
        r"[\[({]?\d{4}[\])}]?\s*(?:\d+\s+)?(?:[A-Z.]+)?\s*\d+(?:\s*[:–-]\s*[\[({]?\d{4}[\])}]?\s*(?:[A-Z.]+)?\s*\d+)?"
    ).unwrap();

    static ref BRACKETED_YEAR: Regex = Regex::new(r"\[(\d{4})\]").unwrap();
    static ref NUMBER: Regex = Regex::new(r"\b\d+\b").unwrap();
    static ref REPORTER: Regex = Regex::new(r"(?i)S\.C\.R\.|SCC|AIR|INSC").unwrap();
    static ref TRAILING_NUMBER: Regex = Regex::new(r"\b(\d+)$").unwrap();
    static ref LEADING_NUMBER: Regex = Regex::new(r"^\d+").unwrap();
}

/// Citation extractor.
pub struct CitationExtractor;

impl CitationExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CitationExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for CitationExtractor {
    fn id(&self) -> ExtractorId {
        ExtractorId::Citation
    }

    fn extract(&self, doc: &CaseDocument) -> Result<FieldMap> {
        let first_page = doc.first_page()?;
        let mut fields = FieldMap::new();
        put_or_not_found(&mut fields, "Citation", extract_citation(first_page));
        Ok(fields)
    }
}

fn extract_citation(first_page: &str) -> Option<String> {
    let lines: Vec<&str> = first_page
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let first = repair_digits(lines.first()?);
    let next = lines.get(1).map(|l| repair_digits(l));

    if let Some(citation) = reassemble(&first, next.as_deref()) {
        return Some(citation);
    }

    if let Some(m) = GENERIC_CITATION.find(&first) {
        let matched = m.as_str().trim();
        return Some(loose_citation(matched).unwrap_or_else(|| matched.to_string()));
    }

    let opening = lines.iter().take(2).copied().collect::<Vec<_>>().join("\n");
    trace!("No citation shape on the first line, trying the opening lines");
    loose_citation(&repair_digits(&opening)).or_else(|| (!opening.is_empty()).then_some(opening))
}

/// Replace O, I and T with 0, 1 and 7 inside tokens that already hold a digit.
fn repair_digits(text: &str) -> String {
    NUMERIC_TOKEN
        .replace_all(text, |caps: &regex::Captures| {
            caps[0].replace('O', "0").replace('I', "1").replace('T', "7")
        })
        .into_owned()
}

/// "[year] volume reporter page", taking a missing page from the start of the next line.
fn reassemble(line: &str, next_line: Option<&str>) -> Option<String> {
    let caps = REPORT_CITATION.captures(line)?;
    let (year, volume, reporter) = (&caps[1], &caps[2], &caps[3]);
    let page = caps
        .get(4)
        .map(|m| m.as_str())
        .or_else(|| next_line.and_then(|l| LEADING_NUMBER.find(l)).map(|m| m.as_str()));

    Some(match page {
        Some(page) => format!("[{year}] {volume} {reporter} {page}"),
        None => format!("[{year}] {volume} {reporter}"),
    })
}

/// Rebuild a citation from its parts when they are out of order.
fn loose_citation(text: &str) -> Option<String> {
    let year = BRACKETED_YEAR.captures(text)?;
    let after_year = year.get(0).map(|m| m.end()).unwrap_or_default();
    let volume = NUMBER.find_at(text, after_year)?;
    let page = TRAILING_NUMBER.captures(text).and_then(|c| c.get(1))?;
    if page.start() <= volume.start() {
        return None;
    }
    let reporter = REPORTER.find(text).map(|m| m.as_str()).unwrap_or("S.C.R.");

    Some(format!("[{}] {} {} {}", &year[1], volume.as_str(), reporter, page.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractError;

    #[test]
    fn test_repair_only_touches_numeric_tokens() {
        assert_eq!(
            repair_digits("[2O24] 1O S.C.R. 96I : 2O24 INSC 789"),
            "[2024] 10 S.C.R. 961 : 2024 INSC 789"
        );
    }

    #[test]
    fn test_extract_citation() {
        let page = "[2O24] 1O S.C.R. 96I : 2O24 INSC 789\nRamesh v. State";
        assert_eq!(extract_citation(page).unwrap(), "[2024] 10 S.C.R. 961");
    }

    #[test]
    fn test_page_on_next_line() {
        let page = "[2024] 10 S.C.R.\n961 : 2024 INSC 789";
        assert_eq!(extract_citation(page).unwrap(), "[2024] 10 S.C.R. 961");
    }

    #[test]
    fn test_volume_follows_year() {
        assert_eq!(loose_citation("[2019] x 4 y SCC 353").unwrap(), "[2019] 4 SCC 353");
        assert_eq!(loose_citation("[2019] 353"), None);
    }

    #[test]
    fn test_generic_shape() {
        assert_eq!(extract_citation("2024 INSC 789\nTitle").unwrap(), "2024 INSC 789");
    }

    #[test]
    fn test_blank_first_page() {
        let doc = CaseDocument::from_pages("blank.pdf", vec![" ".to_string(), "text".to_string()]);
        let err = CitationExtractor::new().extract(&doc).unwrap_err();
        assert_eq!(err, ExtractError::MissingRegion("first page"));
    }
}
