//! Case numbers, title, judgment date, headnotes, document type and bench.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use super::patterns::{NOT_FOUND, SCR_ANNOTATION, TRAILING_PAREN};
use super::{collapse_whitespace, find_sections, join_or_none, split_at_chars};
use crate::judgment::{put, put_or_not_found, Extractor, Result};
use crate::models::{ExtractorId, FieldMap};
use crate::pdf::CaseDocument;
use crate::sink::MAX_CELL_CHARS;

lazy_static! {
    static ref CASE_NUMBER: Regex = Regex::new(
        r"(?i)(?:[)(]?\s*)?(?:Nos\.?|No\.?|Number)?\s*([A-Za-z\s]*?(?:C\.A\.|Cr\.A\.|Civil Appeal|Criminal Appeal|Writ Petition|SLP|Review Petition)?\s*\d+(?:[-–/]\d+)?\s*(?:of|/)\s*\d{4})"
    ).unwrap();

    static ref CASE_TITLE: Regex = Regex::new(r"(?i)([^\n]+?)\s+v\.?\s+([^\n(]+)").unwrap();

    // Date patterns in priority order. The last two capture month and year only.
    static ref DATE_PATTERNS: Vec<Regex> = [
        r"(?i)\b(\d{1,2}(?:st|nd|rd|th)?\s+[A-Za-z]+\s+\d{4})\b",
        r"(?i)\b([A-Za-z]+\s+\d{1,2}(?:st|nd|rd|th)?,\s+\d{4})\b",
        r"(?i)\b(\d{1,2}\s+[A-Za-z]+\s+\d{4})\b",
        r"(?i)\b([A-Za-z]+\s+\d{4})\b",
        r"(?i)\b(\d{1,2}[-/]\d{1,2}[-/]\d{4})\b",
        r"(?i)\b([A-Za-z]{3,}\s+\d{1,2}(?:st|nd|rd|th)?\s+\d{4})\b",
        r"(?i)\b\d{1,2}(?:st|nd|rd|th)?\s+day\s+of\s+([A-Za-z]+)\s*,\s*(\d{4})\b",
        r"(?i)\b[A-Za-z]+\s+day\s+of\s+([A-Za-z]+)\s*,\s*(\d{4})\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect();

    static ref ORDINAL_SUFFIX: Regex = Regex::new(r"(?i)(\d)(?:st|nd|rd|th)\b").unwrap();

    static ref MONTH_ABBR: Regex = Regex::new(r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)\b").unwrap();

    static ref HEADNOTES_START: Regex = Regex::new(r"(?i)Headnotes†?\s*[\n\r]+").unwrap();
    static ref HEADNOTES_END: Regex = Regex::new(r"(?i)Case Law Cited|List of Citations and Other References").unwrap();
    static ref HEADNOTES_FALLBACK_END: Regex = Regex::new(r"(?i)List of Acts").unwrap();
    static ref ISSUE_START: Regex = Regex::new(r"(?i)Issue\s+for\s+Consideration\s*[\n\r]+").unwrap();
    static ref ISSUE_END: Regex = Regex::new(r"(?i)Headnotes").unwrap();

    static ref BENCH: Regex = Regex::new(r"(?i)\[([\w\s.*&,-]+?)\s*,?\s*(?:J\.J\.|JJ\.|J\.|CJI)\s*\]").unwrap();
    static ref BENCH_SPLIT: Regex = Regex::new(r"(?i)\s+and\s+|,").unwrap();
}

const FULL_DATE_FORMATS: [&str; 5] = ["%d %B %Y", "%B %d %Y", "%d-%m-%Y", "%d/%m/%Y", "%d %b %Y"];

/// Legal details extractor.
pub struct LegalDetailsExtractor;

impl LegalDetailsExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LegalDetailsExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for LegalDetailsExtractor {
    fn id(&self) -> ExtractorId {
        ExtractorId::LegalDetails
    }

    fn extract(&self, doc: &CaseDocument) -> Result<FieldMap> {
        let pages = doc.pages()?;
        let text = doc.text()?;
        let first_page = pages.first().map(String::as_str).unwrap_or_default();

        let mut fields = FieldMap::new();

        let case_numbers = extract_case_numbers(first_page);
        put_or_not_found(&mut fields, "Case No.", case_numbers.first().cloned());
        put_or_not_found(&mut fields, "Other Case Nos", join_or_none(case_numbers.get(1..).unwrap_or_default()));
        put_or_not_found(&mut fields, "Case Title", extract_case_title(first_page));

        match extract_judgment_date(text) {
            Some(date) => {
                put(&mut fields, "Judgment Date", date.format("%d-%m-%Y").to_string());
                put(&mut fields, "Month", date.format("%B").to_string());
                put(&mut fields, "Year", date.format("%Y").to_string());
            }
            None => {
                put(&mut fields, "Judgment Date", NOT_FOUND);
                put(&mut fields, "Month", NOT_FOUND);
                put(&mut fields, "Year", NOT_FOUND);
            }
        }

        let headnotes = extract_headnotes(text);
        let overflow = match &headnotes {
            Some(content) => {
                let (head, tail) = split_at_chars(content, MAX_CELL_CHARS);
                put(&mut fields, "Headnotes", head);
                put(&mut fields, "Headnote Extraction Method", "Pattern Matching");
                (!tail.is_empty()).then(|| tail.to_string())
            }
            None => {
                put(&mut fields, "Headnotes", NOT_FOUND);
                put(&mut fields, "Headnote Extraction Method", "None");
                None
            }
        };

        let type_text = pages.iter().take(2).map(String::as_str).collect::<Vec<_>>().join("\n");
        put(&mut fields, "Type", detect_document_type(&type_text));

        let bench_text = pages.iter().take(3).map(String::as_str).collect::<Vec<_>>().join("\n");
        let judges = extract_judges(&bench_text);
        put_or_not_found(&mut fields, "Judge Names", join_or_none(&judges));
        put_or_not_found(&mut fields, "No. of Judges", (!judges.is_empty()).then(|| judges.len().to_string()));
        put(&mut fields, "Page Count", pages.len().to_string());

        if let Some(rest) = overflow {
            debug!("Headnotes of {} exceed the cell limit, spilling over", doc.name());
            put(&mut fields, "Headnotes (continued)", rest);
        }

        Ok(fields)
    }
}

/// Case numbers on the first page, deduplicated by containment.
fn extract_case_numbers(first_page: &str) -> Vec<String> {
    let mut numbers: Vec<String> = Vec::new();
    for caps in CASE_NUMBER.captures_iter(first_page) {
        let candidate = caps[1].trim().to_string();
        if candidate.is_empty() {
            continue;
        }
        let overlaps = numbers
            .iter()
            .any(|existing| existing.contains(&candidate) || candidate.contains(existing.as_str()));
        if !overlaps {
            numbers.push(candidate);
        }
    }
    numbers
}

fn extract_case_title(first_page: &str) -> Option<String> {
    if let Some(caps) = CASE_TITLE.captures(first_page) {
        let raw = format!("{} v. {}", caps[1].trim(), caps[2].trim());
        return Some(TRAILING_PAREN.replace(&raw, "").trim().to_string());
    }

    let lines: Vec<&str> = first_page
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(3)
        .collect();
    if lines.is_empty() {
        return None;
    }

    let combined = lines.join(" ");
    let without_annotation = SCR_ANNOTATION.replace_all(&combined, "");
    let title = collapse_whitespace(&without_annotation);
    let title = TRAILING_PAREN.replace(&title, "").trim().to_string();
    (!title.is_empty()).then_some(title)
}

/// First parseable date, trying each pattern in priority order.
fn extract_judgment_date(text: &str) -> Option<NaiveDate> {
    for pattern in DATE_PATTERNS.iter() {
        for caps in pattern.captures_iter(text) {
            let raw = match (caps.get(1), caps.get(2)) {
                (Some(month), Some(year)) => format!("{} {}", month.as_str(), year.as_str()),
                (Some(date), None) => date.as_str().to_string(),
                _ => continue,
            };
            if let Some(date) = parse_date(&raw) {
                return Some(date);
            }
        }
    }
    None
}

/// Parse a loosely formatted date. "Month YYYY" becomes the first of that month.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let cleaned = raw.replace(',', "");
    let cleaned = ORDINAL_SUFFIX.replace_all(cleaned.trim(), "$1");
    let cleaned = MONTH_ABBR.replace_all(&cleaned, |caps: &regex::Captures| full_month(&caps[1]).to_string());
    let cleaned = collapse_whitespace(&cleaned);

    FULL_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&cleaned, fmt).ok())
        .or_else(|| NaiveDate::parse_from_str(&format!("01 {cleaned}"), "%d %B %Y").ok())
}

fn full_month(abbr: &str) -> &'static str {
    match abbr.to_ascii_lowercase().as_str() {
        "jan" => "January",
        "feb" => "February",
        "mar" => "March",
        "apr" => "April",
        "may" => "May",
        "jun" => "June",
        "jul" => "July",
        "aug" => "August",
        "sep" => "September",
        "oct" => "October",
        "nov" => "November",
        _ => "December",
    }
}

/// Headnotes and the issue for consideration, joined by " | ".
fn extract_headnotes(text: &str) -> Option<String> {
    let mut sections = find_sections(text, &HEADNOTES_START, &HEADNOTES_END);
    if sections.is_empty() {
        sections = find_sections(text, &HEADNOTES_START, &HEADNOTES_FALLBACK_END);
    }
    sections.extend(find_sections(text, &ISSUE_START, &ISSUE_END));

    let parts: Vec<String> = sections
        .iter()
        .filter_map(|s| {
            let body = s.body.trim();
            (!body.is_empty()).then(|| format!("{}: {}", s.heading.trim(), body))
        })
        .collect();

    (!parts.is_empty()).then(|| parts.join(" | "))
}

fn detect_document_type(text: &str) -> &'static str {
    let lines: Vec<&str> = text.lines().collect();
    let Some(idx) = lines
        .iter()
        .position(|l| l.to_lowercase().contains("judgment / order of the supreme court"))
    else {
        return "Judgment";
    };

    let is_order = lines
        .iter()
        .skip(idx + 1)
        .take(2)
        .any(|l| l.trim().to_lowercase().starts_with("order"));
    if is_order { "Order" } else { "Judgment" }
}

/// Judge names from the bench line, e.g. "[A and B, JJ.]".
fn extract_judges(text: &str) -> Vec<String> {
    let Some(caps) = BENCH.captures(text) else {
        return Vec::new();
    };

    let mut judges: Vec<String> = Vec::new();
    for part in BENCH_SPLIT.split(&caps[1]) {
        let name = part.trim();
        let is_suffix = matches!(name.to_uppercase().as_str(), "J" | "JJ" | "CJI");
        if !name.is_empty() && !is_suffix && !judges.iter().any(|j| j == name) {
            judges.push(name.to_string());
        }
    }
    judges
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> CaseDocument {
        CaseDocument::from_pages(
            "ramesh.pdf",
            vec![
                "[2024] 10 S.C.R. 961 : 2024 INSC 789\n\
                 Ramesh Kumar v. State of Haryana\n\
                 (Criminal Appeal No. 1234 of 2019)\n\
                 05 March 2024\n\
                 [Sanjiv Khanna and Dipankar Datta, JJ.]\n\
                 Issue for Consideration\n\
                 Whether the conviction was sustainable.\n\
                 Headnotes\n\
                 Evidence - circumstantial chain incomplete.\n\
                 Case Law Cited\n\
                 None"
                    .to_string(),
                "Judgment / Order of the Supreme Court\nORDER\nThe appeal is allowed.".to_string(),
            ],
        )
    }

    fn text(fields: &FieldMap, name: &str) -> String {
        fields[name].as_text().unwrap().to_string()
    }

    #[test]
    fn test_extract_legal_details() {
        let fields = LegalDetailsExtractor::new().extract(&sample()).unwrap();

        assert_eq!(text(&fields, "Case No."), "1234 of 2019");
        assert_eq!(text(&fields, "Other Case Nos"), NOT_FOUND);
        assert_eq!(text(&fields, "Case Title"), "Ramesh Kumar v. State of Haryana");
        assert_eq!(text(&fields, "Judgment Date"), "05-03-2024");
        assert_eq!(text(&fields, "Month"), "March");
        assert_eq!(text(&fields, "Year"), "2024");
        assert_eq!(text(&fields, "Type"), "Order");
        assert_eq!(text(&fields, "Judge Names"), "Sanjiv Khanna, Dipankar Datta");
        assert_eq!(text(&fields, "No. of Judges"), "2");
        assert_eq!(text(&fields, "Page Count"), "2");
        assert!(!fields.contains_key("Headnotes (continued)"));
    }

    #[test]
    fn test_headnotes_include_issue_for_consideration() {
        let fields = LegalDetailsExtractor::new().extract(&sample()).unwrap();
        assert_eq!(
            text(&fields, "Headnotes"),
            "Headnotes: Evidence - circumstantial chain incomplete. | \
             Issue for Consideration: Whether the conviction was sustainable."
        );
        assert_eq!(text(&fields, "Headnote Extraction Method"), "Pattern Matching");
    }

    #[test]
    fn test_headnotes_fall_back_to_list_of_acts() {
        let text = "Headnotes\nBail - parity.\nList of Acts\nCode of Criminal Procedure, 1973";
        assert_eq!(extract_headnotes(text).unwrap(), "Headnotes: Bail - parity.");
        assert_eq!(extract_headnotes("no such section"), None);
    }

    #[test]
    fn test_title_fallback_strips_annotation() {
        let page = "[2024] 10 S.C.R. 961 : 2024 INSC 789\nIn Re: Article 370 of the Constitution\n(Writ Petition)";
        assert_eq!(
            extract_case_title(page).unwrap(),
            "In Re: Article 370 of the Constitution"
        );
        assert_eq!(extract_case_title("   \n  "), None);
    }

    #[test]
    fn test_parse_date_variants() {
        let expected = NaiveDate::from_ymd_opt(2023, 1, 5).unwrap();
        assert_eq!(parse_date("5th January, 2023"), Some(expected));
        assert_eq!(parse_date("Jan 5, 2023"), Some(expected));
        assert_eq!(parse_date("05-01-2023"), Some(expected));
        assert_eq!(parse_date("January 2023"), NaiveDate::from_ymd_opt(2023, 1, 1));
        assert_eq!(parse_date("of 2023"), None);
    }

    #[test]
    fn test_day_of_month_phrase() {
        let date = extract_judgment_date("signed on the 3rd day of August, 2022").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2022, 8, 1).unwrap());
    }

    #[test]
    fn test_case_numbers_deduplicate_by_containment() {
        let page = "Civil Appeal No. 10 of 2020 with Civil Appeal No. 11 of 2020 and No. 10 of 2020";
        let numbers = extract_case_numbers(page);
        assert_eq!(numbers, vec!["10 of 2020", "11 of 2020"]);
    }

    #[test]
    fn test_headnote_overflow() {
        let long = "x".repeat(MAX_CELL_CHARS + 10);
        let doc = CaseDocument::from_pages(
            "long.pdf",
            vec![format!("Headnotes\n{long}\nCase Law Cited\n")],
        );
        let fields = LegalDetailsExtractor::new().extract(&doc).unwrap();
        assert_eq!(text(&fields, "Headnotes").chars().count(), MAX_CELL_CHARS);
        assert!(fields.contains_key("Headnotes (continued)"));
    }
}
