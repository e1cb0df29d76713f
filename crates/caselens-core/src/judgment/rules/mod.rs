//! Rule tables and text helpers shared by the judgment extractors.

pub mod patterns;

pub mod acts;
pub mod background;
pub mod case_details;
pub mod case_outcomes;
pub mod citation;
pub mod crime_info;
pub mod judges;
pub mod legal_details;
pub mod legal_references;
pub mod parties;

pub use acts::ActsExtractor;
pub use background::BackgroundExtractor;
pub use case_details::CaseDetailsExtractor;
pub use case_outcomes::CaseOutcomesExtractor;
pub use citation::CitationExtractor;
pub use crime_info::CrimeInfoExtractor;
pub use judges::JudgesExtractor;
pub use legal_details::LegalDetailsExtractor;
pub use legal_references::LegalReferencesExtractor;
pub use parties::PartiesExtractor;

use regex::{Captures, Regex};

use patterns::{SENTENCE_BREAK, WHITESPACE};

/// A named pattern in an ordered rule table.
#[derive(Debug)]
pub struct Rule {
    pub name: &'static str,
    pub pattern: Regex,
}

impl Rule {
    /// Compile a rule. Patterns are static literals, so a bad one is a programming error.
    pub fn new(name: &'static str, pattern: &str) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).unwrap_or_else(|e| panic!("invalid rule {name}: {e}")),
        }
    }
}

/// Ordered rules, first match wins.
#[derive(Debug, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// First rule (in table order) that matches, with its captures.
    pub fn first_match<'r, 't>(&'r self, text: &'t str) -> Option<(&'r Rule, Captures<'t>)> {
        self.rules
            .iter()
            .find_map(|rule| rule.pattern.captures(text).map(|caps| (rule, caps)))
    }

    /// First rule that matches anywhere in `text`.
    pub fn any_match(&self, text: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.pattern.is_match(text))
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.any_match(text).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }
}

/// A headed region of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section<'t> {
    pub heading: &'t str,
    pub body: &'t str,
    /// Byte offset where the terminator starts.
    pub end: usize,
}

/// Find the first `start` heading that is followed by an `end` terminator.
///
/// The body runs from the end of the heading to the start of the nearest terminator.
pub fn find_section<'t>(text: &'t str, from: usize, start: &Regex, end: &Regex) -> Option<Section<'t>> {
    for heading in start.find_iter(&text[from..]) {
        let body_start = from + heading.end();
        if let Some(term) = end.find(&text[body_start..]) {
            let body_end = body_start + term.start();
            return Some(Section {
                heading: heading.as_str(),
                body: &text[body_start..body_end],
                end: body_end,
            });
        }
    }
    None
}

/// All non-overlapping sections. Scanning resumes at each terminator.
pub fn find_sections<'t>(text: &'t str, start: &Regex, end: &Regex) -> Vec<Section<'t>> {
    let mut sections = Vec::new();
    let mut from = 0;
    while let Some(section) = find_section(text, from, start, end) {
        from = section.end;
        sections.push(section);
    }
    sections
}

/// Split text into trimmed, non-empty paragraphs.
///
/// `breaks` matches are removed. `headings` matches start a new paragraph and are kept.
pub fn split_paragraphs<'t>(text: &'t str, breaks: &Regex, headings: Option<&Regex>) -> Vec<&'t str> {
    let mut cuts: Vec<(usize, usize)> = breaks.find_iter(text).map(|m| (m.start(), m.end())).collect();
    if let Some(headings) = headings {
        for m in headings.find_iter(text) {
            let inside_break = cuts.iter().any(|&(s, e)| m.start() > s && m.start() < e);
            if !inside_break {
                cuts.push((m.start(), m.start()));
            }
        }
    }
    cuts.sort_unstable();

    let mut paragraphs = Vec::new();
    let mut pos = 0;
    for (start, end) in cuts {
        if start < pos {
            continue;
        }
        paragraphs.push(&text[pos..start]);
        pos = end;
    }
    paragraphs.push(&text[pos..]);

    paragraphs
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Split on runs of sentence punctuation. The punctuation itself is dropped.
pub fn split_sentences(text: &str) -> Vec<&str> {
    SENTENCE_BREAK
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Collapse whitespace runs to single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Remove duplicates, keeping the first occurrence.
pub fn dedup_ordered(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// Join values with ", ", or `None` when there are none.
pub fn join_or_none(values: &[String]) -> Option<String> {
    if values.is_empty() {
        None
    } else {
        Some(values.join(", "))
    }
}

/// Split `text` at a character boundary so the head holds at most `max_chars` characters.
pub fn split_at_chars(text: &str, max_chars: usize) -> (&str, &str) {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text.split_at(idx),
        None => (text, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rule_set_first_match_respects_order() {
        let rules = RuleSet::new(vec![
            Rule::new("long", r"(?i)civil appeal"),
            Rule::new("short", r"(?i)appeal"),
        ]);

        let (rule, caps) = rules.first_match("This Civil Appeal is allowed").unwrap();
        assert_eq!(rule.name, "long");
        assert_eq!(&caps[0], "Civil Appeal");
        assert_eq!(rules.any_match("appeal dismissed").unwrap().name, "short");
        assert!(!rules.is_match("petition"));
    }

    #[test]
    fn test_find_sections_stops_at_nearest_terminator() {
        let start = Regex::new(r"(?i)Headnotes\s*\n+").unwrap();
        let end = Regex::new(r"Case Law Cited|List of Acts").unwrap();
        let text = "Headnotes\nfirst\nList of Acts\nHeadnotes\nsecond\nCase Law Cited";

        let sections = find_sections(text, &start, &end);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].body.trim(), "first");
        assert_eq!(sections[1].body.trim(), "second");
    }

    #[test]
    fn test_find_section_needs_terminator() {
        let start = Regex::new(r"Headnotes").unwrap();
        let end = Regex::new(r"Case Law Cited").unwrap();
        assert!(find_section("Headnotes without end", 0, &start, &end).is_none());
    }

    #[test]
    fn test_split_paragraphs() {
        let breaks = Regex::new(r"\n\s*\d+\.\s+|\n{2,}").unwrap();
        let headings = Regex::new(r"\bConclusion\b").unwrap();
        let text = "Intro line\n\nSecond para\n1. Numbered para Conclusion follows";

        let paragraphs = split_paragraphs(text, &breaks, Some(&headings));
        assert_eq!(
            paragraphs,
            vec!["Intro line", "Second para", "Numbered para", "Conclusion follows"]
        );
    }

    #[test]
    fn test_split_sentences() {
        assert_eq!(
            split_sentences("Appeal allowed. No costs!! Ordered?"),
            vec!["Appeal allowed", "No costs", "Ordered"]
        );
    }

    #[test]
    fn test_split_at_chars_is_char_safe() {
        let (head, tail) = split_at_chars("aéb", 2);
        assert_eq!(head, "aé");
        assert_eq!(tail, "b");
        assert_eq!(split_at_chars("ab", 5), ("ab", ""));
    }

    #[test]
    fn test_dedup_ordered() {
        let items = vec!["b".to_string(), "a".to_string(), "b".to_string()];
        assert_eq!(dedup_ordered(items), vec!["b", "a"]);
    }
}
