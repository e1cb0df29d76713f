//! Flags for crimes against children and against women.
//!
//! Sentences are checked one at a time. Sentences citing other decisions or
//! using process jargon ("abuse of process") are skipped. Apart from the
//! direct "Crime against ..." phrase, a keyword only counts when the same
//! sentence also names a victim of the right kind.

use lazy_static::lazy_static;
use regex::Regex;

use super::{split_sentences, Rule, RuleSet};
use crate::judgment::{Extractor, Result};
use crate::models::{ExtractorId, FieldMap};
use crate::pdf::CaseDocument;

/// A keyword rule, optionally void when the match is followed by some words.
struct CrimeRule {
    rule: Rule,
    unless_followed_by: Option<Regex>,
}

impl CrimeRule {
    fn new(name: &'static str, pattern: &str) -> Self {
        Self {
            rule: Rule::new(name, pattern),
            unless_followed_by: None,
        }
    }

    fn unless_followed_by(mut self, pattern: &str) -> Self {
        self.unless_followed_by = Some(Regex::new(pattern).unwrap_or_else(|e| panic!("invalid rule {}: {e}", self.rule.name)));
        self
    }

    fn matches(&self, sentence: &str) -> bool {
        self.rule.pattern.find_iter(sentence).any(|m| match &self.unless_followed_by {
            Some(follow) => !follow.is_match(&sentence[m.end()..]),
            None => true,
        })
    }
}

struct CrimeCategory {
    field: &'static str,
    direct: Regex,
    rules: Vec<CrimeRule>,
    victim_context: Regex,
}

impl CrimeCategory {
    fn matches(&self, sentence: &str) -> bool {
        self.direct.is_match(sentence)
            || (self.rules.iter().any(|r| r.matches(sentence)) && self.victim_context.is_match(sentence))
    }
}

lazy_static! {
    static ref CATEGORIES: [CrimeCategory; 2] = [
        CrimeCategory {
            field: "Crime against children",
            direct: Regex::new(r"(?i)\bCrime\s+against\s+children\b").unwrap(),
            rules: vec![
                CrimeRule::new("child_sexual_abuse", r"(?i)\bChild\s+sexual\s+abuse\b"),
                CrimeRule::new("child_rape", r"(?i)\bChild\s+rape\b"),
                CrimeRule::new("assault_of_minor", r"(?i)\bSexual\s+assault\s+of\s+minor\b"),
                CrimeRule::new(
                    "abuse_material",
                    r"(?i)\bChild\s+pornography\b|\bChild\s+sexual\s+exploitation\s+and\s*abuse\s+material\s*\(CSEAM\)|\bCSEAM\b",
                ),
                CrimeRule::new("kidnapping", r"(?i)\bKidnapping\s+of\s+minor\b|\bChild\s+trafficking\b"),
                CrimeRule::new("exploitation", r"(?i)\bChild\s+exploitation\b|\bMinor\s+victim\b"),
                CrimeRule::new(
                    "possession",
                    r"(?i)\bStorage\s*(?:/|\s*or\s*)\s*possession\s+of\s+CSEAM\b|\bConstructive\s+possession\b|\bCyber\s+Tipline\b|\bNCRB\s+report\b",
                ),
            ],
            victim_context: Regex::new(r"(?i)\b(?:child|children|minor|boy|girl\s*(?:under|aged\s*\d+\s*years))\b").unwrap(),
        },
        CrimeCategory {
            field: "Crime against women",
            direct: Regex::new(r"(?i)\bCrime\s+against\s+women\b").unwrap(),
            rules: vec![
                CrimeRule::new("rape", r"(?i)\bRape\b").unless_followed_by(r"(?i)^\s+of\s+child"),
                CrimeRule::new("gang_rape", r"(?i)\bGang\s+rape\b"),
                CrimeRule::new("marital_rape", r"(?i)\bMarital\s+rape\b"),
                CrimeRule::new("sexual_assault", r"(?i)\bSexual\s+assault\b").unless_followed_by(r"(?i)^\s+of\s+minor"),
                CrimeRule::new("molestation", r"(?i)\bMolestation\b"),
                CrimeRule::new("modesty", r"(?i)\bOutraging\s+modesty\s+of\s+a\s+woman\b"),
                CrimeRule::new("harassment", r"(?i)\bSexual\s+harassment\b"),
                CrimeRule::new("domestic_violence", r"(?i)\bDomestic\s+violence\b"),
                CrimeRule::new("dowry_harassment", r"(?i)\bDowry\s+harassment\b"),
                CrimeRule::new("dowry_death", r"(?i)\bDowry\s+death\b"),
                CrimeRule::new("cruelty", r"(?i)\bCruelty\s+by\s+husband\s+or\s+relatives\b"),
                CrimeRule::new("assault_on_women", r"(?i)\bAssault\s+on\s+women\b"),
                CrimeRule::new("acid_attack", r"(?i)\bAcid\s+attack\b"),
            ],
            victim_context: Regex::new(
                r"(?i)\b(?:woman|women|female|girl|lady|victim\s*(?:was|is)\s*(?:a\s*)?(?:woman|female|girl|adult\s*female)|wife|mother|sister|daughter)\b"
            ).unwrap(),
        },
    ];

    static ref CITING_SENTENCE: RuleSet = RuleSet::new(vec![
        Rule::new("case_and_report", r"(?i)\w+\s+v\.\s+\w+.*?\d{4}\s*(?:SCR|SCC|AIR|INSC)\b"),
        Rule::new("bracketed_report", r"(?i)\[\d{4}\]\s*\d+\s*(?:SCR|SCC)\b"),
        Rule::new("name_and_year", r"(?i)(?:[A-Z][a-z]+\s+){2,}.*?\(\d{4}\)"),
        Rule::new("citing_verb", r"(?i)\breferred\s+to\b|\brelied\s+on\b|\bheld\s+inapplicable\b"),
        Rule::new("police_branch", r"(?i)\bCrime\s+against\s+wom[ae]n\s+and\s+children\s*Branch\b"),
    ]);

    static ref PROCESS_JARGON: RuleSet = RuleSet::new(vec![
        Rule::new("abuse_of_process", r"(?i)\babuse\s+of\s+process\b"),
        Rule::new("abused_process", r"(?i)\babused\s+the\s+process\b"),
        Rule::new("abuse_of_law", r"(?i)\babuse\s+of\s+law\b"),
        Rule::new("harassment_of_party", r"(?i)\bharassment\s+to\s+the\s+other\s+party\b"),
        Rule::new("mens_rea", r"(?i)\bmens\s+rea\s+in\s+general\s+law\b"),
    ]);
}

/// Crime info extractor.
pub struct CrimeInfoExtractor;

impl CrimeInfoExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CrimeInfoExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for CrimeInfoExtractor {
    fn id(&self) -> ExtractorId {
        ExtractorId::CrimeInfo
    }

    fn extract(&self, doc: &CaseDocument) -> Result<FieldMap> {
        let sentences: Vec<&str> = split_sentences(doc.text()?)
            .into_iter()
            .filter(|s| !CITING_SENTENCE.is_match(s) && !PROCESS_JARGON.is_match(s))
            .collect();

        let mut fields = FieldMap::new();
        for category in CATEGORIES.iter() {
            let found = sentences.iter().any(|s| category.matches(s));
            fields.insert(category.field.to_string(), found.into());
        }
        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(text: &str) -> (bool, bool) {
        let doc = CaseDocument::from_pages("crime.pdf", vec![text.to_string()]);
        let fields = CrimeInfoExtractor::new().extract(&doc).unwrap();
        (
            fields["Crime against children"].as_flag().unwrap(),
            fields["Crime against women"].as_flag().unwrap(),
        )
    }

    #[test]
    fn test_keyword_needs_victim_context() {
        assert_eq!(flags("The accused committed rape of the woman in 2015."), (false, true));
        assert_eq!(flags("Molestation was alleged by the accused."), (false, false));
    }

    #[test]
    fn test_direct_phrase_needs_no_context() {
        assert_eq!(flags("This is a crime against women."), (false, true));
        assert_eq!(flags("It is a crime against children."), (true, false));
    }

    #[test]
    fn test_excluded_followers() {
        assert_eq!(flags("The accused was charged with rape of child aged six."), (false, false));
        assert_eq!(flags("Sexual assault of minor girl was proved."), (true, false));
        assert_eq!(flags("Kidnapping of minor boy was alleged."), (true, false));
    }

    #[test]
    fn test_skipped_sentences() {
        assert_eq!(flags("This is an abuse of process against the woman alleging molestation."), (false, false));
        assert_eq!(flags("The wife alleged molestation, relied on by the defence."), (false, false));
    }

    #[test]
    fn test_flags_are_booleans() {
        let doc = CaseDocument::from_pages("plain.pdf", vec!["A contract dispute.".to_string()]);
        let fields = CrimeInfoExtractor::new().extract(&doc).unwrap();
        assert_eq!(fields.len(), 2);
        assert!(fields.values().all(|v| v.as_flag() == Some(false)));
    }
}
