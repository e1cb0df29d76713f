//! Statutes, rules, procedural and penal codes and constitutional provisions.

use std::collections::BTreeSet;

use lazy_static::lazy_static;
use regex::Regex;

use crate::judgment::{put_or_not_found, Extractor, Result};
use crate::models::{ExtractorId, FieldMap};
use crate::pdf::CaseDocument;

// Lead-in words that are consumed but not captured
const LEAD_IN: &str = r"(?:A of\s+|like those contained in\s+|of\s+|s\s+)?";

// ", 1860", " 1860" or ", 1860 (Central)"
const YEAR_TAIL: &str = r"(?:,\s+\d{4}|\s+\d{4}|,\s*\d{4}(?:\s*\([A-Za-z\s]+\))?)";

/// Once this many other references are found, bare "... Law" mentions are skipped.
const LAW_THRESHOLD: usize = 5;

const GENERIC_LAWS: &[&str] = &["law", "that law", "as law", "a law", "new law", "case law", "no law", "other law"];

lazy_static! {
    static ref LINE_BREAK: Regex = Regex::new(r"\n\s*").unwrap();

    static ref ACT: Regex = Regex::new(&format!(
        r"(?i){LEAD_IN}([A-Z][a-zA-Z\s]*(?:\s*\([A-Za-z\s,]+\))*\s*(?:acts|act){YEAR_TAIL})"
    )).unwrap();

    static ref RULE: Regex = Regex::new(&format!(
        r"(?i){LEAD_IN}([A-Z][a-zA-Z\s]*(?:\s*\([A-Za-z\s,]+\))*\s*(?:rules|rule){YEAR_TAIL})"
    )).unwrap();

    static ref LAW: Regex = Regex::new(&format!(
        r"(?i){LEAD_IN}([A-Z][a-zA-Z]+\s*(?:laws|law){YEAR_TAIL}?)"
    )).unwrap();

    static ref PROCEDURE: Regex = Regex::new(&format!(
        r"(?i){LEAD_IN}((?:Code of Criminal Procedure|CrPC|Code of Civil Procedure|CPC),\s+\d{{4}})"
    )).unwrap();

    static ref PENAL_CODE: Regex = Regex::new(&format!(
        r"(?i){LEAD_IN}((?:Penal Code|Indian Penal Code|IPC),\s+\d{{4}})"
    )).unwrap();

    static ref CONSTITUTION: Regex = Regex::new(&format!(
        r"(?i){LEAD_IN}((?:Constitution of India|Constitutional)\s*-\s*Article\s*\d+[A-Za-z]?(?:\s*\([A-Za-z\s]+\))?)"
    )).unwrap();
}

/// Legal references extractor.
pub struct LegalReferencesExtractor;

impl LegalReferencesExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LegalReferencesExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for LegalReferencesExtractor {
    fn id(&self) -> ExtractorId {
        ExtractorId::LegalReferences
    }

    fn extract(&self, doc: &CaseDocument) -> Result<FieldMap> {
        let text = LINE_BREAK.replace_all(doc.text()?, " ");

        let acts = unique_sorted(&ACT, &text);
        let rules = unique_sorted(&RULE, &text);
        let procedures = unique_sorted(&PROCEDURE, &text);
        let penal_codes = unique_sorted(&PENAL_CODE, &text);
        let constitutions = unique_sorted(&CONSTITUTION, &text);

        let others = acts.len() + rules.len() + procedures.len() + penal_codes.len() + constitutions.len();
        let laws = if others >= LAW_THRESHOLD {
            BTreeSet::new()
        } else {
            unique_sorted(&LAW, &text)
                .into_iter()
                .filter(|law| !GENERIC_LAWS.contains(&law.to_lowercase().as_str()))
                .collect()
        };

        let mut fields = FieldMap::new();
        for (name, found) in [
            ("Acts", acts),
            ("Rules", rules),
            ("Laws", laws),
            ("Procedures", procedures),
            ("Penal Codes", penal_codes),
            ("Constitutions", constitutions),
        ] {
            let joined = (!found.is_empty()).then(|| found.into_iter().collect::<Vec<_>>().join(", "));
            put_or_not_found(&mut fields, name, joined);
        }
        Ok(fields)
    }
}

fn unique_sorted(pattern: &Regex, text: &str) -> BTreeSet<String> {
    pattern
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect()
}
