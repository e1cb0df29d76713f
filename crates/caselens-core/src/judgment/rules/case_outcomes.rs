//! Case result from the closing sentences of the judgment.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use super::patterns::{is_reference_text, CASE_NAME_CITATION};
use super::{dedup_ordered, join_or_none, split_sentences, Rule, RuleSet};
use crate::judgment::{put_or_not_found, Extractor, Result};
use crate::models::{ExtractionConfig, ExtractorId, FieldMap};
use crate::pdf::CaseDocument;

const RESULT_PREFIX: &str = "Result of the case:";

lazy_static! {
    static ref EXPLICIT_RESULT: Regex = Regex::new(r"(?i)\bResult\s+of\s+the\s+case\s*:").unwrap();

    /// Outcome categories, named by the label reported in "Outcome Categories".
    static ref OUTCOMES: RuleSet = RuleSet::new(vec![
        Rule::new("Appeal(s) Allowed", r"(?i)\bappeals?\s+(?:(?:is|are|was|were)\s+)?allowed\b|\bappeals?\s+succeeds?\b"),
        Rule::new("Appeal(s) Dismissed", r"(?i)\bappeals?\s+(?:(?:is|are|was|were)\s+)?dismissed\b|\bappeals?\s+fails?\b"),
        Rule::new("Appeal(s) Disposed Of", r"(?i)\bappeals?\s+(?:(?:is|are|was|were)\s+)?disposed\s+of\b"),
        Rule::new("Case(s) Allowed", r"(?i)\b(?:cases?|petitions?)\s+(?:(?:is|are|was|were)\s+)?allowed\b"),
        Rule::new("Case(s) Partially Allowed", r"(?i)\b(?:cases?|petitions?)\s+(?:(?:is|are|was|were)\s+)?partially\s+allowed\b"),
        Rule::new("Case(s) Dismissed", r"(?i)\b(?:cases?|petitions?)\s+(?:(?:is|are|was|were)\s+)?dismissed\b"),
        Rule::new("Case(s) Disposed Of", r"(?i)\b(?:cases?|petitions?)\s+(?:(?:is|are|was|were)\s+)?disposed\s+of\b"),
        Rule::new("Case(s) Remanded", r"(?i)\b(?:cases?|petitions?)\s+(?:(?:is|are|was|were)\s+)?remanded\b"),
        Rule::new("Case(s) Remitted Back", r"(?i)\b(?:cases?|petitions?)\s+(?:(?:is|are|was|were)\s+)?remitted\s+back\b"),
        Rule::new(
            "Directions Issued",
            r"(?i)\bdirections?\s+(?:(?:are|were)\s+)?issued\b|\bdirectives?\s+issued\b|\borders?\s+issued\s+to\b",
        ),
        Rule::new(
            "Matter Referred to Larger Bench",
            r"(?i)\bmatter\s+(?:(?:is|was)\s+)?referred\s+to\s+larger\s+bench\b|\breferred\s+to\s+a\s+larger\s+bench\b",
        ),
        Rule::new("Impugned Order Set Aside", r"(?i)\bimpugned\s+(?:order|judgment)\s+(?:set\s+aside|quashed)\b"),
        Rule::new("Impugned Order Upheld", r"(?i)\bimpugned\s+(?:order|judgment)\s+(?:upheld|affirmed)\b"),
    ]);
}

/// Case outcomes extractor.
pub struct CaseOutcomesExtractor {
    max_sentences: usize,
    fallback_sentences: usize,
}

impl CaseOutcomesExtractor {
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            max_sentences: config.max_outcome_sentences,
            fallback_sentences: config.fallback_outcome_sentences,
        }
    }

    fn case_result(&self, text: &str) -> (Option<String>, Vec<String>) {
        let sentences = split_sentences(text);
        let closing = &sentences[sentences.len().saturating_sub(self.max_sentences)..];

        if let Some((sentence, m)) = closing
            .iter()
            .rev()
            .find_map(|s| EXPLICIT_RESULT.find(s).map(|m| (*s, m)))
        {
            let rest = sentence[m.end()..].trim();
            debug!("Explicit case result found");
            return (Some(format!("{RESULT_PREFIX} {rest}.")), categories(&[rest]));
        }

        let candidates: Vec<&str> = closing.iter().copied().filter(|s| !is_citing(s)).collect();

        let outcome_sentences: Vec<&str> = candidates
            .iter()
            .copied()
            .filter(|s| OUTCOMES.is_match(s))
            .collect();
        if !outcome_sentences.is_empty() {
            let result = format!("{RESULT_PREFIX} {}.", outcome_sentences.join(". "));
            return (Some(result), categories(&outcome_sentences));
        }

        let tail = &candidates[candidates.len().saturating_sub(self.fallback_sentences)..];
        if tail.is_empty() {
            return (None, Vec::new());
        }
        debug!("No outcome keywords, keeping the last {} sentence(s)", tail.len());
        (Some(format!("{RESULT_PREFIX} {}.", tail.join(". "))), Vec::new())
    }
}

impl Default for CaseOutcomesExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for CaseOutcomesExtractor {
    fn id(&self) -> ExtractorId {
        ExtractorId::CaseOutcomes
    }

    fn extract(&self, doc: &CaseDocument) -> Result<FieldMap> {
        let (result, categories) = self.case_result(doc.text()?);

        let mut fields = FieldMap::new();
        put_or_not_found(&mut fields, "Case Result", result);
        put_or_not_found(&mut fields, "Outcome Categories", join_or_none(&categories));
        Ok(fields)
    }
}

fn is_citing(sentence: &str) -> bool {
    is_reference_text(sentence) || CASE_NAME_CITATION.is_match(sentence)
}

fn categories(sentences: &[&str]) -> Vec<String> {
    dedup_ordered(sentences.iter().flat_map(|s| {
        OUTCOMES
            .iter()
            .filter(|rule| rule.pattern.is_match(s))
            .map(|rule| rule.name.to_string())
    }))
}
