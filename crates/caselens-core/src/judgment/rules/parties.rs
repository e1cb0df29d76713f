//! Citation, case title, case category, hearing dates and party details.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use tracing::debug;

use super::patterns::{
    BODY_HEADINGS, NOT_FOUND, PARAGRAPH_BREAK, SCR_ANNOTATION_CI, TRAILING_ETC, TRAILING_PAREN,
};
use super::{collapse_whitespace, dedup_ordered, split_paragraphs, Rule, RuleSet};
use crate::judgment::{put, Extractor, Result};
use crate::models::{ExtractorId, FieldMap};
use crate::pdf::CaseDocument;

const UNKNOWN: &str = "Unknown";
const NONE: &str = "None";

/// Supreme Court case types by category.
pub const CASE_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Civil",
        &[
            "Advisory Jurisdiction",
            "Arbitration Petition",
            "Civil Appeal",
            "Civil Miscellaneous Petition",
            "Original Suit",
            "Review Petition (Civil)",
            "Special Leave Petition (Civil)",
            "Suo Motu Writ Petition (Civil)",
            "Suo Motu Contempt Petition (Civil)",
            "Suo Motu Transfer Petition (Civil)",
            "Transfer Petition (Civil)",
            "Transferred Case (Civil)",
            "Writ Petition (Civil)",
            "Contempt Petition (Civil)",
            "Curative Petition (Civil)",
            "Election Petition (Civil)",
        ],
    ),
    (
        "Criminal",
        &[
            "Review Petition (Criminal)",
            "Special Leave Petition (Criminal)",
            "Suo Motu Writ (Criminal)",
            "Suo Motu Contempt Petition (Criminal)",
            "Suo Motu Transfer Petition (Criminal)",
            "Suo Motu Writ Petition (Criminal)",
            "Transfer Petition (Criminal)",
            "Transferred Case (Criminal)",
            "Writ Petition (Criminal)",
            "Contempt Petition (Criminal)",
            "Criminal Appeal",
            "Criminal Miscellaneous Petition",
            "Curative Petition (Criminal)",
            "Death Reference Case",
            "Motion (CRL)",
        ],
    ),
    (
        "Others",
        &[
            "Ref. U/A 317(1)",
            "Ref. U/S 14 RTI",
            "Ref. U/S 143",
            "Ref. U/S 17 RTI",
            "Special Reference Case",
            "Tax Reference Case",
            "Disciplinary Jurisdiction",
            "Excise Reference No",
            "Habeas Corpus Petition",
            "Miscellaneous Application",
            "All Sea",
        ],
    ),
];

/// Abbreviated case types as they appear in cause titles.
pub const SUBCATEGORY_SHORT_FORMS: &[(&str, &str)] = &[
    ("writ petition (c)", "Writ Petition (Civil)"),
    ("smw (civil)", "Suo Motu Writ Petition (Civil)"),
    ("smw (crl)", "Suo Motu Writ (Criminal)"),
    ("writ petition (crl)", "Writ Petition (Criminal)"),
    ("slp (civil)", "Special Leave Petition (Civil)"),
    ("slp (crl)", "Special Leave Petition (Criminal)"),
    ("suo motu writ (civil)", "Suo Motu Writ Petition (Civil)"),
    ("suo motu writ (crl)", "Suo Motu Writ (Criminal)"),
    ("motion (crl)", "Motion (CRL)"),
    ("ref. u/a 317(1)", "Ref. U/A 317(1)"),
    ("ref. u/s 14 rti", "Ref. U/S 14 RTI"),
    ("ref. u/s 143", "Ref. U/S 143"),
    ("ref. u/s 17 rti", "Ref. U/S 17 RTI"),
];

const SPECIAL_REFERENCE: &str = "Special Reference Case";

// Optional "No. 12/2020 of 2021" tail after a case type
const CASE_NUMBER_TAIL: &str = r"(?:no\.?\s*[0-9/]+\s*(?:of\s*\d{4})?)?";

// Word boundary that also accepts a case type ending in ")"
const TYPE_END: &str = r"(?:\b|\W|$)";

lazy_static! {
    /// Alternation over every case type and short form, longest first.
    static ref CASE_TYPE_ALT: String = {
        let mut names: Vec<&str> = CASE_CATEGORIES
            .iter()
            .flat_map(|(_, subcats)| subcats.iter().copied())
            .chain(SUBCATEGORY_SHORT_FORMS.iter().map(|(short, _)| *short))
            .collect();
        names.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        let escaped: Vec<String> = names.iter().map(|n| regex::escape(n)).collect();
        format!(r"{}|special\s*reference|reference\s*case|reference", escaped.join("|"))
    };

    static ref CASE_TYPE_PLAIN: Regex = Regex::new(&format!(
        r"(?i)\b({alt}){TYPE_END}\s*{CASE_NUMBER_TAIL}", alt = *CASE_TYPE_ALT
    )).unwrap();

    static ref CASE_TYPE_PAREN: Regex = Regex::new(&format!(
        r"(?i)\(\s*({alt})\s*{CASE_NUMBER_TAIL}\s*\)", alt = *CASE_TYPE_ALT
    )).unwrap();

    static ref TITLE_SINGLE_LINE: Regex = Regex::new(&format!(
        r"(?i)([^\n]+?)\s+v(?:s|ersus)?\.?\s+([^\n(]+)(?:\s*\(({alt})\s*{CASE_NUMBER_TAIL}\))?",
        alt = *CASE_TYPE_ALT
    )).unwrap();

    static ref SECOND_PARTY_WITH_TYPE: Regex = Regex::new(&format!(
        r"(?i)(.+?)\s*\(({alt})\s*{CASE_NUMBER_TAIL}\)", alt = *CASE_TYPE_ALT
    )).unwrap();

    static ref VERSUS_LINE: Regex = Regex::new(r"(?i)^\s*v(?:s|ersus)?\.?\s+(.+)").unwrap();
    static ref VERSUS: Regex = Regex::new(r"(?i)\s+v(?:s|ersus)?\.?\s+").unwrap();
    static ref IN_RE: Regex = Regex::new(r"(?i)In\s+Re[\s:]+").unwrap();
    static ref IN_RE_END: Regex = Regex::new(r"(?i)etc\.|\(").unwrap();

    static ref NON_PRINTABLE: Regex = Regex::new(r"[^\x20-\x7E\n\r\t]").unwrap();

    static ref FALLBACK_TITLE_NOISE: Regex = Regex::new(
        r"(?i)\s*\(.*no\.?\s*\d+.*|\s*\d{1,2}\s+[A-Za-z]+\s+20\d{2}.*|\[.*J[\].].*$|\s*etc\.?$"
    ).unwrap();

    /// Case types implied by an "In Re" title, in priority order.
    static ref IN_RE_CASE_TYPES: RuleSet = RuleSet::new(vec![
        Rule::new("Writ Petition (Civil)", r"(?i)\b(?:writ\s*petition\s*\(c\)|writ\s*petition)\b"),
        Rule::new("Suo Motu Writ (Criminal)", r"(?i)\b(?:smw\s*\(crl\)|suo\s*motu\s*writ\s*\(criminal\))"),
        Rule::new("Suo Motu Writ Petition (Civil)", r"(?i)\b(?:smw\s*\(civil\)|suo\s*motu\s*writ\s*petition\s*\(civil\)|suo\s*motu\s*writ\b)"),
        Rule::new(SPECIAL_REFERENCE, r"(?i)\b(?:special\s*reference|reference\s*case|reference|constitutional)\b"),
        Rule::new("Habeas Corpus Petition", r"(?i)\bhabeas\s*corpus\b"),
        Rule::new("Miscellaneous Application", r"(?i)\bmiscellaneous\s*application\b"),
    ]);

    /// Every case type as a standalone phrase, for the first-page scan.
    static ref CASE_TYPE_PHRASES: Vec<(&'static str, &'static str, Regex)> = CASE_CATEGORIES
        .iter()
        .flat_map(|(category, subcats)| subcats.iter().map(move |subcat| (*category, *subcat)))
        .map(|(category, subcat)| {
            let pattern = format!(r"(?i)\b{}{TYPE_END}", regex::escape(subcat));
            (category, subcat, Regex::new(&pattern).unwrap())
        })
        .collect();

    static ref HEARING: Regex = Regex::new(
        r"(?i)(?:hearing|heard|reserved|arguments\s*advanced|court\s*convened)\s*(?:on|dated)?\s*(\d{1,2}(?:st|nd|rd|th)?\s+(?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{4}|\d{1,2}[/-]\d{1,2}[/-]\d{4})"
    ).unwrap();

    static ref FILER_KEYWORD: Regex = Regex::new(r"(?i)(?:petitioner|appellant|plaintiff)\s*[:;-]?\s*([^,\n;]+)").unwrap();
    static ref AGAINST_KEYWORD: Regex = Regex::new(r"(?i)(?:respondent|defendant)\s*[:;-]?\s*([^,\n;]+)").unwrap();

    static ref REPORT_REFERENCE: Regex = Regex::new(r"\[\d{4}\].*?\d{4}\s*(?:SCC|INSC)\s*\d+").unwrap();
    static ref CASE_DETAILS_TAIL: Regex = Regex::new(r"(?i)Case\s+Details.*").unwrap();
    static ref STATUTE_WORDS: Regex = Regex::new(
        r"(?i)(?:\bthe\s+)?\b(?:prevention\s+of|act|law|rules|regulation|code|section)\s+[a-zA-Z0-9\s]*"
    ).unwrap();
    static ref DANGLING_STATE_OF: Regex = Regex::new(r"(?i)(?:the\s+)?state\s+of\s*$").unwrap();
    static ref DANGLING_UNION_OF: Regex = Regex::new(r"(?i)(?:the\s+)?union\s+of\s*$").unwrap();

    /// Proceeding type to (filer action, against action), first match wins.
    static ref LEGAL_ACTIONS: Vec<(Regex, &'static str, &'static str)> = [
        (r"civil appeal", "Filed a Civil Appeal", "Contested the Appeal"),
        (r"criminal appeal|appeal", "Filed a Criminal Appeal", "Contested the Appeal"),
        (r"writ petition", "Filed a Writ Petition", "Opposed the Writ Petition"),
        (r"special leave petition|slp", "Filed a Special Leave Petition", "Opposed the Special Leave Petition"),
        (r"revision petition", "Filed a Revision Petition", "Opposed the Revision Petition"),
        (r"suit", "Filed a Suit", "Defended the Suit"),
        (r"complaint", "Filed a Complaint", "Opposed the Complaint"),
        (r"bail application", "Filed a Bail Application", "Opposed the Bail Application"),
        (r"arbitration petition", "Filed an Arbitration Petition", "Opposed the Arbitration Petition"),
    ]
    .iter()
    .map(|(p, filer, against)| (Regex::new(&format!("(?i){p}")).unwrap(), *filer, *against))
    .collect();
}

const INDIVIDUAL_MARKERS: &[&str] = &["s/o", "d/o", "w/o", "aged", "years old"];
const ORGANIZATION_MARKERS: &[&str] = &["ltd", "limited", "corporation", "company", "pvt", "llp", "inc", "represented by"];
const GOVERNMENT_MARKERS: &[&str] = &["state of", "government", "union of", "ministry", "department"];

const PARTY_FIELDS: [&str; 10] = [
    "Filed By",
    "Against Who",
    "Filer Action",
    "Against Action",
    "Filer Name",
    "Against Name",
    "Filer Identity",
    "Filer Other Attributes",
    "Against Identity",
    "Against Other Attributes",
];

/// Parties extractor.
pub struct PartiesExtractor;

impl PartiesExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PartiesExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for PartiesExtractor {
    fn id(&self) -> ExtractorId {
        ExtractorId::Parties
    }

    fn extract(&self, doc: &CaseDocument) -> Result<FieldMap> {
        let text = doc.text()?;
        let heading = extract_case_title(text);

        let is_in_re = IN_RE.is_match(&heading.title);
        let parties = if is_in_re {
            debug!("In Re case, leaving party fields empty: {}", heading.title);
            None
        } else {
            let parties = extract_party_info(text, &heading.title);
            let has_versus = VERSUS.is_match(&heading.title);
            if has_versus || parties.filer_name != UNKNOWN {
                Some(parties)
            } else {
                None
            }
        };

        let (category, subcategories) =
            determine_category(text, &heading.title, heading.subcategory.as_deref());
        let hearings = extract_hearing_dates(text);

        let mut fields = FieldMap::new();
        put(&mut fields, "Citation", heading.citation);
        put(&mut fields, "Case Title", heading.title);
        if hearings.is_empty() {
            put(&mut fields, "Hearing Dates", UNKNOWN);
            put(&mut fields, "Number of Hearings", UNKNOWN);
        } else {
            put(&mut fields, "Hearing Dates", hearings.join(", "));
            put(&mut fields, "Number of Hearings", hearings.len().to_string());
        }
        put(&mut fields, "Category", category);
        put(&mut fields, "Subcategory", subcategories.join(", "));

        match parties {
            Some(parties) => {
                for (name, value) in PARTY_FIELDS.iter().zip(parties.values()) {
                    put(&mut fields, name, value);
                }
            }
            None => {
                for name in PARTY_FIELDS {
                    put(&mut fields, name, NONE);
                }
            }
        }

        Ok(fields)
    }
}

/// Citation, title and any case type found next to the title.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CaseHeading {
    citation: String,
    title: String,
    subcategory: Option<String>,
}

fn extract_case_title(text: &str) -> CaseHeading {
    let cleaned = NON_PRINTABLE.replace_all(text, "");
    let lines: Vec<&str> = cleaned.lines().take(10).collect();

    let citation = lines
        .first()
        .and_then(|line| SCR_ANNOTATION_CI.find(line.trim()))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_else(|| NOT_FOUND.to_string());

    let heading = |title: String, subcategory: Option<String>| CaseHeading {
        citation: citation.clone(),
        title,
        subcategory,
    };

    // "A v. B (Civil Appeal No. 1 of 2020)" on one line
    let first_page = lines.join("\n");
    if let Some(caps) = TITLE_SINGLE_LINE.captures(&first_page) {
        let filer = caps[1].trim();
        let against = TRAILING_ETC.replace(caps[2].trim(), "");
        let title = tidy_title(&format!("{filer} v. {against}"));
        let subcategory = caps.get(3).map(|m| normalize_subcategory(m.as_str()));
        return heading(title, subcategory);
    }

    // Parties split over two lines, the second starting with "v."
    let next_lines: Vec<&str> = lines.iter().skip(1).take(7).copied().collect();
    for (i, line) in next_lines.iter().enumerate().skip(1) {
        let Some(caps) = VERSUS_LINE.captures(line.trim()) else {
            continue;
        };
        let first_party = next_lines[i - 1].trim();
        let mut second_party = TRAILING_ETC.replace(caps[1].trim(), "").into_owned();
        let mut subcategory = None;
        if let Some(typed) = SECOND_PARTY_WITH_TYPE.captures(&second_party) {
            subcategory = Some(normalize_subcategory(&typed[2]));
            second_party = typed[1].trim().to_string();
        }
        if !first_party.is_empty() && !second_party.is_empty() {
            return heading(tidy_title(&format!("{first_party} v. {second_party}")), subcategory);
        }
    }

    let combined = collapse_whitespace(
        &next_lines
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
    );

    if let Some(subject) = in_re_subject(&combined) {
        let title = collapse_whitespace(&TRAILING_ETC.replace(&format!("In Re: {subject}"), ""));
        let subcategory = lines
            .iter()
            .position(|l| IN_RE.is_match(l))
            .and_then(|idx| {
                CASE_TYPE_PAREN
                    .captures(lines[idx])
                    .map(|c| normalize_subcategory(&c[1]))
                    .or_else(|| find_case_type(lines.get(idx + 1..lines.len().min(8)).unwrap_or_default()))
            });
        return heading(title, subcategory);
    }

    // No recognizable title line: clean up whatever opens the document
    let source = if combined.is_empty() {
        split_paragraphs(text, &PARAGRAPH_BREAK, Some(&*BODY_HEADINGS))
            .first()
            .map(|p| p.chars().take(100).collect::<String>())
            .unwrap_or_default()
    } else {
        combined
    };
    let title = collapse_whitespace(&FALLBACK_TITLE_NOISE.replace_all(&source, ""));
    let title = if title.is_empty() { UNKNOWN.to_string() } else { title };
    heading(title, find_case_type(&next_lines))
}

/// Text after "In Re", up to "etc." or an opening parenthesis.
fn in_re_subject(text: &str) -> Option<&str> {
    let start = IN_RE.find(text)?.end();
    let rest = &text[start..];
    let end = rest
        .char_indices()
        .nth(1)
        .and_then(|(first, _)| IN_RE_END.find_at(rest, first).map(|m| m.start()))
        .unwrap_or(rest.len());
    let subject = rest[..end].trim();
    (!subject.is_empty()).then_some(subject)
}

fn tidy_title(title: &str) -> String {
    let title = collapse_whitespace(title);
    TRAILING_PAREN.replace(&title, "").trim().to_string()
}

/// First case type on any of `lines`, parenthesized form preferred per line.
fn find_case_type(lines: &[&str]) -> Option<String> {
    lines.iter().find_map(|line| {
        CASE_TYPE_PAREN
            .captures(line)
            .or_else(|| CASE_TYPE_PLAIN.captures(line))
            .map(|caps: Captures| normalize_subcategory(&caps[1]))
    })
}

/// Expand short forms and restore the canonical spelling of a case type.
pub fn normalize_subcategory(raw: &str) -> String {
    let key = collapse_whitespace(raw).to_lowercase();

    if let Some((_, full)) = SUBCATEGORY_SHORT_FORMS.iter().find(|(short, _)| *short == key) {
        return (*full).to_string();
    }
    if matches!(key.as_str(), "special reference" | "reference case" | "reference")
        || key.replace(' ', "") == "specialreference"
    {
        return SPECIAL_REFERENCE.to_string();
    }
    CASE_CATEGORIES
        .iter()
        .flat_map(|(_, subcats)| subcats.iter())
        .find(|subcat| subcat.to_lowercase() == key)
        .map(|subcat| (*subcat).to_string())
        .unwrap_or_else(|| raw.trim().to_string())
}

fn category_of(subcategory: &str) -> Option<&'static str> {
    CASE_CATEGORIES
        .iter()
        .find(|(_, subcats)| subcats.contains(&subcategory))
        .map(|(category, _)| *category)
}

/// Category and subcategories, from the title, the opening lines, or the first page.
fn determine_category(text: &str, title: &str, from_title: Option<&str>) -> (String, Vec<String>) {
    let mut subcategories = Vec::new();

    if let Some(subcategory) = from_title {
        let subcategory = normalize_subcategory(subcategory);
        if let Some(category) = category_of(&subcategory) {
            return (category.to_string(), vec![subcategory]);
        }
        subcategories.push(subcategory);
    }

    let opening: Vec<&str> = text.lines().take(7).collect();
    let mut category = None;

    if let Some(subcategory) = find_case_type(&opening) {
        category = category_of(&subcategory);
        subcategories.push(subcategory);
    }

    if subcategories.is_empty() && IN_RE.is_match(title) {
        let haystack = format!("{} {}", title.to_lowercase(), opening.join(" ").to_lowercase());
        if let Some(rule) = IN_RE_CASE_TYPES.any_match(&haystack) {
            subcategories.push(rule.name.to_string());
            category = Some(match rule.name {
                "Writ Petition (Civil)" | "Suo Motu Writ Petition (Civil)" => "Civil",
                "Suo Motu Writ (Criminal)" => "Criminal",
                _ => "Others",
            });
        }
    }

    if subcategories.is_empty() {
        let first_page: String = text.chars().take(1000).collect();
        for (cat, subcat, pattern) in CASE_TYPE_PHRASES.iter() {
            if pattern.is_match(&first_page) {
                subcategories.push((*subcat).to_string());
                category.get_or_insert(*cat);
            }
        }
    }

    if category.is_none() {
        category = subcategories.iter().find_map(|s| category_of(s));
    }
    if subcategories.is_empty() {
        subcategories.push(UNKNOWN.to_string());
    }

    (category.unwrap_or(UNKNOWN).to_string(), subcategories)
}

/// Dates introduced by hearing vocabulary, deduplicated in order.
fn extract_hearing_dates(text: &str) -> Vec<String> {
    dedup_ordered(HEARING.captures_iter(text).map(|caps| caps[1].to_string()))
}

/// Party fields, in output order.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PartyInfo {
    filed_by: String,
    against_who: String,
    filer_action: String,
    against_action: String,
    filer_name: String,
    against_name: String,
    filer_identity: String,
    filer_attributes: String,
    against_identity: String,
    against_attributes: String,
}

impl PartyInfo {
    fn unknown() -> Self {
        let u = || UNKNOWN.to_string();
        Self {
            filed_by: u(),
            against_who: u(),
            filer_action: u(),
            against_action: u(),
            filer_name: u(),
            against_name: u(),
            filer_identity: u(),
            filer_attributes: u(),
            against_identity: u(),
            against_attributes: u(),
        }
    }

    fn values(self) -> [String; 10] {
        [
            self.filed_by,
            self.against_who,
            self.filer_action,
            self.against_action,
            self.filer_name,
            self.against_name,
            self.filer_identity,
            self.filer_attributes,
            self.against_identity,
            self.against_attributes,
        ]
    }
}

fn extract_party_info(text: &str, title: &str) -> PartyInfo {
    let mut info = PartyInfo::unknown();

    let (mut filer, mut against) = match VERSUS.find(title) {
        Some(m) => {
            let against = title[m.end()..].split(['\n', '(']).next().unwrap_or_default();
            let against = TRAILING_ETC.replace(against.trim(), "");
            (
                clean_party_name(&remove_statute_names(&title[..m.start()])),
                clean_party_name(&remove_statute_names(&against)),
            )
        }
        None => (String::new(), String::new()),
    };

    if filer.is_empty() {
        if let Some(caps) = FILER_KEYWORD.captures(text) {
            filer = clean_party_name(&remove_statute_names(&caps[1]));
        }
    }
    if against.is_empty() {
        if let Some(caps) = AGAINST_KEYWORD.captures(text) {
            against = clean_party_name(&remove_statute_names(&caps[1]));
        }
    }

    if filer.is_empty() || against.is_empty() {
        debug!("Could not identify both parties");
        return info;
    }

    let (filer_action, against_action) = legal_actions(text);
    info.filed_by = "Petitioner/Appellant".to_string();
    info.against_who = "Respondent/Defendant".to_string();
    info.filer_action = filer_action.to_string();
    info.against_action = against_action.to_string();
    info.filer_identity = party_identity(&filer).to_string();
    info.against_identity = party_identity(&against).to_string();
    info.filer_name = filer;
    info.against_name = against;
    info
}

fn clean_party_name(name: &str) -> String {
    let name = REPORT_REFERENCE.replace_all(name, "");
    let name = CASE_DETAILS_TAIL.replace_all(&name, "");
    name.trim_matches([' ', '-', ':', '\n', '.', ',', ';']).to_string()
}

fn remove_statute_names(name: &str) -> String {
    let name = STATUTE_WORDS.replace_all(name, "");
    let name = DANGLING_STATE_OF.replace(&name, "State of");
    let name = DANGLING_UNION_OF.replace(&name, "Union of");
    name.trim().to_string()
}

fn legal_actions(text: &str) -> (&'static str, &'static str) {
    LEGAL_ACTIONS
        .iter()
        .find(|(pattern, _, _)| pattern.is_match(text))
        .map(|(_, filer, against)| (*filer, *against))
        .unwrap_or(("Filed a Petition/Appeal", "Opposed the Petition/Appeal"))
}

fn party_identity(name: &str) -> &'static str {
    let lower = name.to_lowercase();
    let has = |markers: &[&str]| markers.iter().any(|m| lower.contains(m));
    if has(INDIVIDUAL_MARKERS) {
        "Individual"
    } else if has(ORGANIZATION_MARKERS) {
        "Organization"
    } else if has(GOVERNMENT_MARKERS) {
        "Government"
    } else {
        "Other"
    }
}
