//! Candidate name resolution.
//!
//! Strategies run in order and the first hit wins:
//! 1. A window of lines directly above the email line, closest first
//! 2. The first lines of the document
//! 3. A glued top line whose search text splits into two name words

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ParsingConfig;
use crate::normalize::{self, NormalizedLine};
use crate::section;

/// Lines that are section headers, never names.
pub(crate) const DEFAULT_HEADER_BLACKLIST: &[&str] = &[
    "objective",
    "summary",
    "professional summary",
    "profile",
    "experience",
    "work experience",
    "professional experience",
    "career experience",
    "work history",
    "employment",
    "employment history",
    "education",
    "skills",
    "technical skills",
    "soft skills",
    "core competencies",
    "technical proficiencies",
    "competencies",
    "proficiencies",
    "areas of expertise",
    "expertise",
    "strengths",
    "projects",
    "certifications",
    "certification",
    "licenses",
    "awards",
    "publications",
    "volunteer",
    "volunteering",
    "volunteer experience",
    "interests",
    "hobbies",
    "references",
    "additional information",
    "contact",
    "contact information",
    "curriculum vitae",
    "resume",
];

/// Longest line (in characters) considered as a name.
const MAX_NAME_CHARS: usize = 60;

static NAME_SHAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z .'-]{1,58}$").unwrap());

static NAME_WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z][A-Za-z.'-]*$").unwrap());

/// Which strategy produced a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameStrategy {
    EmailWindow,
    TopOfDocument,
    GluedHeader,
}

/// A resolved name and where it was found.
#[derive(Debug, Clone, PartialEq)]
pub struct NameCandidate {
    pub value: String,
    pub line_index: usize,
    pub locator: String,
    pub strategy: NameStrategy,
}

type Strategy = fn(&[NormalizedLine<'_>], Option<usize>, &NameRules) -> Option<NameCandidate>;

const STRATEGIES: &[Strategy] = &[from_email_window, from_top_of_document, from_glued_header];

struct NameRules<'a> {
    blacklist: Vec<String>,
    window: usize,
    top_lines: usize,
    config: &'a ParsingConfig,
}

impl NameRules<'_> {
    /// Section headers the header patterns recognize, with or without a
    /// qualifier ("RELEVANT EXPERIENCE", "ACADEMIC BACKGROUND").
    fn is_section_header(&self, text: &str) -> bool {
        is_header_line(text, &self.blacklist)
            || section::is_experience_header_with_config(text, self.config)
            || section::is_education_header_with_config(text, self.config)
    }
}

/// Resolve the candidate name from the head of the document.
pub fn resolve_name(lines: &[NormalizedLine<'_>], email_line: Option<usize>) -> Option<NameCandidate> {
    resolve_name_with_config(lines, email_line, &ParsingConfig::default())
}

pub(crate) fn resolve_name_with_config(
    lines: &[NormalizedLine<'_>],
    email_line: Option<usize>,
    config: &ParsingConfig,
) -> Option<NameCandidate> {
    let defaults: Vec<String> = DEFAULT_HEADER_BLACKLIST.iter().map(|h| h.to_string()).collect();
    let mut blacklist = config.header_blacklist.resolve(&defaults);
    for header in section::resolve_section_headers(config) {
        if !blacklist.contains(&header) {
            blacklist.push(header);
        }
    }
    let rules = NameRules {
        blacklist,
        window: config.name_window,
        top_lines: config.top_scan_lines,
        config,
    };

    let found = STRATEGIES.iter().find_map(|strategy| strategy(lines, email_line, &rules));
    if let Some(candidate) = &found {
        tracing::debug!(
            name = %candidate.value,
            strategy = ?candidate.strategy,
            locator = %candidate.locator,
            "resolved candidate name"
        );
    }
    found
}

fn from_email_window(
    lines: &[NormalizedLine<'_>],
    email_line: Option<usize>,
    rules: &NameRules,
) -> Option<NameCandidate> {
    let email_line = email_line?;
    let first = email_line.saturating_sub(rules.window);
    (first..email_line)
        .rev()
        .find_map(|i| candidate_at(lines, i, rules, NameStrategy::EmailWindow))
}

fn from_top_of_document(
    lines: &[NormalizedLine<'_>],
    _email_line: Option<usize>,
    rules: &NameRules,
) -> Option<NameCandidate> {
    (0..rules.top_lines.min(lines.len()))
        .find_map(|i| candidate_at(lines, i, rules, NameStrategy::TopOfDocument))
}

fn from_glued_header(
    lines: &[NormalizedLine<'_>],
    _email_line: Option<usize>,
    rules: &NameRules,
) -> Option<NameCandidate> {
    let (index, line) = lines.iter().enumerate().find(|(_, l)| !l.is_blank())?;
    if line.original.text.split_whitespace().count() != 1 {
        return None;
    }

    let head = line.search_text.split('@').next().unwrap_or_default();
    let words: Vec<&str> = head.split_whitespace().take(2).collect();
    if words.len() != 2 || !words.iter().all(|w| NAME_WORD_RE.is_match(w)) {
        return None;
    }

    let value = words.join(" ");
    if rules.is_section_header(&value) {
        return None;
    }
    Some(NameCandidate {
        value: title_case_if_shouting(&value),
        line_index: index,
        locator: line.original.locator.clone(),
        strategy: NameStrategy::GluedHeader,
    })
}

fn candidate_at(
    lines: &[NormalizedLine<'_>],
    index: usize,
    rules: &NameRules<'_>,
    strategy: NameStrategy,
) -> Option<NameCandidate> {
    let line = lines.get(index)?;
    let original = line.original.text.trim();
    let blacklist = &rules.blacklist;
    let letter_spaced = matches!(normalize::despace(original), Cow::Owned(_));
    let value = if !letter_spaced && looks_like_name(original, blacklist) {
        original.split_whitespace().collect::<Vec<_>>().join(" ")
    } else if looks_like_name(&line.search_text, blacklist) {
        line.search_text.clone()
    } else {
        return None;
    };
    if rules.is_section_header(&value) {
        return None;
    }
    Some(NameCandidate {
        value: title_case_if_shouting(&value),
        line_index: index,
        locator: line.original.locator.clone(),
        strategy,
    })
}

/// Whether a line is shaped like a personal name: two or more words of
/// letters, short, and not a section header.
pub fn looks_like_name(text: &str, blacklist: &[String]) -> bool {
    let text = text.trim();
    text.chars().count() <= MAX_NAME_CHARS
        && !is_header_line(text, blacklist)
        && NAME_SHAPE_RE.is_match(text)
        && text.split_whitespace().count() >= 2
}

/// A blacklisted header, or a single all-caps word.
pub(crate) fn is_header_line(text: &str, blacklist: &[String]) -> bool {
    let key = crate::section::header_key(text);
    if blacklist.iter().any(|h| *h == key) {
        return true;
    }
    let trimmed = text.trim();
    !trimmed.contains(char::is_whitespace)
        && trimmed.chars().any(|c| c.is_alphabetic())
        && !trimmed.chars().any(|c| c.is_lowercase())
}

/// "JANE O'NEIL-SMITH" -> "Jane O'Neil-Smith"; mixed-case names are kept.
pub(crate) fn title_case_if_shouting(name: &str) -> String {
    if name.chars().any(|c| c.is_lowercase()) {
        return name.to_string();
    }
    let mut out = String::with_capacity(name.len());
    let mut at_word_start = true;
    for c in name.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_lines;
    use resume_core::{Line, SourceKind};

    fn lines(texts: &[&str]) -> Vec<Line> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Line::new(*t, format!("text:line:{}", i + 1), SourceKind::Text))
            .collect()
    }

    fn blacklist() -> Vec<String> {
        DEFAULT_HEADER_BLACKLIST.iter().map(|h| h.to_string()).collect()
    }

    #[test]
    fn test_window_prefers_closest_line() {
        let doc = lines(&["RESUME", "Jane Doe", "Portland, OR", "jane@x.com"]);
        let normalized = normalize_lines(&doc);
        let name = resolve_name(&normalized, Some(3)).unwrap();
        assert_eq!(name.value, "Jane Doe");
        assert_eq!(name.line_index, 1);
        assert_eq!(name.strategy, NameStrategy::EmailWindow);
        assert_eq!(name.locator, "text:line:2");
    }

    #[test]
    fn test_all_caps_name_title_cased() {
        let doc = lines(&["JOHN DOE", "john@x.com"]);
        let normalized = normalize_lines(&doc);
        let name = resolve_name(&normalized, Some(1)).unwrap();
        assert_eq!(name.value, "John Doe");
    }

    #[test]
    fn test_letter_spaced_name() {
        let doc = lines(&["J O H N   D O E", "john@x.com"]);
        let normalized = normalize_lines(&doc);
        let name = resolve_name(&normalized, Some(1)).unwrap();
        assert_eq!(name.value, "John Doe");
        assert_eq!(name.locator, "text:line:1");
    }

    #[test]
    fn test_top_fallback_without_email() {
        let doc = lines(&["SUMMARY", "Maria Garcia", "Sales leader"]);
        let normalized = normalize_lines(&doc);
        let name = resolve_name(&normalized, None).unwrap();
        assert_eq!(name.value, "Maria Garcia");
        assert_eq!(name.strategy, NameStrategy::TopOfDocument);
    }

    #[test]
    fn test_glued_header_name() {
        let doc = lines(&["JaneDoe|555-123-4567", "SKILLS"]);
        let normalized = normalize_lines(&doc);
        let name = resolve_name(&normalized, None).unwrap();
        assert_eq!(name.value, "Jane Doe");
        assert_eq!(name.strategy, NameStrategy::GluedHeader);
    }

    #[test]
    fn test_glued_name_split_by_search_text() {
        let doc = lines(&["JaneDoe", "SKILLS"]);
        let normalized = normalize_lines(&doc);
        let name = resolve_name(&normalized, None).unwrap();
        assert_eq!(name.value, "Jane Doe");
        assert_eq!(name.strategy, NameStrategy::TopOfDocument);
    }

    #[test]
    fn test_no_name_when_only_headers() {
        let doc = lines(&["EXPERIENCE", "Professional Summary", "jane@x.com"]);
        let normalized = normalize_lines(&doc);
        assert!(resolve_name(&normalized, Some(2)).is_none());
    }

    #[test]
    fn test_qualified_section_headers_are_not_names() {
        for header in ["RELEVANT EXPERIENCE", "CAREER HISTORY", "ACADEMIC BACKGROUND"] {
            let doc = lines(&[header, "jane@x.com"]);
            let normalized = normalize_lines(&doc);
            assert!(resolve_name(&normalized, Some(1)).is_none(), "{} taken as a name", header);
        }
        let doc = lines(&["CAREER HISTORY", "Jane Doe", "jane@x.com"]);
        let normalized = normalize_lines(&doc);
        assert_eq!(resolve_name(&normalized, Some(2)).unwrap().value, "Jane Doe");
    }

    #[test]
    fn test_looks_like_name() {
        let bl = blacklist();
        assert!(looks_like_name("Mary-Kate O'Brien", &bl));
        assert!(!looks_like_name("Jane", &bl));
        assert!(!looks_like_name("Work Experience", &bl));
        assert!(!looks_like_name("Jane Doe 2024", &bl));
        assert!(!looks_like_name(&"Very Long ".repeat(8), &bl));
    }

    #[test]
    fn test_custom_blacklist() {
        let config = crate::config::ParsingConfigBuilder::new()
            .add_header_blacklist_entry("Sales Leader".to_string())
            .build()
            .unwrap();
        let doc = lines(&["Sales Leader", "jane@x.com"]);
        let normalized = normalize_lines(&doc);
        assert!(resolve_name_with_config(&normalized, Some(1), &config).is_none());
    }

    #[test]
    fn test_title_case_if_shouting() {
        assert_eq!(title_case_if_shouting("JANE O'NEIL-SMITH"), "Jane O'Neil-Smith");
        assert_eq!(title_case_if_shouting("Jane McDonald"), "Jane McDonald");
    }
}
