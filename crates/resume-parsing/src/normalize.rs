//! Search-text normalization.
//!
//! Every line gets a `search_text` view used for matching. The view only
//! ever adds or removes whitespace, so its non-whitespace characters are
//! exactly those of the original line; [`NormalizedLine::original_span`]
//! relies on that to map matches back onto the original text.

use std::borrow::Cow;
use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use resume_core::Line;

use crate::config::ParsingConfig;

/// Job-title words an all-caps glued token can be peeled into.
pub(crate) const DEFAULT_JOB_WORDS: &[&str] = &[
    "TERRITORY",
    "MANAGER",
    "ACCOUNT",
    "KEY",
    "GROUP",
    "SALES",
    "REGIONAL",
    "REGION",
    "SENIOR",
    "DIRECTOR",
    "LEADER",
    "BUSINESS",
    "DEVELOPMENT",
    "ASSOCIATE",
    "EXECUTIVE",
    "SPECIALIST",
    "REPRESENTATIVE",
    "ENGINEER",
    "MARKETING",
    "PRODUCT",
    "PROJECT",
    "PROGRAM",
    "OPERATIONS",
    "ASSISTANT",
    "COORDINATOR",
    "CONSULTANT",
    "ANALYST",
    "DISTRICT",
    "NATIONAL",
    "GLOBAL",
];

/// Words that may be peeled even when the remainder is not a job word
/// ("TERRITORYMANAGEROREGON" -> "... MANAGER OREGON").
const FREE_PEEL_WORDS: &[&str] = &["TERRITORY", "MANAGER"];

/// Punctuation that always stands as its own token.
const GLUE_PUNCT: &[char] = &[',', ';', ':', '/', '|', '(', ')', '[', ']'];

/// Whole glued tokens and the byte offsets to cut them at.
const GLUE_EXACT: &[(&str, &[usize])] = &[
    ("anew", &[1]),
    ("inanew", &[2, 3]),
    ("startanew", &[5, 6]),
    ("leadingto", &[7]),
    ("dueto", &[3]),
];

/// Glued phrases at the start of a token; the remainder must be a word.
const GLUE_PREFIXES: &[(&str, &[usize])] = &[
    ("dueto", &[3, 5]),
    ("leadingto", &[7, 9]),
    ("setthe", &[3, 6]),
];

/// Glued phrases at the end of a token, with the offset of their inner joint.
const GLUE_SUFFIXES: &[(&str, usize)] = &[
    ("inthe", 2),
    ("ofthe", 2),
    ("tothe", 2),
    ("andthe", 3),
    ("tobe", 2),
    ("toa", 2),
];

pub(crate) const JOINERS: &[&str] = &[
    "a", "an", "to", "in", "of", "for", "and", "the", "by", "on", "at", "or", "as", "is",
];

const COMMON3: &[&str] = &[
    "new", "all", "top", "one", "two", "six", "ten", "ver", "and", "the", "for",
];

static GAP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").unwrap());

static DEFAULT_WORDS: Lazy<Vec<String>> =
    Lazy::new(|| DEFAULT_JOB_WORDS.iter().map(|w| w.to_string()).collect());

/// A source line paired with its normalized search view.
#[derive(Debug, Clone)]
pub struct NormalizedLine<'a> {
    pub original: &'a Line,
    pub search_text: String,
}

impl NormalizedLine<'_> {
    pub fn is_blank(&self) -> bool {
        self.search_text.is_empty()
    }

    /// Map a byte range of `search_text` back onto the original line.
    ///
    /// Returns the original text from the first to the last non-whitespace
    /// character covered by `span`, or `None` for an empty span.
    pub fn original_span(&self, span: Range<usize>) -> Option<&str> {
        let search = self.search_text.get(..span.end)?;
        let skip = search[..span.start]
            .chars()
            .filter(|c| !c.is_whitespace())
            .count();
        let take = search[span.start..]
            .chars()
            .filter(|c| !c.is_whitespace())
            .count();
        if take == 0 {
            return None;
        }

        let text = &self.original.text;
        let mut seen = 0;
        let mut start = None;
        for (i, c) in text.char_indices() {
            if c.is_whitespace() {
                continue;
            }
            if seen == skip {
                start = Some(i);
            }
            seen += 1;
            if seen == skip + take {
                return Some(&text[start?..i + c.len_utf8()]);
            }
        }
        None
    }
}

/// Normalize one line of text into its search view.
///
/// Letter-spaced runs are collapsed ("J O H N   D O E" -> "JOHN DOE"), list
/// punctuation is spaced out, and glued words are split apart.
pub fn normalize(text: &str) -> String {
    normalize_with_words(text, &DEFAULT_WORDS)
}

pub(crate) fn normalize_with_config(text: &str, config: &ParsingConfig) -> String {
    normalize_with_words(text, &resolve_job_words(config))
}

/// Normalize every line of a document with the default configuration.
pub fn normalize_lines(lines: &[Line]) -> Vec<NormalizedLine<'_>> {
    normalize_lines_with_config(lines, &ParsingConfig::default())
}

pub(crate) fn normalize_lines_with_config<'a>(
    lines: &'a [Line],
    config: &ParsingConfig,
) -> Vec<NormalizedLine<'a>> {
    let words = resolve_job_words(config);
    lines
        .iter()
        .map(|line| NormalizedLine {
            original: line,
            search_text: normalize_with_words(&line.text, &words),
        })
        .collect()
}

fn resolve_job_words(config: &ParsingConfig) -> Vec<String> {
    config
        .job_words
        .resolve(&DEFAULT_WORDS)
        .into_iter()
        .map(|w| w.trim().to_ascii_uppercase())
        .filter(|w| !w.is_empty())
        .collect()
}

fn normalize_with_words(text: &str, words: &[String]) -> String {
    let despaced = despace_with_words(text, words);
    repair_spacing(&despaced, words)
}

/// Collapse letter-spaced text, keeping wide gaps as word breaks.
pub(crate) fn despace(text: &str) -> Cow<'_, str> {
    despace_with_words(text, &DEFAULT_WORDS)
}

fn despace_with_words<'t>(text: &'t str, words: &[String]) -> Cow<'t, str> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() < 3 || !tokens.iter().all(|t| is_spaced_char(t)) {
        return Cow::Borrowed(text);
    }

    // Only collapse when the glued result is stable under repair, otherwise
    // the next pass would split it differently.
    let concat = tokens.concat();
    if repair_spacing(&concat, words) != concat {
        return Cow::Borrowed(text);
    }

    let parts: Vec<String> = GAP_RE
        .split(text.trim())
        .map(|part| part.split_whitespace().collect::<String>())
        .filter(|part| !part.is_empty())
        .collect();

    if parts.iter().all(|p| p.chars().count() == 1) {
        Cow::Owned(concat)
    } else {
        Cow::Owned(parts.join(" "))
    }
}

fn is_spaced_char(token: &str) -> bool {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c.is_alphanumeric() || "@.()-+".contains(c),
        _ => false,
    }
}

/// Re-space a line: case and digit boundaries, list punctuation and
/// glued words. Every emitted token is a fixpoint of the token splitter.
fn repair_spacing(text: &str, words: &[String]) -> String {
    let spaced = insert_boundaries(text);
    let mut out = Vec::new();
    for token in spaced.split_whitespace() {
        split_token(token, words, &mut out);
    }
    out.join(" ")
}

fn insert_boundaries(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut prev: Option<char> = None;
    for c in text.chars() {
        if GLUE_PUNCT.contains(&c) {
            out.push(' ');
            out.push(c);
            out.push(' ');
            prev = None;
            continue;
        }
        if let Some(p) = prev {
            if is_boundary(p, c) {
                out.push(' ');
            }
        }
        out.push(c);
        prev = Some(c);
    }
    out
}

fn is_boundary(prev: char, next: char) -> bool {
    (prev.is_ascii_lowercase() && next.is_ascii_uppercase())
        || (prev.is_ascii_alphabetic() && next.is_ascii_digit())
        || (prev.is_ascii_digit() && next.is_ascii_alphabetic())
}

/// Split glued words inside individual tokens, applying the same splitter
/// to the pieces. Used for field values, which keep their camel case.
pub(crate) fn split_glued_tokens(text: &str) -> String {
    split_glued_tokens_with_words(text, &DEFAULT_WORDS)
}

pub(crate) fn split_glued_tokens_with_config(text: &str, config: &ParsingConfig) -> String {
    split_glued_tokens_with_words(text, &resolve_job_words(config))
}

fn split_glued_tokens_with_words(text: &str, words: &[String]) -> String {
    let mut out = Vec::new();
    for token in text.split_whitespace() {
        split_token(token, words, &mut out);
    }
    out.join(" ")
}

fn split_token(token: &str, words: &[String], out: &mut Vec<String>) {
    match split_once(token, words) {
        Some(pieces) => {
            for piece in pieces {
                split_token(&piece, words, out);
            }
        }
        None => out.push(token.to_string()),
    }
}

/// One splitting step. Pieces are non-empty and strictly shorter than `token`.
fn split_once(token: &str, words: &[String]) -> Option<Vec<String>> {
    if token.contains('@') {
        return None;
    }
    peel(token, words).or_else(|| unglue(token))
}

fn peel(token: &str, words: &[String]) -> Option<Vec<String>> {
    if token.len() < 8 || !token.bytes().all(|b| b.is_ascii_uppercase()) {
        return None;
    }
    let head = words
        .iter()
        .filter(|w| !w.is_empty() && w.len() < token.len() && token.starts_with(w.as_str()))
        .max_by_key(|w| w.len())?;
    let rest = &token[head.len()..];

    let chained = words
        .iter()
        .any(|w| !w.is_empty() && rest.starts_with(w.as_str()));
    let free = FREE_PEEL_WORDS.contains(&head.as_str()) && rest.len() >= 4;

    (chained || free).then(|| vec![head.clone(), rest.to_string()])
}

fn unglue(token: &str) -> Option<Vec<String>> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_alphabetic()) {
        return None;
    }
    let lower = token.to_ascii_lowercase();
    let cuts = glue_cuts(&lower)?;

    let mut pieces = Vec::with_capacity(cuts.len() + 1);
    let mut prev = 0;
    for cut in cuts {
        pieces.push(token[prev..cut].to_string());
        prev = cut;
    }
    pieces.push(token[prev..].to_string());
    Some(pieces)
}

fn glue_cuts(lower: &str) -> Option<Vec<usize>> {
    if let Some((_, cuts)) = GLUE_EXACT.iter().find(|(w, _)| *w == lower) {
        return Some(cuts.to_vec());
    }

    for (phrase, cuts) in GLUE_PREFIXES {
        if let Some(rest) = lower.strip_prefix(phrase) {
            if !rest.is_empty() && is_valid_piece(rest) {
                return Some(cuts.to_vec());
            }
        }
    }

    for (suffix, joint) in GLUE_SUFFIXES {
        if lower.len() < suffix.len() + 4 {
            continue;
        }
        if let Some(left) = lower.strip_suffix(suffix) {
            if is_valid_piece(left) {
                return Some(vec![left.len(), left.len() + joint]);
            }
        }
    }

    None
}

/// Letters only, at least one vowel, and no run of five consonants.
pub(crate) fn is_wordish(s: &str) -> bool {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_alphabetic()) {
        return false;
    }
    let lower = s.to_ascii_lowercase();
    if !lower.bytes().any(|b| b"aeiouy".contains(&b)) {
        return false;
    }
    let mut run = 0;
    for b in lower.bytes() {
        if b"aeiouy".contains(&b) {
            run = 0;
        } else {
            run += 1;
            if run >= 5 {
                return false;
            }
        }
    }
    true
}

/// Whether a split-off piece is plausible on its own.
pub(crate) fn is_valid_piece(piece: &str) -> bool {
    let lower = piece.to_ascii_lowercase();
    JOINERS.contains(&lower.as_str())
        || (lower.len() >= 4 && is_wordish(&lower))
        || (lower.len() == 3 && COMMON3.contains(&lower.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use resume_core::SourceKind;

    #[test]
    fn test_glued_city_and_state() {
        assert_eq!(normalize("SanDiego,California"), "San Diego , California");
    }

    #[test]
    fn test_peel_glued_job_title() {
        assert_eq!(
            normalize("TERRITORYMANAGEROREGON"),
            "TERRITORY MANAGER OREGON"
        );
        assert_eq!(normalize("KEYACCOUNTMANAGER"), "KEY ACCOUNT MANAGER");
    }

    #[test]
    fn test_peel_leaves_real_words() {
        assert_eq!(normalize("SALESFORCE"), "SALESFORCE");
        assert_eq!(normalize("ENGINEERING"), "ENGINEERING");
        assert_eq!(normalize("MANAGERS"), "MANAGERS");
    }

    #[test]
    fn test_glued_phrases() {
        assert_eq!(normalize("salesinthe"), "sales in the");
        assert_eq!(normalize("duetoa"), "due to a");
        assert_eq!(normalize("startanew"), "start a new");
        assert_eq!(normalize("Setthetone"), "Set the tone");
    }

    #[test]
    fn test_header_unchanged() {
        assert_eq!(normalize("PROFESSIONAL EXPERIENCE"), "PROFESSIONAL EXPERIENCE");
    }

    #[test]
    fn test_letter_spaced_text() {
        assert_eq!(normalize("J O H N   D O E"), "JOHN DOE");
        assert_eq!(normalize("E X P E R I E N C E"), "EXPERIENCE");
    }

    #[test]
    fn test_short_words_not_despaced() {
        assert_eq!(normalize("a big cat"), "a big cat");
    }

    #[test]
    fn test_email_token_untouched() {
        assert_eq!(normalize("jane.doe@example.com"), "jane.doe@example.com");
    }

    #[test]
    fn test_digit_boundaries() {
        assert_eq!(normalize("Q3revenue"), "Q 3 revenue");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "SanDiego,California",
            "TERRITORYMANAGEROREGON",
            "J O H N   D O E",
            "d u e t o  x y z",
            "a B c",
            "Grew salesinthe territory by 40%in5months",
            "ACME CORP: TERRITORY MANAGER: NEW YORK",
            "•  Won back a large account (Portland,OR)",
            "",
            "   ",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_only_whitespace_changes() {
        let inputs = [
            "SanDiego,California",
            "KEYACCOUNTMANAGER",
            "J O H N   D O E",
            "duetoa new(role)|team",
        ];
        for input in inputs {
            let strip = |s: &str| s.chars().filter(|c| !c.is_whitespace()).collect::<String>();
            assert_eq!(strip(&normalize(input)), strip(input));
        }
    }

    #[test]
    fn test_is_wordish() {
        assert!(is_wordish("sales"));
        assert!(!is_wordish("bcd"));
        assert!(!is_wordish("strngths"));
        assert!(!is_wordish("ab1"));
    }

    #[test]
    fn test_original_span_maps_back() {
        let line = Line::new("NEODENT: TERRITORYMANAGEROREGON:", "text:line:1", SourceKind::Text);
        let normalized = normalize_lines(std::slice::from_ref(&line));
        let nl = &normalized[0];
        assert_eq!(nl.search_text, "NEODENT : TERRITORY MANAGER OREGON :");

        let start = nl.search_text.find("TERRITORY").unwrap();
        let end = nl.search_text.find("OREGON").unwrap() + "OREGON".len();
        assert_eq!(nl.original_span(start..end), Some("TERRITORYMANAGEROREGON"));
        assert_eq!(nl.original_span(0..0), None);
    }

    #[test]
    fn test_custom_job_words() {
        let config = crate::config::ParsingConfigBuilder::new()
            .add_job_word("nurse".to_string())
            .build()
            .unwrap();
        assert_eq!(
            normalize_with_config("NURSEMANAGER", &config),
            "NURSE MANAGER"
        );
    }
}
