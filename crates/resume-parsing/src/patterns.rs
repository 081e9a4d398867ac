//! Pure per-line pattern extractors for contact fields, links, locations
//! and date ranges.
//!
//! Each extractor scans one string and never looks at neighbouring lines.
//! Emails and links are matched on original text; phones, locations and
//! date ranges are matched on search text (see [`crate::normalize`]).

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use resume_core::PRESENT;

use crate::config::ParsingConfig;
use crate::normalize;

/// How a [`PatternMatch`] was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMethod {
    Email,
    /// Email with stray spaces around `@` or `.`.
    SpacedEmail,
    Phone,
    LinkedIn,
    GitHub,
    Url,
    /// Right-to-left scan from the last comma.
    LocationScan,
    /// Whole line shaped like `City, Region`.
    LocationLine,
}

/// A value found in a line, with the byte range it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternMatch {
    pub value: String,
    /// Byte range in the scanned text.
    pub span: Range<usize>,
    pub method: MatchMethod,
}

/// A start/end date pair. `end` is [`PRESENT`] for ongoing ranges.
#[derive(Debug, Clone, PartialEq)]
pub struct DateRange {
    pub start: String,
    pub end: String,
    pub span: Range<usize>,
}

// ── Email ──

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());

static SPACED_EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"([A-Za-z0-9._%+-]+)\s*@\s*([A-Za-z0-9-]+(?:\s*\.\s*[A-Za-z0-9-]+)*)\s*\.\s*([A-Za-z]{2,})\b",
    )
    .unwrap()
});

static VALID_EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap());

/// Whether `value` is a well-formed email address.
pub fn is_valid_email(value: &str) -> bool {
    VALID_EMAIL_RE.is_match(value)
}

/// Extract the first email address from original line text.
///
/// Letter-spaced lines are collapsed first, so spans index the collapsed
/// view when that differs from `text`. A phone number glued in front of
/// the address ("(856)366-5713k.o.harbaugh@gmail.com") is cut off.
pub fn extract_email(text: &str) -> Option<PatternMatch> {
    let view = normalize::despace(text);
    strict_email(&view).or_else(|| spaced_email(&view))
}

fn strict_email(text: &str) -> Option<PatternMatch> {
    for m in EMAIL_RE.find_iter(text) {
        let mut start = m.start();
        let at = m.as_str().find('@')?;
        let user = &m.as_str()[..at];

        if user_looks_like_phone(user) {
            let trimmed =
                user.trim_start_matches(|c: char| c.is_ascii_digit() || "-.+()".contains(c));
            if !trimmed.starts_with(|c: char| c.is_ascii_alphabetic()) {
                continue;
            }
            start += user.len() - trimmed.len();
        }

        let end = start + trim_glued_tld(&text[start..m.end()]).len();
        return Some(PatternMatch {
            value: text[start..end].to_string(),
            span: start..end,
            method: MatchMethod::Email,
        });
    }
    None
}

fn spaced_email(text: &str) -> Option<PatternMatch> {
    for caps in SPACED_EMAIL_RE.captures_iter(text) {
        let whole = caps.get(0)?;
        let user = &caps[1];
        if user_looks_like_phone(user) {
            continue;
        }
        let domain: String = caps[2].split_whitespace().collect();
        let value = format!("{}@{}.{}", user, domain, &caps[3]);
        if is_valid_email(&value) {
            return Some(PatternMatch {
                value,
                span: whole.range(),
                method: MatchMethod::SpacedEmail,
            });
        }
    }
    None
}

fn user_looks_like_phone(user: &str) -> bool {
    let digits = user.chars().filter(|c| c.is_ascii_digit()).count();
    let leading_digits = user.chars().take_while(|c| c.is_ascii_digit()).count();
    user.contains('(')
        || user.contains(')')
        || user.starts_with('+')
        || (digits >= 7 && user.contains('-'))
        || leading_digits >= 7
}

/// Cut a top-level domain glued to the next word ("x.comPhone" -> "x.com").
fn trim_glued_tld(email: &str) -> &str {
    let Some(dot) = email.rfind('.') else {
        return email;
    };
    let tld = &email[dot + 1..];
    let bytes = tld.as_bytes();
    for i in 1..bytes.len() {
        if bytes[i - 1].is_ascii_lowercase() && bytes[i].is_ascii_uppercase() && i >= 2 {
            return &email[..dot + 1 + i];
        }
    }
    email
}

// ── Phone ──

static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+?\d{1,3}[-.\s]?)?\(?\s*\d{3}\s*\)?[-.\s]?\d{3}[-.\s]?\d{4}").unwrap()
});

/// Extract the first phone number from search text.
///
/// A match must carry 7 to 15 digits and must not be part of a longer
/// digit run.
pub fn extract_phone(text: &str) -> Option<PatternMatch> {
    extract_phone_with_config(text, &ParsingConfig::default())
}

pub(crate) fn extract_phone_with_config(text: &str, config: &ParsingConfig) -> Option<PatternMatch> {
    let re = config.phone_re.as_ref().unwrap_or(&PHONE_RE);
    for m in re.find_iter(text) {
        let digits = count_digits(m.as_str());
        if !(7..=15).contains(&digits) {
            continue;
        }
        let before = text[..m.start()].chars().next_back();
        let after = text[m.end()..].chars().next();
        if before.is_some_and(|c| c.is_ascii_digit()) || after.is_some_and(|c| c.is_ascii_digit()) {
            continue;
        }

        let trimmed = m.as_str().trim();
        let start = m.start() + (m.as_str().len() - m.as_str().trim_start().len());
        return Some(PatternMatch {
            value: trimmed.to_string(),
            span: start..start + trimmed.len(),
            method: MatchMethod::Phone,
        });
    }
    None
}

pub fn count_digits(s: &str) -> usize {
    s.chars().filter(|c| c.is_ascii_digit()).count()
}

// ── Links ──

static LINKEDIN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:https?://)?(?:www\.)?linkedin\.com/[^\s)>\]]+").unwrap()
});

static GITHUB_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:https?://)?(?:www\.)?github\.com/[A-Za-z0-9_.-]+").unwrap()
});

static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bhttps?://[^\s)>\]]+").unwrap());

/// Extract LinkedIn, GitHub and other URLs from original line text.
///
/// Repeated values within the line are reported once.
pub fn extract_links(text: &str) -> Vec<PatternMatch> {
    let mut found: Vec<PatternMatch> = Vec::new();
    let patterns: [(&Regex, MatchMethod); 3] = [
        (&*LINKEDIN_RE, MatchMethod::LinkedIn),
        (&*GITHUB_RE, MatchMethod::GitHub),
        (&*URL_RE, MatchMethod::Url),
    ];

    for (re, method) in patterns {
        for m in re.find_iter(text) {
            let value = m.as_str().trim_end_matches(['.', ',', ';', ':', '!', '?', '\'', '"']);
            if value.is_empty() || found.iter().any(|f| f.value == value) {
                continue;
            }
            found.push(PatternMatch {
                value: value.to_string(),
                span: m.start()..m.start() + value.len(),
                method,
            });
        }
    }
    found
}

// ── Location ──

const US_STATE_CODES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN", "IA",
    "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ",
    "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT",
    "VA", "WA", "WV", "WI", "WY", "DC",
];

const MULTI_WORD_STATES: &[&str] = &[
    "new york",
    "new mexico",
    "new hampshire",
    "new jersey",
    "north carolina",
    "north dakota",
    "south carolina",
    "south dakota",
    "west virginia",
    "rhode island",
    "puerto rico",
];

/// Words that mark a "City, Region" lookalike as something else.
const NOT_A_CITY: &[&str] = &[
    "study", "abroad", "institute", "program", "semester", "trimester", "year",
];

/// Post-nominals that look like a region after a comma ("Jane Doe, MBA").
const CREDENTIALS: &[&str] = &["PHD", "MBA", "MD", "CPA", "RN", "JR", "SR", "II", "III", "ESQ"];

const REGION_TRIM: &[char] = &[',', '.', ';', ':', '–', '-'];

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+").unwrap());
static CITY_WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z][a-z]*$").unwrap());
static REGION_WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z][a-z]+$").unwrap());
static LOCATION_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z .'-]+,\s*([A-Za-z]{2,})$").unwrap());
static SPACE_BEFORE_COMMA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+,").unwrap());
static AFTER_COMMA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r",\s*").unwrap());

/// Extract a `City, Region` location from search text.
///
/// Scans commas right to left first; the region after the comma must be a
/// US state code, a multi-word state name or a capitalized word of four or
/// more letters, and up to two capitalized words before the comma form the
/// city. Falls back to a whole-line `City, Region` shape.
pub fn extract_location(text: &str) -> Option<PatternMatch> {
    scan_commas(text).or_else(|| whole_line_location(text))
}

fn scan_commas(text: &str) -> Option<PatternMatch> {
    let commas: Vec<usize> = text.match_indices(',').map(|(i, _)| i).collect();

    for &comma in commas.iter().rev() {
        let tail = &text[comma + 1..];
        let after: Vec<regex::Match> = WORD_RE.find_iter(tail).take(2).collect();
        let Some(first) = after.first() else {
            continue;
        };

        let first_word = first.as_str().trim_matches(REGION_TRIM);
        let region_end = if let Some(second) = after.get(1) {
            let second_word = second.as_str().trim_end_matches(REGION_TRIM);
            let pair = format!("{} {}", first_word, second_word).to_lowercase();
            if MULTI_WORD_STATES.contains(&pair.as_str()) {
                Some(comma + 1 + second.start() + second_word.len())
            } else {
                None
            }
        } else {
            None
        };

        let region_end = region_end.or_else(|| {
            let is_code = first_word.len() == 2
                && first_word.bytes().all(|b| b.is_ascii_uppercase())
                && US_STATE_CODES.contains(&first_word);
            let is_name = first_word.len() >= 4 && REGION_WORD_RE.is_match(first_word);
            (is_code || is_name).then(|| {
                let lead = first.as_str().len() - first.as_str().trim_start_matches(REGION_TRIM).len();
                comma + 1 + first.start() + lead + first_word.len()
            })
        });
        let Some(region_end) = region_end else {
            continue;
        };

        let before: Vec<regex::Match> = WORD_RE.find_iter(&text[..comma]).collect();
        let city: Vec<&regex::Match> = before
            .iter()
            .rev()
            .take_while(|w| CITY_WORD_RE.is_match(w.as_str()))
            .take(2)
            .collect();
        let Some(city_start) = city.last().map(|w| w.start()) else {
            continue;
        };

        let city_text = text[city_start..comma].to_lowercase();
        if NOT_A_CITY.iter().any(|w| city_text.contains(w)) {
            continue;
        }

        return Some(PatternMatch {
            value: format_location(&text[city_start..region_end]),
            span: city_start..region_end,
            method: MatchMethod::LocationScan,
        });
    }
    None
}

fn whole_line_location(text: &str) -> Option<PatternMatch> {
    let trimmed = text.trim();
    let caps = LOCATION_LINE_RE.captures(trimmed)?;
    let region = caps[1].to_uppercase();
    if CREDENTIALS.contains(&region.as_str()) {
        return None;
    }
    let lower = trimmed.to_lowercase();
    if NOT_A_CITY.iter().any(|w| lower.contains(w)) {
        return None;
    }
    let start = text.len() - text.trim_start().len();
    Some(PatternMatch {
        value: format_location(trimmed),
        span: start..start + trimmed.len(),
        method: MatchMethod::LocationLine,
    })
}

/// Tidy a location: no space before commas, one after, single spaces.
pub fn format_location(text: &str) -> String {
    let s = SPACE_BEFORE_COMMA_RE.replace_all(text.trim(), ",");
    let s = AFTER_COMMA_RE.replace_all(&s, ", ");
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ── Date ranges ──

static DATE_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    let date = r"\d{1,2}[-/]?\d{1,2}[-/]?\d{2,4}|(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Sept|Oct|Nov|Dec|January|February|March|April|June|July|August|September|October|November|December)\.?\s*\d{4}|\d{4}";
    Regex::new(&format!(
        r"(?i)\b({date})\s*(?:-|–|—|to)\s*(present|current|{date})\b"
    ))
    .unwrap()
});

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").unwrap());

/// Extract a date range, reading the start and end from capture groups.
///
/// The original text is tried first so numeric dates keep their slashes;
/// search text catches ranges glued to neighbouring words.
pub fn extract_date_range(original: &str, search: &str) -> Option<DateRange> {
    extract_date_range_with_config(original, search, &ParsingConfig::default())
}

pub(crate) fn extract_date_range_with_config(
    original: &str,
    search: &str,
    config: &ParsingConfig,
) -> Option<DateRange> {
    let re = config.date_range_re.as_ref().unwrap_or(&DATE_RANGE_RE);
    [original, search].into_iter().find_map(|text| {
        let caps = re.captures(text)?;
        let whole = caps.get(0)?;
        let start = caps.get(1)?.as_str().trim().to_string();
        let end = caps.get(2)?.as_str().trim();
        let end = if end.eq_ignore_ascii_case("present") || end.eq_ignore_ascii_case("current") {
            PRESENT.to_string()
        } else {
            end.to_string()
        };
        Some(DateRange {
            start,
            end,
            span: whole.range(),
        })
    })
}

/// Whether a line holds a date range and nothing else but punctuation.
pub(crate) fn is_date_only(original: &str, search: &str, config: &ParsingConfig) -> bool {
    let re = config.date_range_re.as_ref().unwrap_or(&DATE_RANGE_RE);
    [original, search].into_iter().any(|text| {
        re.find(text).is_some_and(|m| {
            text[..m.start()]
                .chars()
                .chain(text[m.end()..].chars())
                .all(|c| c.is_whitespace() || "|,;:()[]-–—".contains(c))
        })
    })
}

/// A line that mentions a year next to a range marker but does not parse
/// as a date range.
pub(crate) fn looks_like_unparsed_dates(original: &str, search: &str, config: &ParsingConfig) -> bool {
    if !YEAR_RE.is_match(original) {
        return false;
    }
    let lower = original.to_lowercase();
    let has_marker = original.contains(['-', '–', '—'])
        || lower.contains(" to ")
        || lower.contains("present")
        || lower.contains("current");
    has_marker && extract_date_range_with_config(original, search, config).is_none()
}
