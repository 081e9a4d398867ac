//! Spacing repair for achievement bullets and structured fields.
//!
//! Repairs only ever insert or remove whitespace; the non-whitespace
//! characters of the input survive unchanged and in order.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ParsingConfig;
use crate::normalize::{self, is_valid_piece, is_wordish};
use crate::scoring::{
    detect_corruption, score_text_quality, select_best_repair, Corruption, RepairCandidate,
};

/// Repair strategies tried on achievement text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairStrategy {
    /// Token-level fixes only.
    Conservative,
    /// Rejoin short spaced fragments first.
    Fragments,
    /// Split well-known words out of glued runs first.
    Glued,
}

impl RepairStrategy {
    fn for_corruption(corruption: Corruption) -> &'static [RepairStrategy] {
        match corruption {
            Corruption::CharacterFragmentation => {
                &[RepairStrategy::Fragments, RepairStrategy::Conservative]
            }
            Corruption::CompletelyGlued => &[RepairStrategy::Glued, RepairStrategy::Conservative],
            Corruption::MixedCorruption => &[
                RepairStrategy::Fragments,
                RepairStrategy::Glued,
                RepairStrategy::Conservative,
            ],
            Corruption::MostlyOk => &[RepairStrategy::Conservative],
        }
    }

    fn apply(self, text: &str) -> String {
        match self {
            RepairStrategy::Conservative => repair_tokens(text),
            RepairStrategy::Fragments => repair_tokens(&collapse_fragments(text)),
            RepairStrategy::Glued => repair_tokens(&split_embedded_words(text)),
        }
    }
}

/// Exact glued tokens seen in achievement bullets, with their spacing.
const EXACT_TOKEN_FIXES: &[(&str, &str)] = &[
    ("selectedas", "selected as"),
    ("focusin", "focus in"),
    ("growthin", "growth in"),
    ("greeninall", "green in all"),
    ("expansionand", "expansion and"),
    ("over-executedonboth", "over-executed on both"),
    ("maintainingapositive", "maintaining a positive"),
    ("apositive", "a positive"),
    ("foranoverall", "for an overall"),
    ("personofthe", "person of the"),
    ("girlsofthe", "girls of the"),
    ("toolstobe", "tools to be"),
];

const MERGE_PAIRS: &[&str] = &["newspaper", "expansion", "bulletin"];

const MERGE_TRIPLE_PREFIXES: &[&str] = &[
    "maintaining",
    "increasing",
    "developing",
    "implementing",
    "managing",
];

/// Word endings that mark the right side of a split word ("communic a tions").
const SPLIT_WORD_ENDINGS: &[&str] = &[
    "tion", "sion", "ment", "ness", "ing", "ity", "ous", "ive", "ance", "ence", "ally", "ated",
];

const EMBEDDED_JOINERS: &[&str] = &["the", "and", "for", "to", "in", "of"];
const SHORT_JOINERS: &[&str] = &["to", "in", "of", "an", "a"];

const A_LEFT: &[&str] = &["back", "won", "grew", "built", "led", "sold", "took"];
const A_RIGHT: &[&str] = &[
    "new", "large", "positive", "can", "role", "territory", "team", "month", "year",
];

/// Resume vocabulary that counts as evidence a split is real.
const GLUE_EVIDENCE: &[&str] = &[
    "back", "large", "new", "role", "team", "month", "year", "account", "territory", "sales",
    "growth", "customers", "business", "country", "attend", "symposium", "conference", "leader",
    "expand", "market", "client", "revenue", "product", "service",
];

/// Long words that are split out of glued runs when letters surround them.
const EMBEDDED_WORDS: &[&str] = &[
    "customers", "business", "achieved", "acquired", "months", "leading", "through", "years",
    "growth",
];

const CAMEL_LEFT_JOINERS: &[&str] = &["in", "to", "of", "and", "for"];

static FRAGMENT_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[a-zA-Z]{1,2}(?:\s+[a-zA-Z]{1,2}){2,}\b").unwrap());

static QUARTER_DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,2}[,.\-]*$").unwrap());

/// Repair the spacing of an achievement bullet with the default settings.
pub fn repair_achievement(text: &str) -> String {
    repair_achievement_with_config(text, &ParsingConfig::default())
}

pub(crate) fn repair_achievement_with_config(text: &str, config: &ParsingConfig) -> String {
    let corruption = detect_corruption(text);
    let text = collapse_whitespace(text);
    if !config.repair_achievements || text.chars().count() < 5 {
        return text;
    }

    let weights = config.quality_weights();
    let candidates: Vec<RepairCandidate<RepairStrategy>> = RepairStrategy::for_corruption(corruption)
        .iter()
        .map(|&strategy| {
            let repaired = strategy.apply(&text);
            let score = score_text_quality(&text, &repaired, &weights);
            RepairCandidate {
                strategy,
                text: repaired,
                score,
            }
        })
        .collect();

    match select_best_repair(candidates) {
        Some(best) => {
            if best.text != text {
                tracing::trace!(strategy = ?best.strategy, score = best.score, "repaired achievement");
            }
            best.text
        }
        None => text,
    }
}

/// Minimal repair for company, title and location values: rejoins the
/// "communicati on" family and nothing else.
pub fn repair_field_text(text: &str) -> String {
    let tokens: Vec<String> = text.split_whitespace().map(str::to_string).collect();
    let is_alpha = |s: &str| !s.is_empty() && s.chars().all(char::is_alphabetic);

    let mut merged: Vec<String> = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        if let Some(next) = tokens.get(i + 1) {
            let combo = format!("{}{}", tokens[i], next);
            let lower = combo.to_lowercase();
            if is_alpha(&tokens[i])
                && is_alpha(next)
                && (lower == "communication" || lower == "communications")
            {
                merged.push(combo);
                i += 2;
                continue;
            }
        }
        merged.push(tokens[i].clone());
        i += 1;
    }

    let mut out: Vec<String> = Vec::with_capacity(merged.len());
    let mut i = 0;
    while i < merged.len() {
        if i + 2 < merged.len() {
            let (a, b, c) = (&merged[i], &merged[i + 1], &merged[i + 2]);
            let combo = format!("{a}{b}{c}");
            if is_alpha(a)
                && is_alpha(c)
                && b.chars().count() == 1
                && is_alpha(b)
                && combo.to_lowercase() == "communications"
            {
                out.push(combo);
                i += 3;
                continue;
            }
        }
        out.push(merged[i].clone());
        i += 1;
    }
    out.join(" ")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Token pipeline: list-level merges, then per-token splits.
fn repair_tokens(text: &str) -> String {
    let tokens: Vec<String> = text.split_whitespace().map(str::to_string).collect();
    let tokens = merge_pairs(tokens);
    let tokens = merge_triples(tokens);
    let tokens = merge_split_words(tokens);
    let tokens = merge_quarters(tokens);

    tokens
        .iter()
        .map(|t| repair_token(t))
        .collect::<Vec<_>>()
        .join(" ")
}

fn repair_token(token: &str) -> String {
    if token.contains('@') {
        return token.to_string();
    }

    let mut norm = exact_fix(token).unwrap_or_else(|| token.to_string());
    norm = normalize::split_glued_tokens(&norm);

    if norm == token {
        if let Some(split) = split_embedded_joiner(token).or_else(|| split_embedded_a(token)) {
            norm = split;
        }
    }

    let camel: Vec<String> = norm.split_whitespace().map(split_camel_joiner).collect();
    normalize::split_glued_tokens(&camel.join(" "))
}

fn exact_fix(token: &str) -> Option<String> {
    let lower = token.to_lowercase();
    let (_, fixed) = EXACT_TOKEN_FIXES.iter().find(|(glued, _)| *glued == lower)?;
    Some(respace_like(token, fixed))
}

/// Insert spaces into `token` where `pattern` has them. `pattern` without
/// spaces must equal `token` ignoring case.
fn respace_like(token: &str, pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = token.chars();
    for p in pattern.chars() {
        if p == ' ' {
            out.push(' ');
        } else if let Some(c) = chars.next() {
            out.push(c);
        }
    }
    out.extend(chars);
    out
}

/// "New spaper" -> "Newspaper".
fn merge_pairs(tokens: Vec<String>) -> Vec<String> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        if let Some(next) = tokens.get(i + 1) {
            let combo = format!("{}{}", tokens[i], next);
            if MERGE_PAIRS.contains(&combo.to_lowercase().as_str()) {
                out.push(combo);
                i += 2;
                continue;
            }
        }
        out.push(tokens[i].clone());
        i += 1;
    }
    out
}

/// "mainta in ing" -> "maintaining". The word must reach into the third
/// token, so "managing a team" is left alone.
fn merge_triples(tokens: Vec<String>) -> Vec<String> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        if i + 2 < tokens.len() {
            let (a, b, c) = (&tokens[i], &tokens[i + 1], &tokens[i + 2]);
            let middle_ok = b.len() <= 2
                && b.chars().any(char::is_lowercase)
                && !b.chars().any(char::is_uppercase);
            let combo = format!("{a}{b}{c}");
            if middle_ok && combo.is_ascii() {
                let lower = combo.to_ascii_lowercase();
                let word = MERGE_TRIPLE_PREFIXES
                    .iter()
                    .find(|w| lower.starts_with(*w) && a.len() + b.len() < w.len());
                if let Some(word) = word {
                    out.push(combo[..word.len()].to_string());
                    if combo.len() > word.len() {
                        out.push(combo[word.len()..].to_string());
                    }
                    i += 3;
                    continue;
                }
            }
        }
        out.push(tokens[i].clone());
        i += 1;
    }
    out
}

/// "communic a tions" -> "communications".
fn merge_split_words(tokens: Vec<String>) -> Vec<String> {
    let alpha = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic());
    let mut out = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        if i + 2 < tokens.len() {
            let (a, b, c) = (&tokens[i], &tokens[i + 1], &tokens[i + 2]);
            if alpha(a) && alpha(b) && alpha(c) && b.len() == 1 && a.len() >= 4 && c.len() >= 3 {
                let combo = format!("{a}{b}{c}");
                let c_lower = c.to_ascii_lowercase();
                let ending_ok = SPLIT_WORD_ENDINGS.iter().any(|e| c_lower.starts_with(e));
                if combo.len() >= 8 && is_wordish(&combo) && ending_ok {
                    out.push(combo);
                    i += 3;
                    continue;
                }
            }
        }
        out.push(tokens[i].clone());
        i += 1;
    }
    out
}

/// "Q 3" -> "Q3".
fn merge_quarters(tokens: Vec<String>) -> Vec<String> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        if let Some(next) = tokens.get(i + 1) {
            if tokens[i].eq_ignore_ascii_case("q") && QUARTER_DIGITS_RE.is_match(next) {
                out.push(format!("{}{}", tokens[i], next));
                i += 2;
                continue;
            }
        }
        out.push(tokens[i].clone());
        i += 1;
    }
    out
}

/// Split on a joiner inside a long glued token ("territorytoover").
fn split_embedded_joiner(token: &str) -> Option<String> {
    let lower = token.to_ascii_lowercase();
    if lower.len() < 13 || !lower.bytes().all(|b| b.is_ascii_alphabetic()) {
        return None;
    }

    let mut best: Option<(usize, String)> = None;
    for joiner in EMBEDDED_JOINERS {
        for i in 5..lower.len() - 5 {
            if !lower[i..].starts_with(joiner) {
                continue;
            }
            let end = i + joiner.len();
            let (left, right) = (&lower[..i], &lower[end..]);

            // Both sides long means a real word that happens to contain the joiner.
            if SHORT_JOINERS.contains(joiner) && left.len() >= 7 && right.len() >= 7 {
                continue;
            }
            if !(is_valid_piece(left) && is_valid_piece(right)) {
                continue;
            }
            if best.as_ref().is_none_or(|(score, _)| i > *score) {
                best = Some((
                    i,
                    format!("{} {} {}", &token[..i], &token[i..end], &token[end..]),
                ));
            }
        }
    }
    best.map(|(_, split)| split)
}

/// Split on an embedded article ("backalarge" -> "back a large").
fn split_embedded_a(token: &str) -> Option<String> {
    let lower = token.to_ascii_lowercase();
    if lower.len() < 8 || !lower.bytes().all(|b| b.is_ascii_alphabetic()) {
        return None;
    }

    for i in (4..=lower.len() - 4).rev() {
        if lower.as_bytes()[i] != b'a' {
            continue;
        }
        let (left, right) = (&lower[..i], &lower[i + 1..]);

        if ["to", "of", "in", "by", "for"].iter().any(|j| left.ends_with(j)) {
            continue;
        }
        if !(is_strong_word(left) || A_LEFT.contains(&left)) {
            continue;
        }
        let starts_with_vowel = right.starts_with(['a', 'e', 'i', 'o', 'u', 'y']);
        let right_ok = is_strong_word(right)
            || A_RIGHT.contains(&right)
            || (right.len() >= 4 && starts_with_vowel && is_wordish(right));
        if !right_ok {
            continue;
        }
        let evidence = GLUE_EVIDENCE.contains(&left)
            || GLUE_EVIDENCE.contains(&right)
            || A_LEFT.contains(&left)
            || A_RIGHT.contains(&right);
        if !evidence {
            continue;
        }
        if right.len() < 5 && !starts_with_vowel && !GLUE_EVIDENCE.contains(&right) {
            continue;
        }
        return Some(format!("{} {} {}", &token[..i], &token[i..i + 1], &token[i + 1..]));
    }
    None
}

/// Five or more letters with at least two vowels.
fn is_strong_word(s: &str) -> bool {
    s.len() >= 5
        && is_wordish(s)
        && s.bytes().filter(|b| b"aeiouy".contains(b)).count() >= 2
}

/// Split at a lower-to-upper boundary when the left side ends with a
/// joiner or is a long word ("SymposiuminMiami" -> "Symposiumin Miami").
fn split_camel_joiner(token: &str) -> String {
    let bytes = token.as_bytes();
    let Some(i) = (1..bytes.len())
        .find(|&i| bytes[i - 1].is_ascii_lowercase() && bytes[i].is_ascii_uppercase())
    else {
        return token.to_string();
    };
    let left = &token[..i];
    let lower = left.to_ascii_lowercase();
    if CAMEL_LEFT_JOINERS.iter().any(|j| lower.ends_with(j)) || (left.len() >= 7 && is_wordish(left)) {
        format!("{} {}", left, &token[i..])
    } else {
        token.to_string()
    }
}

/// Rejoin runs of one- and two-letter fragments ("cu st om er s").
fn collapse_fragments(text: &str) -> String {
    FRAGMENT_RUN_RE
        .replace_all(text, |caps: &regex::Captures| {
            caps[0].split_whitespace().collect::<String>()
        })
        .into_owned()
}

/// Split well-known long words out of glued lowercase runs.
fn split_embedded_words(text: &str) -> String {
    let mut out = Vec::new();
    for token in text.split_whitespace() {
        split_embedded_word(token, &mut out);
    }
    out.join(" ")
}

fn split_embedded_word(token: &str, out: &mut Vec<String>) {
    if token.is_ascii() {
        let lower = token.to_ascii_lowercase();
        for word in EMBEDDED_WORDS {
            let Some(i) = lower.find(word) else {
                continue;
            };
            let end = i + word.len();
            let (left, right) = (&lower[..i], &lower[end..]);
            let letters = |s: &str| s.bytes().all(|b| b.is_ascii_alphabetic());
            if left.is_empty() || right.is_empty() || !letters(left) || !letters(right) {
                continue;
            }
            if !(is_valid_piece(left) && is_valid_piece(right)) {
                continue;
            }
            split_embedded_word(&token[..i], out);
            out.push(token[i..end].to_string());
            split_embedded_word(&token[end..], out);
            return;
        }
    }
    out.push(token.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    #[test]
    fn test_exact_fix_keeps_case() {
        assert_eq!(repair_achievement("Selectedas top performer"), "Selected as top performer");
    }

    #[test]
    fn test_merge_pairs_and_triples() {
        assert_eq!(
            repair_tokens("Featured in the New spaper for mainta in ing growth"),
            "Featured in the Newspaper for maintaining growth"
        );
        assert_eq!(repair_tokens("managing a team"), "managing a team");
    }

    #[test]
    fn test_merge_split_word() {
        assert_eq!(repair_tokens("Improved communic a tions"), "Improved communications");
        assert_eq!(repair_tokens("Built a team"), "Built a team");
    }

    #[test]
    fn test_merge_quarters() {
        assert_eq!(repair_tokens("Top rep in Q 3, 2021"), "Top rep in Q3, 2021");
    }

    #[test]
    fn test_embedded_joiner() {
        assert_eq!(split_embedded_joiner("territorytoover").as_deref(), Some("territory to over"));
        assert_eq!(split_embedded_joiner("territory"), None);
    }

    #[test]
    fn test_embedded_article() {
        assert_eq!(split_embedded_a("backalarge").as_deref(), Some("back a large"));
        assert_eq!(split_embedded_a("databases"), None);
    }

    #[test]
    fn test_camel_joiner() {
        assert_eq!(split_camel_joiner("growthinQ"), "growthin Q");
        assert_eq!(split_camel_joiner("LinkedIn"), "LinkedIn");
    }

    #[test]
    fn test_glued_phrases_in_bullets() {
        assert_eq!(
            repair_achievement("Won backalarge account duetoa new plan"),
            "Won back a large account due to a new plan"
        );
    }

    #[test]
    fn test_collapse_fragments() {
        assert_eq!(collapse_fragments("won ne wc us to me rs today"), "won newcustomers today");
    }

    #[test]
    fn test_split_embedded_words() {
        assert_eq!(split_embedded_words("newcustomersin"), "new customers in");
    }

    #[test]
    fn test_repair_only_changes_whitespace() {
        let inputs = [
            "Won backalarge account duetoa new plan",
            "ne wc us to me rs in th e ar ea",
            "Grewtheterritorytoover 40% in 5 months",
            "Selectedas top performer in Q 3",
            "Featured in the New spaper",
        ];
        for input in inputs {
            assert_eq!(strip(&repair_achievement(input)), strip(input), "{input}");
        }
    }

    #[test]
    fn test_repair_disabled_only_collapses_whitespace() {
        let config = crate::config::ParsingConfigBuilder::new()
            .repair_achievements(false)
            .build()
            .unwrap();
        assert_eq!(
            repair_achievement_with_config("  Won   backalarge account ", &config),
            "Won backalarge account"
        );
    }

    #[test]
    fn test_repair_field_text() {
        assert_eq!(repair_field_text("Corporate Communicati on"), "Corporate Communication");
        assert_eq!(repair_field_text("communic a tions lead"), "communications lead");
        assert_eq!(repair_field_text("Sales  Manager"), "Sales Manager");
    }
}
