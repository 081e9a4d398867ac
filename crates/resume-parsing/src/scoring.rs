//! Scoring functions for achievement repair strategy selection.
//!
//! Achievement text extracted from PDFs is damaged in different ways, so
//! several repair strategies are run and each result is scored on how much
//! it reads like normal prose. The highest score wins.

use once_cell::sync::Lazy;
use regex::Regex;

/// The kind of damage seen in a piece of achievement text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corruption {
    /// Words broken into short spaced fragments ("ne wc us to me rs").
    CharacterFragmentation,
    /// Words run together ("Transferredto San Diegoin").
    CompletelyGlued,
    /// Doubled spaces next to stray single letters.
    MixedCorruption,
    MostlyOk,
}

/// Weights for the text quality score.
///
/// - `single_letter`: penalty per single-letter word
/// - `short_word`: penalty per one- or two-letter word that is not a joiner
/// - `good_length` / `fair_length` / `bad_length`: bonus or penalty for the
///   average word length (5-10, 3-12, anything else)
/// - `crowded`: penalty when more than a quarter of the text is spaces
/// - `achievement_word`: bonus per recognised achievement verb or noun
/// - `shrunk`: penalty when the result lost more than 30% of its length
/// - `faithful`: bonus when the length changed by less than 10%
#[derive(Debug, Clone, PartialEq)]
pub struct QualityWeights {
    pub single_letter: f64,
    pub short_word: f64,
    pub good_length: f64,
    pub fair_length: f64,
    pub bad_length: f64,
    pub crowded: f64,
    pub achievement_word: f64,
    pub shrunk: f64,
    pub faithful: f64,
}

impl Default for QualityWeights {
    fn default() -> Self {
        Self {
            single_letter: 15.0,
            short_word: 3.0,
            good_length: 15.0,
            fair_length: 5.0,
            bad_length: 10.0,
            crowded: 20.0,
            achievement_word: 8.0,
            shrunk: 25.0,
            faithful: 10.0,
        }
    }
}

const ALLOWED_SHORT: &[&str] = &["a", "to", "in", "at", "by", "of"];

const ACHIEVEMENT_WORDS: &[&str] = &[
    "acquired",
    "grew",
    "led",
    "built",
    "improved",
    "increased",
    "achieved",
    "won",
    "developed",
    "created",
    "managed",
    "exceeded",
    "delivered",
    "customers",
    "revenue",
    "sales",
    "growth",
    "team",
    "business",
];

static GLUED_CASE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z]{2,}[A-Z]").unwrap());

/// Classify the damage in a piece of text. Expects the raw text, before
/// whitespace is collapsed.
pub fn detect_corruption(text: &str) -> Corruption {
    let text = text.trim();
    if text.chars().count() < 5 {
        return Corruption::MostlyOk;
    }
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Corruption::MostlyOk;
    }

    let len = text.chars().count() as f64;
    let space_ratio = text.chars().filter(|c| *c == ' ').count() as f64 / len;
    let avg_word_len = average_len(&words);

    if space_ratio > 0.2 && avg_word_len < 3.5 {
        return Corruption::CharacterFragmentation;
    }
    if (words.len() < 5 && len > 25.0) || GLUED_CASE_RE.is_match(text) {
        return Corruption::CompletelyGlued;
    }
    if text.contains("  ") && words.iter().any(|w| w.chars().count() < 2) {
        return Corruption::MixedCorruption;
    }

    let has_long_lowercase_word = words.iter().any(|w| {
        w.chars().count() > 10 && !w.chars().skip(1).any(|c| c.is_uppercase())
    });
    if has_long_lowercase_word && words.len() < 6 {
        return Corruption::CompletelyGlued;
    }

    Corruption::MostlyOk
}

/// Score how much `repaired` reads like normal prose, relative to `original`.
///
/// Never negative; an empty result scores zero.
pub fn score_text_quality(original: &str, repaired: &str, weights: &QualityWeights) -> f64 {
    let words: Vec<&str> = repaired.split_whitespace().collect();
    if words.is_empty() {
        return 0.0;
    }
    let mut score = 100.0;

    // 1. Over-segmentation: stray letters and tiny fragments
    let single_letters = words
        .iter()
        .filter(|w| w.chars().count() == 1 && w.chars().all(char::is_alphabetic))
        .count();
    score -= single_letters as f64 * weights.single_letter;

    let short_words = words
        .iter()
        .filter(|w| w.chars().count() <= 2 && !ALLOWED_SHORT.contains(&w.to_lowercase().as_str()))
        .count();
    score -= short_words as f64 * weights.short_word;

    // 2. Average word length
    let avg = average_len(&words);
    if (5.0..=10.0).contains(&avg) {
        score += weights.good_length;
    } else if (3.0..=12.0).contains(&avg) {
        score += weights.fair_length;
    } else {
        score -= weights.bad_length;
    }

    // 3. Space density
    let repaired_len = repaired.chars().count() as f64;
    let spaces = repaired.chars().filter(|c| *c == ' ').count() as f64;
    if spaces / repaired_len > 0.25 {
        score -= weights.crowded;
    }

    // 4. Recognised achievement vocabulary
    let vocabulary = words
        .iter()
        .filter(|w| ACHIEVEMENT_WORDS.contains(&w.to_lowercase().as_str()))
        .count();
    score += vocabulary as f64 * weights.achievement_word;

    // 5. Length fidelity
    let original_len = original.chars().count() as f64;
    if repaired_len < original_len * 0.7 {
        score -= weights.shrunk;
    }
    if (repaired_len - original_len).abs() < original_len * 0.1 {
        score += weights.faithful;
    }

    score.max(0.0)
}

fn average_len(words: &[&str]) -> f64 {
    if words.is_empty() {
        return 0.0;
    }
    words.iter().map(|w| w.chars().count()).sum::<usize>() as f64 / words.len() as f64
}

/// A scored repair result.
#[derive(Debug, Clone, PartialEq)]
pub struct RepairCandidate<S> {
    pub strategy: S,
    pub text: String,
    pub score: f64,
}

/// Pick the highest-scoring candidate. Ties go to the earlier candidate.
pub fn select_best_repair<S>(candidates: Vec<RepairCandidate<S>>) -> Option<RepairCandidate<S>> {
    candidates.into_iter().fold(None, |best, candidate| match best {
        Some(b) if b.score >= candidate.score => Some(b),
        _ => Some(candidate),
    })
}
