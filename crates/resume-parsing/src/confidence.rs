//! Table-driven confidence scores and the overall quality tier.
//!
//! Every scorer maps a small extraction signal to a [`FieldConfidence`];
//! nothing here looks at document text.

use resume_core::{ConfidenceMap, FieldConfidence, ParseQuality, REQUIRED_FIELDS};

use crate::name::{NameCandidate, NameStrategy};
use crate::patterns::{self, MatchMethod};

/// Threshold under which a required field gets a clarification warning.
const WARN_BELOW: f64 = 0.8;

const HIGH_TIER: f64 = 0.85;
const MEDIUM_TIER: f64 = 0.65;

/// Minimum digits for a phone number to be trusted.
const MIN_PHONE_DIGITS: usize = 7;

const MAX_NAME_CHARS: usize = 60;

fn field(name: &str, confidence: f64, method: &str, reasons: Vec<String>) -> FieldConfidence {
    FieldConfidence {
        field_name: name.to_string(),
        confidence: confidence.clamp(0.0, 1.0),
        extraction_method: method.to_string(),
        reasons,
        required: REQUIRED_FIELDS.contains(&name),
    }
}

/// Confidence for a field with no accepted value.
pub fn not_found(name: &str) -> FieldConfidence {
    field(name, 0.0, "not_found", vec!["not_found".to_string()])
}

/// Score an email by validity and how many lines repeat it.
pub fn score_email(email: Option<&str>, occurrences: usize) -> FieldConfidence {
    let Some(email) = email else {
        return not_found("email");
    };
    if !patterns::is_valid_email(email) {
        return field(
            "email",
            0.4,
            "invalid_email_format",
            vec![format!("'{}' does not look like an address", email)],
        );
    }
    match occurrences {
        0 | 1 => field("email", 1.0, "regex_exact_single", vec!["found once".to_string()]),
        2..=3 => field(
            "email",
            0.85,
            "regex_exact_multiple_occurrences",
            vec![format!("found on {} lines", occurrences)],
        ),
        _ => field(
            "email",
            0.6,
            "too_many_email_candidates",
            vec![format!("found on {} lines", occurrences)],
        ),
    }
}

/// Score a phone number by digit count and repetition.
pub fn score_phone(phone: Option<&str>, occurrences: usize) -> FieldConfidence {
    let Some(phone) = phone else {
        return not_found("phone");
    };
    let digits = patterns::count_digits(phone);
    if digits < MIN_PHONE_DIGITS {
        return field(
            "phone",
            0.3,
            "too_few_digits",
            vec![format!("only {} digits", digits)],
        );
    }
    match occurrences {
        0 | 1 => field("phone", 1.0, "regex_exact_single", vec!["found once".to_string()]),
        2 => field(
            "phone",
            0.85,
            "regex_exact_multiple",
            vec!["found on 2 lines".to_string()],
        ),
        _ => field(
            "phone",
            0.6,
            "regex_exact_multiple",
            vec![format!("found on {} lines", occurrences)],
        ),
    }
}

/// Score a resolved name.
///
/// Shape problems (too long, digits, a single word) cap the score. Otherwise
/// the base score rises when the name sits right above the email and when
/// it is among the first lines of the document.
pub fn score_name(candidate: Option<&NameCandidate>, email_line: Option<usize>, window: usize) -> FieldConfidence {
    let Some(candidate) = candidate else {
        return not_found("full_name");
    };
    let value = candidate.value.as_str();

    if value.chars().count() > MAX_NAME_CHARS {
        return field("full_name", 0.2, "heuristic_window", vec!["too long for a name".to_string()]);
    }
    if value.chars().any(|c| c.is_ascii_digit()) {
        return field("full_name", 0.3, "heuristic_window", vec!["contains digits".to_string()]);
    }
    if !value.contains(' ') {
        return field("full_name", 0.2, "heuristic_window", vec!["single word".to_string()]);
    }

    let mut score: f64 = 0.5;
    let mut reasons = Vec::new();

    let near_email = email_line.is_some_and(|email| {
        candidate.line_index < email && email - candidate.line_index <= window
    });
    if near_email {
        score += 0.25;
        reasons.push("directly above the email".to_string());
    }
    let at_top = candidate.line_index < 3;
    if at_top {
        score += 0.25;
        reasons.push(format!("line {} of the document", candidate.line_index + 1));
    }
    if value.split_whitespace().count() >= 3 {
        score += 0.05;
        reasons.push("three or more words".to_string());
    }
    if candidate.strategy == NameStrategy::GluedHeader {
        score -= 0.15;
        reasons.push("split from a glued header".to_string());
    }

    let method = if near_email && at_top {
        "heuristic_multivariate"
    } else {
        "heuristic_window"
    };
    field("full_name", score.min(1.0), method, reasons)
}

/// Score a location by how it was matched.
pub fn score_location(location: Option<(&str, MatchMethod)>) -> FieldConfidence {
    let Some((value, method)) = location else {
        return not_found("location");
    };
    let (mut score, tag, mut reasons) = match method {
        MatchMethod::LocationScan => (0.95, "regex_pattern", vec!["city and region".to_string()]),
        _ => (0.75, "heuristic", vec!["whole line shaped like a place".to_string()]),
    };
    if !value.contains(',') {
        score -= 0.1;
        reasons.push("no comma".to_string());
    }
    field("location", score, tag, reasons)
}

pub fn score_links(count: usize) -> FieldConfidence {
    if count == 0 {
        return not_found("links");
    }
    field(
        "links",
        0.95,
        "regex_url_extraction",
        vec![format!("{} link(s)", count)],
    )
}

pub fn score_skills(count: usize) -> FieldConfidence {
    if count == 0 {
        return not_found("skills");
    }
    field(
        "skills",
        0.85,
        "section_extraction",
        vec![format!("{} skill(s) from inline lists", count)],
    )
}

pub fn score_experiences(count: usize) -> FieldConfidence {
    if count == 0 {
        return not_found("experiences");
    }
    field(
        "experiences",
        0.85,
        "multi_line_experience_parsing",
        vec![format!("{} entr(ies)", count)],
    )
}

/// `reclassified` marks entries moved over from the experience section.
pub fn score_education(count: usize, reclassified: bool) -> FieldConfidence {
    match (count, reclassified) {
        (0, _) => not_found("education"),
        (n, true) => field(
            "education",
            0.7,
            "reclassified_from_experience",
            vec![format!("{} entr(ies) moved from experience", n)],
        ),
        (n, false) => field(
            "education",
            0.85,
            "section_extraction",
            vec![format!("{} entr(ies)", n)],
        ),
    }
}

/// Tier from the three required-field confidences.
pub fn quality_tier(full_name: f64, email: f64, phone: f64) -> ParseQuality {
    let average = (full_name + email + phone) / 3.0;
    if average >= HIGH_TIER {
        ParseQuality::High
    } else if average >= MEDIUM_TIER {
        ParseQuality::Medium
    } else {
        ParseQuality::Low
    }
}

/// Tier from a full confidence map; missing required fields count as zero.
pub fn quality_from_scores(scores: &ConfidenceMap) -> ParseQuality {
    let get = |name: &str| scores.get(name).map_or(0.0, |c| c.confidence);
    quality_tier(get("full_name"), get("email"), get("phone"))
}

/// Clarification warnings for the email and the name, in that order.
pub fn clarification_warnings(scores: &ConfidenceMap) -> Vec<String> {
    let mut warnings = Vec::new();
    let checks = [
        ("email", "email", "Email"),
        ("full_name", "candidate name", "Name"),
    ];
    for (key, noun, label) in checks {
        let confidence = scores.get(key).map_or(0.0, |c| c.confidence);
        if confidence >= WARN_BELOW {
            continue;
        }
        if confidence == 0.0 {
            warnings.push(format!("Could not extract {}. User clarification needed.", noun));
        } else {
            warnings.push(format!("{} extraction has low confidence: {:.2}", label, confidence));
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(value: &str, line_index: usize, strategy: NameStrategy) -> NameCandidate {
        NameCandidate {
            value: value.to_string(),
            line_index,
            locator: format!("text:line:{}", line_index + 1),
            strategy,
        }
    }

    #[test]
    fn test_email_table() {
        assert_eq!(score_email(Some("jane@x.com"), 1).confidence, 1.0);
        assert_eq!(score_email(Some("jane@x.com"), 1).extraction_method, "regex_exact_single");
        assert_eq!(score_email(Some("jane@x.com"), 3).confidence, 0.85);
        assert_eq!(score_email(Some("jane@x.com"), 4).confidence, 0.6);
        assert_eq!(score_email(Some("jane@x"), 1).confidence, 0.4);
        let missing = score_email(None, 0);
        assert_eq!(missing.confidence, 0.0);
        assert_eq!(missing.reasons, vec!["not_found"]);
        assert!(missing.required);
    }

    #[test]
    fn test_phone_table() {
        assert_eq!(score_phone(Some("(555) 123-4567"), 1).confidence, 1.0);
        assert_eq!(score_phone(Some("(555) 123-4567"), 2).confidence, 0.85);
        assert_eq!(score_phone(Some("(555) 123-4567"), 5).confidence, 0.6);
        let short = score_phone(Some("12-34"), 1);
        assert_eq!(short.confidence, 0.3);
        assert_eq!(short.extraction_method, "too_few_digits");
    }

    #[test]
    fn test_name_scores() {
        let top = name("Jane Doe", 0, NameStrategy::EmailWindow);
        let scored = score_name(Some(&top), Some(2), 3);
        assert_eq!(scored.confidence, 1.0);
        assert_eq!(scored.extraction_method, "heuristic_multivariate");

        let low = name("Jane Doe", 8, NameStrategy::TopOfDocument);
        let scored = score_name(Some(&low), None, 3);
        assert_eq!(scored.confidence, 0.5);
        assert_eq!(scored.extraction_method, "heuristic_window");

        let glued = name("Jane Doe", 0, NameStrategy::GluedHeader);
        assert!((score_name(Some(&glued), None, 3).confidence - 0.6).abs() < 1e-9);

        assert_eq!(score_name(None, None, 3).extraction_method, "not_found");
        let single = name("Jane", 0, NameStrategy::TopOfDocument);
        assert_eq!(score_name(Some(&single), None, 3).confidence, 0.2);
    }

    #[test]
    fn test_location_scores() {
        assert_eq!(
            score_location(Some(("Portland, OR", MatchMethod::LocationScan))).confidence,
            0.95
        );
        assert_eq!(
            score_location(Some(("Portland, Oregon", MatchMethod::LocationLine))).extraction_method,
            "heuristic"
        );
        assert_eq!(score_location(None).confidence, 0.0);
    }

    #[test]
    fn test_collection_scores() {
        assert_eq!(score_links(2).confidence, 0.95);
        assert_eq!(score_skills(0).extraction_method, "not_found");
        assert_eq!(score_experiences(3).extraction_method, "multi_line_experience_parsing");
        assert_eq!(score_education(1, true).confidence, 0.7);
        assert_eq!(score_education(1, false).confidence, 0.85);
        assert!(!score_education(1, false).required);
    }

    #[test]
    fn test_quality_tiers() {
        assert_eq!(quality_tier(1.0, 1.0, 1.0), ParseQuality::High);
        assert_eq!(quality_tier(0.9, 0.9, 0.9), ParseQuality::High);
        assert_eq!(quality_tier(1.0, 1.0, 0.0), ParseQuality::Medium);
        assert_eq!(quality_tier(1.0, 0.0, 0.0), ParseQuality::Low);
    }

    #[test]
    fn test_tier_is_monotonic() {
        let steps = [0.0, 0.2, 0.3, 0.4, 0.5, 0.6, 0.75, 0.85, 0.95, 1.0];
        for &a in &steps {
            for &b in &steps {
                for pair in steps.windows(2) {
                    assert!(quality_tier(pair[0], a, b) <= quality_tier(pair[1], a, b));
                    assert!(quality_tier(a, pair[0], b) <= quality_tier(a, pair[1], b));
                    assert!(quality_tier(a, b, pair[0]) <= quality_tier(a, b, pair[1]));
                }
            }
        }
    }

    #[test]
    fn test_clarification_warnings() {
        let mut scores = ConfidenceMap::new();
        scores.insert("email".to_string(), score_email(Some("jane@x"), 1));
        scores.insert("full_name".to_string(), not_found("full_name"));
        assert_eq!(
            clarification_warnings(&scores),
            vec![
                "Email extraction has low confidence: 0.40",
                "Could not extract candidate name. User clarification needed.",
            ]
        );

        scores.insert("email".to_string(), score_email(Some("jane@x.com"), 1));
        let top = name("Jane Doe", 0, NameStrategy::EmailWindow);
        scores.insert("full_name".to_string(), score_name(Some(&top), Some(1), 3));
        assert!(clarification_warnings(&scores).is_empty());
    }
}
