//! Section header detection.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ParsingConfig;

/// Headers that open or close a resume section. Anything here ends the
/// experience section; the education ones also open the education section.
pub(crate) const DEFAULT_SECTION_HEADERS: &[&str] = &[
    "education",
    "education & training",
    "education and training",
    "academic background",
    "academic experience",
    "academics",
    "schooling",
    "skills",
    "technical skills",
    "soft skills",
    "core competencies",
    "competencies",
    "technical proficiencies",
    "areas of expertise",
    "summary",
    "professional summary",
    "objective",
    "profile",
    "projects",
    "certifications",
    "certificates",
    "licenses",
    "awards",
    "honors",
    "awards & honors",
    "publications",
    "volunteer",
    "volunteering",
    "volunteer experience",
    "leadership",
    "activities",
    "interests",
    "hobbies",
    "languages",
    "references",
    "additional information",
    "contact",
    "contact information",
];

static EXPERIENCE_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(?:(?:career|work|professional|relevant)\s+)?(?:experience|employment|history)(?:\s+history)?(?:\s+(?:&|and)\s+achievements)?\s*[:|\-–—_=*]*\s*$",
    )
    .unwrap()
});

static EDUCATION_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(?:education(?:\s+(?:&|and)\s+training)?|academic\s+(?:background|experience)|academics|schooling)\s*[:|\-–—_=*]*\s*$",
    )
    .unwrap()
});

/// Lowercase a header line, dropping trailing decoration and extra spaces.
pub(crate) fn header_key(text: &str) -> String {
    let trimmed = text
        .trim()
        .trim_end_matches([':', '|', '-', '–', '—', '_', '=', '*', ' '])
        .trim_start_matches(['|', '-', '–', '—', '_', '=', '*', ' ']);
    trimmed
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Whether a search-text line opens the experience section
/// ("EXPERIENCE", "Work History", "PROFESSIONAL EXPERIENCE:", ...).
pub fn is_experience_header(text: &str) -> bool {
    is_experience_header_with_config(text, &ParsingConfig::default())
}

pub(crate) fn is_experience_header_with_config(text: &str, config: &ParsingConfig) -> bool {
    let re = config
        .experience_header_re
        .as_ref()
        .unwrap_or(&EXPERIENCE_HEADER_RE);
    re.is_match(text)
}

pub fn is_education_header(text: &str) -> bool {
    is_education_header_with_config(text, &ParsingConfig::default())
}

pub(crate) fn is_education_header_with_config(text: &str, config: &ParsingConfig) -> bool {
    let re = config
        .education_header_re
        .as_ref()
        .unwrap_or(&EDUCATION_HEADER_RE);
    re.is_match(text)
}

/// Resolved list of section headers for one parse.
pub(crate) fn resolve_section_headers(config: &ParsingConfig) -> Vec<String> {
    let defaults: Vec<String> = DEFAULT_SECTION_HEADERS.iter().map(|h| h.to_string()).collect();
    config.section_headers.resolve(&defaults)
}

/// Whether a line is one of the known section headers.
pub(crate) fn is_known_header(text: &str, headers: &[String]) -> bool {
    let key = header_key(text);
    !key.is_empty() && headers.iter().any(|h| *h == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_experience_headers() {
        for header in [
            "EXPERIENCE",
            "Experience:",
            "PROFESSIONAL EXPERIENCE",
            "Work History",
            "CAREER EXPERIENCE",
            "EMPLOYMENT HISTORY",
            "Work Experience ———",
        ] {
            assert!(is_experience_header(header), "{header}");
        }
    }

    #[test]
    fn test_experience_header_rejects_prose() {
        assert!(!is_experience_header("Experienced sales leader with 10 years"));
        assert!(!is_experience_header("Volunteer Experience"));
        assert!(!is_experience_header("Experience with Salesforce and HubSpot"));
    }

    #[test]
    fn test_education_headers() {
        assert!(is_education_header("EDUCATION"));
        assert!(is_education_header("Education & Training:"));
        assert!(is_education_header("Academic Background"));
        assert!(!is_education_header("Education Coordinator"));
    }

    #[test]
    fn test_header_key() {
        assert_eq!(header_key("  TECHNICAL   SKILLS : "), "technical skills");
        assert_eq!(header_key("— Awards —"), "awards");
    }

    #[test]
    fn test_known_headers_with_config() {
        let config = crate::config::ParsingConfigBuilder::new()
            .add_section_header("Military Service".to_string())
            .build()
            .unwrap();
        let headers = resolve_section_headers(&config);
        assert!(is_known_header("SKILLS", &headers));
        assert!(is_known_header("Military Service:", &headers));
        assert!(!is_known_header("Skills: Python, Rust", &headers));
    }
}
