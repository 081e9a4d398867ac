//! Inline skills lines ("Skills: Salesforce, HubSpot, Excel").
//!
//! Bulleted skills sections are not read. Skills from separate lines are
//! kept as they are, duplicates included.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ParsingConfig;
use crate::normalize::NormalizedLine;

static SKILLS_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*(?:technical\s+)?skills\b\s*:?\s*").unwrap());

/// Skills read from one line.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillLine {
    pub skills: Vec<String>,
    pub line_index: usize,
}

/// Collect the skills of every inline skills line in the document.
pub fn extract_skills(lines: &[NormalizedLine<'_>]) -> Vec<SkillLine> {
    extract_skills_with_config(lines, &ParsingConfig::default())
}

pub(crate) fn extract_skills_with_config(
    lines: &[NormalizedLine<'_>],
    config: &ParsingConfig,
) -> Vec<SkillLine> {
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| is_skills_line_with_config(&line.search_text, config))
        .filter_map(|(line_index, line)| {
            // Prefer the original text so skill names keep their spelling
            let skills = parse_skills_line_with_config(&line.original.text, config)
                .or_else(|| parse_skills_line_with_config(&line.search_text, config))?;
            tracing::debug!(locator = %line.original.locator, count = skills.len(), "skills line");
            Some(SkillLine { skills, line_index })
        })
        .collect()
}

pub fn is_skills_line(text: &str) -> bool {
    is_skills_line_with_config(text, &ParsingConfig::default())
}

pub(crate) fn is_skills_line_with_config(text: &str, config: &ParsingConfig) -> bool {
    list_part(text, config).is_some()
}

/// Split an inline skills line into skills: comma separated, trimmed,
/// trailing periods dropped.
pub fn parse_skills_line(text: &str) -> Option<Vec<String>> {
    parse_skills_line_with_config(text, &ParsingConfig::default())
}

pub(crate) fn parse_skills_line_with_config(text: &str, config: &ParsingConfig) -> Option<Vec<String>> {
    let list = list_part(text, config)?;
    let skills: Vec<String> = list
        .split(',')
        .map(|s| s.trim().trim_end_matches('.').trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect();
    (!skills.is_empty()).then_some(skills)
}

/// The list after the "Skills:" lead-in. A bare "Skills" heading or a
/// phrase without a colon or comma is not a skills line.
fn list_part<'t>(text: &'t str, config: &ParsingConfig) -> Option<&'t str> {
    let re = config.skills_line_re.as_ref().unwrap_or(&SKILLS_LINE_RE);
    let m = re.find(text)?;
    let rest = text[m.end()..].trim();
    if rest.is_empty() {
        return None;
    }
    (m.as_str().contains(':') || rest.contains(',')).then_some(rest)
}
