use std::time::Duration;

use regex::Regex;
use resume_core::config_file::ParsingSection;

use crate::scoring::QualityWeights;

/// Controls how a built-in word or header list is overridden.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ListOverride<T> {
    /// Use the built-in defaults.
    #[default]
    Default,
    /// Completely replace the defaults with these values.
    Replace(Vec<T>),
    /// Append these values to the defaults.
    Extend(Vec<T>),
}

impl<T: Clone> ListOverride<T> {
    /// Resolve this override against the given defaults.
    pub fn resolve(&self, defaults: &[T]) -> Vec<T> {
        match self {
            ListOverride::Default => defaults.to_vec(),
            ListOverride::Replace(v) => v.clone(),
            ListOverride::Extend(v) => {
                let mut result = defaults.to_vec();
                result.extend(v.iter().cloned());
                result
            }
        }
    }

    fn push(&mut self, value: T) {
        match self {
            ListOverride::Extend(v) => v.push(value),
            _ => *self = ListOverride::Extend(vec![value]),
        }
    }
}

/// Configuration for the resume parsing pipeline.
///
/// Regex fields are `Option<Regex>`; `None` selects the built-in pattern.
/// Use [`ParsingConfigBuilder`] to construct with string patterns.
#[derive(Debug, Clone)]
pub struct ParsingConfig {
    // ── normalize.rs ──
    /// Job-title words an all-caps glued token may be peeled into.
    pub(crate) job_words: ListOverride<String>,

    // ── patterns.rs ──
    /// Phone pattern run over search text.
    pub(crate) phone_re: Option<Regex>,
    /// Date-range pattern; must expose the start and end as groups 1 and 2.
    pub(crate) date_range_re: Option<Regex>,

    // ── section.rs ──
    /// Experience section header.
    pub(crate) experience_header_re: Option<Regex>,
    /// Education section header.
    pub(crate) education_header_re: Option<Regex>,
    /// Headers (lowercase) that close the experience or education section.
    pub(crate) section_headers: ListOverride<String>,

    // ── name.rs ──
    /// Lines (lowercase) that can never be a candidate name.
    pub(crate) header_blacklist: ListOverride<String>,
    /// Lines scanned above the email line (default: 3).
    pub(crate) name_window: usize,
    /// Lines scanned from the top as a fallback (default: 10).
    pub(crate) top_scan_lines: usize,

    // ── extractor.rs ──
    /// Lines scanned from the top for the candidate location (default: 15).
    pub(crate) location_scan_lines: usize,

    // ── experience.rs ──
    /// Shortest unmarked prose line kept as an achievement (default: 10).
    pub(crate) min_achievement_len: usize,
    /// Longest unmarked prose line kept as an achievement (default: 500).
    pub(crate) max_achievement_len: usize,
    /// Fuzzy ratio at which two company strings are the same company (default: 0.85).
    pub(crate) company_match_threshold: f64,

    // ── skills.rs ──
    /// Inline skills line; the list follows the match.
    pub(crate) skills_line_re: Option<Regex>,

    // ── repair.rs / scoring.rs ──
    /// Re-space glued achievement text (default: true).
    pub(crate) repair_achievements: bool,
    /// Weights for picking the best achievement repair.
    pub(crate) quality_weights: Option<QualityWeights>,

    // ── lib.rs / pipeline ──
    /// Wall-clock budget checked between passes (default: none).
    pub(crate) time_budget: Option<Duration>,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            job_words: ListOverride::Default,
            phone_re: None,
            date_range_re: None,
            experience_header_re: None,
            education_header_re: None,
            section_headers: ListOverride::Default,
            header_blacklist: ListOverride::Default,
            name_window: 3,
            top_scan_lines: 10,
            location_scan_lines: 15,
            min_achievement_len: 10,
            max_achievement_len: 500,
            company_match_threshold: 0.85,
            skills_line_re: None,
            repair_achievements: true,
            quality_weights: None,
            time_budget: None,
        }
    }
}

impl ParsingConfig {
    /// Get the quality weights, using defaults if not configured.
    pub(crate) fn quality_weights(&self) -> QualityWeights {
        self.quality_weights.clone().unwrap_or_default()
    }

    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget
    }

    pub fn repair_achievements(&self) -> bool {
        self.repair_achievements
    }
}

/// Builder for [`ParsingConfig`].
///
/// Accepts string patterns that are compiled to `Regex` in [`build()`](Self::build).
/// Fails fast with `regex::Error` if any pattern is invalid.
#[derive(Debug, Clone, Default)]
pub struct ParsingConfigBuilder {
    job_words: ListOverride<String>,
    phone_re: Option<String>,
    date_range_re: Option<String>,
    experience_header_re: Option<String>,
    education_header_re: Option<String>,
    section_headers: ListOverride<String>,
    header_blacklist: ListOverride<String>,
    name_window: Option<usize>,
    top_scan_lines: Option<usize>,
    location_scan_lines: Option<usize>,
    min_achievement_len: Option<usize>,
    max_achievement_len: Option<usize>,
    company_match_threshold: Option<f64>,
    skills_line_re: Option<String>,
    repair_achievements: Option<bool>,
    quality_weights: Option<QualityWeights>,
    time_budget: Option<Duration>,
}

impl ParsingConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a builder from the `[parsing]` table of a config file.
    ///
    /// List entries extend the built-in lists rather than replacing them.
    pub fn from_file_section(section: &ParsingSection) -> Self {
        let mut builder = Self::new();
        if let Some(words) = &section.header_blacklist {
            for w in words {
                builder = builder.add_header_blacklist_entry(w.clone());
            }
        }
        if let Some(headers) = &section.section_headers {
            for h in headers {
                builder = builder.add_section_header(h.clone());
            }
        }
        builder.name_window = section.name_window;
        builder.top_scan_lines = section.top_scan_lines;
        builder.min_achievement_len = section.min_achievement_len;
        builder.max_achievement_len = section.max_achievement_len;
        builder.company_match_threshold = section.company_match_threshold;
        builder.repair_achievements = section.repair_achievements;
        builder.time_budget = section.time_budget_ms.map(Duration::from_millis);
        builder
    }

    // ── Normalization ──

    pub fn set_job_words(mut self, words: Vec<String>) -> Self {
        self.job_words = ListOverride::Replace(words);
        self
    }

    pub fn add_job_word(mut self, word: String) -> Self {
        self.job_words.push(word);
        self
    }

    // ── Patterns ──

    pub fn phone_regex(mut self, pattern: &str) -> Self {
        self.phone_re = Some(pattern.to_string());
        self
    }

    pub fn date_range_regex(mut self, pattern: &str) -> Self {
        self.date_range_re = Some(pattern.to_string());
        self
    }

    pub fn skills_line_regex(mut self, pattern: &str) -> Self {
        self.skills_line_re = Some(pattern.to_string());
        self
    }

    // ── Sections ──

    pub fn experience_header_regex(mut self, pattern: &str) -> Self {
        self.experience_header_re = Some(pattern.to_string());
        self
    }

    pub fn education_header_regex(mut self, pattern: &str) -> Self {
        self.education_header_re = Some(pattern.to_string());
        self
    }

    pub fn set_section_headers(mut self, headers: Vec<String>) -> Self {
        self.section_headers = ListOverride::Replace(headers);
        self
    }

    pub fn add_section_header(mut self, header: String) -> Self {
        self.section_headers.push(header);
        self
    }

    // ── Name ──

    pub fn set_header_blacklist(mut self, entries: Vec<String>) -> Self {
        self.header_blacklist = ListOverride::Replace(entries);
        self
    }

    pub fn add_header_blacklist_entry(mut self, entry: String) -> Self {
        self.header_blacklist.push(entry);
        self
    }

    pub fn name_window(mut self, n: usize) -> Self {
        self.name_window = Some(n);
        self
    }

    pub fn top_scan_lines(mut self, n: usize) -> Self {
        self.top_scan_lines = Some(n);
        self
    }

    pub fn location_scan_lines(mut self, n: usize) -> Self {
        self.location_scan_lines = Some(n);
        self
    }

    // ── Experience ──

    pub fn min_achievement_len(mut self, n: usize) -> Self {
        self.min_achievement_len = Some(n);
        self
    }

    pub fn max_achievement_len(mut self, n: usize) -> Self {
        self.max_achievement_len = Some(n);
        self
    }

    pub fn company_match_threshold(mut self, threshold: f64) -> Self {
        self.company_match_threshold = Some(threshold);
        self
    }

    // ── Repair ──

    pub fn repair_achievements(mut self, enabled: bool) -> Self {
        self.repair_achievements = Some(enabled);
        self
    }

    /// Set custom weights for achievement repair selection.
    pub fn quality_weights(mut self, weights: QualityWeights) -> Self {
        self.quality_weights = Some(weights);
        self
    }

    // ── Pipeline ──

    pub fn time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    /// Compile all string patterns into regexes and produce a [`ParsingConfig`].
    pub fn build(self) -> Result<ParsingConfig, regex::Error> {
        let compile = |opt: Option<String>| -> Result<Option<Regex>, regex::Error> {
            opt.map(|p| Regex::new(&p)).transpose()
        };

        let lowercase = |list: ListOverride<String>| -> ListOverride<String> {
            match list {
                ListOverride::Default => ListOverride::Default,
                ListOverride::Replace(v) => {
                    ListOverride::Replace(v.into_iter().map(|s| s.trim().to_lowercase()).collect())
                }
                ListOverride::Extend(v) => {
                    ListOverride::Extend(v.into_iter().map(|s| s.trim().to_lowercase()).collect())
                }
            }
        };

        Ok(ParsingConfig {
            job_words: self.job_words,
            phone_re: compile(self.phone_re)?,
            date_range_re: compile(self.date_range_re)?,
            experience_header_re: compile(self.experience_header_re)?,
            education_header_re: compile(self.education_header_re)?,
            section_headers: lowercase(self.section_headers),
            header_blacklist: lowercase(self.header_blacklist),
            name_window: self.name_window.unwrap_or(3),
            top_scan_lines: self.top_scan_lines.unwrap_or(10),
            location_scan_lines: self.location_scan_lines.unwrap_or(15),
            min_achievement_len: self.min_achievement_len.unwrap_or(10),
            max_achievement_len: self.max_achievement_len.unwrap_or(500),
            company_match_threshold: self.company_match_threshold.unwrap_or(0.85),
            skills_line_re: compile(self.skills_line_re)?,
            repair_achievements: self.repair_achievements.unwrap_or(true),
            quality_weights: self.quality_weights,
            time_budget: self.time_budget,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ParsingConfig::default();
        assert_eq!(config.name_window, 3);
        assert_eq!(config.top_scan_lines, 10);
        assert_eq!(config.min_achievement_len, 10);
        assert_eq!(config.max_achievement_len, 500);
        assert!((config.company_match_threshold - 0.85).abs() < f64::EPSILON);
        assert!(config.repair_achievements());
        assert!(config.time_budget().is_none());
    }

    #[test]
    fn test_builder_basic() {
        let config = ParsingConfigBuilder::new()
            .name_window(5)
            .top_scan_lines(4)
            .company_match_threshold(0.9)
            .repair_achievements(false)
            .time_budget(Duration::from_millis(250))
            .build()
            .unwrap();
        assert_eq!(config.name_window, 5);
        assert_eq!(config.top_scan_lines, 4);
        assert!((config.company_match_threshold - 0.9).abs() < f64::EPSILON);
        assert!(!config.repair_achievements());
        assert_eq!(config.time_budget(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_builder_custom_regex() {
        let config = ParsingConfigBuilder::new()
            .experience_header_regex(r"(?i)^\s*berufserfahrung\s*$")
            .build()
            .unwrap();
        assert!(config.experience_header_re.is_some());
    }

    #[test]
    fn test_builder_invalid_regex() {
        let result = ParsingConfigBuilder::new().phone_regex(r"[invalid").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_lowercases_header_lists() {
        let config = ParsingConfigBuilder::new()
            .add_header_blacklist_entry("  Portfolio ".to_string())
            .add_section_header("Military Service".to_string())
            .build()
            .unwrap();
        assert_eq!(
            config.header_blacklist,
            ListOverride::Extend(vec!["portfolio".to_string()])
        );
        assert_eq!(
            config.section_headers,
            ListOverride::Extend(vec!["military service".to_string()])
        );
    }

    #[test]
    fn test_from_file_section() {
        let section = ParsingSection {
            header_blacklist: Some(vec!["Portfolio".to_string()]),
            name_window: Some(2),
            time_budget_ms: Some(100),
            ..Default::default()
        };
        let config = ParsingConfigBuilder::from_file_section(&section)
            .build()
            .unwrap();
        assert_eq!(config.name_window, 2);
        assert_eq!(config.top_scan_lines, 10);
        assert_eq!(config.time_budget(), Some(Duration::from_millis(100)));
        let blacklist = config.header_blacklist.resolve(&["skills".to_string()]);
        assert_eq!(blacklist, vec!["skills".to_string(), "portfolio".to_string()]);
    }

    #[test]
    fn test_list_override_resolve() {
        let defaults = vec!["a".to_string(), "b".to_string()];

        let d: ListOverride<String> = ListOverride::Default;
        assert_eq!(d.resolve(&defaults), defaults);

        let r: ListOverride<String> = ListOverride::Replace(vec!["x".to_string()]);
        assert_eq!(r.resolve(&defaults), vec!["x".to_string()]);

        let mut e: ListOverride<String> = ListOverride::Default;
        e.push("c".to_string());
        e.push("d".to_string());
        assert_eq!(
            e.resolve(&defaults),
            vec![
                "a".to_string(),
                "b".to_string(),
                "c".to_string(),
                "d".to_string()
            ]
        );
    }
}
