use std::time::Instant;

use resume_core::{
    CandidateProfile, ConfidenceMap, CoreError, EducationEntry, ExperienceEntry, Line, ParseResponse,
};

use crate::config::ParsingConfig;
use crate::education::{self, EducationSection, GroupedEducation};
use crate::evidence::EvidenceAssembler;
use crate::experience::{ExperienceSection, GroupedExperience};
use crate::name::NameCandidate;
use crate::normalize::NormalizedLine;
use crate::patterns::{self, MatchMethod};
use crate::skills::SkillLine;
use crate::{confidence, experience, name, normalize, section, skills, ParseError};

/// Longest line the location scan looks at.
const MAX_LOCATION_LINE_CHARS: usize = 200;

/// A contact value and every line it was seen on.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactMatch {
    pub value: String,
    pub method: MatchMethod,
    /// First line the value was found on.
    pub line_index: usize,
    /// All lines carrying the same value, in document order.
    pub occurrences: Vec<usize>,
}

/// A distinct link and the lines it appears on.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkMatch {
    pub value: String,
    pub method: MatchMethod,
    pub occurrences: Vec<usize>,
}

/// A configurable resume parsing pipeline.
///
/// Holds a [`ParsingConfig`] and exposes each pipeline step as a method.
/// The default constructor uses built-in defaults; use
/// [`ResumeExtractor::with_config`] to supply custom patterns, tables and a
/// time budget.
pub struct ResumeExtractor {
    config: ParsingConfig,
}

impl Default for ResumeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ResumeExtractor {
    /// Create an extractor with default configuration.
    pub fn new() -> Self {
        Self {
            config: ParsingConfig::default(),
        }
    }

    /// Create an extractor with a custom configuration.
    pub fn with_config(config: ParsingConfig) -> Self {
        Self { config }
    }

    /// Get a reference to the current config.
    pub fn config(&self) -> &ParsingConfig {
        &self.config
    }

    /// Build the search-text view of every line (step 1).
    pub fn normalize_lines<'a>(&self, lines: &'a [Line]) -> Vec<NormalizedLine<'a>> {
        normalize::normalize_lines_with_config(lines, &self.config)
    }

    /// Find the first email and every line repeating it (step 2).
    pub fn find_email(&self, lines: &[NormalizedLine<'_>]) -> Option<ContactMatch> {
        let found: Vec<(usize, String, MatchMethod)> = lines
            .iter()
            .enumerate()
            .filter_map(|(i, line)| {
                patterns::extract_email(&line.original.text).map(|m| (i, m.value, m.method))
            })
            .collect();
        let (line_index, value, method) = found.first().cloned()?;
        let occurrences = found
            .iter()
            .filter(|(_, v, _)| v.eq_ignore_ascii_case(&value))
            .map(|(i, _, _)| *i)
            .collect();
        Some(ContactMatch {
            value,
            method,
            line_index,
            occurrences,
        })
    }

    /// Find the first phone number and every line repeating it (step 2).
    ///
    /// Numbers are matched on search text and read back from the original.
    pub fn find_phone(&self, lines: &[NormalizedLine<'_>]) -> Option<ContactMatch> {
        let found: Vec<(usize, String)> = lines
            .iter()
            .enumerate()
            .filter_map(|(i, line)| {
                let m = patterns::extract_phone_with_config(&line.search_text, &self.config)?;
                let value = line
                    .original_span(m.span.clone())
                    .map(str::to_string)
                    .unwrap_or(m.value);
                Some((i, value))
            })
            .collect();
        let (line_index, value) = found.first().cloned()?;
        let key = digits(&value);
        let occurrences = found
            .iter()
            .filter(|(_, v)| digits(v) == key)
            .map(|(i, _)| *i)
            .collect();
        Some(ContactMatch {
            value,
            method: MatchMethod::Phone,
            line_index,
            occurrences,
        })
    }

    /// Resolve the candidate name (step 3).
    pub fn resolve_name(
        &self,
        lines: &[NormalizedLine<'_>],
        email_line: Option<usize>,
    ) -> Option<NameCandidate> {
        name::resolve_name_with_config(lines, email_line, &self.config)
    }

    /// Find the candidate location near the top of the document (step 4).
    ///
    /// Header lines and very long lines are skipped.
    pub fn find_location(&self, lines: &[NormalizedLine<'_>]) -> Option<ContactMatch> {
        let headers = section::resolve_section_headers(&self.config);
        lines
            .iter()
            .enumerate()
            .take(self.config.location_scan_lines)
            .filter(|(_, line)| {
                !line.is_blank()
                    && line.original.text.chars().count() <= MAX_LOCATION_LINE_CHARS
                    && !section::is_known_header(&line.search_text, &headers)
                    && !section::is_experience_header_with_config(&line.search_text, &self.config)
                    && !section::is_education_header_with_config(&line.search_text, &self.config)
            })
            .find_map(|(i, line)| {
                let m = patterns::extract_location(&line.search_text)?;
                Some(ContactMatch {
                    value: m.value,
                    method: m.method,
                    line_index: i,
                    occurrences: vec![i],
                })
            })
    }

    /// Collect distinct links, keeping every line each one appears on (step 5).
    pub fn find_links(&self, lines: &[NormalizedLine<'_>]) -> Vec<LinkMatch> {
        let mut links: Vec<LinkMatch> = Vec::new();
        for (i, line) in lines.iter().enumerate() {
            for m in patterns::extract_links(&line.original.text) {
                match links.iter_mut().find(|l| l.value == m.value) {
                    Some(link) => {
                        if !link.occurrences.contains(&i) {
                            link.occurrences.push(i);
                        }
                    }
                    None => links.push(LinkMatch {
                        value: m.value,
                        method: m.method,
                        occurrences: vec![i],
                    }),
                }
            }
        }
        links
    }

    /// Read inline skills lines (step 6).
    pub fn extract_skills(&self, lines: &[NormalizedLine<'_>]) -> Vec<SkillLine> {
        skills::extract_skills_with_config(lines, &self.config)
    }

    /// Group the experience section into entries (step 7).
    pub fn group_experiences(&self, lines: &[NormalizedLine<'_>]) -> ExperienceSection {
        experience::group_experiences_with_config(lines, &self.config)
    }

    /// Extract the education section (step 8).
    pub fn extract_education(&self, lines: &[NormalizedLine<'_>]) -> EducationSection {
        education::extract_education_with_config(lines, &self.config)
    }

    /// Run the full pipeline on one document.
    ///
    /// Fails only on empty input, or when a configured time budget runs out
    /// between passes.
    pub fn parse(&self, lines: &[Line]) -> Result<ParseResponse, ParseError> {
        if lines.is_empty() {
            return Err(CoreError::MalformedInput("document has no lines".to_string()).into());
        }
        if lines.iter().all(|l| l.text.trim().is_empty()) {
            return Err(CoreError::MalformedInput("document has no text".to_string()).into());
        }
        let started = Instant::now();

        let normalized = self.normalize_lines(lines);
        self.check_budget(started)?;

        let email = self.find_email(&normalized);
        let phone = self.find_phone(&normalized);
        self.check_budget(started)?;

        let email_line = email.as_ref().map(|m| m.line_index);
        let name = self.resolve_name(&normalized, email_line);
        let location = self.find_location(&normalized);
        let links = self.find_links(&normalized);
        self.check_budget(started)?;

        let skill_lines = self.extract_skills(&normalized);
        let experience = self.group_experiences(&normalized);
        self.check_budget(started)?;

        let education = self.extract_education(&normalized);
        let (experiences, education_entries, reclassified) =
            reclassify(experience.entries, education.entries);
        self.check_budget(started)?;

        // Confidence
        let mut scores = ConfidenceMap::new();
        let mut insert = |c: resume_core::FieldConfidence| {
            scores.insert(c.field_name.clone(), c);
        };
        insert(confidence::score_name(
            name.as_ref(),
            email_line,
            self.config.name_window,
        ));
        insert(confidence::score_email(
            email.as_ref().map(|m| m.value.as_str()),
            email.as_ref().map_or(0, |m| m.occurrences.len()),
        ));
        insert(confidence::score_phone(
            phone.as_ref().map(|m| m.value.as_str()),
            phone.as_ref().map_or(0, |m| m.occurrences.len()),
        ));
        insert(confidence::score_location(
            location.as_ref().map(|m| (m.value.as_str(), m.method)),
        ));
        insert(confidence::score_links(links.len()));
        let skill_count = skill_lines.iter().map(|l| l.skills.len()).sum();
        insert(confidence::score_skills(skill_count));
        insert(confidence::score_experiences(experiences.len()));
        insert(confidence::score_education(
            education_entries.len(),
            reclassified,
        ));
        let score = |key: &str| scores.get(key).map_or(0.0, |c| c.confidence);

        // Evidence
        let line_at = move |i: usize| &lines[i];
        let mut evidence = EvidenceAssembler::new();
        if let Some(candidate) = &name {
            evidence.add("full_name", line_at(candidate.line_index), score("full_name"));
        }
        for (key, found) in [("email", &email), ("phone", &phone), ("location", &location)] {
            if let Some(m) = found {
                evidence.add_all(key, m.occurrences.iter().map(|&i| line_at(i)), score(key));
            }
        }
        for link in &links {
            evidence.add_all("links", link.occurrences.iter().map(|&i| line_at(i)), score("links"));
        }
        for skill_line in &skill_lines {
            evidence.add("skills", line_at(skill_line.line_index), score("skills"));
        }
        for grouped in &experiences {
            evidence.add_all(
                "experiences",
                grouped.line_indices.iter().map(|&i| line_at(i)),
                score("experiences"),
            );
        }
        for (_, indices) in &education_entries {
            evidence.add_all(
                "education",
                indices.iter().map(|&i| line_at(i)),
                score("education"),
            );
        }

        // Warnings and quality
        let mut warnings = experience.warnings;
        warnings.extend(education.warnings);
        if education_entries.is_empty() && !education.section_found {
            warnings.push("No education entries detected in resume".to_string());
        }
        warnings.extend(confidence::clarification_warnings(&scores));
        let parse_quality = confidence::quality_from_scores(&scores);

        let candidate_profile = CandidateProfile {
            full_name: name.map(|n| n.value),
            email: email.map(|m| m.value),
            phone: phone.map(|m| m.value),
            location: location.map(|m| m.value),
            links: links.into_iter().map(|l| l.value).collect(),
            skills: skill_lines.into_iter().flat_map(|l| l.skills).collect(),
            experiences: experiences.into_iter().map(|g| g.entry).collect(),
            education: education_entries.into_iter().map(|(e, _)| e).collect(),
        };

        tracing::info!(
            lines = lines.len(),
            experiences = candidate_profile.experiences.len(),
            education = candidate_profile.education.len(),
            quality = %parse_quality,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "parsed resume"
        );

        Ok(ParseResponse {
            candidate_profile,
            evidence_map: evidence.finish(),
            confidence_scores: scores,
            parse_quality,
            warnings,
        })
    }

    fn check_budget(&self, started: Instant) -> Result<(), ParseError> {
        let Some(budget) = self.config.time_budget else {
            return Ok(());
        };
        let elapsed = started.elapsed();
        if elapsed > budget {
            tracing::warn!(
                elapsed_ms = elapsed.as_millis() as u64,
                budget_ms = budget.as_millis() as u64,
                "parse exceeded its time budget"
            );
            return Err(ParseError::BudgetExceeded {
                elapsed_ms: elapsed.as_millis() as u64,
                budget_ms: budget.as_millis() as u64,
            });
        }
        Ok(())
    }
}

/// Education entries with the lines backing them.
type EducationWithLines = Vec<(EducationEntry, Vec<usize>)>;

/// Move schooling out of the experience list when the education section
/// produced nothing. Returns the kept experiences, the education entries and
/// whether any were moved.
fn reclassify(
    experiences: Vec<GroupedExperience>,
    education: Vec<GroupedEducation>,
) -> (Vec<GroupedExperience>, EducationWithLines, bool) {
    if !education.is_empty() {
        let education = education
            .into_iter()
            .map(|g| (g.entry, g.line_indices))
            .collect();
        return (experiences, education, false);
    }

    let (schooling, kept): (Vec<GroupedExperience>, Vec<GroupedExperience>) = experiences
        .into_iter()
        .partition(|g| education::looks_like_education(&g.entry));
    if !schooling.is_empty() {
        tracing::debug!(moved = schooling.len(), "reclassified experience entries as education");
    }
    let moved: EducationWithLines = schooling
        .into_iter()
        .map(|g| {
            let entry: ExperienceEntry = g.entry;
            (education::education_from_experience(entry), g.line_indices)
        })
        .collect();
    let reclassified = !moved.is_empty();
    (kept, moved, reclassified)
}

fn digits(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParsingConfigBuilder;
    use resume_core::SourceKind;
    use std::time::Duration;

    fn lines(texts: &[&str]) -> Vec<Line> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Line::new(*t, format!("text:line:{}", i + 1), SourceKind::Text))
            .collect()
    }

    #[test]
    fn test_find_email_counts_repeats() {
        let ext = ResumeExtractor::new();
        let doc = lines(&["Jane Doe", "jane@x.com", "Contact: JANE@X.COM", "bob@y.org"]);
        let normalized = ext.normalize_lines(&doc);
        let email = ext.find_email(&normalized).unwrap();
        assert_eq!(email.value, "jane@x.com");
        assert_eq!(email.line_index, 1);
        assert_eq!(email.occurrences, vec![1, 2]);
    }

    #[test]
    fn test_find_phone_keeps_original_text() {
        let ext = ResumeExtractor::new();
        let doc = lines(&["Jane Doe", "(555) 123-4567", "Cell: 555.123.4567"]);
        let normalized = ext.normalize_lines(&doc);
        let phone = ext.find_phone(&normalized).unwrap();
        assert_eq!(phone.value, "(555) 123-4567");
        assert_eq!(phone.occurrences, vec![1, 2]);
    }

    #[test]
    fn test_find_location_skips_headers() {
        let ext = ResumeExtractor::new();
        let doc = lines(&["EXPERIENCE", "Jane Doe", "Portland, OR"]);
        let normalized = ext.normalize_lines(&doc);
        let location = ext.find_location(&normalized).unwrap();
        assert_eq!(location.value, "Portland, OR");
        assert_eq!(location.line_index, 2);
    }

    #[test]
    fn test_find_links_keeps_every_occurrence() {
        let ext = ResumeExtractor::new();
        let doc = lines(&[
            "linkedin.com/in/janedoe",
            "Profile: linkedin.com/in/janedoe github.com/janedoe",
        ]);
        let normalized = ext.normalize_lines(&doc);
        let links = ext.find_links(&normalized);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].value, "linkedin.com/in/janedoe");
        assert_eq!(links[0].occurrences, vec![0, 1]);
        assert_eq!(links[1].value, "github.com/janedoe");
    }

    #[test]
    fn test_skills_evidence_carries_field_confidence() {
        let ext = ResumeExtractor::new();
        let doc = lines(&["Jane Doe", "jane@x.com", "Skills: Salesforce, HubSpot"]);
        let response = ext.parse(&doc).unwrap();
        let evidence = &response.evidence_map["skills"];
        assert_eq!(evidence.len(), 1);
        assert_eq!(evidence[0].locator, "text:line:3");
        assert_eq!(
            evidence[0].confidence,
            response.confidence_scores["skills"].confidence
        );
    }

    #[test]
    fn test_empty_input_is_malformed() {
        let ext = ResumeExtractor::new();
        assert!(matches!(
            ext.parse(&[]),
            Err(ParseError::Core(CoreError::MalformedInput(_)))
        ));
        assert!(matches!(
            ext.parse(&lines(&["   ", ""])),
            Err(ParseError::Core(CoreError::MalformedInput(_)))
        ));
    }

    #[test]
    fn test_zero_budget_is_exceeded() {
        let config = ParsingConfigBuilder::new()
            .time_budget(Duration::ZERO)
            .build()
            .unwrap();
        let ext = ResumeExtractor::with_config(config);
        let doc = lines(&["Jane Doe", "jane@x.com"]);
        // Any measurable work overruns a zero budget; a clock too coarse to
        // see it lets the parse through.
        match ext.parse(&doc) {
            Err(ParseError::BudgetExceeded { budget_ms, .. }) => assert_eq!(budget_ms, 0),
            Ok(response) => assert_eq!(response.candidate_profile.email.as_deref(), Some("jane@x.com")),
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_reclassify_only_without_education() {
        let school = GroupedExperience {
            entry: ExperienceEntry {
                company: Some("Gonzaga University".to_string()),
                ..Default::default()
            },
            line_indices: vec![3],
            layout: crate::experience::FieldSource::MultiLine,
        };
        let job = GroupedExperience {
            entry: ExperienceEntry {
                company: Some("Acme Corp".to_string()),
                ..Default::default()
            },
            line_indices: vec![5],
            layout: crate::experience::FieldSource::MultiLine,
        };

        let (kept, moved, reclassified) = reclassify(vec![school.clone(), job.clone()], vec![]);
        assert!(reclassified);
        assert_eq!(kept, vec![job.clone()]);
        assert_eq!(moved.len(), 1);
        assert_eq!(moved[0].0.institution.as_deref(), Some("Gonzaga University"));
        assert_eq!(moved[0].1, vec![3]);

        let parsed = GroupedEducation {
            entry: EducationEntry {
                institution: Some("Boston College".to_string()),
                ..Default::default()
            },
            line_indices: vec![9],
        };
        let (kept, moved, reclassified) = reclassify(vec![school, job], vec![parsed]);
        assert!(!reclassified);
        assert_eq!(kept.len(), 2);
        assert_eq!(moved.len(), 1);
    }
}
