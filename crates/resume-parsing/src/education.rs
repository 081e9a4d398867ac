//! Education section extraction.
//!
//! Lines under an education header are grouped per institution. A line
//! naming an institution (or a study-abroad program) opens an entry, as does
//! a degree line when no entry is open or the open one already has a
//! degree. Later lines fill the degree, field of study, location, dates and
//! GPA; bullets become details. Entries with neither an institution nor a
//! degree are dropped.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use resume_core::{EducationEntry, ExperienceEntry};

use crate::config::ParsingConfig;
use crate::experience::{field_text, field_value, trim_field, BULLET_RE};
use crate::normalize::NormalizedLine;
use crate::patterns::{self, DateRange, PatternMatch};
use crate::{section, skills};

/// Degree patterns, most specific first.
static DEGREE_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\b(?:bachelor|master)(?:'s)?\s+of\s+(?:science|arts|fine\s+arts|business\s+administration|applied\s+science|education|engineering|public\s+health)\b",
        r"(?i)\bassociate(?:'s)?\s+of\s+(?:science|arts|applied\s+science)\b",
        r"(?i)\bdoctor\s+of\s+(?:philosophy|medicine|education)\b",
        r"(?i)\b(?:bachelor|master|associate)(?:'s)?\s+degree\b",
        r"(?i)\b(?:m\.\s?b\.\s?a|ph\.\s?d|b\.\s?s|b\.\s?a|m\.\s?s|m\.\s?a)\.?",
        r"(?i)\b(?:bachelor(?:'s)?|master(?:'s)?|doctorate|diploma|certificate)\b",
        r"\b(?:BS|BA|BSc|MSc|MBA|PhD|PHD)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static INSTITUTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:university|universidad|college|institute|school|academy|polytechnic|conservatory)\b")
        .unwrap()
});

static STUDY_ABROAD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:study|semester|year)\s+abroad\b|\bexchange\s+program\b").unwrap()
});

static FIELD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bin\s+([A-Za-z][A-Za-z&/ -]*?)\s*(?:[,|;(\d]|$)").unwrap());

static GPA_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bGPA\b\s*:?\s*(\d\.\d{1,2})(?:\s*/\s*(\d(?:\.\d{1,2})?))?").unwrap()
});

/// A single graduation date: "2016", "May 2016", "Spring Semester 2015".
static GRADUATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:(?:January|February|March|April|May|June|July|August|September|October|November|December|Jan|Feb|Mar|Apr|Jun|Jul|Aug|Sep|Sept|Oct|Nov|Dec)\.?\s+|(?:Spring|Summer|Fall|Autumn|Winter)(?:\s+(?:Semester|Term|Trimester|Quarter))?\s+)?(?:19|20)\d{2}\b",
    )
    .unwrap()
});

static SEGMENT_SPLIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*(?:[,|;•]|\s[-–—]\s|[–—])\s*").unwrap());

static JUNK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)available\s+upon\s+request|\bcontact\b|\bphone\b|\be-?mail\b|@").unwrap()
});

static YEAR_ONLY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(?:19|20)\d{2}\s*$").unwrap());

const MIN_DETAIL_CHARS: usize = 5;
const MAX_DETAIL_CHARS: usize = 500;

/// An education entry and the lines it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedEducation {
    pub entry: EducationEntry,
    pub line_indices: Vec<usize>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EducationSection {
    pub entries: Vec<GroupedEducation>,
    pub warnings: Vec<String>,
    /// Whether an education header was seen at all.
    pub section_found: bool,
}

pub fn extract_education(lines: &[NormalizedLine<'_>]) -> EducationSection {
    extract_education_with_config(lines, &ParsingConfig::default())
}

pub(crate) fn extract_education_with_config(
    lines: &[NormalizedLine<'_>],
    config: &ParsingConfig,
) -> EducationSection {
    let headers = section::resolve_section_headers(config);
    let mut out = EducationSection::default();
    let mut current: Option<EntryBuilder> = None;
    let mut in_section = false;

    for (index, line) in lines.iter().enumerate() {
        if line.is_blank() {
            continue;
        }
        let search = line.search_text.as_str();
        if section::is_education_header_with_config(search, config) {
            close(&mut current, &mut out.entries);
            in_section = true;
            out.section_found = true;
            continue;
        }
        if !in_section {
            continue;
        }
        if section::is_experience_header_with_config(search, config)
            || section::is_known_header(search, &headers)
            || skills::is_skills_line_with_config(search, config)
        {
            close(&mut current, &mut out.entries);
            in_section = false;
            continue;
        }
        process(&mut current, &mut out.entries, index, line, config);
    }
    close(&mut current, &mut out.entries);

    if out.section_found && out.entries.is_empty() {
        out.warnings
            .push("EDUCATION header found but no education entries parsed".to_string());
    }
    tracing::debug!(
        entries = out.entries.len(),
        section_found = out.section_found,
        "education extraction finished"
    );
    out
}

fn process(
    current: &mut Option<EntryBuilder>,
    entries: &mut Vec<GroupedEducation>,
    index: usize,
    line: &NormalizedLine<'_>,
    config: &ParsingConfig,
) {
    let original = line.original.text.trim();
    if let Some(bullet) = BULLET_RE.find(original) {
        if let Some(builder) = current.as_mut() {
            builder.add_detail(index, &original[bullet.end()..], config);
        }
        return;
    }

    let search = line.search_text.as_str();
    let opens = names_institution(search)
        || (find_degree(search).is_some()
            && current.as_ref().map_or(true, |b| b.entry.degree.is_some()));
    if opens {
        close(current, entries);
        *current = Some(EntryBuilder::head(index, line, config));
        return;
    }

    match current.as_mut() {
        Some(builder) => builder.add_line(index, line, config),
        None => tracing::trace!(locator = %line.original.locator, "education line before any entry"),
    }
}

fn close(current: &mut Option<EntryBuilder>, entries: &mut Vec<GroupedEducation>) {
    if let Some(builder) = current.take() {
        if builder.has_content() {
            entries.push(GroupedEducation {
                entry: builder.entry,
                line_indices: builder.lines,
            });
        } else {
            tracing::trace!(lines = ?builder.lines, "dropped education entry without institution or degree");
        }
    }
}

struct EntryBuilder {
    entry: EducationEntry,
    lines: Vec<usize>,
}

impl EntryBuilder {
    /// Open an entry from its first line.
    fn head(index: usize, line: &NormalizedLine<'_>, config: &ParsingConfig) -> Self {
        let mut builder = EntryBuilder {
            entry: EducationEntry::default(),
            lines: vec![index],
        };
        let search = line.search_text.as_str();

        // 1. Institution and degree parts
        let (institution, degree) = split_head(search);

        // 2. Dates, location and GPA, cut out of both parts
        let facts = LineFacts::scan(search, degree.as_ref(), config);
        builder.entry.institution =
            institution.and_then(|range| field_value(line, facts.cut(range), config));
        if let Some(range) = degree {
            builder.set_degree(line, range, &facts, config);
        }
        builder.apply(line, &facts, config);
        builder
    }

    fn add_line(&mut self, index: usize, line: &NormalizedLine<'_>, config: &ParsingConfig) {
        let search = line.search_text.as_str();
        let degree = if self.entry.degree.is_none() {
            segments(search)
                .into_iter()
                .find(|r| find_degree(&search[r.clone()]).is_some())
        } else {
            None
        };
        let facts = LineFacts::scan(search, degree.as_ref(), config);

        let structural = degree.is_some() || facts.is_structural();
        if let Some(range) = degree {
            self.set_degree(line, range, &facts, config);
        }
        self.apply(line, &facts, config);

        if structural {
            self.lines.push(index);
        } else {
            self.add_detail(index, line.original.text.trim(), config);
        }
    }

    /// Degree and field of study from a byte range of the search text.
    fn set_degree(
        &mut self,
        line: &NormalizedLine<'_>,
        range: Range<usize>,
        facts: &LineFacts,
        config: &ParsingConfig,
    ) {
        let range = facts.cut(range);
        let part = &line.search_text[range.clone()];
        let Some(found) = find_degree(part) else {
            // "INSTITUTION: Degree" with an unlisted degree name
            self.entry.degree = field_value(line, range, config);
            return;
        };
        let offset = range.start;
        self.entry.degree = field_value(line, offset + found.start..offset + found.end, config);

        let rest = offset + found.end..range.end;
        if let Some(field) = FIELD_RE
            .captures(&line.search_text[rest.clone()])
            .and_then(|caps| caps.get(1))
        {
            let start = rest.start + field.start();
            self.entry.field_of_study = field_value(line, start..start + field.len(), config);
        }
    }

    fn apply(&mut self, line: &NormalizedLine<'_>, facts: &LineFacts, config: &ParsingConfig) {
        if self.entry.location.is_none() {
            self.entry.location = facts.location.as_ref().map(|m| m.value.clone());
        }
        if let Some(dates) = &facts.dates {
            if self.entry.start_date.is_none() {
                self.entry.start_date = Some(dates.start.clone());
            }
            self.entry.end_date = Some(dates.end.clone());
        } else if let Some(year) = &facts.graduation {
            if self.entry.end_date.is_none() {
                self.entry.end_date = field_value(line, year.clone(), config);
            }
        }
        if self.entry.gpa.is_none() {
            self.entry.gpa = facts.gpa.as_ref().map(|(value, _)| value.clone());
        }
    }

    fn add_detail(&mut self, index: usize, text: &str, config: &ParsingConfig) {
        let Some(detail) = field_text(text, config) else {
            return;
        };
        let chars = detail.chars().count();
        if !(MIN_DETAIL_CHARS..=MAX_DETAIL_CHARS).contains(&chars) || is_junk(&detail) {
            return;
        }
        if self.entry.gpa.is_none() {
            self.entry.gpa = gpa(&detail).map(|(value, _)| value);
        }
        self.entry.details.push(detail);
        self.lines.push(index);
    }

    fn has_content(&self) -> bool {
        self.entry.institution.is_some() || self.entry.degree.is_some()
    }
}

/// Values found anywhere on one education line.
struct LineFacts {
    location: Option<PatternMatch>,
    dates: Option<DateRange>,
    graduation: Option<Range<usize>>,
    gpa: Option<(String, Range<usize>)>,
}

impl LineFacts {
    fn scan(search: &str, degree: Option<&Range<usize>>, config: &ParsingConfig) -> Self {
        let dates = patterns::extract_date_range_with_config(search, search, config);
        let graduation = match dates {
            Some(_) => None,
            None => GRADUATION_RE.find(search).map(|m| m.range()),
        };
        // "in Marketing, Minor in Business" is not a place
        let location = patterns::extract_location(search)
            .filter(|m| degree.map_or(true, |d| !d.contains(&m.span.start)));
        LineFacts {
            location,
            dates,
            graduation,
            gpa: gpa(search),
        }
    }

    fn is_structural(&self) -> bool {
        self.location.is_some() || self.dates.is_some() || self.graduation.is_some() || self.gpa.is_some()
    }

    /// Shorten `range` so it stops before the first date, location or GPA
    /// inside it.
    fn cut(&self, range: Range<usize>) -> Range<usize> {
        let stops = [
            self.location.as_ref().map(|m| m.span.start),
            self.dates.as_ref().map(|d| d.span.start),
            self.graduation.as_ref().map(|r| r.start),
            self.gpa.as_ref().map(|(_, r)| r.start),
        ];
        let end = stops
            .into_iter()
            .flatten()
            .filter(|s| *s > range.start && *s < range.end)
            .min()
            .unwrap_or(range.end);
        range.start..end
    }
}

/// Split a head line into institution and degree ranges.
fn split_head(search: &str) -> (Option<Range<usize>>, Option<Range<usize>>) {
    if let Some(colon) = search.find(':') {
        let left = &search[..colon];
        let labelled = names_institution(left)
            || (find_degree(left).is_none() && is_all_caps(left) && find_degree(&search[colon + 1..]).is_some());
        if labelled {
            return (Some(0..colon), Some(colon + 1..search.len()));
        }
    }

    let parts = segments(search);
    let institution = parts
        .iter()
        .find(|r| names_institution(&search[(*r).clone()]))
        .cloned();
    let degree = parts
        .iter()
        .filter(|r| Some(*r) != institution.as_ref())
        .find(|r| find_degree(&search[(*r).clone()]).is_some())
        .cloned();
    (institution, degree)
}

/// Byte ranges of the comma, pipe or dash separated parts of a line.
fn segments(text: &str) -> Vec<Range<usize>> {
    let mut parts = Vec::new();
    let mut start = 0;
    for sep in SEGMENT_SPLIT_RE.find_iter(text) {
        if sep.start() > start {
            parts.push(start..sep.start());
        }
        start = sep.end();
    }
    if start < text.len() {
        parts.push(start..text.len());
    }
    parts
}

fn find_degree(text: &str) -> Option<Range<usize>> {
    DEGREE_RES.iter().find_map(|re| re.find(text).map(|m| m.range()))
}

fn names_institution(text: &str) -> bool {
    INSTITUTION_RE.is_match(text) || STUDY_ABROAD_RE.is_match(text)
}

fn is_all_caps(text: &str) -> bool {
    text.chars().any(char::is_alphabetic) && !text.chars().any(char::is_lowercase)
}

fn gpa(text: &str) -> Option<(String, Range<usize>)> {
    let caps = GPA_RE.captures(text)?;
    let whole = caps.get(0)?;
    let value = match caps.get(2) {
        Some(scale) => format!("{}/{}", &caps[1], scale.as_str()),
        None => caps[1].to_string(),
    };
    Some((value, whole.range()))
}

fn is_junk(text: &str) -> bool {
    JUNK_RE.is_match(text) || YEAR_ONLY_RE.is_match(text)
}

/// Whether an experience entry is really schooling: its company, title or
/// location names a degree, an institution or a study-abroad program.
pub fn looks_like_education(entry: &ExperienceEntry) -> bool {
    [&entry.company, &entry.job_title, &entry.location]
        .into_iter()
        .flatten()
        .any(|text| names_institution(text) || find_degree(text).is_some())
}

/// Rebuild an experience entry as an education entry. Achievements become
/// details.
pub fn education_from_experience(entry: ExperienceEntry) -> EducationEntry {
    let fields = [entry.company.as_deref(), entry.job_title.as_deref()];
    let institution = fields
        .into_iter()
        .flatten()
        .find(|text| names_institution(text))
        .map(str::to_string)
        .or_else(|| entry.company.clone().filter(|c| find_degree(c).is_none()));

    let (degree, field_of_study) = [entry.job_title.as_deref(), entry.company.as_deref()]
        .into_iter()
        .flatten()
        .find_map(|text| {
            let found = find_degree(text)?;
            let degree = trim_field(&text[found.clone()]).to_string();
            let field = FIELD_RE
                .captures(&text[found.end..])
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim().to_string())
                .filter(|f| !f.is_empty());
            Some((Some(degree), field))
        })
        .unwrap_or((None, None));

    EducationEntry {
        institution,
        degree,
        field_of_study,
        location: entry.location,
        start_date: entry.start_date,
        end_date: entry.end_date,
        gpa: None,
        details: entry.achievements,
    }
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

    fn extract(texts: &[&str]) -> EducationSection {
        let doc = lines(texts);
        let normalized = normalize_lines(&doc);
        extract_education(&normalized)
    }

    #[test]
    fn test_multi_line_entry() {
        let section = extract(&[
            "EDUCATION",
            "Gonzaga University, Spokane, WA",
            "Bachelor of Science in Marketing, Minor in Business",
            "2012 - 2016",
            "GPA: 3.8/4.0",
            "• Dean's List, six semesters",
            "References available upon request",
        ]);
        assert!(section.section_found);
        assert!(section.warnings.is_empty());
        assert_eq!(section.entries.len(), 1);

        let grouped = &section.entries[0];
        let entry = &grouped.entry;
        assert_eq!(entry.institution.as_deref(), Some("Gonzaga University"));
        assert_eq!(entry.location.as_deref(), Some("Spokane, WA"));
        assert_eq!(entry.degree.as_deref(), Some("Bachelor of Science"));
        assert_eq!(entry.field_of_study.as_deref(), Some("Marketing"));
        assert_eq!(entry.start_date.as_deref(), Some("2012"));
        assert_eq!(entry.end_date.as_deref(), Some("2016"));
        assert_eq!(entry.gpa.as_deref(), Some("3.8/4.0"));
        assert_eq!(entry.details, vec!["Dean's List, six semesters"]);
        assert_eq!(grouped.line_indices, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_institution_colon_degree() {
        let section = extract(&[
            "EDUCATION",
            "NEODENT UNIVERSITY: Bachelor of Arts in Communication 2010 - 2014",
        ]);
        let entry = &section.entries[0].entry;
        assert_eq!(entry.institution.as_deref(), Some("NEODENT UNIVERSITY"));
        assert_eq!(entry.degree.as_deref(), Some("Bachelor of Arts"));
        assert_eq!(entry.field_of_study.as_deref(), Some("Communication"));
        assert_eq!(entry.start_date.as_deref(), Some("2010"));
        assert_eq!(entry.end_date.as_deref(), Some("2014"));
    }

    #[test]
    fn test_second_degree_opens_entry() {
        let section = extract(&[
            "EDUCATION",
            "Bachelor of Science, Gonzaga University",
            "Master of Business Administration",
            "May 2020",
        ]);
        assert_eq!(section.entries.len(), 2);
        let first = &section.entries[0].entry;
        assert_eq!(first.institution.as_deref(), Some("Gonzaga University"));
        assert_eq!(first.degree.as_deref(), Some("Bachelor of Science"));
        let second = &section.entries[1].entry;
        assert_eq!(second.institution, None);
        assert_eq!(second.degree.as_deref(), Some("Master of Business Administration"));
        assert_eq!(second.end_date.as_deref(), Some("May 2020"));
    }

    #[test]
    fn test_section_ends_at_experience_header() {
        let section = extract(&[
            "EDUCATION",
            "Boston College",
            "EXPERIENCE",
            "Harvard University Press",
        ]);
        assert_eq!(section.entries.len(), 1);
        assert_eq!(section.entries[0].entry.institution.as_deref(), Some("Boston College"));
    }

    #[test]
    fn test_header_without_entries_warns() {
        let section = extract(&["EDUCATION", "Self taught, lifelong learner"]);
        assert!(section.section_found);
        assert!(section.entries.is_empty());
        assert_eq!(
            section.warnings,
            vec!["EDUCATION header found but no education entries parsed"]
        );
    }

    #[test]
    fn test_no_header_no_entries() {
        let section = extract(&["Jane Doe", "Gonzaga University"]);
        assert!(!section.section_found);
        assert!(section.entries.is_empty());
        assert!(section.warnings.is_empty());
    }

    #[test]
    fn test_junk_details_dropped() {
        assert!(is_junk("References available upon request"));
        assert!(is_junk("Contact: jane@x.com"));
        assert!(is_junk("2016"));
        assert!(!is_junk("Dean's List"));
    }

    #[test]
    fn test_find_degree_prefers_long_forms() {
        let text = "Master of Science in Finance";
        let found = find_degree(text).unwrap();
        assert_eq!(&text[found], "Master of Science");
        assert!(find_degree("Boston, MA").is_none());
        assert!(find_degree("B.S. Economics").is_some());
    }

    #[test]
    fn test_reclassify_experience_entry() {
        let entry = ExperienceEntry {
            company: Some("Gonzaga University".to_string()),
            job_title: Some("B.A. in Communication".to_string()),
            location: Some("Spokane, WA".to_string()),
            start_date: Some("2010".to_string()),
            end_date: Some("2014".to_string()),
            achievements: vec!["Dean's List".to_string()],
        };
        assert!(looks_like_education(&entry));
        let education = education_from_experience(entry);
        assert_eq!(education.institution.as_deref(), Some("Gonzaga University"));
        assert_eq!(education.degree.as_deref(), Some("B.A."));
        assert_eq!(education.field_of_study.as_deref(), Some("Communication"));
        assert_eq!(education.details, vec!["Dean's List"]);

        let job = ExperienceEntry {
            company: Some("Acme Corp".to_string()),
            job_title: Some("Account Executive".to_string()),
            ..Default::default()
        };
        assert!(!looks_like_education(&job));
    }
}
