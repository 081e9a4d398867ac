//! Experience section grouping.
//!
//! One pass over the lines with a single line of lookahead. Three entry
//! layouts are recognised:
//!
//! - single line: `Company: Title: Location` or `Company: Title`
//! - hierarchical: a `Company, City, ST` heading, then title and dates lines
//! - multi-line: a company line, then title, location and dates lines
//!
//! Company, title and location are locked once set and the first accepted
//! value wins. The one exception is a bare location line following an
//! entry, which corrects that entry's location.

use once_cell::sync::Lazy;
use rapidfuzz::fuzz;
use regex::Regex;
use resume_core::ExperienceEntry;

use crate::config::ParsingConfig;
use crate::normalize::{self, NormalizedLine};
use crate::patterns::{self, DateRange};
use crate::repair;
use crate::section;
use crate::skills;

/// Line layouts a field value can come from, lowest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldSource {
    MultiLine,
    Hierarchical,
    SingleLine,
}

/// One grouped entry and the lines it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedExperience {
    pub entry: ExperienceEntry,
    /// Indices into the input lines, in document order.
    pub line_indices: Vec<usize>,
    /// Layout of the line that opened the entry.
    pub layout: FieldSource,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExperienceSection {
    pub entries: Vec<GroupedExperience>,
    pub warnings: Vec<String>,
    /// Whether an experience header was seen at all.
    pub section_found: bool,
}

static SINGLE_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)\s*:\s*(.+?)\s*:\s*(.+)$").unwrap());

static TWO_PART_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)\s*:\s*([A-Z][A-Za-z\s&'-]*?)\s*(?::\s*)?$").unwrap());

pub(crate) static BULLET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[•●▪◦‣■➢►*>+–—\-]+\s*").unwrap());

static TITLE_SHAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][A-Za-z\s&'/.-]*$").unwrap());

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").unwrap());

/// Words that make a short heading a job title.
const TITLE_WORDS: &[&str] = &[
    "manager", "director", "engineer", "representative", "rep", "specialist", "consultant",
    "analyst", "associate", "executive", "coordinator", "assistant", "supervisor",
    "administrator", "developer", "designer", "intern", "lead", "leader", "president", "vp",
    "officer", "owner", "founder", "partner", "principal", "head", "ceo", "cfo", "cto", "coo",
    "advisor", "strategist", "nurse", "teacher", "technician", "architect", "scientist",
    "researcher", "recruiter", "trainer", "agent", "buyer", "planner", "clerk", "cashier",
    "server", "salesperson",
];

const FIELD_TRIM: &[char] = &[',', ';', ':', '|', '-', '–', '—', '•', '/'];

const MAX_HEADING_CHARS: usize = 150;
const MAX_LOCATION_LINE_CHARS: usize = 200;
const MAX_DATE_WARNING_CHARS: usize = 80;

/// Group the experience section of a document with the default settings.
pub fn group_experiences(lines: &[NormalizedLine<'_>]) -> ExperienceSection {
    group_experiences_with_config(lines, &ParsingConfig::default())
}

pub(crate) fn group_experiences_with_config(
    lines: &[NormalizedLine<'_>],
    config: &ParsingConfig,
) -> ExperienceSection {
    let mut grouper = Grouper::new(config);
    let mut in_section = false;
    let mut section_found = false;

    for (index, line) in lines.iter().enumerate() {
        if line.is_blank() {
            continue;
        }

        if section::is_experience_header_with_config(&line.search_text, config) {
            grouper.close();
            in_section = true;
            section_found = true;
            tracing::debug!(locator = %line.original.locator, "experience section opened");
            continue;
        }
        if !in_section {
            continue;
        }

        if grouper.ends_section(line) {
            grouper.close();
            in_section = false;
            tracing::debug!(locator = %line.original.locator, "experience section closed");
            continue;
        }

        let next = lines[index + 1..].iter().find(|l| !l.is_blank());
        grouper.process(index, line, next);
    }
    grouper.close();

    let mut warnings = grouper.warnings;
    if !section_found {
        warnings.insert(0, "Experience section not found".to_string());
    }
    tracing::debug!(entries = grouper.entries.len(), section_found, "grouped experience");

    ExperienceSection {
        entries: grouper.entries,
        warnings,
        section_found,
    }
}

/// A company, title or location value and the layout it came from.
#[derive(Debug, Clone, Default)]
struct Slot(Option<(String, FieldSource)>);

impl Slot {
    /// Set the value unless one is already locked in.
    fn offer(&mut self, value: Option<String>, source: FieldSource) -> bool {
        match (&self.0, value) {
            (None, Some(v)) if !v.is_empty() => {
                self.0 = Some((v, source));
                true
            }
            _ => false,
        }
    }

    fn replace(&mut self, value: String, source: FieldSource) {
        self.0 = Some((value, source));
    }

    fn value(&self) -> Option<&str> {
        self.0.as_ref().map(|(v, _)| v.as_str())
    }

    fn is_set(&self) -> bool {
        self.0.is_some()
    }

    fn into_value(self) -> Option<String> {
        self.0.map(|(v, _)| v)
    }
}

#[derive(Debug)]
struct EntryBuilder {
    layout: FieldSource,
    company: Slot,
    job_title: Slot,
    location: Slot,
    dates: Option<(String, String)>,
    achievements: Vec<String>,
    /// Whether the last achievement may still take wrapped lines.
    open_bullet: bool,
    lines: Vec<usize>,
}

impl EntryBuilder {
    fn new(layout: FieldSource, index: usize) -> Self {
        Self {
            layout,
            company: Slot::default(),
            job_title: Slot::default(),
            location: Slot::default(),
            dates: None,
            achievements: Vec::new(),
            open_bullet: false,
            lines: vec![index],
        }
    }

    /// Source for title and location values seen after the opening line.
    fn follow_source(&self) -> FieldSource {
        match self.layout {
            FieldSource::Hierarchical => FieldSource::Hierarchical,
            _ => FieldSource::MultiLine,
        }
    }

    fn touch(&mut self, index: usize) {
        if self.lines.last() != Some(&index) {
            self.lines.push(index);
        }
    }

    fn set_dates(&mut self, range: Option<DateRange>) {
        if self.dates.is_none() {
            self.dates = range.map(|r| (r.start, r.end));
        }
    }

    fn has_content(&self) -> bool {
        self.company.is_set()
            || self.job_title.is_set()
            || self.location.is_set()
            || self.dates.is_some()
            || !self.achievements.is_empty()
    }

    fn finish(self, config: &ParsingConfig) -> GroupedExperience {
        let (start_date, end_date) = match self.dates {
            Some((start, end)) => (Some(start), Some(end)),
            None => (None, None),
        };
        let achievements = self
            .achievements
            .iter()
            .map(|a| repair::repair_achievement_with_config(a, config))
            .filter(|a| !a.is_empty())
            .collect();
        GroupedExperience {
            entry: ExperienceEntry {
                company: self.company.into_value(),
                job_title: self.job_title.into_value(),
                location: self.location.into_value(),
                start_date,
                end_date,
                achievements,
            },
            line_indices: self.lines,
            layout: self.layout,
        }
    }
}

/// Text in front of a location on a location line.
enum Prefix {
    None,
    Title(String),
    Company { value: String, header: bool },
}

struct LocationLine {
    location: String,
    prefix: Prefix,
    dates: Option<DateRange>,
}

struct SingleLine {
    company: Option<String>,
    title: Option<String>,
    location: Option<String>,
    dates: Option<DateRange>,
}

struct Grouper<'c> {
    config: &'c ParsingConfig,
    headers: Vec<String>,
    entries: Vec<GroupedExperience>,
    warnings: Vec<String>,
    current: Option<EntryBuilder>,
}

impl<'c> Grouper<'c> {
    fn new(config: &'c ParsingConfig) -> Self {
        Self {
            config,
            headers: section::resolve_section_headers(config),
            entries: Vec::new(),
            warnings: Vec::new(),
            current: None,
        }
    }

    fn close(&mut self) {
        if let Some(builder) = self.current.take() {
            if builder.has_content() {
                self.entries.push(builder.finish(self.config));
            }
        }
    }

    fn open(&mut self, layout: FieldSource, index: usize, line: &NormalizedLine<'_>) -> &mut EntryBuilder {
        self.close();
        tracing::debug!(locator = %line.original.locator, layout = ?layout, "experience entry opened");
        self.current.insert(EntryBuilder::new(layout, index))
    }

    fn ends_section(&self, line: &NormalizedLine<'_>) -> bool {
        let search = line.search_text.as_str();
        section::is_known_header(search, &self.headers)
            || section::is_education_header_with_config(search, self.config)
            || skills::is_skills_line_with_config(search, self.config)
    }

    fn process(&mut self, index: usize, line: &NormalizedLine<'_>, next: Option<&NormalizedLine<'_>>) {
        let config = self.config;
        let original = line.original.text.as_str();
        let search = line.search_text.as_str();

        // 1. Bullets only ever add achievements
        if let Some(m) = BULLET_RE.find(original) {
            let body = original[m.end()..].trim();
            if let Some(entry) = self.current.as_mut() {
                if !body.is_empty() {
                    entry.achievements.push(body.to_string());
                    entry.open_bullet = true;
                    entry.touch(index);
                }
            }
            return;
        }

        // 2. A lowercase start continues a wrapped bullet
        if let Some(entry) = self.current.as_mut() {
            if entry.open_bullet && starts_lowercase(original) {
                if let Some(last) = entry.achievements.last_mut() {
                    last.push(' ');
                    last.push_str(original.trim());
                    entry.touch(index);
                    return;
                }
            }
        }

        // 3. Date-like text the date pattern cannot read. Only a line that
        // is nothing but dates stops here; anything else carries on.
        if original.chars().count() <= MAX_DATE_WARNING_CHARS
            && patterns::looks_like_unparsed_dates(original, search, config)
        {
            tracing::warn!(locator = %line.original.locator, "unrecognized date format");
            self.warnings
                .push(format!("Date format not recognized: {}", original.trim()));
            if is_mostly_dates(original) {
                return;
            }
        }

        // 4. Single-line entries
        if let Some(fields) = self.single_line(line) {
            let entry = self.open(FieldSource::SingleLine, index, line);
            entry.company.offer(fields.company, FieldSource::SingleLine);
            entry.job_title.offer(fields.title, FieldSource::SingleLine);
            entry.location.offer(fields.location, FieldSource::SingleLine);
            entry.set_dates(fields.dates);
            return;
        }

        // 5. Dates on their own line
        if patterns::is_date_only(original, search, config) {
            if let Some(entry) = self.current.as_mut() {
                entry.set_dates(patterns::extract_date_range_with_config(original, search, config));
                entry.open_bullet = false;
                entry.touch(index);
            }
            return;
        }

        // 6. Lines carrying a location
        if let Some(found) = self.location_line(line) {
            self.on_location_line(index, line, found);
            return;
        }

        // 7. Job title headings
        if let Some((title, dates)) = self.job_title_header(line) {
            self.on_title(index, line, title, dates);
            return;
        }

        // 8. Company-shaped headings
        let (rest, dates) = without_dates(original, config);
        let heading = trim_field(&rest);
        let heading_search = normalize::normalize_with_config(heading, config);
        if is_companyish(&heading_search) && self.on_heading(index, line, heading, dates, next) {
            return;
        }

        // 9. Prose
        self.on_prose(index, original);
    }

    fn single_line(&self, line: &NormalizedLine<'_>) -> Option<SingleLine> {
        let config = self.config;
        let search = line.search_text.as_str();

        if let Some(caps) = SINGLE_LINE_RE.captures(search) {
            let (company, title, rest) = (caps.get(1)?, caps.get(2)?, caps.get(3)?);
            if is_company_segment(company.as_str()) && word_count(title.as_str()) <= 8 {
                let rest_text = rest.as_str();
                let dates = patterns::extract_date_range_with_config(rest_text, rest_text, config);
                let location_end = match &dates {
                    Some(d) => rest.start() + d.span.start,
                    None => rest.end(),
                };
                let location_range = rest.start()..location_end;
                let location = search
                    .get(location_range.clone())
                    .and_then(patterns::extract_location)
                    .map(|m| m.value)
                    .or_else(|| field_value(line, location_range, config));
                return Some(SingleLine {
                    company: field_value(line, company.range(), config),
                    title: field_value(line, title.range(), config),
                    location,
                    dates: dates.and(patterns::extract_date_range_with_config(
                        &line.original.text,
                        search,
                        config,
                    )),
                });
            }
        }

        let caps = TWO_PART_RE.captures(search)?;
        let (company, title) = (caps.get(1)?, caps.get(2)?);
        let title_words = word_count(title.as_str());
        if !is_company_segment(company.as_str()) || title_words == 0 || title_words > 8 {
            return None;
        }
        Some(SingleLine {
            company: field_value(line, company.range(), config),
            title: field_value(line, title.range(), config),
            location: None,
            dates: None,
        })
    }

    fn location_line(&self, line: &NormalizedLine<'_>) -> Option<LocationLine> {
        let config = self.config;
        let search = line.search_text.as_str();
        if search.chars().count() > MAX_LOCATION_LINE_CHARS {
            return None;
        }
        let found = patterns::extract_location(search)?;

        let (tail, tail_dates) = without_dates(&search[found.span.end..], config);
        if !is_punctuation(&tail) {
            return None;
        }

        let head = line.original_span(0..found.span.start).unwrap_or_default();
        let (head, head_dates) = without_dates(head, config);
        let head = trim_field(&head);
        let prefix = if head.is_empty() {
            Prefix::None
        } else {
            let head_search = normalize::normalize_with_config(head, config);
            if word_count(&head_search) > 8 || !is_companyish(&head_search) {
                return None;
            }
            let value = field_text(head, config)?;
            if is_title_text(&head_search) {
                Prefix::Title(value)
            } else {
                Prefix::Company {
                    value,
                    header: is_company_header(&head_search),
                }
            }
        };

        let dates = if tail_dates.is_some() || head_dates.is_some() {
            patterns::extract_date_range_with_config(&line.original.text, search, config)
        } else {
            None
        };

        Some(LocationLine {
            location: found.value,
            prefix,
            dates,
        })
    }

    fn on_location_line(&mut self, index: usize, line: &NormalizedLine<'_>, found: LocationLine) {
        let threshold = self.config.company_match_threshold;
        let LocationLine {
            location,
            prefix,
            dates,
        } = found;

        let (company, title, header) = match prefix {
            Prefix::None => (None, None, false),
            Prefix::Title(t) => (None, Some(t), false),
            Prefix::Company { value, header } => (Some(value), None, header),
        };
        let matches_current = |entry: &EntryBuilder| match (&company, entry.company.value()) {
            (Some(c), Some(current)) => same_company(c, current, threshold),
            _ => false,
        };

        if dates.is_some() {
            // Location plus dates: the second line of an entry, or a new one
            let needs_new = match &self.current {
                None => true,
                Some(e) => {
                    !e.achievements.is_empty()
                        || e.dates.is_some()
                        || (company.is_some() && e.company.is_set() && !matches_current(e))
                }
            };
            let layout = if company.is_some() {
                FieldSource::Hierarchical
            } else {
                FieldSource::MultiLine
            };
            let entry = if needs_new {
                self.open(layout, index, line)
            } else {
                match self.current.as_mut() {
                    Some(entry) => entry,
                    None => return,
                }
            };
            let source = entry.follow_source();
            entry.touch(index);
            entry.company.offer(company, source);
            entry.job_title.offer(title, source);
            entry.location.offer(Some(location), source);
            entry.set_dates(dates);
            entry.open_bullet = false;
            return;
        }

        if header && !self.current.as_ref().is_some_and(matches_current) {
            // Company heading: a new hierarchical entry, unless the open
            // entry is still waiting for its company
            let fill = self.current.as_ref().is_some_and(|e| {
                !e.company.is_set() && !e.location.is_set() && e.achievements.is_empty()
            });
            let entry = if fill {
                match self.current.as_mut() {
                    Some(entry) => entry,
                    None => return,
                }
            } else {
                self.open(FieldSource::Hierarchical, index, line)
            };
            entry.touch(index);
            entry.company.offer(company, FieldSource::Hierarchical);
            entry.location.offer(Some(location), FieldSource::Hierarchical);
            entry.open_bullet = false;
            return;
        }

        let Some(entry) = self.current.as_mut() else {
            return;
        };
        if !entry.achievements.is_empty() {
            return;
        }
        let bare = company.is_none() && title.is_none();
        let source = entry.follow_source();
        entry.touch(index);
        entry.open_bullet = false;
        entry.job_title.offer(title, source);

        if entry.location.is_set() {
            // Only a line holding nothing but a location corrects a set one
            if bare {
                tracing::debug!(
                    locator = %line.original.locator,
                    from = entry.location.value().unwrap_or_default(),
                    to = %location,
                    "location corrected by continuation line"
                );
                entry.location.replace(location, FieldSource::MultiLine);
            }
        } else {
            entry.location.offer(Some(location), source);
        }
    }

    fn job_title_header(&self, line: &NormalizedLine<'_>) -> Option<(String, Option<DateRange>)> {
        let config = self.config;
        let original = line.original.text.trim();
        if original.chars().count() > MAX_HEADING_CHARS || original.contains([':', ',']) {
            return None;
        }
        let (rest, dates) = without_dates(original, config);
        let title = trim_field(&rest);
        let search = normalize::normalize_with_config(title, config);
        if search.is_empty() || section::is_known_header(&search, &self.headers) {
            return None;
        }

        let shouting = search.chars().any(char::is_alphabetic)
            && !search.chars().any(char::is_lowercase)
            && search
                .chars()
                .all(|c| c.is_alphabetic() || c.is_whitespace() || "&'/.-".contains(c));
        let words = word_count(&search);
        if !(shouting || TITLE_SHAPE_RE.is_match(&search)) || words == 0 || words > 6 {
            return None;
        }
        if !is_title_text(&search) {
            return None;
        }
        Some((field_text(title, config)?, dates))
    }

    fn on_title(
        &mut self,
        index: usize,
        line: &NormalizedLine<'_>,
        title: String,
        dates: Option<DateRange>,
    ) {
        let Some(entry) = self.current.as_ref() else {
            let entry = self.open(FieldSource::MultiLine, index, line);
            entry.job_title.offer(Some(title), FieldSource::MultiLine);
            entry.set_dates(dates);
            return;
        };

        let next_role = entry.job_title.is_set()
            && (!entry.achievements.is_empty() || (entry.dates.is_some() && dates.is_some()));
        if next_role {
            if entry.layout == FieldSource::Hierarchical {
                // Another role under the same company heading
                let (company, location) = (entry.company.clone(), entry.location.clone());
                let entry = self.open(FieldSource::Hierarchical, index, line);
                entry.company = company;
                entry.location = location;
                entry.job_title.offer(Some(title), FieldSource::Hierarchical);
                entry.set_dates(dates);
            } else {
                let entry = self.open(FieldSource::MultiLine, index, line);
                entry.job_title.offer(Some(title), FieldSource::MultiLine);
                entry.set_dates(dates);
            }
            return;
        }

        if let Some(entry) = self.current.as_mut() {
            let source = entry.follow_source();
            entry.touch(index);
            entry.job_title.offer(Some(title), source);
            entry.set_dates(dates);
            entry.open_bullet = false;
        }
    }

    /// Returns false when the heading is better read as prose.
    fn on_heading(
        &mut self,
        index: usize,
        line: &NormalizedLine<'_>,
        heading: &str,
        dates: Option<DateRange>,
        next: Option<&NormalizedLine<'_>>,
    ) -> bool {
        let config = self.config;
        let Some(value) = field_text(heading, config) else {
            return false;
        };

        let starts_entry = self.current.as_ref().is_none_or(|e| {
            !e.achievements.is_empty()
                || (e.company.is_set() && (e.job_title.is_set() || e.dates.is_some()))
        });
        if starts_entry {
            let confirmed = dates.is_some() || next.is_some_and(|n| self.confirms_entry(n));
            if !confirmed {
                return false;
            }
            let entry = self.open(FieldSource::MultiLine, index, line);
            entry.company.offer(Some(value), FieldSource::MultiLine);
            entry.set_dates(dates);
            return true;
        }

        let Some(entry) = self.current.as_mut() else {
            return false;
        };
        let source = entry.follow_source();
        let used = if !entry.job_title.is_set() {
            entry.job_title.offer(Some(value), source)
        } else if !entry.company.is_set() {
            entry.company.offer(Some(value), source)
        } else {
            false
        };
        if used {
            entry.touch(index);
            entry.set_dates(dates);
            entry.open_bullet = false;
        }
        used
    }

    /// Lookahead: the line after a company heading should carry a title,
    /// dates or a location.
    fn confirms_entry(&self, next: &NormalizedLine<'_>) -> bool {
        if BULLET_RE.is_match(&next.original.text) {
            return false;
        }
        self.job_title_header(next).is_some()
            || patterns::extract_date_range_with_config(&next.original.text, &next.search_text, self.config)
                .is_some()
            || self.location_line(next).is_some()
    }

    fn on_prose(&mut self, index: usize, original: &str) {
        let (min, max) = (self.config.min_achievement_len, self.config.max_achievement_len);
        let Some(entry) = self.current.as_mut() else {
            return;
        };
        let text = original.trim();

        if entry.open_bullet {
            if let Some(last) = entry.achievements.last_mut() {
                if !ends_sentence(last) {
                    last.push(' ');
                    last.push_str(text);
                    entry.touch(index);
                    return;
                }
            }
        }

        let len = text.chars().count();
        if (min..=max).contains(&len) {
            entry.achievements.push(text.to_string());
            entry.open_bullet = true;
            entry.touch(index);
        } else {
            tracing::debug!(len, "discarded prose line outside achievement length band");
        }
    }
}

/// Clean a field value: single spaces, glued words split, word breaks
/// rejoined, and no decoration at either end.
pub(crate) fn field_text(text: &str, config: &ParsingConfig) -> Option<String> {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let split = normalize::split_glued_tokens_with_config(&collapsed, config);
    let repaired = repair::repair_field_text(&split);
    let value = trim_field(&repaired);
    (!value.is_empty()).then(|| value.to_string())
}

/// Field value for a byte range of the search text, read from the original.
pub(crate) fn field_value(
    line: &NormalizedLine<'_>,
    range: std::ops::Range<usize>,
    config: &ParsingConfig,
) -> Option<String> {
    let text = line
        .original_span(range.clone())
        .or_else(|| line.search_text.get(range))?;
    field_text(text, config)
}

pub(crate) fn trim_field(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || FIELD_TRIM.contains(&c))
}

/// Cut a date range out of a line, returning the rest and the range.
pub(crate) fn without_dates(text: &str, config: &ParsingConfig) -> (String, Option<DateRange>) {
    match patterns::extract_date_range_with_config(text, text, config) {
        Some(range) => {
            let rest = format!("{} {}", &text[..range.span.start], &text[range.span.end..]);
            (rest, Some(range))
        }
        None => (text.to_string(), None),
    }
}

/// Month, season and range words that may sit next to years in a date.
const DATE_WORDS: &[&str] = &[
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec",
    "january", "february", "march", "april", "june", "july", "august", "september", "october",
    "november", "december", "spring", "summer", "fall", "autumn", "winter", "to", "present",
    "current", "now",
];

/// True when nothing but years, month or season names and range markers is
/// left on the line.
fn is_mostly_dates(text: &str) -> bool {
    let rest = YEAR_RE.replace_all(text, " ");
    rest.split(|c: char| !c.is_alphabetic())
        .filter(|w| !w.is_empty())
        .all(|w| DATE_WORDS.contains(&w.to_lowercase().as_str()))
}

fn is_punctuation(text: &str) -> bool {
    text.chars()
        .all(|c| c.is_whitespace() || "|,;:()[]-–—.".contains(c))
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn starts_lowercase(text: &str) -> bool {
    text.trim_start().chars().next().is_some_and(char::is_lowercase)
}

fn ends_sentence(text: &str) -> bool {
    text.trim_end().ends_with(['.', '!', '?'])
}

fn is_company_segment(text: &str) -> bool {
    let text = text.trim();
    text.chars().count() < 100
        && word_count(text) <= 6
        && text.chars().next().is_some_and(|c| c.is_uppercase() || c.is_ascii_digit())
}

/// Title-case or all-caps heading text: at least half the words start with
/// a capital, the last word is capitalized, and no years.
fn is_companyish(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() || text.chars().count() > MAX_HEADING_CHARS || YEAR_RE.is_match(text) {
        return false;
    }
    let words: Vec<&str> = text
        .split_whitespace()
        .filter(|w| w.chars().any(char::is_alphabetic))
        .collect();
    if words.is_empty() || words.len() > 10 {
        return false;
    }
    let capitalized = words
        .iter()
        .filter(|w| w.chars().next().is_some_and(|c| c.is_uppercase() || c.is_ascii_digit()))
        .count();
    let last_capitalized = words
        .last()
        .and_then(|w| w.chars().next())
        .is_some_and(char::is_uppercase);
    capitalized * 2 >= words.len() && last_capitalized
}

/// A company in front of a location, not a lone all-caps title word.
fn is_company_header(text: &str) -> bool {
    let text = text.trim();
    let single_caps_word = word_count(text) == 1
        && text.chars().count() < 20
        && !text.chars().any(char::is_lowercase);
    !text.is_empty()
        && !single_caps_word
        && text
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_uppercase() || "&'-".contains(c))
}

fn is_title_text(text: &str) -> bool {
    text.split_whitespace().any(|w| {
        let word = w
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        TITLE_WORDS.contains(&word.as_str())
    })
}

/// Compare two company strings ignoring case, spacing and punctuation.
fn same_company(a: &str, b: &str, threshold: f64) -> bool {
    let key = |s: &str| -> String {
        s.chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase()
    };
    let (a, b) = (key(a), key(b));
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a == b || fuzz::ratio(a.chars(), b.chars()) >= threshold
}
