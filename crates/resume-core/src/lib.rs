use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod config_file;
pub mod source;

pub use source::{LineSource, SourceError};

/// Evidence-map keys, in the order they are reported.
pub const FIELD_KEYS: [&str; 8] = [
    "full_name",
    "email",
    "phone",
    "location",
    "links",
    "skills",
    "experiences",
    "education",
];

/// Fields whose confidence decides the overall [`ParseQuality`].
pub const REQUIRED_FIELDS: [&str; 3] = ["full_name", "email", "phone"];

/// End-date sentinel for ongoing positions ("Present", "current", ...).
pub const PRESENT: &str = "Present";

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("malformed input: {0}")]
    MalformedInput(String),
}

/// Document format a [`Line`] was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Pdf,
    Docx,
    Text,
}

/// One line of document text as produced by a line source.
///
/// `locator` is opaque to the parser: it is stored and echoed in evidence,
/// never interpreted. Typical shapes are `pdf:page:1:line:3`,
/// `docx:paragraph:4` and `text:line:12`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub text: String,
    pub locator: String,
    pub source_kind: SourceKind,
}

impl Line {
    pub fn new(text: impl Into<String>, locator: impl Into<String>, source_kind: SourceKind) -> Self {
        Self {
            text: text.into(),
            locator: locator.into(),
            source_kind,
        }
    }
}

/// Where a piece of evidence came from. `User` is reserved for values a
/// candidate confirmed by hand downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceSource {
    Pdf,
    Docx,
    Text,
    User,
}

impl From<SourceKind> for EvidenceSource {
    fn from(kind: SourceKind) -> Self {
        match kind {
            SourceKind::Pdf => EvidenceSource::Pdf,
            SourceKind::Docx => EvidenceSource::Docx,
            SourceKind::Text => EvidenceSource::Text,
        }
    }
}

/// Exact source snippet backing an extracted value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub source: EvidenceSource,
    pub locator: String,
    /// Original line text, never the normalized search view.
    pub text: String,
    pub confidence: f64,
}

/// Confidence metadata for one top-level field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfidence {
    pub field_name: String,
    pub confidence: f64,
    pub extraction_method: String,
    pub reasons: Vec<String>,
    pub required: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub company: Option<String>,
    pub job_title: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub institution: Option<String>,
    pub degree: Option<String>,
    pub field_of_study: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub gpa: Option<String>,
    /// Majors, minors, honors, coursework and similar bullet lines.
    pub details: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub links: Vec<String>,
    pub skills: Vec<String>,
    pub experiences: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
}

/// Coarse summary of extraction certainty. Ordered `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseQuality {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for ParseQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ParseQuality::Low => "low",
            ParseQuality::Medium => "medium",
            ParseQuality::High => "high",
        };
        f.write_str(s)
    }
}

pub type EvidenceMap = BTreeMap<String, Vec<EvidenceItem>>;
pub type ConfidenceMap = BTreeMap<String, FieldConfidence>;

/// Everything `parse()` returns for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseResponse {
    pub candidate_profile: CandidateProfile,
    pub evidence_map: EvidenceMap,
    pub confidence_scores: ConfidenceMap,
    pub parse_quality: ParseQuality,
    pub warnings: Vec<String>,
}
