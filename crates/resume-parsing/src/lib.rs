use thiserror::Error;

pub mod confidence;
pub mod config;
pub mod education;
pub mod evidence;
pub mod experience;
pub mod extractor;
pub mod name;
pub mod normalize;
pub mod patterns;
pub mod repair;
pub mod scoring;
pub mod section;
pub mod skills;

pub use config::{ListOverride, ParsingConfig, ParsingConfigBuilder};
pub use evidence::EvidenceAssembler;
pub use extractor::{ContactMatch, LinkMatch, ResumeExtractor};
pub use normalize::NormalizedLine;
pub use repair::{repair_achievement, repair_field_text};
pub use scoring::{detect_corruption, score_text_quality, select_best_repair, Corruption, QualityWeights};
// Re-export domain types from core (canonical definitions live there)
pub use resume_core::{
    CandidateProfile, ConfidenceMap, CoreError, EducationEntry, EvidenceItem, EvidenceMap,
    EvidenceSource, ExperienceEntry, FieldConfidence, Line, ParseQuality, ParseResponse, SourceKind,
    FIELD_KEYS, PRESENT, REQUIRED_FIELDS,
};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("parse took {elapsed_ms} ms, over the {budget_ms} ms budget")]
    BudgetExceeded { elapsed_ms: u64, budget_ms: u64 },
}

/// Parse one document's lines into a profile with evidence and confidence.
///
/// Pipeline:
/// 1. Normalize every line into a search-text view
/// 2. Find the email and phone, counting repeats
/// 3. Resolve the candidate name around the email line
/// 4. Find the location near the top of the document
/// 5. Collect links
/// 6. Read inline skills lines
/// 7. Group the experience section into entries
/// 8. Extract education, reclassifying schooling found under experience
/// 9. Score every field, attach evidence and pick the quality tier
pub fn parse(lines: &[Line]) -> Result<ParseResponse, ParseError> {
    ResumeExtractor::new().parse(lines)
}
