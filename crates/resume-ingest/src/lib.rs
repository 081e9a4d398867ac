use std::path::Path;

use thiserror::Error;

pub mod docx;
pub mod text;

pub use docx::DocxLineSource;
pub use text::TextLineSource;

// Re-export domain types for convenience
pub use resume_core::{EvidenceSource, Line, LineSource, ParseResponse, SourceError, SourceKind};
use resume_parsing::{ParseError, ResumeExtractor};

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("document error: {0}")]
    Source(#[from] SourceError),
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[cfg(not(feature = "pdf"))]
    #[error("PDF support not compiled in (enable the `pdf` feature of resume-ingest)")]
    NoPdfSupport,
}

/// Pick the line source for a file by its extension.
///
/// - `.txt`, `.md` → [`TextLineSource`]
/// - `.docx` → [`DocxLineSource`]
/// - `.pdf` → MuPDF (requires the `pdf` feature)
///
/// Anything else is rejected with [`SourceError::UnsupportedFormat`].
pub fn source_for(path: &Path) -> Result<Box<dyn LineSource>, IngestError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "txt" | "md" => Ok(Box::new(TextLineSource::new())),
        "docx" => Ok(Box::new(DocxLineSource::new())),
        "pdf" => pdf_source(),
        "" => Err(SourceError::UnsupportedFormat("file has no extension".to_string()).into()),
        other => Err(SourceError::UnsupportedFormat(format!(".{}", other)).into()),
    }
}

#[cfg(feature = "pdf")]
fn pdf_source() -> Result<Box<dyn LineSource>, IngestError> {
    Ok(Box::new(resume_pdf_mupdf::MupdfLineSource::new()))
}

#[cfg(not(feature = "pdf"))]
fn pdf_source() -> Result<Box<dyn LineSource>, IngestError> {
    Err(IngestError::NoPdfSupport)
}

/// Read a document into lines, rejecting empty documents.
pub fn read_lines(path: &Path) -> Result<Vec<Line>, IngestError> {
    let source = source_for(path)?;
    let lines = source.read_lines(path)?;
    if lines.iter().all(|l| l.text.trim().is_empty()) {
        return Err(SourceError::EmptyDocument.into());
    }
    tracing::debug!(
        path = %path.display(),
        kind = ?source.kind(),
        lines = lines.len(),
        "read document"
    );
    Ok(lines)
}

/// Read and parse a document with the default extractor.
pub fn parse_file(path: &Path) -> Result<ParseResponse, IngestError> {
    parse_file_with(path, &ResumeExtractor::new())
}

/// Read and parse a document with a configured extractor.
pub fn parse_file_with(path: &Path, extractor: &ResumeExtractor) -> Result<ParseResponse, IngestError> {
    let lines = read_lines(path)?;
    Ok(extractor.parse(&lines)?)
}
