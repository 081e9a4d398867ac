use std::path::Path;

use thiserror::Error;

use crate::{Line, SourceKind};

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("failed to open document: {0}")]
    OpenError(String),
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),
    #[error("document contains no text")]
    EmptyDocument,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for document line sources.
///
/// Implementors turn one file into an ordered list of [`Line`]s with stable
/// locators; the parsing pipeline never touches file bytes itself.
pub trait LineSource: Send + Sync {
    /// Format of the lines this source produces.
    fn kind(&self) -> SourceKind;

    /// Read the document at `path` into lines, in reading order.
    fn read_lines(&self, path: &Path) -> Result<Vec<Line>, SourceError>;
}
