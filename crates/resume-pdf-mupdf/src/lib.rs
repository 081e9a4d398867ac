use std::path::Path;

use mupdf::{Document, TextPageFlags};

use resume_core::{Line, LineSource, SourceError, SourceKind};

/// MuPDF-based implementation of [`LineSource`].
///
/// This crate isolates the mupdf dependency (which is AGPL-3.0) so that
/// text and DOCX ingestion do not transitively depend on it.
///
/// Every non-blank text line becomes one [`Line`] located as
/// `pdf:page:<n>:line:<m>`, both 1-based, with `m` counting only the
/// non-blank lines of the page. Headers and footers are kept: a resume's
/// contact block often sits in the top margin.
#[derive(Debug, Default)]
pub struct MupdfLineSource;

impl MupdfLineSource {
    pub fn new() -> Self {
        Self
    }
}

impl LineSource for MupdfLineSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Pdf
    }

    fn read_lines(&self, path: &Path) -> Result<Vec<Line>, SourceError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| SourceError::OpenError("invalid path encoding".into()))?;

        let document =
            Document::open(path_str).map_err(|e| SourceError::OpenError(e.to_string()))?;

        let mut lines = Vec::new();
        for (page_index, page_result) in document
            .pages()
            .map_err(|e| SourceError::ExtractionError(e.to_string()))?
            .enumerate()
        {
            let page = page_result.map_err(|e| SourceError::ExtractionError(e.to_string()))?;
            let text_page = page
                .to_text_page(TextPageFlags::empty())
                .map_err(|e| SourceError::ExtractionError(e.to_string()))?;

            // Block/line iteration keeps the reading order of each column
            let mut line_number = 0;
            for block in text_page.blocks() {
                for line in block.lines() {
                    let raw: String = line
                        .chars()
                        .map(|c| c.char().unwrap_or('\u{FFFD}'))
                        .collect();
                    let text = expand_ligatures(raw.trim());
                    if text.is_empty() {
                        continue;
                    }
                    line_number += 1;
                    lines.push(Line::new(
                        text,
                        format!("pdf:page:{}:line:{}", page_index + 1, line_number),
                        SourceKind::Pdf,
                    ));
                }
            }
            tracing::debug!(page = page_index + 1, lines = line_number, "extracted pdf page");
        }

        if lines.is_empty() {
            return Err(SourceError::EmptyDocument);
        }
        Ok(lines)
    }
}

/// Replace typographic ligatures with their plain letters.
///
/// Fonts that ship ligature glyphs come back as a single code point
/// ("ﬁnance"), which breaks keyword and header matching.
pub fn expand_ligatures(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{FB00}' => out.push_str("ff"),
            '\u{FB01}' => out.push_str("fi"),
            '\u{FB02}' => out.push_str("fl"),
            '\u{FB03}' => out.push_str("ffi"),
            '\u{FB04}' => out.push_str("ffl"),
            '\u{FB05}' | '\u{FB06}' => out.push_str("st"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_ligatures() {
        assert_eq!(expand_ligatures("\u{FB01}nance of\u{FB03}ce"), "finance office");
        assert_eq!(expand_ligatures("Work\u{FB02}ow"), "Workflow");
        assert_eq!(expand_ligatures("plain text"), "plain text");
    }

    #[test]
    fn test_missing_file_is_open_error() {
        let source = MupdfLineSource::new();
        assert_eq!(source.kind(), SourceKind::Pdf);
        assert!(matches!(
            source.read_lines(Path::new("/nonexistent/resume.pdf")),
            Err(SourceError::OpenError(_))
        ));
    }
}
