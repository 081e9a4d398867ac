//! DOCX line source.
//!
//! A `.docx` file is a ZIP archive; the body text lives in
//! `word/document.xml` as a sequence of paragraphs:
//! ```xml
//! <w:body>
//!   <w:p><w:r><w:t>Jane Doe</w:t></w:r></w:p>
//!   <w:p><w:r><w:t xml:space="preserve">EXPERIENCE </w:t></w:r></w:p>
//! </w:body>
//! ```

use std::io::{BufRead, BufReader, Read, Seek};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;

use resume_core::{Line, LineSource, SourceError, SourceKind};

const DOCUMENT_PART: &str = "word/document.xml";

/// Word documents.
///
/// One [`Line`] per non-empty `<w:p>`, located as `docx:paragraph:<i>` where
/// `i` is the 0-based index of the paragraph in the body, empty paragraphs
/// included.
#[derive(Debug, Default)]
pub struct DocxLineSource;

impl DocxLineSource {
    pub fn new() -> Self {
        Self
    }

    /// Read lines from any seekable DOCX byte stream.
    pub fn lines_from_reader<R: Read + Seek>(&self, reader: R) -> Result<Vec<Line>, SourceError> {
        let mut archive = zip::ZipArchive::new(reader)
            .map_err(|e| SourceError::OpenError(format!("not a DOCX archive: {}", e)))?;
        let part = archive
            .by_name(DOCUMENT_PART)
            .map_err(|e| SourceError::OpenError(format!("missing {}: {}", DOCUMENT_PART, e)))?;
        let paragraphs = parse_paragraphs(BufReader::new(part))?;
        Ok(paragraphs
            .into_iter()
            .enumerate()
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(i, text)| {
                Line::new(text.trim(), format!("docx:paragraph:{}", i), SourceKind::Docx)
            })
            .collect())
    }
}

impl LineSource for DocxLineSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Docx
    }

    fn read_lines(&self, path: &Path) -> Result<Vec<Line>, SourceError> {
        let file = std::fs::File::open(path)?;
        let lines = self.lines_from_reader(file)?;
        if lines.is_empty() {
            return Err(SourceError::EmptyDocument);
        }
        Ok(lines)
    }
}

/// Collect the text of every paragraph, in document order.
fn parse_paragraphs<R: BufRead>(reader: R) -> Result<Vec<String>, SourceError> {
    let mut xml_reader = Reader::from_reader(reader);
    xml_reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_paragraph = false;
    let mut in_text = false;

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"w:p" => {
                    in_paragraph = true;
                    current.clear();
                }
                b"w:t" if in_paragraph => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                // <w:p/> is an empty paragraph but still takes an index
                b"w:p" => paragraphs.push(String::new()),
                b"w:tab" | b"w:br" | b"w:cr" if in_paragraph => current.push(' '),
                _ => {}
            },
            Ok(Event::Text(ref e)) if in_text => {
                let text = e
                    .unescape()
                    .map_err(|e| SourceError::ExtractionError(e.to_string()))?;
                current.push_str(&text);
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" if in_paragraph => {
                    in_paragraph = false;
                    paragraphs.push(std::mem::take(&mut current));
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(SourceError::ExtractionError(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    tracing::debug!(paragraphs = paragraphs.len(), "parsed docx body");
    Ok(paragraphs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_paragraphs() {
        let xml = r#"<w:document><w:body>
            <w:p><w:r><w:t>Jane </w:t></w:r><w:r><w:t>Doe</w:t></w:r></w:p>
            <w:p/>
            <w:p><w:pPr><w:jc w:val="left"/></w:pPr></w:p>
            <w:p><w:r><w:t>R&amp;D</w:t><w:tab/><w:t>Lead</w:t></w:r></w:p>
        </w:body></w:document>"#;
        let paragraphs = parse_paragraphs(xml.as_bytes()).unwrap();
        assert_eq!(paragraphs, vec!["Jane Doe", "", "", "R&D Lead"]);
    }

    #[test]
    fn test_not_a_zip_is_open_error() {
        let source = DocxLineSource::new();
        let result = source.lines_from_reader(std::io::Cursor::new(b"plain text".to_vec()));
        assert!(matches!(result, Err(SourceError::OpenError(_))));
    }
}
