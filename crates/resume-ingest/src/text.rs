use std::path::Path;

use resume_core::{Line, LineSource, SourceError, SourceKind};

/// Plain text and Markdown resumes.
///
/// One [`Line`] per physical line, located as `text:line:<n>` (1-based).
/// Blank lines are dropped but still counted, so locators always point at
/// the line a user sees in an editor. Invalid UTF-8 is replaced rather than
/// rejected.
#[derive(Debug, Default)]
pub struct TextLineSource;

impl TextLineSource {
    pub fn new() -> Self {
        Self
    }

    /// Split already-decoded text into lines.
    pub fn lines_from_str(&self, text: &str) -> Vec<Line> {
        text.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| Line::new(line.trim(), format!("text:line:{}", i + 1), SourceKind::Text))
            .collect()
    }
}

impl LineSource for TextLineSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Text
    }

    fn read_lines(&self, path: &Path) -> Result<Vec<Line>, SourceError> {
        let bytes = std::fs::read(path)?;
        let lines = self.lines_from_str(&String::from_utf8_lossy(&bytes));
        if lines.is_empty() {
            return Err(SourceError::EmptyDocument);
        }
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_lines_keep_physical_numbers() {
        let lines = TextLineSource::new().lines_from_str("Jane Doe\n\n  jane@x.com  \r\n\nEXPERIENCE\n");
        let got: Vec<(&str, &str)> = lines
            .iter()
            .map(|l| (l.locator.as_str(), l.text.as_str()))
            .collect();
        assert_eq!(
            got,
            vec![
                ("text:line:1", "Jane Doe"),
                ("text:line:3", "jane@x.com"),
                ("text:line:5", "EXPERIENCE"),
            ]
        );
        assert!(lines.iter().all(|l| l.source_kind == SourceKind::Text));
    }

    #[test]
    fn test_whitespace_only_is_empty() {
        assert!(TextLineSource::new().lines_from_str(" \n\t\n").is_empty());
    }
}
