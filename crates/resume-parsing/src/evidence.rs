//! Evidence map assembly.

use resume_core::{EvidenceItem, EvidenceMap, Line, FIELD_KEYS};

/// Collects evidence per field and freezes it into an [`EvidenceMap`].
///
/// Every field key is present from the start. Items always carry the
/// original line text, and a repeated locator/text pair is stored once.
#[derive(Debug, Clone)]
pub struct EvidenceAssembler {
    map: EvidenceMap,
}

impl Default for EvidenceAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl EvidenceAssembler {
    pub fn new() -> Self {
        Self {
            map: FIELD_KEYS
                .iter()
                .map(|key| (key.to_string(), Vec::new()))
                .collect(),
        }
    }

    /// Record `line` as evidence for `field`.
    pub fn add(&mut self, field: &str, line: &Line, confidence: f64) {
        let items = self.map.entry(field.to_string()).or_default();
        if items
            .iter()
            .any(|item| item.locator == line.locator && item.text == line.text)
        {
            return;
        }
        items.push(EvidenceItem {
            source: line.source_kind.into(),
            locator: line.locator.clone(),
            text: line.text.clone(),
            confidence,
        });
    }

    pub fn add_all<'l>(&mut self, field: &str, lines: impl IntoIterator<Item = &'l Line>, confidence: f64) {
        for line in lines {
            self.add(field, line, confidence);
        }
    }

    pub fn finish(self) -> EvidenceMap {
        self.map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resume_core::{EvidenceSource, SourceKind};

    #[test]
    fn test_all_keys_present() {
        let map = EvidenceAssembler::new().finish();
        assert_eq!(map.len(), FIELD_KEYS.len());
        assert!(map.values().all(Vec::is_empty));
    }

    #[test]
    fn test_dedup_by_locator_and_text() {
        let line = Line::new("jane@x.com", "pdf:page:1:line:2", SourceKind::Pdf);
        let other = Line::new("jane@x.com", "pdf:page:2:line:1", SourceKind::Pdf);
        let mut assembler = EvidenceAssembler::new();
        assembler.add("email", &line, 1.0);
        assembler.add("email", &line, 1.0);
        assembler.add("email", &other, 1.0);
        let map = assembler.finish();

        let email = &map["email"];
        assert_eq!(email.len(), 2);
        assert_eq!(email[0].source, EvidenceSource::Pdf);
        assert_eq!(email[0].text, "jane@x.com");
        assert_eq!(email[1].locator, "pdf:page:2:line:1");
    }

    #[test]
    fn test_add_all_keeps_order() {
        let lines = vec![
            Line::new("ACME CORP", "text:line:4", SourceKind::Text),
            Line::new("• Grew sales", "text:line:5", SourceKind::Text),
        ];
        let mut assembler = EvidenceAssembler::new();
        assembler.add_all("experiences", &lines, 0.85);
        let map = assembler.finish();
        let locators: Vec<&str> = map["experiences"].iter().map(|e| e.locator.as_str()).collect();
        assert_eq!(locators, vec!["text:line:4", "text:line:5"]);
    }
}
