use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub parsing: Option<ParsingSection>,
    pub output: Option<OutputSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsingSection {
    /// Extra lines never accepted as a candidate name (case-insensitive).
    pub header_blacklist: Option<Vec<String>>,
    /// Extra headers that end the experience section.
    pub section_headers: Option<Vec<String>>,
    /// Lines scanned above the email line for a name.
    pub name_window: Option<usize>,
    /// Lines scanned from the top when the window finds nothing.
    pub top_scan_lines: Option<usize>,
    pub min_achievement_len: Option<usize>,
    pub max_achievement_len: Option<usize>,
    pub company_match_threshold: Option<f64>,
    pub repair_achievements: Option<bool>,
    pub time_budget_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSection {
    pub color: Option<bool>,
    pub json: Option<bool>,
}

/// Platform config directory path: `<config_dir>/resume-parser/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("resume-parser").join("config.toml"))
}

/// Load config by cascading CWD `.resume-parser.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(&PathBuf::from(".resume-parser.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &PathBuf) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let bp = base.parsing.as_ref();
    let op = overlay.parsing.as_ref();
    let bo = base.output.as_ref();
    let oo = overlay.output.as_ref();

    ConfigFile {
        parsing: Some(ParsingSection {
            header_blacklist: op
                .and_then(|p| p.header_blacklist.clone())
                .or_else(|| bp.and_then(|p| p.header_blacklist.clone())),
            section_headers: op
                .and_then(|p| p.section_headers.clone())
                .or_else(|| bp.and_then(|p| p.section_headers.clone())),
            name_window: op
                .and_then(|p| p.name_window)
                .or_else(|| bp.and_then(|p| p.name_window)),
            top_scan_lines: op
                .and_then(|p| p.top_scan_lines)
                .or_else(|| bp.and_then(|p| p.top_scan_lines)),
            min_achievement_len: op
                .and_then(|p| p.min_achievement_len)
                .or_else(|| bp.and_then(|p| p.min_achievement_len)),
            max_achievement_len: op
                .and_then(|p| p.max_achievement_len)
                .or_else(|| bp.and_then(|p| p.max_achievement_len)),
            company_match_threshold: op
                .and_then(|p| p.company_match_threshold)
                .or_else(|| bp.and_then(|p| p.company_match_threshold)),
            repair_achievements: op
                .and_then(|p| p.repair_achievements)
                .or_else(|| bp.and_then(|p| p.repair_achievements)),
            time_budget_ms: op
                .and_then(|p| p.time_budget_ms)
                .or_else(|| bp.and_then(|p| p.time_budget_ms)),
        }),
        output: Some(OutputSection {
            color: oo.and_then(|o| o.color).or_else(|| bo.and_then(|o| o.color)),
            json: oo.and_then(|o| o.json).or_else(|| bo.and_then(|o| o.json)),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_toml() {
        let toml_str = r#"
[parsing]
name_window = 4
header_blacklist = ["curriculum vitae"]
"#;
        let config: ConfigFile = toml::from_str(toml_str).unwrap();
        let parsing = config.parsing.unwrap();
        assert_eq!(parsing.name_window, Some(4));
        assert_eq!(
            parsing.header_blacklist,
            Some(vec!["curriculum vitae".to_string()])
        );
        assert!(parsing.time_budget_ms.is_none());
        assert!(config.output.is_none());
    }

    #[test]
    fn test_empty_toml() {
        let config: ConfigFile = toml::from_str("").unwrap();
        assert!(config.parsing.is_none());
        assert!(config.output.is_none());
    }

    #[test]
    fn test_roundtrip() {
        let config = ConfigFile {
            parsing: Some(ParsingSection {
                top_scan_lines: Some(12),
                repair_achievements: Some(false),
                ..Default::default()
            }),
            output: Some(OutputSection {
                color: Some(false),
                json: Some(true),
            }),
        };
        let text = toml::to_string_pretty(&config).unwrap();
        let back: ConfigFile = toml::from_str(&text).unwrap();
        let parsing = back.parsing.unwrap();
        assert_eq!(parsing.top_scan_lines, Some(12));
        assert_eq!(parsing.repair_achievements, Some(false));
        assert_eq!(back.output.unwrap().json, Some(true));
    }

    #[test]
    fn test_merge_overlay_wins() {
        let base = ConfigFile {
            parsing: Some(ParsingSection {
                name_window: Some(3),
                time_budget_ms: Some(500),
                ..Default::default()
            }),
            output: Some(OutputSection {
                color: Some(true),
                json: None,
            }),
        };
        let overlay = ConfigFile {
            parsing: Some(ParsingSection {
                name_window: Some(5),
                ..Default::default()
            }),
            output: None,
        };

        let merged = merge(base, overlay);
        let parsing = merged.parsing.unwrap();
        assert_eq!(parsing.name_window, Some(5));
        assert_eq!(parsing.time_budget_ms, Some(500));
        assert_eq!(merged.output.unwrap().color, Some(true));
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[output]\ncolor = false\n").unwrap();

        let config = load_from_path(&path).unwrap();
        assert_eq!(config.output.unwrap().color, Some(false));

        let missing = dir.path().join("missing.toml");
        assert!(load_from_path(&missing).is_none());
    }
}
