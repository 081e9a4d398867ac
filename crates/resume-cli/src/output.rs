use std::io::Write;

use owo_colors::OwoColorize;
use resume_core::{ConfidenceMap, EducationEntry, ExperienceEntry, ParseQuality, ParseResponse};
use resume_parsing::NormalizedLine;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print the contact block and the overall quality.
pub fn print_profile(
    w: &mut dyn Write,
    file_name: &str,
    response: &ParseResponse,
    color: ColorMode,
) -> std::io::Result<()> {
    let profile = &response.candidate_profile;
    let quality = response.parse_quality.to_string().to_uppercase();

    if color.enabled() {
        let quality = match response.parse_quality {
            ParseQuality::High => quality.green().bold().to_string(),
            ParseQuality::Medium => quality.yellow().bold().to_string(),
            ParseQuality::Low => quality.red().bold().to_string(),
        };
        writeln!(w, "{} {} ({} quality)", "PARSED:".bold().cyan(), file_name.bold(), quality)?;
    } else {
        writeln!(w, "PARSED: {} ({} quality)", file_name, quality)?;
    }
    writeln!(w)?;

    let rows = [
        ("Name", profile.full_name.as_deref()),
        ("Email", profile.email.as_deref()),
        ("Phone", profile.phone.as_deref()),
        ("Location", profile.location.as_deref()),
    ];
    for (label, value) in rows {
        print_field(w, label, value, color)?;
    }
    if !profile.links.is_empty() {
        writeln!(w, "  {:<9} {}", "Links:", profile.links.join(", "))?;
    }
    if !profile.skills.is_empty() {
        writeln!(w, "  {:<9} {}", "Skills:", profile.skills.join(", "))?;
    }
    writeln!(w)?;
    Ok(())
}

fn print_field(
    w: &mut dyn Write,
    label: &str,
    value: Option<&str>,
    color: ColorMode,
) -> std::io::Result<()> {
    let label = format!("{}:", label);
    match value {
        Some(v) => writeln!(w, "  {:<9} {}", label, v),
        None if color.enabled() => writeln!(w, "  {:<9} {}", label, "(not found)".dimmed()),
        None => writeln!(w, "  {:<9} (not found)", label),
    }
}

fn date_span(start: Option<&str>, end: Option<&str>) -> Option<String> {
    match (start, end) {
        (Some(s), Some(e)) => Some(format!("{} - {}", s, e)),
        (Some(s), None) => Some(s.to_string()),
        (None, Some(e)) => Some(e.to_string()),
        (None, None) => None,
    }
}

/// Print every experience entry with its achievements.
pub fn print_experiences(
    w: &mut dyn Write,
    entries: &[ExperienceEntry],
    color: ColorMode,
) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{} ({})", "Experience".bold(), entries.len())?;
    } else {
        writeln!(w, "Experience ({})", entries.len())?;
    }

    for (i, entry) in entries.iter().enumerate() {
        let heading = [entry.job_title.as_deref(), entry.company.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" at ");
        let heading = if heading.is_empty() { "(untitled)".to_string() } else { heading };

        if color.enabled() {
            writeln!(w, "  {} {}", format!("[{}]", i + 1).bold().yellow(), heading)?;
        } else {
            writeln!(w, "  [{}] {}", i + 1, heading)?;
        }
        if let Some(location) = &entry.location {
            writeln!(w, "      Location: {}", location)?;
        }
        if let Some(dates) = date_span(entry.start_date.as_deref(), entry.end_date.as_deref()) {
            writeln!(w, "      Dates:    {}", dates)?;
        }
        for achievement in &entry.achievements {
            writeln!(w, "      - {}", achievement)?;
        }
    }
    writeln!(w)?;
    Ok(())
}

/// Print every education entry.
pub fn print_education(
    w: &mut dyn Write,
    entries: &[EducationEntry],
    color: ColorMode,
) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{} ({})", "Education".bold(), entries.len())?;
    } else {
        writeln!(w, "Education ({})", entries.len())?;
    }

    for (i, entry) in entries.iter().enumerate() {
        let institution = entry.institution.as_deref().unwrap_or("(unknown institution)");
        if color.enabled() {
            writeln!(w, "  {} {}", format!("[{}]", i + 1).bold().yellow(), institution)?;
        } else {
            writeln!(w, "  [{}] {}", i + 1, institution)?;
        }
        match (&entry.degree, &entry.field_of_study) {
            (Some(degree), Some(field)) => writeln!(w, "      Degree:   {} in {}", degree, field)?,
            (Some(degree), None) => writeln!(w, "      Degree:   {}", degree)?,
            (None, Some(field)) => writeln!(w, "      Field:    {}", field)?,
            (None, None) => {}
        }
        if let Some(dates) = date_span(entry.start_date.as_deref(), entry.end_date.as_deref()) {
            writeln!(w, "      Dates:    {}", dates)?;
        }
        if let Some(gpa) = &entry.gpa {
            writeln!(w, "      GPA:      {}", gpa)?;
        }
        for detail in &entry.details {
            writeln!(w, "      - {}", detail)?;
        }
    }
    writeln!(w)?;
    Ok(())
}

/// Print the per-field confidence table.
pub fn print_confidence(
    w: &mut dyn Write,
    scores: &ConfidenceMap,
    color: ColorMode,
) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{}", "Confidence".bold())?;
    } else {
        writeln!(w, "Confidence")?;
    }

    for (field, score) in scores {
        let value = format!("{:.2}", score.confidence);
        let marker = if score.required { "*" } else { " " };
        if color.enabled() {
            let value = if score.confidence >= 0.85 {
                value.green().to_string()
            } else if score.confidence >= 0.65 {
                value.yellow().to_string()
            } else {
                value.red().to_string()
            };
            writeln!(
                w,
                "  {}{:<12} {}  {}",
                marker,
                field,
                value,
                score.extraction_method.dimmed()
            )?;
        } else {
            writeln!(
                w,
                "  {}{:<12} {}  {}",
                marker, field, value, score.extraction_method
            )?;
        }
    }
    writeln!(w)?;
    Ok(())
}

/// Print parse warnings, if any.
pub fn print_warnings(w: &mut dyn Write, warnings: &[String], color: ColorMode) -> std::io::Result<()> {
    for warning in warnings {
        if color.enabled() {
            writeln!(w, "{} {}", "WARNING:".yellow(), warning)?;
        } else {
            writeln!(w, "WARNING: {}", warning)?;
        }
    }
    Ok(())
}

/// Dump the normalized line view for debugging extraction.
pub fn print_lines(
    w: &mut dyn Write,
    lines: &[NormalizedLine<'_>],
    color: ColorMode,
) -> std::io::Result<()> {
    for line in lines {
        if color.enabled() {
            writeln!(w, "{}  {}", line.original.locator.dimmed(), line.original.text)?;
        } else {
            writeln!(w, "{}  {}", line.original.locator, line.original.text)?;
        }
        if line.search_text != line.original.text {
            if color.enabled() {
                writeln!(w, "    {} {}", "search:".cyan(), line.search_text)?;
            } else {
                writeln!(w, "    search: {}", line.search_text)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use resume_core::{CandidateProfile, FieldConfidence};

    fn response() -> ParseResponse {
        let mut scores = ConfidenceMap::new();
        scores.insert(
            "email".to_string(),
            FieldConfidence {
                field_name: "email".to_string(),
                confidence: 1.0,
                extraction_method: "regex_exact_single".to_string(),
                reasons: vec![],
                required: true,
            },
        );
        ParseResponse {
            candidate_profile: CandidateProfile {
                full_name: Some("Jane Doe".to_string()),
                email: Some("jane@x.com".to_string()),
                experiences: vec![ExperienceEntry {
                    company: Some("ACME CORP".to_string()),
                    job_title: Some("TERRITORY MANAGER".to_string()),
                    start_date: Some("January 2024".to_string()),
                    end_date: Some("Present".to_string()),
                    ..Default::default()
                }],
                ..Default::default()
            },
            evidence_map: Default::default(),
            confidence_scores: scores,
            parse_quality: ParseQuality::Medium,
            warnings: vec!["Experience section not found".to_string()],
        }
    }

    fn render(f: impl FnOnce(&mut dyn Write) -> std::io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_profile_plain() {
        let r = response();
        let out = render(|w| print_profile(w, "resume.pdf", &r, ColorMode(false)));
        assert!(out.starts_with("PARSED: resume.pdf (MEDIUM quality)"));
        assert!(out.contains("Name:     Jane Doe"));
        assert!(out.contains("Phone:    (not found)"));
    }

    #[test]
    fn test_experience_heading_and_dates() {
        let r = response();
        let out = render(|w| print_experiences(w, &r.candidate_profile.experiences, ColorMode(false)));
        assert!(out.contains("[1] TERRITORY MANAGER at ACME CORP"));
        assert!(out.contains("Dates:    January 2024 - Present"));
    }

    #[test]
    fn test_confidence_marks_required() {
        let r = response();
        let out = render(|w| print_confidence(w, &r.confidence_scores, ColorMode(false)));
        assert!(out.contains("*email        1.00  regex_exact_single"));
    }

    #[test]
    fn test_warnings() {
        let r = response();
        let out = render(|w| print_warnings(w, &r.warnings, ColorMode(false)));
        assert_eq!(out, "WARNING: Experience section not found\n");
    }
}
