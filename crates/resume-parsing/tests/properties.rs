//! Invariants that hold for any document: stable normalization, evidence
//! drawn from original text, locked single-line fields and a monotonic
//! quality tier.

use resume_parsing::confidence::quality_tier;
use resume_parsing::normalize::normalize;
use resume_parsing::{parse, Line, SourceKind, FIELD_KEYS};

fn doc(texts: &[&str]) -> Vec<Line> {
    texts
        .iter()
        .enumerate()
        .map(|(i, t)| Line::new(*t, format!("pdf:page:1:line:{}", i + 1), SourceKind::Pdf))
        .collect()
}

const MESSY: &[&str] = &[
    "J A N E   D O E",
    "SanDiego,California | jane@x.com | (619)555-0199",
    "github.com/janedoe",
    "PROFESSIONAL EXPERIENCE",
    "NEODENT:TERRITORYMANAGER",
    "San Diego, CA 2019 - Present",
    "• Won backalarge account duetoa new plan",
    "• Grew sales inthe region by 30%",
    "Globex Corporation",
    "Account Executive 2016 - 2019",
    "• Exceeded quota",
    "EDUCATION",
    "San Diego State University: B.S. in Business 2012 - 2016",
    "Skills: Prospecting, Salesforce",
];

#[test]
fn normalization_is_idempotent() {
    for text in MESSY {
        let once = normalize(text);
        assert_eq!(normalize(&once), once, "not stable for {:?}", text);
    }
}

#[test]
fn evidence_comes_from_original_lines() {
    let lines = doc(MESSY);
    let response = parse(&lines).unwrap();

    for key in FIELD_KEYS {
        let items = &response.evidence_map[key];
        for item in items {
            assert!(
                lines.iter().any(|l| l.text.contains(&item.text) && l.locator == item.locator),
                "evidence for {} not from an input line: {:?}",
                key,
                item
            );
            assert!((0.0..=1.0).contains(&item.confidence));
        }
    }

    let profile = &response.candidate_profile;
    let present = [
        ("full_name", profile.full_name.is_some()),
        ("email", profile.email.is_some()),
        ("phone", profile.phone.is_some()),
        ("location", profile.location.is_some()),
        ("links", !profile.links.is_empty()),
        ("skills", !profile.skills.is_empty()),
        ("experiences", !profile.experiences.is_empty()),
        ("education", !profile.education.is_empty()),
    ];
    for (key, has_value) in present {
        if has_value {
            assert!(!response.evidence_map[key].is_empty(), "no evidence for {}", key);
        } else {
            assert!(response.evidence_map[key].is_empty(), "stray evidence for {}", key);
        }
    }
}

#[test]
fn every_field_has_a_score() {
    let response = parse(&doc(MESSY)).unwrap();
    for key in FIELD_KEYS {
        let score = &response.confidence_scores[key];
        assert_eq!(score.field_name, key);
        assert!((0.0..=1.0).contains(&score.confidence));
        assert_eq!(score.required, ["full_name", "email", "phone"].contains(&key));
    }
}

#[test]
fn parsing_is_deterministic() {
    let lines = doc(MESSY);
    assert_eq!(parse(&lines).unwrap(), parse(&lines).unwrap());
}

#[test]
fn single_line_company_is_never_overwritten() {
    let lines = doc(&[
        "EXPERIENCE",
        "ACME CORP: TERRITORY MANAGER: NEW YORK",
        "Globex Corporation, Boston, MA",
        "Regional Sales Director",
    ]);
    let response = parse(&lines).unwrap();
    let first = &response.candidate_profile.experiences[0];
    assert_eq!(first.company.as_deref(), Some("ACME CORP"));
    assert_eq!(first.job_title.as_deref(), Some("TERRITORY MANAGER"));
    assert_eq!(first.location.as_deref(), Some("NEW YORK"));
}

#[test]
fn quality_tier_is_monotonic() {
    let steps: Vec<f64> = (0..=20).map(|i| i as f64 / 20.0).collect();
    for &fixed_a in &steps {
        for &fixed_b in &steps {
            let mut last = quality_tier(0.0, fixed_a, fixed_b);
            for &x in &steps {
                let tier = quality_tier(x, fixed_a, fixed_b);
                assert!(tier >= last);
                last = tier;
            }
        }
    }
}
