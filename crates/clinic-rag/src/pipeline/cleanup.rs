//! Cleanup and repair of model output
//!
//! Hosted models wrap JSON in Markdown code fences, chat around it, or emit
//! trailing commas. Parsing here is tolerant by construction: strip fences,
//! try, repair, try again, and fall back to a fixed shape rather than fail
//! the request.

use regex::Regex;
use std::sync::OnceLock;

use crate::types::summary::{ArtifactSummary, PrescriptionSummary, UnparsedSummary, XrayFindings};

/// Remove Markdown code-fence markers and surrounding whitespace
pub fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

/// Remove trailing commas before a closing brace or bracket
pub fn strip_trailing_commas(text: &str) -> String {
    static TRAILING_COMMA: OnceLock<Regex> = OnceLock::new();
    let re = TRAILING_COMMA.get_or_init(|| Regex::new(r",\s*([}\]])").expect("valid regex"));
    re.replace_all(text, "$1").into_owned()
}

/// Parse an LLM reply into a prescription summary.
///
/// On parse failure returns the `Unparsed` fallback carrying the cleaned
/// text, so ingestion never aborts on malformed model output.
pub fn parse_prescription_summary(raw: &str) -> ArtifactSummary {
    let cleaned = strip_code_fences(raw);

    match serde_json::from_str::<PrescriptionSummary>(&cleaned) {
        Ok(summary) => ArtifactSummary::Prescription(summary),
        Err(e) => {
            tracing::warn!("Prescription summary was not valid JSON: {}", e);
            ArtifactSummary::Unparsed(UnparsedSummary {
                note: "Analysis complete.".to_string(),
                raw_text: cleaned,
            })
        }
    }
}

/// Parse a vision reply into X-ray findings.
///
/// One repair attempt removes trailing commas before re-parsing; if the text
/// is still unparseable the fixed "Analysis Failed" result is returned.
pub fn parse_xray_findings(raw: &str) -> XrayFindings {
    let cleaned = strip_code_fences(raw);

    if let Ok(findings) = serde_json::from_str::<XrayFindings>(&cleaned) {
        return findings;
    }

    let repaired = strip_trailing_commas(&cleaned);
    match serde_json::from_str::<XrayFindings>(&repaired) {
        Ok(findings) => {
            tracing::debug!("X-ray reply parsed after trailing-comma repair");
            findings
        }
        Err(e) => {
            tracing::warn!("X-ray reply unparseable even after repair: {}", e);
            XrayFindings::analysis_failed(cleaned)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fences_and_whitespace() {
        let raw = "```json\n{\"finding\": \"ok\"}\n```";
        assert_eq!(strip_code_fences(raw), "{\"finding\": \"ok\"}");
    }

    #[test]
    fn strips_trailing_commas_in_objects_and_arrays() {
        let raw = r#"{"medicines": ["a", "b",], "advice": "rest",}"#;
        let repaired = strip_trailing_commas(raw);
        assert!(serde_json::from_str::<serde_json::Value>(&repaired).is_ok());
    }

    #[test]
    fn prescription_parse_accepts_fenced_json() {
        let raw = r#"```json
        {
            "patient_summary": "Upper respiratory infection.",
            "differential_diagnoses": ["1. Most likely: Viral URI (seasonal)"],
            "medicines": ["Azithromycin 500mg"],
            "advice": "Hydration and rest."
        }
        ```"#;

        match parse_prescription_summary(raw) {
            ArtifactSummary::Prescription(s) => {
                assert_eq!(s.patient_summary, "Upper respiratory infection.");
                assert_eq!(s.medicines.len(), 1);
            }
            other => panic!("expected parsed prescription, got {:?}", other),
        }
    }

    #[test]
    fn prescription_parse_never_fails_on_chatter() {
        let raw = "Sure! Here is the summary you asked for: the patient has a cold.";

        match parse_prescription_summary(raw) {
            ArtifactSummary::Unparsed(u) => {
                assert_eq!(u.note, "Analysis complete.");
                assert!(u.raw_text.contains("the patient has a cold"));
            }
            other => panic!("expected unparsed fallback, got {:?}", other),
        }
    }

    #[test]
    fn xray_parse_repairs_trailing_comma() {
        let raw = r#"```json
        {
            "finding": "Radius Fracture",
            "location": "Distal 1/3rd of the radius",
            "severity": "Moderate",
            "treatment_plan": ["Splint the forearm", "Refer to orthopedics",],
            "is_normal": false,
        }
        ```"#;

        let findings = parse_xray_findings(raw);
        assert_eq!(findings.finding, "Radius Fracture");
        assert_eq!(findings.treatment_plan.len(), 2);
        assert!(!findings.is_normal);
    }

    #[test]
    fn xray_parse_falls_back_on_irrecoverable_input() {
        let raw = "I am unable to identify a fracture here, sorry.";

        let findings = parse_xray_findings(raw);
        assert_eq!(findings.finding, "Analysis Failed");
        assert_eq!(findings.notes.as_deref(), Some(raw));
    }
}
