//! Typed AI-produced summaries per artifact kind
//!
//! Model output is untrusted: every summary is either a fully parsed
//! structure or the explicit `Unparsed` fallback carrying the raw text.
//! Downstream code never sees an untyped map.

use serde::{Deserialize, Serialize};

/// Structured summary attached to a FileRecord
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArtifactSummary {
    Prescription(PrescriptionSummary),
    Xray(XrayFindings),
    /// The model reply could not be parsed; the raw (fence-stripped) text is kept
    Unparsed(UnparsedSummary),
}

impl ArtifactSummary {
    /// One chat-ready line describing the result, used for the synthetic
    /// message appended after an upload.
    pub fn chat_line(&self, filename: &str) -> String {
        match self {
            Self::Prescription(s) => {
                format!("Analyzed prescription '{}': {}", filename, s.patient_summary)
            }
            Self::Xray(f) => format!("Analyzed X-ray '{}': {}", filename, f.report_sentence()),
            Self::Unparsed(u) => format!(
                "Analyzed '{}': {} The raw model output was kept for review.",
                filename, u.note
            ),
        }
    }
}

/// Summary derived from a transcribed prescription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionSummary {
    /// Brief summary of the document
    pub patient_summary: String,
    /// Ranked differential diagnoses, most likely first
    #[serde(default)]
    pub differential_diagnoses: Vec<String>,
    /// Medicines found in the prescription
    #[serde(default)]
    pub medicines: Vec<String>,
    /// Non-medicine advice
    #[serde(default)]
    pub advice: Option<String>,
}

/// Findings extracted from an X-ray image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XrayFindings {
    /// Short medical diagnosis (e.g. "Tibia Fracture")
    pub finding: String,
    /// Where the problem is (e.g. "Distal 1/3rd of the radius")
    #[serde(default)]
    pub location: Option<String>,
    /// Low / Moderate / Severe
    #[serde(default)]
    pub severity: Option<String>,
    /// Immediate treatment guidance steps
    #[serde(default)]
    pub treatment_plan: Vec<String>,
    /// Free-form notes from the model
    #[serde(default)]
    pub notes: Option<String>,
    /// True when no abnormality was detected
    #[serde(default)]
    pub is_normal: bool,
}

impl XrayFindings {
    /// Fixed fallback returned when the model reply cannot be repaired
    /// into valid JSON. The raw reply is preserved in `notes`.
    pub fn analysis_failed(raw: String) -> Self {
        Self {
            finding: "Analysis Failed".to_string(),
            location: None,
            severity: None,
            treatment_plan: Vec::new(),
            notes: Some(raw),
            is_normal: false,
        }
    }

    /// Render the findings as one natural-language sentence. This is the
    /// text written to the vector store so X-rays become retrievable.
    pub fn report_sentence(&self) -> String {
        if self.is_normal {
            return "X-ray analysis: no abnormalities detected.".to_string();
        }

        let mut sentence = format!("X-ray analysis: {}", self.finding);
        if let Some(location) = &self.location {
            sentence.push_str(&format!(" at {}", location));
        }
        if let Some(severity) = &self.severity {
            sentence.push_str(&format!(", severity {}", severity));
        }
        sentence.push('.');
        sentence
    }
}

/// Fixed-shape fallback for unparseable model replies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnparsedSummary {
    /// Fixed note, e.g. "Analysis complete."
    pub note: String,
    /// The cleaned model reply, verbatim
    pub raw_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_sentence_includes_location_and_severity() {
        let findings = XrayFindings {
            finding: "Tibia Fracture".to_string(),
            location: Some("proximal third".to_string()),
            severity: Some("Moderate".to_string()),
            treatment_plan: vec!["Immobilize".to_string()],
            notes: None,
            is_normal: false,
        };

        assert_eq!(
            findings.report_sentence(),
            "X-ray analysis: Tibia Fracture at proximal third, severity Moderate."
        );
    }

    #[test]
    fn normal_scan_has_fixed_sentence() {
        let findings = XrayFindings {
            finding: "No abnormalities detected".to_string(),
            location: None,
            severity: None,
            treatment_plan: Vec::new(),
            notes: None,
            is_normal: true,
        };

        assert_eq!(
            findings.report_sentence(),
            "X-ray analysis: no abnormalities detected."
        );
    }

    #[test]
    fn analysis_failed_keeps_raw_reply() {
        let fallback = XrayFindings::analysis_failed("not even close to JSON".to_string());
        assert_eq!(fallback.finding, "Analysis Failed");
        assert_eq!(fallback.notes.as_deref(), Some("not even close to JSON"));
        assert!(!fallback.is_normal);
    }
}
