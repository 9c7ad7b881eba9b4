//! Prompt templates for the ingestion and query pipelines

/// Verbatim transcription instruction for prescription images.
/// Text-only output; the structured summary is a second, separate call.
pub const TRANSCRIBE_PROMPT: &str =
    "Transcribe this medical document exactly. Output ONLY the text found.";

/// Radiologist instruction for X-ray images, requesting the fixed JSON
/// schema directly.
pub const XRAY_PROMPT: &str = r#"You are an expert Radiologist and Orthopedic Surgeon.
Analyze this medical scan.

TASK:
1. DETECT: Identify any fractures, dislocations, or abnormalities.
2. LOCATE: Specifically describe WHERE the problem is (e.g., "Distal 1/3rd of the radius").
3. PRESCRIBE: Suggest standard immediate treatment guidelines (First Aid/Splinting) and next steps.

OUTPUT FORMAT (Return ONLY raw JSON):
{
    "finding": "Short medical diagnosis (e.g., Tibia Fracture)",
    "location": "Specific location description",
    "severity": "Low / Moderate / Severe",
    "treatment_plan": [
        "Step 1: ...",
        "Step 2: ..."
    ],
    "notes": "Optional free-form observations",
    "is_normal": false
}

If the image is normal, set "is_normal": true and "finding": "No abnormalities detected"."#;

/// Fixed prefix marking an answer that comes from general knowledge rather
/// than the patient's own records.
pub const GENERAL_GUIDANCE_PREFIX: &str = "General guidance (not patient-specific):";

/// Build the structured-summary prompt from a transcription
pub fn summary_prompt(extracted_text: &str) -> String {
    format!(
        r#"You are an expert medical AI. Analyze the following extracted medical text.

EXTRACTED TEXT:
{extracted_text}

OUTPUT FORMAT (Return ONLY raw JSON):
{{
    "patient_summary": "Brief summary of the document",
    "differential_diagnoses": [
        "1. Most likely: [Condition] (Reason)",
        "2. Potential alternative: [Condition] (Reason)"
    ],
    "medicines": ["List of medicines found"],
    "advice": "Non-medicine advice"
}}"#
    )
}

/// Build the chat prompt: context-grounded, with an explicitly licensed and
/// prefixed general-knowledge fallback when the context does not suffice.
pub fn chat_prompt(context: &str, question: &str) -> String {
    format!(
        r#"You are a clinical assistant supporting a doctor during a patient visit.

Use the patient context below to answer the doctor's question.
1. Prefer the context: when it contains the answer, every statement must be traceable to it.
2. Only when the context is insufficient may you answer from general medical knowledge,
   and that answer MUST start with "{GENERAL_GUIDANCE_PREFIX}".
3. Answer in concise natural language. No code fences, no JSON.

PATIENT CONTEXT:
{context}

QUESTION: {question}"#
    )
}

/// Concatenate retrieved texts into the prompt context block
pub fn build_context(texts: &[String]) -> String {
    texts.join("\n\n---\n\n")
}
