//! Extraction prompt and response schema

use serde_json::Value;

/// Describe the patient's existing medications for the prompt.
pub fn profile_context(medication_profile: &str) -> String {
    if medication_profile.is_empty() {
        "The patient has no other known current medications.".to_string()
    } else {
        format!("The patient is currently taking: **{}**", medication_profile)
    }
}

/// Build the extraction prompt sent alongside the label photo.
pub fn build_extraction_prompt(medication_profile: &str) -> String {
    let context = profile_context(medication_profile);
    let current = match medication_profile {
        "" => "none reported",
        profile => profile,
    };

    format!(
        r##"### ROLE
You are a clinical pharmacist who is also careful at reading printed labels.

### TASK
Examine the photographed prescription, box or bottle label.

### PATIENT CONTEXT
{context}

### STEPS
1. TRANSCRIBE: copy every piece of legible text on the label exactly as printed into "raw_text". Skip background clutter.
2. IDENTIFY: list every medication shown. Resolve brand names to the generic active ingredient (for example 'Crocin' -> 'Paracetamol').
3. SCHEDULE: from the directions, mark which of morning / afternoon / evening / night a dose is due and put any extra direction in "note".
4. SAFETY CHECK:
   - INTERNAL: do the medications in the photo interact with each other?
   - EXTERNAL: do they interact with the current medications ({current})?
   - REPORT: put the single worst finding in "safety_audit". Use "ui_status" SAFE, CAUTION or DANGER and the matching "color_hex" (SAFE #2E7D32, CAUTION #F9A825, DANGER #C62828). Explain the mechanism in "alert_body".
5. CAREGIVER: only when an EXTERNAL interaction is dangerous enough that someone looking after the patient must be told, add "caregiver_alert" with "required": true and a short "sms_message" under 160 characters. Otherwise leave "caregiver_alert" out.

### OUTPUT
Return only JSON with this shape:
{{
  "raw_text": "string",
  "medications": [
    {{
      "drug_name": "string (as printed, usually the brand)",
      "generic_name": "string (active ingredient)",
      "strength": "string or null",
      "form": "string",
      "dosage_schedule": {{
        "morning": true, "afternoon": false, "evening": false, "night": true,
        "note": "string"
      }}
    }}
  ],
  "safety_audit": {{
    "ui_status": "SAFE | CAUTION | DANGER",
    "alert_title": "string",
    "alert_body": "string",
    "color_hex": "#2E7D32 | #F9A825 | #C62828",
    "caregiver_alert": {{ "required": true, "sms_message": "string" }}
  }}
}}
If no medication is visible, return an empty "medications" list."##
    )
}

/// Response schema handed to the model's JSON mode.
pub fn response_schema() -> Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "raw_text": { "type": "STRING" },
            "medications": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "drug_name": { "type": "STRING" },
                        "generic_name": { "type": "STRING" },
                        "strength": { "type": "STRING", "nullable": true },
                        "form": { "type": "STRING" },
                        "dosage_schedule": {
                            "type": "OBJECT",
                            "properties": {
                                "morning": { "type": "BOOLEAN" },
                                "afternoon": { "type": "BOOLEAN" },
                                "evening": { "type": "BOOLEAN" },
                                "night": { "type": "BOOLEAN" },
                                "note": { "type": "STRING" }
                            },
                            "required": ["morning", "afternoon", "evening", "night", "note"]
                        }
                    },
                    "required": ["drug_name", "generic_name", "strength", "form", "dosage_schedule"]
                }
            },
            "safety_audit": {
                "type": "OBJECT",
                "properties": {
                    "ui_status": { "type": "STRING", "enum": ["SAFE", "CAUTION", "DANGER"] },
                    "alert_title": { "type": "STRING" },
                    "alert_body": { "type": "STRING" },
                    "color_hex": { "type": "STRING", "enum": ["#2E7D32", "#F9A825", "#C62828"] },
                    "caregiver_alert": {
                        "type": "OBJECT",
                        "properties": {
                            "required": { "type": "BOOLEAN" },
                            "sms_message": { "type": "STRING" }
                        },
                        "required": ["required"]
                    }
                },
                "required": ["ui_status", "alert_title", "alert_body", "color_hex"]
            }
        },
        "required": ["raw_text", "medications", "safety_audit"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::UiStatus;

    #[test]
    fn test_profile_context_with_meds() {
        assert_eq!(
            profile_context("Warfarin 5mg"),
            "The patient is currently taking: **Warfarin 5mg**"
        );
    }

    #[test]
    fn test_profile_context_empty() {
        assert_eq!(
            profile_context(""),
            "The patient has no other known current medications."
        );
    }

    #[test]
    fn test_profile_context_whitespace_is_not_empty() {
        assert_eq!(
            profile_context("   "),
            "The patient is currently taking: **   **"
        );
    }

    #[test]
    fn test_prompt_embeds_profile() {
        let prompt = build_extraction_prompt("Metformin");
        assert!(prompt.contains("currently taking: **Metformin**"));
        assert!(prompt.contains("current medications (Metformin)"));
        assert!(prompt.contains("\"raw_text\""));
    }

    #[test]
    fn test_prompt_without_profile() {
        let prompt = build_extraction_prompt("");
        assert!(prompt.contains("no other known current medications"));
        assert!(prompt.contains("(none reported)"));
    }

    #[test]
    fn test_prompt_lists_every_color() {
        let prompt = build_extraction_prompt("");
        for status in UiStatus::ALL {
            assert!(prompt.contains(&format!("{} {}", status, status.color_hex())));
        }
        assert!(prompt.contains(r##""color_hex": "#2E7D32 | #F9A825 | #C62828""##));
    }

    #[test]
    fn test_schema_status_enum_matches_type() {
        let schema = response_schema();
        let statuses = schema["properties"]["safety_audit"]["properties"]["ui_status"]["enum"]
            .as_array()
            .unwrap()
            .clone();
        let expected: Vec<Value> = UiStatus::ALL
            .iter()
            .map(|s| Value::String(s.as_str().to_string()))
            .collect();
        assert_eq!(statuses, expected);
    }
}
