//! Label scan result types
//!
//! The JSON shape returned to clients and requested from the model.

use serde::{Deserialize, Serialize};

/// Raw text used when the scan could not be completed
pub const FALLBACK_RAW_TEXT: &str = "Error processing image.";
pub const FALLBACK_ALERT_TITLE: &str = "Analysis Failed";
pub const FALLBACK_ALERT_BODY: &str = "Could not process image. Please try again.";

/// Overall severity of the interaction check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UiStatus {
    Safe,
    Caution,
    Danger,
}

impl UiStatus {
    pub const ALL: [UiStatus; 3] = [UiStatus::Safe, UiStatus::Caution, UiStatus::Danger];

    pub fn as_str(&self) -> &'static str {
        match self {
            UiStatus::Safe => "SAFE",
            UiStatus::Caution => "CAUTION",
            UiStatus::Danger => "DANGER",
        }
    }

    /// Display color for this status
    pub fn color_hex(&self) -> &'static str {
        match self {
            UiStatus::Safe => "#2E7D32",
            UiStatus::Caution => "#F9A825",
            UiStatus::Danger => "#C62828",
        }
    }
}

impl std::fmt::Display for UiStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When a medication should be taken
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DosageSchedule {
    pub morning: bool,
    pub afternoon: bool,
    pub evening: bool,
    pub night: bool,
    /// Free-text instruction, e.g. "after food"
    pub note: String,
}

/// One medication found on the label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationRecord {
    /// Name as printed (usually the brand)
    pub drug_name: String,
    /// Active ingredient
    pub generic_name: String,
    pub strength: Option<String>,
    pub form: String,
    pub dosage_schedule: DosageSchedule,
}

/// Outside notification request attached to severe findings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaregiverAlert {
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sms_message: Option<String>,
}

/// Worst interaction finding, summarised for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyAudit {
    pub ui_status: UiStatus,
    pub alert_title: String,
    pub alert_body: String,
    pub color_hex: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caregiver_alert: Option<CaregiverAlert>,
}

impl SafetyAudit {
    /// Build an audit whose color follows from `ui_status`
    pub fn new(ui_status: UiStatus, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            ui_status,
            alert_title: title.into(),
            alert_body: body.into(),
            color_hex: ui_status.color_hex().to_string(),
            caregiver_alert: None,
        }
    }

    /// Overwrite `color_hex` with the color for `ui_status`
    pub fn normalize_color(&mut self) {
        let expected = self.ui_status.color_hex();
        if self.color_hex != expected {
            tracing::debug!(
                status = %self.ui_status,
                got = %self.color_hex,
                expected,
                "Correcting color_hex"
            );
            self.color_hex = expected.to_string();
        }
    }
}

/// Structured result of a label scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Verbatim transcription of the label
    pub raw_text: String,
    pub medications: Vec<MedicationRecord>,
    pub safety_audit: SafetyAudit,
}

impl ExtractionResult {
    /// The fixed result returned whenever a scan fails
    pub fn fallback() -> Self {
        Self {
            raw_text: FALLBACK_RAW_TEXT.to_string(),
            medications: Vec::new(),
            safety_audit: SafetyAudit::new(
                UiStatus::Caution,
                FALLBACK_ALERT_TITLE,
                FALLBACK_ALERT_BODY,
            ),
        }
    }

    /// Caregiver alert, if the model asked for one
    pub fn caregiver_alert(&self) -> Option<&CaregiverAlert> {
        self.safety_audit
            .caregiver_alert
            .as_ref()
            .filter(|alert| alert.required)
    }
}
