//! Label scanning
//!
//! The extraction orchestrator: photo + medication profile in, structured
//! medications and a safety audit out.

mod analyzer;
mod photo;
mod prompt;
mod types;

pub use analyzer::{parse_extraction_response, LabelAnalyzer, ScanOutcome};
pub use photo::LabelImage;
pub use prompt::{build_extraction_prompt, profile_context, response_schema};
pub use types::{
    CaregiverAlert, DosageSchedule, ExtractionResult, MedicationRecord, SafetyAudit, UiStatus,
    FALLBACK_ALERT_BODY, FALLBACK_ALERT_TITLE, FALLBACK_RAW_TEXT,
};
