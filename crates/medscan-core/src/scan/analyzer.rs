//! Label analyzer
//!
//! Turns a label photo plus the patient's medication profile into an
//! [`ExtractionResult`]. Every failure collapses into the fixed fallback.

use super::photo::LabelImage;
use super::prompt::{build_extraction_prompt, response_schema};
use super::types::ExtractionResult;
use crate::llm::SharedProvider;
use crate::{MedscanError, Result};
use serde_json::Value;

/// How a scan ended
#[derive(Debug)]
pub enum ScanOutcome {
    /// The model produced a well-formed result
    Extracted(ExtractionResult),
    /// Something failed; `reason` says what
    Fallback { reason: MedscanError },
}

impl ScanOutcome {
    /// Collapse to the external shape
    pub fn into_result(self) -> ExtractionResult {
        match self {
            ScanOutcome::Extracted(result) => result,
            ScanOutcome::Fallback { .. } => ExtractionResult::fallback(),
        }
    }
}

/// Extraction orchestrator
pub struct LabelAnalyzer {
    provider: SharedProvider,
    schema: Value,
}

impl LabelAnalyzer {
    pub fn new(provider: SharedProvider) -> Self {
        Self {
            provider,
            schema: response_schema(),
        }
    }

    /// Analyze a label photo. Never fails; see [`ExtractionResult::fallback`].
    pub fn analyze_image(&self, image_bytes: Vec<u8>, medication_profile: &str) -> ExtractionResult {
        let outcome = self.analyze(image_bytes, medication_profile);
        if let ScanOutcome::Fallback { reason } = &outcome {
            tracing::warn!(error = %reason, "Label analysis failed, returning fallback");
        }
        outcome.into_result()
    }

    /// Analyze a label photo, keeping the failure reason.
    pub fn analyze(&self, image_bytes: Vec<u8>, medication_profile: &str) -> ScanOutcome {
        match self.try_analyze(image_bytes, medication_profile) {
            Ok(result) => ScanOutcome::Extracted(result),
            Err(reason) => ScanOutcome::Fallback { reason },
        }
    }

    fn try_analyze(&self, image_bytes: Vec<u8>, medication_profile: &str) -> Result<ExtractionResult> {
        let image = LabelImage::decode(image_bytes)?;
        let (width, height) = image.dimensions();
        let _span = tracing::info_span!(
            "label_scan",
            provider = self.provider.id(),
            mime = image.mime_type(),
            width,
            height,
            bytes = image.byte_len(),
        )
        .entered();
        let start = std::time::Instant::now();

        let prompt = build_extraction_prompt(medication_profile);
        let text = self
            .provider
            .generate_structured(&prompt, image.inline(), &self.schema)?;
        let result = parse_extraction_response(&text)?;

        tracing::info!(
            elapsed_ms = %start.elapsed().as_millis(),
            medications = result.medications.len(),
            status = %result.safety_audit.ui_status,
            caregiver_alert = result.caregiver_alert().is_some(),
            "Label analysis complete"
        );

        Ok(result)
    }
}

/// Parse the model's JSON answer into a result.
///
/// A surrounding Markdown code fence is tolerated. `color_hex` is rewritten
/// from `ui_status`.
pub fn parse_extraction_response(content: &str) -> Result<ExtractionResult> {
    let clean_content = content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let mut result: ExtractionResult = serde_json::from_str(clean_content)?;
    result.safety_audit.normalize_color();
    Ok(result)
}
