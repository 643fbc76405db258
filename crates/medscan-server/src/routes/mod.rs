//! API route handlers

use axum::{
    extract::{Multipart, State},
    Json,
};
use medscan_core::{
    caregiver_message, dispatch_caregiver_alert, ChatContext, ExtractionResult,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

/// Chat reply when the question could not be handled at all
pub const CHAT_UNAVAILABLE_REPLY: &str = "Sorry, I couldn't process that question.";

// ========== Form Parsing ==========

/// Fields of the `/analyze` form
#[derive(Debug, Default)]
struct AnalyzeForm {
    file: Option<Vec<u8>>,
    current_meds: Option<String>,
    emergency_contact: Option<String>,
}

/// Fields of the `/chat` form
#[derive(Debug, Default)]
struct ChatForm {
    message: Option<String>,
    context: Option<String>,
}

async fn read_analyze_form(mut multipart: Multipart) -> Result<AnalyzeForm, ApiError> {
    let mut form = AnalyzeForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => form.file = Some(field.bytes().await?.to_vec()),
            "current_meds" => form.current_meds = Some(field.text().await?),
            "emergency_contact" => form.emergency_contact = Some(field.text().await?),
            other => tracing::debug!(field = other, "Ignoring unknown form field"),
        }
    }

    Ok(form)
}

async fn read_chat_form(mut multipart: Multipart) -> Result<ChatForm, ApiError> {
    let mut form = ChatForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "message" => form.message = Some(field.text().await?),
            "context" => form.context = Some(field.text().await?),
            other => tracing::debug!(field = other, "Ignoring unknown form field"),
        }
    }

    Ok(form)
}

// ========== Analysis Route ==========

/// Analyze a label photo and alert the caregiver if the result asks for it
pub async fn analyze_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ExtractionResult>, ApiError> {
    let form = read_analyze_form(multipart).await?;

    let emergency_contact = form
        .emergency_contact
        .ok_or(ApiError::MissingField("emergency_contact"))?;
    let image = form.file.ok_or(ApiError::MissingField("file"))?;
    let current_meds = form.current_meds.unwrap_or_default();

    tracing::info!(
        image_bytes = image.len(),
        has_profile = !current_meds.is_empty(),
        has_contact = !emergency_contact.is_empty(),
        "Analyzing label"
    );

    let analyzer = state.analyzer.clone();
    let result = tokio::task::spawn_blocking(move || analyzer.analyze_image(image, &current_meds))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    if let Some(message) = caregiver_message(&result, &emergency_contact) {
        dispatch_caregiver_alert(state.alerts.clone(), message, emergency_contact);
    }

    Ok(Json(result))
}

// ========== Chat Route ==========

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

impl ChatReply {
    fn unavailable() -> Self {
        Self {
            reply: CHAT_UNAVAILABLE_REPLY.to_string(),
        }
    }
}

/// Answer a question about a previous scan
///
/// Once both fields are present this always answers 200, with a canned reply
/// when the context is unusable or the chat task dies.
pub async fn chat(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ChatReply>, ApiError> {
    let form = read_chat_form(multipart).await?;

    let message = form.message.ok_or(ApiError::MissingField("message"))?;
    let context = form.context.ok_or(ApiError::MissingField("context"))?;

    let context = match ChatContext::parse(&context) {
        Ok(context) => context,
        Err(e) => {
            tracing::warn!(error = %e, "Rejecting chat context");
            return Ok(Json(ChatReply::unavailable()));
        }
    };

    let pharmacist = state.chat.clone();
    let reply = tokio::task::spawn_blocking(move || {
        pharmacist.chat_about_medicine(&[], &message, &context)
    })
    .await;

    match reply {
        Ok(reply) => Ok(Json(ChatReply { reply })),
        Err(e) => {
            tracing::error!(error = %e, "Chat task failed");
            Ok(Json(ChatReply::unavailable()))
        }
    }
}
