//! Gemini (Google AI) LLM provider
//!
//! Talks to the `generateContent` endpoint of the Generative Language API.
//! Label extraction sends the photo as `inlineData` and asks for JSON output
//! constrained by a response schema; chat sends plain text.

use super::{InlineImage, LlmError, LlmProvider};
use crate::config::{ConfigError, LlmConfig};
use base64::Engine as _;
use serde_json::Value;
use std::time::Duration;

/// The key travels in this header so it never shows up in URLs or the
/// transport errors that echo them.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini provider for Google AI
pub struct GeminiProvider {
    /// API key
    api_key: String,

    /// Base URL for the API
    base_url: String,

    /// Model used for multimodal JSON extraction
    extraction_model: String,

    /// Model used for free-text chat
    chat_model: String,

    /// HTTP client, shared across requests
    agent: ureq::Agent,
}

impl GeminiProvider {
    /// Create a new Gemini provider using one model for both modes
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            extraction_model: model.to_string(),
            chat_model: model.to_string(),
            agent: ureq::Agent::new(),
        }
    }

    /// Build a provider from the `[llm]` config section.
    pub fn from_config(config: &LlmConfig) -> Result<Self, ConfigError> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        Ok(Self::new(api_key, &config.extraction_model)
            .with_base_url(&config.base_url)
            .with_chat_model(&config.chat_model)
            .with_timeout(Duration::from_secs(config.timeout)))
    }

    /// Create with a specific base URL
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Use a different model for chat
    pub fn with_chat_model(mut self, model: &str) -> Self {
        self.chat_model = model.to_string();
        self
    }

    /// Set the overall per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = ureq::AgentBuilder::new().timeout(timeout).build();
        self
    }

    pub fn extraction_model(&self) -> &str {
        &self.extraction_model
    }

    pub fn chat_model(&self) -> &str {
        &self.chat_model
    }

    /// List the model names this key can call (e.g. `models/gemini-2.5-flash`)
    pub fn list_models(&self) -> Result<Vec<String>, LlmError> {
        let url = format!("{}/v1beta/models", self.base_url);
        let json: Value = self
            .agent
            .get(&url)
            .set(API_KEY_HEADER, &self.api_key)
            .call()?
            .into_json()?;

        if let Some(err) = api_error(&json) {
            return Err(err);
        }

        Ok(json
            .get("models")
            .and_then(|m| m.as_array())
            .map(|models| {
                models
                    .iter()
                    .filter_map(|m| m.get("name").and_then(|n| n.as_str()))
                    .map(|n| n.to_string())
                    .collect()
            })
            .unwrap_or_default())
    }

    fn generate(&self, model: &str, body: &Value) -> Result<String, LlmError> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, model);

        tracing::debug!(model, "Sending generateContent request");

        let response = self
            .agent
            .post(&url)
            .set("Content-Type", "application/json")
            .set(API_KEY_HEADER, &self.api_key)
            .send_json(body)?;

        let json: Value = response.into_json()?;
        extract_text(&json)
    }
}

impl LlmProvider for GeminiProvider {
    fn id(&self) -> &str {
        "gemini"
    }

    fn generate_structured(
        &self,
        prompt: &str,
        image: InlineImage<'_>,
        schema: &Value,
    ) -> Result<String, LlmError> {
        let body = build_structured_body(prompt, image, schema);
        self.generate(&self.extraction_model, &body)
    }

    fn generate_text(&self, prompt: &str) -> Result<String, LlmError> {
        let body = build_text_body(prompt);
        self.generate(&self.chat_model, &body)
    }
}

/// Request body for the multimodal, JSON-constrained mode
fn build_structured_body(prompt: &str, image: InlineImage<'_>, schema: &Value) -> Value {
    let encoded = base64::engine::general_purpose::STANDARD.encode(image.data);

    serde_json::json!({
        "contents": [{
            "role": "user",
            "parts": [
                { "text": prompt },
                {
                    "inlineData": {
                        "mimeType": image.mime_type,
                        "data": encoded
                    }
                }
            ]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": schema
        }
    })
}

/// Request body for the text-only mode
fn build_text_body(prompt: &str) -> Value {
    serde_json::json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": prompt }]
        }]
    })
}

fn api_error(json: &Value) -> Option<LlmError> {
    let error = json.get("error")?;
    let message = error
        .get("message")
        .and_then(|m| m.as_str())
        .unwrap_or("Unknown error");
    Some(LlmError::Api {
        status: error.get("code").and_then(|c| c.as_u64()).unwrap_or(500) as u16,
        message: message.to_string(),
    })
}

/// Pull the answer text out of a `generateContent` response.
///
/// Text parts of the first candidate are concatenated; a prompt-level block
/// or a candidate that stopped for safety reasons is an error.
fn extract_text(json: &Value) -> Result<String, LlmError> {
    if let Some(err) = api_error(json) {
        return Err(err);
    }

    let candidate = match json
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
    {
        Some(candidate) => candidate,
        None => {
            let reason = json
                .get("promptFeedback")
                .and_then(|f| f.get("blockReason"))
                .and_then(|r| r.as_str());
            return Err(match reason {
                Some(reason) => LlmError::Blocked(reason.to_string()),
                None => LlmError::InvalidResponse("no candidates".to_string()),
            });
        }
    };

    let text: String = candidate
        .get("content")
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
                .collect()
        })
        .unwrap_or_default();

    if text.is_empty() {
        let finish = candidate
            .get("finishReason")
            .and_then(|r| r.as_str())
            .unwrap_or("UNKNOWN");
        return Err(match finish {
            "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" => {
                LlmError::Blocked(finish.to_string())
            }
            _ => LlmError::InvalidResponse(format!("empty response (finishReason {})", finish)),
        });
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_structured_body_carries_image_and_schema() {
        let schema = serde_json::json!({ "type": "OBJECT" });
        let image = InlineImage {
            mime_type: "image/png",
            data: b"abc",
        };
        let body = build_structured_body("read the label", image, &schema);

        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["text"], "read the label");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[1]["inlineData"]["data"], "YWJj");
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(body["generationConfig"]["responseSchema"], schema);
    }

    #[test]
    fn test_text_body_has_no_generation_constraints() {
        let body = build_text_body("hello");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let json = serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "{\"a\":" }, { "text": "1}" }] },
                "finishReason": "STOP"
            }]
        });
        assert_eq!(extract_text(&json).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn test_extract_text_api_error() {
        let json = serde_json::json!({
            "error": { "code": 400, "message": "API key not valid" }
        });
        match extract_text(&json) {
            Err(LlmError::Api { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "API key not valid");
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_text_prompt_blocked() {
        let json = serde_json::json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        });
        assert!(matches!(extract_text(&json), Err(LlmError::Blocked(r)) if r == "SAFETY"));
    }

    #[test]
    fn test_extract_text_empty_candidate() {
        let json = serde_json::json!({
            "candidates": [{ "content": { "parts": [] }, "finishReason": "MAX_TOKENS" }]
        });
        assert!(matches!(
            extract_text(&json),
            Err(LlmError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = LlmConfig::default();
        assert!(matches!(
            GeminiProvider::from_config(&config),
            Err(ConfigError::MissingApiKey)
        ));
    }

    #[test]
    fn test_from_config_models() {
        let config = LlmConfig {
            api_key: Some("key".to_string()),
            chat_model: "gemini-2.0-flash".to_string(),
            base_url: "http://localhost:9999/".to_string(),
            ..LlmConfig::default()
        };
        let provider = GeminiProvider::from_config(&config).unwrap();
        assert_eq!(provider.extraction_model(), "gemini-2.5-flash");
        assert_eq!(provider.chat_model(), "gemini-2.0-flash");
        assert_eq!(provider.base_url, "http://localhost:9999");
        assert_eq!(provider.id(), "gemini");
    }

    #[test]
    fn test_connection_error_hides_api_key() {
        let provider = GeminiProvider::new("SECRET-KEY-123", "gemini-2.5-flash")
            .with_base_url("http://127.0.0.1:1")
            .with_timeout(Duration::from_secs(2));

        let err = provider.generate_text("hi").unwrap_err();
        assert!(!err.to_string().contains("SECRET-KEY-123"), "{}", err);

        let err = provider.list_models().unwrap_err();
        assert!(!err.to_string().contains("SECRET-KEY-123"), "{}", err);
    }
}
