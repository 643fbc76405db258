//! Model provider trait

use super::LlmError;

/// Image attached to a multimodal request
#[derive(Debug, Clone, Copy)]
pub struct InlineImage<'a> {
    /// MIME type sniffed from the bytes (e.g. `image/jpeg`)
    pub mime_type: &'a str,

    /// Raw encoded image bytes
    pub data: &'a [u8],
}

/// LLM provider trait
///
/// The two invocation modes the orchestrators need. Calls block the current
/// thread until the provider answers; async callers run them on the blocking
/// pool.
pub trait LlmProvider: Send + Sync {
    /// Get the provider's unique identifier (e.g., "gemini")
    fn id(&self) -> &str;

    /// Image + prompt in, JSON text matching `schema` out.
    fn generate_structured(
        &self,
        prompt: &str,
        image: InlineImage<'_>,
        schema: &serde_json::Value,
    ) -> Result<String, LlmError>;

    /// Prompt in, free text out.
    fn generate_text(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Shared, read-only provider handle created once at startup
pub type SharedProvider = std::sync::Arc<dyn LlmProvider>;
