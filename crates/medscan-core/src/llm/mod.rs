//! LLM integration module
//!
//! The model capability both orchestrators call through. Only Gemini is
//! wired up; tests plug in their own `LlmProvider`.

mod error;
mod gemini;
mod provider;

pub use error::LlmError;
pub use gemini::GeminiProvider;
pub use provider::{InlineImage, LlmProvider, SharedProvider};
