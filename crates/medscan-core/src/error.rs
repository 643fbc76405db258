//! Error types for medscan core
//!
//! Provides a unified error type for the orchestrators. None of these escape
//! the public `analyze_image` / `chat_about_medicine` operations; they are
//! carried inside the tagged outcomes so the reason can be logged.

use crate::llm::LlmError;
use thiserror::Error;

/// Result type for medscan core operations
pub type Result<T> = std::result::Result<T, MedscanError>;

/// Unified error type for medscan core
#[derive(Error, Debug)]
pub enum MedscanError {
    /// Model provider error
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Uploaded bytes are not a decodable raster image
    #[error("Image error: {0}")]
    Image(String),

    /// Model output did not match the expected JSON shape
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Caller supplied data of the wrong shape
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl MedscanError {
    /// Create an image error
    pub fn image(msg: impl Into<String>) -> Self {
        MedscanError::Image(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        MedscanError::InvalidInput(msg.into())
    }
}

impl From<serde_json::Error> for MedscanError {
    fn from(err: serde_json::Error) -> Self {
        MedscanError::Serialization(err.to_string())
    }
}

impl From<image::ImageError> for MedscanError {
    fn from(err: image::ImageError) -> Self {
        MedscanError::Image(err.to_string())
    }
}
