//! Pharmacist chat about a previous scan

mod context;
mod pharmacist;

pub use context::{ChatContext, MedicationSummary};
pub use pharmacist::{
    build_chat_prompt, ChatMessage, ChatOutcome, MessageRole, PharmacistChat, CHAT_FALLBACK_REPLY,
};
