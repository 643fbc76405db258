//! medscan core - backend library for medscan
//!
//! This crate provides the HTTP-agnostic pieces of the service:
//! - Label scanning (photo + medication profile -> structured result)
//! - Pharmacist chat about a previous scan
//! - Caregiver alert decision and delivery
//! - Model provider (Gemini) and configuration loading
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  analyze_image   ┌───────────────┐   generate_*   ┌────────────┐
//! │   Gateway    │ ───────────────→ │ LabelAnalyzer │ ─────────────→ │ LlmProvider│
//! │ (HTTP, CLI)  │  chat_about_...  │ PharmacistChat│                │  (Gemini)  │
//! │              │ ←─────────────── │               │ ←───────────── │            │
//! └──────┬───────┘  result/fallback └───────────────┘      text      └────────────┘
//!        │ caregiver_message
//!        ▼
//! ┌──────────────┐
//! │ AlertSender  │  fire-and-forget
//! └──────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use medscan_core::{GeminiProvider, LabelAnalyzer};
//! use std::sync::Arc;
//!
//! let provider = Arc::new(GeminiProvider::new("api-key", "gemini-2.5-flash"));
//! let analyzer = LabelAnalyzer::new(provider);
//!
//! let photo = std::fs::read("label.jpg").unwrap();
//! let result = analyzer.analyze_image(photo, "Warfarin 5mg");
//! println!("{}: {}", result.safety_audit.ui_status, result.safety_audit.alert_title);
//! ```

pub mod alerts;
pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod scan;

// Re-export commonly used types
pub use error::{MedscanError, Result};

pub use alerts::{
    caregiver_message, dispatch_caregiver_alert, AlertSender, LogAlertSender, SharedAlertSender,
    WebhookAlertSender, DEFAULT_ALERT_MESSAGE,
};
pub use chat::{ChatContext, ChatMessage, PharmacistChat, CHAT_FALLBACK_REPLY};
pub use config::{load_config, ConfigError, MedscanConfig};
pub use llm::{GeminiProvider, LlmError, LlmProvider, SharedProvider};
pub use scan::{ExtractionResult, LabelAnalyzer, MedicationRecord, SafetyAudit, UiStatus};

/// Get the crate version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
