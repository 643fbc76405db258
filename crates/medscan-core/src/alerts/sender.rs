//! Alert delivery backends

use crate::config::AlertConfig;
use std::sync::Arc;
use std::time::Duration;

/// Alert delivery error
#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error("Alert gateway unreachable: {0}")]
    Transport(String),

    #[error("Alert gateway rejected the message (HTTP {status})")]
    Rejected { status: u16 },
}

impl From<ureq::Error> for AlertError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, _) => AlertError::Rejected { status },
            ureq::Error::Transport(transport) => AlertError::Transport(transport.to_string()),
        }
    }
}

/// Something that can get a text message to a phone number
pub trait AlertSender: Send + Sync {
    fn id(&self) -> &str;

    /// Deliver `message` to `contact`. Blocks until the backend answers.
    fn send(&self, message: &str, contact: &str) -> Result<(), AlertError>;
}

pub type SharedAlertSender = Arc<dyn AlertSender>;

/// Writes alerts to the log instead of sending them
#[derive(Debug, Default)]
pub struct LogAlertSender;

impl AlertSender for LogAlertSender {
    fn id(&self) -> &str {
        "log"
    }

    fn send(&self, message: &str, contact: &str) -> Result<(), AlertError> {
        tracing::warn!(to = %contact, message = %message, "EMERGENCY SMS ALERT");
        Ok(())
    }
}

/// Posts `{"to": ..., "message": ...}` to an SMS gateway
pub struct WebhookAlertSender {
    url: String,
    agent: ureq::Agent,
}

impl WebhookAlertSender {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            agent: ureq::AgentBuilder::new()
                .timeout(Duration::from_secs(15))
                .build(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl AlertSender for WebhookAlertSender {
    fn id(&self) -> &str {
        "webhook"
    }

    fn send(&self, message: &str, contact: &str) -> Result<(), AlertError> {
        tracing::warn!(to = %contact, message = %message, "Sending emergency SMS alert");
        self.agent
            .post(&self.url)
            .set("Content-Type", "application/json")
            .send_json(serde_json::json!({
                "to": contact,
                "message": message,
            }))?;
        Ok(())
    }
}

/// Pick a sender for the `[alerts]` config section
pub fn sender_from_config(config: &AlertConfig) -> SharedAlertSender {
    match config.webhook_url.as_deref().filter(|u| !u.is_empty()) {
        Some(url) => Arc::new(WebhookAlertSender::new(url)),
        None => Arc::new(LogAlertSender),
    }
}
