//! Caregiver alerts
//!
//! When a scan flags an external interaction that needs outside attention,
//! a short message goes to the emergency contact. Delivery is
//! fire-and-forget: the scan response never waits for it.

mod sender;

pub use sender::{
    sender_from_config, AlertError, AlertSender, LogAlertSender, SharedAlertSender,
    WebhookAlertSender,
};

use crate::scan::ExtractionResult;

/// Message used when the model asked for an alert without wording one
pub const DEFAULT_ALERT_MESSAGE: &str = "Critical Interaction Detected.";

/// Decide whether a scan warrants an alert and what it should say.
///
/// Returns `None` unless `caregiver_alert.required` is set and a contact was
/// supplied.
pub fn caregiver_message(result: &ExtractionResult, emergency_contact: &str) -> Option<String> {
    if emergency_contact.is_empty() {
        return None;
    }

    let alert = result.caregiver_alert()?;
    let message = alert.sms_message.as_deref().unwrap_or(DEFAULT_ALERT_MESSAGE);

    Some(message.to_string())
}

/// Send an alert on the blocking pool without waiting for it.
///
/// Must be called from within a tokio runtime. Failures are logged only.
pub fn dispatch_caregiver_alert(
    sender: SharedAlertSender,
    message: String,
    contact: String,
) -> tokio::task::JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        match sender.send(&message, &contact) {
            Ok(()) => tracing::info!(sender = sender.id(), "Caregiver alert delivered"),
            Err(e) => tracing::error!(sender = sender.id(), error = %e, "Caregiver alert failed"),
        }
    })
}
