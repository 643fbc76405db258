//! Server state management

use medscan_core::{LabelAnalyzer, PharmacistChat, SharedAlertSender, SharedProvider};
use std::sync::Arc;

/// Shared application state
///
/// Built once at startup; handlers only read it.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<LabelAnalyzer>,
    pub chat: Arc<PharmacistChat>,
    pub alerts: SharedAlertSender,
}

impl AppState {
    pub fn new(provider: SharedProvider, alerts: SharedAlertSender) -> Self {
        Self {
            analyzer: Arc::new(LabelAnalyzer::new(provider.clone())),
            chat: Arc::new(PharmacistChat::new(provider)),
            alerts,
        }
    }
}
