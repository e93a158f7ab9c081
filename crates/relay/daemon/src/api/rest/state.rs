//! Application state for API handlers

use std::sync::Arc;

use relay_service::RelayService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The assembled relay
    pub service: Arc<RelayService>,

    /// Vault backend name
    pub vault: String,

    /// Daemon version
    pub version: String,

    /// Daemon start time
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    /// Create new application state
    pub fn new(service: Arc<RelayService>, vault: impl Into<String>) -> Self {
        Self {
            service,
            vault: vault.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: chrono::Utc::now(),
        }
    }

    /// Get uptime as a human-readable string
    pub fn uptime(&self) -> String {
        let secs = (chrono::Utc::now() - self.started_at).num_seconds();

        if secs < 60 {
            format!("{}s", secs)
        } else if secs < 3600 {
            format!("{}m {}s", secs / 60, secs % 60)
        } else {
            format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
        }
    }
}
