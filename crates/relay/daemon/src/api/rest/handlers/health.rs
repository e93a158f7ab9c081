//! Health handler

use axum::{extract::State, Json};
use relay_types::{Address, Principal};
use serde::{Deserialize, Serialize};

use crate::api::rest::state::AppState;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub version: String,
    pub uptime: String,
    pub governance: Principal,
    pub module: Address,
    pub vault: String,
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime: state.uptime(),
        governance: *state.service.governance.governance(),
        module: state.service.relay.config().module,
        vault: state.vault.clone(),
    })
}
