//! Action submission handlers

use axum::{extract::State, Json};
use relay_gate::Evaluation;
use relay_service::ExecutionResult;
use relay_types::decode_hex;
use serde::Deserialize;

use super::parse_target;
use crate::api::rest::extract::Caller;
use crate::api::rest::state::AppState;
use crate::error::{ApiError, ApiResult};

/// Action request body
#[derive(Debug, Deserialize)]
pub struct ActionBody {
    pub target: String,
    /// `0x`-hex payload: selector followed by arguments
    pub data: String,
}

impl ActionBody {
    fn decode(&self) -> ApiResult<(relay_types::Target, Vec<u8>)> {
        let target = parse_target(&self.target)?;
        let data = decode_hex(&self.data)
            .map_err(|e| ApiError::BadRequest(format!("invalid data: {}", e)))?;
        Ok((target, data))
    }
}

/// Relay an action through the evaluator to the vault
pub async fn execute_action(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(body): Json<ActionBody>,
) -> ApiResult<Json<ExecutionResult>> {
    let (target, data) = body.decode()?;
    let result = state
        .service
        .relay
        .check_transaction_and_execute(caller, target, data)
        .await?;
    Ok(Json(result))
}

/// Dry-run evaluation; nothing is forwarded or recorded
pub async fn evaluate_action(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(body): Json<ActionBody>,
) -> ApiResult<Json<Evaluation>> {
    let (target, data) = body.decode()?;
    let evaluation = state.service.relay.evaluate(caller, target, data)?;
    Ok(Json(evaluation))
}
