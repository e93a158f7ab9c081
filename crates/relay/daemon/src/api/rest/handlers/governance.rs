//! Governance mutation handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{parse_principal, parse_selector, parse_target};
use crate::api::rest::extract::Caller;
use crate::api::rest::state::AppState;
use crate::error::ApiResult;

/// Flag update body
#[derive(Debug, Deserialize)]
pub struct FlagBody {
    pub value: bool,
}

/// Mutation response
#[derive(Debug, Serialize, Deserialize)]
pub struct MutationResponse {
    /// Whether observable state changed
    pub changed: bool,
}

/// Register an executor
pub async fn add_executor(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(principal): Path<String>,
) -> ApiResult<Json<MutationResponse>> {
    let principal = parse_principal(&principal)?;
    let changed = state.service.governance.add_executor(&caller, principal)?;
    Ok(Json(MutationResponse { changed }))
}

/// Remove an executor
pub async fn remove_executor(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(principal): Path<String>,
) -> ApiResult<Json<MutationResponse>> {
    let principal = parse_principal(&principal)?;
    let changed = state
        .service
        .governance
        .remove_executor(&caller, &principal)?;
    Ok(Json(MutationResponse { changed }))
}

/// Set whether a target is callable at all
pub async fn set_target_allowed(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(target): Path<String>,
    Json(body): Json<FlagBody>,
) -> ApiResult<Json<MutationResponse>> {
    let target = parse_target(&target)?;
    let changed = state
        .service
        .governance
        .set_target_allowed(&caller, &target, body.value)?;
    Ok(Json(MutationResponse { changed }))
}

/// Set whether per-selector checks apply to a target
pub async fn set_target_scoped(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(target): Path<String>,
    Json(body): Json<FlagBody>,
) -> ApiResult<Json<MutationResponse>> {
    let target = parse_target(&target)?;
    let changed = state
        .service
        .governance
        .set_scoped(&caller, &target, body.value)?;
    Ok(Json(MutationResponse { changed }))
}

/// Set one (target, selector) entry
pub async fn set_allowed_function(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path((target, selector)): Path<(String, String)>,
    Json(body): Json<FlagBody>,
) -> ApiResult<Json<MutationResponse>> {
    let target = parse_target(&target)?;
    let selector = parse_selector(&selector)?;
    let changed = state
        .service
        .governance
        .set_allowed_function(&caller, &target, &selector, body.value)?;
    Ok(Json(MutationResponse { changed }))
}
