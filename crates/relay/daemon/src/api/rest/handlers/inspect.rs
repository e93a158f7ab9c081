//! Read-only inspection handlers, open to the governance principal only

use axum::{
    extract::{Path, Query, State},
    Json,
};
use relay_gate::TargetConfig;
use relay_service::{LedgerEntry, LedgerFilter, OutcomeKind};
use relay_types::{DenyCode, Principal, Target};
use serde::{Deserialize, Serialize};

use super::{parse_principal, parse_target};
use crate::api::rest::extract::{Caller, PRINCIPAL_HEADER};
use crate::api::rest::state::AppState;
use crate::error::{ApiError, ApiResult};

/// One target's configuration
#[derive(Debug, Serialize)]
pub struct TargetView {
    pub target: Target,
    #[serde(flatten)]
    pub config: TargetConfig,
}

// A missing or unreadable principal header is an anonymous caller here,
// refused like any other non-governance principal.
fn require_governance(
    state: &AppState,
    caller: Option<Caller>,
    operation: &'static str,
) -> ApiResult<()> {
    let Caller(caller) = caller.ok_or_else(|| ApiError::Rejected {
        code: DenyCode::Unauthorized,
        message: format!(
            "UNAUTHORIZED: {} requires a valid {} header",
            operation, PRINCIPAL_HEADER
        ),
    })?;
    state.service.governance.ensure_governance(&caller, operation)?;
    Ok(())
}

/// List registered executors
pub async fn list_executors(
    State(state): State<AppState>,
    caller: Option<Caller>,
) -> ApiResult<Json<Vec<Principal>>> {
    require_governance(&state, caller, "list_executors")?;
    Ok(Json(state.service.registry.executors()?))
}

/// List every configured target
pub async fn list_targets(
    State(state): State<AppState>,
    caller: Option<Caller>,
) -> ApiResult<Json<Vec<TargetView>>> {
    require_governance(&state, caller, "list_targets")?;
    let snapshot = state.service.allowlist.snapshot()?;
    let views = snapshot
        .targets
        .into_iter()
        .map(|(target, config)| TargetView { target, config })
        .collect();
    Ok(Json(views))
}

/// Get one target's configuration
pub async fn get_target(
    State(state): State<AppState>,
    caller: Option<Caller>,
    Path(target): Path<String>,
) -> ApiResult<Json<TargetView>> {
    require_governance(&state, caller, "get_target")?;
    let target = parse_target(&target)?;
    let config = state
        .service
        .allowlist
        .target_config(&target)?
        .ok_or_else(|| ApiError::NotFound(format!("Target {} not configured", target)))?;
    Ok(Json(TargetView { target, config }))
}

/// Ledger query parameters
#[derive(Debug, Default, Deserialize)]
pub struct LedgerQuery {
    pub caller: Option<String>,
    pub target: Option<String>,
    pub outcome: Option<String>,
}

impl LedgerQuery {
    fn to_filter(&self) -> ApiResult<LedgerFilter> {
        let mut filter = LedgerFilter::new();
        if let Some(caller) = &self.caller {
            filter = filter.with_caller(parse_principal(caller)?);
        }
        if let Some(target) = &self.target {
            filter = filter.with_target(parse_target(target)?);
        }
        if let Some(outcome) = &self.outcome {
            let kind = outcome.parse::<OutcomeKind>().map_err(ApiError::BadRequest)?;
            filter = filter.with_outcome(kind);
        }
        Ok(filter)
    }
}

/// Query the relay ledger
pub async fn query_ledger(
    State(state): State<AppState>,
    caller: Option<Caller>,
    Query(query): Query<LedgerQuery>,
) -> ApiResult<Json<Vec<LedgerEntry>>> {
    require_governance(&state, caller, "query_ledger")?;
    let filter = query.to_filter()?;
    Ok(Json(state.service.ledger.query(&filter)?))
}
