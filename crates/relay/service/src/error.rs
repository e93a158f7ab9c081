use std::time::Duration;

use relay_gate::GateError;
use relay_types::{DenialReason, DenyCode, ParseError, Principal};
use thiserror::Error;

/// Failures of a relayed action.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// The evaluator refused the action; nothing was forwarded.
    #[error("{0}")]
    Denied(DenialReason),

    /// The vault refused the call, carrying the vault's reason.
    #[error("VAULT_REJECTED: {0}")]
    VaultRejected(String),

    /// The target reverted, carrying its reason verbatim.
    #[error("TARGET_CALL_FAILED: {0}")]
    TargetCallFailed(String),

    #[error("TIMEOUT: vault did not answer within {0:?}")]
    Timeout(Duration),

    /// Evaluation could not run. Nothing was forwarded.
    #[error("gate error: {0}")]
    Gate(#[from] GateError),
}

impl RelayError {
    /// Stable reason code, `None` for internal gate failures.
    pub fn deny_code(&self) -> Option<DenyCode> {
        match self {
            RelayError::Denied(reason) => Some(reason.code),
            RelayError::VaultRejected(_) => Some(DenyCode::VaultRejected),
            RelayError::TargetCallFailed(_) => Some(DenyCode::TargetCallFailed),
            RelayError::Timeout(_) => Some(DenyCode::Timeout),
            RelayError::Gate(_) => None,
        }
    }

    /// Reason text without the code prefix.
    pub fn reason(&self) -> String {
        match self {
            RelayError::Denied(reason) => reason.message.clone(),
            RelayError::VaultRejected(reason) | RelayError::TargetCallFailed(reason) => {
                reason.clone()
            }
            RelayError::Timeout(after) => format!("vault did not answer within {:?}", after),
            RelayError::Gate(err) => err.to_string(),
        }
    }
}

/// Failures of a governance call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GovernanceError {
    #[error("UNAUTHORIZED: {caller} may not {operation}")]
    Unauthorized {
        caller: Principal,
        operation: &'static str,
    },

    #[error("gate error: {0}")]
    Gate(#[from] GateError),
}

impl GovernanceError {
    pub fn deny_code(&self) -> Option<DenyCode> {
        match self {
            GovernanceError::Unauthorized { .. } => Some(DenyCode::Unauthorized),
            _ => None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("lock poisoned: {0}")]
    LockPoisoned(&'static str),
}

/// Failures applying the startup policy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BootstrapError {
    #[error("no governance principal configured")]
    MissingGovernance,

    #[error("invalid selector {input:?}: {source}")]
    InvalidSelector { input: String, source: ParseError },

    #[error("gate error: {0}")]
    Gate(#[from] GateError),
}
