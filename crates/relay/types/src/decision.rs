use std::fmt;

use serde::{Deserialize, Serialize};

use crate::selector::Selector;

/// Stable reason codes returned to callers.
///
/// Callers match on these, so the string forms are part of the external
/// contract and must not change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DenyCode {
    /// Governance-only operation invoked by someone else.
    Unauthorized,
    /// Caller is not a registered executor.
    NotExecutor,
    /// Payload too short to carry a selector.
    MalformedPayload,
    /// Target or selector not permitted by the allow-list.
    FunctionNotAllowed,
    /// The vault refused the forwarded call.
    VaultRejected,
    /// The downstream target call failed.
    TargetCallFailed,
    /// The vault did not answer within the forward timeout.
    Timeout,
}

impl DenyCode {
    pub fn as_str(self) -> &'static str {
        match self {
            DenyCode::Unauthorized => "UNAUTHORIZED",
            DenyCode::NotExecutor => "NOT_EXECUTOR",
            DenyCode::MalformedPayload => "MALFORMED_PAYLOAD",
            DenyCode::FunctionNotAllowed => "FUNCTION_NOT_ALLOWED",
            DenyCode::VaultRejected => "VAULT_REJECTED",
            DenyCode::TargetCallFailed => "TARGET_CALL_FAILED",
            DenyCode::Timeout => "TIMEOUT",
        }
    }
}

impl fmt::Display for DenyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an action was refused, with a human-readable explanation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenialReason {
    pub code: DenyCode,
    pub message: String,
}

impl DenialReason {
    pub fn new(code: DenyCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(DenyCode::Unauthorized, message)
    }

    pub fn not_executor(message: impl Into<String>) -> Self {
        Self::new(DenyCode::NotExecutor, message)
    }

    pub fn malformed_payload(message: impl Into<String>) -> Self {
        Self::new(DenyCode::MalformedPayload, message)
    }

    pub fn function_not_allowed(message: impl Into<String>) -> Self {
        Self::new(DenyCode::FunctionNotAllowed, message)
    }
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Outcome of policy evaluation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    Permit { selector: Selector },
    Deny { reason: DenialReason },
}

impl Decision {
    pub fn deny(reason: DenialReason) -> Self {
        Decision::Deny { reason }
    }

    pub fn is_permit(&self) -> bool {
        matches!(self, Decision::Permit { .. })
    }

    pub fn is_deny(&self) -> bool {
        matches!(self, Decision::Deny { .. })
    }

    /// Reason code of a denial.
    pub fn deny_code(&self) -> Option<DenyCode> {
        match self {
            Decision::Deny { reason } => Some(reason.code),
            Decision::Permit { .. } => None,
        }
    }
}
