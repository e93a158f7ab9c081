//! Error types for relayd

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use relay_gate::GateError;
use relay_service::{BootstrapError, GovernanceError, LedgerError, RelayError};
use relay_types::DenyCode;
use serde::Serialize;
use thiserror::Error;

/// Daemon-level errors
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Startup policy could not be applied
    #[error("Bootstrap error: {0}")]
    Bootstrap(#[from] BootstrapError),

    /// Vault backend could not be created
    #[error("Vault error: {0}")]
    Vault(String),

    /// Server startup error
    #[error("Server error: {0}")]
    Server(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// API-specific errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Refused by the relay or governance, with a stable reason code
    #[error("{message}")]
    Rejected { code: DenyCode, message: String },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Rejected { code, .. } => (status_for(*code), code.as_str()),
        }
    }
}

/// HTTP status for a relay reason code.
pub fn status_for(code: DenyCode) -> StatusCode {
    match code {
        DenyCode::Unauthorized | DenyCode::NotExecutor | DenyCode::FunctionNotAllowed => {
            StatusCode::FORBIDDEN
        }
        DenyCode::MalformedPayload => StatusCode::BAD_REQUEST,
        DenyCode::VaultRejected => StatusCode::BAD_GATEWAY,
        DenyCode::TargetCallFailed => StatusCode::UNPROCESSABLE_ENTITY,
        DenyCode::Timeout => StatusCode::GATEWAY_TIMEOUT,
    }
}

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        match err.deny_code() {
            Some(code) => ApiError::Rejected {
                code,
                message: err.reason(),
            },
            None => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<GovernanceError> for ApiError {
    fn from(err: GovernanceError) -> Self {
        match err.deny_code() {
            Some(code) => ApiError::Rejected {
                code,
                message: err.to_string(),
            },
            None => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<GateError> for ApiError {
    fn from(err: GateError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type alias for daemon operations
pub type DaemonResult<T> = Result<T, DaemonError>;
