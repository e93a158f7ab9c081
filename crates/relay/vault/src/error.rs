use thiserror::Error;

/// Reason string the vault gives when the calling module is not enabled.
pub const MODULE_NOT_ENABLED: &str = "Method can only be called from an enabled module";

/// Vault failures.
///
/// `TargetReverted` is the only variant produced by the target itself;
/// everything else is the vault (or the path to it) refusing the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VaultError {
    #[error("Method can only be called from an enabled module")]
    ModuleNotEnabled,

    #[error("vault guard is disabled")]
    GuardDisabled,

    #[error("unsupported call type: {0}")]
    UnsupportedCallType(String),

    #[error("{0}")]
    TargetReverted(String),

    #[error("vault request timed out")]
    Timeout,

    #[error("vault transport error: {0}")]
    Transport(String),

    #[error("lock poisoned: {0}")]
    LockPoisoned(&'static str),
}

impl VaultError {
    /// Whether the target, rather than the vault, rejected the call.
    pub fn is_target_failure(&self) -> bool {
        matches!(self, VaultError::TargetReverted(_))
    }
}

pub type VaultResult<T> = Result<T, VaultError>;
