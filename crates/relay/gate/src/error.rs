use thiserror::Error;

/// Errors from the relay gate.
///
/// These are infrastructure failures, not policy outcomes: a request the
/// policy refuses produces `Decision::Deny`, never a `GateError`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GateError {
    #[error("{0} lock poisoned")]
    LockPoisoned(&'static str),

    #[error("policy pipeline misconfigured: {0}")]
    PipelineMisconfigured(String),

    #[error("stage {stage} failed: {reason}")]
    StageFailed { stage: String, reason: String },
}
