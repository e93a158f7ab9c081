use relay_types::{ActionRequest, DenialReason, Selector};
use serde::Serialize;

/// Result of a single gate stage evaluation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum StageResult {
    /// Stage passed, continue to the next one
    Pass,
    /// Stage refused the request
    Deny { reason: DenialReason },
}

impl StageResult {
    pub fn deny(reason: DenialReason) -> Self {
        StageResult::Deny { reason }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, StageResult::Pass)
    }

    pub fn is_deny(&self) -> bool {
        matches!(self, StageResult::Deny { .. })
    }
}

/// One recorded stage outcome.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StageRecord {
    pub stage: String,
    pub number: u8,
    #[serde(flatten)]
    pub result: StageResult,
}

/// Context threaded through every stage of the pipeline.
pub struct GateContext<'a> {
    /// The request being evaluated
    pub request: &'a ActionRequest,
    /// Set by the executor stage
    pub executor_verified: bool,
    /// Set by the selector stage
    pub selector: Option<Selector>,
    /// Outcome of each stage that ran, in order
    pub stage_results: Vec<StageRecord>,
}

impl<'a> GateContext<'a> {
    pub fn new(request: &'a ActionRequest) -> Self {
        Self {
            request,
            executor_verified: false,
            selector: None,
            stage_results: Vec::new(),
        }
    }

    pub fn record_stage(&mut self, stage: impl Into<String>, number: u8, result: StageResult) {
        self.stage_results.push(StageRecord {
            stage: stage.into(),
            number,
            result,
        });
    }

    pub fn has_denial(&self) -> bool {
        self.stage_results.iter().any(|r| r.result.is_deny())
    }

    /// Reason given by the first denying stage.
    pub fn denial_reason(&self) -> Option<&DenialReason> {
        self.stage_results.iter().find_map(|r| match &r.result {
            StageResult::Deny { reason } => Some(reason),
            StageResult::Pass => None,
        })
    }
}
