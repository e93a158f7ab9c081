use relay_types::{Principal, Selector, Target};

use crate::context::{GateContext, StageResult};
use crate::error::GateError;

/// One stage of the policy pipeline.
///
/// Stages run sequentially in `stage_number` order. The first stage to
/// return `Deny` halts the pipeline, so the order fixes which reason a
/// caller sees when several checks would fail.
pub trait GateStage: Send + Sync {
    /// Human-readable name of this stage.
    fn stage_name(&self) -> &str;

    /// Position (1-based) in the canonical pipeline.
    fn stage_number(&self) -> u8;

    /// Evaluate the request carried by `context`.
    ///
    /// May record facts on the context (e.g. the extracted selector) for
    /// later stages.
    fn evaluate(&self, context: &mut GateContext<'_>) -> Result<StageResult, GateError>;
}

/// Read access to the allow-list.
///
/// Implemented by `AllowListStore`; the evaluator only ever sees this view.
pub trait AllowListProvider: Send + Sync {
    fn is_permitted(&self, target: &Target, selector: &Selector) -> Result<bool, GateError>;
}

/// Read access to executor membership.
pub trait ExecutorProvider: Send + Sync {
    fn is_executor(&self, principal: &Principal) -> Result<bool, GateError>;
}
