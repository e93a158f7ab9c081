use std::sync::Arc;

use relay_types::DenialReason;

use crate::context::{GateContext, StageResult};
use crate::error::GateError;
use crate::traits::{AllowListProvider, GateStage};

/// Stage 4: Allow-list Check
///
/// Consults the allow-list for the (target, selector) pair extracted by
/// stage 3.
pub struct AllowListStage {
    allowlist: Arc<dyn AllowListProvider>,
}

impl AllowListStage {
    pub fn new(allowlist: Arc<dyn AllowListProvider>) -> Self {
        Self { allowlist }
    }
}

impl GateStage for AllowListStage {
    fn stage_name(&self) -> &str {
        "Allow-list Check"
    }

    fn stage_number(&self) -> u8 {
        4
    }

    fn evaluate(&self, context: &mut GateContext<'_>) -> Result<StageResult, GateError> {
        let selector = context.selector.ok_or_else(|| GateError::StageFailed {
            stage: self.stage_name().to_string(),
            reason: "selector was not extracted".into(),
        })?;
        let target = &context.request.target;

        if !self.allowlist.is_permitted(target, &selector)? {
            return Ok(StageResult::deny(DenialReason::function_not_allowed(
                format!("{} is not allowed on {}", selector, target),
            )));
        }

        Ok(StageResult::Pass)
    }
}
