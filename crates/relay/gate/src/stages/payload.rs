use relay_types::{DenialReason, SELECTOR_LEN};

use crate::context::{GateContext, StageResult};
use crate::error::GateError;
use crate::traits::GateStage;

/// Stage 1: Payload Shape
///
/// Rejects payloads too short to carry a selector. Payload length reveals
/// nothing about target configuration, so running this ahead of the
/// executor check leaks nothing to non-executors.
pub struct PayloadShapeStage;

impl GateStage for PayloadShapeStage {
    fn stage_name(&self) -> &str {
        "Payload Shape"
    }

    fn stage_number(&self) -> u8 {
        1
    }

    fn evaluate(&self, context: &mut GateContext<'_>) -> Result<StageResult, GateError> {
        let len = context.request.payload.len();
        if len < SELECTOR_LEN {
            return Ok(StageResult::deny(DenialReason::malformed_payload(format!(
                "payload is {} bytes, at least {} required for a selector",
                len, SELECTOR_LEN
            ))));
        }
        Ok(StageResult::Pass)
    }
}
