use relay_types::{DenialReason, Selector};

use crate::context::{GateContext, StageResult};
use crate::error::GateError;
use crate::traits::GateStage;

/// Stage 3: Selector Extraction
///
/// Reads the selector prefix into the context for the allow-list stage.
pub struct SelectorExtractionStage;

impl GateStage for SelectorExtractionStage {
    fn stage_name(&self) -> &str {
        "Selector Extraction"
    }

    fn stage_number(&self) -> u8 {
        3
    }

    fn evaluate(&self, context: &mut GateContext<'_>) -> Result<StageResult, GateError> {
        match Selector::from_payload(&context.request.payload) {
            Some(selector) => {
                context.selector = Some(selector);
                Ok(StageResult::Pass)
            }
            // Unreachable behind the payload stage, but fail closed regardless.
            None => Ok(StageResult::deny(DenialReason::malformed_payload(
                "payload carries no selector",
            ))),
        }
    }
}
