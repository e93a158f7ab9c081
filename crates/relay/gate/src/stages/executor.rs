use std::sync::Arc;

use relay_types::DenialReason;

use crate::context::{GateContext, StageResult};
use crate::error::GateError;
use crate::traits::{ExecutorProvider, GateStage};

/// Stage 2: Executor Membership
///
/// Non-executors are turned away here, before any allow-list lookup, so
/// they learn nothing about how targets are configured.
pub struct ExecutorMembershipStage {
    executors: Arc<dyn ExecutorProvider>,
}

impl ExecutorMembershipStage {
    pub fn new(executors: Arc<dyn ExecutorProvider>) -> Self {
        Self { executors }
    }
}

impl GateStage for ExecutorMembershipStage {
    fn stage_name(&self) -> &str {
        "Executor Membership"
    }

    fn stage_number(&self) -> u8 {
        2
    }

    fn evaluate(&self, context: &mut GateContext<'_>) -> Result<StageResult, GateError> {
        let caller = &context.request.caller;
        if !self.executors.is_executor(caller)? {
            return Ok(StageResult::deny(DenialReason::not_executor(format!(
                "{} is not an executor",
                caller
            ))));
        }

        context.executor_verified = true;
        Ok(StageResult::Pass)
    }
}
