use std::sync::Arc;

use relay_types::{ActionRequest, Decision, DenialReason};
use serde::Serialize;
use tracing::{debug, warn};

use crate::context::{GateContext, StageRecord, StageResult};
use crate::error::GateError;
use crate::stages::{
    AllowListStage, ExecutorMembershipStage, PayloadShapeStage, SelectorExtractionStage,
};
use crate::traits::{AllowListProvider, ExecutorProvider, GateStage};

/// Stage numbers of the canonical pipeline, in order.
const CANONICAL_STAGES: [u8; 4] = [1, 2, 3, 4];

/// Decision plus the per-stage trace that produced it.
#[derive(Clone, Debug, Serialize)]
pub struct Evaluation {
    pub decision: Decision,
    pub stages: Vec<StageRecord>,
}

/// Policy Evaluator: the single authoritative gate.
///
/// Runs the four stages in canonical order and stops at the first denial:
///
/// 1. **Payload Shape** → `MalformedPayload`
/// 2. **Executor Membership** → `NotExecutor`
/// 3. **Selector Extraction**
/// 4. **Allow-list Check** → `FunctionNotAllowed`
///
/// The order is part of the external contract: it decides which reason a
/// caller sees when several checks would fail. The evaluator refuses to run
/// with any other stage arrangement.
pub struct PolicyEvaluator {
    stages: Vec<Box<dyn GateStage>>,
}

impl PolicyEvaluator {
    /// Build the canonical pipeline over the given read views.
    pub fn new(
        allowlist: Arc<dyn AllowListProvider>,
        executors: Arc<dyn ExecutorProvider>,
    ) -> Self {
        Self {
            stages: vec![
                Box::new(PayloadShapeStage),
                Box::new(ExecutorMembershipStage::new(executors)),
                Box::new(SelectorExtractionStage),
                Box::new(AllowListStage::new(allowlist)),
            ],
        }
    }

    /// Build from explicit stages. Fails unless they are exactly the
    /// canonical stages in canonical order.
    pub fn with_stages(stages: Vec<Box<dyn GateStage>>) -> Result<Self, GateError> {
        let numbers: Vec<u8> = stages.iter().map(|s| s.stage_number()).collect();
        if numbers != CANONICAL_STAGES {
            return Err(GateError::PipelineMisconfigured(format!(
                "expected stages {:?}, got {:?}",
                CANONICAL_STAGES, numbers
            )));
        }
        Ok(Self { stages })
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.stage_name()).collect()
    }

    /// Evaluate a request and return the decision with its stage trace.
    pub fn evaluate(&self, request: &ActionRequest) -> Result<Evaluation, GateError> {
        let mut context = GateContext::new(request);

        for stage in &self.stages {
            let result = stage.evaluate(&mut context)?;
            context.record_stage(stage.stage_name(), stage.stage_number(), result.clone());

            if let StageResult::Deny { reason } = result {
                warn!(
                    stage = stage.stage_name(),
                    code = %reason.code,
                    caller = %request.caller,
                    target = %request.target,
                    "request denied"
                );
                return Ok(Evaluation {
                    decision: Decision::deny(reason),
                    stages: context.stage_results,
                });
            }
            debug!(stage = stage.stage_name(), "stage passed");
        }

        // Every stage passed, so stage 3 must have recorded a selector.
        let selector = context.selector.ok_or_else(|| {
            GateError::PipelineMisconfigured("pipeline permitted without a selector".into())
        })?;

        Ok(Evaluation {
            decision: Decision::Permit { selector },
            stages: context.stage_results,
        })
    }

    /// Evaluate and return only the decision.
    pub fn decide(&self, request: &ActionRequest) -> Result<Decision, GateError> {
        Ok(self.evaluate(request)?.decision)
    }
}

/// Convenience for callers that want a `Result` rather than a `Decision`.
impl Evaluation {
    pub fn into_result(self) -> Result<relay_types::Selector, DenialReason> {
        match self.decision {
            Decision::Permit { selector } => Ok(selector),
            Decision::Deny { reason } => Err(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allowlist::AllowListStore;
    use crate::mocks::{StaticAllowList, StaticExecutors, UnreachableAllowList};
    use crate::registry::ExecutorRegistry;
    use relay_types::{Address, DenyCode, Principal, Selector, Target};

    fn executor() -> Principal {
        Principal::new(Address::repeat_byte(0xe1))
    }

    fn stranger() -> Principal {
        Principal::new(Address::repeat_byte(0x99))
    }

    fn target() -> Target {
        Target::new(Address::repeat_byte(0x10))
    }

    fn sel_aa() -> Selector {
        Selector::new([0xaa; 4])
    }

    fn live_evaluator() -> (Arc<AllowListStore>, Arc<ExecutorRegistry>, PolicyEvaluator) {
        let store = Arc::new(AllowListStore::new());
        let registry = Arc::new(ExecutorRegistry::with_executors([executor()]));
        let evaluator = PolicyEvaluator::new(store.clone(), registry.clone());
        (store, registry, evaluator)
    }

    #[test]
    fn canonical_pipeline_has_four_stages_in_order() {
        let (_, _, evaluator) = live_evaluator();
        assert_eq!(
            evaluator.stage_names(),
            vec![
                "Payload Shape",
                "Executor Membership",
                "Selector Extraction",
                "Allow-list Check"
            ]
        );
    }

    #[test]
    fn unscoped_allowed_target_permits_executor() {
        let (store, _, evaluator) = live_evaluator();
        store.set_target_allowed(&target(), true).unwrap();

        let req = ActionRequest::new(executor(), target(), vec![0xaa, 0xaa, 0xaa, 0xaa]);
        let eval = evaluator.evaluate(&req).unwrap();
        assert_eq!(eval.decision, Decision::Permit { selector: sel_aa() });
        assert_eq!(eval.stages.len(), 4);
        assert!(eval.stages.iter().all(|s| s.result.is_pass()));
    }

    #[test]
    fn scoped_target_without_entry_denies() {
        let (store, _, evaluator) = live_evaluator();
        store.set_target_allowed(&target(), true).unwrap();
        store.set_scoped(&target(), true).unwrap();

        let req = ActionRequest::new(executor(), target(), vec![0xaa; 4]);
        assert_eq!(
            evaluator.decide(&req).unwrap().deny_code(),
            Some(DenyCode::FunctionNotAllowed)
        );
    }

    #[test]
    fn toggling_selector_entry_flips_decision() {
        let (store, _, evaluator) = live_evaluator();
        store.set_target_allowed(&target(), true).unwrap();
        store.set_scoped(&target(), true).unwrap();
        let req = ActionRequest::new(executor(), target(), vec![0xaa; 8]);

        store.set_allowed_function(&target(), &sel_aa(), true).unwrap();
        let first = evaluator.decide(&req).unwrap();
        assert!(first.is_permit());

        store.set_allowed_function(&target(), &sel_aa(), false).unwrap();
        assert_eq!(
            evaluator.decide(&req).unwrap().deny_code(),
            Some(DenyCode::FunctionNotAllowed)
        );
        // Earlier decisions are values; nothing retroactively changes them.
        assert!(first.is_permit());
    }

    #[test]
    fn non_executor_denied_before_allow_list_lookup() {
        let evaluator = PolicyEvaluator::new(
            Arc::new(UnreachableAllowList),
            Arc::new(StaticExecutors::of([executor()])),
        );
        let req = ActionRequest::new(stranger(), target(), vec![0xaa; 4]);
        let eval = evaluator.evaluate(&req).unwrap();
        assert_eq!(eval.decision.deny_code(), Some(DenyCode::NotExecutor));
        assert_eq!(eval.stages.len(), 2);
    }

    #[test]
    fn malformed_payload_precedes_executor_check() {
        let evaluator = PolicyEvaluator::new(
            Arc::new(UnreachableAllowList),
            Arc::new(StaticExecutors::default()),
        );
        let req = ActionRequest::new(stranger(), target(), vec![0xaa, 0xbb]);
        assert_eq!(
            evaluator.decide(&req).unwrap().deny_code(),
            Some(DenyCode::MalformedPayload)
        );
    }

    #[test]
    fn synthetic_stores_drive_the_evaluator() {
        let evaluator = PolicyEvaluator::new(
            Arc::new(StaticAllowList::permitting([(target(), sel_aa())])),
            Arc::new(StaticExecutors::of([executor()])),
        );
        let ok = ActionRequest::new(executor(), target(), vec![0xaa; 4]);
        let other = ActionRequest::new(executor(), target(), vec![0xbb; 4]);
        assert!(evaluator.decide(&ok).unwrap().is_permit());
        assert!(evaluator.decide(&other).unwrap().is_deny());
    }

    #[test]
    fn removed_executor_is_blocked_on_next_request() {
        let (store, registry, evaluator) = live_evaluator();
        store.set_target_allowed(&target(), true).unwrap();
        let req = ActionRequest::new(executor(), target(), vec![0xaa; 4]);

        assert!(evaluator.decide(&req).unwrap().is_permit());
        registry.remove_executor(&executor()).unwrap();
        assert_eq!(
            evaluator.decide(&req).unwrap().deny_code(),
            Some(DenyCode::NotExecutor)
        );
    }

    #[test]
    fn with_stages_rejects_reordered_pipeline() {
        let stages: Vec<Box<dyn GateStage>> = vec![
            Box::new(ExecutorMembershipStage::new(Arc::new(StaticExecutors::default()))),
            Box::new(PayloadShapeStage),
            Box::new(SelectorExtractionStage),
            Box::new(AllowListStage::new(Arc::new(StaticAllowList::default()))),
        ];
        assert!(matches!(
            PolicyEvaluator::with_stages(stages),
            Err(GateError::PipelineMisconfigured(_))
        ));
    }

    #[test]
    fn with_stages_rejects_missing_stage() {
        let stages: Vec<Box<dyn GateStage>> = vec![
            Box::new(PayloadShapeStage),
            Box::new(SelectorExtractionStage),
            Box::new(AllowListStage::new(Arc::new(StaticAllowList::default()))),
        ];
        assert!(PolicyEvaluator::with_stages(stages).is_err());
    }

    #[test]
    fn with_stages_accepts_canonical_order() {
        let stages: Vec<Box<dyn GateStage>> = vec![
            Box::new(PayloadShapeStage),
            Box::new(ExecutorMembershipStage::new(Arc::new(StaticExecutors::of([
                executor(),
            ])))),
            Box::new(SelectorExtractionStage),
            Box::new(AllowListStage::new(Arc::new(StaticAllowList::permitting([
                (target(), sel_aa()),
            ])))),
        ];
        let evaluator = PolicyEvaluator::with_stages(stages).unwrap();
        let req = ActionRequest::new(executor(), target(), vec![0xaa; 4]);
        assert!(evaluator.decide(&req).unwrap().is_permit());
    }

    #[test]
    fn into_result_maps_decision() {
        let (store, _, evaluator) = live_evaluator();
        store.set_target_allowed(&target(), true).unwrap();
        let req = ActionRequest::new(executor(), target(), vec![0xaa; 4]);
        assert_eq!(evaluator.evaluate(&req).unwrap().into_result(), Ok(sel_aa()));

        let bad = ActionRequest::new(stranger(), target(), vec![0xaa; 4]);
        let err = evaluator.evaluate(&bad).unwrap().into_result().unwrap_err();
        assert_eq!(err.code, DenyCode::NotExecutor);
    }
}
