//! Property tests: the evaluator's decision is a pure function of the
//! allow-list formula and executor membership.

use std::sync::Arc;

use proptest::prelude::*;
use relay_gate::{AllowListStore, ExecutorRegistry, PolicyEvaluator};
use relay_types::{ActionRequest, Address, DenyCode, Principal, Selector, Target};

// ---------------------------------------------------------------------------
// Helpers / Strategies
// ---------------------------------------------------------------------------

fn arb_address() -> impl Strategy<Value = Address> {
    any::<[u8; 20]>().prop_map(Address::new)
}

fn arb_selector() -> impl Strategy<Value = Selector> {
    any::<[u8; 4]>().prop_map(Selector::new)
}

/// Payload starting with the given selector, followed by arbitrary arguments.
fn payload_for(selector: Selector, args: Vec<u8>) -> Vec<u8> {
    let mut payload = selector.as_bytes().to_vec();
    payload.extend(args);
    payload
}

fn setup(executor: Principal) -> (Arc<AllowListStore>, PolicyEvaluator) {
    let store = Arc::new(AllowListStore::new());
    let registry = Arc::new(ExecutorRegistry::with_executors([executor]));
    let evaluator = PolicyEvaluator::new(store.clone(), registry);
    (store, evaluator)
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// A target that is not allowed denies every selector, whatever the
    /// scoping and selector entries say.
    #[test]
    fn disallowed_target_always_denies(
        executor in arb_address(),
        target in arb_address(),
        selector in arb_selector(),
        scoped in any::<bool>(),
        entry in any::<bool>(),
        args in prop::collection::vec(any::<u8>(), 0..64),
    ) {
        let executor = Principal::new(executor);
        let target = Target::new(target);
        let (store, evaluator) = setup(executor);
        store.set_target_allowed(&target, false).unwrap();
        store.set_scoped(&target, scoped).unwrap();
        store.set_allowed_function(&target, &selector, entry).unwrap();

        let request = ActionRequest::new(executor, target, payload_for(selector, args));
        let decision = evaluator.decide(&request).unwrap();
        prop_assert_eq!(decision.deny_code(), Some(DenyCode::FunctionNotAllowed));
    }

    /// An allowed, unscoped target permits every selector.
    #[test]
    fn unscoped_target_permits_any_selector(
        executor in arb_address(),
        target in arb_address(),
        selector in arb_selector(),
        args in prop::collection::vec(any::<u8>(), 0..64),
    ) {
        let executor = Principal::new(executor);
        let target = Target::new(target);
        let (store, evaluator) = setup(executor);
        store.set_target_allowed(&target, true).unwrap();

        let request = ActionRequest::new(executor, target, payload_for(selector, args));
        let decision = evaluator.decide(&request).unwrap();
        prop_assert!(decision.is_permit());
    }

    /// On an allowed, scoped target the decision follows the selector entry.
    #[test]
    fn scoped_target_follows_selector_entry(
        executor in arb_address(),
        target in arb_address(),
        selector in arb_selector(),
        entry in any::<bool>(),
    ) {
        let executor = Principal::new(executor);
        let target = Target::new(target);
        let (store, evaluator) = setup(executor);
        store.set_target_allowed(&target, true).unwrap();
        store.set_scoped(&target, true).unwrap();
        store.set_allowed_function(&target, &selector, entry).unwrap();

        let request = ActionRequest::new(executor, target, payload_for(selector, vec![]));
        let decision = evaluator.decide(&request).unwrap();
        prop_assert_eq!(decision.is_permit(), entry);
    }

    /// A caller outside the registry is always NOT_EXECUTOR, even on a fully
    /// permissive target.
    #[test]
    fn non_executor_always_denied(
        executor in arb_address(),
        caller in arb_address(),
        target in arb_address(),
        selector in arb_selector(),
    ) {
        prop_assume!(executor != caller);
        let (store, evaluator) = setup(Principal::new(executor));
        let target = Target::new(target);
        store.set_target_allowed(&target, true).unwrap();

        let caller = Principal::new(caller);
        let request = ActionRequest::new(caller, target, payload_for(selector, vec![]));
        let decision = evaluator.decide(&request).unwrap();
        prop_assert_eq!(decision.deny_code(), Some(DenyCode::NotExecutor));
    }

    /// Payloads shorter than a selector are malformed for every caller.
    #[test]
    fn short_payload_always_malformed(
        caller in arb_address(),
        target in arb_address(),
        payload in prop::collection::vec(any::<u8>(), 0..4),
    ) {
        let caller = Principal::new(caller);
        let (_, evaluator) = setup(caller);
        let request = ActionRequest::new(caller, Target::new(target), payload);
        let decision = evaluator.decide(&request).unwrap();
        prop_assert_eq!(decision.deny_code(), Some(DenyCode::MalformedPayload));
    }
}
