//! End-to-end relay scenarios over the in-memory vault.

use std::sync::Arc;
use std::time::Duration;

use relay_service::{
    ActionOutcome, LedgerFilter, OutcomeKind, PolicyConfig, RelayConfig, RelayError, RelayService,
    TargetPolicy,
};
use relay_types::{Address, DenyCode, Principal, Selector, Target};
use relay_vault::{InMemoryVault, Reverts, MODULE_NOT_ENABLED};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

const MODULE: Address = Address::repeat_byte(0x0d);

fn governance() -> Principal {
    Principal::new(Address::repeat_byte(0x60))
}

fn executor() -> Principal {
    Principal::new(Address::repeat_byte(0xe1))
}

fn stranger() -> Principal {
    Principal::new(Address::repeat_byte(0x99))
}

fn token() -> Target {
    Target::new(Address::repeat_byte(0x10))
}

fn rewards() -> Target {
    Target::new(Address::repeat_byte(0x20))
}

fn sel_aa() -> Selector {
    Selector::new([0xaa; 4])
}

fn payload(selector: Selector) -> Vec<u8> {
    let mut data = selector.as_bytes().to_vec();
    data.extend_from_slice(&[0u8; 32]);
    data
}

fn service_with(vault: Arc<InMemoryVault>, timeout: Duration) -> Arc<RelayService> {
    let policy = PolicyConfig {
        governance: Some(governance()),
        executors: vec![executor()],
        targets: vec![TargetPolicy {
            target: token(),
            allowed: true,
            scoped: false,
            selectors: vec![],
        }],
    };
    let config = RelayConfig {
        module: MODULE,
        forward_timeout: timeout,
        ..RelayConfig::default()
    };
    Arc::new(RelayService::build(&policy, vault, config).unwrap())
}

fn service() -> (Arc<RelayService>, Arc<InMemoryVault>) {
    let vault = Arc::new(InMemoryVault::with_module(MODULE));
    (service_with(vault.clone(), Duration::from_secs(5)), vault)
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unscoped_allowed_target_executes() {
    let (svc, vault) = service();
    let result = svc
        .relay
        .check_transaction_and_execute(executor(), token(), payload(sel_aa()))
        .await
        .unwrap();
    assert_eq!(result.selector, sel_aa());
    assert_eq!(vault.executed().unwrap().len(), 1);
}

#[tokio::test]
async fn scoped_target_without_selector_is_not_allowed() {
    let (svc, vault) = service();
    svc.governance
        .set_scoped(&governance(), &token(), true)
        .unwrap();

    let err = svc
        .relay
        .check_transaction_and_execute(executor(), token(), payload(sel_aa()))
        .await
        .unwrap_err();
    assert_eq!(err.deny_code(), Some(DenyCode::FunctionNotAllowed));
    assert!(vault.executed().unwrap().is_empty());
}

#[tokio::test]
async fn selector_added_then_removed_flips_outcome() {
    let (svc, _) = service();
    let gov = governance();
    svc.governance.set_scoped(&gov, &token(), true).unwrap();
    svc.governance
        .set_allowed_function(&gov, &token(), &sel_aa(), true)
        .unwrap();

    assert!(svc
        .relay
        .check_transaction_and_execute(executor(), token(), payload(sel_aa()))
        .await
        .is_ok());

    svc.governance
        .set_allowed_function(&gov, &token(), &sel_aa(), false)
        .unwrap();
    let err = svc
        .relay
        .check_transaction_and_execute(executor(), token(), payload(sel_aa()))
        .await
        .unwrap_err();
    assert_eq!(err.deny_code(), Some(DenyCode::FunctionNotAllowed));
}

#[tokio::test]
async fn revoked_module_is_vault_rejected() {
    let (svc, vault) = service();
    vault.disable_module(&MODULE).unwrap();

    let err = svc
        .relay
        .check_transaction_and_execute(executor(), token(), payload(sel_aa()))
        .await
        .unwrap_err();
    assert_eq!(err, RelayError::VaultRejected(MODULE_NOT_ENABLED.into()));
    assert_eq!(err.deny_code(), Some(DenyCode::VaultRejected));
}

#[tokio::test]
async fn non_executor_is_denied() {
    let (svc, vault) = service();
    let err = svc
        .relay
        .check_transaction_and_execute(stranger(), token(), payload(sel_aa()))
        .await
        .unwrap_err();
    assert_eq!(err.deny_code(), Some(DenyCode::NotExecutor));
    assert!(vault.executed().unwrap().is_empty());
}

#[tokio::test]
async fn short_payload_is_malformed() {
    let (svc, _) = service();
    let err = svc
        .relay
        .check_transaction_and_execute(executor(), token(), vec![0xaa, 0xbb, 0xcc])
        .await
        .unwrap_err();
    assert_eq!(err.deny_code(), Some(DenyCode::MalformedPayload));
}

#[tokio::test]
async fn disallowed_target_is_denied() {
    let (svc, _) = service();
    let err = svc
        .relay
        .check_transaction_and_execute(executor(), rewards(), payload(sel_aa()))
        .await
        .unwrap_err();
    assert_eq!(err.deny_code(), Some(DenyCode::FunctionNotAllowed));
}

#[tokio::test]
async fn target_revert_reason_is_verbatim() {
    let (svc, vault) = service();
    vault
        .register_target(token(), Reverts("Claimable: already claimed".into()))
        .unwrap();

    let err = svc
        .relay
        .check_transaction_and_execute(executor(), token(), payload(sel_aa()))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        RelayError::TargetCallFailed("Claimable: already claimed".into())
    );
}

#[tokio::test]
async fn slow_vault_times_out() {
    let vault = Arc::new(InMemoryVault::with_module(MODULE));
    vault
        .set_latency(Some(Duration::from_millis(500)))
        .unwrap();
    let svc = service_with(vault.clone(), Duration::from_millis(20));

    let err = svc
        .relay
        .check_transaction_and_execute(executor(), token(), payload(sel_aa()))
        .await
        .unwrap_err();
    assert_eq!(err.deny_code(), Some(DenyCode::Timeout));

    let timeouts = svc
        .ledger
        .query(&LedgerFilter::new().with_outcome(OutcomeKind::Timeout))
        .unwrap();
    assert_eq!(timeouts.len(), 1);
}

#[tokio::test]
async fn removed_executor_in_flight_completes_then_is_blocked() {
    let vault = Arc::new(InMemoryVault::with_module(MODULE));
    vault
        .set_latency(Some(Duration::from_millis(100)))
        .unwrap();
    let svc = service_with(vault.clone(), Duration::from_secs(5));

    let in_flight = {
        let svc = svc.clone();
        tokio::spawn(async move {
            svc.relay
                .check_transaction_and_execute(executor(), token(), payload(sel_aa()))
                .await
        })
    };

    // Let the request clear evaluation and start waiting on the vault.
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(svc
        .governance
        .remove_executor(&governance(), &executor())
        .unwrap());

    assert!(in_flight.await.unwrap().is_ok());

    let err = svc
        .relay
        .check_transaction_and_execute(executor(), token(), payload(sel_aa()))
        .await
        .unwrap_err();
    assert_eq!(err.deny_code(), Some(DenyCode::NotExecutor));
}

#[tokio::test]
async fn governance_is_restricted_to_the_governance_principal() {
    let (svc, _) = service();
    let err = svc
        .governance
        .add_executor(&executor(), stranger())
        .unwrap_err();
    assert_eq!(err.deny_code(), Some(DenyCode::Unauthorized));

    // The denied stranger stays denied.
    let denied = svc
        .relay
        .check_transaction_and_execute(stranger(), token(), payload(sel_aa()))
        .await
        .unwrap_err();
    assert_eq!(denied.deny_code(), Some(DenyCode::NotExecutor));
}

#[tokio::test]
async fn ledger_records_every_attempt() {
    let (svc, _) = service();
    let _ = svc
        .relay
        .check_transaction_and_execute(executor(), token(), payload(sel_aa()))
        .await;
    let _ = svc
        .relay
        .check_transaction_and_execute(stranger(), token(), payload(sel_aa()))
        .await;
    svc.governance
        .set_target_allowed(&governance(), &rewards(), true)
        .unwrap();

    let all = svc.ledger.query(&LedgerFilter::new()).unwrap();
    assert_eq!(all.len(), 3);

    let denied = svc
        .ledger
        .query(&LedgerFilter::new().with_caller(stranger()))
        .unwrap();
    assert_eq!(denied.len(), 1);
    match &denied[0].record {
        relay_service::LedgerRecord::Action { outcome, .. } => match outcome {
            ActionOutcome::Denied { reason } => assert_eq!(reason.code, DenyCode::NotExecutor),
            other => panic!("expected denial, got {:?}", other),
        },
        other => panic!("expected action record, got {:?}", other),
    }
}

#[tokio::test]
async fn concurrent_relays_see_consistent_policy() {
    let (svc, vault) = service();
    let gov = governance();
    svc.governance.set_scoped(&gov, &token(), true).unwrap();
    svc.governance
        .set_allowed_function(&gov, &token(), &sel_aa(), true)
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..32 {
        let svc = svc.clone();
        handles.push(tokio::spawn(async move {
            svc.relay
                .check_transaction_and_execute(executor(), token(), payload(sel_aa()))
                .await
        }));
    }
    let toggler = {
        let svc = svc.clone();
        tokio::spawn(async move {
            for i in 0..16 {
                svc.governance
                    .set_allowed_function(&gov, &token(), &sel_aa(), i % 2 == 1)
                    .unwrap();
                tokio::task::yield_now().await;
            }
        })
    };

    let mut executed = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => executed += 1,
            Err(err) => assert_eq!(err.deny_code(), Some(DenyCode::FunctionNotAllowed)),
        }
    }
    toggler.await.unwrap();

    assert_eq!(vault.executed().unwrap().len(), executed);
    // Two setup changes, every relay attempt and every toggle.
    assert_eq!(svc.ledger.len().unwrap(), 2 + 32 + 16);
}
