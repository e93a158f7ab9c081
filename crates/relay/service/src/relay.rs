use std::sync::Arc;
use std::time::Duration;

use relay_gate::{Evaluation, PolicyEvaluator};
use relay_types::{ActionRequest, Address, CallType, Decision, Principal, Selector, Target};
use relay_vault::{VaultAuthority, VaultError};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::error::RelayError;
use crate::ledger::{ActionOutcome, RelayLedger, DEFAULT_LEDGER_CAPACITY};

/// Execution relay settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelayConfig {
    /// The relay's module identity as registered with the vault.
    pub module: Address,
    /// Upper bound on the forward-to-vault step.
    pub forward_timeout: Duration,
    /// Most ledger entries kept; older ones are evicted.
    pub ledger_capacity: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            module: Address::ZERO,
            forward_timeout: Duration::from_secs(30),
            ledger_capacity: DEFAULT_LEDGER_CAPACITY,
        }
    }
}

/// A successfully relayed action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub selector: Selector,
    #[serde(with = "relay_types::hex_bytes")]
    pub return_data: Vec<u8>,
}

/// Execution Relay.
///
/// Evaluates each request and forwards permitted ones to the vault with
/// zero value as a plain call. Store and registry locks are only held inside
/// evaluation, never while waiting on the vault. Nothing is retried.
pub struct ExecutionRelay {
    evaluator: PolicyEvaluator,
    vault: Arc<dyn VaultAuthority>,
    ledger: Arc<RelayLedger>,
    config: RelayConfig,
}

impl ExecutionRelay {
    pub fn new(
        evaluator: PolicyEvaluator,
        vault: Arc<dyn VaultAuthority>,
        ledger: Arc<RelayLedger>,
        config: RelayConfig,
    ) -> Self {
        Self {
            evaluator,
            vault,
            ledger,
            config,
        }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Dry run: the decision the relay would reach, without forwarding or
    /// recording anything.
    pub fn evaluate(
        &self,
        caller: Principal,
        target: Target,
        payload: Vec<u8>,
    ) -> Result<Evaluation, RelayError> {
        let request = ActionRequest::new(caller, target, payload);
        Ok(self.evaluator.evaluate(&request)?)
    }

    /// Evaluate the action and, if permitted, have the vault execute it.
    pub async fn check_transaction_and_execute(
        &self,
        caller: Principal,
        target: Target,
        payload: Vec<u8>,
    ) -> Result<ExecutionResult, RelayError> {
        let request = ActionRequest::new(caller, target, payload);

        let decision = match self.evaluator.decide(&request) {
            Ok(decision) => decision,
            Err(err) => {
                error!(error = %err, "evaluation failed");
                self.record(
                    &request,
                    None,
                    ActionOutcome::Error {
                        message: err.to_string(),
                    },
                );
                return Err(err.into());
            }
        };

        let selector = match decision {
            Decision::Permit { selector } => selector,
            Decision::Deny { reason } => {
                self.record(
                    &request,
                    request.selector(),
                    ActionOutcome::Denied {
                        reason: reason.clone(),
                    },
                );
                return Err(RelayError::Denied(reason));
            }
        };

        let forward = self.vault.execute(
            &self.config.module,
            &request.target,
            &request.payload,
            0,
            CallType::Call,
        );
        let result = match tokio::time::timeout(self.config.forward_timeout, forward).await {
            Ok(Ok(receipt)) => Ok(ExecutionResult {
                selector,
                return_data: receipt.return_data,
            }),
            Ok(Err(VaultError::TargetReverted(reason))) => {
                Err(RelayError::TargetCallFailed(reason))
            }
            Ok(Err(VaultError::Timeout)) | Err(_) => {
                Err(RelayError::Timeout(self.config.forward_timeout))
            }
            Ok(Err(err)) => Err(RelayError::VaultRejected(err.to_string())),
        };

        let outcome = match &result {
            Ok(executed) => {
                info!(
                    caller = %request.caller,
                    target = %request.target,
                    selector = %selector,
                    vault = self.vault.name(),
                    "action executed"
                );
                ActionOutcome::Executed {
                    return_data: executed.return_data.clone(),
                }
            }
            Err(err) => {
                warn!(
                    caller = %request.caller,
                    target = %request.target,
                    selector = %selector,
                    error = %err,
                    "forwarded action failed"
                );
                match err {
                    RelayError::TargetCallFailed(reason) => ActionOutcome::TargetCallFailed {
                        reason: reason.clone(),
                    },
                    RelayError::Timeout(_) => ActionOutcome::Timeout,
                    other => ActionOutcome::VaultRejected {
                        reason: other.reason(),
                    },
                }
            }
        };
        self.record(&request, Some(selector), outcome);

        result
    }

    /// Ledger failures are logged, never allowed to mask the action's result.
    fn record(&self, request: &ActionRequest, selector: Option<Selector>, outcome: ActionOutcome) {
        if let Err(err) = self
            .ledger
            .record_action(request.caller, request.target, selector, outcome)
        {
            error!(error = %err, "failed to record relay attempt");
        }
    }
}
