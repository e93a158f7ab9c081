use std::sync::Arc;

use relay_gate::{AllowListStore, ExecutorRegistry};
use relay_types::{Principal, Selector, Target};
use tracing::{error, info, warn};

use crate::error::GovernanceError;
use crate::ledger::{GovernanceChange, RelayLedger};

/// Governance Interface.
///
/// The only mutation path into the allow-list and executor registry. Every
/// call is checked against the single governance principal before anything
/// is touched. Setters are idempotent and return whether state changed;
/// only changes reach the ledger.
pub struct Governance {
    governance: Principal,
    allowlist: Arc<AllowListStore>,
    registry: Arc<ExecutorRegistry>,
    ledger: Arc<RelayLedger>,
}

impl Governance {
    pub fn new(
        governance: Principal,
        allowlist: Arc<AllowListStore>,
        registry: Arc<ExecutorRegistry>,
        ledger: Arc<RelayLedger>,
    ) -> Self {
        Self {
            governance,
            allowlist,
            registry,
            ledger,
        }
    }

    pub fn governance(&self) -> &Principal {
        &self.governance
    }

    pub fn add_executor(
        &self,
        caller: &Principal,
        principal: Principal,
    ) -> Result<bool, GovernanceError> {
        self.ensure_governance(caller, "add_executor")?;
        let changed = self.registry.add_executor(&principal)?;
        info!(by = %caller, executor = %principal, changed, "add_executor");
        self.record(changed, caller, GovernanceChange::ExecutorAdded { principal });
        Ok(changed)
    }

    pub fn remove_executor(
        &self,
        caller: &Principal,
        principal: &Principal,
    ) -> Result<bool, GovernanceError> {
        self.ensure_governance(caller, "remove_executor")?;
        let changed = self.registry.remove_executor(principal)?;
        info!(by = %caller, executor = %principal, changed, "remove_executor");
        self.record(
            changed,
            caller,
            GovernanceChange::ExecutorRemoved {
                principal: *principal,
            },
        );
        Ok(changed)
    }

    pub fn set_target_allowed(
        &self,
        caller: &Principal,
        target: &Target,
        value: bool,
    ) -> Result<bool, GovernanceError> {
        self.ensure_governance(caller, "set_target_allowed")?;
        let changed = self.allowlist.set_target_allowed(target, value)?;
        info!(by = %caller, target = %target, value, changed, "set_target_allowed");
        self.record(
            changed,
            caller,
            GovernanceChange::TargetAllowed {
                target: *target,
                value,
            },
        );
        Ok(changed)
    }

    pub fn set_scoped(
        &self,
        caller: &Principal,
        target: &Target,
        value: bool,
    ) -> Result<bool, GovernanceError> {
        self.ensure_governance(caller, "set_scoped")?;
        let changed = self.allowlist.set_scoped(target, value)?;
        info!(by = %caller, target = %target, value, changed, "set_scoped");
        self.record(
            changed,
            caller,
            GovernanceChange::TargetScoped {
                target: *target,
                value,
            },
        );
        Ok(changed)
    }

    pub fn set_allowed_function(
        &self,
        caller: &Principal,
        target: &Target,
        selector: &Selector,
        value: bool,
    ) -> Result<bool, GovernanceError> {
        self.ensure_governance(caller, "set_allowed_function")?;
        let changed = self.allowlist.set_allowed_function(target, selector, value)?;
        info!(
            by = %caller,
            target = %target,
            selector = %selector,
            value,
            changed,
            "set_allowed_function"
        );
        self.record(
            changed,
            caller,
            GovernanceChange::SelectorAllowed {
                target: *target,
                selector: *selector,
                value,
            },
        );
        Ok(changed)
    }

    /// Fail with `Unauthorized` unless `caller` is the governance principal.
    ///
    /// Also guards read access: the configured policy and the ledger are
    /// visible to governance only.
    pub fn ensure_governance(
        &self,
        caller: &Principal,
        operation: &'static str,
    ) -> Result<(), GovernanceError> {
        if *caller != self.governance {
            warn!(caller = %caller, operation, "unauthorized governance call");
            return Err(GovernanceError::Unauthorized {
                caller: *caller,
                operation,
            });
        }
        Ok(())
    }

    /// The mutation has already been applied, so a ledger failure is logged
    /// rather than reported as a failed call.
    fn record(&self, changed: bool, by: &Principal, change: GovernanceChange) {
        if !changed {
            return;
        }
        if let Err(err) = self.ledger.record_governance(*by, change) {
            error!(error = %err, by = %by, "failed to record governance change");
        }
    }
}
