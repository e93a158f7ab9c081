use std::sync::Arc;

use relay_gate::{AllowListStore, ExecutorRegistry, PolicyEvaluator};
use relay_types::{Principal, Selector, Target};
use relay_vault::VaultAuthority;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::BootstrapError;
use crate::governance::Governance;
use crate::ledger::RelayLedger;
use crate::relay::{ExecutionRelay, RelayConfig};

/// Startup policy for one target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetPolicy {
    pub target: Target,
    #[serde(default = "default_allowed")]
    pub allowed: bool,
    #[serde(default)]
    pub scoped: bool,
    /// Selectors to permit, each either `0x`-hex or a signature such as
    /// `transfer(address,uint256)`.
    #[serde(default)]
    pub selectors: Vec<String>,
}

fn default_allowed() -> bool {
    true
}

/// Policy applied once at startup, before any request is served.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub governance: Option<Principal>,
    #[serde(default)]
    pub executors: Vec<Principal>,
    #[serde(default)]
    pub targets: Vec<TargetPolicy>,
}

impl PolicyConfig {
    /// Write the policy into fresh stores. Selectors are all parsed before
    /// anything is written.
    pub fn apply(
        &self,
        allowlist: &AllowListStore,
        registry: &ExecutorRegistry,
    ) -> Result<(), BootstrapError> {
        let mut resolved = Vec::with_capacity(self.targets.len());
        for policy in &self.targets {
            let selectors = policy
                .selectors
                .iter()
                .map(|input| {
                    Selector::parse_or_derive(input).map_err(|source| {
                        BootstrapError::InvalidSelector {
                            input: input.clone(),
                            source,
                        }
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            resolved.push((policy, selectors));
        }

        for executor in &self.executors {
            registry.add_executor(executor)?;
        }
        for (policy, selectors) in resolved {
            allowlist.set_target_allowed(&policy.target, policy.allowed)?;
            allowlist.set_scoped(&policy.target, policy.scoped)?;
            for selector in &selectors {
                allowlist.set_allowed_function(&policy.target, selector, true)?;
            }
            info!(
                target = %policy.target,
                allowed = policy.allowed,
                scoped = policy.scoped,
                selectors = selectors.len(),
                "bootstrap target"
            );
        }
        Ok(())
    }
}

/// The assembled relay: stores, evaluator, relay, governance and ledger
/// sharing one set of handles.
pub struct RelayService {
    pub relay: ExecutionRelay,
    pub governance: Governance,
    pub allowlist: Arc<AllowListStore>,
    pub registry: Arc<ExecutorRegistry>,
    pub ledger: Arc<RelayLedger>,
}

impl RelayService {
    pub fn build(
        policy: &PolicyConfig,
        vault: Arc<dyn VaultAuthority>,
        config: RelayConfig,
    ) -> Result<Self, BootstrapError> {
        let governance = policy.governance.ok_or(BootstrapError::MissingGovernance)?;

        let allowlist = Arc::new(AllowListStore::new());
        let registry = Arc::new(ExecutorRegistry::new());
        let ledger = Arc::new(RelayLedger::with_capacity(config.ledger_capacity));
        policy.apply(&allowlist, &registry)?;

        let evaluator = PolicyEvaluator::new(allowlist.clone(), registry.clone());
        info!(
            governance = %governance,
            executors = policy.executors.len(),
            targets = policy.targets.len(),
            module = %config.module,
            vault = vault.name(),
            "relay service assembled"
        );

        Ok(Self {
            relay: ExecutionRelay::new(evaluator, vault, ledger.clone(), config),
            governance: Governance::new(
                governance,
                allowlist.clone(),
                registry.clone(),
                ledger.clone(),
            ),
            allowlist,
            registry,
            ledger,
        })
    }
}
