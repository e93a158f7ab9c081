use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use relay_types::{Address, CallType, Target};
use serde::Serialize;
use tracing::{debug, warn};

use crate::authority::{ExecutionReceipt, VaultAuthority};
use crate::error::{VaultError, VaultResult};

/// How a registered target answers a call.
pub trait TargetBehaviour: Send + Sync {
    /// Return data on success, revert reason on failure.
    fn call(&self, payload: &[u8]) -> Result<Vec<u8>, String>;
}

impl<F> TargetBehaviour for F
where
    F: Fn(&[u8]) -> Result<Vec<u8>, String> + Send + Sync,
{
    fn call(&self, payload: &[u8]) -> Result<Vec<u8>, String> {
        self(payload)
    }
}

/// Target that always returns the same data.
pub struct Returns(pub Vec<u8>);

impl TargetBehaviour for Returns {
    fn call(&self, _payload: &[u8]) -> Result<Vec<u8>, String> {
        Ok(self.0.clone())
    }
}

/// Target that always reverts with the same reason.
pub struct Reverts(pub String);

impl TargetBehaviour for Reverts {
    fn call(&self, _payload: &[u8]) -> Result<Vec<u8>, String> {
        Err(self.0.clone())
    }
}

/// One call the vault carried out (successful or reverted).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExecutedCall {
    pub module: Address,
    pub target: Target,
    #[serde(with = "relay_types::hex_bytes")]
    pub payload: Vec<u8>,
    pub value: u128,
    pub reverted: bool,
}

/// Calls kept in the log by [`InMemoryVault::new`].
pub const DEFAULT_CALL_LOG_CAPACITY: usize = 1_024;

struct VaultState {
    modules: HashSet<Address>,
    guard_enabled: bool,
    latency: Option<Duration>,
    targets: HashMap<Target, Arc<dyn TargetBehaviour>>,
    executed: VecDeque<ExecutedCall>,
    log_capacity: usize,
}

/// In-process vault.
///
/// Models the parts of a custody vault the relay depends on: the set of
/// enabled modules, a guard switch, per-target behaviour and a bounded call
/// log. Calls to unregistered targets succeed with empty return data.
pub struct InMemoryVault {
    state: RwLock<VaultState>,
}

impl InMemoryVault {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(VaultState {
                modules: HashSet::new(),
                guard_enabled: true,
                latency: None,
                targets: HashMap::new(),
                executed: VecDeque::new(),
                log_capacity: DEFAULT_CALL_LOG_CAPACITY,
            }),
        }
    }

    /// Vault with `module` already enabled.
    pub fn with_module(module: Address) -> Self {
        let vault = Self::new();
        if let Ok(mut state) = vault.state.write() {
            state.modules.insert(module);
        }
        vault
    }

    /// Keep at most `capacity` calls (at least one) in the log, dropping
    /// the oldest first.
    pub fn with_call_log_capacity(self, capacity: usize) -> Self {
        if let Ok(mut state) = self.state.write() {
            state.log_capacity = capacity.max(1);
            while state.executed.len() > state.log_capacity {
                state.executed.pop_front();
            }
        }
        self
    }

    pub fn enable_module(&self, module: Address) -> VaultResult<bool> {
        Ok(self.write()?.modules.insert(module))
    }

    /// Revoke a module. Takes effect for every subsequent call.
    pub fn disable_module(&self, module: &Address) -> VaultResult<bool> {
        Ok(self.write()?.modules.remove(module))
    }

    pub fn is_module_enabled(&self, module: &Address) -> VaultResult<bool> {
        Ok(self.read()?.modules.contains(module))
    }

    pub fn modules(&self) -> VaultResult<Vec<Address>> {
        let mut out: Vec<Address> = self.read()?.modules.iter().copied().collect();
        out.sort();
        Ok(out)
    }

    pub fn set_guard_enabled(&self, enabled: bool) -> VaultResult<()> {
        self.write()?.guard_enabled = enabled;
        Ok(())
    }

    /// Delay every call by `latency` before answering.
    pub fn set_latency(&self, latency: Option<Duration>) -> VaultResult<()> {
        self.write()?.latency = latency;
        Ok(())
    }

    pub fn register_target(
        &self,
        target: Target,
        behaviour: impl TargetBehaviour + 'static,
    ) -> VaultResult<()> {
        self.write()?.targets.insert(target, Arc::new(behaviour));
        Ok(())
    }

    /// Logged calls, oldest first.
    pub fn executed(&self) -> VaultResult<Vec<ExecutedCall>> {
        Ok(self.read()?.executed.iter().cloned().collect())
    }

    fn read(&self) -> VaultResult<std::sync::RwLockReadGuard<'_, VaultState>> {
        self.state
            .read()
            .map_err(|_| VaultError::LockPoisoned("vault"))
    }

    fn write(&self) -> VaultResult<std::sync::RwLockWriteGuard<'_, VaultState>> {
        self.state
            .write()
            .map_err(|_| VaultError::LockPoisoned("vault"))
    }
}

impl Default for InMemoryVault {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VaultAuthority for InMemoryVault {
    async fn execute(
        &self,
        module: &Address,
        target: &Target,
        payload: &[u8],
        value: u128,
        call_type: CallType,
    ) -> VaultResult<ExecutionReceipt> {
        let latency = self.read()?.latency;
        if let Some(delay) = latency {
            tokio::time::sleep(delay).await;
        }

        // Permission checks happen after the delay so a revocation during
        // the wait is honoured.
        let behaviour = {
            let state = self.read()?;
            if !state.modules.contains(module) {
                warn!(module = %module, "call from module that is not enabled");
                return Err(VaultError::ModuleNotEnabled);
            }
            if !state.guard_enabled {
                return Err(VaultError::GuardDisabled);
            }
            if call_type != CallType::Call {
                return Err(VaultError::UnsupportedCallType(format!("{:?}", call_type)));
            }
            state.targets.get(target).cloned()
        };

        let outcome = match behaviour {
            Some(behaviour) => behaviour.call(payload),
            None => Ok(Vec::new()),
        };

        {
            let mut state = self.write()?;
            while state.executed.len() >= state.log_capacity {
                state.executed.pop_front();
            }
            state.executed.push_back(ExecutedCall {
                module: *module,
                target: *target,
                payload: payload.to_vec(),
                value,
                reverted: outcome.is_err(),
            });
        }

        match outcome {
            Ok(return_data) => {
                debug!(target = %target, bytes = return_data.len(), "vault call succeeded");
                Ok(ExecutionReceipt::new(return_data))
            }
            Err(reason) => Err(VaultError::TargetReverted(reason)),
        }
    }

    fn name(&self) -> &str {
        "memory"
    }
}
