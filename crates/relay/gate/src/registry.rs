use std::collections::BTreeSet;
use std::sync::RwLock;

use relay_types::Principal;
use tracing::debug;

use crate::error::GateError;
use crate::traits::ExecutorProvider;

/// Executor Registry: the principals allowed to submit actions.
///
/// Add and remove are idempotent and report whether membership changed.
/// Like the allow-list, authorization of the mutating caller is the
/// governance facade's job.
pub struct ExecutorRegistry {
    executors: RwLock<BTreeSet<Principal>>,
}

impl ExecutorRegistry {
    pub fn new() -> Self {
        Self {
            executors: RwLock::new(BTreeSet::new()),
        }
    }

    pub fn with_executors(executors: impl IntoIterator<Item = Principal>) -> Self {
        Self {
            executors: RwLock::new(executors.into_iter().collect()),
        }
    }

    pub fn add_executor(&self, principal: &Principal) -> Result<bool, GateError> {
        let added = self
            .executors
            .write()
            .map_err(|_| GateError::LockPoisoned("executor registry"))?
            .insert(*principal);
        debug!(executor = %principal, added, "executor add");
        Ok(added)
    }

    /// Removing a non-member is a no-op.
    pub fn remove_executor(&self, principal: &Principal) -> Result<bool, GateError> {
        let removed = self
            .executors
            .write()
            .map_err(|_| GateError::LockPoisoned("executor registry"))?
            .remove(principal);
        debug!(executor = %principal, removed, "executor remove");
        Ok(removed)
    }

    /// Current members, sorted.
    pub fn executors(&self) -> Result<Vec<Principal>, GateError> {
        Ok(self
            .executors
            .read()
            .map_err(|_| GateError::LockPoisoned("executor registry"))?
            .iter()
            .copied()
            .collect())
    }
}

impl Default for ExecutorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutorProvider for ExecutorRegistry {
    fn is_executor(&self, principal: &Principal) -> Result<bool, GateError> {
        Ok(self
            .executors
            .read()
            .map_err(|_| GateError::LockPoisoned("executor registry"))?
            .contains(principal))
    }
}
