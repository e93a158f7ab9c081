use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use relay_types::{DenialReason, Principal, Selector, Target};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LedgerError;

/// How a relay attempt ended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ActionOutcome {
    Executed {
        #[serde(with = "relay_types::hex_bytes")]
        return_data: Vec<u8>,
    },
    Denied {
        reason: DenialReason,
    },
    VaultRejected {
        reason: String,
    },
    TargetCallFailed {
        reason: String,
    },
    Timeout,
    /// Evaluation could not run.
    Error {
        message: String,
    },
}

impl ActionOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            ActionOutcome::Executed { .. } => OutcomeKind::Executed,
            ActionOutcome::Denied { .. } => OutcomeKind::Denied,
            ActionOutcome::VaultRejected { .. } => OutcomeKind::VaultRejected,
            ActionOutcome::TargetCallFailed { .. } => OutcomeKind::TargetCallFailed,
            ActionOutcome::Timeout => OutcomeKind::Timeout,
            ActionOutcome::Error { .. } => OutcomeKind::Error,
        }
    }
}

/// Outcome without its payload, for filtering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Executed,
    Denied,
    VaultRejected,
    TargetCallFailed,
    Timeout,
    Error,
}

impl OutcomeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OutcomeKind::Executed => "executed",
            OutcomeKind::Denied => "denied",
            OutcomeKind::VaultRejected => "vault_rejected",
            OutcomeKind::TargetCallFailed => "target_call_failed",
            OutcomeKind::Timeout => "timeout",
            OutcomeKind::Error => "error",
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutcomeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "executed" => Ok(OutcomeKind::Executed),
            "denied" => Ok(OutcomeKind::Denied),
            "vault_rejected" => Ok(OutcomeKind::VaultRejected),
            "target_call_failed" => Ok(OutcomeKind::TargetCallFailed),
            "timeout" => Ok(OutcomeKind::Timeout),
            "error" => Ok(OutcomeKind::Error),
            other => Err(format!("unknown outcome: {}", other)),
        }
    }
}

/// A governance mutation that changed state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum GovernanceChange {
    ExecutorAdded { principal: Principal },
    ExecutorRemoved { principal: Principal },
    TargetAllowed { target: Target, value: bool },
    TargetScoped { target: Target, value: bool },
    SelectorAllowed {
        target: Target,
        selector: Selector,
        value: bool,
    },
}

impl GovernanceChange {
    pub fn target(&self) -> Option<&Target> {
        match self {
            GovernanceChange::TargetAllowed { target, .. }
            | GovernanceChange::TargetScoped { target, .. }
            | GovernanceChange::SelectorAllowed { target, .. } => Some(target),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerRecord {
    Action {
        caller: Principal,
        target: Target,
        selector: Option<Selector>,
        #[serde(flatten)]
        outcome: ActionOutcome,
    },
    Governance {
        by: Principal,
        #[serde(flatten)]
        change: GovernanceChange,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    #[serde(flatten)]
    pub record: LedgerRecord,
}

/// Filter for querying the ledger. Unset fields match everything.
#[derive(Clone, Debug, Default)]
pub struct LedgerFilter {
    pub caller: Option<Principal>,
    pub target: Option<Target>,
    pub outcome: Option<OutcomeKind>,
}

impl LedgerFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_caller(mut self, caller: Principal) -> Self {
        self.caller = Some(caller);
        self
    }

    pub fn with_target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_outcome(mut self, outcome: OutcomeKind) -> Self {
        self.outcome = Some(outcome);
        self
    }

    /// Governance records carry no outcome, so an outcome filter excludes
    /// them.
    pub fn matches(&self, entry: &LedgerEntry) -> bool {
        match &entry.record {
            LedgerRecord::Action {
                caller,
                target,
                outcome,
                ..
            } => {
                self.caller.map_or(true, |c| c == *caller)
                    && self.target.map_or(true, |t| t == *target)
                    && self.outcome.map_or(true, |o| o == outcome.kind())
            }
            LedgerRecord::Governance { by, change } => {
                self.outcome.is_none()
                    && self.caller.map_or(true, |c| c == *by)
                    && self
                        .target
                        .map_or(true, |t| change.target() == Some(&t))
            }
        }
    }
}

/// Entries kept by [`RelayLedger::new`].
pub const DEFAULT_LEDGER_CAPACITY: usize = 10_000;

/// Relay Ledger: append-only record of relay attempts and governance
/// changes.
///
/// There are no update or delete operations. The ledger is bounded: once
/// `capacity` entries are held, each append evicts the oldest entry.
pub struct RelayLedger {
    entries: RwLock<VecDeque<LedgerEntry>>,
    capacity: usize,
}

impl RelayLedger {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_LEDGER_CAPACITY)
    }

    /// Ledger holding at most `capacity` entries (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn append(&self, record: LedgerRecord) -> Result<Uuid, LedgerError> {
        let entry = LedgerEntry {
            id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            record,
        };
        let id = entry.id;
        let mut entries = self
            .entries
            .write()
            .map_err(|_| LedgerError::LockPoisoned("ledger"))?;
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
        Ok(id)
    }

    pub fn record_action(
        &self,
        caller: Principal,
        target: Target,
        selector: Option<Selector>,
        outcome: ActionOutcome,
    ) -> Result<Uuid, LedgerError> {
        self.append(LedgerRecord::Action {
            caller,
            target,
            selector,
            outcome,
        })
    }

    pub fn record_governance(
        &self,
        by: Principal,
        change: GovernanceChange,
    ) -> Result<Uuid, LedgerError> {
        self.append(LedgerRecord::Governance { by, change })
    }

    /// Entries matching `filter`, oldest first.
    pub fn query(&self, filter: &LedgerFilter) -> Result<Vec<LedgerEntry>, LedgerError> {
        Ok(self
            .entries
            .read()
            .map_err(|_| LedgerError::LockPoisoned("ledger"))?
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect())
    }

    pub fn get(&self, id: &Uuid) -> Result<Option<LedgerEntry>, LedgerError> {
        Ok(self
            .entries
            .read()
            .map_err(|_| LedgerError::LockPoisoned("ledger"))?
            .iter()
            .find(|e| e.id == *id)
            .cloned())
    }

    pub fn len(&self) -> Result<usize, LedgerError> {
        Ok(self
            .entries
            .read()
            .map_err(|_| LedgerError::LockPoisoned("ledger"))?
            .len())
    }

    pub fn is_empty(&self) -> Result<bool, LedgerError> {
        Ok(self.len()? == 0)
    }

    /// Poison the entries lock, for exercising failure paths.
    #[cfg(test)]
    pub(crate) fn poison(&self) {
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = self.entries.write();
            panic!("poisoning ledger");
        }));
    }
}

impl Default for RelayLedger {
    fn default() -> Self {
        Self::new()
    }
}
