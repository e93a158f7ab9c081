//! Relay service: the execution relay, the governance interface and the
//! relay ledger, wired over the gate's stores.
//!
//! ```text
//! governance ──► Governance ──► AllowListStore / ExecutorRegistry
//!                                     ▲ (read)
//! caller ──► ExecutionRelay ──► PolicyEvaluator ──permit──► VaultAuthority
//!                  │
//!                  └──► RelayLedger
//! ```

pub mod bootstrap;
pub mod error;
pub mod governance;
pub mod ledger;
pub mod relay;

pub use bootstrap::{PolicyConfig, RelayService, TargetPolicy};
pub use error::{BootstrapError, GovernanceError, LedgerError, RelayError};
pub use governance::Governance;
pub use ledger::{
    ActionOutcome, GovernanceChange, LedgerEntry, LedgerFilter, LedgerRecord, OutcomeKind,
    RelayLedger, DEFAULT_LEDGER_CAPACITY,
};
pub use relay::{ExecutionRelay, ExecutionResult, RelayConfig};
