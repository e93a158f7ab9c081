//! Vault authority: the external custody mechanism that executes calls the
//! relay has permitted.
//!
//! The relay talks to the vault only through [`VaultAuthority`]. Two
//! backends ship here: [`InMemoryVault`] for tests and single-process
//! deployments, and [`HttpVault`] for a vault reached over HTTP.

pub mod authority;
pub mod error;
pub mod http;
pub mod memory;

pub use authority::{ExecutionReceipt, VaultAuthority};
pub use error::{VaultError, VaultResult, MODULE_NOT_ENABLED};
pub use http::{ExecuteCall, ExecuteResult, HttpVault};
pub use memory::{
    ExecutedCall, InMemoryVault, Returns, Reverts, TargetBehaviour, DEFAULT_CALL_LOG_CAPACITY,
};
