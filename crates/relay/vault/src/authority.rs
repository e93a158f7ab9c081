use async_trait::async_trait;
use relay_types::{Address, CallType, Target};
use serde::{Deserialize, Serialize};

use crate::error::VaultResult;

/// Result of a call the vault executed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReceipt {
    #[serde(with = "relay_types::hex_bytes")]
    pub return_data: Vec<u8>,
}

impl ExecutionReceipt {
    pub fn new(return_data: impl Into<Vec<u8>>) -> Self {
        Self {
            return_data: return_data.into(),
        }
    }
}

/// The external custody mechanism that actually performs calls.
///
/// The vault only executes on behalf of modules it has enabled, and may
/// revoke a module at any time independently of the relay.
#[async_trait]
pub trait VaultAuthority: Send + Sync {
    /// Execute `payload` against `target` on behalf of `module`.
    async fn execute(
        &self,
        module: &Address,
        target: &Target,
        payload: &[u8],
        value: u128,
        call_type: CallType,
    ) -> VaultResult<ExecutionReceipt>;

    /// Short name for logs.
    fn name(&self) -> &str;
}
