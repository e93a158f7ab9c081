use std::time::Duration;

use async_trait::async_trait;
use relay_types::{decode_hex, encode_hex, Address, CallType, Target};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::authority::{ExecutionReceipt, VaultAuthority};
use crate::error::{VaultError, VaultResult};

/// Body of `POST {base_url}/execute`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteCall {
    pub module: Address,
    pub target: Target,
    /// `0x`-hex payload
    pub data: String,
    /// `0x`-hex value
    pub value: String,
    /// 0 = call, 1 = delegate call
    pub operation: u8,
}

/// Response to `POST {base_url}/execute`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteResult {
    pub success: bool,
    #[serde(default)]
    pub return_data: Option<String>,
    #[serde(default)]
    pub revert_reason: Option<String>,
}

/// Vault reached over HTTP.
///
/// A 403 means the vault does not recognise the module. Any other non-2xx
/// status, connection failure or undecodable body is a transport error.
pub struct HttpVault {
    base_url: String,
    client: Client,
}

impl HttpVault {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> VaultResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VaultError::Transport(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn map_send_error(err: reqwest::Error) -> VaultError {
        if err.is_timeout() {
            VaultError::Timeout
        } else {
            VaultError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl VaultAuthority for HttpVault {
    async fn execute(
        &self,
        module: &Address,
        target: &Target,
        payload: &[u8],
        value: u128,
        call_type: CallType,
    ) -> VaultResult<ExecutionReceipt> {
        let body = ExecuteCall {
            module: *module,
            target: *target,
            data: encode_hex(payload),
            value: format!("{:#x}", value),
            operation: call_type.as_u8(),
        };
        let url = format!("{}/execute", self.base_url);
        debug!(url = %url, target = %target, "forwarding to vault");

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let status = resp.status();
        if status == StatusCode::FORBIDDEN {
            warn!(module = %module, "vault reports module not enabled");
            return Err(VaultError::ModuleNotEnabled);
        }
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(VaultError::Transport(format!("{}: {}", status, text)));
        }

        let result: ExecuteResult = resp.json().await.map_err(Self::map_send_error)?;
        if !result.success {
            return Err(VaultError::TargetReverted(
                result.revert_reason.unwrap_or_default(),
            ));
        }

        let return_data = match result.return_data {
            Some(hex) => decode_hex(&hex).map_err(|e| VaultError::Transport(e.to_string()))?,
            None => Vec::new(),
        };
        Ok(ExecutionReceipt::new(return_data))
    }

    fn name(&self) -> &str {
        "http"
    }
}
