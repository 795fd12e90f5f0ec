//! Chain node client
//!
//! `eth_call` and receipt lookups against a chain's public JSON-RPC.

use alloy_primitives::{Address, Bytes, B256, U64};
use async_trait::async_trait;
use jsonrpsee::{
    core::{client::ClientT, ClientError},
    http_client::{HttpClient, HttpClientBuilder},
    rpc_params,
};
use omni_types::{NetworkDescriptor, NetworkKey, OmniError, OmniResult};
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Duration};

/// JSON-RPC error code geth and most nodes use for execution reverts
const EXECUTION_REVERTED: i32 = 3;

/// Failure of a single read-only contract call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallError {
    #[error("execution reverted: {0}")]
    Reverted(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("cannot decode return data: {0}")]
    Decode(String),
}

/// Read-only contract call (`readContract` boundary)
#[async_trait]
pub trait ContractCaller: Send + Sync {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, CallError>;
}

#[async_trait]
impl<T: ContractCaller + ?Sized> ContractCaller for Arc<T> {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, CallError> {
        (**self).call(to, data).await
    }
}

#[derive(Debug, Serialize)]
struct CallRequest {
    to: Address,
    data: Bytes,
}

/// Subset of `eth_getTransactionReceipt` we care about
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    #[serde(default)]
    pub block_number: Option<U64>,
    /// `0x1` success, `0x0` reverted
    #[serde(default)]
    pub status: Option<U64>,
}

impl TransactionReceipt {
    pub fn succeeded(&self) -> bool {
        self.status.map(|s| s == U64::from(1)).unwrap_or(false)
    }
}

/// HTTP JSON-RPC client for one chain
pub struct RpcChainClient {
    network: NetworkKey,
    client: HttpClient,
}

impl RpcChainClient {
    /// Create a client for the descriptor's RPC endpoint
    pub fn new(descriptor: &NetworkDescriptor, request_timeout: Duration) -> OmniResult<Self> {
        let client = HttpClientBuilder::default()
            .request_timeout(request_timeout)
            .build(&descriptor.rpc_url)
            .map_err(|e| {
                OmniError::InvalidConfig(format!("bad rpc url {}: {}", descriptor.rpc_url, e))
            })?;

        Ok(Self {
            network: descriptor.key.clone(),
            client,
        })
    }

    pub fn network(&self) -> &NetworkKey {
        &self.network
    }

    /// Receipt for `hash`, `None` while pending
    pub async fn transaction_receipt(
        &self,
        hash: B256,
    ) -> Result<Option<TransactionReceipt>, CallError> {
        self.client
            .request("eth_getTransactionReceipt", rpc_params![hash])
            .await
            .map_err(classify)
    }
}

#[async_trait]
impl ContractCaller for RpcChainClient {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, CallError> {
        tracing::trace!("eth_call {} on {}", to, self.network);
        self.client
            .request("eth_call", rpc_params![CallRequest { to, data }, "latest"])
            .await
            .map_err(classify)
    }
}

/// Split node errors into reverts and everything else
fn classify(error: ClientError) -> CallError {
    match error {
        ClientError::Call(obj) => {
            if obj.code() == EXECUTION_REVERTED
                || obj.message().to_ascii_lowercase().contains("revert")
            {
                CallError::Reverted(obj.message().to_string())
            } else {
                CallError::Transport(format!("{} (code {})", obj.message(), obj.code()))
            }
        }
        ClientError::ParseError(e) => CallError::Decode(e.to_string()),
        other => CallError::Transport(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonrpsee::types::ErrorObjectOwned;

    #[test]
    fn test_classify_revert_by_code() {
        let err = ClientError::Call(ErrorObjectOwned::owned(
            3,
            "execution reverted: ERC721NonexistentToken(11)",
            None::<()>,
        ));
        assert!(matches!(classify(err), CallError::Reverted(_)));
    }

    #[test]
    fn test_classify_revert_by_message() {
        let err = ClientError::Call(ErrorObjectOwned::owned(
            -32000,
            "execution reverted",
            None::<()>,
        ));
        assert!(matches!(classify(err), CallError::Reverted(_)));
    }

    #[test]
    fn test_classify_other_errors_as_transport() {
        let err = ClientError::Call(ErrorObjectOwned::owned(
            -32005,
            "rate limit exceeded",
            None::<()>,
        ));
        assert_eq!(
            classify(err),
            CallError::Transport("rate limit exceeded (code -32005)".to_string())
        );
    }

    #[test]
    fn test_receipt_status() {
        let receipt: TransactionReceipt = serde_json::from_value(serde_json::json!({
            "transactionHash": B256::repeat_byte(1),
            "blockNumber": "0x10",
            "status": "0x1"
        }))
        .unwrap();
        assert!(receipt.succeeded());
        assert_eq!(receipt.block_number, Some(U64::from(16)));
    }
}
