//! Write Client - signs and submits starship transactions through the wallet
//!
//! Every write first makes sure the wallet is on the target chain. If it
//! is not, a `wallet_switchEthereumChain` is requested and the chain id is
//! read back; nothing is signed on the wrong network.

use crate::abi::IStarship;
use crate::reader::StarshipReader;
use crate::rpc::ContractCaller;
use crate::wallet::{self, chain_id_hex, ProviderError, WalletProvider};
use alloy_primitives::{Address, Bytes, B256, U256, U64};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use omni_types::{
    MessagingFee, NetworkDescriptor, NetworkKey, OmniError, OmniResult, RejectionCause,
    SendParam, TxHandle,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

/// Per-chain starship writes
#[async_trait]
pub trait StarshipWrite: Send + Sync {
    fn network(&self) -> &NetworkKey;

    /// Connected wallet account
    async fn account(&self) -> OmniResult<Address>;

    async fn mint(&self, to: Address, amount: u64) -> OmniResult<TxHandle>;

    async fn quote_send(&self, param: &SendParam) -> OmniResult<MessagingFee>;

    /// Submit an ONFT send paying exactly `fee.native_fee`
    async fn send(
        &self,
        param: &SendParam,
        fee: &MessagingFee,
        refund_address: Address,
    ) -> OmniResult<TxHandle>;
}

/// `eth_sendTransaction` parameters
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TransactionRequest {
    from: Address,
    to: Address,
    data: Bytes,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<U256>,
    chain_id: U64,
}

/// Starship writer bound to one chain
pub struct StarshipWriter<C> {
    descriptor: NetworkDescriptor,
    wallet: Arc<dyn WalletProvider>,
    reader: StarshipReader<C>,
}

impl<C: ContractCaller> StarshipWriter<C> {
    /// `caller` serves the view calls (quotes) for this chain
    pub fn new(descriptor: NetworkDescriptor, wallet: Arc<dyn WalletProvider>, caller: C) -> Self {
        let reader = StarshipReader::new(&descriptor, caller);
        Self {
            descriptor,
            wallet,
            reader,
        }
    }

    /// Make sure the wallet is on this writer's chain, switching if needed
    pub async fn ensure_network(&self) -> OmniResult<()> {
        let expected = self.descriptor.chain_id;
        let wrong_network = |reason: String| OmniError::WrongNetwork { expected, reason };

        let current = wallet::chain_id(self.wallet.as_ref())
            .await
            .map_err(|e| wrong_network(e.message))?;
        if current == expected {
            return Ok(());
        }

        tracing::info!(
            "Wallet on chain {}, requesting switch to {} ({})",
            current,
            expected,
            self.descriptor.key
        );

        self.wallet
            .request(
                "wallet_switchEthereumChain",
                json!([{ "chainId": chain_id_hex(expected) }]),
            )
            .await
            .map_err(|e| match e.code {
                ProviderError::USER_REJECTED => {
                    wrong_network("switch rejected by user".to_string())
                }
                ProviderError::UNRECOGNIZED_CHAIN => {
                    wrong_network(format!("{} not added to wallet", self.descriptor.key))
                }
                _ => wrong_network(e.message),
            })?;

        let confirmed = wallet::chain_id(self.wallet.as_ref())
            .await
            .map_err(|e| wrong_network(e.message))?;
        if confirmed != expected {
            return Err(wrong_network(format!("wallet still on chain {}", confirmed)));
        }

        Ok(())
    }

    async fn submit(
        &self,
        from: Address,
        data: Vec<u8>,
        value: Option<U256>,
    ) -> OmniResult<TxHandle> {
        self.ensure_network().await?;

        let tx = TransactionRequest {
            from,
            to: self.descriptor.contract_address,
            data: data.into(),
            value,
            chain_id: U64::from(self.descriptor.chain_id),
        };

        let result = self
            .wallet
            .request("eth_sendTransaction", json!([tx]))
            .await
            .map_err(rejected)?;

        let hash: B256 = serde_json::from_value(result).map_err(|e| {
            OmniError::TransactionRejected {
                cause: RejectionCause::Failed,
                message: format!("wallet returned no transaction hash: {}", e),
            }
        })?;

        tracing::info!("Submitted {} on {}", hash, self.descriptor.key);
        Ok(TxHandle {
            hash,
            network: self.descriptor.key.clone(),
        })
    }
}

#[async_trait]
impl<C: ContractCaller> StarshipWrite for StarshipWriter<C> {
    fn network(&self) -> &NetworkKey {
        &self.descriptor.key
    }

    async fn account(&self) -> OmniResult<Address> {
        wallet::primary_account(self.wallet.as_ref()).await
    }

    async fn mint(&self, to: Address, amount: u64) -> OmniResult<TxHandle> {
        let from = self.account().await?;
        let call = IStarship::mintCall {
            to,
            amount: U256::from(amount),
        };
        tracing::info!("Minting {} ship(s) to {} on {}", amount, to, self.descriptor.key);
        self.submit(from, call.abi_encode(), None).await
    }

    async fn quote_send(&self, param: &SendParam) -> OmniResult<MessagingFee> {
        self.reader.quote_send(param).await
    }

    async fn send(
        &self,
        param: &SendParam,
        fee: &MessagingFee,
        refund_address: Address,
    ) -> OmniResult<TxHandle> {
        let from = self.account().await?;
        // The fee is always paid in native gas
        let paid = MessagingFee {
            native_fee: fee.native_fee,
            lz_token_fee: U256::ZERO,
        };
        let call = IStarship::sendCall {
            sendParam: param.into(),
            fee: (&paid).into(),
            refundAddress: refund_address,
        };
        self.submit(from, call.abi_encode(), Some(fee.native_fee)).await
    }
}

/// Map a wallet refusal onto the rejection taxonomy
pub(crate) fn rejected(error: ProviderError) -> OmniError {
    let cause = if error.is_user_rejection() {
        RejectionCause::UserCancelled
    } else if error.is_revert() {
        RejectionCause::Reverted
    } else {
        RejectionCause::Failed
    };
    tracing::warn!("Transaction {}: {}", cause, error.message);
    OmniError::TransactionRejected {
        cause,
        message: error.message,
    }
}
