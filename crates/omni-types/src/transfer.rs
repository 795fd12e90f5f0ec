//! Cross-chain transfer types (LayerZero ONFT)

use crate::network::NetworkKey;
use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

/// Fee quote returned by `quoteSend`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagingFee {
    /// Paid as `msg.value`
    pub native_fee: U256,
    pub lz_token_fee: U256,
}

/// ONFT `SendParam`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendParam {
    pub dst_eid: u32,
    /// Recipient, left-padded to 32 bytes
    pub to: B256,
    pub token_id: U256,
    pub extra_options: Bytes,
    pub compose_msg: Bytes,
    pub onft_cmd: Bytes,
}

impl SendParam {
    /// Plain transfer of `token_id` to `recipient` on `dst_eid`, no options or compose
    pub fn new(dst_eid: u32, recipient: Address, token_id: u64) -> Self {
        Self {
            dst_eid,
            to: address_to_bytes32(recipient),
            token_id: U256::from(token_id),
            extra_options: Bytes::new(),
            compose_msg: Bytes::new(),
            onft_cmd: Bytes::new(),
        }
    }
}

/// `0x000000000000000000000000<20 address bytes>`
pub fn address_to_bytes32(address: Address) -> B256 {
    address.into_word()
}

/// One travel request, discarded once the send is submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferIntent {
    pub source: NetworkKey,
    pub destination: NetworkKey,
    pub token_id: u64,
    pub fee: MessagingFee,
    pub refund_address: Address,
}

/// A submitted transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TxHandle {
    pub hash: B256,
    /// Chain the transaction was sent on
    pub network: NetworkKey,
}
