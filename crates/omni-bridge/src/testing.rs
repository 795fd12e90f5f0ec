//! Test doubles for the wallet and chain boundaries

use crate::rpc::{CallError, ContractCaller};
use crate::wallet::{chain_id_hex, parse_chain_id, EventHandler, ListenerId, ListenerSet};
use crate::wallet::{ProviderError, WalletEvent, WalletProvider};
use alloy_primitives::{address, Address, Bytes, B256};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

/// How the mock reacts to `wallet_switchEthereumChain`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchBehavior {
    Accept,
    Reject,
    /// Reports success but stays on the old chain
    Ignore,
    /// The chain was never added to the wallet
    Unrecognized,
}

pub struct MockWallet {
    chain_id: Mutex<u64>,
    accounts: Vec<Address>,
    switch: SwitchBehavior,
    send_error: Option<ProviderError>,
    requests: Mutex<Vec<(String, Value)>>,
    listeners: ListenerSet,
}

impl MockWallet {
    pub const ACCOUNT: Address = address!("00000000000000000000000000000000000000a1");
    pub const TX_HASH: B256 = B256::repeat_byte(0xab);

    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id: Mutex::new(chain_id),
            accounts: vec![Self::ACCOUNT],
            switch: SwitchBehavior::Accept,
            send_error: None,
            requests: Mutex::new(Vec::new()),
            listeners: ListenerSet::new(),
        }
    }

    pub fn with_accounts(mut self, accounts: Vec<Address>) -> Self {
        self.accounts = accounts;
        self
    }

    pub fn with_switch(mut self, switch: SwitchBehavior) -> Self {
        self.switch = switch;
        self
    }

    pub fn with_send_error(mut self, error: ProviderError) -> Self {
        self.send_error = Some(error);
        self
    }

    pub fn current_chain(&self) -> u64 {
        *self.chain_id.lock()
    }

    /// Simulate the user switching networks in the wallet UI
    pub fn user_switches_to(&self, chain_id: u64) {
        *self.chain_id.lock() = chain_id;
        self.listeners
            .emit(WalletEvent::ChainChanged, &json!(chain_id_hex(chain_id)));
    }

    pub fn requests(&self, method: &str) -> Vec<Value> {
        self.requests
            .lock()
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, p)| p.clone())
            .collect()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        self.requests
            .lock()
            .push((method.to_string(), params.clone()));

        match method {
            "eth_chainId" => Ok(json!(chain_id_hex(self.current_chain()))),
            "eth_accounts" => Ok(json!(self.accounts)),
            "wallet_switchEthereumChain" => match self.switch {
                SwitchBehavior::Accept => {
                    let target = parse_chain_id(&params[0]["chainId"])
                        .ok_or_else(|| ProviderError::new(-32602, "missing chainId"))?;
                    self.user_switches_to(target);
                    Ok(Value::Null)
                }
                SwitchBehavior::Reject => Err(ProviderError::new(
                    ProviderError::USER_REJECTED,
                    "User rejected the request.",
                )),
                SwitchBehavior::Ignore => Ok(Value::Null),
                SwitchBehavior::Unrecognized => Err(ProviderError::new(
                    ProviderError::UNRECOGNIZED_CHAIN,
                    "Unrecognized chain ID",
                )),
            },
            "eth_sendTransaction" => match &self.send_error {
                Some(error) => Err(error.clone()),
                None => Ok(json!(Self::TX_HASH)),
            },
            other => Err(ProviderError::new(4200, format!("unsupported {}", other))),
        }
    }

    fn on(&self, event: WalletEvent, handler: EventHandler) -> ListenerId {
        self.listeners.add(event, handler)
    }

    fn remove_listener(&self, id: ListenerId) {
        self.listeners.remove(id)
    }
}

type Responder = Box<dyn Fn(Address, &[u8]) -> Result<Bytes, CallError> + Send + Sync>;

/// `eth_call` double driven by a closure over `(to, calldata)`
pub struct MockCaller {
    responder: Responder,
    calls: Mutex<Vec<(Address, Bytes)>>,
}

impl MockCaller {
    pub fn new(
        responder: impl Fn(Address, &[u8]) -> Result<Bytes, CallError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl ContractCaller for MockCaller {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, CallError> {
        self.calls.lock().push((to, data.clone()));
        (self.responder)(to, &data)
    }
}
