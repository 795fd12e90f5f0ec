//! Wallet provider boundary
//!
//! Models the EIP-1193 provider (`request`, `on`, `removeListener`) as an
//! injected trait object so clients never reach for ambient wallet state.
//! `HttpWalletProvider` speaks JSON-RPC to a local signing wallet such as
//! Frame (`http://127.0.0.1:1248`).

use alloy_primitives::Address;
use async_trait::async_trait;
use jsonrpsee::{
    core::{client::ClientT, params::ArrayParams, ClientError},
    http_client::{HttpClient, HttpClientBuilder},
    rpc_params,
};
use omni_types::{OmniError, OmniResult};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

/// EIP-1193 provider error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("wallet error {code}: {message}")]
pub struct ProviderError {
    pub code: i64,
    pub message: String,
}

impl ProviderError {
    pub const USER_REJECTED: i64 = 4001;
    pub const DISCONNECTED: i64 = 4900;
    pub const UNRECOGNIZED_CHAIN: i64 = 4902;

    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code == Self::USER_REJECTED
    }

    pub fn is_revert(&self) -> bool {
        self.code == 3 || self.message.to_ascii_lowercase().contains("revert")
    }
}

/// Provider events we subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WalletEvent {
    ChainChanged,
    AccountsChanged,
}

impl WalletEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            WalletEvent::ChainChanged => "chainChanged",
            WalletEvent::AccountsChanged => "accountsChanged",
        }
    }
}

pub type ListenerId = u64;

/// Event callback; receives the raw event payload (e.g. `"0x14a34"`)
pub type EventHandler = Arc<dyn Fn(&Value) + Send + Sync>;

/// Injected wallet capability
#[async_trait]
pub trait WalletProvider: Send + Sync {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError>;

    fn on(&self, event: WalletEvent, handler: EventHandler) -> ListenerId;

    fn remove_listener(&self, id: ListenerId);
}

/// `eth_chainId` as a number
pub async fn chain_id(wallet: &dyn WalletProvider) -> Result<u64, ProviderError> {
    let value = wallet.request("eth_chainId", Value::Array(vec![])).await?;
    parse_chain_id(&value)
        .ok_or_else(|| ProviderError::new(-32603, format!("bad chain id {}", value)))
}

/// Connected accounts; empty when the wallet is locked
pub async fn accounts(wallet: &dyn WalletProvider) -> Result<Vec<Address>, ProviderError> {
    let value = wallet.request("eth_accounts", Value::Array(vec![])).await?;
    serde_json::from_value(value).map_err(|e| ProviderError::new(-32603, e.to_string()))
}

/// First connected account or `MissingWallet`
pub async fn primary_account(wallet: &dyn WalletProvider) -> OmniResult<Address> {
    match accounts(wallet).await {
        Ok(accounts) => accounts.first().copied().ok_or(OmniError::MissingWallet),
        Err(e) => {
            tracing::warn!("Cannot read wallet accounts: {}", e);
            Err(OmniError::MissingWallet)
        }
    }
}

/// Chain ids arrive as hex strings (`"0x14a34"`) or, from some wallets, numbers
pub fn parse_chain_id(value: &Value) -> Option<u64> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                Some(hex) => u64::from_str_radix(hex, 16).ok(),
                None => s.parse().ok(),
            }
        }
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

pub fn chain_id_hex(chain_id: u64) -> String {
    format!("0x{:x}", chain_id)
}

/// Listener registry shared by provider implementations
#[derive(Default)]
pub struct ListenerSet {
    next_id: AtomicU64,
    listeners: RwLock<Vec<(ListenerId, WalletEvent, EventHandler)>>,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, event: WalletEvent, handler: EventHandler) -> ListenerId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.listeners.write().push((id, event, handler));
        id
    }

    pub fn remove(&self, id: ListenerId) {
        self.listeners.write().retain(|(lid, _, _)| *lid != id);
    }

    /// Call every handler registered for `event`
    pub fn emit(&self, event: WalletEvent, payload: &Value) {
        // Handlers run outside the lock so they may add or remove listeners
        let handlers: Vec<EventHandler> = self
            .listeners
            .read()
            .iter()
            .filter(|(_, e, _)| *e == event)
            .map(|(_, _, h)| h.clone())
            .collect();

        tracing::debug!("{} -> {} listener(s)", event.as_str(), handlers.len());
        for handler in handlers {
            handler(payload);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.read().is_empty()
    }
}

/// JSON-RPC wallet reached over HTTP
///
/// HTTP has no push channel, so `chainChanged` is emitted whenever a
/// response reveals a chain id different from the last one seen.
pub struct HttpWalletProvider {
    url: String,
    client: HttpClient,
    listeners: ListenerSet,
    last_chain_id: Mutex<Option<u64>>,
}

impl HttpWalletProvider {
    pub fn new(url: &str, request_timeout: Duration) -> OmniResult<Self> {
        let client = HttpClientBuilder::default()
            .request_timeout(request_timeout)
            .build(url)
            .map_err(|e| OmniError::InvalidConfig(format!("bad wallet url {}: {}", url, e)))?;

        Ok(Self {
            url: url.to_string(),
            client,
            listeners: ListenerSet::new(),
            last_chain_id: Mutex::new(None),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn observe_chain_id(&self, chain_id: u64) {
        let changed = {
            let mut last = self.last_chain_id.lock();
            let changed = last.map(|prev| prev != chain_id).unwrap_or(false);
            *last = Some(chain_id);
            changed
        };
        if changed {
            tracing::info!("Wallet switched to chain {}", chain_id);
            self.listeners.emit(
                WalletEvent::ChainChanged,
                &Value::String(chain_id_hex(chain_id)),
            );
        }
    }
}

#[async_trait]
impl WalletProvider for HttpWalletProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let mut array = ArrayParams::new();
        let items = match params {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            other => vec![other],
        };
        for item in items {
            array
                .insert(item)
                .map_err(|e| ProviderError::new(-32602, e.to_string()))?;
        }

        let result: Value = self
            .client
            .request(method, array)
            .await
            .map_err(provider_error)?;

        match method {
            "eth_chainId" => {
                if let Some(id) = parse_chain_id(&result) {
                    self.observe_chain_id(id);
                }
            }
            "wallet_switchEthereumChain" => {
                let confirmed: Value = self
                    .client
                    .request("eth_chainId", rpc_params![])
                    .await
                    .map_err(provider_error)?;
                if let Some(id) = parse_chain_id(&confirmed) {
                    self.observe_chain_id(id);
                }
            }
            _ => {}
        }

        Ok(result)
    }

    fn on(&self, event: WalletEvent, handler: EventHandler) -> ListenerId {
        self.listeners.add(event, handler)
    }

    fn remove_listener(&self, id: ListenerId) {
        self.listeners.remove(id)
    }
}

fn provider_error(error: ClientError) -> ProviderError {
    match error {
        ClientError::Call(obj) => ProviderError::new(obj.code() as i64, obj.message()),
        other => ProviderError::new(ProviderError::DISCONNECTED, other.to_string()),
    }
}
