//! Test doubles for the read and write clients

use alloy_primitives::{address, Address, B256, U256};
use async_trait::async_trait;
use omni_bridge::{StarshipRead, StarshipWrite, StatRead};
use omni_types::{
    MessagingFee, NetworkKey, OmniError, OmniResult, SendParam, ShipStats, TxHandle,
};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const ACCOUNT: Address = address!("00000000000000000000000000000000000000a1");
pub const STRANGER: Address = address!("00000000000000000000000000000000000000b2");

struct ChainState {
    balance: u64,
    owners: BTreeMap<u64, Address>,
}

/// In-memory starship contract for one chain
pub struct MockReader {
    network: NetworkKey,
    state: Mutex<ChainState>,
    balance_fails: bool,
    fail_owner_at: Option<u64>,
    uri_fails: bool,
    balance_calls: AtomicUsize,
    probed: Mutex<Vec<u64>>,
}

impl MockReader {
    pub fn new(network: &str) -> Self {
        Self {
            network: NetworkKey::new(network),
            state: Mutex::new(ChainState {
                balance: 0,
                owners: BTreeMap::new(),
            }),
            balance_fails: false,
            fail_owner_at: None,
            uri_fails: false,
            balance_calls: AtomicUsize::new(0),
            probed: Mutex::new(Vec::new()),
        }
    }

    pub fn with_balance(self, balance: u64) -> Self {
        self.state.lock().balance = balance;
        self
    }

    /// Tokens `1..=owners.len()` exist with these owners
    pub fn with_owners(self, owners: &[Address]) -> Self {
        {
            let mut state = self.state.lock();
            for (i, owner) in owners.iter().enumerate() {
                state.owners.insert(i as u64 + 1, *owner);
            }
        }
        self
    }

    pub fn with_owner_at(self, token_id: u64, owner: Address) -> Self {
        self.state.lock().owners.insert(token_id, owner);
        self
    }

    pub fn failing_balance(mut self) -> Self {
        self.balance_fails = true;
        self
    }

    pub fn failing_owner_of_at(mut self, token_id: u64) -> Self {
        self.fail_owner_at = Some(token_id);
        self
    }

    pub fn failing_token_uri(mut self) -> Self {
        self.uri_fails = true;
        self
    }

    /// Token arrives from a bridge
    pub fn credit(&self, token_id: u64, owner: Address) {
        let mut state = self.state.lock();
        state.balance += 1;
        state.owners.insert(token_id, owner);
    }

    pub fn probed(&self) -> Vec<u64> {
        self.probed.lock().clone()
    }

    pub fn balance_calls(&self) -> usize {
        self.balance_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StarshipRead for MockReader {
    fn network(&self) -> &NetworkKey {
        &self.network
    }

    async fn balance_of(&self, _owner: Address) -> OmniResult<u64> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        if self.balance_fails {
            return Err(OmniError::read_failed(&self.network, "connection refused"));
        }
        Ok(self.state.lock().balance)
    }

    async fn owner_of(&self, token_id: u64) -> OmniResult<Address> {
        self.probed.lock().push(token_id);
        if self.fail_owner_at == Some(token_id) {
            return Err(OmniError::read_failed(&self.network, "429 too many requests"));
        }
        self.state
            .lock()
            .owners
            .get(&token_id)
            .copied()
            .ok_or(OmniError::TokenNotFound(token_id))
    }

    async fn token_uri(&self, token_id: u64) -> OmniResult<String> {
        if self.uri_fails {
            return Err(OmniError::read_failed(&self.network, "timeout"));
        }
        Ok(format!("ipfs://starship/{}", token_id))
    }
}

/// Records quotes and sends instead of talking to a wallet
pub struct MockWriter {
    network: NetworkKey,
    account: Option<Address>,
    fee: MessagingFee,
    quote_error: Option<OmniError>,
    pub quotes: Mutex<Vec<SendParam>>,
    pub sends: Mutex<Vec<(SendParam, MessagingFee, Address)>>,
    pub mints: Mutex<Vec<(Address, u64)>>,
}

impl MockWriter {
    pub const TX_HASH: B256 = B256::repeat_byte(0xcd);

    pub fn new(network: &str, native_fee: u64) -> Self {
        Self {
            network: NetworkKey::new(network),
            account: Some(ACCOUNT),
            fee: MessagingFee {
                native_fee: U256::from(native_fee),
                lz_token_fee: U256::ZERO,
            },
            quote_error: None,
            quotes: Mutex::new(Vec::new()),
            sends: Mutex::new(Vec::new()),
            mints: Mutex::new(Vec::new()),
        }
    }

    pub fn without_account(mut self) -> Self {
        self.account = None;
        self
    }

    pub fn failing_quote(mut self, error: OmniError) -> Self {
        self.quote_error = Some(error);
        self
    }

    pub fn untouched(&self) -> bool {
        self.quotes.lock().is_empty() && self.sends.lock().is_empty()
    }
}

#[async_trait]
impl StarshipWrite for MockWriter {
    fn network(&self) -> &NetworkKey {
        &self.network
    }

    async fn account(&self) -> OmniResult<Address> {
        self.account.ok_or(OmniError::MissingWallet)
    }

    async fn mint(&self, to: Address, amount: u64) -> OmniResult<TxHandle> {
        self.mints.lock().push((to, amount));
        Ok(TxHandle {
            hash: Self::TX_HASH,
            network: self.network.clone(),
        })
    }

    async fn quote_send(&self, param: &SendParam) -> OmniResult<MessagingFee> {
        self.quotes.lock().push(param.clone());
        match &self.quote_error {
            Some(error) => Err(error.clone()),
            None => Ok(self.fee),
        }
    }

    async fn send(
        &self,
        param: &SendParam,
        fee: &MessagingFee,
        refund_address: Address,
    ) -> OmniResult<TxHandle> {
        self.sends
            .lock()
            .push((param.clone(), *fee, refund_address));
        Ok(TxHandle {
            hash: Self::TX_HASH,
            network: self.network.clone(),
        })
    }
}

/// Hub returning fixed stats or an error
pub struct MockHub {
    pub result: OmniResult<ShipStats>,
    pub calls: AtomicUsize,
}

impl MockHub {
    pub fn new(result: OmniResult<ShipStats>) -> Self {
        Self {
            result,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl StatRead for MockHub {
    async fn player_stats(&self, _player_id: u64) -> OmniResult<ShipStats> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}
