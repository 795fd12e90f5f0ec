//! Current network tracker
//!
//! Follows the wallet's active chain: reads `eth_chainId` once, then
//! listens for `chainChanged`. Chain ids the registry does not know leave
//! the current key untouched. Dropping the tracker unsubscribes.

use crate::wallet::{self, parse_chain_id, EventHandler, ListenerId, WalletEvent, WalletProvider};
use omni_types::{ChainRegistry, NetworkKey};
use parking_lot::RwLock;
use std::sync::Arc;

pub struct NetworkTracker {
    current: Arc<RwLock<NetworkKey>>,
    wallet: Arc<dyn WalletProvider>,
    listener: ListenerId,
}

impl NetworkTracker {
    /// Start tracking; `default_key` is used until the wallet reports a supported chain
    pub async fn attach(
        wallet: Arc<dyn WalletProvider>,
        registry: Arc<ChainRegistry>,
        default_key: NetworkKey,
    ) -> Self {
        let current = Arc::new(RwLock::new(default_key));

        match wallet::chain_id(wallet.as_ref()).await {
            Ok(chain_id) => match registry.key_for_chain_id(chain_id) {
                Some(key) => *current.write() = key.clone(),
                None => tracing::warn!("Wallet is on unsupported chain {}", chain_id),
            },
            Err(e) => tracing::debug!("Cannot read wallet chain id: {}", e),
        }

        let handler: EventHandler = {
            let current = current.clone();
            Arc::new(move |payload| {
                let Some(chain_id) = parse_chain_id(payload) else {
                    tracing::debug!("Ignoring chainChanged payload {}", payload);
                    return;
                };
                match registry.key_for_chain_id(chain_id) {
                    Some(key) => {
                        tracing::info!("Network changed to {}", key);
                        *current.write() = key.clone();
                    }
                    None => tracing::warn!("Wallet switched to unsupported chain {}", chain_id),
                }
            })
        };
        let listener = wallet.on(WalletEvent::ChainChanged, handler);

        Self {
            current,
            wallet,
            listener,
        }
    }

    pub fn current(&self) -> NetworkKey {
        self.current.read().clone()
    }
}

impl Drop for NetworkTracker {
    fn drop(&mut self) {
        self.wallet.remove_listener(self.listener);
    }
}
