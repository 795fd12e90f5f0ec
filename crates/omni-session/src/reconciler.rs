//! Ownership Reconciler
//!
//! Answers "does this account hold a ship, which one, and where" by asking
//! every registered chain independently and merging the answers.
//!
//! - One balance query per chain, all in flight at once
//! - Id discovery only on chains with a non-zero balance
//! - A failing chain counts as empty and is listed in `degraded`
//! - Nothing is returned until every chain has answered

use crate::discovery::TokenDiscovery;
use alloy_primitives::Address;
use futures::future::join_all;
use omni_bridge::StarshipRead;
use omni_types::{ChainHoldings, NetworkKey, OmniResult, OwnershipSnapshot};
use std::sync::Arc;

pub struct OwnershipReconciler {
    /// One reader per chain, in registry order
    readers: Vec<Arc<dyn StarshipRead>>,
    discovery: Arc<dyn TokenDiscovery>,
}

impl OwnershipReconciler {
    pub fn new(readers: Vec<Arc<dyn StarshipRead>>, discovery: Arc<dyn TokenDiscovery>) -> Self {
        Self { readers, discovery }
    }

    pub fn networks(&self) -> Vec<NetworkKey> {
        self.readers.iter().map(|r| r.network().clone()).collect()
    }

    pub fn reader(&self, network: &NetworkKey) -> Option<&Arc<dyn StarshipRead>> {
        self.readers.iter().find(|r| r.network() == network)
    }

    /// Rebuild the ownership snapshot for `account`
    ///
    /// Never fails: unreachable chains degrade to empty holdings. When the
    /// ship appears on several chains the first one in registry order wins.
    pub async fn reconcile(&self, account: Option<Address>) -> OwnershipSnapshot {
        let Some(account) = account else {
            return OwnershipSnapshot::empty(None, self.networks());
        };

        let results = join_all(
            self.readers
                .iter()
                .map(|reader| self.read_chain(reader.as_ref(), account)),
        )
        .await;

        let mut holdings = Vec::with_capacity(results.len());
        let mut degraded = Vec::new();
        for (reader, result) in self.readers.iter().zip(results) {
            match result {
                Ok(chain) => holdings.push(chain),
                Err(e) => {
                    tracing::warn!(
                        "Ownership read on {} failed, counting as empty: {}",
                        reader.network(),
                        e
                    );
                    degraded.push(reader.network().clone());
                    holdings.push(ChainHoldings::empty(reader.network().clone()));
                }
            }
        }

        let mut snapshot = OwnershipSnapshot::from_holdings(Some(account), holdings, degraded);

        let duplicated = snapshot.duplicated_tokens();
        if !duplicated.is_empty() {
            tracing::warn!(
                "Token(s) {:?} visible on more than one chain, bridge may be mid-flight or stuck",
                duplicated
            );
        }

        if let (Some(token_id), Some(network)) = (snapshot.token_id, snapshot.network.as_ref()) {
            if let Some(reader) = self.reader(network) {
                match reader.token_uri(token_id).await {
                    Ok(uri) => snapshot.token_uri = Some(uri),
                    Err(e) => tracing::warn!(
                        "Cannot read token URI for {} on {}: {}",
                        token_id,
                        network,
                        e
                    ),
                }
            }
        }

        tracing::debug!(
            "Reconciled {}: {} ship(s), active {:?} on {:?}",
            account,
            snapshot.total_balance,
            snapshot.token_id,
            snapshot.network.as_ref().map(|n| n.as_str())
        );

        snapshot
    }

    async fn read_chain(
        &self,
        reader: &dyn StarshipRead,
        account: Address,
    ) -> OmniResult<ChainHoldings> {
        let balance = reader.balance_of(account).await?;
        if balance == 0 {
            return Ok(ChainHoldings::empty(reader.network().clone()));
        }

        let token_ids = self.discovery.discover_owned_tokens(reader, account).await?;
        Ok(ChainHoldings {
            network: reader.network().clone(),
            balance,
            token_ids,
        })
    }
}
