//! Ship ownership and stats

use crate::network::NetworkKey;
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Battle stats read from the hub chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipStats {
    pub attack: u64,
    pub defense: u64,
    pub health: u64,
}

impl ShipStats {
    /// Shown while the stat contract is not deployed
    pub const MOCK: ShipStats = ShipStats {
        attack: 10,
        defense: 10,
        health: 100,
    };
}

/// Result of a stat read
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "camelCase")]
pub enum StatState {
    Loading,
    Ready(ShipStats),
    Failed(String),
}

impl StatState {
    pub fn stats(&self) -> Option<&ShipStats> {
        match self {
            StatState::Ready(stats) => Some(stats),
            _ => None,
        }
    }
}

/// What one chain says the account holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainHoldings {
    pub network: NetworkKey,
    pub balance: u64,
    pub token_ids: Vec<u64>,
}

impl ChainHoldings {
    pub fn empty(network: NetworkKey) -> Self {
        Self {
            network,
            balance: 0,
            token_ids: Vec::new(),
        }
    }
}

/// Aggregated ownership across every registered chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnershipSnapshot {
    pub account: Option<Address>,
    /// One entry per registered chain, in registry order
    pub holdings: Vec<ChainHoldings>,
    pub total_balance: u64,
    pub has_ship: bool,
    /// Active ship: first id on the first chain (registry order) that has any
    pub token_id: Option<u64>,
    /// Chain holding the active ship
    pub network: Option<NetworkKey>,
    pub token_uri: Option<String>,
    /// Chains whose reads failed and were counted as empty
    pub degraded: Vec<NetworkKey>,
    /// Unix seconds
    pub refreshed_at: i64,
}

impl OwnershipSnapshot {
    /// Snapshot for a disconnected wallet
    pub fn empty(account: Option<Address>, networks: impl IntoIterator<Item = NetworkKey>) -> Self {
        Self::from_holdings(
            account,
            networks.into_iter().map(ChainHoldings::empty).collect(),
            Vec::new(),
        )
    }

    /// Aggregate per-chain holdings (given in registry order)
    ///
    /// The active ship is picked from the first chain with a non-empty id
    /// list. This is an ordering rule, not "most recently moved".
    pub fn from_holdings(
        account: Option<Address>,
        holdings: Vec<ChainHoldings>,
        degraded: Vec<NetworkKey>,
    ) -> Self {
        let total_balance = holdings
            .iter()
            .fold(0u64, |sum, h| sum.saturating_add(h.balance));

        let active = holdings
            .iter()
            .find_map(|h| h.token_ids.first().map(|id| (*id, h.network.clone())));
        let (token_id, network) = match active {
            Some((id, network)) => (Some(id), Some(network)),
            None => (None, None),
        };

        Self {
            account,
            holdings,
            total_balance,
            has_ship: total_balance > 0,
            token_id,
            network,
            token_uri: None,
            degraded,
            refreshed_at: chrono::Utc::now().timestamp(),
        }
    }

    pub fn holdings_for(&self, network: &str) -> Option<&ChainHoldings> {
        self.holdings.iter().find(|h| h.network == network)
    }

    /// First chain (registry order) on which `token_id` was found
    pub fn location_of(&self, token_id: u64) -> Option<&NetworkKey> {
        self.holdings
            .iter()
            .find(|h| h.token_ids.contains(&token_id))
            .map(|h| &h.network)
    }

    /// Token ids seen on more than one chain at once (stuck or duplicated bridge state)
    pub fn duplicated_tokens(&self) -> Vec<u64> {
        let mut seen: BTreeMap<u64, usize> = BTreeMap::new();
        for holdings in &self.holdings {
            for id in &holdings.token_ids {
                *seen.entry(*id).or_default() += 1;
            }
        }
        seen.into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(id, _)| id)
            .collect()
    }

    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}
