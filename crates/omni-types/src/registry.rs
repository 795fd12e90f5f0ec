//! Chain Registry - static lookup of supported networks
//!
//! Registration order matters: it is the order in which ownership is
//! reconciled and therefore the tie-break order when a ship shows up on
//! more than one chain.

use crate::error::{OmniError, OmniResult};
use crate::network::{
    DeploymentArtifact, HubDescriptor, NetworkDescriptor, NetworkKey, ARBITRUM_SEPOLIA,
    BASE_SEPOLIA,
};
use alloy_primitives::{address, Address};
use std::collections::HashSet;

/// Starship ONFT contract (same address on both testnets)
pub const STARSHIP_ADDRESS: Address = address!("037B44B33E41D5AdFBbC43A3d67f32b5b9876B99");

/// PlayerStat contract on the hub chain
pub const SHIP_SPECS_ADDRESS: Address = address!("6758d41f52B9047bc05F7F882e35634e3a3A0Fa9");

/// Cockpit destinations
const PLANETS: [(&str, &str); 2] = [("Vulcania", ARBITRUM_SEPOLIA), ("Amethea", BASE_SEPOLIA)];

/// Map a cockpit planet name to its chain
pub fn network_for_planet(planet: &str) -> Option<NetworkKey> {
    PLANETS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(planet))
        .map(|(_, key)| NetworkKey::new(*key))
}

/// Immutable table of supported chains
#[derive(Debug, Clone)]
pub struct ChainRegistry {
    networks: Vec<NetworkDescriptor>,
    hub: HubDescriptor,
}

impl ChainRegistry {
    /// Build a registry, rejecting duplicate keys or chain ids
    pub fn new(networks: Vec<NetworkDescriptor>, hub: HubDescriptor) -> OmniResult<Self> {
        if networks.is_empty() {
            return Err(OmniError::InvalidConfig("no networks configured".to_string()));
        }

        let mut keys = HashSet::new();
        let mut chain_ids = HashSet::new();
        for network in &networks {
            if !keys.insert(network.key.clone()) {
                return Err(OmniError::InvalidConfig(format!(
                    "duplicate network key {}",
                    network.key
                )));
            }
            if !chain_ids.insert(network.chain_id) {
                return Err(OmniError::InvalidConfig(format!(
                    "duplicate chain id {}",
                    network.chain_id
                )));
            }
        }

        if !keys.contains(&hub.network) {
            return Err(OmniError::InvalidConfig(format!(
                "hub network {} is not registered",
                hub.network
            )));
        }

        Ok(Self { networks, hub })
    }

    /// Base Sepolia + Arbitrum Sepolia, with Arbitrum Sepolia as stat hub
    pub fn testnet() -> Self {
        Self {
            networks: vec![
                NetworkDescriptor {
                    chain_id: 421614,
                    key: NetworkKey::new(ARBITRUM_SEPOLIA),
                    rpc_url: "https://sepolia-rollup.arbitrum.io/rpc".to_string(),
                    contract_address: STARSHIP_ADDRESS,
                    lz_eid: Some(40231),
                },
                NetworkDescriptor {
                    chain_id: 84532,
                    key: NetworkKey::new(BASE_SEPOLIA),
                    rpc_url: "https://sepolia.base.org".to_string(),
                    contract_address: STARSHIP_ADDRESS,
                    lz_eid: Some(40245),
                },
            ],
            hub: HubDescriptor {
                network: NetworkKey::new(ARBITRUM_SEPOLIA),
                contract_address: Some(SHIP_SPECS_ADDRESS),
            },
        }
    }

    /// Look up a chain by key
    pub fn get(&self, key: &str) -> OmniResult<&NetworkDescriptor> {
        self.networks
            .iter()
            .find(|n| n.key == key)
            .ok_or_else(|| OmniError::UnknownChain(key.to_string()))
    }

    /// Map a wallet-reported chain id to a key; `None` is an unsupported network
    pub fn key_for_chain_id(&self, chain_id: u64) -> Option<&NetworkKey> {
        self.networks
            .iter()
            .find(|n| n.chain_id == chain_id)
            .map(|n| &n.key)
    }

    /// Descriptors in registration order
    pub fn iter(&self) -> impl Iterator<Item = &NetworkDescriptor> {
        self.networks.iter()
    }

    pub fn keys(&self) -> Vec<NetworkKey> {
        self.networks.iter().map(|n| n.key.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }

    /// Stat hub
    pub fn hub(&self) -> &HubDescriptor {
        &self.hub
    }

    /// Point `key` at the contract address from a deployment artifact
    pub fn apply_artifact(&mut self, key: &str, artifact: &DeploymentArtifact) -> OmniResult<()> {
        let network = self
            .networks
            .iter_mut()
            .find(|n| n.key == key)
            .ok_or_else(|| OmniError::UnknownChain(key.to_string()))?;
        network.contract_address = artifact.address;
        Ok(())
    }
}

impl Default for ChainRegistry {
    fn default() -> Self {
        Self::testnet()
    }
}
