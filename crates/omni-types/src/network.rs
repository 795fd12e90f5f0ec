//! Network descriptors
//!
//! One `NetworkDescriptor` per supported chain, loaded once at start-up.
//! Contract addresses may be overridden from Hardhat deployment artifacts.

use crate::error::{OmniError, OmniResult};
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::{fmt, path::Path};

pub const BASE_SEPOLIA: &str = "base-sepolia";
pub const ARBITRUM_SEPOLIA: &str = "arbitrum-sepolia";

/// Human chain key, e.g. `base-sepolia`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkKey(String);

impl NetworkKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NetworkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for NetworkKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl PartialEq<str> for NetworkKey {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NetworkKey {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Static description of one chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDescriptor {
    /// EIP-155 chain id as reported by the wallet
    pub chain_id: u64,
    /// Human key
    #[serde(rename = "networkKey")]
    pub key: NetworkKey,
    /// Public JSON-RPC endpoint for reads
    pub rpc_url: String,
    /// Deployed starship ONFT contract
    pub contract_address: Address,
    /// LayerZero v2 endpoint id; required for travel destinations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lz_eid: Option<u32>,
}

impl NetworkDescriptor {
    /// Endpoint id for sends to this chain
    pub fn route(&self) -> OmniResult<u32> {
        self.lz_eid
            .ok_or_else(|| OmniError::MissingRouteConfig(self.key.clone()))
    }
}

/// Chain holding the PlayerStat contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubDescriptor {
    pub network: NetworkKey,
    /// `None` until the stat contract is deployed
    #[serde(default)]
    pub contract_address: Option<Address>,
}

/// Hardhat deployment output (`deployments/<network>/<Contract>.json`)
#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentArtifact {
    pub address: Address,
    #[serde(default)]
    pub abi: serde_json::Value,
}

impl DeploymentArtifact {
    pub fn from_json(json: &str) -> OmniResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| OmniError::InvalidConfig(format!("deployment artifact: {}", e)))
    }

    pub fn load(path: &Path) -> OmniResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            OmniError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }
}
