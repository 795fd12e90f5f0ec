//! Cockpit Configuration

use omni_bridge::DEFAULT_REQUEST_TIMEOUT_SECS;
use omni_types::{
    ChainRegistry, DeploymentArtifact, HubDescriptor, NetworkDescriptor, NetworkKey, OmniError,
    OmniResult, DEFAULT_PLAYER_ID, DEFAULT_PROBE_LIMIT,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Cockpit configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OmniConfig {
    /// JSON-RPC endpoint of the local wallet
    pub wallet_url: String,
    /// Timeout for every node and wallet request
    pub request_timeout_secs: u64,
    /// Highest token id probed during discovery
    pub probe_limit: u64,
    /// Player whose stats are shown
    pub player_id: u64,
    /// Network assumed until the wallet reports a supported one
    pub default_network: NetworkKey,
    /// Replaces the built-in testnet chains when set
    pub networks: Option<Vec<NetworkDescriptor>>,
    pub hub: Option<HubDescriptor>,
    /// Hardhat deployment artifacts overriding contract addresses
    pub deployments: BTreeMap<NetworkKey, PathBuf>,
}

impl Default for OmniConfig {
    fn default() -> Self {
        Self {
            wallet_url: "http://127.0.0.1:1248".to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            probe_limit: DEFAULT_PROBE_LIMIT,
            player_id: DEFAULT_PLAYER_ID,
            default_network: NetworkKey::new("base-sepolia"),
            networks: None,
            hub: None,
            deployments: BTreeMap::new(),
        }
    }
}

impl OmniConfig {
    pub fn load(path: &Path) -> OmniResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            OmniError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&json)
            .map_err(|e| OmniError::InvalidConfig(format!("{}: {}", path.display(), e)))
    }

    /// Build the chain registry, then apply deployment artifacts
    ///
    /// Relative artifact paths are resolved against `base_dir`.
    pub fn registry(&self, base_dir: &Path) -> OmniResult<ChainRegistry> {
        let mut registry = match &self.networks {
            None => {
                let testnet = ChainRegistry::testnet();
                match &self.hub {
                    Some(hub) => {
                        ChainRegistry::new(testnet.iter().cloned().collect(), hub.clone())?
                    }
                    None => testnet,
                }
            }
            Some(networks) => {
                let hub = match (&self.hub, networks.first()) {
                    (Some(hub), _) => hub.clone(),
                    (None, Some(first)) => HubDescriptor {
                        network: first.key.clone(),
                        contract_address: None,
                    },
                    (None, None) => {
                        return Err(OmniError::InvalidConfig("no networks configured".to_string()))
                    }
                };
                ChainRegistry::new(networks.clone(), hub)?
            }
        };

        for (key, path) in &self.deployments {
            let path = if path.is_absolute() {
                path.clone()
            } else {
                base_dir.join(path)
            };
            let artifact = DeploymentArtifact::load(&path)?;
            registry.apply_artifact(key.as_str(), &artifact)?;
            tracing::info!("Using {} deployment at {}", key, artifact.address);
        }

        registry.get(self.default_network.as_str())?;
        Ok(registry)
    }
}
