//! Token discovery
//!
//! The starship contract has no "tokens of owner" index, so owned ids are
//! found by probing `ownerOf` over a bounded id range. Kept behind
//! `TokenDiscovery` so an indexer or event-log lookup can replace it.

use alloy_primitives::Address;
use async_trait::async_trait;
use omni_bridge::StarshipRead;
use omni_types::{OmniError, OmniResult, DEFAULT_PROBE_LIMIT};

#[async_trait]
pub trait TokenDiscovery: Send + Sync {
    /// Ids owned by `account` on the reader's chain
    async fn discover_owned_tokens(
        &self,
        reader: &dyn StarshipRead,
        account: Address,
    ) -> OmniResult<Vec<u64>>;
}

/// Probe ids `1..=limit`, stopping at the first id that does not exist
#[derive(Debug, Clone, Copy)]
pub struct LinearProbe {
    limit: u64,
}

impl LinearProbe {
    pub fn new(limit: u64) -> Self {
        Self { limit }
    }
}

impl Default for LinearProbe {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_LIMIT)
    }
}

#[async_trait]
impl TokenDiscovery for LinearProbe {
    async fn discover_owned_tokens(
        &self,
        reader: &dyn StarshipRead,
        account: Address,
    ) -> OmniResult<Vec<u64>> {
        let mut owned = Vec::new();

        for token_id in 1..=self.limit {
            match reader.owner_of(token_id).await {
                Ok(owner) if owner == account => owned.push(token_id),
                Ok(_) => {}
                Err(OmniError::TokenNotFound(_)) => {
                    tracing::trace!("Probe on {} ended at token {}", reader.network(), token_id);
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(owned)
    }
}
