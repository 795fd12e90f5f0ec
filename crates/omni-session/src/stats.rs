//! Stat Reader - ship stats from the hub chain

use omni_bridge::StatRead;
use omni_types::{ShipStats, StatState, DEFAULT_PLAYER_ID};
use std::sync::Arc;

pub struct StatReader {
    /// `None` while the stat contract is not deployed
    hub: Option<Arc<dyn StatRead>>,
    player_id: u64,
}

impl StatReader {
    pub fn new(hub: Option<Arc<dyn StatRead>>, player_id: u64) -> Self {
        Self { hub, player_id }
    }

    /// Reader that always returns the placeholder stats
    pub fn mock() -> Self {
        Self::new(None, DEFAULT_PLAYER_ID)
    }

    pub async fn read(&self) -> StatState {
        let Some(hub) = &self.hub else {
            tracing::debug!("Stat hub not configured, using placeholder stats");
            return StatState::Ready(ShipStats::MOCK);
        };

        match hub.player_stats(self.player_id).await {
            Ok(stats) => StatState::Ready(stats),
            Err(e) => {
                tracing::warn!("Stat read for player {} failed: {}", self.player_id, e);
                StatState::Failed(e.to_string())
            }
        }
    }
}
