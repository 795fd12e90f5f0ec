//! StarHub battle state

use crate::ship::ShipStats;
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Two-player battle as reported by the hub contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub active: bool,
    pub round: u64,
    /// Player 1 first; `health` is bounded by `max_health`
    pub players: [ShipStats; 2],
    /// `None` while the contract reports the zero address
    pub winner: Option<Address>,
    pub max_health: u64,
}

impl GameState {
    /// Stats of a 1-based player id
    pub fn player(&self, player_id: u64) -> Option<&ShipStats> {
        let index = usize::try_from(player_id.checked_sub(1)?).ok()?;
        self.players.get(index)
    }

    pub fn is_over(&self) -> bool {
        !self.active && self.winner.is_some()
    }
}
