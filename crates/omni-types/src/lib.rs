//! Shared types for the OmniPlanet starship client
//!
//! This crate contains the data model shared by the bridge clients,
//! the session layer and the CLI:
//! - Network descriptors and the static chain registry
//! - Ownership snapshots, ship stats and the StarHub battle state
//! - Cross-chain transfer parameters (LayerZero ONFT `SendParam`)
//! - The error taxonomy

pub mod error;
pub mod game;
pub mod network;
pub mod registry;
pub mod ship;
pub mod transfer;

pub use error::{OmniError, OmniResult, RejectionCause};
pub use game::GameState;
pub use network::{DeploymentArtifact, HubDescriptor, NetworkDescriptor, NetworkKey};
pub use registry::{network_for_planet, ChainRegistry};
pub use ship::{ChainHoldings, OwnershipSnapshot, ShipStats, StatState};
pub use transfer::{address_to_bytes32, MessagingFee, SendParam, TransferIntent, TxHandle};

/// Highest token id probed when discovering owned ships (ids start at 1)
pub const DEFAULT_PROBE_LIMIT: u64 = 10;

/// Player id whose stats are shown in the cockpit
pub const DEFAULT_PLAYER_ID: u64 = 1;
