//! OmniPlanet Bridge - chain and wallet clients
//!
//! Handles communication with the starship contracts:
//! - Read-only contract calls against each chain's public RPC
//! - Reading ship stats and the battle state from the hub chain
//! - Signing and submitting mints and ONFT sends through the wallet
//! - Tracking which network the wallet is currently on

pub mod abi;
pub mod network;
pub mod reader;
pub mod rpc;
pub mod wallet;
pub mod writer;

#[cfg(test)]
pub(crate) mod testing;

pub use network::NetworkTracker;
pub use reader::{PlayerStatReader, StarHubReader, StarshipRead, StarshipReader, StatRead};
pub use rpc::{CallError, ContractCaller, RpcChainClient, TransactionReceipt};
pub use wallet::{
    EventHandler, HttpWalletProvider, ListenerId, ListenerSet, ProviderError, WalletEvent,
    WalletProvider,
};
pub use writer::{StarshipWrite, StarshipWriter};

/// Default request timeout for node and wallet calls
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
