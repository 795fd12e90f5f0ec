//! OmniPlanet Session - ownership, travel and stats on top of the chain clients
//!
//! This crate provides the logic the cockpit runs on:
//! - Reconciling starship ownership across every registered chain
//! - Orchestrating cross-chain travel (quote, then send)
//! - Reading ship stats from the hub chain
//! - Generation-checked session state so stale results never overwrite newer ones

pub mod discovery;
pub mod reconciler;
pub mod session;
pub mod stats;
pub mod travel;

#[cfg(test)]
pub(crate) mod testing;

pub use discovery::{LinearProbe, TokenDiscovery};
pub use reconciler::OwnershipReconciler;
pub use session::{Generation, Session, SessionState};
pub use stats::StatReader;
pub use travel::{await_arrival, await_receipt, PollPolicy, TravelOrchestrator};
