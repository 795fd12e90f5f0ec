//! Session state
//!
//! Owns what the cockpit displays: the latest ownership snapshot, the stat
//! state and the last submitted travel. Every refresh takes a generation
//! from a monotonic counter before it starts; when it finishes, its result
//! is published only if nothing newer has been published in the meantime.
//! Values are swapped wholesale under the lock, never patched in place.
//!
//! Mint and travel change what the account holds, so both re-run the
//! reconciler once the transaction is submitted; mint also re-reads stats.

use crate::reconciler::OwnershipReconciler;
use crate::stats::StatReader;
use crate::travel::TravelOrchestrator;
use alloy_primitives::Address;
use omni_bridge::StarshipWrite;
use omni_types::{NetworkKey, OmniResult, OwnershipSnapshot, StatState, TxHandle};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Monotonic request number; higher is newer
pub type Generation = u64;

#[derive(Debug, Clone)]
struct Versioned<T> {
    generation: Generation,
    value: T,
}

impl<T> Versioned<T> {
    fn new(value: T) -> Self {
        Self {
            generation: 0,
            value,
        }
    }

    /// Replace the value unless a newer generation already landed
    fn publish(&mut self, generation: Generation, value: T) -> bool {
        if generation < self.generation {
            return false;
        }
        self.generation = generation;
        self.value = value;
        true
    }
}

/// Point-in-time copy of everything the session holds
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    /// `None` until the first reconciliation lands
    pub ownership: Option<OwnershipSnapshot>,
    pub stats: StatState,
    pub last_travel: Option<TxHandle>,
}

pub struct Session {
    reconciler: Arc<OwnershipReconciler>,
    stat_reader: Arc<StatReader>,
    next_generation: AtomicU64,
    ownership: RwLock<Versioned<Option<OwnershipSnapshot>>>,
    stats: RwLock<Versioned<StatState>>,
    last_travel: RwLock<Versioned<Option<TxHandle>>>,
}

impl Session {
    pub fn new(reconciler: Arc<OwnershipReconciler>, stat_reader: Arc<StatReader>) -> Self {
        Self {
            reconciler,
            stat_reader,
            next_generation: AtomicU64::new(0),
            ownership: RwLock::new(Versioned::new(None)),
            stats: RwLock::new(Versioned::new(StatState::Loading)),
            last_travel: RwLock::new(Versioned::new(None)),
        }
    }

    pub fn reconciler(&self) -> &Arc<OwnershipReconciler> {
        &self.reconciler
    }

    /// Take the next generation
    pub fn begin(&self) -> Generation {
        self.next_generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Returns false if the result was stale and dropped
    pub fn publish_ownership(&self, generation: Generation, snapshot: OwnershipSnapshot) -> bool {
        let published = self.ownership.write().publish(generation, Some(snapshot));
        if !published {
            tracing::debug!("Dropping stale ownership result (generation {})", generation);
        }
        published
    }

    pub fn publish_stats(&self, generation: Generation, state: StatState) -> bool {
        let published = self.stats.write().publish(generation, state);
        if !published {
            tracing::debug!("Dropping stale stat result (generation {})", generation);
        }
        published
    }

    pub fn record_travel(&self, generation: Generation, handle: TxHandle) -> bool {
        self.last_travel.write().publish(generation, Some(handle))
    }

    pub fn ownership(&self) -> Option<OwnershipSnapshot> {
        self.ownership.read().value.clone()
    }

    pub fn stats(&self) -> StatState {
        self.stats.read().value.clone()
    }

    pub fn last_travel(&self) -> Option<TxHandle> {
        self.last_travel.read().value.clone()
    }

    pub fn snapshot(&self) -> SessionState {
        SessionState {
            ownership: self.ownership(),
            stats: self.stats(),
            last_travel: self.last_travel(),
        }
    }

    /// Reconcile ownership for `account` and publish it if still current
    pub async fn refresh_ownership(&self, account: Option<Address>) -> OwnershipSnapshot {
        let generation = self.begin();
        let snapshot = self.reconciler.reconcile(account).await;
        self.publish_ownership(generation, snapshot.clone());
        snapshot
    }

    /// Read stats, showing `Loading` while the read is in flight
    pub async fn refresh_stats(&self) -> StatState {
        let generation = self.begin();
        self.publish_stats(generation, StatState::Loading);
        let state = self.stat_reader.read().await;
        self.publish_stats(generation, state.clone());
        state
    }

    /// Send the currently active ship to `destination`
    pub async fn travel(
        &self,
        orchestrator: &TravelOrchestrator,
        destination: &NetworkKey,
    ) -> OmniResult<TxHandle> {
        let generation = self.begin();
        let snapshot = match self.ownership() {
            Some(snapshot) => snapshot,
            None => OwnershipSnapshot::empty(None, self.reconciler.networks()),
        };
        let handle = orchestrator
            .travel_from_snapshot(&snapshot, destination)
            .await?;
        self.record_travel(generation, handle.clone());
        self.refresh_ownership(snapshot.account).await;
        Ok(handle)
    }

    /// Mint `amount` ships to the wallet account on the writer's chain
    pub async fn mint(&self, writer: &dyn StarshipWrite, amount: u64) -> OmniResult<TxHandle> {
        let account = writer.account().await?;
        let handle = writer.mint(account, amount).await?;
        self.refresh_ownership(Some(account)).await;
        self.refresh_stats().await;
        Ok(handle)
    }
}
