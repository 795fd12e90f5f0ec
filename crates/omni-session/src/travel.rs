//! Travel Orchestrator
//!
//! Moves a ship to another chain: quote the LayerZero fee on the source
//! chain, then send with exactly that fee. The send receipt and the ship's
//! arrival are polled separately, each with a bounded number of attempts.

use crate::reconciler::OwnershipReconciler;
use alloy_primitives::Address;
use omni_bridge::{CallError, StarshipWrite, TransactionReceipt};
use omni_types::{
    ChainRegistry, NetworkKey, OmniError, OmniResult, OwnershipSnapshot, SendParam,
    TransferIntent, TxHandle,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub struct TravelOrchestrator {
    registry: Arc<ChainRegistry>,
    /// One writer per chain a ship can leave from
    writers: Vec<Arc<dyn StarshipWrite>>,
}

impl TravelOrchestrator {
    pub fn new(registry: Arc<ChainRegistry>, writers: Vec<Arc<dyn StarshipWrite>>) -> Self {
        Self { registry, writers }
    }

    fn writer(&self, network: &NetworkKey) -> OmniResult<&Arc<dyn StarshipWrite>> {
        self.writers
            .iter()
            .find(|w| w.network() == network)
            .ok_or_else(|| OmniError::UnknownChain(network.to_string()))
    }

    /// Send `token_id` from `source` to `destination`
    ///
    /// Fails before any quote if the destination has no endpoint id or
    /// equals the source. The fee is not re-quoted between quote and send.
    pub async fn travel(
        &self,
        source: &NetworkKey,
        destination: &NetworkKey,
        token_id: u64,
    ) -> OmniResult<TxHandle> {
        let dst_eid = self.registry.get(destination.as_str())?.route()?;
        if source == destination {
            return Err(OmniError::SameChainTravel(destination.clone()));
        }

        let writer = self.writer(source)?;
        let account = writer.account().await?;
        let param = SendParam::new(dst_eid, account, token_id);

        let fee = writer.quote_send(&param).await?;
        let intent = TransferIntent {
            source: source.clone(),
            destination: destination.clone(),
            token_id,
            fee,
            refund_address: account,
        };
        tracing::info!(
            "Sending ship {} from {} to {} (eid {}), native fee {}",
            intent.token_id,
            intent.source,
            intent.destination,
            dst_eid,
            intent.fee.native_fee
        );

        let handle = writer
            .send(&param, &intent.fee, intent.refund_address)
            .await?;
        tracing::info!("Travel submitted on {}: {}", handle.network, handle.hash);
        Ok(handle)
    }

    /// Send the snapshot's active ship to `destination`
    pub async fn travel_from_snapshot(
        &self,
        snapshot: &OwnershipSnapshot,
        destination: &NetworkKey,
    ) -> OmniResult<TxHandle> {
        match (snapshot.token_id, snapshot.network.as_ref()) {
            (Some(token_id), Some(source)) => self.travel(source, destination, token_id).await,
            _ => Err(OmniError::NoShip),
        }
    }
}

/// How often and how many times to poll a chain
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub interval: Duration,
    pub attempts: u32,
}

impl PollPolicy {
    /// Receipts usually land within a few blocks
    pub fn receipt() -> Self {
        Self {
            interval: Duration::from_secs(3),
            attempts: 20,
        }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(15),
            attempts: 40,
        }
    }
}

/// Poll `lookup` until it yields a receipt
///
/// Lookup errors count as an empty attempt. Returns `None` once the
/// attempts run out with the transaction still pending.
pub async fn await_receipt<F, Fut>(lookup: F, policy: PollPolicy) -> Option<TransactionReceipt>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Option<TransactionReceipt>, CallError>>,
{
    for attempt in 1..=policy.attempts {
        match lookup().await {
            Ok(Some(receipt)) => {
                tracing::debug!(
                    "Receipt for {} after {} poll(s)",
                    receipt.transaction_hash,
                    attempt
                );
                return Some(receipt);
            }
            Ok(None) => {}
            Err(e) => tracing::debug!("Receipt lookup failed: {}", e),
        }
        if attempt < policy.attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }
    None
}

/// Poll until `token_id` shows up on `destination`
///
/// Returns the snapshot that saw it, or `None` once the attempts run out.
pub async fn await_arrival(
    reconciler: &OwnershipReconciler,
    account: Address,
    token_id: u64,
    destination: &NetworkKey,
    policy: PollPolicy,
) -> Option<OwnershipSnapshot> {
    for attempt in 1..=policy.attempts {
        let snapshot = reconciler.reconcile(Some(account)).await;
        let landed = snapshot
            .holdings_for(destination.as_str())
            .is_some_and(|h| h.token_ids.contains(&token_id));
        if landed {
            tracing::info!(
                "Ship {} arrived on {} after {} poll(s)",
                token_id,
                destination,
                attempt
            );
            return Some(snapshot);
        }

        tracing::debug!(
            "Ship {} not on {} yet ({}/{})",
            token_id,
            destination,
            attempt,
            policy.attempts
        );
        if attempt < policy.attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }

    tracing::warn!(
        "Ship {} did not reach {} in {} polls",
        token_id,
        destination,
        policy.attempts
    );
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::LinearProbe;
    use crate::testing::{MockReader, MockWriter, ACCOUNT};
    use alloy_primitives::{U256, U64};
    use omni_bridge::StarshipRead;
    use std::sync::atomic::{AtomicU32, Ordering};
    use omni_types::{address_to_bytes32, NetworkDescriptor, RejectionCause};

    fn orchestrator(writers: Vec<Arc<MockWriter>>) -> TravelOrchestrator {
        TravelOrchestrator::new(
            Arc::new(ChainRegistry::testnet()),
            writers
                .into_iter()
                .map(|w| w as Arc<dyn StarshipWrite>)
                .collect(),
        )
    }

    fn key(s: &str) -> NetworkKey {
        NetworkKey::new(s)
    }

    #[tokio::test]
    async fn test_quote_then_send_with_exact_fee() {
        let arb = Arc::new(MockWriter::new("arbitrum-sepolia", 100));
        let handle = orchestrator(vec![arb.clone()])
            .travel(&key("arbitrum-sepolia"), &key("base-sepolia"), 3)
            .await
            .unwrap();

        assert_eq!(handle.hash, MockWriter::TX_HASH);
        assert_eq!(handle.network, key("arbitrum-sepolia"));

        let quotes = arb.quotes.lock().clone();
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].dst_eid, 40245);
        assert_eq!(quotes[0].to, address_to_bytes32(ACCOUNT));
        assert_eq!(quotes[0].token_id, U256::from(3));

        let sends = arb.sends.lock().clone();
        assert_eq!(sends.len(), 1);
        let (param, fee, refund) = &sends[0];
        assert_eq!(param, &quotes[0]);
        assert_eq!(fee.native_fee, U256::from(100));
        assert_eq!(*refund, ACCOUNT);
    }

    #[tokio::test]
    async fn test_missing_route_before_any_call() {
        let testnet = ChainRegistry::testnet();
        let mut networks: Vec<NetworkDescriptor> = testnet.iter().cloned().collect();
        for n in networks.iter_mut() {
            if n.key == "base-sepolia" {
                n.lz_eid = None;
            }
        }
        let registry = ChainRegistry::new(networks, testnet.hub().clone()).unwrap();

        let arb = Arc::new(MockWriter::new("arbitrum-sepolia", 100));
        let writers = vec![arb.clone() as Arc<dyn StarshipWrite>];
        let travel = TravelOrchestrator::new(Arc::new(registry), writers);
        let result = travel
            .travel(&key("arbitrum-sepolia"), &key("base-sepolia"), 1)
            .await;

        assert_eq!(result, Err(OmniError::MissingRouteConfig(key("base-sepolia"))));
        assert!(arb.untouched());
    }

    #[tokio::test]
    async fn test_same_chain_rejected() {
        let base = Arc::new(MockWriter::new("base-sepolia", 100));
        let result = orchestrator(vec![base.clone()])
            .travel(&key("base-sepolia"), &key("base-sepolia"), 1)
            .await;

        assert_eq!(result, Err(OmniError::SameChainTravel(key("base-sepolia"))));
        assert!(base.untouched());
    }

    #[tokio::test]
    async fn test_unknown_destination() {
        let base = Arc::new(MockWriter::new("base-sepolia", 100));
        let result = orchestrator(vec![base.clone()])
            .travel(&key("base-sepolia"), &key("polygon-amoy"), 1)
            .await;

        assert_eq!(result, Err(OmniError::UnknownChain("polygon-amoy".into())));
        assert!(base.untouched());
    }

    #[tokio::test]
    async fn test_quote_failure_aborts_without_send() {
        let quote_error = OmniError::TransactionRejected {
            cause: RejectionCause::Reverted,
            message: "execution reverted".into(),
        };
        let arb = Arc::new(
            MockWriter::new("arbitrum-sepolia", 100).failing_quote(quote_error.clone()),
        );
        let result = orchestrator(vec![arb.clone()])
            .travel(&key("arbitrum-sepolia"), &key("base-sepolia"), 1)
            .await;

        assert_eq!(result, Err(quote_error));
        assert!(arb.sends.lock().is_empty());
    }

    #[tokio::test]
    async fn test_no_wallet_account() {
        let arb = Arc::new(MockWriter::new("arbitrum-sepolia", 100).without_account());
        let result = orchestrator(vec![arb.clone()])
            .travel(&key("arbitrum-sepolia"), &key("base-sepolia"), 1)
            .await;

        assert_eq!(result, Err(OmniError::MissingWallet));
        assert!(arb.untouched());
    }

    #[tokio::test]
    async fn test_travel_from_empty_snapshot() {
        let arb = Arc::new(MockWriter::new("arbitrum-sepolia", 100));
        let snapshot = OwnershipSnapshot::empty(Some(ACCOUNT), ChainRegistry::testnet().keys());
        let result = orchestrator(vec![arb.clone()])
            .travel_from_snapshot(&snapshot, &key("base-sepolia"))
            .await;

        assert_eq!(result, Err(OmniError::NoShip));
        assert!(arb.untouched());
    }

    #[tokio::test]
    async fn test_travel_from_snapshot_uses_active_ship() {
        let base = Arc::new(MockWriter::new("base-sepolia", 7));
        let reader = Arc::new(
            MockReader::new("base-sepolia")
                .with_balance(1)
                .with_owner_at(1, ACCOUNT),
        );
        let reconciler = OwnershipReconciler::new(
            vec![reader as Arc<dyn StarshipRead>],
            Arc::new(LinearProbe::default()),
        );
        let snapshot = reconciler.reconcile(Some(ACCOUNT)).await;

        orchestrator(vec![base.clone()])
            .travel_from_snapshot(&snapshot, &key("arbitrum-sepolia"))
            .await
            .unwrap();

        let sends = base.sends.lock().clone();
        assert_eq!(sends[0].0.dst_eid, 40231);
        assert_eq!(sends[0].0.token_id, U256::from(1));
    }

    #[tokio::test]
    async fn test_await_arrival() {
        let arb = Arc::new(MockReader::new("arbitrum-sepolia"));
        let base = Arc::new(MockReader::new("base-sepolia"));
        let reconciler = OwnershipReconciler::new(
            vec![
                arb.clone() as Arc<dyn StarshipRead>,
                base.clone() as Arc<dyn StarshipRead>,
            ],
            Arc::new(LinearProbe::default()),
        );
        let policy = PollPolicy {
            interval: Duration::from_millis(1),
            attempts: 3,
        };

        let missing = await_arrival(&reconciler, ACCOUNT, 1, &key("base-sepolia"), policy).await;
        assert!(missing.is_none());
        assert_eq!(base.balance_calls(), 3);

        base.credit(1, ACCOUNT);
        let landed = await_arrival(&reconciler, ACCOUNT, 1, &key("base-sepolia"), policy)
            .await
            .unwrap();
        assert_eq!(landed.token_id, Some(1));
        assert_eq!(landed.network.as_ref().unwrap(), "base-sepolia");
        assert_eq!(base.balance_calls(), 4);
    }

    fn receipt(status: u64) -> TransactionReceipt {
        TransactionReceipt {
            transaction_hash: MockWriter::TX_HASH,
            block_number: Some(U64::from(16)),
            status: Some(U64::from(status)),
        }
    }

    #[tokio::test]
    async fn test_await_receipt_after_pending() {
        let lookups = AtomicU32::new(0);
        let policy = PollPolicy {
            interval: Duration::from_millis(1),
            attempts: 5,
        };

        let found = await_receipt(
            || {
                let n = lookups.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    match n {
                        1 => Ok(None),
                        2 => Err(CallError::Transport("timeout".to_string())),
                        _ => Ok(Some(receipt(0))),
                    }
                }
            },
            policy,
        )
        .await
        .unwrap();

        assert_eq!(lookups.load(Ordering::SeqCst), 3);
        assert!(!found.succeeded());
    }

    #[tokio::test]
    async fn test_await_receipt_gives_up() {
        let lookups = AtomicU32::new(0);
        let policy = PollPolicy {
            interval: Duration::from_millis(1),
            attempts: 4,
        };

        let found = await_receipt(
            || {
                lookups.fetch_add(1, Ordering::SeqCst);
                async { Ok(None) }
            },
            policy,
        )
        .await;

        assert!(found.is_none());
        assert_eq!(lookups.load(Ordering::SeqCst), 4);
        assert!(receipt(1).succeeded());
    }
}
