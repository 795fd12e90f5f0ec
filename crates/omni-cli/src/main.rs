//! OmniPlanet cockpit
//!
//! Command line front end for the cross-chain starship: shows where the
//! ship is and what the hub reports about it. Mints and cross-chain sends
//! go through the local wallet.

use alloy_primitives::Address;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use omni_bridge::{
    wallet, HttpWalletProvider, NetworkTracker, PlayerStatReader, RpcChainClient, StarHubReader,
    StarshipRead, StarshipReader, StarshipWrite, StarshipWriter, StatRead, WalletProvider,
};
use omni_session::{
    await_arrival, await_receipt, LinearProbe, OwnershipReconciler, PollPolicy, Session,
    StatReader, TravelOrchestrator,
};
use omni_types::{
    network_for_planet, ChainRegistry, NetworkKey, OmniError, OwnershipSnapshot, StatState,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;

use config::OmniConfig;

/// OmniPlanet starship cockpit
#[derive(Parser, Debug)]
#[command(name = "omniplanet")]
#[command(about = "Track, mint and fly OmniPlanet starships across chains", long_about = None)]
struct Args {
    /// JSON config file (defaults to the built-in testnet setup)
    #[arg(long, env = "OMNIPLANET_CONFIG")]
    config: Option<PathBuf>,

    /// Wallet JSON-RPC endpoint, overrides the config
    #[arg(long, env = "OMNIPLANET_WALLET_URL")]
    wallet_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List supported networks
    Networks,
    /// Show ship ownership across every chain
    Status {
        /// Inspect this address instead of the wallet account
        #[arg(long)]
        account: Option<Address>,
        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show ship stats from the hub chain
    Stats,
    /// Show the StarHub battle state
    Game {
        /// Print the state as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mint ships to the wallet account
    Mint {
        /// Chain to mint on (defaults to the wallet's current network)
        #[arg(long)]
        network: Option<NetworkKey>,
        #[arg(long, default_value = "1")]
        amount: u64,
    },
    /// Send the ship to another chain
    Travel {
        /// Destination network key
        #[arg(long, conflicts_with = "planet")]
        to: Option<NetworkKey>,
        /// Destination planet (Vulcania, Amethea)
        #[arg(long)]
        planet: Option<String>,
        /// Wait until the ship shows up on the destination
        #[arg(long)]
        wait: bool,
        /// Seconds between arrival checks
        #[arg(long, default_value = "15")]
        poll_secs: u64,
    },
    /// Follow the wallet's current network until Ctrl+C
    WatchNetwork {
        /// Seconds between wallet polls
        #[arg(long, default_value = "4")]
        interval_secs: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = run(args).await;
    if let Err(e) = &result {
        match e.downcast_ref::<OmniError>() {
            Some(err) if err.is_recoverable() => {
                tracing::info!("Nothing was changed, the command can be retried")
            }
            Some(_) => tracing::info!("Fix the configuration before retrying"),
            None => {}
        }
    }
    result
}

async fn run(args: Args) -> Result<()> {
    let cockpit = Cockpit::from_args(&args)?;

    match args.command {
        Command::Networks => cockpit.networks(),
        Command::Status { account, json } => cockpit.status(account, json).await,
        Command::Stats => cockpit.stats().await,
        Command::Game { json } => cockpit.game(json).await,
        Command::Mint { network, amount } => cockpit.mint(network, amount).await,
        Command::Travel {
            to,
            planet,
            wait,
            poll_secs,
        } => {
            let destination = match (to, planet) {
                (Some(key), _) => key,
                (None, Some(planet)) => network_for_planet(&planet)
                    .with_context(|| format!("unknown planet {}", planet))?,
                (None, None) => bail!("travel needs --to <network> or --planet <name>"),
            };
            cockpit
                .travel(destination, wait, Duration::from_secs(poll_secs))
                .await
        }
        Command::WatchNetwork { interval_secs } => {
            cockpit
                .watch_network(Duration::from_secs(interval_secs))
                .await
        }
    }
}

/// Wired-up clients for one invocation
struct Cockpit {
    config: OmniConfig,
    registry: Arc<ChainRegistry>,
    /// One node client per chain, in registry order
    clients: Vec<Arc<RpcChainClient>>,
    wallet: Arc<dyn WalletProvider>,
}

impl Cockpit {
    fn from_args(args: &Args) -> Result<Self> {
        let (mut config, base_dir) = match &args.config {
            Some(path) => {
                let config = OmniConfig::load(path)?;
                let base_dir = path
                    .parent()
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("."));
                (config, base_dir)
            }
            None => (OmniConfig::default(), PathBuf::from(".")),
        };
        if let Some(url) = &args.wallet_url {
            config.wallet_url = url.clone();
        }

        let registry = Arc::new(config.registry(&base_dir)?);
        let timeout = Duration::from_secs(config.request_timeout_secs);

        let clients = registry
            .iter()
            .map(|descriptor| RpcChainClient::new(descriptor, timeout).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;
        let provider = HttpWalletProvider::new(&config.wallet_url, timeout)?;
        tracing::debug!(
            "Cockpit ready: {} networks, wallet at {}",
            registry.len(),
            provider.url()
        );
        let wallet: Arc<dyn WalletProvider> = Arc::new(provider);

        Ok(Self {
            config,
            registry,
            clients,
            wallet,
        })
    }

    fn client(&self, network: &NetworkKey) -> Result<Arc<RpcChainClient>> {
        self.clients
            .iter()
            .find(|c| c.network() == network)
            .cloned()
            .with_context(|| format!("no client for {}", network))
    }

    fn reconciler(&self) -> OwnershipReconciler {
        let readers = self
            .registry
            .iter()
            .zip(&self.clients)
            .map(|(descriptor, client)| {
                Arc::new(StarshipReader::new(descriptor, client.clone())) as Arc<dyn StarshipRead>
            })
            .collect();
        OwnershipReconciler::new(readers, Arc::new(LinearProbe::new(self.config.probe_limit)))
    }

    fn stat_reader(&self) -> Result<StatReader> {
        let hub = self.registry.hub();
        let reader = match hub.contract_address {
            Some(contract) => {
                let client = self.client(&hub.network)?;
                Some(Arc::new(PlayerStatReader::new(hub.network.clone(), contract, client))
                    as Arc<dyn StatRead>)
            }
            None => None,
        };
        Ok(StatReader::new(reader, self.config.player_id))
    }

    fn star_hub(&self) -> Result<StarHubReader<Arc<RpcChainClient>>> {
        let hub = self.registry.hub();
        let Some(contract) = hub.contract_address else {
            bail!("no StarHub contract configured on {}", hub.network);
        };
        Ok(StarHubReader::new(
            hub.network.clone(),
            contract,
            self.client(&hub.network)?,
        ))
    }

    fn writer(&self, network: &NetworkKey) -> Result<StarshipWriter<Arc<RpcChainClient>>> {
        let descriptor = self.registry.get(network.as_str())?.clone();
        let client = self.client(network)?;
        Ok(StarshipWriter::new(descriptor, self.wallet.clone(), client))
    }

    fn session(&self) -> Result<Session> {
        Ok(Session::new(
            Arc::new(self.reconciler()),
            Arc::new(self.stat_reader()?),
        ))
    }

    /// Wallet account, or `None` when no wallet is reachable
    async fn wallet_account(&self) -> Option<Address> {
        match wallet::primary_account(self.wallet.as_ref()).await {
            Ok(account) => Some(account),
            Err(e) => {
                tracing::warn!("No wallet account: {}", e);
                None
            }
        }
    }

    fn networks(&self) -> Result<()> {
        let hub = self.registry.hub();
        for descriptor in self.registry.iter() {
            let eid = descriptor
                .lz_eid
                .map(|eid| eid.to_string())
                .unwrap_or_else(|| "-".to_string());
            let marker = if descriptor.key == hub.network { " (stat hub)" } else { "" };
            println!(
                "{:<18} chain {:<8} eid {:<6} {}{}",
                descriptor.key, descriptor.chain_id, eid, descriptor.contract_address, marker
            );
        }
        Ok(())
    }

    async fn status(&self, account: Option<Address>, json: bool) -> Result<()> {
        let account = match account {
            Some(account) => Some(account),
            None => self.wallet_account().await,
        };
        let session = self.session()?;
        let snapshot = session.refresh_ownership(account).await;

        if json {
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        } else {
            print_snapshot(&snapshot);
        }
        Ok(())
    }

    async fn stats(&self) -> Result<()> {
        let session = self.session()?;
        match session.refresh_stats().await {
            StatState::Ready(stats) => {
                println!("attack  {}", stats.attack);
                println!("defense {}", stats.defense);
                println!("health  {}", stats.health);
                Ok(())
            }
            StatState::Failed(reason) => bail!("cannot read stats: {}", reason),
            StatState::Loading => bail!("stats still loading"),
        }
    }

    async fn game(&self, json: bool) -> Result<()> {
        let game = self.star_hub()?.game_state().await?;
        if json {
            println!("{}", serde_json::to_string_pretty(&game)?);
            return Ok(());
        }

        let status = if game.active { "active" } else { "idle" };
        println!("game      {} (round {})", status, game.round);
        for (i, player) in game.players.iter().enumerate() {
            println!(
                "player {}  health {}/{} attack {} defense {}",
                i + 1,
                player.health,
                game.max_health,
                player.attack,
                player.defense
            );
        }
        if let Some(winner) = game.winner {
            println!("winner    {}", winner);
        }
        Ok(())
    }

    async fn mint(&self, network: Option<NetworkKey>, amount: u64) -> Result<()> {
        let network = match network {
            Some(network) => network,
            None => self.current_network().await,
        };
        let writer = self.writer(&network)?;
        let session = self.session()?;
        let handle = session.mint(&writer, amount).await?;
        println!("mint submitted on {}: {}", handle.network, handle.hash);
        if let Some(snapshot) = session.ownership() {
            print_snapshot(&snapshot);
        }
        Ok(())
    }

    async fn travel(&self, destination: NetworkKey, wait: bool, poll: Duration) -> Result<()> {
        let account = wallet::primary_account(self.wallet.as_ref()).await?;
        let session = self.session()?;
        let snapshot = session.refresh_ownership(Some(account)).await;
        if snapshot.is_degraded() {
            tracing::warn!(
                "Ownership incomplete, unreachable: {:?}",
                snapshot.degraded.iter().map(|n| n.as_str()).collect::<Vec<_>>()
            );
        }

        let writers = self
            .registry
            .iter()
            .map(|descriptor| {
                self.writer(&descriptor.key)
                    .map(|w| Arc::new(w) as Arc<dyn StarshipWrite>)
            })
            .collect::<Result<Vec<_>>>()?;
        let orchestrator = TravelOrchestrator::new(self.registry.clone(), writers);

        let handle = session.travel(&orchestrator, &destination).await?;
        println!("travel submitted on {}: {}", handle.network, handle.hash);

        let client = self.client(&handle.network)?;
        let receipt = await_receipt(
            || client.transaction_receipt(handle.hash),
            PollPolicy::receipt(),
        )
        .await;
        match receipt {
            Some(receipt) if !receipt.succeeded() => {
                bail!("send transaction {} reverted", handle.hash)
            }
            Some(receipt) => match receipt.block_number {
                Some(block) => println!("send confirmed in block {}", block),
                None => println!("send confirmed"),
            },
            None => println!("send still pending, check the source chain explorer"),
        }

        if wait {
            let Some(token_id) = snapshot.token_id else {
                return Ok(());
            };
            let policy = PollPolicy {
                interval: poll,
                ..PollPolicy::default()
            };
            println!("waiting for ship {} on {}...", token_id, destination);
            let reconciler = session.reconciler();
            match await_arrival(reconciler, account, token_id, &destination, policy).await {
                Some(arrived) => print_snapshot(&arrived),
                None => bail!("ship {} has not arrived on {} yet", token_id, destination),
            }
        }
        Ok(())
    }

    async fn current_network(&self) -> NetworkKey {
        let tracker = NetworkTracker::attach(
            self.wallet.clone(),
            self.registry.clone(),
            self.config.default_network.clone(),
        )
        .await;
        tracker.current()
    }

    async fn watch_network(&self, interval: Duration) -> Result<()> {
        let tracker = NetworkTracker::attach(
            self.wallet.clone(),
            self.registry.clone(),
            self.config.default_network.clone(),
        )
        .await;

        let mut shown = tracker.current();
        println!("current network: {}", shown);

        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    // Polling lets the HTTP provider notice switches
                    if let Err(e) = wallet::chain_id(self.wallet.as_ref()).await {
                        tracing::warn!("Wallet poll failed: {}", e);
                    }
                    let current = tracker.current();
                    if current != shown {
                        println!("current network: {}", current);
                        shown = current;
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Stopped watching");
                    return Ok(());
                }
            }
        }
    }
}

fn print_snapshot(snapshot: &OwnershipSnapshot) {
    match snapshot.account {
        Some(account) => println!("account   {}", account),
        None => println!("account   (not connected)"),
    }
    for holdings in &snapshot.holdings {
        let degraded = if snapshot.degraded.contains(&holdings.network) {
            "  (unreachable)"
        } else {
            ""
        };
        println!(
            "{:<18} balance {} tokens {:?}{}",
            holdings.network, holdings.balance, holdings.token_ids, degraded
        );
    }
    match (snapshot.token_id, &snapshot.network) {
        (Some(token_id), Some(network)) => {
            println!("ship      #{} on {}", token_id, network);
            if let Some(uri) = &snapshot.token_uri {
                println!("metadata  {}", uri);
            }
        }
        _ if snapshot.has_ship => println!("ship      owned, id outside the probed range"),
        _ => println!("ship      none"),
    }
}
