//! # Multi-Node Test Harness
//!
//! Wires real adapters for several parties over one in-memory session
//! network: each node gets its own identity, ledger store and flow service,
//! and all of them share a party directory and a single notary.

use parking_lot::Mutex;
use shared_bus::{InMemorySessionNetwork, SessionListener};
use shared_types::{Party, PartyDirectory};
use std::sync::{Arc, Once};
use std::time::Duration;
use tokio::task::JoinHandle;
use tr_01_record_contract::StateAndRef;
use tr_02_ledger_store::{InMemoryLedgerStore, LedgerStore};
use tr_03_record_flows::{
    AcceptAll, BusSessionInitiator, BusSessionListener, FiatTokenModule, FungibleToken,
    InMemoryNotary, NodeIdentity, ProposalCheck, RecordFlowConfig, RecordFlowDependencies,
    RecordFlowService, SigningCoordinator, SystemClock,
};

pub type NodeService = RecordFlowService<BusSessionInitiator, FiatTokenModule>;

static TRACING: Once = Once::new();

/// Install a fmt subscriber once per test binary. `RUST_LOG` selects levels.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Per-node settings.
pub struct NodeOptions {
    pub config: RecordFlowConfig,
    pub check: Arc<dyn ProposalCheck>,
}

impl Default for NodeOptions {
    fn default() -> Self {
        Self {
            config: RecordFlowConfig {
                session_timeout: Duration::from_secs(5),
                consensus_timeout: Duration::from_secs(5),
                finality_timeout: Duration::from_secs(5),
                ..RecordFlowConfig::default()
            },
            check: Arc::new(AcceptAll),
        }
    }
}

pub struct TestNode {
    pub identity: Arc<NodeIdentity>,
    pub store: Arc<InMemoryLedgerStore>,
    pub service: Arc<NodeService>,
    config: RecordFlowConfig,
    network: Arc<InMemorySessionNetwork>,
    directory: Arc<PartyDirectory>,
    notary: Arc<InMemoryNotary>,
    server: JoinHandle<()>,
}

impl TestNode {
    pub fn party(&self) -> &Party {
        self.identity.party()
    }

    /// A coordinator for hand-built bundles, bypassing the proposal builder.
    pub fn coordinator(&self) -> SigningCoordinator<BusSessionInitiator> {
        SigningCoordinator::new(
            Arc::clone(&self.identity),
            Arc::clone(&self.directory),
            Arc::new(BusSessionInitiator::new(
                Arc::clone(&self.network),
                self.party().clone(),
            )),
            self.notary.clone(),
            self.store.clone(),
            &self.config,
        )
    }

    /// Unconsumed fungible tokens in this node's vault.
    pub fn tokens(&self) -> Vec<(StateAndRef, FungibleToken)> {
        self.store
            .vault_states()
            .into_iter()
            .filter_map(|s| FiatTokenModule::decode(&s.state).map(|t| (s, t)))
            .collect()
    }

    pub fn record_count(&self) -> usize {
        self.store.recorded_records().len()
    }
}

impl Drop for TestNode {
    fn drop(&mut self) {
        self.server.abort();
    }
}

pub struct TestNetwork {
    pub network: Arc<InMemorySessionNetwork>,
    pub directory: Arc<PartyDirectory>,
    pub notary: Arc<InMemoryNotary>,
    offline: Mutex<Vec<SessionListener>>,
}

impl TestNetwork {
    pub fn new() -> Self {
        Self::with_notary(InMemoryNotary::new(NodeIdentity::from_label("Notary")))
    }

    /// Notary that answers only after `latency`.
    pub fn with_notary_latency(latency: Duration) -> Self {
        let notary = InMemoryNotary::new(NodeIdentity::from_label("Notary")).with_latency(latency);
        Self::with_notary(notary)
    }

    fn with_notary(notary: InMemoryNotary) -> Self {
        init_tracing();
        let directory = Arc::new(PartyDirectory::new());
        directory.register_notary(notary.party().clone());
        Self {
            network: Arc::new(InMemorySessionNetwork::new()),
            directory,
            notary: Arc::new(notary),
            offline: Mutex::new(Vec::new()),
        }
    }

    /// A serving node with default options.
    pub fn create_party_node(&self, name: &str) -> TestNode {
        self.create_node_with(name, NodeOptions::default())
    }

    pub fn create_node_with(&self, name: &str, options: NodeOptions) -> TestNode {
        let identity = Arc::new(NodeIdentity::from_label(name));
        let party = identity.party().clone();
        self.directory.register(party.clone());

        let store = Arc::new(InMemoryLedgerStore::new(party.clone()));
        let deps = RecordFlowDependencies {
            identity: Arc::clone(&identity),
            directory: Arc::clone(&self.directory),
            store: store.clone(),
            sessions: Arc::new(BusSessionInitiator::new(Arc::clone(&self.network), party.clone())),
            consensus: self.notary.clone(),
            value_transfer: Arc::new(FiatTokenModule::from_config(&options.config)),
            check: options.check,
            clock: Arc::new(SystemClock),
        };
        let service = match NodeService::new(options.config.clone(), deps) {
            Ok(service) => Arc::new(service),
            Err(e) => panic!("node {name} failed to start: {e}"),
        };
        let server = service.serve(BusSessionListener::register(&self.network, &party));

        TestNode {
            identity,
            store,
            service,
            config: options.config,
            network: Arc::clone(&self.network),
            directory: Arc::clone(&self.directory),
            notary: Arc::clone(&self.notary),
            server,
        }
    }

    /// A party that is known and reachable but never answers.
    pub fn create_offline_party(&self, name: &str) -> Party {
        let party = NodeIdentity::from_label(name).party().clone();
        self.directory.register(party.clone());
        self.offline.lock().push(self.network.register(&party));
        party
    }
}

impl Default for TestNetwork {
    fn default() -> Self {
        Self::new()
    }
}

/// Poll `condition` until it holds or `limit` passes.
pub async fn eventually(limit: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + limit;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
