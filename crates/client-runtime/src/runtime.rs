//! # Client Runtime
//!
//! Wires the three subsystems onto one event bus and manages their
//! background tasks. The CLI owns one [`ClientRuntime`] per invocation;
//! long-running commands call [`start`](ClientRuntime::start) and later
//! [`shutdown`](ClientRuntime::shutdown).

use crate::config::RuntimeConfig;
use anyhow::{Context, Result};
use parking_lot::Mutex;
use shared_bus::events::{ClientEvent, EventFilter, EventTopic};
use shared_bus::publisher::InMemoryEventBus;
use shared_evm::tx::TypedTransaction;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use vl_01_wallet_session::{
    ApprovalPolicy, ChainProvider, HttpProvider, LocalWallet, NetworkRegistry, Session,
    SessionService, WalletConnector,
};
use vl_02_ledger_sync::{LedgerService, LedgerWatcher};
use vl_03_upload::{ContentStore, IpfsHttpStore, MemoryContentStore, UploadService};

/// The wired client: one bus, three subsystems, and their tasks.
pub struct ClientRuntime {
    bus: Arc<InMemoryEventBus>,
    sessions: Arc<SessionService>,
    ledger: Arc<LedgerService>,
    uploads: Arc<UploadService>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl ClientRuntime {
    /// Build the runtime from configuration, constructing the production
    /// adapters: an HTTP provider, a local key wallet, and the configured
    /// content store.
    pub fn new(config: RuntimeConfig) -> Result<Self> {
        let registry = load_registry(&config)?;
        let provider: Arc<dyn ChainProvider> = Arc::new(HttpProvider::new(&config.session)?);
        let mut wallet = LocalWallet::from_hex(&config.private_key)?;
        if !config.auto_approve {
            wallet = wallet.with_approval(Arc::new(ConsoleApproval));
        }
        let wallet: Arc<dyn WalletConnector> = Arc::new(wallet);
        let store: Arc<dyn ContentStore> = if config.use_ipfs {
            Arc::new(IpfsHttpStore::new(&config.upload)?)
        } else {
            warn!("VL_IPFS_API not set, storing content in memory only");
            Arc::new(MemoryContentStore::new())
        };
        Ok(Self::wire(config, registry, provider, wallet, store))
    }

    /// Wire the subsystems around injected adapters. This is the whole
    /// dependency graph; [`new`](Self::new) only chooses the adapters.
    pub fn wire(
        config: RuntimeConfig,
        registry: NetworkRegistry,
        provider: Arc<dyn ChainProvider>,
        wallet: Arc<dyn WalletConnector>,
        store: Arc<dyn ContentStore>,
    ) -> Self {
        let bus = Arc::new(InMemoryEventBus::new());
        let sessions = Arc::new(SessionService::new(
            config.session,
            registry,
            provider,
            wallet,
            Arc::clone(&bus),
        ));
        let ledger = Arc::new(LedgerService::new(
            config.ledger,
            Arc::clone(&sessions),
            Arc::clone(&bus),
        ));
        let uploads = Arc::new(UploadService::new(
            config.upload,
            Arc::clone(&sessions),
            store,
            Arc::clone(&bus),
        ));
        Self {
            bus,
            sessions,
            ledger,
            uploads,
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Connect the session, load the catalog, and start the background
    /// tasks: the append watcher, the upload feed, and the notification
    /// funnel.
    pub async fn start(&self) -> Result<Arc<Session>> {
        let session = self.sessions.connect().await?;
        info!(
            account = %session.account(),
            network = %session.info().network_label,
            "session established"
        );

        self.ledger
            .load_videos()
            .await
            .context("loading the video catalog")?;

        let watcher = LedgerWatcher::new(Arc::clone(&self.ledger), Arc::clone(&session));
        let mut tasks = self.tasks.lock();
        tasks.push(watcher.spawn());
        tasks.push(self.ledger.spawn_upload_feed());
        tasks.push(self.spawn_notification_funnel());
        Ok(session)
    }

    /// Close the session and stop the background tasks. The watcher exits
    /// on its own when the session closes; the bus-driven tasks are
    /// aborted.
    pub async fn shutdown(&self) {
        info!("shutting down");
        self.sessions.disconnect().await;
        for task in self.tasks.lock().drain(..) {
            task.abort();
        }
    }

    /// Collect every subsystem's notifications into the session service's
    /// log, so one place backs the status view. The session service
    /// already records its own before publishing, hence the source filter.
    fn spawn_notification_funnel(&self) -> JoinHandle<()> {
        let mut sub = self
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::Notifications]));
        let sessions = Arc::clone(&self.sessions);
        tokio::spawn(async move {
            while let Some(event) = sub.recv().await {
                if let ClientEvent::NotificationRaised {
                    source,
                    notification,
                } = event
                {
                    if source != vl_01_wallet_session::SUBSYSTEM_ID {
                        sessions.record_notification(notification);
                    }
                }
            }
            debug!("notification funnel stopped");
        })
    }

    /// The shared event bus.
    #[must_use]
    pub fn bus(&self) -> Arc<InMemoryEventBus> {
        Arc::clone(&self.bus)
    }

    /// The wallet session service.
    #[must_use]
    pub fn sessions(&self) -> Arc<SessionService> {
        Arc::clone(&self.sessions)
    }

    /// The ledger sync service.
    #[must_use]
    pub fn ledger(&self) -> Arc<LedgerService> {
        Arc::clone(&self.ledger)
    }

    /// The upload service.
    #[must_use]
    pub fn uploads(&self) -> Arc<UploadService> {
        Arc::clone(&self.uploads)
    }
}

/// Asks for a y/N on stdin before every signature, the way a browser
/// wallet would prompt. Blocks the calling task while the user decides.
struct ConsoleApproval;

impl ApprovalPolicy for ConsoleApproval {
    fn approve(&self, tx: &TypedTransaction) -> bool {
        let to = match tx.to {
            Some(address) => format!("{address:#x}"),
            None => "contract creation".to_string(),
        };
        println!(
            "sign transaction to {to} (nonce {}, {} byte payload)? [y/N]",
            tx.nonce,
            tx.data.len()
        );
        let mut line = String::new();
        if std::io::stdin().read_line(&mut line).is_err() {
            return false;
        }
        matches!(line.trim(), "y" | "Y" | "yes")
    }
}

/// Bundled networks, with the deployment file merged over them when one
/// is configured.
fn load_registry(config: &RuntimeConfig) -> Result<NetworkRegistry> {
    let mut registry = NetworkRegistry::bundled();
    if let Some(path) = &config.session.networks_file {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading networks file {}", path.display()))?;
        let merged = registry.merge_from_json(&json)?;
        info!(merged, file = %path.display(), "merged deployment registry");
    }
    Ok(registry)
}
