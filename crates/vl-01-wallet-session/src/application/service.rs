//! # Session Service
//!
//! Orchestrates the wallet session lifecycle. `connect` resolves the
//! account, chain, and contract binding into a [`Session`]; `disconnect`
//! tears it down and signals every holder through the session's closed
//! channel. At most one session is live at a time.

use crate::config::SessionConfig;
use crate::domain::contract::LedgerContract;
use crate::domain::errors::SessionError;
use crate::domain::messages::{
    BALANCE_UNAVAILABLE, CODE_BALANCE_UNAVAILABLE, CODE_NETWORK_NOT_SUPPORTED,
    NETWORK_NOT_SUPPORTED,
};
use crate::domain::registry::NetworkRegistry;
use crate::domain::SUBSYSTEM_ID;
use crate::ports::outbound::{ChainProvider, WalletConnector};
use parking_lot::Mutex;
use shared_bus::events::ClientEvent;
use shared_bus::publisher::{EventPublisher, InMemoryEventBus};
use shared_evm::tx::TypedTransaction;
use shared_types::entities::{Address, ChainId, SessionInfo, U256};
use shared_types::notifications::{Notification, NotificationLog};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::{info, warn};

/// A live wallet session: the resolved identity plus the provider and
/// signer handles bound to it.
///
/// Consumers hold an `Arc<Session>` and watch [`closed`](Session::closed);
/// once it flips they must stop using the handles and drop the `Arc`.
pub struct Session {
    info: SessionInfo,
    provider: Arc<dyn ChainProvider>,
    wallet: Arc<dyn WalletConnector>,
    contract: LedgerContract,
    shutdown: watch::Sender<bool>,
}

impl Session {
    fn new(
        info: SessionInfo,
        provider: Arc<dyn ChainProvider>,
        wallet: Arc<dyn WalletConnector>,
    ) -> Self {
        let (shutdown, _) = watch::channel(false);
        let contract = LedgerContract::new(info.contract_address);
        Self {
            info,
            provider,
            wallet,
            contract,
            shutdown,
        }
    }

    /// Read-only view of the session identity.
    #[must_use]
    pub fn info(&self) -> &SessionInfo {
        &self.info
    }

    /// The connected account.
    #[must_use]
    pub fn account(&self) -> Address {
        self.info.account
    }

    /// Chain the session is bound to.
    #[must_use]
    pub fn chain_id(&self) -> ChainId {
        self.info.chain_id
    }

    /// The ledger contract binding resolved for this chain.
    #[must_use]
    pub fn contract(&self) -> &LedgerContract {
        &self.contract
    }

    /// Provider handle bound to this session.
    #[must_use]
    pub fn provider(&self) -> Arc<dyn ChainProvider> {
        Arc::clone(&self.provider)
    }

    /// Ask the session's wallet to sign a transaction.
    pub async fn sign_transaction(&self, tx: &TypedTransaction) -> Result<Vec<u8>, SessionError> {
        self.wallet.sign_transaction(tx).await
    }

    /// Channel that flips to `true` when the session is torn down.
    /// Long-running consumers select on this to stop their work.
    #[must_use]
    pub fn closed(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }

    /// True once the session has been torn down.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        *self.shutdown.borrow()
    }

    fn close(&self) {
        self.shutdown.send_replace(true);
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("info", &self.info)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

/// Wallet session service.
pub struct SessionService {
    config: SessionConfig,
    registry: NetworkRegistry,
    provider: Arc<dyn ChainProvider>,
    wallet: Arc<dyn WalletConnector>,
    bus: Arc<InMemoryEventBus>,
    session: RwLock<Option<Arc<Session>>>,
    notifications: Mutex<NotificationLog>,
}

impl SessionService {
    /// Create the service. No connection is attempted until
    /// [`connect`](Self::connect).
    pub fn new(
        config: SessionConfig,
        registry: NetworkRegistry,
        provider: Arc<dyn ChainProvider>,
        wallet: Arc<dyn WalletConnector>,
        bus: Arc<InMemoryEventBus>,
    ) -> Self {
        Self {
            config,
            registry,
            provider,
            wallet,
            bus,
            session: RwLock::new(None),
            notifications: Mutex::new(NotificationLog::default()),
        }
    }

    /// Establish a session: request accounts, resolve the network and
    /// contract, and publish `SessionEstablished`.
    ///
    /// An unusable network (unknown chain, or no contract deployed there)
    /// raises the network notification before the error is returned.
    /// Connecting while a session is live closes the old one first.
    pub async fn connect(&self) -> Result<Arc<Session>, SessionError> {
        info!("[vl-01] connecting wallet session");

        let accounts = self.wallet.request_accounts().await?;
        let account = accounts.first().copied().ok_or(SessionError::NoAccounts)?;
        let chain_id = self.provider.chain_id().await?;

        let contract_address = match self.registry.resolve_contract(chain_id) {
            Ok(address) => address,
            Err(e) => {
                warn!(chain_id, error = %e, "[vl-01] network not usable");
                self.raise(Notification::error(
                    CODE_NETWORK_NOT_SUPPORTED,
                    NETWORK_NOT_SUPPORTED,
                ))
                .await;
                return Err(e);
            }
        };
        let network_label = self
            .registry
            .get(chain_id)
            .map(|network| network.label.clone())
            .unwrap_or_else(|| format!("chain-{chain_id}"));

        let session_info = SessionInfo {
            account,
            chain_id,
            network_label,
            contract_address,
        };
        let session = Arc::new(Session::new(
            session_info.clone(),
            Arc::clone(&self.provider),
            Arc::clone(&self.wallet),
        ));

        let previous = self.session.write().await.replace(Arc::clone(&session));
        if let Some(old) = previous {
            old.close();
            self.bus
                .publish(ClientEvent::SessionClosed {
                    account: old.account(),
                })
                .await;
        }

        info!(
            account = %session_info.account,
            chain_id,
            network = %session_info.network_label,
            "[vl-01] session established"
        );
        self.bus
            .publish(ClientEvent::SessionEstablished(session_info))
            .await;

        if self.config.refresh_balance_on_connect {
            self.refresh_balance().await?;
        }
        Ok(session)
    }

    /// Tear down the active session and publish `SessionClosed`.
    /// Disconnecting with no session is a no-op.
    pub async fn disconnect(&self) {
        let previous = self.session.write().await.take();
        if let Some(session) = previous {
            session.close();
            info!(account = %session.account(), "[vl-01] session closed");
            self.bus
                .publish(ClientEvent::SessionClosed {
                    account: session.account(),
                })
                .await;
        }
    }

    /// The live session, if any.
    pub async fn current(&self) -> Option<Arc<Session>> {
        self.session.read().await.clone()
    }

    /// Refresh the connected account's balance and publish the result.
    ///
    /// A failed fetch does not end the session: it raises the balance
    /// notification and publishes `BalanceUpdated` with `None`.
    pub async fn refresh_balance(&self) -> Result<Option<U256>, SessionError> {
        let session = self.current().await.ok_or(SessionError::NotConnected)?;
        let account = session.account();

        match session.provider().balance(account).await {
            Ok(balance) => {
                self.bus
                    .publish(ClientEvent::BalanceUpdated {
                        account,
                        balance_wei: Some(balance),
                    })
                    .await;
                Ok(Some(balance))
            }
            Err(e) => {
                warn!(error = %e, "[vl-01] balance fetch failed");
                self.raise(Notification::error(
                    CODE_BALANCE_UNAVAILABLE,
                    BALANCE_UNAVAILABLE,
                ))
                .await;
                self.bus
                    .publish(ClientEvent::BalanceUpdated {
                        account,
                        balance_wei: None,
                    })
                    .await;
                Ok(None)
            }
        }
    }

    /// Append an externally-raised notification to this service's log.
    /// The runtime's bus listener funnels every subsystem's notifications
    /// here so one log backs the status view.
    pub fn record_notification(&self, notification: Notification) {
        self.notifications.lock().push(notification);
    }

    /// Snapshot of retained notifications, oldest first.
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().iter().cloned().collect()
    }

    /// Internal: record a notification of our own and broadcast it.
    async fn raise(&self, notification: Notification) {
        {
            self.notifications.lock().push(notification.clone());
        }
        self.bus
            .publish(ClientEvent::NotificationRaised {
                source: SUBSYSTEM_ID,
                notification,
            })
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::dev_chain::DevChain;
    use crate::adapters::local_wallet::LocalWallet;
    use crate::ports::outbound::MockWallet;
    use async_trait::async_trait;
    use shared_bus::events::{EventFilter, EventTopic};
    use shared_evm::units::ether;
    use shared_types::notifications::NotificationKind;
    use std::time::Duration;
    use tokio::time::timeout;

    struct Harness {
        chain: Arc<DevChain>,
        wallet: LocalWallet,
        bus: Arc<InMemoryEventBus>,
        service: SessionService,
    }

    fn harness_on(chain: Arc<DevChain>) -> Harness {
        let wallet = LocalWallet::random();
        chain.fund(wallet.address(), ether(10));
        let bus = Arc::new(InMemoryEventBus::new());
        let service = SessionService::new(
            SessionConfig::for_testing(),
            NetworkRegistry::bundled(),
            chain.clone(),
            Arc::new(wallet.clone()),
            bus.clone(),
        );
        Harness {
            chain,
            wallet,
            bus,
            service,
        }
    }

    fn harness() -> Harness {
        harness_on(Arc::new(DevChain::new()))
    }

    async fn next_event(sub: &mut shared_bus::subscriber::Subscription) -> ClientEvent {
        timeout(Duration::from_millis(100), sub.recv())
            .await
            .expect("timed out waiting for event")
            .expect("bus closed")
    }

    #[tokio::test]
    async fn test_connect_resolves_network_and_contract() {
        let h = harness();
        let mut sub = h
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::WalletSession]));

        let session = h.service.connect().await.unwrap();
        assert_eq!(session.account(), h.wallet.address());
        assert_eq!(session.chain_id(), 31337);
        assert_eq!(session.info().network_label, "Hardhat");
        assert_eq!(session.contract().address(), h.chain.contract_address());
        assert!(!session.is_closed());

        match next_event(&mut sub).await {
            ClientEvent::SessionEstablished(info) => {
                assert_eq!(info.account, h.wallet.address());
                assert_eq!(info.chain_id, 31337);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_connect_rejects_unknown_chain_with_notification() {
        let h = harness_on(Arc::new(DevChain::on_chain(1)));
        let mut sub = h
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::Notifications]));

        let err = h.service.connect().await.unwrap_err();
        assert!(matches!(err, SessionError::UnsupportedNetwork { chain_id: 1 }));

        match next_event(&mut sub).await {
            ClientEvent::NotificationRaised { source, notification } => {
                assert_eq!(source, SUBSYSTEM_ID);
                assert_eq!(notification.code, CODE_NETWORK_NOT_SUPPORTED);
                assert_eq!(notification.kind, NotificationKind::Error);
            }
            other => panic!("unexpected event: {other:?}"),
        }

        let logged = h.service.notifications();
        assert_eq!(logged.len(), 1);
        assert_eq!(logged[0].message, NETWORK_NOT_SUPPORTED);
        assert!(h.service.current().await.is_none());
    }

    #[tokio::test]
    async fn test_connect_rejects_undeployed_network() {
        let h = harness_on(Arc::new(DevChain::on_chain(11_155_111)));
        let err = h.service.connect().await.unwrap_err();
        assert!(matches!(err, SessionError::ContractNotDeployed { .. }));
        assert_eq!(h.service.notifications().len(), 1);
    }

    #[tokio::test]
    async fn test_connect_requires_an_account() {
        struct EmptyWallet;

        #[async_trait]
        impl WalletConnector for EmptyWallet {
            async fn request_accounts(&self) -> Result<Vec<Address>, SessionError> {
                Ok(vec![])
            }
            async fn sign_transaction(
                &self,
                _tx: &TypedTransaction,
            ) -> Result<Vec<u8>, SessionError> {
                Err(SessionError::ApprovalDenied)
            }
        }

        let service = SessionService::new(
            SessionConfig::for_testing(),
            NetworkRegistry::bundled(),
            Arc::new(DevChain::new()),
            Arc::new(EmptyWallet),
            Arc::new(InMemoryEventBus::new()),
        );
        assert!(matches!(
            service.connect().await,
            Err(SessionError::NoAccounts)
        ));
    }

    #[tokio::test]
    async fn test_connect_surfaces_wallet_denial() {
        let mut wallet = MockWallet::new();
        wallet.deny_accounts = true;
        let service = SessionService::new(
            SessionConfig::for_testing(),
            NetworkRegistry::bundled(),
            Arc::new(DevChain::new()),
            Arc::new(wallet),
            Arc::new(InMemoryEventBus::new()),
        );
        assert!(matches!(
            service.connect().await,
            Err(SessionError::ConnectionRejected(_))
        ));
    }

    #[tokio::test]
    async fn test_reconnect_closes_previous_session() {
        let h = harness();
        let first = h.service.connect().await.unwrap();

        let mut sub = h
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::WalletSession]));
        let second = h.service.connect().await.unwrap();

        assert!(first.is_closed());
        assert!(!second.is_closed());

        // Old session closes before the new one is announced.
        assert!(matches!(
            next_event(&mut sub).await,
            ClientEvent::SessionClosed { .. }
        ));
        assert!(matches!(
            next_event(&mut sub).await,
            ClientEvent::SessionEstablished(_)
        ));
    }

    #[tokio::test]
    async fn test_disconnect_signals_watchers_and_is_idempotent() {
        let h = harness();
        let session = h.service.connect().await.unwrap();
        let mut closed = session.closed();
        assert!(!*closed.borrow());

        let mut sub = h
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::WalletSession]));
        h.service.disconnect().await;

        closed.changed().await.unwrap();
        assert!(*closed.borrow());
        assert!(session.is_closed());
        assert!(h.service.current().await.is_none());
        assert!(matches!(
            next_event(&mut sub).await,
            ClientEvent::SessionClosed { .. }
        ));

        // Second disconnect publishes nothing.
        h.service.disconnect().await;
        assert!(timeout(Duration::from_millis(50), sub.recv()).await.is_err());
    }

    #[tokio::test]
    async fn test_refresh_balance_publishes_amount() {
        let h = harness();
        h.service.connect().await.unwrap();
        let mut sub = h
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::WalletSession]));

        let balance = h.service.refresh_balance().await.unwrap();
        assert_eq!(balance, Some(ether(10)));

        match next_event(&mut sub).await {
            ClientEvent::BalanceUpdated { balance_wei, .. } => {
                assert_eq!(balance_wei, Some(ether(10)));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_balance_failure_is_not_fatal() {
        let h = harness();
        h.service.connect().await.unwrap();
        h.chain.set_fail_balance(true);

        let balance = h.service.refresh_balance().await.unwrap();
        assert_eq!(balance, None);

        // Session survives; the failure shows up as a notification.
        assert!(h.service.current().await.is_some());
        let logged = h.service.notifications();
        assert_eq!(logged.last().unwrap().code, CODE_BALANCE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_refresh_balance_requires_session() {
        let h = harness();
        assert!(matches!(
            h.service.refresh_balance().await,
            Err(SessionError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_session_signs_as_connected_account() {
        let h = harness();
        let session = h.service.connect().await.unwrap();

        let tx = TypedTransaction {
            chain_id: session.chain_id(),
            nonce: 0,
            max_priority_fee_per_gas: U256::from(1u64),
            max_fee_per_gas: U256::from(2u64),
            gas_limit: 100_000,
            to: Some(session.contract().address()),
            value: U256::zero(),
            data: session.contract().video_count_call(),
        };
        let raw = session.sign_transaction(&tx).await.unwrap();
        let (decoded, sig) = TypedTransaction::decode_signed(&raw).unwrap();
        assert_eq!(
            shared_evm::tx::recover_sender(&decoded, &sig).unwrap(),
            session.account()
        );
    }

    #[tokio::test]
    async fn test_recorded_notifications_are_bounded() {
        let h = harness();
        for i in 0..100 {
            h.service
                .record_notification(Notification::hint("spam", format!("n{i}")));
        }
        let logged = h.service.notifications();
        assert_eq!(logged.len(), shared_types::notifications::DEFAULT_LOG_CAPACITY);
        assert_eq!(logged.last().unwrap().message, "n99");
    }
}
