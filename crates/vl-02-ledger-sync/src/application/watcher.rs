//! # Append Watcher
//!
//! Polls the chain for `VideoAdded` logs landing after the snapshot block
//! and feeds them to the ledger service. One watcher runs per session; it
//! stops itself the moment the session's closed channel flips, so a stale
//! watcher never writes into a catalog belonging to a newer session.

use crate::application::service::LedgerService;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use vl_01_wallet_session::Session;

/// Background poll loop tracking appends for one session.
pub struct LedgerWatcher {
    service: Arc<LedgerService>,
    session: Arc<Session>,
    poll_interval: Duration,
}

impl LedgerWatcher {
    /// Build a watcher for `session` using the service's configured poll
    /// interval.
    #[must_use]
    pub fn new(service: Arc<LedgerService>, session: Arc<Session>) -> Self {
        let poll_interval = Duration::from_millis(service.config().poll_interval_ms);
        Self {
            service,
            session,
            poll_interval,
        }
    }

    /// Spawn the poll loop. The task ends when the session closes.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        if self.session.is_closed() {
            debug!("[vl-02] session already closed, watcher not starting");
            return;
        }
        let provider = self.session.provider();
        let contract = *self.session.contract();
        let mut closed = self.session.closed();
        // Strictly after the snapshot block: everything at or before it is
        // already in the catalog.
        let mut from_block = self.service.snapshot_block().await + 1;
        let mut ticker = tokio::time::interval(self.poll_interval);

        info!(from_block, "[vl-02] append watcher started");
        loop {
            tokio::select! {
                changed = closed.changed() => {
                    if changed.is_err() || *closed.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    let filter = contract.video_added_filter(from_block, None);
                    match provider.get_logs(&filter).await {
                        Ok(logs) => {
                            for log in &logs {
                                match contract.decode_video_added(log) {
                                    Ok((video, block_number)) => {
                                        self.service.merge_video(video, block_number).await;
                                        from_block = from_block.max(block_number + 1);
                                    }
                                    Err(e) => {
                                        warn!(error = %e, "[vl-02] undecodable VideoAdded log");
                                    }
                                }
                            }
                        }
                        // Transient node trouble; the next tick retries.
                        Err(e) => warn!(error = %e, "[vl-02] append poll failed"),
                    }
                }
            }
        }
        info!("[vl-02] append watcher stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerConfig;
    use shared_bus::events::{ClientEvent, EventFilter, EventTopic};
    use shared_bus::publisher::InMemoryEventBus;
    use shared_evm::units::ether;
    use shared_types::entities::Address;
    use tokio::time::timeout;
    use vl_01_wallet_session::{
        DevChain, LocalWallet, NetworkRegistry, SessionConfig, SessionService,
    };

    struct Harness {
        chain: Arc<DevChain>,
        bus: Arc<InMemoryEventBus>,
        sessions: Arc<SessionService>,
        ledger: Arc<LedgerService>,
    }

    fn author() -> Address {
        Address::repeat_byte(0x21)
    }

    async fn harness() -> Harness {
        let chain = Arc::new(DevChain::new());
        let wallet = LocalWallet::random();
        chain.fund(wallet.address(), ether(10));
        let bus = Arc::new(InMemoryEventBus::new());
        let sessions = Arc::new(SessionService::new(
            SessionConfig::for_testing(),
            NetworkRegistry::bundled(),
            chain.clone(),
            Arc::new(wallet),
            bus.clone(),
        ));
        sessions.connect().await.unwrap();
        let ledger = Arc::new(LedgerService::new(
            LedgerConfig::for_testing(),
            sessions.clone(),
            bus.clone(),
        ));
        Harness {
            chain,
            bus,
            sessions,
            ledger,
        }
    }

    #[tokio::test]
    async fn test_watcher_merges_live_appends() {
        let h = harness().await;
        h.ledger.load_videos().await.unwrap();
        let mut sub = h
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::LedgerSync]));
        let session = h.sessions.current().await.unwrap();
        let handle = LedgerWatcher::new(h.ledger.clone(), session).spawn();

        let (appended, block) = h.chain.append_video("QmLive", "Live", author());
        match timeout(Duration::from_millis(500), sub.recv())
            .await
            .expect("timed out waiting for append")
            .expect("bus closed")
        {
            ClientEvent::VideoAppended {
                video,
                block_number,
            } => {
                assert_eq!(video, appended);
                assert_eq!(block_number, block);
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(h.ledger.video(appended.id).await.is_some());

        handle.abort();
    }

    #[tokio::test]
    async fn test_watcher_skips_snapshot_history() {
        let h = harness().await;
        h.chain.append_video("Qm1", "one", author());
        h.chain.append_video("Qm2", "two", author());
        h.ledger.load_videos().await.unwrap();

        let mut sub = h
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::LedgerSync]));
        let session = h.sessions.current().await.unwrap();
        let handle = LedgerWatcher::new(h.ledger.clone(), session).spawn();

        // Several poll rounds pass without re-announcing snapshot contents.
        assert!(timeout(Duration::from_millis(150), sub.recv()).await.is_err());
        assert_eq!(h.ledger.video_count().await, 2);

        handle.abort();
    }

    #[tokio::test]
    async fn test_watcher_stops_when_session_closes() {
        let h = harness().await;
        h.ledger.load_videos().await.unwrap();
        let session = h.sessions.current().await.unwrap();
        let handle = LedgerWatcher::new(h.ledger.clone(), session).spawn();

        h.sessions.disconnect().await;
        timeout(Duration::from_millis(500), handle)
            .await
            .expect("watcher did not stop")
            .unwrap();
    }

    #[tokio::test]
    async fn test_watcher_refuses_closed_session() {
        let h = harness().await;
        let session = h.sessions.current().await.unwrap();
        h.sessions.disconnect().await;

        let handle = LedgerWatcher::new(h.ledger.clone(), session).spawn();
        timeout(Duration::from_millis(100), handle)
            .await
            .expect("watcher should exit immediately")
            .unwrap();
    }

    #[tokio::test]
    async fn test_watcher_retries_after_poll_failure() {
        let h = harness().await;
        h.ledger.load_videos().await.unwrap();
        let session = h.sessions.current().await.unwrap();
        let handle = LedgerWatcher::new(h.ledger.clone(), session).spawn();

        h.chain.set_fail_calls(true);
        let (appended, _) = h.chain.append_video("QmRetry", "Retry", author());
        let mut sub = h
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::LedgerSync]));
        assert!(timeout(Duration::from_millis(100), sub.recv()).await.is_err());

        // Once the node recovers the same poll window picks the append up.
        h.chain.set_fail_calls(false);
        match timeout(Duration::from_millis(500), sub.recv())
            .await
            .expect("timed out waiting for recovery")
            .expect("bus closed")
        {
            ClientEvent::VideoAppended { video, .. } => assert_eq!(video.id, appended.id),
            other => panic!("unexpected event: {other:?}"),
        }

        handle.abort();
    }
}
