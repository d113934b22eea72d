//! # Ledger Service
//!
//! Owns the in-memory video catalog. `load_videos` runs a block-pinned
//! snapshot scan; `merge_video` folds in single appends reported by the
//! watcher or by a confirmed upload. The catalog changes only through those
//! two doors, so every `VideoAppended` event corresponds to exactly one new
//! entry.

use crate::config::LedgerConfig;
use crate::domain::errors::LedgerError;
use crate::domain::store::{SnapshotInfo, VideoLedger};
use shared_bus::events::{ClientEvent, EventFilter, EventTopic};
use shared_bus::publisher::{EventPublisher, InMemoryEventBus};
use shared_types::entities::{BlockNumber, Video, VideoId};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use vl_01_wallet_session::SessionService;

/// Ledger sync service.
pub struct LedgerService {
    config: LedgerConfig,
    sessions: Arc<SessionService>,
    bus: Arc<InMemoryEventBus>,
    ledger: RwLock<VideoLedger>,
}

impl LedgerService {
    /// Create the service with an empty catalog.
    pub fn new(
        config: LedgerConfig,
        sessions: Arc<SessionService>,
        bus: Arc<InMemoryEventBus>,
    ) -> Self {
        Self {
            config,
            sessions,
            bus,
            ledger: RwLock::new(VideoLedger::new()),
        }
    }

    /// Sync configuration in effect.
    #[must_use]
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Scan the full catalog at a pinned block and install it.
    ///
    /// Every read targets the block observed at the start, so appends that
    /// land mid-scan do not show up until the next scan or the watcher
    /// reports them. Returns `Ok(None)` when no session is active. On any
    /// error the partial scan is discarded and the previous catalog stays
    /// in place.
    pub async fn load_videos(&self) -> Result<Option<SnapshotInfo>, LedgerError> {
        let Some(session) = self.sessions.current().await else {
            debug!("[vl-02] no session, skipping catalog scan");
            return Ok(None);
        };
        let provider = session.provider();
        let contract = *session.contract();

        let pin = provider.block_number().await?;
        let raw = provider
            .call(contract.address(), contract.video_count_call(), Some(pin))
            .await?;
        let count = contract.decode_video_count(&raw)?;
        debug!(count, block = pin, "[vl-02] scanning catalog");

        let mut videos = Vec::with_capacity(count as usize);
        for id in (1..=count).rev() {
            let raw = provider
                .call(contract.address(), contract.video_call(id), Some(pin))
                .await?;
            let video = contract.decode_video(&raw)?;
            if video.id == 0 {
                // Unassigned mapping slot; the counter can run ahead of
                // stored entries.
                debug!(id, "[vl-02] skipping unassigned catalog slot");
                continue;
            }
            videos.push(video);
        }

        let info = SnapshotInfo {
            count: videos.len() as u64,
            block_number: pin,
        };
        {
            let mut ledger = self.ledger.write().await;
            ledger.replace(videos, pin);
        }
        info!(
            count = info.count,
            block = pin,
            "[vl-02] catalog snapshot loaded"
        );
        self.bus
            .publish(ClientEvent::LedgerLoaded {
                count: info.count,
                block_number: pin,
            })
            .await;
        Ok(Some(info))
    }

    /// Merge one video into the catalog.
    ///
    /// Publishes `VideoAppended` only when the id was new; replays are
    /// dropped without a second announcement. Returns whether the video was
    /// inserted.
    pub async fn merge_video(&self, video: Video, block_number: BlockNumber) -> bool {
        let inserted = {
            let mut ledger = self.ledger.write().await;
            ledger.merge(video.clone())
        };
        if inserted {
            info!(
                id = video.id,
                block = block_number,
                "[vl-02] video appended to catalog"
            );
            self.bus
                .publish(ClientEvent::VideoAppended {
                    video,
                    block_number,
                })
                .await;
        } else {
            debug!(id = video.id, "[vl-02] append already in catalog");
        }
        inserted
    }

    /// Current catalog, newest first.
    pub async fn videos(&self) -> Vec<Video> {
        self.ledger.read().await.videos().to_vec()
    }

    /// Look up one video by id.
    pub async fn video(&self, id: VideoId) -> Option<Video> {
        self.ledger.read().await.get(id).cloned()
    }

    /// Number of videos in the catalog.
    pub async fn video_count(&self) -> usize {
        self.ledger.read().await.len()
    }

    /// Block the last snapshot was pinned to.
    pub async fn snapshot_block(&self) -> BlockNumber {
        self.ledger.read().await.snapshot_block()
    }

    /// Feed confirmed uploads straight into the catalog.
    ///
    /// Subscribes to upload events and merges every `UploadConfirmed` as it
    /// arrives, so the uploader's own catalog shows a confirmed video
    /// without waiting for the next watcher poll. The task runs until the
    /// bus closes.
    pub fn spawn_upload_feed(self: &Arc<Self>) -> JoinHandle<()> {
        let service = Arc::clone(self);
        let mut sub = service
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::Upload]));
        tokio::spawn(async move {
            while let Some(event) = sub.recv().await {
                if let ClientEvent::UploadConfirmed {
                    video,
                    block_number,
                    ..
                } = event
                {
                    service.merge_video(video, block_number).await;
                }
            }
            debug!("[vl-02] upload feed stopped, bus closed");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_bus::subscriber::Subscription;
    use shared_evm::units::ether;
    use shared_types::entities::Address;
    use std::time::Duration;
    use tokio::time::timeout;
    use uuid::Uuid;
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

    fn build() -> Harness {
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

    async fn harness() -> Harness {
        let h = build();
        h.sessions.connect().await.unwrap();
        h
    }

    async fn next_event(sub: &mut Subscription) -> ClientEvent {
        timeout(Duration::from_millis(100), sub.recv())
            .await
            .expect("timed out waiting for event")
            .expect("bus closed")
    }

    fn sample_video(id: u64) -> Video {
        Video {
            id,
            hash: format!("Qm{id}"),
            title: format!("video {id}"),
            author: author(),
        }
    }

    #[tokio::test]
    async fn test_load_without_session_returns_none() {
        let h = build();
        let mut sub = h.bus.subscribe(EventFilter::all());

        assert_eq!(h.ledger.load_videos().await.unwrap(), None);
        assert!(h.ledger.videos().await.is_empty());
        assert!(timeout(Duration::from_millis(50), sub.recv()).await.is_err());
    }

    #[tokio::test]
    async fn test_snapshot_scan_orders_newest_first() {
        let h = harness().await;
        h.chain.append_video("Qm1", "first", author());
        h.chain.append_video("Qm2", "second", author());
        let (_, last_block) = h.chain.append_video("Qm3", "third", author());

        let mut sub = h
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::LedgerSync]));
        let info = h.ledger.load_videos().await.unwrap().unwrap();
        assert_eq!(info.count, 3);
        assert_eq!(info.block_number, last_block);

        let videos = h.ledger.videos().await;
        let ids: Vec<_> = videos.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
        assert_eq!(videos[0].hash, "Qm3");

        match next_event(&mut sub).await {
            ClientEvent::LedgerLoaded {
                count,
                block_number,
            } => {
                assert_eq!(count, 3);
                assert_eq!(block_number, last_block);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_scan_excludes_appends_behind_the_pin() {
        let h = harness().await;
        h.chain.append_video("Qm1", "one", author());
        h.chain.queue_append("Qm2", "two", author());

        // The queued append lands during the scan, in a block past the pin.
        let info = h.ledger.load_videos().await.unwrap().unwrap();
        assert_eq!(info.count, 1);
        assert!(h.ledger.video(2).await.is_none());

        let info = h.ledger.load_videos().await.unwrap().unwrap();
        assert_eq!(info.count, 2);
        assert!(h.ledger.video(2).await.is_some());
    }

    #[tokio::test]
    async fn test_failed_scan_keeps_previous_catalog() {
        let h = harness().await;
        h.chain.append_video("Qm1", "one", author());
        h.chain.append_video("Qm2", "two", author());
        h.ledger.load_videos().await.unwrap();
        assert_eq!(h.ledger.video_count().await, 2);

        h.chain.append_video("Qm3", "three", author());
        h.chain.set_fail_calls(true);
        assert!(matches!(
            h.ledger.load_videos().await,
            Err(LedgerError::Rpc(_))
        ));

        let ids: Vec<_> = h.ledger.videos().await.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[tokio::test]
    async fn test_merge_announces_new_ids_once() {
        let h = harness().await;
        let mut sub = h
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::LedgerSync]));

        let video = sample_video(5);
        assert!(h.ledger.merge_video(video.clone(), 9).await);
        match next_event(&mut sub).await {
            ClientEvent::VideoAppended {
                video: got,
                block_number,
            } => {
                assert_eq!(got, video);
                assert_eq!(block_number, 9);
            }
            other => panic!("unexpected event: {other:?}"),
        }

        // Replaying the same id merges nothing and stays silent.
        assert!(!h.ledger.merge_video(video, 9).await);
        assert!(timeout(Duration::from_millis(50), sub.recv()).await.is_err());
        assert_eq!(h.ledger.video_count().await, 1);
    }

    #[tokio::test]
    async fn test_upload_feed_merges_confirmed_uploads() {
        let h = harness().await;
        let feed = h.ledger.spawn_upload_feed();
        let mut sub = h
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::LedgerSync]));

        let video = sample_video(7);
        let confirmation = ClientEvent::UploadConfirmed {
            submission_id: Uuid::new_v4(),
            video: video.clone(),
            block_number: 12,
        };
        h.bus.publish(confirmation.clone()).await;

        match timeout(Duration::from_millis(500), sub.recv())
            .await
            .expect("timed out waiting for merge")
            .expect("bus closed")
        {
            ClientEvent::VideoAppended {
                video: got,
                block_number,
            } => {
                assert_eq!(got, video);
                assert_eq!(block_number, 12);
            }
            other => panic!("unexpected event: {other:?}"),
        }

        // A replayed confirmation does not announce a second append.
        h.bus.publish(confirmation).await;
        assert!(timeout(Duration::from_millis(100), sub.recv()).await.is_err());
        assert_eq!(h.ledger.video_count().await, 1);

        feed.abort();
    }

    #[tokio::test]
    async fn test_snapshot_block_tracks_loads_not_merges() {
        let h = harness().await;
        h.chain.append_video("Qm1", "one", author());
        let info = h.ledger.load_videos().await.unwrap().unwrap();
        assert_eq!(h.ledger.snapshot_block().await, info.block_number);

        h.ledger.merge_video(sample_video(9), 40).await;
        assert_eq!(h.ledger.snapshot_block().await, info.block_number);
    }
}
