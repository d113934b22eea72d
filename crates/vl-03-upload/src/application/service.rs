//! # Upload Service
//!
//! Runs the two-phase upload: bytes go to the content store first, then the
//! returned CID rides an `uploadVideo` transaction signed by the session's
//! wallet. Confirmation comes only from the `VideoAdded` event decoded out
//! of the mined receipt, never from local bookkeeping, so the service's
//! final word matches what the catalog will see.

use crate::config::UploadConfig;
use crate::domain::errors::UploadError;
use crate::domain::messages::{CODE_TRANSACTION_SENT, TRANSACTION_SENT};
use crate::domain::submission::Submission;
use crate::domain::SUBSYSTEM_ID;
use crate::ports::outbound::ContentStore;
use shared_bus::events::ClientEvent;
use shared_bus::publisher::{EventPublisher, InMemoryEventBus};
use shared_evm::tx::{TransactionReceipt, TypedTransaction};
use shared_evm::units::gwei;
use shared_types::entities::{TxHash, UploadPhase, Video, U256};
use shared_types::notifications::Notification;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;
use vl_01_wallet_session::{Session, SessionService};

/// Upload service.
pub struct UploadService {
    config: UploadConfig,
    sessions: Arc<SessionService>,
    store: Arc<dyn ContentStore>,
    bus: Arc<InMemoryEventBus>,
    buffer: RwLock<Option<Vec<u8>>>,
    current: RwLock<Option<Submission>>,
}

impl UploadService {
    /// Create the service with nothing staged.
    pub fn new(
        config: UploadConfig,
        sessions: Arc<SessionService>,
        store: Arc<dyn ContentStore>,
        bus: Arc<InMemoryEventBus>,
    ) -> Self {
        Self {
            config,
            sessions,
            store,
            bus,
            buffer: RwLock::new(None),
            current: RwLock::new(None),
        }
    }

    /// Upload configuration in effect.
    #[must_use]
    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Stage the raw bytes of the next upload, replacing any previous
    /// buffer.
    pub async fn buffer_video(&self, bytes: Vec<u8>) {
        debug!(len = bytes.len(), "[vl-03] video buffered");
        *self.buffer.write().await = Some(bytes);
    }

    /// Drop any staged bytes.
    pub async fn clear_buffer(&self) {
        *self.buffer.write().await = None;
    }

    /// Size of the staged buffer, if any.
    pub async fn buffered_len(&self) -> Option<usize> {
        self.buffer.read().await.as_ref().map(Vec::len)
    }

    /// Snapshot of the current or last submission.
    pub async fn submission(&self) -> Option<Submission> {
        self.current.read().await.clone()
    }

    /// Phase of the current or last submission.
    pub async fn phase(&self) -> UploadPhase {
        self.current
            .read()
            .await
            .as_ref()
            .map(|submission| submission.phase)
            .unwrap_or_default()
    }

    /// Store the staged buffer and submit it to the ledger under `title`.
    ///
    /// The buffer survives a failed attempt so the user can retry without
    /// picking the file again; it is cleared once the upload confirms.
    pub async fn submit(&self, title: &str) -> Result<Video, UploadError> {
        let id = self.begin(title).await;
        info!(%id, title, "[vl-03] upload submission started");
        let outcome = self.run_buffered(id, title).await;
        self.settle(id, outcome).await
    }

    /// Submit an already-stored content hash to the ledger under `title`,
    /// skipping the storing phase.
    pub async fn submit_hash(&self, hash: &str, title: &str) -> Result<Video, UploadError> {
        let id = self.begin(title).await;
        info!(%id, hash, title, "[vl-03] direct submission started");
        let outcome = self.run_direct(id, hash, title).await;
        self.settle(id, outcome).await
    }

    async fn begin(&self, title: &str) -> Uuid {
        let submission = Submission::new(title);
        let id = submission.id;
        *self.current.write().await = Some(submission);
        id
    }

    async fn run_buffered(&self, id: Uuid, title: &str) -> Result<Video, UploadError> {
        if title.trim().is_empty() {
            return Err(UploadError::EmptyTitle);
        }
        let bytes = self
            .buffer
            .read()
            .await
            .clone()
            .filter(|bytes| !bytes.is_empty())
            .ok_or(UploadError::NoBuffer)?;

        self.advance(id, UploadPhase::Storing).await;
        let cid = self.store.add_bytes(bytes).await?;
        let hash = cid.to_string();
        info!(%id, %cid, "[vl-03] content stored");
        self.update(id, |submission| submission.hash = Some(hash.clone()))
            .await;

        let video = self.broadcast_and_confirm(id, &hash, title).await?;
        // The content is referenced on chain now; the staged bytes are done.
        self.clear_buffer().await;
        Ok(video)
    }

    async fn run_direct(&self, id: Uuid, hash: &str, title: &str) -> Result<Video, UploadError> {
        if hash.trim().is_empty() {
            return Err(UploadError::EmptyCid);
        }
        if title.trim().is_empty() {
            return Err(UploadError::EmptyTitle);
        }
        self.update(id, |submission| submission.hash = Some(hash.to_string()))
            .await;
        self.broadcast_and_confirm(id, hash, title).await
    }

    /// Build, sign, broadcast, and wait out the upload transaction. The
    /// returned video is decoded from the receipt's own `VideoAdded` log.
    async fn broadcast_and_confirm(
        &self,
        id: Uuid,
        hash: &str,
        title: &str,
    ) -> Result<Video, UploadError> {
        let session = self
            .sessions
            .current()
            .await
            .filter(|session| !session.is_closed())
            .ok_or(UploadError::MissingDependencies)?;
        let provider = session.provider();
        let contract = *session.contract();
        let account = session.account();

        self.advance(id, UploadPhase::Submitting).await;

        let nonce = provider.transaction_count(account).await?;
        let fees = provider.fee_data().await?;
        // Dev nodes often report no quotes; fall back to workable defaults.
        let max_fee = fees.max_fee_per_gas.unwrap_or_else(|| gwei(10));
        let priority = fees.max_priority_fee_per_gas.unwrap_or_else(|| gwei(1));

        let tx = TypedTransaction {
            chain_id: session.chain_id(),
            nonce,
            max_priority_fee_per_gas: priority,
            max_fee_per_gas: max_fee,
            gas_limit: self.config.gas_limit,
            to: Some(contract.address()),
            value: U256::zero(),
            data: contract.upload_video_call(hash, title),
        };
        let raw = session.sign_transaction(&tx).await?;
        let tx_hash = provider.send_raw_transaction(raw).await?;
        info!(%id, tx = %tx_hash, "[vl-03] upload transaction broadcast");
        self.update(id, |submission| submission.tx_hash = Some(tx_hash))
            .await;
        self.notify(Notification::hint(CODE_TRANSACTION_SENT, TRANSACTION_SENT))
            .await;

        self.advance(id, UploadPhase::Pending).await;
        let receipt = self.wait_for_receipt(&session, tx_hash).await?;
        if !receipt.status {
            return Err(UploadError::Reverted { tx_hash });
        }
        let (video, block_number) = receipt
            .logs
            .iter()
            .find_map(|log| contract.decode_video_added(log).ok())
            .ok_or(UploadError::MissingEvent)?;

        self.update(id, |submission| submission.video = Some(video.clone()))
            .await;
        info!(
            %id,
            video_id = video.id,
            block = block_number,
            "[vl-03] upload confirmed"
        );
        self.advance(id, UploadPhase::Confirmed).await;
        self.bus
            .publish(ClientEvent::UploadConfirmed {
                submission_id: id,
                video: video.clone(),
                block_number,
            })
            .await;
        Ok(video)
    }

    /// Poll until the transaction is mined. There is no deadline; a pending
    /// transaction stays pending until the node answers or the session
    /// closes.
    async fn wait_for_receipt(
        &self,
        session: &Session,
        tx_hash: TxHash,
    ) -> Result<TransactionReceipt, UploadError> {
        let provider = session.provider();
        let mut closed = session.closed();
        let poll = Duration::from_millis(self.config.receipt_poll_ms);
        loop {
            if let Some(receipt) = provider.transaction_receipt(tx_hash).await? {
                return Ok(receipt);
            }
            tokio::select! {
                changed = closed.changed() => {
                    if changed.is_err() || *closed.borrow() {
                        return Err(UploadError::SessionClosed);
                    }
                }
                () = tokio::time::sleep(poll) => {}
            }
        }
    }

    async fn settle(
        &self,
        id: Uuid,
        outcome: Result<Video, UploadError>,
    ) -> Result<Video, UploadError> {
        if let Err(error) = &outcome {
            warn!(%id, error = %error, "[vl-03] upload failed");
            self.update(id, |submission| {
                submission.phase = UploadPhase::Failed;
                submission.error = Some(error.to_string());
            })
            .await;
            self.bus
                .publish(ClientEvent::UploadPhaseChanged {
                    submission_id: id,
                    phase: UploadPhase::Failed,
                })
                .await;
            self.bus
                .publish(ClientEvent::UploadFailed {
                    submission_id: id,
                    error: error.to_string(),
                })
                .await;
        }
        outcome
    }

    async fn advance(&self, id: Uuid, phase: UploadPhase) {
        self.update(id, |submission| submission.phase = phase).await;
        debug!(%id, %phase, "[vl-03] submission phase changed");
        self.bus
            .publish(ClientEvent::UploadPhaseChanged {
                submission_id: id,
                phase,
            })
            .await;
    }

    /// Apply a change to the tracked submission, if it is still the one
    /// this attempt created.
    async fn update<F: FnOnce(&mut Submission)>(&self, id: Uuid, apply: F) {
        let mut current = self.current.write().await;
        if let Some(submission) = current.as_mut().filter(|s| s.id == id) {
            apply(submission);
        }
    }

    async fn notify(&self, notification: Notification) {
        self.bus
            .publish(ClientEvent::NotificationRaised {
                source: SUBSYSTEM_ID,
                notification,
            })
            .await;
    }
}
