//! # Client Events
//!
//! Defines all event types that flow through the shared bus. Subsystems
//! never call each other directly; these events are the only coupling
//! between the wallet session, ledger sync, and upload subsystems.

use serde::{Deserialize, Serialize};
use shared_types::entities::{Address, BlockNumber, SessionInfo, UploadPhase, Video, U256};
use shared_types::notifications::Notification;
use uuid::Uuid;

/// All events that can be published to the event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClientEvent {
    // =========================================================================
    // SUBSYSTEM 1: WALLET SESSION
    // =========================================================================
    /// A wallet session was established and the ledger contract bound.
    /// Source: Subsystem 1 | Target: All subsystems
    SessionEstablished(SessionInfo),

    /// The active session was torn down. Consumers must drop any provider
    /// handles they obtained from it.
    SessionClosed {
        /// Account the closed session belonged to.
        account: Address,
    },

    /// The connected account's balance was refreshed.
    /// `None` means the balance fetch failed; the session itself is fine.
    BalanceUpdated {
        /// Account the balance belongs to.
        account: Address,
        /// Balance in wei, or `None` when the fetch failed.
        balance_wei: Option<U256>,
    },

    /// A subsystem raised a user-facing notification.
    /// The runtime renders these; no subsystem prints to the terminal.
    NotificationRaised {
        /// Subsystem that raised the notification.
        source: u8,
        /// The notification itself.
        notification: Notification,
    },

    // =========================================================================
    // SUBSYSTEM 2: LEDGER SYNC
    // =========================================================================
    /// A full snapshot scan completed and replaced the in-memory ledger.
    LedgerLoaded {
        /// Number of videos in the snapshot.
        count: u64,
        /// Block the snapshot was pinned to.
        block_number: BlockNumber,
    },

    /// A video was merged into the in-memory ledger.
    /// Published once per id regardless of how many observers saw it land.
    VideoAppended {
        /// The merged video.
        video: Video,
        /// Block the video's transaction was mined in.
        block_number: BlockNumber,
    },

    // =========================================================================
    // SUBSYSTEM 3: UPLOAD
    // =========================================================================
    /// An upload submission moved to a new lifecycle phase.
    UploadPhaseChanged {
        /// The submission this applies to.
        submission_id: Uuid,
        /// The phase it entered.
        phase: UploadPhase,
    },

    /// An upload was confirmed on chain.
    /// **CHOREOGRAPHY:** Ledger Sync (2) consumes this and merges the video,
    /// so a confirmed upload appears in the ledger without waiting for the
    /// next watcher poll.
    /// Source: Subsystem 3 | Target: Subsystem 2
    UploadConfirmed {
        /// The submission that confirmed.
        submission_id: Uuid,
        /// The video as decoded from the on-chain event.
        video: Video,
        /// Block the upload transaction was mined in.
        block_number: BlockNumber,
    },

    /// An upload stopped before confirmation.
    UploadFailed {
        /// The submission that failed.
        submission_id: Uuid,
        /// Terminal error description.
        error: String,
    },

    // =========================================================================
    // CRITICAL EVENTS (DLQ)
    // =========================================================================
    /// Critical error requiring operator attention.
    CriticalError {
        /// The subsystem that encountered the error.
        subsystem_id: u8,
        /// Error description.
        error: String,
    },
}

impl ClientEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::SessionEstablished(_) | Self::SessionClosed { .. } | Self::BalanceUpdated { .. } => {
                EventTopic::WalletSession
            }
            Self::NotificationRaised { .. } => EventTopic::Notifications,
            Self::LedgerLoaded { .. } | Self::VideoAppended { .. } => EventTopic::LedgerSync,
            Self::UploadPhaseChanged { .. }
            | Self::UploadConfirmed { .. }
            | Self::UploadFailed { .. } => EventTopic::Upload,
            Self::CriticalError { .. } => EventTopic::DeadLetterQueue,
        }
    }

    /// Get the originating subsystem ID.
    #[must_use]
    pub fn source_subsystem(&self) -> u8 {
        match self {
            Self::SessionEstablished(_) | Self::SessionClosed { .. } | Self::BalanceUpdated { .. } => 1,
            Self::NotificationRaised { source, .. } => *source,
            Self::LedgerLoaded { .. } | Self::VideoAppended { .. } => 2,
            Self::UploadPhaseChanged { .. }
            | Self::UploadConfirmed { .. }
            | Self::UploadFailed { .. } => 3,
            Self::CriticalError { subsystem_id, .. } => *subsystem_id,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Subsystem 1 events (session lifecycle, balance).
    WalletSession,
    /// Subsystem 2 events (snapshot loads, merged videos).
    LedgerSync,
    /// Subsystem 3 events (upload lifecycle).
    Upload,
    /// User-facing notifications from any subsystem.
    Notifications,
    /// Dead Letter Queue for critical errors.
    DeadLetterQueue,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Source subsystems to include. Empty means all sources.
    pub source_subsystems: Vec<u8>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            source_subsystems: Vec::new(),
        }
    }

    /// Create a filter for events from specific subsystems.
    #[must_use]
    pub fn from_subsystems(subsystems: Vec<u8>) -> Self {
        Self {
            topics: Vec::new(),
            source_subsystems: subsystems,
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &ClientEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let source_match = self.source_subsystems.is_empty()
            || self.source_subsystems.contains(&event.source_subsystem());

        topic_match && source_match
    }
}
