//! # Core Domain Entities
//!
//! Defines the core ledger entities shared across subsystems.
//!
//! ## Clusters
//!
//! - **Ledger**: `Video`, `VideoId`, `BlockNumber`
//! - **Session**: `SessionInfo`, `ChainId`
//! - **Upload**: `UploadPhase`

use serde::{Deserialize, Serialize};

// Re-export EVM primitives for use across all subsystems
pub use primitive_types::{H160, H256, U256};

// =============================================================================
// CLUSTER A: THE LEDGER
// =============================================================================

/// A 20-byte Ethereum-style account address.
pub type Address = H160;

/// A 32-byte transaction or block hash.
pub type TxHash = H256;

/// The on-chain index of a video. The contract assigns these starting at 1.
pub type VideoId = u64;

/// A block height on the chain the ledger contract lives on.
pub type BlockNumber = u64;

/// A single entry in the on-chain video ledger.
///
/// Field order mirrors the contract's `videos(uint256)` getter so that a
/// decoded call result maps onto this struct positionally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    /// Ledger index assigned by the contract (1-based, dense).
    pub id: VideoId,
    /// Content identifier of the stored video (e.g. an IPFS CID).
    pub hash: String,
    /// Human-readable title supplied at upload time.
    pub title: String,
    /// Account that submitted the upload transaction.
    pub author: Address,
}

impl Video {
    /// Build the playback URL for this video against an HTTP gateway base.
    ///
    /// The base is used as-is; callers are expected to pass a base that ends
    /// where the content identifier should begin (typically `.../ipfs/`).
    pub fn gateway_url(&self, gateway_base: &str) -> String {
        format!("{}{}", gateway_base, self.hash)
    }
}

// =============================================================================
// CLUSTER B: THE SESSION
// =============================================================================

/// An EIP-155 chain identifier.
pub type ChainId = u64;

/// A snapshot of an established wallet session.
///
/// This is the read-only view other subsystems receive; the live session
/// object with provider and signer handles lives in the wallet subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    /// The connected account.
    pub account: Address,
    /// Chain the session is bound to.
    pub chain_id: ChainId,
    /// Display label for the network (e.g. "Hardhat").
    pub network_label: String,
    /// Ledger contract address resolved for this chain.
    pub contract_address: Address,
}

// =============================================================================
// CLUSTER C: THE UPLOAD
// =============================================================================

/// Lifecycle phase of an upload submission.
///
/// Phases advance strictly forward for a given submission; `Failed` and
/// `Confirmed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum UploadPhase {
    /// No submission in progress.
    #[default]
    Idle,
    /// File bytes are being read into memory.
    Buffering,
    /// Bytes are being written to the content store.
    Storing,
    /// Transaction is being built, signed, and broadcast.
    Submitting,
    /// Transaction broadcast; waiting for it to be mined.
    Pending,
    /// Ledger event observed; the upload is on chain.
    Confirmed,
    /// The submission stopped before confirmation.
    Failed,
}

impl UploadPhase {
    /// True while a submission is actively in flight.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            UploadPhase::Buffering
                | UploadPhase::Storing
                | UploadPhase::Submitting
                | UploadPhase::Pending
        )
    }

    /// True once the submission can no longer change phase.
    pub fn is_terminal(&self) -> bool {
        matches!(self, UploadPhase::Confirmed | UploadPhase::Failed)
    }
}

impl std::fmt::Display for UploadPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            UploadPhase::Idle => "idle",
            UploadPhase::Buffering => "buffering",
            UploadPhase::Storing => "storing",
            UploadPhase::Submitting => "submitting",
            UploadPhase::Pending => "pending",
            UploadPhase::Confirmed => "confirmed",
            UploadPhase::Failed => "failed",
        };
        write!(f, "{}", label)
    }
}
