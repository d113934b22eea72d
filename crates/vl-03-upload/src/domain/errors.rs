//! # Domain Errors
//!
//! Error types for the upload subsystem.

use shared_types::entities::TxHash;
use shared_types::errors::RpcError;
use thiserror::Error;
use vl_01_wallet_session::SessionError;

/// Errors from a content store.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The store endpoint did not answer.
    #[error("Content store unreachable: {0}")]
    Unreachable(String),

    /// The store answered but refused the add.
    #[error("Content store rejected the add: {0}")]
    Rejected(String),

    /// The store returned something that does not parse as a CID.
    #[error("Content store returned an invalid CID: {0}")]
    InvalidCid(String),
}

/// Upload submission error types.
///
/// Every failed submission surfaces one of these and an `UploadFailed`
/// event carrying the same description.
#[derive(Debug, Clone, Error)]
pub enum UploadError {
    /// `submit` ran with no staged file bytes.
    #[error("No video data buffered for upload")]
    NoBuffer,

    /// The title was empty after trimming.
    #[error("Video title must not be empty")]
    EmptyTitle,

    /// The content hash was empty after trimming.
    #[error("Content hash must not be empty")]
    EmptyCid,

    /// Writing the bytes to the content store failed.
    #[error(transparent)]
    Storage(#[from] StoreError),

    /// No active session to read the account and contract binding from.
    #[error("No active session to upload through")]
    MissingDependencies,

    /// The wallet refused to sign the transaction.
    #[error("Wallet denied the transaction: {0}")]
    Denied(String),

    /// A node call failed.
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// The transaction was mined but reverted.
    #[error("Upload transaction {tx_hash} reverted on chain")]
    Reverted {
        /// Hash of the reverted transaction.
        tx_hash: TxHash,
    },

    /// The transaction succeeded but its receipt carries no decodable
    /// `VideoAdded` log, so there is nothing to confirm against.
    #[error("Transaction confirmed without a VideoAdded event")]
    MissingEvent,

    /// The session closed while the transaction was pending.
    #[error("Session closed before the upload confirmed")]
    SessionClosed,
}

impl From<SessionError> for UploadError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::NotConnected => Self::MissingDependencies,
            SessionError::Rpc(rpc) => Self::Rpc(rpc),
            other => Self::Denied(other.to_string()),
        }
    }
}
