//! # Domain Errors
//!
//! Error types for the ledger sync subsystem.

use shared_evm::errors::CodecError;
use shared_types::errors::RpcError;
use thiserror::Error;

/// Ledger sync error types.
///
/// A scan that fails partway through returns one of these and the catalog
/// keeps its previous contents; partial snapshots are never installed.
#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    /// A chain read failed mid-scan.
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// Returned bytes did not decode as the expected ABI shape.
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
}
