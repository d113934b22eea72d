//! # Domain Errors
//!
//! Error types for the wallet session subsystem.

use shared_evm::errors::{CodecError, CryptoError};
use shared_types::entities::ChainId;
use shared_types::errors::RpcError;
use thiserror::Error;

/// Wallet session error types.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// The wallet exposed no accounts.
    #[error("Wallet returned no accounts")]
    NoAccounts,

    /// The wallet refused the connection request.
    #[error("Wallet connection rejected: {0}")]
    ConnectionRejected(String),

    /// The wallet refused to sign a transaction.
    #[error("Transaction approval denied")]
    ApprovalDenied,

    /// The connected chain is not in the network registry.
    #[error("Network {chain_id} is not supported")]
    UnsupportedNetwork {
        /// Chain id the node reported.
        chain_id: ChainId,
    },

    /// The chain is known but the ledger contract has no address there.
    #[error("Ledger contract is not deployed on chain {chain_id}")]
    ContractNotDeployed {
        /// Chain id the node reported.
        chain_id: ChainId,
    },

    /// An operation that needs a session ran without one.
    #[error("No active session")]
    NotConnected,

    /// The deployment registry file could not be read or parsed.
    #[error("Invalid network registry: {0}")]
    InvalidRegistry(String),

    /// The node reported an error or was unreachable.
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// A response or calldata payload failed to decode.
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// A key or signature operation failed.
    #[error("Key error: {0}")]
    Crypto(#[from] CryptoError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_network_error() {
        let err = SessionError::UnsupportedNetwork { chain_id: 59144 };
        assert!(err.to_string().contains("59144"));
    }

    #[test]
    fn test_rpc_error_is_transparent() {
        let err = SessionError::from(RpcError::Transport("connection refused".to_string()));
        assert_eq!(err.to_string(), "Transport error: connection refused");
    }

    #[test]
    fn test_not_connected_error() {
        let err = SessionError::NotConnected;
        assert!(err.to_string().contains("No active session"));
    }
}
