//! # Error Types
//!
//! Defines error types used across subsystems.

use thiserror::Error;

/// Errors surfaced by a chain provider.
///
/// Every subsystem that talks to the chain does so through a provider port,
/// so this is the one error type all of them share.
#[derive(Debug, Clone, Error)]
pub enum RpcError {
    /// The request never produced a response (connection refused, timeout,
    /// DNS failure).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The node answered with a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Api { code: i64, message: String },

    /// The response arrived but could not be decoded into the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The node does not implement the requested method.
    #[error("Method not supported: {0}")]
    MethodNotFound(String),
}

impl RpcError {
    /// True when retrying the same request against the same node is pointless.
    pub fn is_permanent(&self) -> bool {
        matches!(self, RpcError::MethodNotFound(_) | RpcError::Decode(_))
    }
}
