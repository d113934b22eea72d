//! # VL-01 Wallet Session
//!
//! **Subsystem ID:** 1
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Own the lifecycle of the wallet connection: request accounts from a
//! wallet, resolve the connected chain against the network registry, bind
//! the ledger contract for that chain, and hand out an explicit [`Session`]
//! object other subsystems read from. Everything that talks to the chain
//! goes through the [`ChainProvider`] port defined here.
//!
//! ## Session Lifecycle
//!
//! ```text
//! connect()                       disconnect()
//!    │                                │
//!    ▼                                ▼
//! accounts ──► chain id ──► registry ──► Session { provider, wallet,
//!                │                                 contract, info }
//!                └─ unknown chain ──► notification + no session
//! ```
//!
//! A `Session` is immutable once established; reconnecting builds a new one
//! and closes the old. Teardown is signalled through a watch channel so
//! long-running consumers (the ledger watcher, pending uploads) observe it
//! without polling the service.
//!
//! ## Module Structure
//!
//! ```text
//! vl-01-wallet-session/
//! ├── domain/          # FeeData, NetworkRegistry, LedgerContract, errors
//! ├── ports/           # ChainProvider + WalletConnector traits, mocks
//! ├── adapters/        # HTTP JSON-RPC provider, local key wallet, dev chain
//! ├── application/     # SessionService + Session handle
//! └── config.rs        # SessionConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{ApprovalPolicy, AutoApprove, DevChain, HttpProvider, LocalWallet};
pub use application::{Session, SessionService};
pub use config::SessionConfig;
pub use domain::{
    FeeData, LedgerContract, NetworkInfo, NetworkRegistry, SessionError, SUBSYSTEM_ID,
};
pub use ports::{ChainProvider, MockChainProvider, MockWallet, WalletConnector};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
