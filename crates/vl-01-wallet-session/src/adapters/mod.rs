//! # Adapters Module
//!
//! Concrete implementations of the outbound ports: an HTTP JSON-RPC
//! provider, a local keypair wallet, and an in-process dev chain for tests.

pub mod dev_chain;
pub mod http_provider;
pub mod local_wallet;

pub use dev_chain::DevChain;
pub use http_provider::HttpProvider;
pub use local_wallet::{ApprovalPolicy, AutoApprove, LocalWallet};
