//! # Adapters Module
//!
//! Content store implementations: the IPFS HTTP client and an in-memory
//! store for dev runs.

pub mod ipfs_http;
pub mod memory_store;

pub use ipfs_http::IpfsHttpStore;
pub use memory_store::MemoryContentStore;
