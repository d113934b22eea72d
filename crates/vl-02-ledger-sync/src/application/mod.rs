//! # Application Layer
//!
//! The ledger service plus the per-session append watcher.

pub mod service;
pub mod watcher;

pub use service::LedgerService;
pub use watcher::LedgerWatcher;
