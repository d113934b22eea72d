//! # Client Runtime Library
//!
//! Wiring for the vidledger CLI. The binary in `main.rs` parses the
//! command line; this library builds the subsystem graph it drives.
//!
//! ## Runtime Graph
//!
//! ```text
//!                    +----------------- event bus -----------------+
//!                    |                    |                        |
//!              SessionService       LedgerService            UploadService
//!              (vl-01)              (vl-02)                  (vl-03)
//!                    |                    |                        |
//!              HttpProvider         LedgerWatcher            ContentStore
//!              LocalWallet          upload feed              (IPFS or memory)
//! ```
//!
//! All cross-subsystem traffic rides the bus: the watcher and upload feed
//! keep the catalog current, and the notification funnel folds every
//! subsystem's notices into one log for the status view.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod runtime;

pub use config::{FileConfig, RuntimeConfig};
pub use runtime::ClientRuntime;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
