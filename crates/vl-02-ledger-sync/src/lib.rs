//! # VL-02 Ledger Sync
//!
//! **Subsystem ID:** 2
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Keep an in-memory copy of the on-chain video catalog. A snapshot scan
//! reads every entry at one pinned block; after that a watcher polls for
//! `VideoAdded` logs and merges them in as they land. Confirmed uploads
//! from subsystem 3 arrive over the bus and merge through the same door,
//! so the chain event stays the single source of truth for what is in the
//! catalog.
//!
//! ## Data Flow
//!
//! ```text
//!                       ┌────────────────────┐
//!  load_videos() ──────►│                    │──► LedgerLoaded
//!  (pinned scan)        │    VideoLedger     │
//!                       │  (newest first,    │
//!  watcher poll ───────►│   one entry/id)    │──► VideoAppended
//!  UploadConfirmed ────►│                    │    (once per id)
//!                       └────────────────────┘
//! ```
//!
//! Both append paths go through one idempotent merge keyed by video id, so
//! a video reported by the watcher *and* by an upload confirmation is
//! announced exactly once.
//!
//! ## Module Structure
//!
//! ```text
//! vl-02-ledger-sync/
//! ├── domain/          # VideoLedger store, errors
//! ├── application/     # LedgerService + LedgerWatcher
//! └── config.rs        # LedgerConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod application;
pub mod config;
pub mod domain;

// Re-exports
pub use application::{LedgerService, LedgerWatcher};
pub use config::LedgerConfig;
pub use domain::{LedgerError, SnapshotInfo, VideoLedger, SUBSYSTEM_ID};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
