//! # Ledger Sync Domain
//!
//! Pure catalog state and its error types. All chain access lives in the
//! application layer; nothing here performs I/O.

pub mod errors;
pub mod store;

pub use errors::LedgerError;
pub use store::{SnapshotInfo, VideoLedger};

/// Subsystem identifier for ledger sync.
pub const SUBSYSTEM_ID: u8 = 2;
