//! # VL-03 Upload
//!
//! **Subsystem ID: 3**
//!
//! ## Purpose
//! Takes a video from raw bytes to a confirmed catalog entry in two
//! phases. Phase one hands the bytes to a content store and gets back a
//! CID. Phase two wraps that CID and a title in an `uploadVideo`
//! transaction, signed through the active wallet session, and waits for
//! the mined receipt. The upload counts as done only when the receipt
//! carries a decodable `VideoAdded` event; the video handed back to the
//! caller is the one the chain announced, not a local reconstruction.
//!
//! ## Submission Flow
//!
//! ```text
//!   buffer_video(bytes)          submit(title)
//!         |                           |
//!         v                           v
//!   [staged buffer] ----------> ContentStore::add_bytes --> CID
//!                                     |
//!                                     v
//!                           sign + broadcast uploadVideo
//!                                     |
//!                                     v
//!                           poll receipt (Pending)
//!                                     |
//!                     +---------------+---------------+
//!                     v                               v
//!             VideoAdded decoded                revert / no event
//!                     |                               |
//!                     v                               v
//!          UploadConfirmed (bus)              UploadFailed (bus)
//! ```
//!
//! Every phase change is published on the event bus, so interfaces can
//! render progress without polling the service.
//!
//! ## Module Structure
//! - `domain/` - Submission tracking, content addressing, errors
//! - `ports/` - The content store trait and its mock
//! - `adapters/` - IPFS HTTP API client and an in-memory store
//! - `application/` - The two-phase upload service
//! - `config` - Store endpoints, gas limit, polling cadence

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{IpfsHttpStore, MemoryContentStore};
pub use application::UploadService;
pub use config::UploadConfig;
pub use domain::{StoreError, Submission, UploadError, SUBSYSTEM_ID};
pub use ports::{ContentStore, MockContentStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
