//! # VidLedger Test Suite
//!
//! Cross-subsystem flows wired exactly as the `vidledger` binary wires
//! them, but over the in-process dev chain and the in-memory content
//! store instead of a live node and IPFS daemon.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # The wired test client and bus helpers
//! └── integration/
//!     ├── session_flows.rs   # Connect, refresh, teardown
//!     ├── ledger_flows.rs    # Snapshot scans, live appends, merges
//!     └── upload_flows.rs    # The two-phase submission end to end
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All flows
//! cargo test -p vl-tests
//!
//! # One area
//! cargo test -p vl-tests integration::upload_flows
//! ```

pub mod fixtures;
pub mod integration;
