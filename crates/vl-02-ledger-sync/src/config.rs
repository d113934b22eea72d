//! # Ledger Sync Configuration
//!
//! Configuration for catalog scans and the append watcher.

use serde::{Deserialize, Serialize};

/// Ledger sync configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// How often the append watcher polls for new `VideoAdded` logs,
    /// in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 2_000,
        }
    }
}

impl LedgerConfig {
    /// Create a config for testing (fast polls).
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            poll_interval_ms: 25,
        }
    }
}
