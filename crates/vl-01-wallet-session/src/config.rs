//! # Session Configuration
//!
//! Configuration for the wallet session service.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Wallet session configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    /// JSON-RPC endpoint of the node to connect to.
    pub rpc_url: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// TCP connect timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Optional deployment registry file merged over the bundled networks.
    /// Same shape the deploy script writes: chain id mapped to address.
    pub networks_file: Option<PathBuf>,

    /// Fetch the account balance right after connecting.
    pub refresh_balance_on_connect: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8545".to_string(),
            request_timeout_secs: 30,
            connect_timeout_secs: 5,
            networks_file: None,
            refresh_balance_on_connect: true,
        }
    }
}

impl SessionConfig {
    /// Create a config for testing (no balance refresh, short timeouts).
    pub fn for_testing() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8545".to_string(),
            request_timeout_secs: 2,
            connect_timeout_secs: 1,
            networks_file: None,
            refresh_balance_on_connect: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.rpc_url, "http://127.0.0.1:8545");
        assert!(config.refresh_balance_on_connect);
        assert!(config.networks_file.is_none());
    }

    #[test]
    fn test_testing_config() {
        let config = SessionConfig::for_testing();
        assert!(!config.refresh_balance_on_connect);
        assert_eq!(config.connect_timeout_secs, 1);
    }
}
