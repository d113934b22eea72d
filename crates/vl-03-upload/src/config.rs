//! # Upload Configuration
//!
//! Configuration for the content store client and the submission flow.

use serde::{Deserialize, Serialize};

/// Upload subsystem configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UploadConfig {
    /// IPFS API endpoint used to add content (e.g. an Infura project URL).
    pub ipfs_api_url: String,

    /// Project id for authenticated IPFS endpoints.
    pub ipfs_project_id: Option<String>,

    /// Project secret paired with the id.
    pub ipfs_project_secret: Option<String>,

    /// Public gateway base used to build playback URLs.
    pub gateway_base: String,

    /// Per-request timeout for content store calls in seconds. Uploads can
    /// be large, so this is much longer than the RPC timeout.
    pub request_timeout_secs: u64,

    /// Gas limit for the `uploadVideo` transaction.
    pub gas_limit: u64,

    /// How often to poll for the transaction receipt, in milliseconds.
    pub receipt_poll_ms: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            ipfs_api_url: "http://127.0.0.1:5001".to_string(),
            ipfs_project_id: None,
            ipfs_project_secret: None,
            gateway_base: "https://ipfs.io/ipfs/".to_string(),
            request_timeout_secs: 60,
            gas_limit: 500_000,
            receipt_poll_ms: 500,
        }
    }
}

impl UploadConfig {
    /// Create a config for testing (fast receipt polls, short timeouts).
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            request_timeout_secs: 2,
            receipt_poll_ms: 10,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = UploadConfig::default();
        assert_eq!(config.ipfs_api_url, "http://127.0.0.1:5001");
        assert!(config.ipfs_project_id.is_none());
        assert_eq!(config.gas_limit, 500_000);
    }

    #[test]
    fn test_testing_config_polls_faster() {
        let config = UploadConfig::for_testing();
        assert!(config.receipt_poll_ms < UploadConfig::default().receipt_poll_ms);
    }
}
