//! # Runtime Configuration
//!
//! Configuration for the vidledger CLI: an optional JSON file supplies the
//! base, `VL_*` environment variables override it. Each subsystem keeps
//! its own config type; this module only assembles them and carries the
//! one secret the CLI needs, the signing key.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use tracing::warn;
use vl_01_wallet_session::SessionConfig;
use vl_02_ledger_sync::LedgerConfig;
use vl_03_upload::UploadConfig;

/// The file-loadable part of the configuration. Sections may be omitted;
/// a present section must be complete.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Wallet session settings.
    pub session: SessionConfig,
    /// Catalog polling settings.
    pub ledger: LedgerConfig,
    /// Content store and transaction settings.
    pub upload: UploadConfig,
}

impl FileConfig {
    /// Parse a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))
    }
}

/// Everything the runtime needs to wire the subsystems.
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    /// Wallet session settings.
    pub session: SessionConfig,
    /// Catalog polling settings.
    pub ledger: LedgerConfig,
    /// Content store and transaction settings.
    pub upload: UploadConfig,
    /// Hex-encoded private key of the signing account. For a local
    /// Hardhat node, any of its printed dev account keys works.
    pub private_key: String,
    /// Whether an IPFS endpoint is configured. Without one, content is
    /// kept in an in-memory store and survives only as long as the
    /// process.
    pub use_ipfs: bool,
    /// Sign without the interactive confirmation prompt.
    pub auto_approve: bool,
}

impl RuntimeConfig {
    /// Load the configuration: the file named by `VL_CONFIG_FILE` (when
    /// set) as the base, then environment overrides.
    ///
    /// Recognized variables:
    /// - `VL_PRIVATE_KEY` (required) - hex key of the signing account
    /// - `VL_CONFIG_FILE` - JSON base configuration
    /// - `VL_RPC_URL` - JSON-RPC endpoint, default `http://127.0.0.1:8545`
    /// - `VL_NETWORKS_FILE` - deployment registry merged over the bundled networks
    /// - `VL_POLL_INTERVAL_MS` - catalog poll cadence
    /// - `VL_IPFS_API` - IPFS HTTP API endpoint; unset means in-memory storage
    /// - `VL_IPFS_PROJECT_ID` / `VL_IPFS_PROJECT_SECRET` - gateway credentials
    /// - `VL_IPFS_GATEWAY` - public gateway base for playback links
    /// - `VL_AUTO_APPROVE` - set to skip the signature confirmation prompt
    pub fn from_env() -> Result<Self> {
        let base = match env::var("VL_CONFIG_FILE") {
            Ok(path) => FileConfig::load(Path::new(&path))?,
            Err(_) => FileConfig::default(),
        };
        Self::resolve(base)
    }

    /// Apply the environment overrides to a base configuration.
    pub fn resolve(base: FileConfig) -> Result<Self> {
        let FileConfig {
            mut session,
            mut ledger,
            mut upload,
        } = base;

        if let Ok(url) = env::var("VL_RPC_URL") {
            session.rpc_url = url;
        }
        if let Ok(path) = env::var("VL_NETWORKS_FILE") {
            session.networks_file = Some(PathBuf::from(path));
        }

        if let Ok(interval) = env::var("VL_POLL_INTERVAL_MS") {
            match interval.parse() {
                Ok(ms) => ledger.poll_interval_ms = ms,
                Err(_) => warn!("VL_POLL_INTERVAL_MS must be an integer, ignoring"),
            }
        }

        // The file can point at an IPFS node too; the env var both
        // overrides the endpoint and opts in when the file did not.
        let mut use_ipfs = upload.ipfs_api_url != UploadConfig::default().ipfs_api_url;
        if let Ok(url) = env::var("VL_IPFS_API") {
            upload.ipfs_api_url = url;
            use_ipfs = true;
        }
        if let Ok(id) = env::var("VL_IPFS_PROJECT_ID") {
            upload.ipfs_project_id = Some(id);
        }
        if let Ok(secret) = env::var("VL_IPFS_PROJECT_SECRET") {
            upload.ipfs_project_secret = Some(secret);
        }
        if let Ok(gateway) = env::var("VL_IPFS_GATEWAY") {
            upload.gateway_base = gateway;
        }

        let private_key = env::var("VL_PRIVATE_KEY")
            .context("VL_PRIVATE_KEY must hold the hex private key of the signing account")?;
        let auto_approve = env::var("VL_AUTO_APPROVE").is_ok();

        Ok(Self {
            session,
            ledger,
            upload,
            private_key,
            use_ipfs,
            auto_approve,
        })
    }
}
