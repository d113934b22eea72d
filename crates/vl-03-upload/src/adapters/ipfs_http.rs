//! # IPFS HTTP Store
//!
//! Content store adapter speaking the IPFS HTTP API (`/api/v0/add`).
//! Works against a local node or an authenticated pinning endpoint such as
//! an Infura project, which takes the project id and secret as HTTP basic
//! auth.

use crate::config::UploadConfig;
use crate::domain::errors::StoreError;
use crate::ports::outbound::ContentStore;
use async_trait::async_trait;
use cid::Cid;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

/// Response body of a successful `/api/v0/add`.
#[derive(Debug, Deserialize)]
struct AddResponse {
    #[serde(rename = "Hash")]
    hash: String,
}

/// Content store backed by an IPFS HTTP API endpoint.
#[derive(Debug, Clone)]
pub struct IpfsHttpStore {
    client: reqwest::Client,
    api_url: String,
    auth: Option<(String, String)>,
}

impl IpfsHttpStore {
    /// Build a store client for the configured endpoint.
    ///
    /// Credentials are attached only when both the project id and secret
    /// are present.
    pub fn new(config: &UploadConfig) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| StoreError::Unreachable(e.to_string()))?;
        let auth = match (&config.ipfs_project_id, &config.ipfs_project_secret) {
            (Some(id), Some(secret)) => Some((id.clone(), secret.clone())),
            _ => None,
        };
        Ok(Self {
            client,
            api_url: config.ipfs_api_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    /// Endpoint this store talks to.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// True when requests carry credentials.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.auth.is_some()
    }
}

#[async_trait]
impl ContentStore for IpfsHttpStore {
    async fn add_bytes(&self, bytes: Vec<u8>) -> Result<Cid, StoreError> {
        debug!(len = bytes.len(), "[vl-03] adding buffer to IPFS");
        let form = Form::new().part("file", Part::bytes(bytes).file_name("upload"));

        let mut request = self
            .client
            .post(format!("{}/api/v0/add", self.api_url))
            .multipart(form);
        if let Some((id, secret)) = &self.auth {
            request = request.basic_auth(id, Some(secret));
        }

        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Unreachable(e.to_string()))?;
        if !response.status().is_success() {
            return Err(StoreError::Rejected(format!(
                "add returned HTTP {}",
                response.status()
            )));
        }
        let body: AddResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Rejected(e.to_string()))?;

        let cid = Cid::try_from(body.hash.as_str())
            .map_err(|e| StoreError::InvalidCid(format!("{}: {e}", body.hash)))?;
        info!(%cid, "[vl-03] content pinned");
        Ok(cid)
    }
}
