//! # In-Memory Content Store
//!
//! A content store backed by a map, for dev runs and tests. CIDs are
//! derived from the bytes, so repeated adds of the same content are
//! idempotent like on a real node.

use crate::domain::content::cid_for_bytes;
use crate::domain::errors::StoreError;
use crate::ports::outbound::ContentStore;
use async_trait::async_trait;
use cid::Cid;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// In-process content store.
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    blocks: RwLock<HashMap<Cid, Vec<u8>>>,
    fail_adds: AtomicBool,
}

impl MemoryContentStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes stored under a CID, if present.
    #[must_use]
    pub fn get(&self, cid: &Cid) -> Option<Vec<u8>> {
        self.blocks.read().get(cid).cloned()
    }

    /// Number of distinct blocks held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.read().len()
    }

    /// True when nothing has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.read().is_empty()
    }

    /// Make every add fail with an unreachable error.
    pub fn set_fail_adds(&self, fail: bool) {
        self.fail_adds.store(fail, Ordering::Relaxed);
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn add_bytes(&self, bytes: Vec<u8>) -> Result<Cid, StoreError> {
        if self.fail_adds.load(Ordering::Relaxed) {
            return Err(StoreError::Unreachable("Mock failure".to_string()));
        }
        let cid = cid_for_bytes(&bytes)?;
        debug!(%cid, len = bytes.len(), "[vl-03] block stored in memory");
        self.blocks.write().insert(cid, bytes);
        Ok(cid)
    }
}
