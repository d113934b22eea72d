//! # Outbound Ports
//!
//! Trait for the content-addressed store that holds video bytes. Chain
//! access rides the session's provider handle and needs no port here.

use crate::domain::content::cid_for_bytes;
use crate::domain::errors::StoreError;
use async_trait::async_trait;
use cid::Cid;

/// Content-addressed byte store - outbound port.
///
/// Adding must be idempotent: the same bytes always yield the same CID, and
/// re-adding already-stored bytes is not an error.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Store a byte buffer, returning its content identifier.
    async fn add_bytes(&self, bytes: Vec<u8>) -> Result<Cid, StoreError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Mock content store for testing.
///
/// Returns real CIDs without retaining the bytes.
#[derive(Debug, Clone, Default)]
pub struct MockContentStore {
    /// Should return errors?
    pub should_fail: bool,
}

#[async_trait]
impl ContentStore for MockContentStore {
    async fn add_bytes(&self, bytes: Vec<u8>) -> Result<Cid, StoreError> {
        if self.should_fail {
            return Err(StoreError::Unreachable("Mock failure".to_string()));
        }
        cid_for_bytes(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_store_yields_stable_cids() {
        let store = MockContentStore::default();
        let a = store.add_bytes(b"clip".to_vec()).await.unwrap();
        let b = store.add_bytes(b"clip".to_vec()).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_mock_store_failure_mode() {
        let store = MockContentStore { should_fail: true };
        assert!(store.add_bytes(b"clip".to_vec()).await.is_err());
    }
}
