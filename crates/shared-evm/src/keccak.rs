//! # Keccak-256 Helpers
//!
//! Hashing, function selectors, and event topics. Selectors are the first
//! four bytes of the Keccak-256 of the canonical signature string; event
//! topics are the full 32-byte hash.

use primitive_types::H256;
use sha3::{Digest, Keccak256};

/// Keccak-256 of `data`.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Four-byte function selector for a canonical signature such as
/// `"uploadVideo(string,string)"`.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&hash[..4]);
    out
}

/// Topic-0 for a canonical event signature such as
/// `"VideoAdded(uint256,string,string,address)"`.
pub fn event_topic(signature: &str) -> H256 {
    H256(keccak256(signature.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keccak256_known_vectors() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
        assert_eq!(
            hex::encode(keccak256(b"abc")),
            "4e03657aea45a94fc7d47ba826c8d667c0d1e6e33a64a036ec44f58fa12d6c45"
        );
    }

    #[test]
    fn selector_is_topic_prefix() {
        let sig = "uploadVideo(string,string)";
        let sel = selector(sig);
        let topic = event_topic(sig);
        assert_eq!(sel, topic.as_bytes()[..4]);
    }

    #[test]
    fn distinct_signatures_give_distinct_selectors() {
        assert_ne!(selector("videoCount()"), selector("videos(uint256)"));
    }
}
