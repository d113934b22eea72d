//! # Content Identifiers
//!
//! CID derivation used by the in-process store and its mock. Real IPFS
//! nodes chunk large files and may assign a different hash to the same
//! bytes; the derivation here is only a stable, well-formed stand-in for
//! environments without a node.

use crate::domain::errors::StoreError;
use cid::Cid;
use multihash::Multihash;
use sha2::{Digest, Sha256};

/// Multicodec code for sha2-256.
const SHA2_256: u64 = 0x12;

/// CIDv0 (sha2-256, base58btc) of a byte buffer.
pub fn cid_for_bytes(bytes: &[u8]) -> Result<Cid, StoreError> {
    let digest = Sha256::digest(bytes);
    let multihash = Multihash::<64>::wrap(SHA2_256, &digest)
        .map_err(|e| StoreError::InvalidCid(e.to_string()))?;
    Cid::new_v0(multihash).map_err(|e| StoreError::InvalidCid(e.to_string()))
}
