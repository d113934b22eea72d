//! # ECDSA Signing and Recovery (secp256k1)
//!
//! Pure signing and sender-recovery logic over 32-byte digests. Signatures
//! are kept in low-s form so they stay valid under EIP-2.

use crate::errors::CryptoError;
use crate::keccak::keccak256;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use primitive_types::{H160, U256};

/// An EIP-1559 transaction signature: the parity bit plus the r and s scalars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxSignature {
    /// Recovery parity bit (0 or 1).
    pub y_parity: u8,
    /// ECDSA r scalar.
    pub r: U256,
    /// ECDSA s scalar, always in the lower half of the curve order.
    pub s: U256,
}

/// Parse a hex-encoded private key ("0x"-prefixed or bare) into a signing key.
pub fn signing_key_from_hex(hex_key: &str) -> Result<SigningKey, CryptoError> {
    let trimmed = hex_key.trim().trim_start_matches("0x");
    let bytes = hex::decode(trimmed).map_err(|_| CryptoError::InvalidPrivateKey)?;
    SigningKey::from_slice(&bytes).map_err(|_| CryptoError::InvalidPrivateKey)
}

/// Ethereum address of a public key: last 20 bytes of the Keccak-256 of the
/// uncompressed point without its 0x04 prefix.
pub fn address_from_verifying_key(key: &VerifyingKey) -> H160 {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    H160::from_slice(&hash[12..])
}

/// Sign a 32-byte digest, producing a recoverable low-s signature.
pub fn sign_hash(digest: &[u8; 32], key: &SigningKey) -> Result<TxSignature, CryptoError> {
    let (signature, recovery_id) = key
        .sign_prehash_recoverable(digest)
        .map_err(|_| CryptoError::SigningFailed)?;

    // Recovery requires low-s; flip the parity bit if normalization changed s.
    let (signature, recovery_id) = match signature.normalize_s() {
        Some(normalized) => {
            let flipped = RecoveryId::from_byte(recovery_id.to_byte() ^ 1)
                .ok_or(CryptoError::InvalidRecoveryId(recovery_id.to_byte()))?;
            (normalized, flipped)
        }
        None => (signature, recovery_id),
    };

    let bytes = signature.to_bytes();
    Ok(TxSignature {
        y_parity: recovery_id.to_byte(),
        r: U256::from_big_endian(&bytes[..32]),
        s: U256::from_big_endian(&bytes[32..]),
    })
}

/// Recover the signer address from a digest and its signature.
pub fn recover_signer(digest: &[u8; 32], signature: &TxSignature) -> Result<H160, CryptoError> {
    if signature.y_parity > 1 {
        return Err(CryptoError::InvalidRecoveryId(signature.y_parity));
    }

    let mut sig_bytes = [0u8; 64];
    signature.r.to_big_endian(&mut sig_bytes[..32]);
    signature.s.to_big_endian(&mut sig_bytes[32..]);

    let sig = Signature::from_slice(&sig_bytes).map_err(|_| CryptoError::InvalidSignature)?;
    let recovery_id = RecoveryId::from_byte(signature.y_parity)
        .ok_or(CryptoError::InvalidRecoveryId(signature.y_parity))?;

    let key = VerifyingKey::recover_from_prehash(digest, &sig, recovery_id)
        .map_err(|_| CryptoError::RecoveryFailed)?;
    Ok(address_from_verifying_key(&key))
}
