//! # Error Types
//!
//! Errors produced while encoding or decoding wire data, and while signing
//! or recovering signatures.

use thiserror::Error;

/// Errors from the ABI and RLP codecs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Input ended before the expected number of bytes.
    #[error("Input too short: need {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },

    /// A dynamic-type offset or length points outside the payload.
    #[error("Offset {offset} out of range for payload of {len} bytes")]
    OffsetOutOfRange { offset: usize, len: usize },

    /// A decoded string was not valid UTF-8.
    #[error("Invalid UTF-8 in string at byte {0}")]
    InvalidUtf8(usize),

    /// An RLP list had the wrong number of items.
    #[error("Expected {expected} RLP fields, got {actual}")]
    FieldCount { expected: usize, actual: usize },

    /// The transaction envelope byte was not a supported type.
    #[error("Unsupported transaction type: 0x{0:02x}")]
    UnexpectedTxType(u8),

    /// A numeric value does not fit the target type.
    #[error("Value overflow decoding {0}")]
    ValueOverflow(&'static str),

    /// An address field was not empty or 20 bytes.
    #[error("Invalid address length: {0} bytes")]
    InvalidAddressLength(usize),

    /// A log's topic-0 does not identify the expected event.
    #[error("Log topic does not match {0}")]
    TopicMismatch(&'static str),

    /// Calldata starts with a different function selector.
    #[error("Selector mismatch: expected {expected}, got {actual}")]
    SelectorMismatch { expected: String, actual: String },

    /// Underlying RLP decoder error.
    #[error("RLP decode error for {field}: {detail}")]
    Rlp { field: &'static str, detail: String },
}

/// Errors from ECDSA signing and recovery.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// The private key bytes were not a valid secp256k1 scalar.
    #[error("Invalid private key")]
    InvalidPrivateKey,

    /// The r/s pair did not form a valid signature.
    #[error("Invalid signature format")]
    InvalidSignature,

    /// The recovery id was outside {0, 1}.
    #[error("Invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    /// Public key recovery did not yield a valid point.
    #[error("Signature recovery failed")]
    RecoveryFailed,

    /// Signing the digest failed.
    #[error("Signing failed")]
    SigningFailed,
}
