//! # Shared EVM Crate
//!
//! ## Purpose
//!
//! Pure Ethereum wire primitives used by every subsystem that talks to the
//! chain: Keccak-256 hashing, a minimal contract ABI codec, EIP-1559
//! transaction encoding and decoding, ECDSA signing and sender recovery,
//! event log types, and wei formatting helpers.
//!
//! Nothing in this crate performs I/O. Providers live in the wallet
//! subsystem; this crate only turns values into bytes and back.
//!
//! ## Module Structure
//!
//! ```text
//! src/
//! ├── lib.rs          # Public API (this file)
//! ├── errors.rs       # Codec and crypto error types
//! ├── keccak.rs       # Keccak-256, function selectors, event topics
//! ├── abi.rs          # Solidity ABI encoding/decoding (uint256, address, string)
//! ├── ecdsa.rs        # secp256k1 signing and address recovery
//! ├── tx.rs           # EIP-1559 typed transactions (RLP)
//! ├── logs.rs         # Event logs and log filters
//! └── units.rs        # Wei/gwei/ether conversions
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod abi;
pub mod ecdsa;
pub mod errors;
pub mod keccak;
pub mod logs;
pub mod tx;
pub mod units;

pub use abi::{Param, Token};
pub use ecdsa::TxSignature;
pub use errors::{CodecError, CryptoError};
pub use keccak::{event_topic, keccak256, selector};
pub use logs::{Log, LogFilter};
pub use tx::{recover_sender, transaction_hash, TransactionReceipt, TypedTransaction};

/// Crate version, exposed for diagnostics.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
