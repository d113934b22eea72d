//! # EIP-1559 Typed Transactions
//!
//! Encoding, decoding, and signing of dynamic-fee (type 0x02) transactions.
//! The signing hash is `keccak256(0x02 || rlp(unsigned fields))`; the raw
//! wire form appends the signature's parity bit and scalars to the same
//! field list.

use crate::ecdsa::{self, TxSignature};
use crate::errors::{CodecError, CryptoError};
use crate::keccak::keccak256;
use crate::logs::Log;
use k256::ecdsa::SigningKey;
use primitive_types::{H160, H256, U256};
use rlp::{DecoderError, Rlp, RlpStream};
use serde::{Deserialize, Serialize};

/// EIP-2718 envelope byte for dynamic-fee transactions.
pub const EIP1559_TX_TYPE: u8 = 0x02;

/// Number of RLP fields in a signed dynamic-fee transaction.
const SIGNED_FIELD_COUNT: usize = 12;

/// An unsigned EIP-1559 transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedTransaction {
    /// EIP-155 chain id.
    pub chain_id: u64,
    /// Sender nonce.
    pub nonce: u64,
    /// Tip cap in wei per gas.
    pub max_priority_fee_per_gas: U256,
    /// Total fee cap in wei per gas.
    pub max_fee_per_gas: U256,
    /// Gas limit.
    pub gas_limit: u64,
    /// Recipient, or `None` for contract creation.
    pub to: Option<H160>,
    /// Value transferred in wei.
    pub value: U256,
    /// Call data.
    pub data: Vec<u8>,
}

impl TypedTransaction {
    /// The digest a wallet signs: `keccak256(0x02 || rlp(unsigned fields))`.
    pub fn signing_hash(&self) -> [u8; 32] {
        let mut stream = RlpStream::new_list(9);
        self.append_unsigned_fields(&mut stream);

        let mut payload = Vec::with_capacity(1 + stream.as_raw().len());
        payload.push(EIP1559_TX_TYPE);
        payload.extend_from_slice(stream.as_raw());
        keccak256(&payload)
    }

    /// Sign this transaction with a local key.
    pub fn sign(&self, key: &SigningKey) -> Result<TxSignature, CryptoError> {
        ecdsa::sign_hash(&self.signing_hash(), key)
    }

    /// Produce the raw wire bytes: `0x02 || rlp(fields || yParity || r || s)`.
    pub fn encode_signed(&self, signature: &TxSignature) -> Vec<u8> {
        let mut stream = RlpStream::new_list(SIGNED_FIELD_COUNT);
        self.append_unsigned_fields(&mut stream);
        stream.append(&signature.y_parity);
        stream.append(&signature.r);
        stream.append(&signature.s);

        let mut out = Vec::with_capacity(1 + stream.as_raw().len());
        out.push(EIP1559_TX_TYPE);
        out.extend_from_slice(stream.as_raw());
        out
    }

    /// Decode raw wire bytes back into the transaction and its signature.
    pub fn decode_signed(raw: &[u8]) -> Result<(Self, TxSignature), CodecError> {
        let (type_byte, payload) = raw.split_first().ok_or(CodecError::TooShort {
            expected: 1,
            actual: 0,
        })?;
        if *type_byte != EIP1559_TX_TYPE {
            return Err(CodecError::UnexpectedTxType(*type_byte));
        }

        let rlp = Rlp::new(payload);
        if !rlp.is_list() {
            return Err(CodecError::Rlp {
                field: "transaction",
                detail: "payload is not a list".to_string(),
            });
        }
        let item_count = rlp.item_count().map_err(|e| rlp_error("item count", e))?;
        if item_count != SIGNED_FIELD_COUNT {
            return Err(CodecError::FieldCount {
                expected: SIGNED_FIELD_COUNT,
                actual: item_count,
            });
        }

        // [chainId, nonce, maxPriorityFeePerGas, maxFeePerGas, gasLimit,
        //  to, value, data, accessList, yParity, r, s]
        let access_list = rlp.at(8).map_err(|e| rlp_error("access list", e))?;
        if !access_list.is_list() {
            return Err(CodecError::Rlp {
                field: "access list",
                detail: "expected a list".to_string(),
            });
        }

        let y_parity = decode_u64(&rlp, 9, "yParity")?;
        if y_parity > 1 {
            return Err(CodecError::ValueOverflow("yParity"));
        }

        let transaction = TypedTransaction {
            chain_id: decode_u64(&rlp, 0, "chainId")?,
            nonce: decode_u64(&rlp, 1, "nonce")?,
            max_priority_fee_per_gas: decode_u256(&rlp, 2, "maxPriorityFeePerGas")?,
            max_fee_per_gas: decode_u256(&rlp, 3, "maxFeePerGas")?,
            gas_limit: decode_u64(&rlp, 4, "gasLimit")?,
            to: decode_optional_address(&rlp, 5)?,
            value: decode_u256(&rlp, 6, "value")?,
            data: decode_bytes(&rlp, 7, "data")?,
        };
        let signature = TxSignature {
            y_parity: y_parity as u8,
            r: decode_u256(&rlp, 10, "r")?,
            s: decode_u256(&rlp, 11, "s")?,
        };

        Ok((transaction, signature))
    }

    fn append_unsigned_fields(&self, stream: &mut RlpStream) {
        stream.append(&self.chain_id);
        stream.append(&self.nonce);
        stream.append(&self.max_priority_fee_per_gas);
        stream.append(&self.max_fee_per_gas);
        stream.append(&self.gas_limit);
        match &self.to {
            Some(to) => {
                stream.append(to);
            }
            None => {
                stream.append_empty_data();
            }
        }
        stream.append(&self.value);
        stream.append(&self.data);
        // Access lists are never populated by this client.
        stream.begin_list(0);
    }
}

/// Recover the sender of a decoded transaction from its signature.
pub fn recover_sender(
    transaction: &TypedTransaction,
    signature: &TxSignature,
) -> Result<H160, CryptoError> {
    ecdsa::recover_signer(&transaction.signing_hash(), signature)
}

/// The transaction hash: Keccak-256 over the full raw bytes, type byte
/// included.
pub fn transaction_hash(raw: &[u8]) -> H256 {
    H256(keccak256(raw))
}

/// Outcome of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    /// Hash of the mined transaction.
    pub transaction_hash: H256,
    /// Block the transaction landed in.
    pub block_number: u64,
    /// True when execution succeeded, false when it reverted.
    pub status: bool,
    /// Logs emitted during execution.
    pub logs: Vec<Log>,
}

// Helper functions for RLP decoding

fn decode_u64(rlp: &Rlp, index: usize, field: &'static str) -> Result<u64, CodecError> {
    rlp.at(index)
        .and_then(|r| r.as_val())
        .map_err(|e| rlp_error(field, e))
}

fn decode_u256(rlp: &Rlp, index: usize, field: &'static str) -> Result<U256, CodecError> {
    rlp.at(index)
        .and_then(|r| r.as_val())
        .map_err(|e| rlp_error(field, e))
}

fn decode_bytes(rlp: &Rlp, index: usize, field: &'static str) -> Result<Vec<u8>, CodecError> {
    rlp.at(index)
        .and_then(|r| r.as_val::<Vec<u8>>())
        .map_err(|e| rlp_error(field, e))
}

fn decode_optional_address(rlp: &Rlp, index: usize) -> Result<Option<H160>, CodecError> {
    let bytes = decode_bytes(rlp, index, "to")?;
    if bytes.is_empty() {
        Ok(None)
    } else if bytes.len() == 20 {
        Ok(Some(H160::from_slice(&bytes)))
    } else {
        Err(CodecError::InvalidAddressLength(bytes.len()))
    }
}

fn rlp_error(field: &'static str, e: DecoderError) -> CodecError {
    CodecError::Rlp {
        field,
        detail: format!("{e:?}"),
    }
}
