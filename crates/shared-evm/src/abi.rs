//! # Contract ABI Codec
//!
//! A minimal Solidity ABI codec covering the types the ledger contract
//! actually uses: `uint256`, `address`, and `string`. Static values occupy
//! one 32-byte head word; strings put an offset in the head and their
//! length-prefixed, zero-padded bytes in the tail.

use crate::errors::CodecError;
use primitive_types::{H160, U256};

/// A single ABI value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `uint256`
    Uint(U256),
    /// `address`
    Address(H160),
    /// `string`
    Str(String),
}

impl Token {
    /// The value as a `uint256`, if it is one.
    pub fn as_uint(&self) -> Option<U256> {
        match self {
            Token::Uint(v) => Some(*v),
            _ => None,
        }
    }

    /// The value as an address, if it is one.
    pub fn as_address(&self) -> Option<H160> {
        match self {
            Token::Address(a) => Some(*a),
            _ => None,
        }
    }

    /// The value as a string slice, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Token::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// The schema of one ABI parameter, used to drive decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    /// `uint256`
    Uint,
    /// `address`
    Address,
    /// `string`
    Str,
}

/// Encode a function call: selector followed by the encoded arguments.
pub fn encode_call(selector: [u8; 4], args: &[Token]) -> Vec<u8> {
    let body = encode_tokens(args);
    let mut out = Vec::with_capacity(4 + body.len());
    out.extend_from_slice(&selector);
    out.extend_from_slice(&body);
    out
}

/// Encode a token sequence without a selector.
///
/// This is the layout of non-indexed event data and of function return
/// values, so the same routine serves both.
pub fn encode_tokens(args: &[Token]) -> Vec<u8> {
    let head_len = 32 * args.len();
    let mut head = Vec::with_capacity(head_len);
    let mut tail: Vec<u8> = Vec::new();

    for arg in args {
        match arg {
            Token::Uint(value) => head.extend_from_slice(&uint_word(*value)),
            Token::Address(address) => head.extend_from_slice(&address_word(*address)),
            Token::Str(text) => {
                head.extend_from_slice(&uint_word(U256::from(head_len + tail.len())));
                tail.extend_from_slice(&uint_word(U256::from(text.len())));
                tail.extend_from_slice(text.as_bytes());
                let padding = (32 - text.len() % 32) % 32;
                tail.resize(tail.len() + padding, 0);
            }
        }
    }

    head.extend_from_slice(&tail);
    head
}

/// Decode an ABI payload (no selector) against a parameter schema.
///
/// The returned tokens are in schema order and each matches its `Param`
/// variant, so callers can pattern-match the result positionally.
pub fn decode(data: &[u8], schema: &[Param]) -> Result<Vec<Token>, CodecError> {
    let mut tokens = Vec::with_capacity(schema.len());

    for (index, param) in schema.iter().enumerate() {
        let word = word_at(data, index * 32)?;
        match param {
            Param::Uint => tokens.push(Token::Uint(U256::from_big_endian(word))),
            Param::Address => tokens.push(Token::Address(H160::from_slice(&word[12..]))),
            Param::Str => {
                let offset = to_usize(U256::from_big_endian(word), "string offset")?;
                let length_word = word_at(data, offset)?;
                let length = to_usize(U256::from_big_endian(length_word), "string length")?;
                let start = offset + 32;
                let end = start
                    .checked_add(length)
                    .ok_or(CodecError::ValueOverflow("string length"))?;
                if end > data.len() {
                    return Err(CodecError::OffsetOutOfRange {
                        offset: end,
                        len: data.len(),
                    });
                }
                let text = std::str::from_utf8(&data[start..end])
                    .map_err(|_| CodecError::InvalidUtf8(start))?;
                tokens.push(Token::Str(text.to_string()));
            }
        }
    }

    Ok(tokens)
}

/// Strip a 4-byte selector from calldata, checking it matches.
pub fn strip_selector(calldata: &[u8], expected: [u8; 4]) -> Result<&[u8], CodecError> {
    if calldata.len() < 4 {
        return Err(CodecError::TooShort {
            expected: 4,
            actual: calldata.len(),
        });
    }
    if calldata[..4] != expected {
        return Err(CodecError::SelectorMismatch {
            expected: hex::encode(expected),
            actual: hex::encode(&calldata[..4]),
        });
    }
    Ok(&calldata[4..])
}

fn uint_word(value: U256) -> [u8; 32] {
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    word
}

fn address_word(address: H160) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_bytes());
    word
}

fn word_at(data: &[u8], offset: usize) -> Result<&[u8], CodecError> {
    let end = offset
        .checked_add(32)
        .ok_or(CodecError::ValueOverflow("word offset"))?;
    if end > data.len() {
        return Err(CodecError::OffsetOutOfRange {
            offset,
            len: data.len(),
        });
    }
    Ok(&data[offset..end])
}

fn to_usize(value: U256, what: &'static str) -> Result<usize, CodecError> {
    if value > U256::from(u32::MAX) {
        return Err(CodecError::ValueOverflow(what));
    }
    Ok(value.as_u32() as usize)
}
