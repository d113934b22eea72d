//! # Event Logs
//!
//! The log record a node returns from `eth_getLogs` and inside transaction
//! receipts, plus the filter shape used to query them.

use primitive_types::{H160, H256};
use serde::{Deserialize, Serialize};

/// A single event log emitted by a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    /// Contract that emitted the log.
    pub address: H160,
    /// Topic-0 plus any indexed arguments.
    pub topics: Vec<H256>,
    /// ABI-encoded non-indexed arguments.
    pub data: Vec<u8>,
    /// Block the log was emitted in.
    pub block_number: u64,
    /// Transaction that emitted the log.
    pub transaction_hash: H256,
    /// Position of the log within its block.
    pub log_index: u64,
}

/// Query shape for event logs.
///
/// `from_block` is inclusive; `to_block` of `None` means "up to latest".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFilter {
    /// Restrict to logs from this contract, if set.
    pub address: Option<H160>,
    /// Restrict to logs whose first topic equals this, if set.
    pub topic0: Option<H256>,
    /// First block to search, inclusive.
    pub from_block: u64,
    /// Last block to search, inclusive; `None` means latest.
    pub to_block: Option<u64>,
}

impl LogFilter {
    /// Whether a log satisfies every populated constraint.
    pub fn matches(&self, log: &Log) -> bool {
        if let Some(address) = self.address {
            if log.address != address {
                return false;
            }
        }
        if let Some(topic0) = self.topic0 {
            if log.topics.first() != Some(&topic0) {
                return false;
            }
        }
        if log.block_number < self.from_block {
            return false;
        }
        if let Some(to_block) = self.to_block {
            if log.block_number > to_block {
                return false;
            }
        }
        true
    }
}
