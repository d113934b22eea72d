//! # Domain Entities
//!
//! Value types owned by the wallet session subsystem.

use serde::{Deserialize, Serialize};
use shared_types::entities::{Address, ChainId, U256};

/// Fee quotes reported by a node.
///
/// Either field may be absent: dev nodes and older endpoints do not
/// implement every fee method. Consumers apply their own fallbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeeData {
    /// Suggested total fee cap in wei per gas.
    pub max_fee_per_gas: Option<U256>,
    /// Suggested priority tip in wei per gas.
    pub max_priority_fee_per_gas: Option<U256>,
}

/// One known network: its label, default RPC endpoint, and (when deployed)
/// the ledger contract address on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInfo {
    /// EIP-155 chain id.
    pub chain_id: ChainId,
    /// Display label (e.g. "Hardhat").
    pub label: String,
    /// Default JSON-RPC endpoint for this network.
    pub rpc_url: String,
    /// Ledger contract address, or `None` while not deployed there.
    pub contract_address: Option<Address>,
}
