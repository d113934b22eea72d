//! # Network Registry
//!
//! Maps chain ids to known networks and the ledger contract deployed on
//! them. The bundled table covers the dev chain and Sepolia; a deployment
//! file in the deploy script's shape can be merged over it.

use crate::domain::entities::NetworkInfo;
use crate::domain::errors::SessionError;
use serde::Deserialize;
use shared_types::entities::{Address, ChainId};
use std::collections::HashMap;

/// Chain id of the local Hardhat/Anvil dev chain.
pub const DEV_CHAIN_ID: ChainId = 31337;

/// Chain id of the Sepolia testnet.
pub const SEPOLIA_CHAIN_ID: ChainId = 11_155_111;

/// Address a dev node assigns to the first contract deployed from the
/// first prefunded account.
pub const DEV_CONTRACT_ADDRESS: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

/// One entry of the deployment file: `{ "<chain id>": { "address": "0x..." } }`.
#[derive(Debug, Deserialize)]
struct DeployedContract {
    address: String,
}

/// Registry of known networks keyed by chain id.
#[derive(Debug, Clone, Default)]
pub struct NetworkRegistry {
    networks: HashMap<ChainId, NetworkInfo>,
}

impl NetworkRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry shipped with the client: the local dev chain with the
    /// deterministic first-deploy address, and Sepolia awaiting a
    /// deployment file.
    #[must_use]
    pub fn bundled() -> Self {
        let mut registry = Self::new();
        registry.insert(NetworkInfo {
            chain_id: DEV_CHAIN_ID,
            label: "Hardhat".to_string(),
            rpc_url: "http://127.0.0.1:8545".to_string(),
            contract_address: parse_address(DEV_CONTRACT_ADDRESS).ok(),
        });
        registry.insert(NetworkInfo {
            chain_id: SEPOLIA_CHAIN_ID,
            label: "Sepolia".to_string(),
            rpc_url: "https://rpc.sepolia.org".to_string(),
            contract_address: None,
        });
        registry
    }

    /// Add or replace a network.
    pub fn insert(&mut self, info: NetworkInfo) {
        self.networks.insert(info.chain_id, info);
    }

    /// Look up a network by chain id.
    #[must_use]
    pub fn get(&self, chain_id: ChainId) -> Option<&NetworkInfo> {
        self.networks.get(&chain_id)
    }

    /// Number of known networks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.networks.len()
    }

    /// True when no networks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }

    /// Resolve the ledger contract address for a chain.
    pub fn resolve_contract(&self, chain_id: ChainId) -> Result<Address, SessionError> {
        let info = self
            .get(chain_id)
            .ok_or(SessionError::UnsupportedNetwork { chain_id })?;
        info.contract_address
            .ok_or(SessionError::ContractNotDeployed { chain_id })
    }

    /// Merge a deployment file over the registry.
    ///
    /// The file is what the deploy script writes: a map from chain id to
    /// `{ "address": ... }`. Known chains get their contract address
    /// updated; unknown chains are added with a generated label so a fresh
    /// deployment is usable without editing the bundled table.
    ///
    /// Returns the number of entries merged.
    pub fn merge_from_json(&mut self, json: &str) -> Result<usize, SessionError> {
        let deployments: HashMap<String, DeployedContract> =
            serde_json::from_str(json).map_err(|e| SessionError::InvalidRegistry(e.to_string()))?;

        let mut merged = 0;
        for (chain_key, deployment) in deployments {
            let chain_id: ChainId = chain_key
                .parse()
                .map_err(|_| SessionError::InvalidRegistry(format!("bad chain id: {chain_key}")))?;
            let address = parse_address(&deployment.address)?;

            match self.networks.get_mut(&chain_id) {
                Some(info) => info.contract_address = Some(address),
                None => self.insert(NetworkInfo {
                    chain_id,
                    label: format!("chain-{chain_id}"),
                    rpc_url: String::new(),
                    contract_address: Some(address),
                }),
            }
            merged += 1;
        }
        Ok(merged)
    }
}

/// Parse a 20-byte hex address, with or without the `0x` prefix.
pub fn parse_address(text: &str) -> Result<Address, SessionError> {
    let stripped = text.trim().trim_start_matches("0x");
    let bytes = hex::decode(stripped)
        .map_err(|_| SessionError::InvalidRegistry(format!("bad address: {text}")))?;
    if bytes.len() != 20 {
        return Err(SessionError::InvalidRegistry(format!(
            "bad address length: {} bytes",
            bytes.len()
        )));
    }
    Ok(Address::from_slice(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_registry_knows_dev_chain_and_sepolia() {
        let registry = NetworkRegistry::bundled();
        assert_eq!(registry.len(), 2);

        let dev = registry.get(DEV_CHAIN_ID).unwrap();
        assert_eq!(dev.label, "Hardhat");
        assert!(dev.contract_address.is_some());

        let sepolia = registry.get(SEPOLIA_CHAIN_ID).unwrap();
        assert_eq!(sepolia.label, "Sepolia");
        assert!(sepolia.contract_address.is_none());
    }

    #[test]
    fn resolve_contract_distinguishes_unknown_from_undeployed() {
        let registry = NetworkRegistry::bundled();

        assert!(registry.resolve_contract(DEV_CHAIN_ID).is_ok());
        assert!(matches!(
            registry.resolve_contract(1),
            Err(SessionError::UnsupportedNetwork { chain_id: 1 })
        ));
        assert!(matches!(
            registry.resolve_contract(SEPOLIA_CHAIN_ID),
            Err(SessionError::ContractNotDeployed { .. })
        ));
    }

    #[test]
    fn merge_updates_known_chain_and_adds_unknown() {
        let mut registry = NetworkRegistry::bundled();
        let merged = registry
            .merge_from_json(
                r#"{
                    "11155111": { "address": "0x1111111111111111111111111111111111111111" },
                    "1337": { "address": "0x2222222222222222222222222222222222222222" }
                }"#,
            )
            .unwrap();

        assert_eq!(merged, 2);
        assert_eq!(
            registry.resolve_contract(SEPOLIA_CHAIN_ID).unwrap(),
            Address::repeat_byte(0x11)
        );
        let added = registry.get(1337).unwrap();
        assert_eq!(added.label, "chain-1337");
        assert_eq!(added.contract_address, Some(Address::repeat_byte(0x22)));
    }

    #[test]
    fn merge_rejects_malformed_entries() {
        let mut registry = NetworkRegistry::bundled();
        assert!(registry.merge_from_json("not json").is_err());
        assert!(registry
            .merge_from_json(r#"{ "abc": { "address": "0x11" } }"#)
            .is_err());
        assert!(registry
            .merge_from_json(r#"{ "1": { "address": "0xdeadbeef" } }"#)
            .is_err());
    }

    #[test]
    fn parse_address_accepts_both_prefixes() {
        let with = parse_address(DEV_CONTRACT_ADDRESS).unwrap();
        let without = parse_address("5FbDB2315678afecb367f032d93F642f64180aa3").unwrap();
        assert_eq!(with, without);
    }
}
