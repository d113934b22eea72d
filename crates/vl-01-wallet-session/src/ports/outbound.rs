//! # Outbound Ports
//!
//! Traits for external dependencies: the JSON-RPC node and the key holder
//! that approves signatures.

use crate::domain::entities::FeeData;
use crate::domain::errors::SessionError;
use async_trait::async_trait;
use k256::ecdsa::SigningKey;
use shared_evm::ecdsa::address_from_verifying_key;
use shared_evm::logs::{Log, LogFilter};
use shared_evm::tx::{TransactionReceipt, TypedTransaction};
use shared_types::entities::{Address, ChainId, TxHash, H256, U256};
use shared_types::errors::RpcError;

/// Read/submit access to an Ethereum node - outbound port.
///
/// Every method maps to one JSON-RPC call. Implementations must not retry
/// internally; callers decide what is worth retrying.
#[async_trait]
pub trait ChainProvider: Send + Sync {
    /// Chain id the node reports (`eth_chainId`).
    async fn chain_id(&self) -> Result<ChainId, RpcError>;

    /// Current head block number (`eth_blockNumber`).
    async fn block_number(&self) -> Result<u64, RpcError>;

    /// Current fee estimates. Either field may be unknown when the node
    /// does not expose the corresponding method.
    async fn fee_data(&self) -> Result<FeeData, RpcError>;

    /// Account balance in wei (`eth_getBalance`).
    async fn balance(&self, address: Address) -> Result<U256, RpcError>;

    /// Pending-inclusive transaction count, used as the next nonce.
    async fn transaction_count(&self, address: Address) -> Result<u64, RpcError>;

    /// Execute a read-only contract call (`eth_call`).
    ///
    /// `block` of `None` runs against the latest state; a pinned block
    /// number keeps a multi-call scan consistent.
    async fn call(
        &self,
        to: Address,
        data: Vec<u8>,
        block: Option<u64>,
    ) -> Result<Vec<u8>, RpcError>;

    /// Broadcast a signed raw transaction, returning its hash.
    async fn send_raw_transaction(&self, raw: Vec<u8>) -> Result<TxHash, RpcError>;

    /// Receipt of a mined transaction, `None` while it is still pending.
    async fn transaction_receipt(
        &self,
        hash: TxHash,
    ) -> Result<Option<TransactionReceipt>, RpcError>;

    /// Event logs matching a filter (`eth_getLogs`).
    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<Log>, RpcError>;
}

/// Key holder that exposes accounts and approves signatures - outbound port.
///
/// Connection and signing both require the holder's consent, so either can
/// be denied.
#[async_trait]
pub trait WalletConnector: Send + Sync {
    /// Request access to the holder's accounts.
    async fn request_accounts(&self) -> Result<Vec<Address>, SessionError>;

    /// Ask the holder to sign a transaction, returning the raw wire bytes.
    async fn sign_transaction(&self, tx: &TypedTransaction) -> Result<Vec<u8>, SessionError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Mock node for testing.
#[derive(Debug, Clone)]
pub struct MockChainProvider {
    /// Chain id to report.
    pub chain_id: ChainId,
    /// Head block to report.
    pub block_number: u64,
    /// Balance to report for every account.
    pub balance_wei: U256,
    /// Should return errors?
    pub should_fail: bool,
}

impl Default for MockChainProvider {
    fn default() -> Self {
        Self {
            chain_id: 31337,
            block_number: 0,
            balance_wei: U256::zero(),
            should_fail: false,
        }
    }
}

impl MockChainProvider {
    /// Mock reporting the given chain id.
    #[must_use]
    pub fn on_chain(chain_id: ChainId) -> Self {
        Self {
            chain_id,
            ..Default::default()
        }
    }

    fn guard(&self) -> Result<(), RpcError> {
        if self.should_fail {
            return Err(RpcError::Transport("Mock failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ChainProvider for MockChainProvider {
    async fn chain_id(&self) -> Result<ChainId, RpcError> {
        self.guard()?;
        Ok(self.chain_id)
    }

    async fn block_number(&self) -> Result<u64, RpcError> {
        self.guard()?;
        Ok(self.block_number)
    }

    async fn fee_data(&self) -> Result<FeeData, RpcError> {
        self.guard()?;
        Ok(FeeData::default())
    }

    async fn balance(&self, _address: Address) -> Result<U256, RpcError> {
        self.guard()?;
        Ok(self.balance_wei)
    }

    async fn transaction_count(&self, _address: Address) -> Result<u64, RpcError> {
        self.guard()?;
        Ok(0)
    }

    async fn call(
        &self,
        _to: Address,
        _data: Vec<u8>,
        _block: Option<u64>,
    ) -> Result<Vec<u8>, RpcError> {
        self.guard()?;
        Ok(vec![])
    }

    async fn send_raw_transaction(&self, _raw: Vec<u8>) -> Result<TxHash, RpcError> {
        self.guard()?;
        Ok(H256::zero())
    }

    async fn transaction_receipt(
        &self,
        _hash: TxHash,
    ) -> Result<Option<TransactionReceipt>, RpcError> {
        self.guard()?;
        Ok(None)
    }

    async fn get_logs(&self, _filter: &LogFilter) -> Result<Vec<Log>, RpcError> {
        self.guard()?;
        Ok(vec![])
    }
}

/// Mock key holder for testing.
#[derive(Clone)]
pub struct MockWallet {
    key: SigningKey,
    /// Deny the account request?
    pub deny_accounts: bool,
    /// Deny signature approval?
    pub deny_signing: bool,
}

impl Default for MockWallet {
    fn default() -> Self {
        Self::new()
    }
}

impl MockWallet {
    /// Mock holding a fresh random key.
    #[must_use]
    pub fn new() -> Self {
        Self::with_key(SigningKey::random(&mut rand::thread_rng()))
    }

    /// Mock holding a specific key.
    #[must_use]
    pub fn with_key(key: SigningKey) -> Self {
        Self {
            key,
            deny_accounts: false,
            deny_signing: false,
        }
    }

    /// Address of the held key.
    #[must_use]
    pub fn address(&self) -> Address {
        address_from_verifying_key(self.key.verifying_key())
    }
}

#[async_trait]
impl WalletConnector for MockWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, SessionError> {
        if self.deny_accounts {
            return Err(SessionError::ConnectionRejected("Mock denial".to_string()));
        }
        Ok(vec![self.address()])
    }

    async fn sign_transaction(&self, tx: &TypedTransaction) -> Result<Vec<u8>, SessionError> {
        if self.deny_signing {
            return Err(SessionError::ApprovalDenied);
        }
        let signature = tx.sign(&self.key)?;
        Ok(tx.encode_signed(&signature))
    }
}
