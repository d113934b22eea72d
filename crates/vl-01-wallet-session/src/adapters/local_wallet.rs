//! # Local Wallet
//!
//! [`WalletConnector`] holding a private key in process. Used for headless
//! runs and tests. An [`ApprovalPolicy`] stands in for the confirmation
//! prompt a browser wallet would show; the default approves everything.

use crate::domain::errors::SessionError;
use crate::ports::outbound::WalletConnector;
use async_trait::async_trait;
use k256::ecdsa::SigningKey;
use shared_evm::ecdsa::{address_from_verifying_key, signing_key_from_hex};
use shared_evm::tx::TypedTransaction;
use shared_types::entities::Address;
use std::fmt;
use std::sync::Arc;

/// Decides whether a transaction may be signed. A rejection surfaces as
/// [`SessionError::ApprovalDenied`], the same condition as a user
/// declining a wallet prompt.
pub trait ApprovalPolicy: Send + Sync {
    /// True to sign, false to reject.
    fn approve(&self, tx: &TypedTransaction) -> bool;
}

/// Policy that signs everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct AutoApprove;

impl ApprovalPolicy for AutoApprove {
    fn approve(&self, _tx: &TypedTransaction) -> bool {
        true
    }
}

impl<F> ApprovalPolicy for F
where
    F: Fn(&TypedTransaction) -> bool + Send + Sync,
{
    fn approve(&self, tx: &TypedTransaction) -> bool {
        self(tx)
    }
}

/// In-process wallet over a single secp256k1 key.
#[derive(Clone)]
pub struct LocalWallet {
    key: SigningKey,
    address: Address,
    approval: Arc<dyn ApprovalPolicy>,
}

impl LocalWallet {
    /// Load a wallet from a hex-encoded private key.
    pub fn from_hex(hex_key: &str) -> Result<Self, SessionError> {
        Ok(Self::from_key(signing_key_from_hex(hex_key)?))
    }

    /// Wallet over an existing key.
    #[must_use]
    pub fn from_key(key: SigningKey) -> Self {
        let address = address_from_verifying_key(key.verifying_key());
        Self {
            key,
            address,
            approval: Arc::new(AutoApprove),
        }
    }

    /// Replace the approval policy.
    #[must_use]
    pub fn with_approval(mut self, policy: Arc<dyn ApprovalPolicy>) -> Self {
        self.approval = policy;
        self
    }

    /// Wallet with a freshly generated key.
    #[must_use]
    pub fn random() -> Self {
        Self::from_key(SigningKey::random(&mut rand::thread_rng()))
    }

    /// Address of the held key.
    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }
}

// Key material stays out of debug output.
impl fmt::Debug for LocalWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalWallet")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl WalletConnector for LocalWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, SessionError> {
        Ok(vec![self.address])
    }

    async fn sign_transaction(&self, tx: &TypedTransaction) -> Result<Vec<u8>, SessionError> {
        if !self.approval.approve(tx) {
            return Err(SessionError::ApprovalDenied);
        }
        let signature = tx.sign(&self.key)?;
        Ok(tx.encode_signed(&signature))
    }
}
