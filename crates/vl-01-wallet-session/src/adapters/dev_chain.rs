//! # In-Process Dev Chain
//!
//! [`ChainProvider`] over an in-memory chain carrying one deployed ledger
//! contract. Mines a block per accepted transaction, keeps per-block video
//! visibility so pinned reads behave like a real node, and exposes failure
//! and timing knobs for tests.

use crate::domain::contract::{
    LedgerContract, SIG_NAME, SIG_OWNER, SIG_UPLOAD_VIDEO, SIG_VIDEOS, SIG_VIDEO_COUNT,
};
use crate::domain::entities::FeeData;
use crate::ports::outbound::ChainProvider;
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use shared_evm::abi::{self, Param, Token};
use shared_evm::keccak::{keccak256, selector};
use shared_evm::logs::{Log, LogFilter};
use shared_evm::tx::{recover_sender, transaction_hash, TransactionReceipt, TypedTransaction};
use shared_evm::units::gwei;
use shared_types::entities::{Address, BlockNumber, ChainId, TxHash, Video, H256, U256};
use shared_types::errors::RpcError;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::debug;

/// Address a dev node assigns to the first deployed contract.
const CONTRACT_BYTES: [u8; 20] = [
    0x5f, 0xbd, 0xb2, 0x31, 0x56, 0x78, 0xaf, 0xec, 0xb3, 0x67, 0xf0, 0x32, 0xd9, 0x3f, 0x64,
    0x2f, 0x64, 0x18, 0x0a, 0xa3,
];

/// First prefunded dev account, which deploys the contract and owns it.
const OWNER_BYTES: [u8; 20] = [
    0xf3, 0x9f, 0xd6, 0xe5, 0x1a, 0xad, 0x88, 0xf6, 0xf4, 0xce, 0x6a, 0xb8, 0x82, 0x72, 0x79,
    0xcf, 0xff, 0xb9, 0x22, 0x66,
];

/// Revert reasons the contract's input checks produce.
const REVERT_NO_HASH: &str = "Should have a hash";
const REVERT_NO_TITLE: &str = "Should have a title";

/// A ledger entry together with the block it was appended in.
#[derive(Debug, Clone)]
struct StoredVideo {
    video: Video,
    block_number: BlockNumber,
}

#[derive(Debug)]
struct DevChainState {
    block_number: u64,
    videos: Vec<StoredVideo>,
    balances: HashMap<Address, U256>,
    nonces: HashMap<Address, u64>,
    receipts: HashMap<TxHash, TransactionReceipt>,
    held: HashSet<TxHash>,
    logs: Vec<Log>,
    name: String,
    owner: Address,
}

/// In-memory chain with the ledger contract pre-deployed.
pub struct DevChain {
    state: RwLock<DevChainState>,
    contract: LedgerContract,
    chain_id: ChainId,
    fee_data: Mutex<FeeData>,
    /// Appends applied right before the next `call`, after any block pin
    /// was taken. Simulates another client appending mid-scan.
    pending_appends: Mutex<VecDeque<(String, String, Address)>>,
    fail_calls: AtomicBool,
    fail_send: AtomicBool,
    fail_balance: AtomicBool,
    hold_receipts: AtomicBool,
    revert_uploads: AtomicBool,
    transactions_sent: AtomicU64,
}

impl DevChain {
    /// Fresh chain at block 0 with the standard dev chain id.
    #[must_use]
    pub fn new() -> Self {
        Self::on_chain(31337)
    }

    /// Fresh chain reporting the given chain id.
    #[must_use]
    pub fn on_chain(chain_id: ChainId) -> Self {
        Self {
            state: RwLock::new(DevChainState {
                block_number: 0,
                videos: Vec::new(),
                balances: HashMap::new(),
                nonces: HashMap::new(),
                receipts: HashMap::new(),
                held: HashSet::new(),
                logs: Vec::new(),
                name: "FreeVideos".to_string(),
                owner: Address::from(OWNER_BYTES),
            }),
            contract: LedgerContract::new(Address::from(CONTRACT_BYTES)),
            chain_id,
            fee_data: Mutex::new(FeeData {
                max_fee_per_gas: Some(gwei(2)),
                max_priority_fee_per_gas: Some(gwei(1)),
            }),
            pending_appends: Mutex::new(VecDeque::new()),
            fail_calls: AtomicBool::new(false),
            fail_send: AtomicBool::new(false),
            fail_balance: AtomicBool::new(false),
            hold_receipts: AtomicBool::new(false),
            revert_uploads: AtomicBool::new(false),
            transactions_sent: AtomicU64::new(0),
        }
    }

    /// Address of the pre-deployed ledger contract.
    #[must_use]
    pub fn contract_address(&self) -> Address {
        self.contract.address()
    }

    /// Credit an account. Sends from unfunded accounts are rejected.
    pub fn fund(&self, account: Address, wei: U256) {
        self.state.write().balances.insert(account, wei);
    }

    /// Mine an empty block, returning the new height.
    pub fn mine_block(&self) -> u64 {
        let mut state = self.state.write();
        state.block_number += 1;
        state.block_number
    }

    /// Append a video directly, as if another client had uploaded it.
    /// Mines one block and emits the matching log.
    pub fn append_video(&self, hash: &str, title: &str, author: Address) -> (Video, BlockNumber) {
        let mut state = self.state.write();
        let tx_hash = synthetic_tx_hash(state.videos.len() as u64 + 1);
        mine_append(
            &mut state,
            &self.contract,
            hash.to_string(),
            title.to_string(),
            author,
            tx_hash,
        )
    }

    /// Queue an append that lands right before the next `call`.
    pub fn queue_append(&self, hash: &str, title: &str, author: Address) {
        self.pending_appends
            .lock()
            .push_back((hash.to_string(), title.to_string(), author));
    }

    /// Make every `call` fail with a transport error.
    pub fn set_fail_calls(&self, fail: bool) {
        self.fail_calls.store(fail, Ordering::Relaxed);
    }

    /// Make every broadcast fail with a transport error.
    pub fn set_fail_send(&self, fail: bool) {
        self.fail_send.store(fail, Ordering::Relaxed);
    }

    /// Make balance queries fail with a transport error.
    pub fn set_fail_balance(&self, fail: bool) {
        self.fail_balance.store(fail, Ordering::Relaxed);
    }

    /// Withhold receipts of transactions sent while set, keeping them
    /// pending until [`release_receipts`](Self::release_receipts).
    pub fn set_hold_receipts(&self, hold: bool) {
        self.hold_receipts.store(hold, Ordering::Relaxed);
    }

    /// Release every withheld receipt.
    pub fn release_receipts(&self) {
        self.state.write().held.clear();
    }

    /// Force every upload transaction to revert while set.
    pub fn set_revert_uploads(&self, revert: bool) {
        self.revert_uploads.store(revert, Ordering::Relaxed);
    }

    /// Override the fees the chain reports.
    pub fn set_fee_data(&self, fee_data: FeeData) {
        *self.fee_data.lock() = fee_data;
    }

    /// Number of transactions accepted via broadcast.
    #[must_use]
    pub fn transactions_sent(&self) -> u64 {
        self.transactions_sent.load(Ordering::Relaxed)
    }

    fn apply_pending_appends(&self, state: &mut DevChainState) {
        let mut queue = self.pending_appends.lock();
        while let Some((hash, title, author)) = queue.pop_front() {
            let tx_hash = synthetic_tx_hash(state.videos.len() as u64 + 1);
            mine_append(state, &self.contract, hash, title, author, tx_hash);
        }
    }

    /// Execute contract calldata against the state visible at `block`.
    fn execute_call(
        &self,
        state: &DevChainState,
        data: &[u8],
        block: u64,
    ) -> Result<Vec<u8>, RpcError> {
        if data.len() < 4 {
            return Err(execution_reverted());
        }

        if data[..4] == selector(SIG_VIDEO_COUNT) {
            let count = visible_count(state, block);
            return Ok(abi::encode_tokens(&[Token::Uint(U256::from(count))]));
        }

        if data[..4] == selector(SIG_VIDEOS) {
            let tokens =
                abi::decode(&data[4..], &[Param::Uint]).map_err(|_| execution_reverted())?;
            let requested = tokens.first().and_then(Token::as_uint).unwrap_or_default();
            let video = state
                .videos
                .iter()
                .filter(|stored| stored.block_number <= block)
                .find(|stored| U256::from(stored.video.id) == requested)
                .map(|stored| stored.video.clone())
                // Mapping getter: unassigned keys read as the zero struct.
                .unwrap_or_else(zero_video);
            return Ok(LedgerContract::encode_video_added_data(&video));
        }

        if data[..4] == selector(SIG_NAME) {
            return Ok(abi::encode_tokens(&[Token::Str(state.name.clone())]));
        }

        if data[..4] == selector(SIG_OWNER) {
            return Ok(abi::encode_tokens(&[Token::Address(state.owner)]));
        }

        Err(execution_reverted())
    }

    /// Validate and mine one transaction addressed to the contract.
    fn execute_upload(
        &self,
        state: &mut DevChainState,
        tx: &TypedTransaction,
        sender: Address,
        tx_hash: TxHash,
    ) -> TransactionReceipt {
        if self.revert_uploads.load(Ordering::Relaxed) {
            debug!("[vl-01] dev chain upload forced to revert");
            return reverted_receipt(state, tx_hash);
        }
        match self.contract.decode_upload_video_call(&tx.data) {
            Ok((hash, title)) => {
                if hash.is_empty() {
                    debug!(reason = REVERT_NO_HASH, "[vl-01] dev chain upload reverted");
                    return reverted_receipt(state, tx_hash);
                }
                if title.is_empty() {
                    debug!(reason = REVERT_NO_TITLE, "[vl-01] dev chain upload reverted");
                    return reverted_receipt(state, tx_hash);
                }
                let (video, block_number) =
                    mine_append(state, &self.contract, hash, title, sender, tx_hash);
                debug!(
                    video_id = video.id,
                    block_number, "[vl-01] dev chain upload mined"
                );
                let log = state.logs.last().cloned();
                TransactionReceipt {
                    transaction_hash: tx_hash,
                    block_number,
                    status: true,
                    logs: log.into_iter().collect(),
                }
            }
            // No fallback function: anything else reverts.
            Err(_) => reverted_receipt(state, tx_hash),
        }
    }
}

impl Default for DevChain {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChainProvider for DevChain {
    async fn chain_id(&self) -> Result<ChainId, RpcError> {
        Ok(self.chain_id)
    }

    async fn block_number(&self) -> Result<u64, RpcError> {
        Ok(self.state.read().block_number)
    }

    async fn fee_data(&self) -> Result<FeeData, RpcError> {
        Ok(*self.fee_data.lock())
    }

    async fn balance(&self, address: Address) -> Result<U256, RpcError> {
        if self.fail_balance.load(Ordering::Relaxed) {
            return Err(RpcError::Transport("Mock failure".to_string()));
        }
        Ok(self
            .state
            .read()
            .balances
            .get(&address)
            .copied()
            .unwrap_or_default())
    }

    async fn transaction_count(&self, address: Address) -> Result<u64, RpcError> {
        Ok(self
            .state
            .read()
            .nonces
            .get(&address)
            .copied()
            .unwrap_or_default())
    }

    async fn call(
        &self,
        to: Address,
        data: Vec<u8>,
        block: Option<u64>,
    ) -> Result<Vec<u8>, RpcError> {
        if self.fail_calls.load(Ordering::Relaxed) {
            return Err(RpcError::Transport("Mock failure".to_string()));
        }

        let mut state = self.state.write();
        self.apply_pending_appends(&mut state);

        if to != self.contract.address() {
            // Nothing deployed there; a real node returns empty data.
            return Ok(vec![]);
        }
        let block = block.unwrap_or(state.block_number);
        self.execute_call(&state, &data, block)
    }

    async fn send_raw_transaction(&self, raw: Vec<u8>) -> Result<TxHash, RpcError> {
        if self.fail_send.load(Ordering::Relaxed) {
            return Err(RpcError::Transport("Mock failure".to_string()));
        }

        let (tx, signature) = TypedTransaction::decode_signed(&raw)
            .map_err(|e| rejected(format!("invalid raw transaction: {e}")))?;
        let sender = recover_sender(&tx, &signature)
            .map_err(|e| rejected(format!("unrecoverable sender: {e}")))?;

        if tx.chain_id != self.chain_id {
            return Err(rejected(format!(
                "invalid chain id: got {}, expected {}",
                tx.chain_id, self.chain_id
            )));
        }

        let mut state = self.state.write();

        let expected_nonce = state.nonces.get(&sender).copied().unwrap_or_default();
        if tx.nonce != expected_nonce {
            return Err(rejected(format!(
                "invalid nonce: got {}, expected {expected_nonce}",
                tx.nonce
            )));
        }
        if state.balances.get(&sender).copied().unwrap_or_default().is_zero() {
            return Err(rejected(
                "insufficient funds for gas * price + value".to_string(),
            ));
        }

        let tx_hash = transaction_hash(&raw);
        let receipt = match tx.to {
            Some(to) if to == self.contract.address() => {
                self.execute_upload(&mut state, &tx, sender, tx_hash)
            }
            // Plain transfer or call to an empty account: mines fine.
            _ => {
                state.block_number += 1;
                TransactionReceipt {
                    transaction_hash: tx_hash,
                    block_number: state.block_number,
                    status: true,
                    logs: vec![],
                }
            }
        };

        state.nonces.insert(sender, expected_nonce + 1);
        state.receipts.insert(tx_hash, receipt);
        if self.hold_receipts.load(Ordering::Relaxed) {
            state.held.insert(tx_hash);
        }
        self.transactions_sent.fetch_add(1, Ordering::Relaxed);
        Ok(tx_hash)
    }

    async fn transaction_receipt(
        &self,
        hash: TxHash,
    ) -> Result<Option<TransactionReceipt>, RpcError> {
        let state = self.state.read();
        if state.held.contains(&hash) {
            return Ok(None);
        }
        Ok(state.receipts.get(&hash).cloned())
    }

    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<Log>, RpcError> {
        if self.fail_calls.load(Ordering::Relaxed) {
            return Err(RpcError::Transport("Mock failure".to_string()));
        }
        let state = self.state.read();
        Ok(state
            .logs
            .iter()
            .filter(|log| filter.matches(log))
            .cloned()
            .collect())
    }
}

fn mine_append(
    state: &mut DevChainState,
    contract: &LedgerContract,
    hash: String,
    title: String,
    author: Address,
    tx_hash: TxHash,
) -> (Video, BlockNumber) {
    state.block_number += 1;
    let block_number = state.block_number;
    let id = state.videos.len() as u64 + 1;
    let video = Video {
        id,
        hash,
        title,
        author,
    };
    state.logs.push(Log {
        address: contract.address(),
        topics: vec![LedgerContract::video_added_topic()],
        data: LedgerContract::encode_video_added_data(&video),
        block_number,
        transaction_hash: tx_hash,
        log_index: 0,
    });
    state.videos.push(StoredVideo {
        video: video.clone(),
        block_number,
    });
    (video, block_number)
}

fn reverted_receipt(state: &mut DevChainState, tx_hash: TxHash) -> TransactionReceipt {
    state.block_number += 1;
    TransactionReceipt {
        transaction_hash: tx_hash,
        block_number: state.block_number,
        status: false,
        logs: vec![],
    }
}

fn visible_count(state: &DevChainState, block: u64) -> u64 {
    state
        .videos
        .iter()
        .filter(|stored| stored.block_number <= block)
        .count() as u64
}

fn zero_video() -> Video {
    Video {
        id: 0,
        hash: String::new(),
        title: String::new(),
        author: Address::zero(),
    }
}

fn synthetic_tx_hash(id: u64) -> TxHash {
    H256(keccak256(format!("dev-append-{id}").as_bytes()))
}

fn rejected(message: String) -> RpcError {
    RpcError::Api {
        code: -32000,
        message,
    }
}

fn execution_reverted() -> RpcError {
    RpcError::Api {
        code: -32000,
        message: "execution reverted".to_string(),
    }
}
