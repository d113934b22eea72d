//! # HTTP JSON-RPC Provider
//!
//! [`ChainProvider`] backed by a node's HTTP JSON-RPC endpoint. One request
//! per method call, ids from a process-local counter, no internal retries.

use crate::config::SessionConfig;
use crate::domain::entities::FeeData;
use crate::ports::outbound::ChainProvider;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shared_evm::logs::{Log, LogFilter};
use shared_evm::tx::TransactionReceipt;
use shared_types::entities::{Address, ChainId, TxHash, H160, H256, U256};
use shared_types::errors::RpcError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

/// JSON-RPC error code for an unknown method.
const METHOD_NOT_FOUND_CODE: i64 = -32601;

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcErrorBody {
    code: i64,
    message: String,
}

/// Log record as a node serializes it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcLog {
    address: String,
    topics: Vec<String>,
    data: String,
    block_number: String,
    transaction_hash: String,
    log_index: String,
}

/// Receipt record as a node serializes it, trimmed to the fields used here.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    transaction_hash: String,
    block_number: String,
    status: String,
    logs: Vec<RpcLog>,
}

/// HTTP JSON-RPC chain provider.
#[derive(Debug)]
pub struct HttpProvider {
    client: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl HttpProvider {
    /// Build a provider against the configured endpoint.
    pub fn new(config: &SessionConfig) -> Result<Self, RpcError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| RpcError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            url: config.rpc_url.clone(),
            next_id: AtomicU64::new(1),
        })
    }

    /// Endpoint this provider talks to.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Issue one JSON-RPC request. A `null` result is returned as
    /// [`Value::Null`]; only protocol-level failures become errors.
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = JsonRpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };
        debug!(method, id, "json-rpc request");

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;
        let parsed: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| RpcError::Decode(e.to_string()))?;

        if let Some(error) = parsed.error {
            warn!(method, code = error.code, "json-rpc error response");
            if error.code == METHOD_NOT_FOUND_CODE {
                return Err(RpcError::MethodNotFound(method.to_string()));
            }
            return Err(RpcError::Api {
                code: error.code,
                message: error.message,
            });
        }
        Ok(parsed.result.unwrap_or(Value::Null))
    }

    /// Fetch a quantity from a zero-argument method, treating an
    /// unimplemented method as "unknown" rather than an error.
    async fn optional_quantity(&self, method: &str) -> Result<Option<U256>, RpcError> {
        match self.request(method, json!([])).await {
            Ok(value) => Ok(Some(big_quantity(&value)?)),
            Err(RpcError::MethodNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl ChainProvider for HttpProvider {
    async fn chain_id(&self) -> Result<ChainId, RpcError> {
        let value = self.request("eth_chainId", json!([])).await?;
        quantity(&value)
    }

    async fn block_number(&self) -> Result<u64, RpcError> {
        let value = self.request("eth_blockNumber", json!([])).await?;
        quantity(&value)
    }

    async fn fee_data(&self) -> Result<FeeData, RpcError> {
        let max_fee_per_gas = self.optional_quantity("eth_gasPrice").await?;
        let max_priority_fee_per_gas = self.optional_quantity("eth_maxPriorityFeePerGas").await?;
        Ok(FeeData {
            max_fee_per_gas,
            max_priority_fee_per_gas,
        })
    }

    async fn balance(&self, address: Address) -> Result<U256, RpcError> {
        let value = self
            .request("eth_getBalance", json!([hex_address(address), "latest"]))
            .await?;
        big_quantity(&value)
    }

    async fn transaction_count(&self, address: Address) -> Result<u64, RpcError> {
        // "pending" so queued transactions from this account are counted.
        let value = self
            .request(
                "eth_getTransactionCount",
                json!([hex_address(address), "pending"]),
            )
            .await?;
        quantity(&value)
    }

    async fn call(
        &self,
        to: Address,
        data: Vec<u8>,
        block: Option<u64>,
    ) -> Result<Vec<u8>, RpcError> {
        let block_tag = match block {
            Some(number) => json!(hex_quantity(number)),
            None => json!("latest"),
        };
        let value = self
            .request(
                "eth_call",
                json!([
                    { "to": hex_address(to), "data": hex_data(&data) },
                    block_tag
                ]),
            )
            .await?;
        hex_bytes(&value)
    }

    async fn send_raw_transaction(&self, raw: Vec<u8>) -> Result<TxHash, RpcError> {
        let value = self
            .request("eth_sendRawTransaction", json!([hex_data(&raw)]))
            .await?;
        h256_from_value(&value)
    }

    async fn transaction_receipt(
        &self,
        hash: TxHash,
    ) -> Result<Option<TransactionReceipt>, RpcError> {
        let value = self
            .request(
                "eth_getTransactionReceipt",
                json!([format!("0x{}", hex::encode(hash.as_bytes()))]),
            )
            .await?;
        if value.is_null() {
            return Ok(None);
        }
        let receipt: RpcReceipt =
            serde_json::from_value(value).map_err(|e| RpcError::Decode(e.to_string()))?;
        Ok(Some(convert_receipt(receipt)?))
    }

    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<Log>, RpcError> {
        let value = self
            .request("eth_getLogs", json!([filter_params(filter)]))
            .await?;
        let raw_logs: Vec<RpcLog> =
            serde_json::from_value(value).map_err(|e| RpcError::Decode(e.to_string()))?;
        raw_logs.into_iter().map(convert_log).collect()
    }
}

/// Build the filter object `eth_getLogs` expects.
fn filter_params(filter: &LogFilter) -> Value {
    let mut params = serde_json::Map::new();
    params.insert("fromBlock".to_string(), json!(hex_quantity(filter.from_block)));
    let to_block = match filter.to_block {
        Some(number) => json!(hex_quantity(number)),
        None => json!("latest"),
    };
    params.insert("toBlock".to_string(), to_block);
    if let Some(address) = filter.address {
        params.insert("address".to_string(), json!(hex_address(address)));
    }
    if let Some(topic0) = filter.topic0 {
        params.insert(
            "topics".to_string(),
            json!([format!("0x{}", hex::encode(topic0.as_bytes()))]),
        );
    }
    Value::Object(params)
}

fn convert_log(raw: RpcLog) -> Result<Log, RpcError> {
    let mut topics = Vec::with_capacity(raw.topics.len());
    for topic in &raw.topics {
        topics.push(h256_from_hex(topic)?);
    }
    Ok(Log {
        address: h160_from_hex(&raw.address)?,
        topics,
        data: bytes_from_hex(&raw.data)?,
        block_number: u64_from_hex(&raw.block_number)?,
        transaction_hash: h256_from_hex(&raw.transaction_hash)?,
        log_index: u64_from_hex(&raw.log_index)?,
    })
}

fn convert_receipt(raw: RpcReceipt) -> Result<TransactionReceipt, RpcError> {
    let logs = raw
        .logs
        .into_iter()
        .map(convert_log)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(TransactionReceipt {
        transaction_hash: h256_from_hex(&raw.transaction_hash)?,
        block_number: u64_from_hex(&raw.block_number)?,
        status: u64_from_hex(&raw.status)? != 0,
        logs,
    })
}

// Hex encoding helpers for request parameters.

fn hex_quantity(number: u64) -> String {
    format!("0x{number:x}")
}

fn hex_address(address: Address) -> String {
    format!("0x{}", hex::encode(address.as_bytes()))
}

fn hex_data(data: &[u8]) -> String {
    format!("0x{}", hex::encode(data))
}

// Hex decoding helpers for response values. Quantities come back in
// minimal form ("0x0", "0x1b4"), so odd nibble counts are expected.

fn quantity(value: &Value) -> Result<u64, RpcError> {
    let text = value
        .as_str()
        .ok_or_else(|| RpcError::Decode(format!("expected hex quantity, got {value}")))?;
    u64_from_hex(text)
}

fn big_quantity(value: &Value) -> Result<U256, RpcError> {
    let text = value
        .as_str()
        .ok_or_else(|| RpcError::Decode(format!("expected hex quantity, got {value}")))?;
    let bytes = decode_nibbles(text)?;
    Ok(U256::from_big_endian(&bytes))
}

fn hex_bytes(value: &Value) -> Result<Vec<u8>, RpcError> {
    let text = value
        .as_str()
        .ok_or_else(|| RpcError::Decode(format!("expected hex data, got {value}")))?;
    bytes_from_hex(text)
}

fn h256_from_value(value: &Value) -> Result<H256, RpcError> {
    let text = value
        .as_str()
        .ok_or_else(|| RpcError::Decode(format!("expected hash, got {value}")))?;
    h256_from_hex(text)
}

fn u64_from_hex(text: &str) -> Result<u64, RpcError> {
    let stripped = text.trim_start_matches("0x");
    u64::from_str_radix(stripped, 16)
        .map_err(|_| RpcError::Decode(format!("bad hex quantity: {text}")))
}

fn bytes_from_hex(text: &str) -> Result<Vec<u8>, RpcError> {
    hex::decode(text.trim_start_matches("0x"))
        .map_err(|_| RpcError::Decode(format!("bad hex data: {text}")))
}

fn decode_nibbles(text: &str) -> Result<Vec<u8>, RpcError> {
    let stripped = text.trim_start_matches("0x");
    let padded = if stripped.len() % 2 == 1 {
        format!("0{stripped}")
    } else {
        stripped.to_string()
    };
    hex::decode(&padded).map_err(|_| RpcError::Decode(format!("bad hex quantity: {text}")))
}

fn h160_from_hex(text: &str) -> Result<H160, RpcError> {
    let bytes = bytes_from_hex(text)?;
    if bytes.len() != 20 {
        return Err(RpcError::Decode(format!("bad address: {text}")));
    }
    Ok(H160::from_slice(&bytes))
}

fn h256_from_hex(text: &str) -> Result<H256, RpcError> {
    let bytes = bytes_from_hex(text)?;
    if bytes.len() != 32 {
        return Err(RpcError::Decode(format!("bad hash: {text}")));
    }
    Ok(H256::from_slice(&bytes))
}
