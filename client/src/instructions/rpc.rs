//! JSON-RPC plumbing: transport, error classification, retry and
//! transaction confirmation.

use crate::chain::ChainClient;
use crate::session::WalletSession;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::thread;
use std::time::{Duration, Instant};
use unicorn_meat::abi::{decode_hex, decode_revert_reason, encode_hex};
use unicorn_meat::error::{ErrorCode, Result};
use unicorn_meat::utils::{Address, U256};

/// EIP-1193 "user rejected request".
pub const USER_REJECTED: i64 = 4001;
/// Geth's code for a reverted `eth_call` / `eth_estimateGas`.
pub const EXECUTION_REVERTED: i64 = 3;
/// Provider-side rate limiting, treated like a transport failure.
const RATE_LIMITED: [i64; 2] = [-32005, 429];

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: &'a Value,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

fn rejection_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)user (rejected|denied|cancel)").expect("static pattern")
    })
}

/// Maps a JSON-RPC error object onto the shared error taxonomy.
pub fn classify_rpc_error(error: &RpcErrorObject) -> ErrorCode {
    if error.code == USER_REJECTED || rejection_pattern().is_match(&error.message) {
        return ErrorCode::UserRejection(error.message.clone());
    }
    if RATE_LIMITED.contains(&error.code) {
        return ErrorCode::NetworkError(error.message.clone());
    }
    if error.code == EXECUTION_REVERTED || error.message.contains("execution reverted") {
        let from_data = error
            .data
            .as_ref()
            .and_then(Value::as_str)
            .and_then(|data| decode_hex(data).ok())
            .and_then(|bytes| decode_revert_reason(&bytes));
        let reason = from_data.unwrap_or_else(|| {
            let trimmed = error
                .message
                .trim_start_matches("execution reverted")
                .trim_start_matches(':')
                .trim();
            if trimmed.is_empty() {
                "execution reverted".to_string()
            } else {
                trimmed.to_string()
            }
        });
        return ErrorCode::ContractRevert(reason);
    }
    ErrorCode::Rpc {
        code: error.code,
        message: error.message.clone(),
    }
}

fn into_result(response: RpcResponse) -> Result<Value> {
    match response.error {
        Some(error) => Err(classify_rpc_error(&error)),
        None => Ok(response.result.unwrap_or(Value::Null)),
    }
}

fn network_error(err: reqwest::Error) -> ErrorCode {
    ErrorCode::NetworkError(err.to_string())
}

/// Blocking HTTP transport for one JSON-RPC endpoint.
pub struct RpcTransport {
    client: reqwest::blocking::Client,
    url: String,
    next_id: AtomicU64,
}

impl RpcTransport {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(network_error)?;
        Ok(RpcTransport {
            client,
            url: url.to_string(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, body: &B) -> Result<T> {
        self.client
            .post(&self.url)
            .json(body)
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(network_error)?
            .json::<T>()
            .map_err(network_error)
    }

    pub fn request(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params: &params,
        };
        into_result(self.post::<_, RpcResponse>(&body)?)
    }

    /// One HTTP round trip; per-item failures are returned in place.
    pub fn batch(&self, calls: &[(&str, Value)]) -> Result<Vec<Result<Value>>> {
        if calls.is_empty() {
            return Ok(Vec::new());
        }
        let first = self
            .next_id
            .fetch_add(calls.len() as u64, Ordering::Relaxed);
        let body: Vec<RpcRequest> = calls
            .iter()
            .enumerate()
            .map(|(i, (method, params))| RpcRequest {
                jsonrpc: "2.0",
                id: first + i as u64,
                method: *method,
                params,
            })
            .collect();
        let responses = self.post::<_, Vec<RpcResponse>>(&body)?;
        Ok(match_batch_responses(first, calls.len(), responses))
    }
}

/// Servers may answer a batch in any order; responses are matched by id.
fn match_batch_responses(
    first: u64,
    len: usize,
    responses: Vec<RpcResponse>,
) -> Vec<Result<Value>> {
    let mut by_id: HashMap<u64, RpcResponse> = responses
        .into_iter()
        .filter_map(|response| response.id.map(|id| (id, response)))
        .collect();
    (0..len as u64)
        .map(|i| {
            by_id
                .remove(&(first + i))
                .ok_or_else(|| ErrorCode::NetworkError(format!("no response for batch item {}", i)))
                .and_then(into_result)
        })
        .collect()
}

/// Bounded retry with linear backoff, applied to `NetworkError` only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Delay after the zero-based `attempt` failed.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * (attempt + 1)
    }

    pub fn run<T, F>(&self, mut op: F) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        let attempts = self.attempts.max(1);
        let mut attempt = 0;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt + 1 < attempts => {
                    thread::sleep(self.delay_for(attempt));
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// A state-changing call ready to hand to the wallet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxRequest {
    pub to: Address,
    pub data: Vec<u8>,
    pub value: U256,
    pub gas: Option<U256>,
    pub gas_price: Option<U256>,
}

impl TxRequest {
    pub fn new(to: Address, data: Vec<u8>) -> Self {
        TxRequest {
            to,
            data,
            value: U256::zero(),
            gas: None,
            gas_price: None,
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    pub fn to_json(&self, from: &Address) -> Value {
        let mut tx = json!({
            "from": from,
            "to": self.to,
            "data": encode_hex(&self.data),
        });
        if !self.value.is_zero() {
            tx["value"] = json!(self.value.to_quantity());
        }
        if let Some(gas) = self.gas {
            tx["gas"] = json!(gas.to_quantity());
        }
        if let Some(gas_price) = self.gas_price {
            tx["gasPrice"] = json!(gas_price.to_quantity());
        }
        tx
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    pub transaction_hash: String,
    pub success: bool,
    pub block_number: Option<u64>,
}

impl Receipt {
    pub fn from_json(value: &Value) -> Result<Self> {
        let field = |name: &str| value.get(name).and_then(Value::as_str);
        let transaction_hash = field("transactionHash")
            .ok_or_else(|| ErrorCode::Decode("receipt without transactionHash".to_string()))?
            .to_string();
        let status = field("status")
            .and_then(U256::from_quantity)
            .ok_or_else(|| {
                ErrorCode::Decode(format!("receipt {} without status", transaction_hash))
            })?;
        Ok(Receipt {
            transaction_hash,
            success: !status.is_zero(),
            block_number: field("blockNumber")
                .and_then(U256::from_quantity)
                .and_then(|n| n.try_to_u64()),
        })
    }
}

/// How long to wait for a submitted transaction to be mined.
#[derive(Clone, Copy, Debug)]
pub struct ConfirmPolicy {
    pub poll_interval: Duration,
    pub max_wait: Duration,
}

impl Default for ConfirmPolicy {
    fn default() -> Self {
        ConfirmPolicy {
            poll_interval: Duration::from_secs(2),
            max_wait: Duration::from_secs(600),
        }
    }
}

pub fn wait_for_receipt<C: ChainClient + ?Sized>(
    chain: &C,
    hash: &str,
    policy: &ConfirmPolicy,
) -> Result<Receipt> {
    let started = Instant::now();
    loop {
        if let Some(receipt) = chain.transaction_receipt(hash)? {
            if !receipt.success {
                return Err(ErrorCode::ContractRevert(format!(
                    "transaction {} failed on chain",
                    hash
                )));
            }
            return Ok(receipt);
        }
        if started.elapsed() >= policy.max_wait {
            return Err(ErrorCode::NetworkError(format!(
                "transaction {} not mined after {}s",
                hash,
                policy.max_wait.as_secs()
            )));
        }
        thread::sleep(policy.poll_interval);
    }
}

/// Hands `tx` to the wallet and, if `confirm` is set, blocks until mined.
pub fn send_txn<C: ChainClient + ?Sized>(
    chain: &C,
    session: &WalletSession,
    tx: &TxRequest,
    confirm: Option<&ConfirmPolicy>,
) -> Result<String> {
    let hash = chain.send_transaction(session.account(), tx)?;
    if let Some(policy) = confirm {
        wait_for_receipt(chain, &hash, policy)?;
    }
    Ok(hash)
}
