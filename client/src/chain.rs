//! One interface over the read-only node and the signing wallet endpoint.

use crate::instructions::rpc::{Receipt, RpcTransport, TxRequest};
use crate::ClientConfig;
use serde_json::{json, Value};
use std::time::Duration;
use unicorn_meat::abi::{decode_hex, encode_hex};
use unicorn_meat::error::{ErrorCode, Result};
use unicorn_meat::utils::{Address, U256};

/// Methods only a wallet can answer.
pub const SIGNING_METHODS: [&str; 4] = [
    "eth_sendTransaction",
    "eth_requestAccounts",
    "eth_sign",
    "personal_sign",
];

/// Methods answered by the wallet's own view of the chain.
const WALLET_STATE_METHODS: [&str; 3] =
    ["eth_accounts", "eth_chainId", "eth_getTransactionReceipt"];

const RPC_TIMEOUT: Duration = Duration::from_secs(30);

/// Sender and inclusion block of a mined transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionInfo {
    pub from: Address,
    pub block_number: Option<u64>,
}

impl TransactionInfo {
    pub fn from_json(value: &Value) -> Result<Option<Self>> {
        if value.is_null() {
            return Ok(None);
        }
        let from = value
            .get("from")
            .and_then(Value::as_str)
            .ok_or_else(|| ErrorCode::Decode("transaction without sender".to_string()))?
            .parse()?;
        let block_number = value
            .get("blockNumber")
            .and_then(Value::as_str)
            .and_then(U256::from_quantity)
            .and_then(|n| n.try_to_u64());
        Ok(Some(TransactionInfo { from, block_number }))
    }
}

pub fn quantity(value: &Value) -> Result<U256> {
    value
        .as_str()
        .and_then(U256::from_quantity)
        .ok_or_else(|| ErrorCode::Decode(format!("expected a hex quantity, got {}", value)))
}

fn bytes(value: &Value) -> Result<Vec<u8>> {
    let text = value
        .as_str()
        .ok_or_else(|| ErrorCode::Decode(format!("expected hex data, got {}", value)))?;
    decode_hex(text).map_err(|e| ErrorCode::Decode(e.to_string()))
}

fn addresses(value: &Value) -> Result<Vec<Address>> {
    value
        .as_array()
        .ok_or_else(|| ErrorCode::Decode(format!("expected an account list, got {}", value)))?
        .iter()
        .map(|item| {
            item.as_str()
                .ok_or_else(|| ErrorCode::Decode(format!("bad account {}", item)))?
                .parse()
        })
        .collect()
}

fn call_params(to: &Address, data: &[u8]) -> Value {
    json!([{ "to": to, "data": encode_hex(data) }, "latest"])
}

/// A JSON-RPC backend; everything typed is layered on [`ChainClient::request`].
pub trait ChainClient {
    fn request(&self, method: &str, params: Value) -> Result<Value>;

    /// Per-item results in request order. Backends without batch support
    /// answer sequentially.
    fn batch(&self, calls: &[(&str, Value)]) -> Result<Vec<Result<Value>>> {
        Ok(calls
            .iter()
            .map(|(method, params)| self.request(method, params.clone()))
            .collect())
    }

    fn can_sign(&self) -> bool {
        false
    }

    fn call(&self, to: &Address, data: &[u8]) -> Result<Vec<u8>> {
        bytes(&self.request("eth_call", call_params(to, data))?)
    }

    fn call_batch(&self, calls: &[(Address, Vec<u8>)]) -> Result<Vec<Result<Vec<u8>>>> {
        let requests: Vec<(&str, Value)> = calls
            .iter()
            .map(|(to, data)| ("eth_call", call_params(to, data)))
            .collect();
        Ok(self
            .batch(&requests)?
            .into_iter()
            .map(|result| result.and_then(|value| bytes(&value)))
            .collect())
    }

    fn estimate_gas(&self, from: &Address, tx: &TxRequest) -> Result<U256> {
        quantity(&self.request("eth_estimateGas", json!([tx.to_json(from)]))?)
    }

    fn gas_price(&self) -> Result<U256> {
        quantity(&self.request("eth_gasPrice", json!([]))?)
    }

    fn transaction_by_hash(&self, hash: &str) -> Result<Option<TransactionInfo>> {
        TransactionInfo::from_json(&self.request("eth_getTransactionByHash", json!([hash]))?)
    }

    fn block_timestamp(&self, number: u64) -> Result<u64> {
        let block = self.request(
            "eth_getBlockByNumber",
            json!([format!("0x{:x}", number), false]),
        )?;
        block
            .get("timestamp")
            .map(quantity)
            .transpose()?
            .and_then(|t| t.try_to_u64())
            .ok_or_else(|| ErrorCode::Decode(format!("block {} has no timestamp", number)))
    }

    fn transaction_receipt(&self, hash: &str) -> Result<Option<Receipt>> {
        let value = self.request("eth_getTransactionReceipt", json!([hash]))?;
        if value.is_null() {
            return Ok(None);
        }
        Receipt::from_json(&value).map(Some)
    }

    fn send_transaction(&self, from: &Address, tx: &TxRequest) -> Result<String> {
        let hash = self.request("eth_sendTransaction", json!([tx.to_json(from)]))?;
        hash.as_str()
            .map(str::to_string)
            .ok_or_else(|| ErrorCode::Decode(format!("expected a transaction hash, got {}", hash)))
    }

    fn accounts(&self) -> Result<Vec<Address>> {
        addresses(&self.request("eth_accounts", json!([]))?)
    }

    fn request_accounts(&self) -> Result<Vec<Address>> {
        addresses(&self.request("eth_requestAccounts", json!([]))?)
    }

    fn chain_id(&self) -> Result<u64> {
        quantity(&self.request("eth_chainId", json!([]))?)?
            .try_to_u64()
            .ok_or_else(|| ErrorCode::Decode("chain id overflows".to_string()))
    }
}

/// Public node, reads only.
pub struct HttpChain {
    transport: RpcTransport,
}

impl HttpChain {
    pub fn new(url: &str) -> Result<Self> {
        Ok(HttpChain {
            transport: RpcTransport::new(url, RPC_TIMEOUT)?,
        })
    }
}

fn read_only_guard(method: &str) -> Result<()> {
    if SIGNING_METHODS.contains(&method) {
        return Err(ErrorCode::InvalidInput(format!(
            "`{}` needs a wallet; set wallet_url in client_config.ini",
            method
        )));
    }
    Ok(())
}

impl ChainClient for HttpChain {
    fn request(&self, method: &str, params: Value) -> Result<Value> {
        read_only_guard(method)?;
        self.transport.request(method, params)
    }

    fn batch(&self, calls: &[(&str, Value)]) -> Result<Vec<Result<Value>>> {
        for (method, _) in calls {
            read_only_guard(method)?;
        }
        self.transport.batch(calls)
    }
}

/// Wallet endpoint for accounts and signing; contract reads still go to the
/// public node.
pub struct WalletChain {
    wallet: RpcTransport,
    reader: RpcTransport,
}

impl WalletChain {
    pub fn new(wallet_url: &str, http_url: &str) -> Result<Self> {
        Ok(WalletChain {
            wallet: RpcTransport::new(wallet_url, RPC_TIMEOUT)?,
            reader: RpcTransport::new(http_url, RPC_TIMEOUT)?,
        })
    }

    fn routes_to_wallet(method: &str) -> bool {
        SIGNING_METHODS.contains(&method) || WALLET_STATE_METHODS.contains(&method)
    }
}

impl ChainClient for WalletChain {
    fn request(&self, method: &str, params: Value) -> Result<Value> {
        if Self::routes_to_wallet(method) {
            self.wallet.request(method, params)
        } else {
            self.reader.request(method, params)
        }
    }

    fn batch(&self, calls: &[(&str, Value)]) -> Result<Vec<Result<Value>>> {
        if calls.iter().any(|(method, _)| Self::routes_to_wallet(method)) {
            return Ok(calls
                .iter()
                .map(|(method, params)| self.request(method, params.clone()))
                .collect());
        }
        self.reader.batch(calls)
    }

    fn can_sign(&self) -> bool {
        true
    }
}

/// Picks the backend once at startup.
pub fn from_config(config: &ClientConfig) -> Result<Box<dyn ChainClient>> {
    Ok(match &config.wallet_url {
        Some(wallet_url) => Box::new(WalletChain::new(wallet_url, &config.http_url)?),
        None => Box::new(HttpChain::new(&config.http_url)?),
    })
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::cell::RefCell;
    use std::collections::{HashMap, VecDeque};
    use unicorn_meat::abi::{encode, encode_call, Token};

    type CallKey = (Address, Vec<u8>);

    /// In-memory chain with canned `eth_call` answers.
    pub struct MockChain {
        pub signer: bool,
        pub chain_id: u64,
        pub gas_estimate: Option<U256>,
        pub gas_price: U256,
        pub receipt_success: bool,
        calls: HashMap<CallKey, Vec<u8>>,
        failures: RefCell<HashMap<CallKey, u32>>,
        transactions: HashMap<String, Value>,
        block_timestamps: HashMap<u64, u64>,
        accounts: RefCell<VecDeque<Vec<Address>>>,
        pub sent: RefCell<Vec<Value>>,
        pub call_count: RefCell<usize>,
    }

    impl MockChain {
        pub fn new() -> Self {
            MockChain {
                signer: true,
                chain_id: 1,
                gas_estimate: Some(U256::from(100_000u64)),
                gas_price: U256::from(20_000_000_000u64),
                receipt_success: true,
                calls: HashMap::new(),
                failures: RefCell::new(HashMap::new()),
                transactions: HashMap::new(),
                block_timestamps: HashMap::new(),
                accounts: RefCell::new(VecDeque::new()),
                sent: RefCell::new(Vec::new()),
                call_count: RefCell::new(0),
            }
        }

        pub fn on_call(&mut self, to: Address, signature: &str, args: &[Token], returns: &[Token]) {
            self.calls
                .insert((to, encode_call(signature, args)), encode(returns));
        }

        /// The next `times` identical calls fail with a network error.
        pub fn fail_call(&mut self, to: Address, signature: &str, args: &[Token], times: u32) {
            self.failures
                .borrow_mut()
                .insert((to, encode_call(signature, args)), times);
        }

        pub fn on_transaction(&mut self, hash: &str, from: Address, block: u64, timestamp: u64) {
            self.transactions.insert(
                hash.to_string(),
                json!({ "from": from, "blockNumber": format!("0x{:x}", block) }),
            );
            self.block_timestamps.insert(block, timestamp);
        }

        /// Successive `eth_accounts` answers; the last one repeats.
        pub fn push_accounts(&self, accounts: Vec<Address>) {
            self.accounts.borrow_mut().push_back(accounts);
        }

        pub fn sent_data(&self) -> Vec<Vec<u8>> {
            self.sent
                .borrow()
                .iter()
                .filter_map(|tx| tx["data"].as_str().and_then(|d| decode_hex(d).ok()))
                .collect()
        }

        fn answer_call(&self, params: &Value) -> Result<Value> {
            *self.call_count.borrow_mut() += 1;
            let to: Address = params[0]["to"].as_str().unwrap_or_default().parse()?;
            let data = decode_hex(params[0]["data"].as_str().unwrap_or("0x"))?;
            let key = (to, data);
            if let Some(remaining) = self.failures.borrow_mut().get_mut(&key) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(ErrorCode::NetworkError("connection reset".to_string()));
                }
            }
            self.calls
                .get(&key)
                .map(|data| json!(encode_hex(data)))
                .ok_or_else(|| ErrorCode::ContractRevert("execution reverted".to_string()))
        }

        fn next_accounts(&self) -> Value {
            let mut queue = self.accounts.borrow_mut();
            let current = if queue.len() > 1 {
                queue.pop_front().unwrap_or_default()
            } else {
                queue.front().cloned().unwrap_or_default()
            };
            json!(current)
        }
    }

    impl ChainClient for MockChain {
        fn request(&self, method: &str, params: Value) -> Result<Value> {
            match method {
                "eth_call" => self.answer_call(&params),
                "eth_sendTransaction" => {
                    if !self.signer {
                        read_only_guard(method)?;
                    }
                    let mut sent = self.sent.borrow_mut();
                    sent.push(params[0].clone());
                    Ok(json!(format!("0x{:064x}", sent.len())))
                }
                "eth_getTransactionReceipt" => Ok(json!({
                    "transactionHash": params[0],
                    "status": if self.receipt_success { "0x1" } else { "0x0" },
                    "blockNumber": "0x1",
                })),
                "eth_estimateGas" => self
                    .gas_estimate
                    .map(|gas| json!(gas.to_quantity()))
                    .ok_or_else(|| ErrorCode::ContractRevert("cannot estimate".to_string())),
                "eth_gasPrice" => Ok(json!(self.gas_price.to_quantity())),
                "eth_chainId" => Ok(json!(format!("0x{:x}", self.chain_id))),
                "eth_accounts" | "eth_requestAccounts" => Ok(self.next_accounts()),
                "eth_getTransactionByHash" => Ok(params[0]
                    .as_str()
                    .and_then(|hash| self.transactions.get(hash))
                    .cloned()
                    .unwrap_or(Value::Null)),
                "eth_getBlockByNumber" => {
                    let number = params[0]
                        .as_str()
                        .and_then(U256::from_quantity)
                        .map(|n| n.low_u64())
                        .unwrap_or_default();
                    Ok(self
                        .block_timestamps
                        .get(&number)
                        .map(|ts| json!({ "timestamp": format!("0x{:x}", ts) }))
                        .unwrap_or(Value::Null))
                }
                other => Err(ErrorCode::Rpc {
                    code: -32601,
                    message: format!("method {} not found", other),
                }),
            }
        }

        fn can_sign(&self) -> bool {
            self.signer
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockChain;
    use super::*;
    use unicorn_meat::abi::Token;

    #[test]
    fn read_only_node_refuses_to_sign() {
        assert!(matches!(
            read_only_guard("eth_sendTransaction"),
            Err(ErrorCode::InvalidInput(_))
        ));
        assert!(read_only_guard("eth_call").is_ok());
    }

    #[test]
    fn typed_helpers_decode_results() {
        let mut chain = MockChain::new();
        let token = Address([9; 20]);
        chain.on_call(token, "totalSupply()", &[], &[Token::Uint(U256::from(5u64))]);
        let data = unicorn_meat::abi::encode_call("totalSupply()", &[]);
        let out = chain.call(&token, &data).unwrap();
        assert_eq!(U256::from_word(&out), U256::from(5u64));
        assert_eq!(chain.chain_id().unwrap(), 1);
        assert_eq!(chain.gas_price().unwrap(), U256::from(20_000_000_000u64));
    }

    #[test]
    fn transaction_lookup_tolerates_unknown_hashes() {
        let mut chain = MockChain::new();
        chain.on_transaction("0xaa", Address([4; 20]), 100, 1_460_000_000);
        let info = chain.transaction_by_hash("0xaa").unwrap().unwrap();
        assert_eq!(info.from, Address([4; 20]));
        assert_eq!(info.block_number, Some(100));
        assert_eq!(chain.block_timestamp(100).unwrap(), 1_460_000_000);
        assert_eq!(chain.transaction_by_hash("0xbb").unwrap(), None);
    }
}
