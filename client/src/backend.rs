//! REST client for the claim backend.

use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use unicorn_meat::error::{ErrorCode, Result};
use unicorn_meat::states::{parse_merkle_proof, ClaimEligibility};
use unicorn_meat::utils::{Address, U256};

/// Amounts arrive as JSON numbers or decimal strings, in smallest units.
fn amount(value: &Value) -> Result<U256> {
    match value {
        Value::Null => Ok(U256::zero()),
        Value::Number(number) => number
            .as_u64()
            .map(U256::from)
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0)
                    .map(|f| U256::from(f.trunc() as u64))
            })
            .ok_or_else(|| ErrorCode::Decode(format!("bad amount {}", number))),
        Value::String(text) => U256::from_dec_str(text.trim())
            .map_err(|_| ErrorCode::Decode(format!("bad amount `{}`", text))),
        other => Err(ErrorCode::Decode(format!("bad amount {}", other))),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    body: serde_json::Map<String, Value>,
}

impl Envelope {
    fn into_body(self) -> Result<serde_json::Map<String, Value>> {
        if !self.success {
            return Err(ErrorCode::InvalidInput(
                self.error
                    .unwrap_or_else(|| "claim backend reported failure".to_string()),
            ));
        }
        Ok(self.body)
    }
}

/// Airdrop progress counters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClaimStats {
    pub total_allocated: U256,
    pub total_claimed: U256,
    pub remaining_allocated: U256,
}

impl ClaimStats {
    /// Claimed share with one decimal, e.g. `12.5`.
    pub fn claimed_percent(&self) -> String {
        if self.total_allocated.is_zero() {
            return "0.0".to_string();
        }
        let tenths = self
            .total_claimed
            .checked_mul(U256::from(1000u64))
            .and_then(|scaled| scaled.checked_add(self.total_allocated / U256::from(2u64)))
            .map(|scaled| scaled / self.total_allocated);
        match tenths {
            Some(tenths) => {
                let ten = U256::from(10u64);
                format!("{}.{}", tenths / ten, tenths % ten)
            }
            None => "0.0".to_string(),
        }
    }
}

fn field<'a>(body: &'a serde_json::Map<String, Value>, name: &str) -> &'a Value {
    body.get(name).unwrap_or(&Value::Null)
}

pub fn parse_claim_stats(json: Value) -> Result<ClaimStats> {
    let body = serde_json::from_value::<Envelope>(json)
        .map_err(|e| ErrorCode::Decode(e.to_string()))?
        .into_body()?;
    let stats = field(&body, "stats");
    let get = |name: &str| amount(stats.get(name).unwrap_or(&Value::Null));
    Ok(ClaimStats {
        total_allocated: get("totalAllocated")?,
        total_claimed: get("totalClaimed")?,
        remaining_allocated: get("remainingAllocated")?,
    })
}

pub fn parse_claim_status(json: Value) -> Result<bool> {
    let body = serde_json::from_value::<Envelope>(json)
        .map_err(|e| ErrorCode::Decode(e.to_string()))?
        .into_body()?;
    Ok(field(&body, "claimEnabled").as_bool().unwrap_or(false))
}

pub fn parse_check_claim(json: Value) -> Result<ClaimEligibility> {
    let body = serde_json::from_value::<Envelope>(json)
        .map_err(|e| ErrorCode::Decode(e.to_string()))?
        .into_body()?;
    let proof: Vec<String> = match field(&body, "merkleProof") {
        Value::Null => Vec::new(),
        nodes => serde_json::from_value(nodes.clone())
            .map_err(|e| ErrorCode::Decode(format!("bad merkle proof: {}", e)))?,
    };
    Ok(ClaimEligibility {
        claimable_amount: amount(field(&body, "claimableAmount"))?,
        has_claimed: field(&body, "hasClaimed").as_bool().unwrap_or(false),
        merkle_proof: parse_merkle_proof(&proof)?,
    })
}

/// Balance endpoints answer `{ "balance": ... }` and degrade to zero.
pub fn parse_balance(json: &Value) -> U256 {
    json.get("balance")
        .and_then(|balance| amount(balance).ok())
        .unwrap_or_default()
}

pub struct ClaimApi {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl ClaimApi {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ErrorCode::NetworkError(e.to_string()))?;
        Ok(ClaimApi {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn get(&self, path: &str) -> Result<Value> {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.json::<Value>())
            .map_err(|e| ErrorCode::NetworkError(e.to_string()))
    }

    pub fn claim_stats(&self) -> Result<ClaimStats> {
        parse_claim_stats(self.get("/api/claim-stats")?)
    }

    /// Whether claims are currently open.
    pub fn claim_status(&self) -> Result<bool> {
        parse_claim_status(self.get("/api/claim-status")?)
    }

    pub fn check_claim(&self, account: &Address) -> Result<ClaimEligibility> {
        parse_check_claim(self.get(&format!("/api/check-claim/{}", account))?)
    }

    pub fn meat_balance(&self, account: &Address) -> U256 {
        self.get(&format!("/api/balance/unicorn-meat/{}", account))
            .map(|json| parse_balance(&json))
            .unwrap_or_default()
    }

    pub fn wrapped_balance(&self, account: &Address) -> U256 {
        self.get(&format!("/api/balance/wrapped/{}", account))
            .map(|json| parse_balance(&json))
            .unwrap_or_default()
    }
}
