//! Read-only views over the fixed contracts.

use crate::chain::{ChainClient, TransactionInfo};
use crate::instructions::claim_instructions::{
    claimable_amount_call, claimed_amount_call, has_claimed_call,
};
use crate::instructions::rpc::RetryPolicy;
use crate::instructions::utils::{
    addr_call, balance_of_call, name_call, namehash, resolver_call, reverse_node,
};
use crate::Contracts;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};
use unicorn_meat::abi::{encode_call, Decoder, Token};
use unicorn_meat::error::{ErrorCode, Result};
use unicorn_meat::states::{
    tally_kills, DaoInfo, KillerEntry, PoolState, ProposalRecord, StakeRecord, StakeSnapshot,
    PROPOSALS_SIGNATURE, STEAKS_SIGNATURE,
};
use unicorn_meat::utils::{Address, U256};
use unicorn_meat::ALLOWANCE_SIGNATURE;

pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

/// Token balances shown on the wallet panel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Balances {
    pub meat: U256,
    pub wrapped_meat: U256,
    pub unicorns: U256,
    pub wrapped_unicorns: U256,
    /// Tokens whose balance could not be read and is shown as zero.
    pub unavailable: Vec<&'static str>,
}

pub struct ContractReader<'a, C: ChainClient + ?Sized> {
    chain: &'a C,
    contracts: &'a Contracts,
    retry: RetryPolicy,
}

impl<'a, C: ChainClient + ?Sized> ContractReader<'a, C> {
    pub fn new(chain: &'a C, contracts: &'a Contracts, retry: RetryPolicy) -> Self {
        ContractReader {
            chain,
            contracts,
            retry,
        }
    }

    fn call(&self, to: &Address, data: &[u8]) -> Result<Vec<u8>> {
        self.retry.run(|| self.chain.call(to, data))
    }

    /// Batched getters on one contract; any failure fails the whole read.
    fn call_getters(&self, to: &Address, getters: &[&str]) -> Result<Vec<Vec<u8>>> {
        let calls: Vec<(Address, Vec<u8>)> = getters
            .iter()
            .map(|getter| (*to, encode_call(getter, &[])))
            .collect();
        self.retry
            .run(|| self.chain.call_batch(&calls))?
            .into_iter()
            .collect()
    }

    pub fn fetch_stake_record(&self, owner: &Address) -> Result<StakeRecord> {
        let data = encode_call(STEAKS_SIGNATURE, &[Token::Address(*owner)]);
        StakeRecord::decode(&self.call(&self.contracts.proof_of_steak, &data)?)
    }

    pub fn fetch_pool_state(&self) -> Result<PoolState> {
        let returns = self.call_getters(&self.contracts.proof_of_steak, &PoolState::GETTERS)?;
        PoolState::from_returns(&returns)
    }

    pub fn fetch_stake_snapshot(&self, owner: &Address) -> Result<StakeSnapshot> {
        self.fetch_stake_snapshot_at(owner, unix_now())
    }

    pub fn fetch_stake_snapshot_at(&self, owner: &Address, now: u64) -> Result<StakeSnapshot> {
        Ok(StakeSnapshot {
            record: self.fetch_stake_record(owner)?,
            pool: self.fetch_pool_state()?,
            now,
        })
    }

    pub fn fetch_dao_info(&self) -> Result<DaoInfo> {
        let returns = self.call_getters(&self.contracts.dao, &DaoInfo::GETTERS)?;
        DaoInfo::from_returns(&returns)
    }

    fn proposal_call(index: u64) -> Vec<u8> {
        encode_call(PROPOSALS_SIGNATURE, &[Token::Uint(U256::from(index))])
    }

    pub fn fetch_proposal(&self, index: u64) -> Result<ProposalRecord> {
        ProposalRecord::decode(&self.call(&self.contracts.dao, &Self::proposal_call(index))?)
    }

    /// All-settled read of proposals `0..count`: the batch goes out once,
    /// failed indices are retried one by one, and whatever still fails is
    /// reported in place.
    pub fn fetch_proposals(&self, count: u64) -> Vec<Result<ProposalRecord>> {
        let calls: Vec<(Address, Vec<u8>)> = (0..count)
            .map(|index| (self.contracts.dao, Self::proposal_call(index)))
            .collect();
        let settled = match self.chain.call_batch(&calls) {
            Ok(results) => results,
            Err(err) => vec![Err(err); calls.len()],
        };
        settled
            .into_iter()
            .enumerate()
            .map(|(index, result)| {
                result
                    .and_then(|data| ProposalRecord::decode(&data))
                    .or_else(|_| self.fetch_proposal(index as u64))
            })
            .collect()
    }

    fn fetch_transactions(&self, hashes: &[&str]) -> Vec<Option<TransactionInfo>> {
        let requests: Vec<(&str, Value)> = hashes
            .iter()
            .map(|hash| ("eth_getTransactionByHash", json!([hash])))
            .collect();
        match self.retry.run(|| self.chain.batch(&requests)) {
            Ok(results) => results
                .into_iter()
                .map(|result| {
                    result
                        .and_then(|value| TransactionInfo::from_json(&value))
                        .ok()
                        .flatten()
                })
                .collect(),
            Err(_) => vec![None; hashes.len()],
        }
    }

    /// Sender of each proposal-creating transaction, `None` where unknown.
    pub fn fetch_proposers(&self, hashes: &[&str]) -> Vec<Option<Address>> {
        self.fetch_transactions(hashes)
            .into_iter()
            .map(|tx| tx.map(|tx| tx.from))
            .collect()
    }

    /// Leaderboard of grind transactions; unreadable transactions are skipped.
    pub fn fetch_hall_of_fame(&self, hashes: &[&str]) -> Vec<KillerEntry> {
        let mut timestamps: HashMap<u64, Option<u64>> = HashMap::new();
        let mut events = Vec::new();
        for tx in self.fetch_transactions(hashes).into_iter().flatten() {
            let Some(block) = tx.block_number else {
                continue;
            };
            let timestamp = *timestamps
                .entry(block)
                .or_insert_with(|| self.retry.run(|| self.chain.block_timestamp(block)).ok());
            if let Some(timestamp) = timestamp {
                events.push((tx.from, timestamp));
            }
        }
        tally_kills(events)
    }

    pub fn fetch_token_balance(&self, token: &Address, owner: &Address) -> Result<U256> {
        Decoder::new(&self.call(token, &balance_of_call(owner))?).uint()
    }

    pub fn fetch_allowance(
        &self,
        token: &Address,
        owner: &Address,
        spender: &Address,
    ) -> Result<U256> {
        let data = encode_call(
            ALLOWANCE_SIGNATURE,
            &[Token::Address(*owner), Token::Address(*spender)],
        );
        Decoder::new(&self.call(token, &data)?).uint()
    }

    /// Balances of the four tokens; each failed read degrades to zero.
    pub fn fetch_balances(&self, owner: &Address) -> Balances {
        let tokens: [(&'static str, Address); 4] = [
            ("Unicorn Meat", self.contracts.meat),
            ("Wrapped Unicorn Meat", self.contracts.wrapped_meat),
            ("Unicorns", self.contracts.unicorns),
            ("Wrapped Unicorns", self.contracts.wrapped_unicorns),
        ];
        let calls: Vec<(Address, Vec<u8>)> = tokens
            .iter()
            .map(|(_, token)| (*token, balance_of_call(owner)))
            .collect();
        let results = self
            .retry
            .run(|| self.chain.call_batch(&calls))
            .unwrap_or_else(|err| vec![Err(err); calls.len()]);

        let mut balances = Balances::default();
        let mut values = Vec::with_capacity(tokens.len());
        for ((label, _), result) in tokens.iter().zip(results) {
            match result.and_then(|data| Decoder::new(&data).uint()) {
                Ok(value) => values.push(value),
                Err(_) => {
                    balances.unavailable.push(*label);
                    values.push(U256::zero());
                }
            }
        }
        balances.meat = values[0];
        balances.wrapped_meat = values[1];
        balances.unicorns = values[2];
        balances.wrapped_unicorns = values[3];
        balances
    }

    pub fn fetch_has_claimed(&self, account: &Address) -> Result<bool> {
        Decoder::new(&self.call(&self.contracts.merkle_claim, &has_claimed_call(*account))?).bool()
    }

    pub fn fetch_claimed_amount(&self, account: &Address) -> Result<U256> {
        let data = claimed_amount_call(*account);
        Decoder::new(&self.call(&self.contracts.merkle_claim, &data)?).uint()
    }

    /// What the claim contract itself would pay for this proof.
    pub fn fetch_claimable_amount(
        &self,
        account: &Address,
        amount: U256,
        proof: &[[u8; 32]],
    ) -> Result<U256> {
        let data = claimable_amount_call(*account, amount, proof);
        Decoder::new(&self.call(&self.contracts.merkle_claim, &data)?).uint()
    }

    fn resolver_of(&self, node: [u8; 32]) -> Result<Address> {
        let data = self.call(&self.contracts.ens_registry, &resolver_call(node))?;
        let resolver = Decoder::new(&data).address()?;
        if resolver.is_zero() {
            return Err(ErrorCode::ContractRevert("no resolver".to_string()));
        }
        Ok(resolver)
    }

    fn reverse_lookup(&self, address: &Address) -> Result<String> {
        let node = reverse_node(address);
        let resolver = self.resolver_of(node)?;
        let name = Decoder::new(&self.call(&resolver, &name_call(node))?).string()?;
        if name.is_empty() {
            return Err(ErrorCode::ContractRevert("no reverse record".to_string()));
        }
        let forward = namehash(&name);
        let forward_resolver = self.resolver_of(forward)?;
        let resolved = Decoder::new(&self.call(&forward_resolver, &addr_call(forward))?).address()?;
        if resolved != *address {
            return Err(ErrorCode::ContractRevert(format!("{} does not resolve back", name)));
        }
        Ok(name)
    }

    /// Verified primary ENS name; any failure is simply no name.
    pub fn lookup_address(&self, address: &Address) -> Option<String> {
        self.reverse_lookup(address).ok()
    }
}
