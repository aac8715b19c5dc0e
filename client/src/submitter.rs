//! State-changing flows: local checks, wallet submission, confirmation.

use crate::chain::ChainClient;
use crate::instructions::claim_instructions::claim_instr;
use crate::instructions::dao_instructions::{new_proposal_instr, vote_instr};
use crate::instructions::rpc::{send_txn, ConfirmPolicy, TxRequest};
use crate::instructions::steak_instructions::{approve_steak_instr, steak_instr, unsteak_instr};
use crate::instructions::token_instructions::{unwrap_instr, wrap_instr};
use crate::instructions::utils::{ensure_positive, gas_with_buffer};
use crate::reader::ContractReader;
use crate::session::WalletSession;
use crate::ClientConfig;
use unicorn_meat::error::{ErrorCode, Result};
use unicorn_meat::states::ClaimEligibility;
use unicorn_meat::utils::{format_token_amount, Address, U256};
use unicorn_meat::{CLAIM_GAS_FALLBACK, MEAT_DECIMALS};

/// A mined transaction and what it did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxOutcome {
    pub action: &'static str,
    pub hash: String,
}

pub struct Submitter<'a, C: ChainClient + ?Sized> {
    chain: &'a C,
    config: &'a ClientConfig,
    session: &'a WalletSession,
    reader: ContractReader<'a, C>,
    confirm: ConfirmPolicy,
}

impl<'a, C: ChainClient + ?Sized> Submitter<'a, C> {
    pub fn new(chain: &'a C, config: &'a ClientConfig, session: &'a WalletSession) -> Self {
        Submitter {
            chain,
            config,
            session,
            reader: ContractReader::new(chain, &config.contracts, config.retry),
            confirm: config.confirm,
        }
    }

    fn account(&self) -> &Address {
        self.session.account()
    }

    fn submit(&self, action: &'static str, tx: &TxRequest) -> Result<TxOutcome> {
        let hash = send_txn(self.chain, self.session, tx, Some(&self.confirm))?;
        Ok(TxOutcome { action, hash })
    }

    fn require_balance(&self, token: &Address, amount: U256, what: &str) -> Result<()> {
        let balance = self.reader.fetch_token_balance(token, self.account())?;
        if balance < amount {
            return Err(ErrorCode::InvalidInput(format!(
                "Insufficient balance. You have {} {}, but need {}",
                format_token_amount(balance, MEAT_DECIMALS),
                what,
                format_token_amount(amount, MEAT_DECIMALS)
            )));
        }
        Ok(())
    }

    /// DAO participation is limited to Unicorn holders.
    fn require_unicorn(&self, action: &str) -> Result<()> {
        let unicorns = self
            .reader
            .fetch_token_balance(&self.config.contracts.unicorns, self.account())?;
        if unicorns.is_zero() {
            return Err(ErrorCode::InvalidInput(format!(
                "You need to hold Unicorn tokens to {}",
                action
            )));
        }
        Ok(())
    }

    /// Approves Proof of Steak first when the allowance falls short.
    pub fn steak(&self, amount: U256) -> Result<Vec<TxOutcome>> {
        ensure_positive(amount, "steak amount")?;
        let contracts = &self.config.contracts;
        self.require_balance(&contracts.wrapped_meat, amount, "w🍖")?;

        let mut outcomes = Vec::new();
        let allowance = self.reader.fetch_allowance(
            &contracts.wrapped_meat,
            self.account(),
            &contracts.proof_of_steak,
        )?;
        if allowance < amount {
            outcomes.push(self.submit("approve", &approve_steak_instr(self.config, amount)?)?);
        }
        outcomes.push(self.submit("steak", &steak_instr(self.config, amount)?)?);
        Ok(outcomes)
    }

    pub fn unsteak(&self) -> Result<TxOutcome> {
        let record = self.reader.fetch_stake_record(self.account())?;
        if !record.has_stake() {
            return Err(ErrorCode::InvalidInput("Nothing is steaked".to_string()));
        }
        self.submit("unsteak", &unsteak_instr(self.config))
    }

    pub fn vote(&self, proposal_id: u64, supports: bool) -> Result<TxOutcome> {
        self.require_unicorn("vote")?;
        self.submit("vote", &vote_instr(self.config, proposal_id, supports))
    }

    pub fn new_proposal(
        &self,
        beneficiary: Address,
        ether_amount: U256,
        description: &str,
        bytecode: &str,
        bribe: U256,
    ) -> Result<TxOutcome> {
        let tx = new_proposal_instr(
            self.config,
            beneficiary,
            ether_amount,
            description,
            bytecode,
            bribe,
        )?;
        self.require_unicorn("create proposals")?;
        self.submit("new proposal", &tx)
    }

    /// Execution needs the exact bytecode the proposal was created with, so
    /// nothing is submitted; the returned text explains what is required.
    pub fn execute_proposal(&self, proposal_id: u64) -> Result<String> {
        let proposal = self.reader.fetch_proposal(proposal_id)?;
        if !proposal.awaits_execution() {
            return Err(ErrorCode::InvalidInput(format!(
                "Proposal #{} is not awaiting execution",
                proposal_id
            )));
        }
        Ok(format!(
            "Proposal #{} passed and can be executed by calling \
             executeProposal({}, bytecode) on {} with the transaction bytecode \
             it was created with (hash 0x{}).",
            proposal_id,
            proposal_id,
            self.config.contracts.dao,
            hex::encode(proposal.proposal_hash)
        ))
    }

    pub fn wrap(&self, amount: U256) -> Result<TxOutcome> {
        let tx = wrap_instr(self.config, amount)?;
        self.require_balance(&self.config.contracts.meat, amount, "Unicorn Meat")?;
        self.submit("wrap", &tx)
    }

    pub fn unwrap(&self, amount: U256) -> Result<TxOutcome> {
        self.submit("unwrap", &unwrap_instr(self.config, amount)?)
    }

    /// Claims the airdrop with the backend's proof.
    ///
    /// The contract's own view of the amount wins over the backend's; a
    /// failed verification keeps the backend amount.
    pub fn claim(&self, eligibility: &ClaimEligibility) -> Result<TxOutcome> {
        if !eligibility.is_claimable() {
            return Err(ErrorCode::InvalidInput(
                "This address has nothing to claim".to_string(),
            ));
        }
        if self.reader.fetch_has_claimed(self.account())? {
            return Err(ErrorCode::InvalidInput(
                "This address has already claimed".to_string(),
            ));
        }
        let amount = self
            .reader
            .fetch_claimable_amount(
                self.account(),
                eligibility.claimable_amount,
                &eligibility.merkle_proof,
            )
            .unwrap_or(eligibility.claimable_amount);

        let mut tx = claim_instr(self.config, *self.account(), amount, &eligibility.merkle_proof);
        let estimate = self
            .chain
            .estimate_gas(self.account(), &tx)
            .unwrap_or_else(|_| U256::from(CLAIM_GAS_FALLBACK));
        tx.gas = Some(gas_with_buffer(estimate));
        tx.gas_price = Some(self.config.retry.run(|| self.chain.gas_price())?);
        self.submit("claim", &tx)
    }
}
