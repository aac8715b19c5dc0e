//! The connected wallet account, passed explicitly to everything that signs.

use crate::chain::ChainClient;
use crate::instructions::rpc::RetryPolicy;
use std::thread;
use std::time::Duration;
use unicorn_meat::error::{ErrorCode, Result};
use unicorn_meat::utils::Address;

pub const MAINNET_CHAIN_ID: u64 = 1;

/// Immutable; an account switch produces a new session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalletSession {
    account: Address,
    chain_id: u64,
}

impl WalletSession {
    pub fn new(account: Address, chain_id: u64) -> Self {
        WalletSession { account, chain_id }
    }

    /// Asks the wallet for its accounts and uses the first one.
    pub fn connect<C: ChainClient + ?Sized>(chain: &C) -> Result<Self> {
        if !chain.can_sign() {
            return Err(ErrorCode::InvalidInput(
                "no wallet configured; set wallet_url in client_config.ini".to_string(),
            ));
        }
        let account = chain
            .request_accounts()?
            .into_iter()
            .next()
            .ok_or_else(|| ErrorCode::UserRejection("wallet exposed no accounts".to_string()))?;
        let chain_id = RetryPolicy::default().run(|| chain.chain_id())?;
        Ok(WalletSession::new(account, chain_id))
    }

    pub fn account(&self) -> &Address {
        &self.account
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn is_mainnet(&self) -> bool {
        self.chain_id == MAINNET_CHAIN_ID
    }
}

/// Polls `eth_accounts` and calls `on_change` whenever the selected account
/// changes; `None` means the wallet disconnected.
///
/// Runs `polls` times, or forever when `polls` is `None`.
pub fn watch_accounts<C, F>(
    chain: &C,
    initial: Option<WalletSession>,
    interval: Duration,
    polls: Option<usize>,
    mut on_change: F,
) -> Result<Option<WalletSession>>
where
    C: ChainClient + ?Sized,
    F: FnMut(Option<&WalletSession>),
{
    let retry = RetryPolicy::default();
    let mut current = initial;
    let mut round = 0usize;
    while polls.map_or(true, |limit| round < limit) {
        if round > 0 {
            thread::sleep(interval);
        }
        round += 1;
        let selected = retry.run(|| chain.accounts())?.into_iter().next();
        if selected == current.as_ref().map(|session| session.account) {
            continue;
        }
        current = match selected {
            Some(account) => Some(WalletSession::new(account, retry.run(|| chain.chain_id())?)),
            None => None,
        };
        on_change(current.as_ref());
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::mock::MockChain;

    #[test]
    fn connect_takes_the_first_account() {
        let chain = MockChain::new();
        chain.push_accounts(vec![Address([1; 20]), Address([2; 20])]);
        let session = WalletSession::connect(&chain).unwrap();
        assert_eq!(session.account(), &Address([1; 20]));
        assert!(session.is_mainnet());
    }

    #[test]
    fn connect_needs_a_signing_backend() {
        let mut chain = MockChain::new();
        chain.signer = false;
        assert!(matches!(WalletSession::connect(&chain), Err(ErrorCode::InvalidInput(_))));
    }

    #[test]
    fn watch_reports_each_switch_once() {
        let chain = MockChain::new();
        let first = Address([1; 20]);
        let second = Address([2; 20]);
        chain.push_accounts(vec![first]);
        chain.push_accounts(vec![first]);
        chain.push_accounts(vec![second]);
        chain.push_accounts(vec![]);

        let mut seen = Vec::new();
        let last = watch_accounts(
            &chain,
            Some(WalletSession::new(first, 1)),
            Duration::ZERO,
            Some(5),
            |session| seen.push(session.map(|s| *s.account())),
        )
        .unwrap();
        assert_eq!(seen, vec![Some(second), None]);
        assert_eq!(last, None);
    }
}
