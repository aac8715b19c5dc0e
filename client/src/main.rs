use anyhow::{format_err, Result};
use clap::Parser;
use colorful::{Color, Colorful};
use configparser::ini::Ini;
use std::str::FromStr;
use std::time::Duration;
use unicorn_meat::curve::RewardEstimator;
use unicorn_meat::utils::{parse_units, Address, U256};
use unicorn_meat::{
    ETHER_DECIMALS, GRIND_TX_HASHES, MEAT_DECIMALS, PROPOSAL_TX_HASHES, VOTE_BRIBE_WEI,
};

mod backend;
mod chain;
mod instructions;
mod reader;
mod render;
mod session;
mod submitter;

use backend::ClaimApi;
use chain::ChainClient;
use instructions::rpc::{ConfirmPolicy, RetryPolicy};
use instructions::utils::parse_positive_amount;
use reader::{unix_now, ContractReader};
use render::*;
use session::{watch_accounts, WalletSession};
use submitter::{Submitter, TxOutcome};

/// Addresses of every contract the client talks to.
#[derive(Clone, Debug, PartialEq)]
pub struct Contracts {
    pub proof_of_steak: Address,
    pub wrapped_meat: Address,
    pub meat: Address,
    pub dao: Address,
    pub unicorns: Address,
    pub wrapped_unicorns: Address,
    pub merkle_claim: Address,
    pub ens_registry: Address,
}

impl Default for Contracts {
    fn default() -> Self {
        Contracts {
            proof_of_steak: unicorn_meat::proof_of_steak::id(),
            wrapped_meat: unicorn_meat::wrapped_unicorn_meat::id(),
            meat: unicorn_meat::unicorn_meat::id(),
            dao: unicorn_meat::grinder_association::id(),
            unicorns: unicorn_meat::unicorns::id(),
            wrapped_unicorns: unicorn_meat::wrapped_unicorns::id(),
            merkle_claim: unicorn_meat::merkle_claim::id(),
            ens_registry: unicorn_meat::ens_registry::id(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub http_url: String,
    pub wallet_url: Option<String>,
    pub api_url: Option<String>,
    pub contracts: Contracts,
    pub retry: RetryPolicy,
    pub confirm: ConfirmPolicy,
}

impl ClientConfig {
    pub fn new(http_url: &str) -> Self {
        ClientConfig {
            http_url: http_url.to_string(),
            wallet_url: None,
            api_url: None,
            contracts: Contracts::default(),
            retry: RetryPolicy::default(),
            confirm: ConfirmPolicy::default(),
        }
    }
}

fn optional(config: &Ini, key: &str) -> Option<String> {
    config
        .get("Global", key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn address_override(config: &Ini, key: &str, default: Address) -> Result<Address> {
    match optional(config, key) {
        Some(value) => Address::from_str(&value).map_err(|e| format_err!("{}: {}", key, e)),
        None => Ok(default),
    }
}

fn number_override(config: &Ini, key: &str, default: u64) -> Result<u64> {
    match optional(config, key) {
        Some(value) => value
            .parse()
            .map_err(|e| format_err!("{} must be a number: {}", key, e)),
        None => Ok(default),
    }
}

fn parse_cfg(config: &Ini) -> Result<ClientConfig> {
    let http_url =
        optional(config, "http_url").ok_or_else(|| format_err!("http_url must not be empty"))?;

    let defaults = Contracts::default();
    let contracts = Contracts {
        proof_of_steak: address_override(config, "steak_contract", defaults.proof_of_steak)?,
        wrapped_meat: address_override(config, "wrapped_meat_contract", defaults.wrapped_meat)?,
        meat: address_override(config, "meat_contract", defaults.meat)?,
        dao: address_override(config, "dao_contract", defaults.dao)?,
        unicorns: address_override(config, "unicorns_contract", defaults.unicorns)?,
        wrapped_unicorns: address_override(
            config,
            "wrapped_unicorns_contract",
            defaults.wrapped_unicorns,
        )?,
        merkle_claim: address_override(config, "claim_contract", defaults.merkle_claim)?,
        ens_registry: address_override(config, "ens_registry", defaults.ens_registry)?,
    };

    let retry_defaults = RetryPolicy::default();
    let retry = RetryPolicy {
        attempts: number_override(config, "retry_attempts", retry_defaults.attempts as u64)?
            .clamp(1, u32::MAX as u64) as u32,
        base_delay: Duration::from_millis(number_override(
            config,
            "retry_delay_ms",
            retry_defaults.base_delay.as_millis() as u64,
        )?),
    };
    let confirm = ConfirmPolicy {
        max_wait: Duration::from_secs(number_override(
            config,
            "confirm_timeout_secs",
            ConfirmPolicy::default().max_wait.as_secs(),
        )?),
        ..ConfirmPolicy::default()
    };

    Ok(ClientConfig {
        http_url,
        wallet_url: optional(config, "wallet_url"),
        api_url: optional(config, "api_url"),
        contracts,
        retry,
        confirm,
    })
}

fn load_cfg(client_config: &str) -> Result<ClientConfig> {
    let mut config = Ini::new();
    config
        .load(client_config)
        .map_err(|e| format_err!("failed to read {}: {}", client_config, e))?;
    parse_cfg(&config)
}

#[derive(Debug, Parser)]
pub struct Opts {
    /// Path of the INI configuration file.
    #[arg(long, default_value = "client_config.ini")]
    pub config: String,
    #[clap(subcommand)]
    pub command: UnicornMeatCommands,
}

#[derive(Debug, Parser)]
pub enum UnicornMeatCommands {
    /// Season status, pool totals and countdown.
    Season {},
    /// Stake, pool share and reward estimate for an account.
    Stats {
        #[arg(long)]
        address: Option<Address>,
    },
    Steak {
        #[arg(long)]
        amount: String,
    },
    Unsteak {},
    Dao {},
    Proposals {},
    Vote {
        #[arg(long)]
        proposal: u64,
        #[arg(long)]
        supports: bool,
    },
    NewProposal {
        #[arg(long)]
        beneficiary: Address,
        /// Ether to send to the beneficiary, in ETH.
        #[arg(long)]
        ether_amount: String,
        #[arg(long)]
        description: String,
        #[arg(long, default_value = "0x")]
        bytecode: String,
        /// Bribe in ETH sent along with the proposal.
        #[arg(long)]
        bribe: Option<String>,
    },
    Execute {
        #[arg(long)]
        proposal: u64,
    },
    HallOfFame {},
    Balances {
        #[arg(long)]
        address: Option<Address>,
    },
    Wrap {
        #[arg(long)]
        amount: String,
    },
    Unwrap {
        #[arg(long)]
        amount: String,
    },
    CheckClaim {
        #[arg(long)]
        address: Option<Address>,
    },
    Claim {},
    ClaimStats {},
    /// Reverse ENS lookup.
    Lookup {
        #[arg(long)]
        address: Address,
    },
    /// Report wallet account switches until interrupted.
    Watch {
        #[arg(long, default_value_t = 2)]
        interval_secs: u64,
    },
}

fn claim_api(config: &ClientConfig) -> Result<ClaimApi> {
    let api_url = config
        .api_url
        .as_deref()
        .ok_or_else(|| format_err!("api_url must be set in the config for claim commands"))?;
    Ok(ClaimApi::new(api_url)?)
}

/// Explicit `--address`, else the connected wallet account.
fn target_account(chain: &dyn ChainClient, address: Option<Address>) -> Result<Address> {
    match address {
        Some(address) => Ok(address),
        None => Ok(*WalletSession::connect(chain)?.account()),
    }
}

fn connect(chain: &dyn ChainClient) -> Result<WalletSession> {
    let session = WalletSession::connect(chain)?;
    if !session.is_mainnet() {
        print_warning(&format!(
            "wallet is on chain {}, the contracts live on mainnet",
            session.chain_id()
        ));
    }
    println!("Connected as {}", session.account());
    Ok(session)
}

fn show_stats(
    reader: &ContractReader<'_, dyn ChainClient>,
    config: &ClientConfig,
    account: &Address,
) {
    let snapshot = match reader.fetch_stake_snapshot(account) {
        Ok(snapshot) => snapshot,
        Err(err) => {
            print_warning(&format!("stake data unavailable: {}", err));
            return;
        }
    };
    let estimate = RewardEstimator::estimate_snapshot(Some(&snapshot));
    let wallet_balance = reader
        .fetch_token_balance(&config.contracts.wrapped_meat, account)
        .ok();
    print_rows(
        "Season",
        &season_rows(&snapshot.pool, snapshot.now),
    );
    print_rows(
        &format!("Stake of {}", account),
        &stake_rows(&snapshot.record, &estimate, wallet_balance),
    );
}

fn show_balances(
    reader: &ContractReader<'_, dyn ChainClient>,
    config: &ClientConfig,
    account: &Address,
) {
    let mut balances = reader.fetch_balances(account);
    if let Some(api) = config.api_url.as_deref().and_then(|url| ClaimApi::new(url).ok()) {
        if balances.unavailable.contains(&"Unicorn Meat") {
            balances.meat = api.meat_balance(account);
            balances.unavailable.retain(|label| *label != "Unicorn Meat");
        }
        if balances.unavailable.contains(&"Wrapped Unicorn Meat") {
            balances.wrapped_meat = api.wrapped_balance(account);
            balances.unavailable.retain(|label| *label != "Wrapped Unicorn Meat");
        }
    }
    print_rows(&format!("Balances of {}", account), &balance_rows(&balances));
}

fn show_proposals(reader: &ContractReader<'_, dyn ChainClient>) -> Result<()> {
    let info = reader.fetch_dao_info()?;
    let now = unix_now();
    let proposers = reader.fetch_proposers(&PROPOSAL_TX_HASHES);
    for (index, result) in reader.fetch_proposals(info.num_proposals).into_iter().enumerate() {
        let proposal = match result {
            Ok(proposal) => proposal,
            Err(err) => {
                print_warning(&format!("proposal #{} unavailable: {}", index, err));
                continue;
            }
        };
        let proposer = proposers.get(index).copied().flatten().map(|address| {
            let name = reader.lookup_address(&address);
            (address, name)
        });
        let view = ProposalView {
            index: index as u64,
            recipient_name: reader.lookup_address(&proposal.recipient),
            proposal: &proposal,
            proposer,
            tx_hash: PROPOSAL_TX_HASHES.get(index).copied(),
        };
        print_proposal(&view, now);
    }
    Ok(())
}

fn show_eligibility(
    reader: &ContractReader<'_, dyn ChainClient>,
    config: &ClientConfig,
    account: &Address,
) -> Result<()> {
    let api = claim_api(config)?;
    let mut eligibility = api.check_claim(account)?;
    // The contract is authoritative for the claimed flag.
    if let Ok(claimed) = reader.fetch_has_claimed(account) {
        eligibility.has_claimed = claimed;
    }
    let claimed_amount = if eligibility.has_claimed {
        reader.fetch_claimed_amount(account).ok()
    } else {
        None
    };
    print_rows(
        &format!("Claim for {}", account),
        &eligibility_rows(&eligibility, claimed_amount),
    );
    Ok(())
}

fn report(outcomes: &[TxOutcome]) {
    for outcome in outcomes {
        print_outcome(outcome);
    }
}

fn run(opts: Opts) -> Result<()> {
    let config = load_cfg(&opts.config)?;
    let chain = chain::from_config(&config)?;
    let chain = chain.as_ref();
    let reader = ContractReader::new(chain, &config.contracts, config.retry);

    match opts.command {
        UnicornMeatCommands::Season {} => {
            let pool = reader.fetch_pool_state()?;
            print_rows("Season", &season_rows(&pool, unix_now()));
        }
        UnicornMeatCommands::Stats { address } => {
            let account = target_account(chain, address)?;
            show_stats(&reader, &config, &account);
        }
        UnicornMeatCommands::Steak { amount } => {
            let amount = parse_positive_amount(&amount, MEAT_DECIMALS)?;
            let session = connect(chain)?;
            let outcomes = Submitter::new(chain, &config, &session).steak(amount)?;
            report(&outcomes);
            show_stats(&reader, &config, session.account());
        }
        UnicornMeatCommands::Unsteak {} => {
            let session = connect(chain)?;
            report(&[Submitter::new(chain, &config, &session).unsteak()?]);
            show_stats(&reader, &config, session.account());
        }
        UnicornMeatCommands::Dao {} => {
            let info = reader.fetch_dao_info()?;
            print_rows("Grinder Association", &dao_rows(&info, unix_now()));
        }
        UnicornMeatCommands::Proposals {} => {
            show_proposals(&reader)?;
        }
        UnicornMeatCommands::Vote { proposal, supports } => {
            let session = connect(chain)?;
            report(&[Submitter::new(chain, &config, &session).vote(proposal, supports)?]);
            let record = reader.fetch_proposal(proposal)?;
            let view = ProposalView {
                index: proposal,
                proposal: &record,
                proposer: None,
                recipient_name: None,
                tx_hash: PROPOSAL_TX_HASHES.get(proposal as usize).copied(),
            };
            print_proposal(&view, unix_now());
        }
        UnicornMeatCommands::NewProposal {
            beneficiary,
            ether_amount,
            description,
            bytecode,
            bribe,
        } => {
            let ether_amount = parse_units(&ether_amount, ETHER_DECIMALS)?;
            let bribe = match bribe {
                Some(bribe) => parse_units(&bribe, ETHER_DECIMALS)?,
                None => U256::from(VOTE_BRIBE_WEI),
            };
            let session = connect(chain)?;
            let outcome = Submitter::new(chain, &config, &session).new_proposal(
                beneficiary,
                ether_amount,
                &description,
                &bytecode,
                bribe,
            )?;
            report(&[outcome]);
        }
        UnicornMeatCommands::Execute { proposal } => {
            let session = connect(chain)?;
            let explanation = Submitter::new(chain, &config, &session).execute_proposal(proposal)?;
            println!("{}", explanation);
        }
        UnicornMeatCommands::HallOfFame {} => {
            let mut killers = reader.fetch_hall_of_fame(&GRIND_TX_HASHES);
            for killer in killers.iter_mut() {
                killer.name = reader.lookup_address(&killer.address);
            }
            print_lines("Hall of Fame", &hall_of_fame_lines(&killers));
        }
        UnicornMeatCommands::Balances { address } => {
            let account = target_account(chain, address)?;
            show_balances(&reader, &config, &account);
        }
        UnicornMeatCommands::Wrap { amount } => {
            let amount = parse_positive_amount(&amount, MEAT_DECIMALS)?;
            let session = connect(chain)?;
            report(&[Submitter::new(chain, &config, &session).wrap(amount)?]);
            show_balances(&reader, &config, session.account());
        }
        UnicornMeatCommands::Unwrap { amount } => {
            let amount = parse_positive_amount(&amount, MEAT_DECIMALS)?;
            let session = connect(chain)?;
            report(&[Submitter::new(chain, &config, &session).unwrap(amount)?]);
            show_balances(&reader, &config, session.account());
        }
        UnicornMeatCommands::CheckClaim { address } => {
            let account = target_account(chain, address)?;
            show_eligibility(&reader, &config, &account)?;
        }
        UnicornMeatCommands::Claim {} => {
            let api = claim_api(&config)?;
            let session = connect(chain)?;
            let eligibility = api.check_claim(session.account())?;
            report(&[Submitter::new(chain, &config, &session).claim(&eligibility)?]);
            show_eligibility(&reader, &config, session.account())?;
        }
        UnicornMeatCommands::ClaimStats {} => {
            let api = claim_api(&config)?;
            let open = match api.claim_status() {
                Ok(open) => Some(open),
                Err(err) => {
                    print_warning(&format!("claim status unavailable: {}", err));
                    None
                }
            };
            print_rows("Airdrop", &claim_stats_rows(&api.claim_stats()?, open));
        }
        UnicornMeatCommands::Lookup { address } => match reader.lookup_address(&address) {
            Some(name) => println!("{} {}", address, name.as_str().color(Color::Green)),
            None => println!(
                "{} has no verified ENS name ({})",
                address,
                etherscan_address(&address)
            ),
        },
        UnicornMeatCommands::Watch { interval_secs } => {
            let initial = connect(chain)?;
            watch_accounts(
                chain,
                Some(initial),
                Duration::from_secs(interval_secs),
                None,
                |session| match session {
                    Some(session) => println!("Account changed to {}", session.account()),
                    None => print_warning("wallet disconnected"),
                },
            )?;
        }
    }
    Ok(())
}

fn main() {
    let opts = Opts::parse();
    if let Err(err) = run(opts) {
        print_error(&format!("{:#}", err));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<ClientConfig> {
        let mut ini = Ini::new();
        ini.read(text.to_string()).map_err(|e| format_err!(e))?;
        parse_cfg(&ini)
    }

    #[test]
    fn minimal_config_uses_mainnet_contracts() {
        let config = parse("[Global]\nhttp_url = https://rpc.example\n").unwrap();
        assert_eq!(config.http_url, "https://rpc.example");
        assert_eq!(config.wallet_url, None);
        assert_eq!(config.api_url, None);
        assert_eq!(config.contracts, Contracts::default());
        assert_eq!(config.retry, RetryPolicy::default());
    }

    #[test]
    fn overrides_are_applied() {
        let config = parse(
            "[Global]\n\
             http_url = https://rpc.example\n\
             wallet_url = http://127.0.0.1:1248\n\
             api_url = https://meat.example\n\
             steak_contract = 0x1111111111111111111111111111111111111111\n\
             retry_attempts = 5\n\
             retry_delay_ms = 250\n\
             confirm_timeout_secs = 60\n",
        )
        .unwrap();
        assert_eq!(config.wallet_url.as_deref(), Some("http://127.0.0.1:1248"));
        assert_eq!(config.api_url.as_deref(), Some("https://meat.example"));
        assert_eq!(config.contracts.proof_of_steak, Address([0x11; 20]));
        assert_eq!(config.contracts.dao, Contracts::default().dao);
        assert_eq!(config.retry.attempts, 5);
        assert_eq!(config.retry.base_delay, Duration::from_millis(250));
        assert_eq!(config.confirm.max_wait, Duration::from_secs(60));
    }

    #[test]
    fn missing_or_empty_http_url_is_an_error() {
        assert!(parse("[Global]\nwallet_url = http://127.0.0.1:1248\n").is_err());
        assert!(parse("[Global]\nhttp_url =\n").is_err());
    }

    #[test]
    fn bad_values_are_errors() {
        assert!(parse("[Global]\nhttp_url = x\nsteak_contract = 0x1234\n").is_err());
        assert!(parse("[Global]\nhttp_url = x\nretry_attempts = many\n").is_err());
    }

    #[test]
    fn empty_override_keeps_default() {
        let config = parse("[Global]\nhttp_url = x\nwallet_url =\nsteak_contract =\n").unwrap();
        assert_eq!(config.wallet_url, None);
        assert_eq!(config.contracts.proof_of_steak, Contracts::default().proof_of_steak);
    }
}
