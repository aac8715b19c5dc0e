//! Terminal views. Row builders are pure; `print_*` adds color.

use crate::backend::ClaimStats;
use crate::reader::Balances;
use crate::submitter::TxOutcome;
use chrono::DateTime;
use colorful::{Color, Colorful};
use unicorn_meat::curve::{
    format_age, format_season_length, format_time_remaining, Estimate, SeasonStatus,
};
use unicorn_meat::states::{
    ClaimEligibility, DaoInfo, KillerEntry, PoolState, ProposalRecord, ProposalStatus, StakeRecord,
};
use unicorn_meat::utils::{
    format_large_number, format_token_amount, format_units, Address, U256,
};
use unicorn_meat::{DAO_DEPLOYED_AT, ETHER_DECIMALS, MEAT_DECIMALS, UNICORN_DECIMALS};

pub type Row = (String, String);

const ETHERSCAN: &str = "https://etherscan.io";

pub fn etherscan_tx(hash: &str) -> String {
    format!("{}/tx/{}", ETHERSCAN, hash)
}

pub fn etherscan_address(address: &Address) -> String {
    format!("{}/address/{}", ETHERSCAN, address)
}

/// `2016-03-24 22:55 UTC`, or `Not started` for a zero timestamp.
pub fn format_timestamp(seconds: u64) -> String {
    if seconds == 0 {
        return "Not started".to_string();
    }
    i64::try_from(seconds)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|time| time.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| seconds.to_string())
}

fn meat(amount: U256) -> String {
    format!("{} w🍖", format_token_amount(amount, MEAT_DECIMALS))
}

fn row(label: &str, value: impl Into<String>) -> Row {
    (label.to_string(), value.into())
}

fn display_name(address: &Address, name: Option<&str>) -> String {
    match name {
        Some(name) => format!("{} ({})", name, address.short()),
        None => address.to_string(),
    }
}

pub fn season_rows(pool: &PoolState, now: u64) -> Vec<Row> {
    vec![
        row("Season status", SeasonStatus::of(pool, now).to_string()),
        row("Total steaked", meat(pool.total_staked)),
        row("Reward pool", meat(pool.reward_pool)),
        row("Season start", format_timestamp(pool.season_start)),
        row("Season end", format_timestamp(pool.season_end)),
        row("Season length", format_season_length(pool.season_length_seconds)),
        row("Time remaining", format_time_remaining(pool, now)),
    ]
}

fn pending_reward_text(estimate: &Estimate) -> String {
    if !estimate.claimable_reward.is_zero() {
        return meat(estimate.claimable_reward);
    }
    match estimate.ineligibility {
        Some(reason) if reason.is_pending() => "0 w🍖 (Available after season ends)".to_string(),
        Some(reason) => format!("0 w🍖 (Not eligible: {})", reason),
        None => "0 w🍖".to_string(),
    }
}

pub fn stake_rows(
    record: &StakeRecord,
    estimate: &Estimate,
    wallet_balance: Option<U256>,
) -> Vec<Row> {
    let mut rows = vec![
        row("Steaked", meat(record.amount)),
        row("Max steaked this season", meat(record.max_amount_ever_staked)),
        row("Steak time", format_large_number(estimate.simulated_user_accumulator, MEAT_DECIMALS)),
        row("Pool share", estimate.pool_share_percent()),
        row("Estimated reward", meat(estimate.estimated_reward)),
        row("Pending reward", pending_reward_text(estimate)),
        row("Claimed", if record.claimed { "Yes" } else { "No" }),
    ];
    rows.push(row(
        "Wallet balance",
        wallet_balance.map(meat).unwrap_or_else(|| "unavailable".to_string()),
    ));
    rows
}

pub fn dao_rows(info: &DaoInfo, now: u64) -> Vec<Row> {
    vec![
        row("Proposals", info.num_proposals.to_string()),
        row("Unicorns killed", info.total_unicorns_killed.to_string()),
        row("Minimum quorum", info.minimum_quorum.to_string()),
        row("Debating period", format!("{} minutes", info.debating_period_minutes)),
        row("Rejection multiplier", info.rejection_multiplier.to_string()),
        row("DAO age", format_age(DAO_DEPLOYED_AT, now)),
        row("Unicorn token", info.unicorn_token.to_string()),
        row("Meat token", info.meat_token.to_string()),
        row("Meat provider", info.meat_provider.to_string()),
        row("Owner", info.owner.to_string()),
    ]
}

/// Everything shown for one proposal.
pub struct ProposalView<'a> {
    pub index: u64,
    pub proposal: &'a ProposalRecord,
    pub proposer: Option<(Address, Option<String>)>,
    pub recipient_name: Option<String>,
    pub tx_hash: Option<&'a str>,
}

pub fn proposal_rows(view: &ProposalView, now: u64) -> Vec<Row> {
    let proposal = view.proposal;
    let mut rows = vec![
        row("Status", proposal.status(now).to_string()),
        row("Description", proposal.description.clone()),
        row(
            "Recipient",
            display_name(&proposal.recipient, view.recipient_name.as_deref()),
        ),
        row(
            "Amount",
            format!("{} ETH", format_units(proposal.amount, ETHER_DECIMALS)),
        ),
        row("Votes", proposal.vote_count.to_string()),
        row("Voting deadline", format_timestamp(proposal.voting_deadline)),
    ];
    rows.push(row(
        "Proposer",
        match &view.proposer {
            Some((address, name)) => display_name(address, name.as_deref()),
            None => "Unknown".to_string(),
        },
    ));
    if let Some(hash) = view.tx_hash {
        rows.push(row("Transaction", etherscan_tx(hash)));
    }
    rows
}

pub fn hall_of_fame_lines(killers: &[KillerEntry]) -> Vec<String> {
    killers
        .iter()
        .enumerate()
        .map(|(rank, killer)| {
            format!(
                "#{} {}  {} unicorn{} ground, first on {}",
                rank + 1,
                display_name(&killer.address, killer.name.as_deref()),
                killer.count,
                if killer.count == 1 { "" } else { "s" },
                format_timestamp(killer.earliest_timestamp)
            )
        })
        .collect()
}

pub fn balance_rows(balances: &Balances) -> Vec<Row> {
    let unavailable = |label: &str| balances.unavailable.contains(&label);
    let show = |label: &'static str, value: U256, decimals: u32| {
        if unavailable(label) {
            row(label, "unavailable")
        } else {
            row(label, format_token_amount(value, decimals))
        }
    };
    vec![
        show("Unicorn Meat", balances.meat, MEAT_DECIMALS),
        show("Wrapped Unicorn Meat", balances.wrapped_meat, MEAT_DECIMALS),
        show("Unicorns", balances.unicorns, UNICORN_DECIMALS),
        show("Wrapped Unicorns", balances.wrapped_unicorns, UNICORN_DECIMALS),
    ]
}

pub fn claim_stats_rows(stats: &ClaimStats, claims_open: Option<bool>) -> Vec<Row> {
    let mut rows = Vec::new();
    if let Some(open) = claims_open {
        rows.push(row(
            "Claims",
            if open { "OPEN" } else { "CLOSED" },
        ));
    }
    rows.push(row("Total allocated", format_large_number(stats.total_allocated, MEAT_DECIMALS)));
    rows.push(row("Total claimed", format_large_number(stats.total_claimed, MEAT_DECIMALS)));
    rows.push(row("Remaining", format_large_number(stats.remaining_allocated, MEAT_DECIMALS)));
    rows.push(row("Progress", format!("{}%", stats.claimed_percent())));
    rows
}

pub fn eligibility_rows(eligibility: &ClaimEligibility, claimed_amount: Option<U256>) -> Vec<Row> {
    let status = if eligibility.has_claimed {
        match claimed_amount {
            Some(amount) => format!(
                "Already claimed {} Unicorn Meat",
                format_large_number(amount, MEAT_DECIMALS)
            ),
            None => "Already claimed".to_string(),
        }
    } else if eligibility.is_claimable() {
        format!(
            "Eligible for {} Unicorn Meat",
            format_token_amount(eligibility.claimable_amount, MEAT_DECIMALS)
        )
    } else {
        "Not eligible".to_string()
    };
    vec![
        row("Claim", status),
        row("Proof nodes", eligibility.merkle_proof.len().to_string()),
    ]
}

pub fn print_header(title: &str) {
    println!();
    println!("{}", title.color(Color::Yellow).bold());
}

pub fn print_rows(title: &str, rows: &[Row]) {
    print_header(title);
    print_row_body(rows);
}

fn print_row_body(rows: &[Row]) {
    let width = rows.iter().map(|(label, _)| label.chars().count()).max().unwrap_or(0);
    for (label, value) in rows {
        println!(
            "  {}{}  {}",
            label.as_str().color(Color::Cyan),
            " ".repeat(width - label.chars().count()),
            value
        );
    }
}

pub fn print_proposal(view: &ProposalView, now: u64) {
    let status = view.proposal.status(now);
    let color = match status {
        ProposalStatus::Executed => Color::Blue,
        ProposalStatus::Passed => Color::Green,
        ProposalStatus::Expired => Color::Red,
        ProposalStatus::Active => Color::Yellow,
    };
    println!();
    println!(
        "{} {}",
        format!("Proposal #{}", view.index).as_str().color(Color::Yellow).bold(),
        format!("[{}]", status).as_str().color(color)
    );
    print_row_body(&proposal_rows(view, now));
}

pub fn print_lines(title: &str, lines: &[String]) {
    print_header(title);
    for line in lines {
        println!("  {}", line);
    }
}

pub fn print_outcome(outcome: &TxOutcome) {
    println!(
        "{} {} confirmed: {}",
        "✔".color(Color::Green),
        outcome.action,
        etherscan_tx(&outcome.hash)
    );
}

pub fn print_warning(message: &str) {
    eprintln!("{} {}", "warning:".color(Color::Yellow), message);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "error:".color(Color::Red).bold(), message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use unicorn_meat::curve::RewardEstimator;

    fn value<'a>(rows: &'a [Row], label: &str) -> &'a str {
        rows.iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
            .unwrap_or_default()
    }

    fn pool() -> PoolState {
        PoolState {
            total_staked: U256::from(1_234_567u64),
            total_stake_time_accumulator: U256::zero(),
            reward_pool: U256::from(500_000u64),
            season_start: 1_700_000_000,
            season_end: 1_700_000_000 + 7 * 86_400,
            started: true,
            funded: true,
            season_length_seconds: 7 * 86_400,
        }
    }

    #[test]
    fn season_panel() {
        let rows = season_rows(&pool(), 1_700_000_000 + 86_400 + 3_600 + 60);
        assert_eq!(value(&rows, "Season status"), "Active");
        assert_eq!(value(&rows, "Total steaked"), "1,234.567 w🍖");
        assert_eq!(value(&rows, "Season length"), "7 days");
        assert_eq!(value(&rows, "Time remaining"), "5d 22h 59m");
        assert_eq!(value(&rows, "Season start"), "2023-11-14 22:13 UTC");
    }

    #[test]
    fn pending_reward_explains_zero() {
        let record = StakeRecord {
            amount: U256::from(1000u64),
            max_amount_ever_staked: U256::from(1000u64),
            last_update: 1_700_000_000,
            ..Default::default()
        };
        let mid = RewardEstimator::estimate(&record, &pool(), 1_700_000_100);
        assert_eq!(
            value(&stake_rows(&record, &mid, None), "Pending reward"),
            "0 w🍖 (Available after season ends)"
        );
        assert_eq!(value(&stake_rows(&record, &mid, None), "Wallet balance"), "unavailable");

        let reduced = StakeRecord {
            max_amount_ever_staked: U256::from(2000u64),
            ..record
        };
        let end = RewardEstimator::estimate(&reduced, &pool(), 1_800_000_000);
        let rows = stake_rows(&reduced, &end, None);
        assert!(value(&rows, "Pending reward").starts_with("0 w🍖 (Not eligible"));
    }

    #[test]
    fn hall_of_fame_uses_names_when_known() {
        let killers = vec![
            KillerEntry {
                address: Address([0xa; 20]),
                count: 2,
                earliest_timestamp: 1_458_860_156,
                name: Some("grinder.eth".to_string()),
            },
            KillerEntry {
                address: Address([0xb; 20]),
                count: 1,
                earliest_timestamp: 1_458_900_000,
                name: None,
            },
        ];
        let lines = hall_of_fame_lines(&killers);
        assert!(lines[0].starts_with("#1 grinder.eth (0x"));
        assert!(lines[0].contains("2 unicorns ground, first on 2016-03-24 22:55 UTC"));
        assert!(lines[1].contains("1 unicorn ground"));
    }

    #[test]
    fn unavailable_balances_are_labelled() {
        let balances = Balances {
            meat: U256::from(1_500u64),
            unicorns: U256::from(3u64),
            unavailable: vec!["Wrapped Unicorns"],
            ..Default::default()
        };
        let rows = balance_rows(&balances);
        assert_eq!(value(&rows, "Unicorn Meat"), "1.5");
        assert_eq!(value(&rows, "Unicorns"), "3");
        assert_eq!(value(&rows, "Wrapped Unicorns"), "unavailable");
    }

    #[test]
    fn timestamps_and_links() {
        assert_eq!(format_timestamp(0), "Not started");
        assert_eq!(
            etherscan_tx("0xabc"),
            "https://etherscan.io/tx/0xabc"
        );
    }
}
