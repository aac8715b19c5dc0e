use crate::utils::Address;
use std::collections::HashMap;

/// One row of the unicorn grinding leaderboard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KillerEntry {
    pub address: Address,
    pub count: u64,
    /// Block timestamp of the first grind by this address.
    pub earliest_timestamp: u64,
    /// Reverse-resolved name, if any.
    pub name: Option<String>,
}

/// Tallies `(sender, block_timestamp)` grind events per address.
///
/// Ordered by kill count descending, ties broken by the earliest grind.
pub fn tally_kills<I>(events: I) -> Vec<KillerEntry>
where
    I: IntoIterator<Item = (Address, u64)>,
{
    let mut by_address: HashMap<Address, (u64, u64)> = HashMap::new();
    for (address, timestamp) in events {
        let entry = by_address.entry(address).or_insert((0, timestamp));
        entry.0 += 1;
        entry.1 = entry.1.min(timestamp);
    }
    let mut killers: Vec<KillerEntry> = by_address
        .into_iter()
        .filter(|(_, (count, _))| *count > 0)
        .map(|(address, (count, earliest_timestamp))| KillerEntry {
            address,
            count,
            earliest_timestamp,
            name: None,
        })
        .collect();
    killers.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then(a.earliest_timestamp.cmp(&b.earliest_timestamp))
            .then(a.address.cmp(&b.address))
    });
    killers
}
