use crate::states::PoolState;
use std::fmt;

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
/// 365.25 days.
const YEAR: u64 = 31_557_600;
/// 30.44 days.
const MONTH: u64 = 2_630_016;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeasonStatus {
    NotStarted,
    /// Reward pool funded, waiting for the owner to start the season.
    ReadyToStart,
    Active,
    Ended,
}

impl SeasonStatus {
    pub fn of(pool: &PoolState, now: u64) -> Self {
        if pool.started {
            if now < pool.season_end {
                SeasonStatus::Active
            } else {
                SeasonStatus::Ended
            }
        } else if pool.funded {
            SeasonStatus::ReadyToStart
        } else {
            SeasonStatus::NotStarted
        }
    }
}

impl fmt::Display for SeasonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SeasonStatus::NotStarted => "Not Started",
            SeasonStatus::ReadyToStart => "Ready to Start",
            SeasonStatus::Active => "Active",
            SeasonStatus::Ended => "Ended",
        };
        f.write_str(text)
    }
}

/// Seconds left in an active season.
pub fn time_remaining(pool: &PoolState, now: u64) -> Option<u64> {
    match SeasonStatus::of(pool, now) {
        SeasonStatus::Active => Some(pool.season_end - now),
        _ => None,
    }
}

/// `Xd Yh Zm`, seconds dropped.
pub fn format_countdown(seconds: u64) -> String {
    format!(
        "{}d {}h {}m",
        seconds / DAY,
        (seconds % DAY) / HOUR,
        (seconds % HOUR) / MINUTE
    )
}

/// Countdown text for the season panel.
pub fn format_time_remaining(pool: &PoolState, now: u64) -> String {
    match SeasonStatus::of(pool, now) {
        SeasonStatus::Active => format_countdown(pool.season_end - now),
        SeasonStatus::Ended => "Season ended".to_string(),
        SeasonStatus::NotStarted | SeasonStatus::ReadyToStart => "Not started".to_string(),
    }
}

fn plural(count: u64, unit: &str) -> String {
    if count == 1 {
        format!("{} {}", count, unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

/// Two most significant units, e.g. `7 days 12 hours` or `3 hours`.
pub fn format_season_length(seconds: u64) -> String {
    let days = seconds / DAY;
    let hours = (seconds % DAY) / HOUR;
    let minutes = (seconds % HOUR) / MINUTE;
    if days > 0 {
        if hours > 0 {
            format!("{} {}", plural(days, "day"), plural(hours, "hour"))
        } else {
            plural(days, "day")
        }
    } else if hours > 0 {
        if minutes > 0 {
            format!("{} {}", plural(hours, "hour"), plural(minutes, "minute"))
        } else {
            plural(hours, "hour")
        }
    } else {
        plural(minutes, "minute")
    }
}

/// Coarse age such as `9yr 6mo`, `4mo` or `12d`.
pub fn format_age(since: u64, now: u64) -> String {
    let elapsed = now.saturating_sub(since);
    let years = elapsed / YEAR;
    let months = (elapsed % YEAR) / MONTH;
    let days = (elapsed % MONTH) / DAY;
    if years > 0 {
        if months > 0 {
            format!("{}yr {}mo", years, months)
        } else {
            format!("{}yr", years)
        }
    } else if months > 0 {
        format!("{}mo", months)
    } else {
        format!("{}d", days)
    }
}
