//! # Burn Module
//!
//! Trailing-hour consumption rate, end-of-session projection and depletion
//! time. Costs here are a rough linear estimate, not a billing model.

use chrono::{DateTime, Duration, Utc};

use crate::models::{BurnRate, BurnRateLevel, SessionBlock, UsageProjection};
use crate::tokens::block_weighted_tokens;

/// Placeholder USD per weighted token used for cost estimates
pub const COST_PER_TOKEN_USD: f64 = 0.00001;
pub const BURN_WINDOW_MINUTES: i64 = 60;

pub fn estimate_cost(tokens: f64) -> f64 {
    (tokens * COST_PER_TOKEN_USD).max(0.0)
}

/// Weighted tokens per minute over the hour ending at `now`.
///
/// Each non-gap block touching the window contributes its weighted tokens
/// scaled by the fraction of its duration that overlaps the window.
pub fn calculate_hourly_burn_rate(blocks: &[SessionBlock], now: DateTime<Utc>) -> BurnRate {
    let window_start = now - Duration::minutes(BURN_WINDOW_MINUTES);
    let mut total_tokens = 0.0f64;
    let mut total_minutes = 0i64;

    for block in blocks.iter().filter(|b| !b.is_gap) {
        let touches_window =
            block.end > window_start || block.actual_end.is_some_and(|a| a > window_start);
        if !touches_window {
            continue;
        }

        let overlap_start = block.start.max(window_start);
        let overlap_end = block.actual_end.unwrap_or(now).min(now);
        let minutes = (overlap_end - overlap_start).num_minutes();
        if minutes <= 0 {
            continue;
        }

        let block_tokens = block_weighted_tokens(block) as f64;
        let block_minutes = if block.duration_minutes != 0 {
            block.duration_minutes
        } else {
            (block.actual_end.unwrap_or(now) - block.start).num_minutes()
        };
        let proportional = if block_minutes > 0 {
            block_tokens * minutes as f64 / block_minutes as f64
        } else {
            0.0
        };

        total_tokens += proportional;
        total_minutes += minutes;
    }

    let tokens_per_minute = if total_minutes > 0 {
        total_tokens / total_minutes as f64
    } else {
        0.0
    };

    BurnRate {
        tokens_per_minute,
        cost_per_hour: estimate_cost(tokens_per_minute * 60.0),
    }
}

/// Where the active block will end up if the current rate holds.
pub fn project_usage(
    active: Option<&SessionBlock>,
    current_tokens: u64,
    _limit: u64,
    burn: &BurnRate,
    now: DateTime<Utc>,
) -> Option<UsageProjection> {
    let block = active?;
    if burn.tokens_per_minute == 0.0 {
        return None;
    }
    let remaining_minutes = (block.end - now).num_minutes();
    if remaining_minutes <= 0 {
        return None;
    }
    let projected_total_tokens =
        current_tokens as f64 + burn.tokens_per_minute * remaining_minutes as f64;
    Some(UsageProjection {
        projected_total_tokens,
        projected_total_cost: estimate_cost(projected_total_tokens),
        remaining_minutes,
    })
}

/// When the limit is reached at the current rate; `None` if idle or already over.
pub fn calculate_depletion_time(
    current_tokens: u64,
    limit: u64,
    burn: &BurnRate,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    if burn.tokens_per_minute <= 0.0 || current_tokens >= limit {
        return None;
    }
    let minutes = (limit - current_tokens) as f64 / burn.tokens_per_minute;
    let millis = (minutes * 60_000.0).round();
    if !millis.is_finite() {
        return None;
    }
    Some(now + Duration::milliseconds(millis as i64))
}

pub fn burn_rate_indicator(tokens_per_minute: f64) -> BurnRateLevel {
    if tokens_per_minute <= 0.0 {
        BurnRateLevel::Idle
    } else if tokens_per_minute < 10.0 {
        BurnRateLevel::Crawling
    } else if tokens_per_minute < 50.0 {
        BurnRateLevel::Walking
    } else if tokens_per_minute < 100.0 {
        BurnRateLevel::Running
    } else if tokens_per_minute < 200.0 {
        BurnRateLevel::Driving
    } else if tokens_per_minute < 500.0 {
        BurnRateLevel::Flying
    } else {
        BurnRateLevel::Rocket
    }
}
