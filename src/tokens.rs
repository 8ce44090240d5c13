//! # Tokens Module
//!
//! Converts raw token counts into a weighted metric that is comparable across
//! model families, and resolves plan ceilings against that metric.
//!
//! ## Weighting
//!
//! Only input and output tokens are weighted; cache creation and cache reads
//! are excluded. Any model whose identifier contains `opus` (case-insensitive)
//! counts 5x, everything else (sonnet, haiku, unknown) counts 1x.

use crate::models::{Plan, PlanLimits, SessionBlock, TokenStatus, UsageEntry};

pub const OPUS_WEIGHT: u64 = 5;
pub const DEFAULT_WEIGHT: u64 = 1;

/// Percentage at or above which usage is critical
pub const CRITICAL_PERCENT: f64 = 90.0;
/// Percentage at or above which usage is a warning
pub const WARNING_PERCENT: f64 = 50.0;

pub fn is_opus(model: &str) -> bool {
    model.to_lowercase().contains("opus")
}

pub fn model_weight(model: &str) -> u64 {
    if is_opus(model) {
        OPUS_WEIGHT
    } else {
        DEFAULT_WEIGHT
    }
}

pub fn entry_weighted_tokens(entry: &UsageEntry) -> u64 {
    entry
        .input
        .saturating_add(entry.output)
        .saturating_mul(model_weight(&entry.model))
}

pub fn calculate_weighted_tokens(entries: &[UsageEntry]) -> u64 {
    entries
        .iter()
        .map(entry_weighted_tokens)
        .fold(0, u64::saturating_add)
}

pub fn block_weighted_tokens(block: &SessionBlock) -> u64 {
    calculate_weighted_tokens(&block.entries)
}

/// Weighted tokens across every non-gap block
pub fn total_weighted_tokens(blocks: &[SessionBlock]) -> u64 {
    blocks
        .iter()
        .filter(|b| !b.is_gap)
        .map(block_weighted_tokens)
        .fold(0, u64::saturating_add)
}

/// Weighted tokens of the most recent active block, 0 when nothing is active
pub fn active_session_tokens(blocks: &[SessionBlock]) -> u64 {
    crate::window::active_block(blocks)
        .map(block_weighted_tokens)
        .unwrap_or(0)
}

/// Heaviest single block in history
pub fn max_tokens_from_history(blocks: &[SessionBlock]) -> u64 {
    blocks
        .iter()
        .filter(|b| !b.is_gap)
        .map(block_weighted_tokens)
        .max()
        .unwrap_or(0)
}

/// Ceiling for `plan`. `CustomMax` takes the heaviest historical block and
/// falls back to the pro ceiling when there is no history.
pub fn determine_plan_limit(plan: Plan, blocks: &[SessionBlock], limits: &PlanLimits) -> u64 {
    match limits.fixed(plan) {
        Some(v) => v,
        None => match max_tokens_from_history(blocks) {
            0 => limits.pro,
            detected => detected,
        },
    }
}

/// `current / limit * 100`, clamped to [0, 100]; 0 when the limit is 0.
pub fn calculate_token_percentage(current_tokens: u64, limit: u64) -> f64 {
    if limit == 0 {
        return 0.0;
    }
    (current_tokens as f64 / limit as f64 * 100.0).clamp(0.0, 100.0)
}

pub fn token_status(percentage: f64) -> TokenStatus {
    if percentage >= CRITICAL_PERCENT {
        TokenStatus::Critical
    } else if percentage >= WARNING_PERCENT {
        TokenStatus::Warning
    } else {
        TokenStatus::Safe
    }
}
