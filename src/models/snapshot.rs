use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::block::SessionBlock;
use crate::models::plan::Plan;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BurnRate {
    pub tokens_per_minute: f64,
    pub cost_per_hour: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UsageProjection {
    pub projected_total_tokens: f64,
    pub projected_total_cost: f64,
    pub remaining_minutes: i64,
}

/// Severity band for a usage percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenStatus {
    Safe,
    Warning,
    Critical,
}

/// Step bands for tokens-per-minute, ordered from idle to extreme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BurnRateLevel {
    Idle,
    Crawling,
    Walking,
    Running,
    Driving,
    Flying,
    Rocket,
}

impl BurnRateLevel {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Idle => "⏸️",
            Self::Crawling => "🐌",
            Self::Walking => "🚶",
            Self::Running => "🏃",
            Self::Driving => "🚗",
            Self::Flying => "✈️",
            Self::Rocket => "🚀",
        }
    }
}

/// Emitted on the cycle where the monitor leaves its configured plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanTransition {
    pub from: Plan,
    pub to: Plan,
    /// Weighted tokens of the active block that triggered the switch
    pub tokens: u64,
}

/// Everything the presentation layer needs for one refresh.
#[derive(Debug, Clone, Serialize)]
pub struct MonitorSnapshot {
    pub generated_at: DateTime<Utc>,
    pub plan: Plan,
    pub current_tokens: u64,
    pub limit: u64,
    pub percentage: f64,
    pub status: TokenStatus,
    pub burn_rate: BurnRate,
    pub burn_rate_indicator: BurnRateLevel,
    pub active_block: Option<SessionBlock>,
    pub projection: Option<UsageProjection>,
    pub depletion_time: Option<DateTime<Utc>>,
    pub plan_transition: Option<PlanTransition>,
}

impl MonitorSnapshot {
    /// Tokens run out before the active block resets.
    pub fn depletes_before_reset(&self) -> bool {
        match (self.depletion_time, self.active_block.as_ref()) {
            (Some(t), Some(b)) => t < b.end,
            _ => false,
        }
    }
}
