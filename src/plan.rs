//! # Plan Module
//!
//! Infers the subscription tier in use from the heaviest historical session
//! block, and estimates unweighted token counts from weighted ones.

use serde::Serialize;

use crate::models::{Plan, PlanLimits, SessionBlock};
use crate::tokens::{is_opus, max_tokens_from_history, DEFAULT_WEIGHT, OPUS_WEIGHT};

/// Share of a tier's ceiling that counts as evidence of that tier
pub const DETECTION_THRESHOLD: f64 = 0.8;
/// Share of a tier's ceiling that makes the detection unambiguous
pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// Why the detector settled where it did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanHint {
    NoData,
    ClearlyMax20,
    ClearlyMax5OrHigher,
    ExceedsPro,
    NearPro,
    WithinPro,
}

impl PlanHint {
    pub fn recommendation(&self) -> &'static str {
        match self {
            Self::NoData => "No usage data found. Using default Pro plan.",
            Self::ClearlyMax20 => "Usage clearly indicates Max20 plan.",
            Self::ClearlyMax5OrHigher => "Usage clearly indicates Max5 or higher plan.",
            Self::ExceedsPro => "Usage exceeds Pro limits. Likely using Max5 or higher.",
            Self::NearPro => "Usage near Pro limits. Plan detection may be uncertain.",
            Self::WithinPro => "Usage within Pro plan limits.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanAnalysis {
    pub detected_plan: Plan,
    pub max_tokens_used: u64,
    pub confidence: Confidence,
    pub hint: PlanHint,
}

impl PlanAnalysis {
    pub fn recommendation(&self) -> &'static str {
        self.hint.recommendation()
    }
}

fn at_least(tokens: u64, ceiling: u64, share: f64) -> bool {
    tokens as f64 >= ceiling as f64 * share
}

fn above(tokens: u64, ceiling: u64, share: f64) -> bool {
    tokens as f64 > ceiling as f64 * share
}

/// Tier implied by the heaviest block, as a pure function of that maximum.
pub fn detect_plan_from_max(max_tokens: u64, limits: &PlanLimits) -> Plan {
    if max_tokens == 0 {
        return Plan::Pro;
    }
    if at_least(max_tokens, limits.max20, DETECTION_THRESHOLD) {
        Plan::Max20
    } else if at_least(max_tokens, limits.max5, DETECTION_THRESHOLD) {
        Plan::Max5
    } else if at_least(max_tokens, limits.pro, DETECTION_THRESHOLD) {
        // Going past the full pro ceiling is only possible on a larger plan
        if max_tokens > limits.pro {
            Plan::Max5
        } else {
            Plan::Pro
        }
    } else {
        Plan::Pro
    }
}

pub fn detect_plan(blocks: &[SessionBlock], limits: &PlanLimits) -> Plan {
    detect_plan_from_max(max_tokens_from_history(blocks), limits)
}

pub fn analyze_plan_usage(blocks: &[SessionBlock], limits: &PlanLimits) -> PlanAnalysis {
    let max_tokens_used = max_tokens_from_history(blocks);
    let detected_plan = detect_plan_from_max(max_tokens_used, limits);

    let (confidence, hint) = if max_tokens_used == 0 {
        (Confidence::Low, PlanHint::NoData)
    } else if above(max_tokens_used, limits.max20, HIGH_CONFIDENCE_THRESHOLD) {
        (Confidence::High, PlanHint::ClearlyMax20)
    } else if above(max_tokens_used, limits.max5, HIGH_CONFIDENCE_THRESHOLD) {
        (Confidence::High, PlanHint::ClearlyMax5OrHigher)
    } else if max_tokens_used > limits.pro {
        (Confidence::Medium, PlanHint::ExceedsPro)
    } else if above(max_tokens_used, limits.pro, DETECTION_THRESHOLD) {
        (Confidence::Medium, PlanHint::NearPro)
    } else {
        (Confidence::High, PlanHint::WithinPro)
    };

    PlanAnalysis {
        detected_plan,
        max_tokens_used,
        confidence,
        hint,
    }
}

/// Undo the weighting using the observed opus share of individual entries.
/// Returns `weighted_tokens` unchanged when there are no entries.
pub fn estimate_actual_tokens(weighted_tokens: u64, blocks: &[SessionBlock]) -> u64 {
    let (opus, total) = blocks
        .iter()
        .filter(|b| !b.is_gap)
        .flat_map(|b| b.entries.iter())
        .fold((0u64, 0u64), |(o, t), e| {
            (o + u64::from(is_opus(&e.model)), t + 1)
        });
    if total == 0 {
        return weighted_tokens;
    }
    let opus_ratio = opus as f64 / total as f64;
    let average_weight =
        opus_ratio * OPUS_WEIGHT as f64 + (1.0 - opus_ratio) * DEFAULT_WEIGHT as f64;
    (weighted_tokens as f64 / average_weight).round() as u64
}
