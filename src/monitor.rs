//! # Monitor Module
//!
//! One refresh cycle is load -> window -> compute. No state survives between
//! cycles except the plan, which may move from `pro` to `custom_max` once the
//! active session outgrows the pro ceiling.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::burn::{
    burn_rate_indicator, calculate_depletion_time, calculate_hourly_burn_rate, project_usage,
};
use crate::display;
use crate::messages::Messages;
use crate::models::{MonitorSnapshot, Plan, PlanLimits, PlanTransition, SessionBlock};
use crate::plan::{PlanAnalysis, analyze_plan_usage, estimate_actual_tokens};
use crate::tokens::{
    block_weighted_tokens, calculate_token_percentage, determine_plan_limit, token_status,
};
use crate::usage::load_usage_entries;
use crate::window::{WindowConfig, active_block, identify_blocks};

const POLL_SLICE: Duration = Duration::from_millis(100);

/// Move off `pro` when the active session is already past its ceiling.
pub fn check_plan_transition(
    plan: Plan,
    current_tokens: u64,
    limits: &PlanLimits,
) -> Option<PlanTransition> {
    (plan == Plan::Pro && current_tokens > limits.pro).then_some(PlanTransition {
        from: Plan::Pro,
        to: Plan::CustomMax,
        tokens: current_tokens,
    })
}

/// Compute a snapshot from already windowed blocks. The limit is resolved
/// against the plan in effect after any transition.
pub fn snapshot_from_blocks(
    plan: Plan,
    blocks: &[SessionBlock],
    limits: &PlanLimits,
    now: DateTime<Utc>,
) -> MonitorSnapshot {
    let active = active_block(blocks);
    let current_tokens = active.map(block_weighted_tokens).unwrap_or(0);

    let plan_transition = check_plan_transition(plan, current_tokens, limits);
    let plan = plan_transition.map(|t| t.to).unwrap_or(plan);

    let limit = determine_plan_limit(plan, blocks, limits);
    let percentage = calculate_token_percentage(current_tokens, limit);
    let burn_rate = calculate_hourly_burn_rate(blocks, now);
    let projection = project_usage(active, current_tokens, limit, &burn_rate, now);
    let depletion_time = calculate_depletion_time(current_tokens, limit, &burn_rate, now);

    MonitorSnapshot {
        generated_at: now,
        plan,
        current_tokens,
        limit,
        percentage,
        status: token_status(percentage),
        burn_rate,
        burn_rate_indicator: burn_rate_indicator(burn_rate.tokens_per_minute),
        active_block: active.cloned(),
        projection,
        depletion_time,
        plan_transition,
    }
}

/// Load and window everything under `roots`.
pub fn load_blocks(roots: &[PathBuf], window: &WindowConfig, now: DateTime<Utc>) -> Vec<SessionBlock> {
    let entries = load_usage_entries(roots);
    identify_blocks(&entries, window, now)
}

#[derive(Debug, Clone)]
pub struct Monitor {
    plan: Plan,
    window: WindowConfig,
    limits: PlanLimits,
    roots: Vec<PathBuf>,
}

impl Monitor {
    pub fn new(plan: Plan, window: WindowConfig, limits: PlanLimits, roots: Vec<PathBuf>) -> Self {
        Self {
            plan,
            window,
            limits,
            roots,
        }
    }

    pub fn plan(&self) -> Plan {
        self.plan
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// One full cycle. A plan transition sticks for later cycles.
    pub fn refresh(&mut self, now: DateTime<Utc>) -> MonitorSnapshot {
        let blocks = load_blocks(&self.roots, &self.window, now);
        let snapshot = snapshot_from_blocks(self.plan, &blocks, &self.limits, now);
        if let Some(t) = snapshot.plan_transition {
            info!(from = %t.from, to = %t.to, tokens = t.tokens, "plan transition");
            self.plan = t.to;
        }
        debug!(
            blocks = blocks.len(),
            tokens = snapshot.current_tokens,
            limit = snapshot.limit,
            "refreshed"
        );
        snapshot
    }

    /// Render a single cycle as text or JSON.
    pub fn run_once(&mut self, json: bool, msgs: &Messages) -> Result<()> {
        let snapshot = self.refresh(Utc::now());
        if json {
            display::print_json_output(&snapshot)
        } else {
            print!("{}", display::render_text(&snapshot, msgs, Utc::now()));
            Ok(())
        }
    }

    /// Redraw every `interval` until Ctrl+C. A failed cycle is reported and the
    /// next tick tries again.
    pub fn run_loop(&mut self, interval: Duration, msgs: &Messages) -> Result<()> {
        let stop = install_stop_signal()?;
        display::hide_cursor()?;

        let mut last_tick: Option<Instant> = None;
        while !stop.load(Ordering::Relaxed) {
            if last_tick.is_none_or(|t| t.elapsed() >= interval) {
                let snapshot = self.refresh(Utc::now());
                if let Err(err) = display::draw(&snapshot, msgs) {
                    warn!(error = %err, "refresh cycle failed");
                    eprintln!(
                        "{}",
                        display::format_error(&format!("{}: {err}", msgs.error_updating_monitor))
                    );
                }
                last_tick = Some(Instant::now());
            }
            thread::sleep(POLL_SLICE.min(interval));
        }

        let _ = display::show_cursor();
        println!("\n{}", display::format_success(msgs.monitor_stopped));
        Ok(())
    }
}

fn install_stop_signal() -> Result<Arc<AtomicBool>> {
    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::Relaxed);
    })
    .context("failed to install Ctrl+C handler")?;
    Ok(stop)
}

/// Startup plan: detect from history when asked, otherwise the requested plan.
pub fn resolve_plan(
    detect: bool,
    fallback: Plan,
    blocks: &[SessionBlock],
    limits: &PlanLimits,
) -> (Plan, Option<PlanAnalysis>) {
    if !detect {
        return (fallback, None);
    }
    let analysis = analyze_plan_usage(blocks, limits);
    (analysis.detected_plan, Some(analysis))
}

/// What the `info` command prints.
#[derive(Debug, Clone)]
pub struct InfoReport {
    pub default_paths: Vec<PathBuf>,
    pub discovered_paths: Vec<PathBuf>,
    pub analysis: Option<PlanAnalysis>,
    pub estimated_actual_tokens: Option<u64>,
}

pub fn build_info_report(
    default_paths: Vec<PathBuf>,
    discovered_paths: Vec<PathBuf>,
    blocks: &[SessionBlock],
    limits: &PlanLimits,
) -> InfoReport {
    let has_data = blocks.iter().any(|b| !b.is_gap);
    let analysis = has_data.then(|| analyze_plan_usage(blocks, limits));
    let estimated_actual_tokens = analysis
        .as_ref()
        .map(|a| estimate_actual_tokens(a.max_tokens_used, blocks));
    InfoReport {
        default_paths,
        discovered_paths,
        analysis,
        estimated_actual_tokens,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TokenStatus, UsageEntry};
    use chrono::Duration as ChronoDuration;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-01-15T14:30:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn blocks(entries: &[(i64, u64, &str)]) -> Vec<SessionBlock> {
        let entries: Vec<UsageEntry> = entries
            .iter()
            .map(|(mins_ago, input, model)| UsageEntry {
                input: *input,
                model: model.to_string(),
                ..UsageEntry::at(now() - ChronoDuration::minutes(*mins_ago))
            })
            .collect();
        identify_blocks(&entries, &WindowConfig::default(), now())
    }

    #[test]
    fn transition_only_from_pro_above_ceiling() {
        let l = PlanLimits::default();
        assert_eq!(check_plan_transition(Plan::Pro, 44_000, &l), None);
        assert_eq!(
            check_plan_transition(Plan::Pro, 44_001, &l),
            Some(PlanTransition {
                from: Plan::Pro,
                to: Plan::CustomMax,
                tokens: 44_001
            })
        );
        assert_eq!(check_plan_transition(Plan::Max5, 500_000, &l), None);
    }

    #[test]
    fn empty_history_snapshot() {
        let s = snapshot_from_blocks(Plan::Pro, &[], &PlanLimits::default(), now());
        assert_eq!(s.current_tokens, 0);
        assert_eq!(s.limit, 44_000);
        assert_eq!(s.percentage, 0.0);
        assert_eq!(s.status, TokenStatus::Safe);
        assert!(s.active_block.is_none());
        assert!(s.projection.is_none());
        assert!(s.depletion_time.is_none());
        assert!(s.plan_transition.is_none());
    }

    #[test]
    fn snapshot_uses_active_block() {
        // 20 opus tokens 20 minutes ago -> 100 weighted in the 14:00 block
        let b = blocks(&[(600, 9_000, "sonnet"), (20, 20, "claude-opus-4")]);
        let s = snapshot_from_blocks(Plan::Max5, &b, &PlanLimits::default(), now());
        assert_eq!(s.plan, Plan::Max5);
        assert_eq!(s.current_tokens, 100);
        assert_eq!(s.limit, 220_000);
        assert!(s.active_block.as_ref().is_some_and(|a| a.is_active));
        assert!(s.burn_rate.tokens_per_minute > 0.0);
        assert!(s.depletion_time.is_some());
    }

    #[test]
    fn pro_overflow_switches_to_custom_max() {
        // Earlier heavy block sets the custom ceiling at 60k
        let b = blocks(&[(1_440, 60_000, "sonnet"), (10, 45_000, "sonnet")]);
        let s = snapshot_from_blocks(Plan::Pro, &b, &PlanLimits::default(), now());
        assert_eq!(s.plan, Plan::CustomMax);
        assert_eq!(s.current_tokens, 45_000);
        assert_eq!(s.limit, 60_000);
        assert_eq!(s.percentage, 75.0);
        assert_eq!(s.status, TokenStatus::Warning);
        let t = s.plan_transition.unwrap();
        assert_eq!((t.from, t.to, t.tokens), (Plan::Pro, Plan::CustomMax, 45_000));

        // Once switched, no further transition is reported
        let again = snapshot_from_blocks(s.plan, &b, &PlanLimits::default(), now());
        assert!(again.plan_transition.is_none());
    }

    #[test]
    fn resolve_plan_honours_detection_flag() {
        let l = PlanLimits::default();
        let b = blocks(&[(1_440, 300_000, "sonnet")]);
        assert_eq!(resolve_plan(false, Plan::Max20, &b, &l).0, Plan::Max20);
        let (plan, analysis) = resolve_plan(true, Plan::Pro, &b, &l);
        assert_eq!(plan, Plan::Max5);
        assert_eq!(analysis.unwrap().max_tokens_used, 300_000);
    }

    #[test]
    fn info_report_without_data() {
        let r = build_info_report(vec![PathBuf::from("/x")], vec![], &[], &PlanLimits::default());
        assert!(r.analysis.is_none());
        assert!(r.estimated_actual_tokens.is_none());

        let b = blocks(&[(1_440, 1_000, "opus")]);
        let r = build_info_report(vec![], vec![], &b, &PlanLimits::default());
        assert_eq!(r.analysis.unwrap().max_tokens_used, 5_000);
        assert_eq!(r.estimated_actual_tokens, Some(1_000));
    }
}
