use chrono::{DateTime, Local, Utc};
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};
use std::fmt::Write as _;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

#[cfg(feature = "colors")]
use owo_colors::OwoColorize;

// Provide a no-op color shim when "colors" feature is disabled
#[cfg(not(feature = "colors"))]
pub mod color_shim {
    use std::fmt::{self, Display, Formatter};

    #[derive(Clone)]
    pub struct Plain(pub String);

    impl Display for Plain {
        fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
            f.write_str(&self.0)
        }
    }

    pub trait ColorizeShim {
        fn as_str(&self) -> &str;

        fn bright_black(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
        fn blue(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
        fn cyan(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
        fn red(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
        fn yellow(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
        fn green(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
        fn bold(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
    }

    impl ColorizeShim for &str {
        fn as_str(&self) -> &str {
            self
        }
    }
    impl ColorizeShim for String {
        fn as_str(&self) -> &str {
            self.as_str()
        }
    }
    impl ColorizeShim for Plain {
        fn as_str(&self) -> &str {
            &self.0
        }
    }
}

#[cfg(not(feature = "colors"))]
use color_shim::ColorizeShim as OwoColorize;

use crate::messages::Messages;
use crate::models::{MonitorSnapshot, Plan, SessionBlock, TokenStatus};
use crate::monitor::InfoReport;
use crate::plan::PlanAnalysis;
use crate::tokens::block_weighted_tokens;
use crate::utils::{format_currency, format_duration, format_number};

pub const DEFAULT_BAR_WIDTH: usize = 40;
const RULE_WIDTH: usize = 60;

pub fn format_warning(message: &str) -> String {
    format!("⚠️  {message}").yellow().to_string()
}

pub fn format_error(message: &str) -> String {
    format!("❌ {message}").red().to_string()
}

pub fn format_success(message: &str) -> String {
    format!("✅ {message}").green().to_string()
}

fn status_glyph(status: TokenStatus) -> &'static str {
    match status {
        TokenStatus::Safe => "🟢",
        TokenStatus::Warning => "🟡",
        TokenStatus::Critical => "🔴",
    }
}

/// Bar width that fits the terminal, capped at [`DEFAULT_BAR_WIDTH`].
pub fn bar_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| (w.0 as usize).saturating_sub(12).clamp(10, DEFAULT_BAR_WIDTH))
        .unwrap_or(DEFAULT_BAR_WIDTH)
}

/// `[████░░░░] 42.0%`, colored by status band.
pub fn progress_bar(percentage: f64, width: usize) -> String {
    let pct = percentage.clamp(0.0, 100.0);
    let filled = ((pct / 100.0 * width as f64).round() as usize).min(width);
    let empty = width - filled;
    let fill = "█".repeat(filled);
    let fill = match crate::tokens::token_status(pct) {
        TokenStatus::Critical => fill.red().to_string(),
        TokenStatus::Warning => fill.yellow().to_string(),
        TokenStatus::Safe => fill.green().to_string(),
    };
    format!("[{fill}{}] {pct:.1}%", "░".repeat(empty).bright_black())
}

pub fn format_plan(plan: Plan, msgs: &Messages) -> String {
    msgs.plan_name(plan).blue().to_string()
}

pub fn format_session_info(
    block: Option<&SessionBlock>,
    msgs: &Messages,
    now: DateTime<Utc>,
) -> String {
    let Some(block) = block else {
        return msgs.no_active_session.bright_black().to_string();
    };
    let end = block.end.with_timezone(&Local).format("%H:%M").to_string();
    let remaining = (block.end - now).num_minutes().max(0);
    format!(
        "{} {} ({} {})",
        msgs.session_ends_at,
        end.cyan(),
        format_duration(remaining),
        msgs.remaining
    )
}

/// Full monitor screen for one snapshot.
pub fn render_text(snapshot: &MonitorSnapshot, msgs: &Messages, now: DateTime<Utc>) -> String {
    let rule = "─".repeat(RULE_WIDTH).bright_black().to_string();
    let mut out = String::new();

    let _ = writeln!(out, "\n🎯 {}\n", msgs.usage_monitor.bold());
    if snapshot.plan_transition.is_some() {
        let _ = writeln!(out, "{}", format_warning(msgs.detected_usage_above_pro_limit));
    }
    let _ = writeln!(out, "{}: {}", msgs.plan, format_plan(snapshot.plan, msgs));
    let _ = writeln!(out, "{rule}");

    let _ = writeln!(
        out,
        "{} {}: {} / {}",
        status_glyph(snapshot.status),
        msgs.tokens,
        format_number(snapshot.current_tokens).bold(),
        format_number(snapshot.limit)
    );
    let _ = writeln!(out, "{}", progress_bar(snapshot.percentage, bar_width()));
    let _ = writeln!(out, "{rule}");

    let _ = writeln!(
        out,
        "{} {}: {:.1} {} ({}/h)",
        snapshot.burn_rate_indicator.symbol(),
        msgs.burn_rate,
        snapshot.burn_rate.tokens_per_minute,
        msgs.tokens_per_min,
        format_currency(snapshot.burn_rate.cost_per_hour)
    );
    let _ = writeln!(
        out,
        "{}",
        format_session_info(snapshot.active_block.as_ref(), msgs, now)
    );

    if snapshot.depletes_before_reset() {
        let _ = writeln!(out, "{}", format_warning(msgs.tokens_will_deplete));
    }
    if snapshot.status == TokenStatus::Critical {
        let _ = writeln!(out, "{}", format_warning(msgs.token_limit_nearly_reached));
    }

    let _ = writeln!(out, "\n{}", format_success(msgs.press_ctrl_c_to_exit));
    out
}

pub fn clear_screen() -> anyhow::Result<()> {
    let mut out = io::stdout();
    execute!(out, MoveTo(0, 0), Clear(ClearType::All), Clear(ClearType::Purge))?;
    Ok(())
}

pub fn hide_cursor() -> anyhow::Result<()> {
    let mut out = io::stdout();
    execute!(out, Hide)?;
    Ok(())
}

pub fn show_cursor() -> anyhow::Result<()> {
    let mut out = io::stdout();
    execute!(out, Show)?;
    Ok(())
}

/// Clear the terminal and draw one snapshot.
pub fn draw(snapshot: &MonitorSnapshot, msgs: &Messages) -> anyhow::Result<()> {
    clear_screen()?;
    let mut out = io::stdout().lock();
    out.write_all(render_text(snapshot, msgs, Utc::now()).as_bytes())?;
    out.flush()?;
    Ok(())
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn block_json(b: &SessionBlock) -> serde_json::Value {
    serde_json::json!({
        "id": b.id,
        "start": b.start.to_rfc3339(),
        "end": b.end.to_rfc3339(),
        "actual_end": b.actual_end.map(|d| d.to_rfc3339()),
        "is_active": b.is_active,
        "tokens": {
            "input": b.tokens.input,
            "output": b.tokens.output,
            "cache_create": b.tokens.cache_create,
            "cache_read": b.tokens.cache_read,
            "total": b.tokens.total(),
        },
        "weighted_tokens": block_weighted_tokens(b),
        "cost_usd": b.cost_usd,
        "models": b.models,
        "duration_minutes": b.duration_minutes,
    })
}

pub fn build_json_output(s: &MonitorSnapshot) -> serde_json::Value {
    serde_json::json!({
        "generated_at": s.generated_at.to_rfc3339(),
        "plan": s.plan.as_str(),
        "current_tokens": s.current_tokens,
        "limit": s.limit,
        "percentage": round1(s.percentage),
        "status": s.status,
        "burn_rate": {
            "tokens_per_minute": round1(s.burn_rate.tokens_per_minute),
            "cost_per_hour": s.burn_rate.cost_per_hour,
            "level": s.burn_rate_indicator,
            "symbol": s.burn_rate_indicator.symbol(),
        },
        "active_block": s.active_block.as_ref().map(block_json),
        "projection": s.projection.map(|p| serde_json::json!({
            "projected_total_tokens": p.projected_total_tokens.round(),
            "projected_total_cost": p.projected_total_cost,
            "remaining_minutes": p.remaining_minutes,
        })),
        "depletion_time": s.depletion_time.map(|d| d.to_rfc3339()),
        "depletes_before_reset": s.depletes_before_reset(),
        "plan_transition": s.plan_transition.map(|t| serde_json::json!({
            "from": t.from.as_str(),
            "to": t.to.as_str(),
            "tokens": t.tokens,
        })),
    })
}

pub fn print_json_output(snapshot: &MonitorSnapshot) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(&build_json_output(snapshot))?);
    Ok(())
}

/// Lines shown after startup plan detection.
pub fn render_detection(analysis: &PlanAnalysis, msgs: &Messages) -> String {
    format!(
        "✅ {}: {} ({}: {})\n💡 {}\n📊 {}: {}\n",
        msgs.detected_plan,
        analysis.detected_plan,
        msgs.confidence,
        analysis.confidence.as_str(),
        analysis.recommendation(),
        msgs.max_tokens_used,
        format_number(analysis.max_tokens_used)
    )
}

pub fn render_startup(plan: Plan, refresh: Duration, roots: &[PathBuf], msgs: &Messages) -> String {
    let mut out = format!(
        "\n🚀 {}\n📋 {}: {plan}\n🔄 {}: {}s\n",
        msgs.starting_monitor,
        msgs.plan,
        msgs.refresh_interval,
        refresh.as_secs()
    );
    for root in roots {
        let _ = writeln!(out, "📁 {}: {}", msgs.data_path, root.display());
    }
    out
}

pub fn render_info(report: &InfoReport, msgs: &Messages) -> String {
    let mut out = format!("\n📍 {}:\n\n{}:\n", msgs.data_paths_info, msgs.default_paths);
    for p in &report.default_paths {
        let _ = writeln!(out, "  - {}", p.display());
    }
    let _ = writeln!(out, "\n{}:", msgs.discovered_paths);
    if report.discovered_paths.is_empty() {
        let _ = writeln!(out, "  {}", msgs.no_claude_data_found);
    }
    for p in &report.discovered_paths {
        let _ = writeln!(out, "  ✅ {}", p.display());
    }

    if let Some(a) = &report.analysis {
        let _ = writeln!(out, "\n📊 {}:\n", msgs.usage_analysis);
        let _ = writeln!(out, "{}: {}", msgs.detected_plan, a.detected_plan);
        let _ = writeln!(
            out,
            "{}: {} (weighted)",
            msgs.max_tokens_used,
            format_number(a.max_tokens_used)
        );
        let _ = writeln!(out, "{}: {}", capitalize(msgs.confidence), a.confidence.as_str());
        let _ = writeln!(out, "{}: {}", msgs.note, a.recommendation());
        if let Some(actual) = report.estimated_actual_tokens {
            let _ = writeln!(out, "{}: ~{}", msgs.estimated_actual_tokens, format_number(actual));
        }
    }

    let _ = writeln!(out, "\n💡 {}:", msgs.tips);
    for tip in [
        msgs.tip_env_var,
        msgs.tip_data_path,
        msgs.tip_auto_detect,
        msgs.tip_ensure_running,
    ] {
        let _ = writeln!(out, "  - {tip}");
    }
    out
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
