//! User-facing strings, resolved once at startup and passed to the renderers.

use crate::models::Plan;

#[derive(Debug, Clone)]
pub struct Messages {
    pub usage_monitor: &'static str,
    pub plan: &'static str,
    pub tokens: &'static str,
    pub burn_rate: &'static str,
    pub tokens_per_min: &'static str,
    pub session_ends_at: &'static str,
    pub remaining: &'static str,
    pub no_active_session: &'static str,
    pub press_ctrl_c_to_exit: &'static str,
    pub monitor_stopped: &'static str,
    pub tokens_will_deplete: &'static str,
    pub token_limit_nearly_reached: &'static str,
    pub detected_usage_above_pro_limit: &'static str,
    pub error_updating_monitor: &'static str,
    pub auto_detecting_plan: &'static str,
    pub detected_plan: &'static str,
    pub confidence: &'static str,
    pub max_tokens_used: &'static str,
    pub starting_monitor: &'static str,
    pub refresh_interval: &'static str,
    pub data_path: &'static str,
    pub data_paths_info: &'static str,
    pub default_paths: &'static str,
    pub discovered_paths: &'static str,
    pub no_claude_data_found: &'static str,
    pub usage_analysis: &'static str,
    pub estimated_actual_tokens: &'static str,
    pub note: &'static str,
    pub tips: &'static str,
    pub tip_env_var: &'static str,
    pub tip_data_path: &'static str,
    pub tip_auto_detect: &'static str,
    pub tip_ensure_running: &'static str,
}

impl Messages {
    pub fn english() -> Self {
        Self {
            usage_monitor: "Claude Code Usage Monitor",
            plan: "Plan",
            tokens: "Tokens",
            burn_rate: "Burn Rate",
            tokens_per_min: "tokens/min",
            session_ends_at: "Session ends at",
            remaining: "remaining",
            no_active_session: "No active session",
            press_ctrl_c_to_exit: "Press Ctrl+C to exit",
            monitor_stopped: "Monitor stopped",
            tokens_will_deplete: "Tokens will deplete before session reset!",
            token_limit_nearly_reached: "Token limit nearly reached!",
            detected_usage_above_pro_limit:
                "Detected usage above Pro limit. Switching to custom_max mode.",
            error_updating_monitor: "Error updating monitor",
            auto_detecting_plan: "Auto-detecting plan from usage history...",
            detected_plan: "Detected plan",
            confidence: "confidence",
            max_tokens_used: "Max tokens used",
            starting_monitor: "Starting Claude Code Usage Monitor...",
            refresh_interval: "Refresh interval",
            data_path: "Data path",
            data_paths_info: "Claude Data Paths",
            default_paths: "Default paths",
            discovered_paths: "Discovered paths",
            no_claude_data_found: "No Claude data directories found",
            usage_analysis: "Usage Analysis",
            estimated_actual_tokens: "Estimated actual tokens",
            note: "Note",
            tips: "Tips",
            tip_env_var: "Use CLAUDE_DATA_PATH environment variable to set custom path",
            tip_data_path: "Use --data-path option to override the default path",
            tip_auto_detect: "Use --plan auto (or just omit --plan) for automatic plan detection",
            tip_ensure_running: "Make sure Claude Code is running and has created session data",
        }
    }

    pub fn plan_name(&self, plan: Plan) -> &'static str {
        match plan {
            Plan::Pro => "Claude Pro (~7k tokens)",
            Plan::Max5 => "Claude Max5 (~35k tokens)",
            Plan::Max20 => "Claude Max20 (~140k tokens)",
            Plan::CustomMax => "Custom Max (auto-detected)",
        }
    }
}

impl Default for Messages {
    fn default() -> Self {
        Self::english()
    }
}
