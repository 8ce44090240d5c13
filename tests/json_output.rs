use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use claude_tracker::display::build_json_output;
use claude_tracker::models::{Plan, PlanLimits, UsageEntry};
use claude_tracker::monitor::snapshot_from_blocks;
use claude_tracker::window::{WindowConfig, identify_blocks};

fn now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-01-15T14:30:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

#[test]
fn json_output_shape_without_data() {
    let snapshot = snapshot_from_blocks(Plan::Max20, &[], &PlanLimits::default(), now());
    let json: Value = build_json_output(&snapshot);

    for key in [
        "generated_at",
        "plan",
        "current_tokens",
        "limit",
        "percentage",
        "status",
        "burn_rate",
        "active_block",
        "projection",
        "depletion_time",
        "depletes_before_reset",
        "plan_transition",
    ] {
        assert!(json.get(key).is_some(), "missing key {key}");
    }
    assert_eq!(json["plan"], "max20");
    assert_eq!(json["limit"], 880_000);
    assert_eq!(json["current_tokens"], 0);
    assert_eq!(json["status"], "safe");
    assert_eq!(json["burn_rate"]["level"], "idle");
    assert!(json["active_block"].is_null());
    assert!(json["projection"].is_null());
    assert!(json["depletion_time"].is_null());
    assert!(json["plan_transition"].is_null());
    assert_eq!(json["depletes_before_reset"], false);
}

#[test]
fn json_output_with_active_block_and_transition() {
    let entries = vec![
        UsageEntry {
            input: 9_000,
            output: 1_000,
            model: "claude-opus-4".into(),
            message_id: Some("m1".into()),
            request_id: Some("r1".into()),
            ..UsageEntry::at(now() - Duration::minutes(30))
        },
        UsageEntry {
            input: 500,
            model: "claude-sonnet-4".into(),
            cost_usd: Some(0.02),
            ..UsageEntry::at(now() - Duration::minutes(5))
        },
    ];
    let blocks = identify_blocks(&entries, &WindowConfig::default(), now());
    let snapshot = snapshot_from_blocks(Plan::Pro, &blocks, &PlanLimits::default(), now());
    let json = build_json_output(&snapshot);

    assert_eq!(json["plan"], "custom_max");
    assert_eq!(json["current_tokens"], 50_500);
    // Only block in history is the active one, so it sets the ceiling
    assert_eq!(json["limit"], 50_500);
    assert_eq!(json["percentage"], 100.0);
    assert_eq!(json["status"], "critical");

    let t = &json["plan_transition"];
    assert_eq!(t["from"], "pro");
    assert_eq!(t["to"], "custom_max");
    assert_eq!(t["tokens"], 50_500);

    let b = &json["active_block"];
    assert_eq!(b["is_active"], true);
    assert_eq!(b["start"], "2024-01-15T14:00:00+00:00");
    assert_eq!(b["end"], "2024-01-15T19:00:00+00:00");
    assert_eq!(b["tokens"]["input"], 9_500);
    assert_eq!(b["tokens"]["output"], 1_000);
    assert_eq!(b["weighted_tokens"], 50_500);
    assert_eq!(b["models"], serde_json::json!(["claude-opus-4", "claude-sonnet-4"]));
    assert_eq!(b["duration_minutes"], 25);
    assert!(b.get("entries").is_none());

    assert!(json["burn_rate"]["tokens_per_minute"].as_f64().unwrap() > 0.0);
    assert!(json["projection"]["remaining_minutes"].as_i64().unwrap() > 0);
}
