use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};
use howl::{
    config::{FeatureToggles, Policy, ThresholdOverrides},
    providers::{
        AccountInfo, ActivityInfo, GitInfo, QuotaInfo, StubAccountCollector, StubGitCollector,
        StubQuotaCollector, StubTranscriptCollector,
    },
    render::{color::strip_ansi, icons, RenderOptions},
    HowlRunner,
};

fn options() -> RenderOptions {
    RenderOptions {
        color_enabled: true,
        now: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
    }
}

fn offline() -> HowlRunner {
    HowlRunner::with_collectors(
        StubGitCollector::default(),
        StubQuotaCollector::default(),
        StubTranscriptCollector::default(),
        StubAccountCollector::default(),
    )
}

fn everything() -> HowlRunner {
    let now = options().now;
    HowlRunner::with_collectors(
        StubGitCollector {
            info: Some(GitInfo {
                branch: "feature/bars".to_string(),
                dirty: false,
            }),
        },
        StubQuotaCollector {
            info: Some(QuotaInfo {
                remaining_5h: 64.0,
                remaining_7d: 18.0,
                resets_at_5h: Some(now + chrono::Duration::hours(2)),
                resets_at_7d: Some(now + chrono::Duration::hours(75)),
            }),
        },
        StubTranscriptCollector {
            activity: Some(ActivityInfo {
                tools: BTreeMap::from([("Read".to_string(), 9), ("Edit".to_string(), 4)]),
                agents: vec!["Explore".to_string()],
            }),
        },
        StubAccountCollector {
            account: Some(AccountInfo {
                email: "dev@example.com".to_string(),
                display_name: "Dev".to_string(),
            }),
        },
    )
}

fn payload(used_percentage: u32) -> String {
    serde_json::json!({
        "session_id": "layout-test",
        "model": { "id": "claude-opus-4-6", "display_name": "Opus" },
        "workspace": { "current_dir": "/home/dev/howl", "project_dir": "/home/dev/howl" },
        "cost": {
            "total_cost_usd": 1.50,
            "total_duration_ms": 2_700_000,
            "total_api_duration_ms": 900_000,
            "total_lines_added": 250,
            "total_lines_removed": 100
        },
        "context_window": {
            "context_window_size": 200_000,
            "total_output_tokens": 45_000,
            "used_percentage": used_percentage,
            "current_usage": {
                "input_tokens": 8_000,
                "output_tokens": 3_000,
                "cache_creation_input_tokens": 2_000,
                "cache_read_input_tokens": 90_000
            }
        },
        "vim": { "mode": "INSERT" },
        "agent": { "name": "reviewer" }
    })
    .to_string()
}

fn render(runner: &HowlRunner, input: &str, policy: &Policy) -> Vec<String> {
    runner
        .run_from_str(input, policy, &options())
        .expect("render should succeed")
}

#[test]
fn normal_session_shows_identity_and_changes() {
    let lines = render(&offline(), &payload(42), &Policy::default());
    let plain: Vec<String> = lines.iter().map(|l| strip_ansi(l)).collect();
    let all = plain.join("\n");

    assert!(plain[0].contains("Opus"));
    assert!(plain[0].contains("$1.50"));
    assert!(plain[0].contains("42%"));
    assert!(all.contains("+250"));
    assert!(all.contains("-100"));
    assert!(!all.contains(icons::DANGER));
    assert!(!all.contains(icons::WARNING));
}

#[test]
fn danger_session_is_exactly_two_lines() {
    let lines = render(&offline(), &payload(90), &Policy::default());
    assert_eq!(lines.len(), 2, "{lines:#?}");
    assert!(lines[0].contains(icons::DANGER));
    assert!(strip_ansi(&lines[0]).contains("90%"));
}

#[test]
fn modes_partition_on_danger_threshold() {
    for pct in 0..=100 {
        let lines = render(&everything(), &payload(pct), &Policy::default());
        if pct >= 85 {
            assert_eq!(lines.len(), 2, "pct {pct}");
        } else {
            assert!((1..=4).contains(&lines.len()), "pct {pct}");
        }
        assert!(lines.iter().all(|l| !l.is_empty()), "pct {pct}");
    }
}

#[test]
fn full_normal_layout_uses_four_lines() {
    let lines = render(&everything(), &payload(42), &Policy::default());
    let plain: Vec<String> = lines.iter().map(|l| strip_ansi(l)).collect();
    assert_eq!(plain.len(), 4, "{plain:#?}");

    // quota present: the context bar moves off the identity line
    assert!(!plain[0].contains("42%"));
    assert!(plain[1].contains("42%"));
    assert!(plain[1].contains("5h"));
    assert!(plain[1].contains("(2h)"));
    assert!(plain[1].contains("(3d3h)"));
    assert!(plain[1].contains("feature/bars"));
    assert!(plain[1].contains("dev@example.com"));

    assert_eq!(plain[2], "Read(9) Edit(4) | ▶Explore");
    assert!(plain[3].starts_with("Cache:90%"));
    assert!(plain[3].ends_with("I | @reviewer"));
}

#[test]
fn danger_layout_ignores_preset_and_priority() {
    let policy = Policy::resolve(
        "minimal",
        &FeatureToggles::default(),
        &["account"],
        &ThresholdOverrides::default(),
    );
    let lines = render(&everything(), &payload(92), &policy);
    assert_eq!(lines.len(), 2);

    let first = strip_ansi(&lines[0]);
    assert!(first.contains("92%"));
    assert!(first.contains("left"));
    assert!(first.contains("5h"));
    assert!(first.contains("7d"));

    let second = strip_ansi(&lines[1]);
    assert!(second.starts_with("howl/feature/bars"));
    assert!(second.contains("+250/-100"));
    assert!(second.contains("In:8.0K"));
    assert!(second.contains("C90%"));
    assert!(second.contains("A33%"));
    assert!(second.contains("$1.50 ($2.0/h)"));
    assert!(second.ends_with("45m"));
    assert!(!second.contains("dev@example.com"));
}

#[test]
fn lowered_danger_threshold_switches_mode() {
    let policy = Policy::resolve::<&str>(
        "full",
        &FeatureToggles::default(),
        &[],
        &ThresholdOverrides {
            context_danger: 40,
            ..Default::default()
        },
    );
    assert_eq!(render(&offline(), &payload(42), &policy).len(), 2);
}

#[test]
fn minimal_snapshot_without_facts_renders_one_line() {
    for input in ["{}", "", r#"{"model": null, "cost": null}"#] {
        let lines = render(&offline(), input, &Policy::default());
        assert!(!lines.is_empty());
        assert!(lines[0].contains("[?]"), "{input:?} -> {lines:?}");
    }
}

#[test]
fn minimal_preset_keeps_only_identity() {
    let policy = Policy::resolve::<&str>(
        "minimal",
        &FeatureToggles::default(),
        &[],
        &ThresholdOverrides::default(),
    );
    let lines = render(&everything(), &payload(42), &policy);
    assert_eq!(lines.len(), 1, "{lines:#?}");
    let plain = strip_ansi(&lines[0]);
    assert!(plain.contains("42%"));
    assert!(plain.contains("$1.50"));
    assert!(plain.ends_with("45m"));
}

#[test]
fn measured_zero_is_shown_but_absence_is_not() {
    let input = serde_json::json!({
        "model": { "display_name": "Sonnet" },
        "cost": { "total_duration_ms": 600_000, "total_api_duration_ms": 0 },
        "context_window": { "used_percentage": 10 }
    })
    .to_string();
    let lines = render(&offline(), &input, &Policy::default());
    let all = strip_ansi(&lines.join("\n"));
    assert!(all.contains("Wait:0%"), "{all}");
    assert!(!all.contains("Cache:"));
    assert!(!all.contains("tok/s"));
}

#[test]
fn extreme_counters_render_without_panicking() {
    let inputs = [
        r#"{"context_window":{"context_window_size":1000000000000000000,"used_percentage":50}}"#,
        r#"{"context_window":{"context_window_size":1000000000000000000,"used_percentage":99}}"#,
        r#"{"context_window":{"context_window_size":18446744073709551615,"current_usage":{"input_tokens":18446744073709551615,"cache_read_input_tokens":1}}}"#,
        r#"{"cost":{"total_duration_ms":18446744073709551615,"total_api_duration_ms":18446744073709551615,"total_lines_added":18446744073709551615}}"#,
    ];
    for input in inputs {
        let lines = render(&everything(), input, &Policy::default());
        assert!((1..=4).contains(&lines.len()), "{input}");
    }
}

#[test]
fn negative_counters_render_as_zero() {
    let lines = render(
        &offline(),
        r#"{"cost":{"total_lines_added":-1,"total_duration_ms":-60000},"context_window":{"context_window_size":-5}}"#,
        &Policy::default(),
    );
    let plain = strip_ansi(&lines.join("\n"));
    assert!(plain.starts_with("[?]"));
    assert!(!plain.contains("+"), "{plain}");
}
