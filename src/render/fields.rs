//! One renderer per displayed item. Each returns an empty string when it has
//! nothing to show; callers decide whether the item is enabled at all.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::{
    config::Thresholds,
    providers::{AccountInfo, GitInfo, QuotaInfo},
    types::{CurrentUsage, ModelInfo, ModelTier, Snapshot},
};

use super::classify::{self, Tier};
use super::color::{
    colorize, visible_width, BLUE, BOLD_YELLOW, CYAN, DIM, GREEN, GREY, MAGENTA, RED, YELLOW,
};
use super::compose::join_parts;
use super::fmt::{format_count, format_minutes, format_time_until, format_tokens, format_window};
use super::icons::{urgency_prefix, BAR_EMPTY, BAR_FILLED, ELLIPSIS, RUNNING};

pub const CONTEXT_BAR_WIDTH: usize = 20;
pub const QUOTA_BAR_WIDTH: usize = 10;

/// Tools shown before the rest collapse into `+N more`.
pub const MAX_TOOLS: usize = 5;
/// Longest tool name kept intact, in characters.
pub const TOOL_NAME_MAX: usize = 12;
/// Visible columns available to the tool list.
pub const TOOL_LIST_BUDGET: usize = 40;
pub const MAX_AGENTS: usize = 2;
pub const AGENT_NAME_MAX: usize = 8;

// ── Bars ────────────────────────────────────────────────────────────

/// `width` cells, `width * percent / 100` of them filled.
pub fn bar(percent: u32, width: usize) -> String {
    let filled = (width * percent as usize / 100).min(width);
    let mut out = String::with_capacity(width * 3);
    out.extend(std::iter::repeat(BAR_FILLED).take(filled));
    out.extend(std::iter::repeat(BAR_EMPTY).take(width - filled));
    out
}

fn context_glyph(percent: u32, t: &Thresholds) -> String {
    let p = i64::from(percent);
    urgency_prefix(p >= t.context_danger, p >= t.context_warning)
}

fn used_tokens(percent: u32, window_size: u64) -> u64 {
    let used = u128::from(window_size) * u128::from(percent) / 100;
    u64::try_from(used).unwrap_or(u64::MAX)
}

/// `⚠ ██████░░░░ 72% (144.0K/200K)`
pub fn context_bar(percent: u32, window_size: u64, t: &Thresholds, color: bool) -> String {
    let tier = classify::context(percent, t);
    let mut out = format!(
        "{}{} {percent}%",
        context_glyph(percent, t),
        colorize(&bar(percent, CONTEXT_BAR_WIDTH), tier.color(), color),
    );
    if window_size > 0 {
        out.push_str(&format!(
            " ({}/{})",
            format_tokens(used_tokens(percent, window_size)),
            format_window(window_size)
        ));
    }
    out
}

/// Context bar plus the tokens left and a linear estimate of the minutes
/// until the window is full.
pub fn danger_context_bar(
    percent: u32,
    window_size: u64,
    elapsed_minutes: u64,
    t: &Thresholds,
    color: bool,
) -> String {
    let mut out = context_bar(percent, window_size, t, color);
    if window_size > 0 {
        let left = window_size.saturating_sub(used_tokens(percent, window_size));
        out.push_str(&format!(" {} left", format_tokens(left)));
    }
    if percent > 0 && elapsed_minutes > 0 {
        let eta = u64::from(100 - percent.min(100)) * elapsed_minutes / u64::from(percent);
        out.push(' ');
        out.push_str(&colorize(&format!("~{}", format_minutes(eta)), GREY, color));
    }
    out
}

/// `⚠ 5h ██░░░░░░░░ 22% (3h)`
pub fn quota_bar(
    label: &str,
    remaining: f64,
    resets_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    t: &Thresholds,
    color: bool,
) -> String {
    let remaining = if remaining.is_finite() {
        remaining.clamp(0.0, 100.0)
    } else {
        0.0
    };
    let tier = classify::quota_remaining(remaining, t);
    let glyph = urgency_prefix(tier == Tier::Critical, tier == Tier::High);
    format!(
        "{glyph}{} {} {} {}",
        colorize(label, GREY, color),
        colorize(&bar(remaining as u32, QUOTA_BAR_WIDTH), tier.color(), color),
        colorize(&format!("{remaining:.0}%"), tier.color(), color),
        colorize(&format!("({})", format_time_until(now, resets_at)), GREY, color),
    )
}

/// Both quota windows, separator-joined.
pub fn quota_bars(quota: &QuotaInfo, now: DateTime<Utc>, t: &Thresholds, color: bool) -> String {
    join_parts(
        [
            quota_bar("5h", quota.remaining_5h, quota.resets_at_5h, now, t, color),
            quota_bar("7d", quota.remaining_7d, quota.resets_at_7d, now, t, color),
        ],
        color,
    )
}

// ── Identity ────────────────────────────────────────────────────────

pub fn model_badge(model: &ModelInfo, color: bool) -> String {
    let tint = match model.tier() {
        ModelTier::Opus => BOLD_YELLOW,
        ModelTier::Sonnet => CYAN,
        ModelTier::Haiku => GREEN,
        ModelTier::Unknown => DIM,
    };
    let text = format!("[{}{}]", model.label(), model.provider_suffix());
    colorize(&text, tint, color)
}

pub fn cost(usd: f64, t: &Thresholds, color: bool) -> String {
    if !usd.is_finite() || usd < 0.001 {
        return String::new();
    }
    let text = if usd < 10.0 {
        format!("${usd:.2}")
    } else {
        format!("${usd:.1}")
    };
    colorize(&text, classify::session_cost(usd, t).color(), color)
}

pub fn hourly_cost(per_minute: f64, color: bool) -> String {
    colorize(&format!("(${:.1}/h)", per_minute * 60.0), YELLOW, color)
}

pub fn duration(ms: u64, color: bool) -> String {
    let minutes = ms / 60_000;
    let text = format_minutes(minutes);
    if minutes == 0 {
        colorize(&text, GREY, color)
    } else {
        text
    }
}

/// Last component of the project directory, else the current directory.
pub fn workspace(snapshot: &Snapshot, color: bool) -> String {
    let dir = [
        snapshot.workspace.project_dir.as_str(),
        snapshot.workspace.current_dir.as_str(),
    ]
    .into_iter()
    .find(|d| !d.is_empty())
    .unwrap_or("");
    let name = dir.trim_end_matches('/').rsplit('/').next().unwrap_or("");
    if name.is_empty() {
        return String::new();
    }
    colorize(&format!("{name}/"), GREY, color)
}

pub fn git_compact(git: &GitInfo, color: bool) -> String {
    if git.branch.is_empty() {
        return String::new();
    }
    let dirty = if git.dirty { "*" } else { "" };
    colorize(&format!("{}{dirty}", git.branch), MAGENTA, color)
}

pub fn account(account: &AccountInfo, color: bool) -> String {
    colorize(&account.email, GREY, color)
}

pub fn line_changes(added: u64, removed: u64, color: bool) -> String {
    if added == 0 && removed == 0 {
        return String::new();
    }
    format!(
        "{}/{}",
        colorize(&format!("+{}", format_count(added)), GREEN, color),
        colorize(&format!("-{}", format_count(removed)), RED, color),
    )
}

pub fn token_breakdown(usage: &CurrentUsage, color: bool) -> String {
    format!(
        "{} {} {}",
        colorize(&format!("In:{}", format_tokens(usage.input_tokens)), GREY, color),
        colorize(&format!("Out:{}", format_tokens(usage.output_tokens)), GREY, color),
        colorize(
            &format!("Cache:{}", format_tokens(usage.cache_read_input_tokens)),
            GREEN,
            color
        ),
    )
}

// ── Rates ───────────────────────────────────────────────────────────

pub fn response_speed(tokens_per_sec: u32, t: &Thresholds, color: bool) -> String {
    let tier = classify::response_speed(tokens_per_sec, t);
    colorize(&format!("{tokens_per_sec}tok/s"), tier.color(), color)
}

fn labeled(label: &str, value: &str, tier: Tier, color: bool) -> String {
    format!(
        "{}{}",
        colorize(label, GREY, color),
        colorize(value, tier.color(), color)
    )
}

pub fn cache_labeled(percent: u32, t: &Thresholds, color: bool) -> String {
    let tier = classify::cache_efficiency(percent, t);
    labeled("Cache:", &format!("{percent}%"), tier, color)
}

pub fn cache_compact(percent: u32, t: &Thresholds, color: bool) -> String {
    let tier = classify::cache_efficiency(percent, t);
    colorize(&format!("C{percent}%"), tier.color(), color)
}

pub fn wait_labeled(percent: u32, t: &Thresholds, color: bool) -> String {
    let tier = classify::api_wait(percent, t);
    labeled("Wait:", &format!("{percent}%"), tier, color)
}

pub fn wait_compact(percent: u32, t: &Thresholds, color: bool) -> String {
    let tier = classify::api_wait(percent, t);
    colorize(&format!("A{percent}%"), tier.color(), color)
}

pub fn cost_velocity_labeled(per_minute: f64, t: &Thresholds, color: bool) -> String {
    let tier = classify::cost_velocity(per_minute, t);
    labeled("Cost:", &format!("${per_minute:.2}/m"), tier, color)
}

// ── Session State ───────────────────────────────────────────────────

pub fn vim_compact(mode: &str, color: bool) -> String {
    let (letter, tint) = match mode.to_lowercase().as_str() {
        "normal" => ("N", BLUE),
        "insert" => ("I", GREEN),
        "visual" => ("V", MAGENTA),
        _ => return String::new(),
    };
    colorize(letter, tint, color)
}

pub fn agent_name(name: &str, color: bool) -> String {
    if name.is_empty() {
        return String::new();
    }
    let short: String = name.chars().take(AGENT_NAME_MAX).collect();
    colorize(&format!("@{short}"), CYAN, color)
}

// ── Activity ────────────────────────────────────────────────────────

fn truncate_name(name: &str) -> String {
    if name.chars().count() <= TOOL_NAME_MAX {
        return name.to_string();
    }
    let mut short: String = name.chars().take(TOOL_NAME_MAX - 1).collect();
    short.push_str(ELLIPSIS);
    short
}

/// `Read(12) Edit(5) Bash(3) +2 more`
///
/// Most used first, at most [`MAX_TOOLS`] entries. Entries are added while
/// they fit in [`TOOL_LIST_BUDGET`] visible columns; the first one is always
/// shown, and whatever did not fit is counted in a trailing `+N more`.
pub fn tool_list(tools: &BTreeMap<String, u32>, color: bool) -> String {
    let mut entries: Vec<(&str, u32)> = tools
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(name, &count)| (name.as_str(), count))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    entries.truncate(MAX_TOOLS);

    let mut shown: Vec<String> = Vec::with_capacity(entries.len());
    let mut used = 0;
    for (i, (name, count)) in entries.iter().enumerate() {
        let piece = format!(
            "{}({count})",
            colorize(&truncate_name(name), BLUE, color)
        );
        let width = visible_width(&piece) + usize::from(i > 0);
        if i > 0 && used + width > TOOL_LIST_BUDGET {
            break;
        }
        used += width;
        shown.push(piece);
    }

    let hidden = entries.len() - shown.len();
    if hidden > 0 {
        shown.push(colorize(&format!("+{hidden} more"), GREY, color));
    }
    shown.join(" ")
}

/// `▶Explore,Plan`
pub fn agent_list(agents: &[String], color: bool) -> String {
    if agents.is_empty() {
        return String::new();
    }
    let names: Vec<String> = agents
        .iter()
        .take(MAX_AGENTS)
        .map(|agent| colorize(agent, CYAN, color))
        .collect();
    format!("{}{}", colorize(RUNNING, YELLOW, color), names.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::color::strip_ansi;
    use chrono::TimeZone;

    fn t() -> Thresholds {
        Thresholds::default()
    }

    #[test]
    fn bar_fills_proportionally_and_caps() {
        assert_eq!(bar(0, 10), "░░░░░░░░░░");
        assert_eq!(bar(42, 10), "████░░░░░░");
        assert_eq!(bar(100, 10), "██████████");
        assert_eq!(bar(250, 4), "████");
    }

    #[test]
    fn context_bar_glyph_tracks_thresholds() {
        assert_eq!(
            context_bar(42, 200_000, &t(), false),
            "████████░░░░░░░░░░░░ 42% (84.0K/200K)"
        );
        assert!(context_bar(72, 200_000, &t(), false).starts_with("⚠ "));
        assert!(context_bar(90, 200_000, &t(), false).starts_with("🔴 "));
        let custom = Thresholds {
            context_warning: 30,
            ..t()
        };
        assert!(context_bar(42, 0, &custom, false).starts_with("⚠ "));
        assert!(!context_bar(42, 0, &custom, false).contains('('));
    }

    #[test]
    fn danger_bar_estimates_time_left() {
        let text = danger_context_bar(90, 200_000, 45, &t(), false);
        assert_eq!(
            text,
            "🔴 ██████████████████░░ 90% (180.0K/200K) 20.0K left ~5m"
        );
    }

    #[test]
    fn bars_handle_enormous_windows() {
        let text = context_bar(50, u64::MAX, &t(), false);
        assert!(text.contains(" 50% ("), "{text}");
        assert!(text.ends_with("M)"), "{text}");
        let text = danger_context_bar(100, u64::MAX, u64::MAX / 60_000, &t(), false);
        assert!(text.contains("0 left"), "{text}");
    }

    #[test]
    fn danger_bar_skips_eta_without_elapsed_time() {
        let text = danger_context_bar(90, 200_000, 0, &t(), false);
        assert!(!text.contains('~'));
        let text = danger_context_bar(0, 200_000, 30, &t(), false);
        assert!(!text.contains('~'));
    }

    #[test]
    fn quota_bar_marks_low_remaining() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let reset = Some(now + chrono::Duration::hours(3));
        assert_eq!(
            quota_bar("5h", 60.0, reset, now, &t(), false),
            "5h ██████░░░░ 60% (3h)"
        );
        assert!(quota_bar("7d", 20.0, None, now, &t(), false).starts_with("⚠ 7d"));
        assert!(quota_bar("7d", 5.0, None, now, &t(), false).starts_with("🔴 7d"));
        assert!(quota_bar("7d", 5.0, None, now, &t(), false).ends_with("(?)"));
    }

    #[test]
    fn model_badge_uses_label_and_suffix() {
        let model = ModelInfo {
            id: "us.anthropic.claude-opus-4".to_string(),
            display_name: "Opus 4".to_string(),
        };
        assert_eq!(model_badge(&model, false), "[Opus 4 BR]");
        assert_eq!(model_badge(&ModelInfo::default(), false), "[?]");
        assert!(model_badge(&model, true).starts_with(BOLD_YELLOW));
    }

    #[test]
    fn cost_formats_by_magnitude() {
        assert_eq!(cost(0.0005, &t(), false), "");
        assert_eq!(cost(1.5, &t(), false), "$1.50");
        assert_eq!(cost(12.34, &t(), false), "$12.3");
        assert!(cost(6.0, &t(), true).starts_with(crate::render::color::BOLD_RED));
    }

    #[test]
    fn duration_and_changes() {
        assert_eq!(duration(30_000, false), "<1m");
        assert_eq!(duration(23 * 60_000, false), "23m");
        assert_eq!(duration(150 * 60_000, false), "2h30m");
        assert_eq!(line_changes(0, 0, false), "");
        assert_eq!(line_changes(250, 100, false), "+250/-100");
        assert_eq!(line_changes(1_500, 0, false), "+1.5K/-0");
    }

    #[test]
    fn workspace_uses_last_component() {
        let mut snapshot = Snapshot::default();
        snapshot.workspace.current_dir = "/home/dev/howl/".to_string();
        assert_eq!(workspace(&snapshot, false), "howl/");
        snapshot.workspace.project_dir = "/srv/app".to_string();
        assert_eq!(workspace(&snapshot, false), "app/");
        snapshot.workspace.project_dir = "/".to_string();
        assert_eq!(workspace(&snapshot, false), "");
    }

    #[test]
    fn compact_session_fields() {
        assert_eq!(vim_compact("INSERT", false), "I");
        assert_eq!(vim_compact("normal", false), "N");
        assert_eq!(vim_compact("replace", false), "");
        assert_eq!(agent_name("reviewer-bot", false), "@reviewer");
        let git = GitInfo {
            branch: "main".to_string(),
            dirty: true,
        };
        assert_eq!(git_compact(&git, false), "main*");
    }

    #[test]
    fn labeled_rates_keep_value_colored() {
        let text = cache_labeled(90, &t(), true);
        assert_eq!(strip_ansi(&text), "Cache:90%");
        assert!(text.contains(GREEN));
        assert_eq!(wait_compact(12, &t(), false), "A12%");
        assert_eq!(cost_velocity_labeled(0.25, &t(), false), "Cost:$0.25/m");
        assert_eq!(hourly_cost(0.25, false), "($15.0/h)");
    }

    #[test]
    fn token_breakdown_uses_magnitudes() {
        let usage = CurrentUsage {
            input_tokens: 30_000,
            output_tokens: 3_000,
            cache_creation_input_tokens: 0,
            cache_read_input_tokens: 1_000_000,
        };
        assert_eq!(token_breakdown(&usage, false), "In:30.0K Out:3.0K Cache:1M");
    }

    #[test]
    fn tool_list_sorts_and_truncates_names() {
        let tools = BTreeMap::from([
            ("Read".to_string(), 3),
            ("Bash".to_string(), 7),
            ("Edit".to_string(), 3),
            ("AVeryLongToolNameIndeed".to_string(), 1),
        ]);
        assert_eq!(
            tool_list(&tools, false),
            "Bash(7) Edit(3) Read(3) AVeryLongTo…(1)"
        );
    }

    #[test]
    fn tool_list_collapses_overflow() {
        let tools: BTreeMap<String, u32> = (0..8)
            .map(|i| (format!("ToolNumber{i:02}"), 10 - i))
            .collect();
        let text = tool_list(&tools, true);
        let plain = strip_ansi(&text);
        // 16 columns per entry: two fit in the budget, the other three of
        // the top five are counted.
        assert_eq!(plain, "ToolNumber00(10) ToolNumber01(9) +3 more");
    }

    #[test]
    fn tool_list_always_shows_first_entry() {
        let tools = BTreeMap::from([("x".repeat(60), 1_000_000_000), ("y".repeat(20), 100_000)]);
        let plain = tool_list(&tools, false);
        assert_eq!(plain, "xxxxxxxxxxx…(1000000000) +1 more");
        assert_eq!(tool_list(&BTreeMap::new(), false), "");
    }

    #[test]
    fn agent_list_shows_first_two() {
        let agents = vec!["Explore".to_string(), "Plan".to_string(), "Review".to_string()];
        assert_eq!(agent_list(&agents, false), "▶Explore,Plan");
        assert_eq!(agent_list(&[], false), "");
    }
}
