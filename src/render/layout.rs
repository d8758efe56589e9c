use crate::{
    config::{Metric, Policy, Thresholds},
    metrics::DerivedMetrics,
    providers::{AccountInfo, ActivityInfo, GitInfo, QuotaInfo},
    types::Snapshot,
};

use super::compose::{compose_line, join_parts};
use super::fields;
use super::RenderOptions;

/// Facts gathered from collaborators. Each one is independently optional.
#[derive(Debug, Clone, Copy, Default)]
pub struct Facts<'a> {
    pub git: Option<&'a GitInfo>,
    pub quota: Option<&'a QuotaInfo>,
    pub activity: Option<&'a ActivityInfo>,
    pub account: Option<&'a AccountInfo>,
}

#[derive(Debug, Clone, Copy)]
pub struct RenderInput<'a> {
    pub snapshot: &'a Snapshot,
    pub metrics: &'a DerivedMetrics,
    pub facts: Facts<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Danger,
}

impl Mode {
    pub fn select(context_percent: u32, t: &Thresholds) -> Self {
        if i64::from(context_percent) >= t.context_danger {
            Mode::Danger
        } else {
            Mode::Normal
        }
    }
}

/// The composed display. Normal lines may be empty and are dropped on
/// output; danger mode always has both lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Normal {
        identity: String,
        metrics: String,
        activity: String,
        secondary: String,
    },
    Danger {
        identity: String,
        detail: String,
    },
}

impl Frame {
    pub fn mode(&self) -> Mode {
        match self {
            Frame::Normal { .. } => Mode::Normal,
            Frame::Danger { .. } => Mode::Danger,
        }
    }

    pub fn into_lines(self) -> Vec<String> {
        match self {
            Frame::Normal {
                identity,
                metrics,
                activity,
                secondary,
            } => [identity, metrics, activity, secondary]
                .into_iter()
                .filter(|line| !line.is_empty())
                .collect(),
            Frame::Danger { identity, detail } => vec![identity, detail],
        }
    }
}

pub fn build_frame(input: &RenderInput<'_>, policy: &Policy, options: &RenderOptions) -> Frame {
    match Mode::select(input.metrics.context_percent, policy.thresholds()) {
        Mode::Danger => build_danger(input, policy.thresholds(), options),
        Mode::Normal => build_normal(input, policy, options),
    }
}

pub fn render_frame(input: &RenderInput<'_>, policy: &Policy, options: &RenderOptions) -> Vec<String> {
    build_frame(input, policy, options).into_lines()
}

// ── Normal ──────────────────────────────────────────────────────────

fn build_normal(input: &RenderInput<'_>, policy: &Policy, options: &RenderOptions) -> Frame {
    let RenderInput {
        snapshot,
        metrics,
        facts,
    } = *input;
    let features = policy.features();
    let t = policy.thresholds();
    let color = options.color_enabled;

    let context_bar = fields::context_bar(
        metrics.context_percent,
        snapshot.context_window.context_window_size,
        t,
        color,
    );
    // With quota data the context bar moves next to the quota bars.
    let hosted_quota = facts.quota.filter(|_| features.quota);

    let identity = join_parts(
        [
            fields::model_badge(&snapshot.model, color),
            if hosted_quota.is_none() {
                context_bar.clone()
            } else {
                String::new()
            },
            fields::cost(snapshot.cost.total_cost_usd, t, color),
            fields::duration(snapshot.cost.total_duration_ms, color),
        ],
        color,
    );

    let metrics_line = compose_line(
        policy.priority(),
        &Metric::DEFAULT_ORDER,
        color,
        |metric| {
            if !features.enabled(metric) {
                return String::new();
            }
            match metric {
                Metric::Git => facts
                    .git
                    .map(|git| fields::git_compact(git, color))
                    .unwrap_or_default(),
                Metric::LineChanges => fields::line_changes(
                    snapshot.cost.total_lines_added,
                    snapshot.cost.total_lines_removed,
                    color,
                ),
                Metric::ResponseSpeed => metrics
                    .response_speed
                    .map(|speed| fields::response_speed(speed, t, color))
                    .unwrap_or_default(),
                Metric::Quota => hosted_quota
                    .map(|quota| {
                        join_parts(
                            [
                                context_bar.clone(),
                                fields::quota_bars(quota, options.now, t, color),
                            ],
                            color,
                        )
                    })
                    .unwrap_or_default(),
                Metric::Account => facts
                    .account
                    .map(|account| fields::account(account, color))
                    .unwrap_or_default(),
            }
        },
    );

    let activity = match facts.activity {
        Some(activity) => join_parts(
            [
                if features.tools {
                    fields::tool_list(&activity.tools, color)
                } else {
                    String::new()
                },
                if features.agents {
                    fields::agent_list(&activity.agents, color)
                } else {
                    String::new()
                },
            ],
            color,
        ),
        None => String::new(),
    };

    let mut secondary = Vec::with_capacity(5);
    if features.cache_efficiency {
        if let Some(pct) = metrics.cache_efficiency {
            secondary.push(fields::cache_labeled(pct, t, color));
        }
    }
    if features.api_wait_ratio {
        if let Some(pct) = metrics.api_wait_ratio {
            secondary.push(fields::wait_labeled(pct, t, color));
        }
    }
    if features.cost_velocity {
        if let Some(rate) = metrics.cost_per_minute {
            secondary.push(fields::cost_velocity_labeled(rate, t, color));
        }
    }
    if features.vim_mode {
        if let Some(mode) = snapshot.vim_mode() {
            secondary.push(fields::vim_compact(mode, color));
        }
    }
    if features.agent_name {
        if let Some(name) = snapshot.agent_name() {
            secondary.push(fields::agent_name(name, color));
        }
    }

    Frame::Normal {
        identity,
        metrics: metrics_line,
        activity,
        secondary: join_parts(secondary, color),
    }
}

// ── Danger ──────────────────────────────────────────────────────────

/// Fixed two-line layout. Feature toggles and priority do not apply here,
/// so only the thresholds are passed in.
fn build_danger(input: &RenderInput<'_>, t: &Thresholds, options: &RenderOptions) -> Frame {
    let RenderInput {
        snapshot,
        metrics,
        facts,
    } = *input;
    let color = options.color_enabled;

    let identity = join_parts(
        [
            fields::model_badge(&snapshot.model, color),
            fields::danger_context_bar(
                metrics.context_percent,
                snapshot.context_window.context_window_size,
                DerivedMetrics::elapsed_minutes(snapshot),
                t,
                color,
            ),
            facts
                .quota
                .map(|quota| fields::quota_bars(quota, options.now, t, color))
                .unwrap_or_default(),
        ],
        color,
    );

    let location = format!(
        "{}{}",
        fields::workspace(snapshot, color),
        facts
            .git
            .map(|git| fields::git_compact(git, color))
            .unwrap_or_default()
    );

    let cost = fields::cost(snapshot.cost.total_cost_usd, t, color);
    let spend = match metrics.cost_per_minute {
        Some(rate) if cost.is_empty() => fields::hourly_cost(rate, color),
        Some(rate) => format!("{cost} {}", fields::hourly_cost(rate, color)),
        None => cost,
    };

    let detail = join_parts(
        [
            location,
            fields::line_changes(
                snapshot.cost.total_lines_added,
                snapshot.cost.total_lines_removed,
                color,
            ),
            snapshot
                .context_window
                .current_usage
                .as_ref()
                .map(|usage| fields::token_breakdown(usage, color))
                .unwrap_or_default(),
            metrics
                .response_speed
                .map(|speed| fields::response_speed(speed, t, color))
                .unwrap_or_default(),
            metrics
                .cache_efficiency
                .map(|pct| fields::cache_compact(pct, t, color))
                .unwrap_or_default(),
            metrics
                .api_wait_ratio
                .map(|pct| fields::wait_compact(pct, t, color))
                .unwrap_or_default(),
            spend,
            fields::duration(snapshot.cost.total_duration_ms, color),
        ],
        color,
    );

    Frame::Danger { identity, detail }
}
