//! Threshold comparisons that decide how loudly a value is drawn.

use crate::config::Thresholds;

use super::color::{BOLD_RED, GREEN, ORANGE, RED, WHITE, YELLOW};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Critical,
    High,
    Medium,
    Low,
    Healthy,
    Neutral,
}

impl Tier {
    pub fn color(self) -> &'static str {
        match self {
            Tier::Critical => BOLD_RED,
            Tier::High => RED,
            Tier::Medium => ORANGE,
            Tier::Low => YELLOW,
            Tier::Healthy => GREEN,
            Tier::Neutral => WHITE,
        }
    }
}

pub fn context(percent: u32, t: &Thresholds) -> Tier {
    let p = i64::from(percent);
    if p >= t.context_danger {
        Tier::Critical
    } else if p >= t.context_warning {
        Tier::Medium
    } else if p >= t.context_moderate {
        Tier::Low
    } else {
        Tier::Healthy
    }
}

pub fn session_cost(usd: f64, t: &Thresholds) -> Tier {
    if usd >= t.session_cost_high {
        Tier::Critical
    } else if usd >= t.session_cost_medium {
        Tier::Low
    } else {
        Tier::Neutral
    }
}

pub fn cache_efficiency(percent: u32, t: &Thresholds) -> Tier {
    let p = i64::from(percent);
    if p >= t.cache_excellent {
        Tier::Healthy
    } else if p >= t.cache_good {
        Tier::Low
    } else {
        Tier::High
    }
}

pub fn api_wait(percent: u32, t: &Thresholds) -> Tier {
    let p = i64::from(percent);
    if p >= t.wait_high {
        Tier::High
    } else if p >= t.wait_medium {
        Tier::Low
    } else {
        Tier::Healthy
    }
}

pub fn response_speed(tokens_per_sec: u32, t: &Thresholds) -> Tier {
    let s = i64::from(tokens_per_sec);
    if s >= t.speed_fast {
        Tier::Healthy
    } else if s >= t.speed_moderate {
        Tier::Low
    } else {
        Tier::Medium
    }
}

pub fn cost_velocity(per_minute: f64, t: &Thresholds) -> Tier {
    if per_minute >= t.cost_velocity_high {
        Tier::Critical
    } else if per_minute >= t.cost_velocity_medium {
        Tier::Low
    } else {
        Tier::Healthy
    }
}

/// Lower remaining quota is more urgent.
pub fn quota_remaining(percent: f64, t: &Thresholds) -> Tier {
    if percent < t.quota_critical {
        Tier::Critical
    } else if percent < t.quota_low {
        Tier::High
    } else if percent < t.quota_medium {
        Tier::Medium
    } else if percent < t.quota_high {
        Tier::Low
    } else {
        Tier::Healthy
    }
}
