use crate::types::Snapshot;

const MS_PER_MINUTE: u64 = 60_000;

/// Values derived once from the snapshot. `None` means "not enough data",
/// which is distinct from a measured zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DerivedMetrics {
    pub context_percent: u32,
    pub cache_efficiency: Option<u32>,
    pub api_wait_ratio: Option<u32>,
    pub cost_per_minute: Option<f64>,
    pub response_speed: Option<u32>,
}

impl DerivedMetrics {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            context_percent: context_percent(snapshot),
            cache_efficiency: cache_efficiency(snapshot),
            api_wait_ratio: api_wait_ratio(snapshot),
            cost_per_minute: cost_per_minute(snapshot),
            response_speed: response_speed(snapshot),
        }
    }

    /// Minutes elapsed in the session, truncated.
    pub fn elapsed_minutes(snapshot: &Snapshot) -> u64 {
        snapshot.cost.total_duration_ms / MS_PER_MINUTE
    }
}

/// `part * 100 / whole` without overflow, saturating at `u64::MAX`.
/// `whole` must be non-zero.
fn percent_of(part: u64, whole: u64) -> u64 {
    let percent = u128::from(part) * 100 / u128::from(whole);
    u64::try_from(percent).unwrap_or(u64::MAX)
}

fn context_percent(snapshot: &Snapshot) -> u32 {
    let window = &snapshot.context_window;
    if let Some(used) = window.used_percentage {
        if !used.is_finite() || used <= 0.0 {
            return 0;
        }
        return (used as u32).min(100);
    }

    let Some(usage) = window.current_usage.as_ref() else {
        return 0;
    };
    if window.context_window_size == 0 {
        return 0;
    }
    let percent = percent_of(usage.context_tokens(), window.context_window_size);
    percent.min(100) as u32
}

fn cache_efficiency(snapshot: &Snapshot) -> Option<u32> {
    let usage = snapshot.context_window.current_usage.as_ref()?;
    let total = usage.context_tokens();
    if total == 0 {
        return None;
    }
    Some(percent_of(usage.cache_read_input_tokens, total).min(100) as u32)
}

fn api_wait_ratio(snapshot: &Snapshot) -> Option<u32> {
    let cost = &snapshot.cost;
    if cost.total_duration_ms == 0 {
        return None;
    }
    let ratio = percent_of(cost.total_api_duration_ms, cost.total_duration_ms);
    Some(u32::try_from(ratio).unwrap_or(u32::MAX))
}

fn cost_per_minute(snapshot: &Snapshot) -> Option<f64> {
    let cost = &snapshot.cost;
    if cost.total_duration_ms < MS_PER_MINUTE {
        return None;
    }
    let minutes = cost.total_duration_ms as f64 / MS_PER_MINUTE as f64;
    Some(cost.total_cost_usd / minutes)
}

fn response_speed(snapshot: &Snapshot) -> Option<u32> {
    let api_ms = snapshot.cost.total_api_duration_ms;
    let output = snapshot.context_window.total_output_tokens;
    if api_ms == 0 || output == 0 {
        return None;
    }
    let seconds = api_ms as f64 / 1000.0;
    Some((output as f64 / seconds) as u32)
}
