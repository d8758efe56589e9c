use chrono::{DateTime, Utc};

/// Line and item counts: `999`, `1.2K`.
pub fn format_count(n: u64) -> String {
    if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Token counts: `950`, `84.0K`, `1M`, `1.5M`.
pub fn format_tokens(n: u64) -> String {
    // 999_950 and up would print as `1000.0K`
    if (999_950..1_000_000).contains(&n) {
        return "1M".to_string();
    }
    if n >= 1_000_000 {
        if n % 1_000_000 == 0 {
            format!("{}M", n / 1_000_000)
        } else {
            format!("{:.1}M", n as f64 / 1_000_000.0)
        }
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Context window sizes read best as whole numbers: `200K`, `1M`.
pub fn format_window(n: u64) -> String {
    if n >= 1_000_000 {
        format_tokens(n)
    } else if n >= 1_000 {
        format!("{:.0}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Whole minutes as `<1m`, `Nm` or `NhMm`.
pub fn format_minutes(minutes: u64) -> String {
    if minutes == 0 {
        return "<1m".to_string();
    }
    if minutes < 60 {
        return format!("{minutes}m");
    }
    format!("{}h{}m", minutes / 60, minutes % 60)
}

/// Countdown to a reset time: `?` when unknown, `0` once passed,
/// otherwise `Nh`, `Nd` or `NdMh`.
pub fn format_time_until(now: DateTime<Utc>, target: Option<DateTime<Utc>>) -> String {
    let Some(target) = target else {
        return "?".to_string();
    };
    let diff = target.signed_duration_since(now);
    if diff.num_seconds() < 0 {
        return "0".to_string();
    }

    let hours = diff.num_hours();
    if hours < 24 {
        return format!("{hours}h");
    }
    let (days, rem) = (hours / 24, hours % 24);
    if rem == 0 {
        format!("{days}d")
    } else {
        format!("{days}d{rem}h")
    }
}
