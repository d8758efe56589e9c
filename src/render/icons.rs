pub const DANGER: &str = "🔴";
pub const WARNING: &str = "⚠";
pub const RUNNING: &str = "▶";
pub const ELLIPSIS: &str = "…";

pub const BAR_FILLED: char = '█';
pub const BAR_EMPTY: char = '░';

/// Urgency marker placed before a bar, with its trailing space.
pub fn urgency_prefix(danger: bool, warning: bool) -> String {
    if danger {
        format!("{DANGER} ")
    } else if warning {
        format!("{WARNING} ")
    } else {
        String::new()
    }
}
