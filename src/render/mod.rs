pub mod classify;
pub mod color;
pub mod compose;
pub mod fields;
pub mod fmt;
pub mod icons;
pub mod layout;

use chrono::{DateTime, Utc};

/// Per-invocation rendering switches that are not part of the policy.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub color_enabled: bool,
    /// Reference time for quota countdowns.
    pub now: DateTime<Utc>,
}

impl RenderOptions {
    pub fn new(color_enabled: bool) -> Self {
        Self {
            color_enabled,
            now: Utc::now(),
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Prepares a composed line for the host terminal: a leading reset so no
/// inherited style bleeds in, and non-breaking spaces so the host does not
/// collapse or trim runs of spaces.
pub fn output_line(line: &str) -> String {
    let mut out = String::with_capacity(color::RESET.len() + line.len() * 2);
    out.push_str(color::RESET);
    out.extend(line.chars().map(|c| if c == ' ' { '\u{a0}' } else { c }));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_line_resets_and_swaps_spaces() {
        let out = output_line("[Opus] | $1.50");
        assert_eq!(out, "\x1b[0m[Opus]\u{a0}|\u{a0}$1.50");
        assert!(!out.contains(' '));
    }

    #[test]
    fn output_line_keeps_empty_line_prefixed() {
        assert_eq!(output_line(""), color::RESET);
    }
}
