use crate::config::Metric;

use super::color::{colorize, GREY};

pub fn separator(color: bool) -> String {
    format!(" {} ", colorize("|", GREY, color))
}

/// Joins the non-empty fragments with the styled separator.
pub fn join_parts<I>(parts: I, color: bool) -> String
where
    I: IntoIterator<Item = String>,
{
    let parts: Vec<String> = parts.into_iter().filter(|p| !p.is_empty()).collect();
    parts.join(&separator(color))
}

/// Builds a line from reorderable metrics.
///
/// Metrics named in `priority` come first, then the rest of `default_order`.
/// Each metric is asked for at most once, so a name repeated in either list
/// lands only in its first position. `produce` returns an empty string for
/// metrics that are disabled or have no data.
pub fn compose_line<F>(
    priority: &[Metric],
    default_order: &[Metric],
    color: bool,
    mut produce: F,
) -> String
where
    F: FnMut(Metric) -> String,
{
    let mut visited: Vec<Metric> = Vec::with_capacity(default_order.len());
    let mut parts = Vec::new();

    for &metric in priority.iter().chain(default_order) {
        if visited.contains(&metric) {
            continue;
        }
        visited.push(metric);
        parts.push(produce(metric));
    }

    join_parts(parts, color)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(metric: Metric) -> String {
        format!("<{}>", metric.name())
    }

    #[test]
    fn default_order_without_priority() {
        let line = compose_line(&[], &Metric::DEFAULT_ORDER, false, fragment);
        assert_eq!(
            line,
            "<git> | <line_changes> | <response_speed> | <quota> | <account>"
        );
    }

    #[test]
    fn priority_moves_metrics_forward_once() {
        let priority = [Metric::Quota, Metric::Git, Metric::Quota];
        let line = compose_line(&priority, &Metric::DEFAULT_ORDER, false, fragment);
        assert_eq!(
            line,
            "<quota> | <git> | <line_changes> | <response_speed> | <account>"
        );
        assert_eq!(line.matches("<quota>").count(), 1);
    }

    #[test]
    fn each_metric_is_produced_once() {
        let mut calls = Vec::new();
        compose_line(
            &[Metric::Account, Metric::Account],
            &Metric::DEFAULT_ORDER,
            false,
            |m| {
                calls.push(m);
                String::new()
            },
        );
        assert_eq!(calls.len(), 5);
    }

    #[test]
    fn empty_fragments_compose_to_empty_line() {
        let line = compose_line(&[Metric::Git], &Metric::DEFAULT_ORDER, true, |_| String::new());
        assert_eq!(line, "");
    }

    #[test]
    fn join_skips_empty_parts() {
        let parts = vec!["a".to_string(), String::new(), "b".to_string()];
        assert_eq!(join_parts(parts, false), "a | b");
        assert_eq!(
            join_parts(vec!["a".to_string(), "b".to_string()], true),
            "a \x1b[38;5;245m|\x1b[0m b"
        );
    }
}
