use serde_json::{Map, Value};

use crate::state::Stat;

/// Turn the raw `{name: value}` stats object into display rows.
///
/// Keys containing `_` are derived duplicates and are dropped. Order follows
/// the payload. Non-numeric values are treated as missing.
pub fn reshape_stats(raw: &Map<String, Value>) -> Vec<Stat> {
    raw.iter()
        .filter(|(key, _)| !key.contains('_'))
        .filter_map(|(key, value)| {
            value.as_f64().map(|value| Stat {
                name: key.clone(),
                value,
            })
        })
        .collect()
}

pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value:.1}")
    }
}

/// One stat as a fixed-width row with a proportional bar.
pub fn render_stat(stat: &Stat) -> String {
    let bar_len = ((stat.value.max(0.0) / 10.0) as usize).clamp(1, 20);
    let bar = "#".repeat(bar_len);
    format!(
        "{label:<10} {value:>4} {bar}",
        label = stat.name,
        value = format_value(stat.value)
    )
}
