//! Throughput figures and human-readable number formatting for reports.
use std::time::Duration;

use crate::search::SearchOutcome;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Throughput {
    pub processed: u64,
    pub elapsed: Duration,
    /// Hashes per second; zero when no time has elapsed.
    pub rate: f64,
}

impl Throughput {
    pub fn new(processed: u64, elapsed: Duration) -> Self {
        let secs = elapsed.as_secs_f64();
        let rate = if secs > 0.0 {
            processed as f64 / secs
        } else {
            0.0
        };
        Self {
            processed,
            elapsed,
            rate,
        }
    }

    pub fn of(outcome: &SearchOutcome) -> Self {
        Self::new(outcome.processed(), outcome.elapsed())
    }
}

/// Share of the space covered, as a percentage string.
pub fn pct(n: u128, d: u128) -> String {
    if d == 0 {
        return "0.00%".to_string();
    }
    format!("{:.2}%", (n as f64) / (d as f64) * 100.0)
}

/// Metric-prefixed count, `999`, `1.50k`, `12.3M`.
pub fn format_sizeof(n: f64) -> String {
    const UNITS: [&str; 8] = ["", "k", "M", "G", "T", "P", "E", "Z"];
    let mut value = n;
    for unit in UNITS {
        if value.abs() < 999.5 {
            if unit.is_empty() {
                return format!("{}", value.round() as i64);
            }
            if value.abs() < 99.95 {
                if value.abs() < 9.995 {
                    return format!("{value:.2}{unit}");
                }
                return format!("{value:.1}{unit}");
            }
            return format!("{value:.0}{unit}");
        }
        value /= 1000.0;
    }
    format!("{value:.1}Y")
}

/// `MM:SS`, or `H:MM:SS` past one hour.
pub fn format_interval(d: Duration) -> String {
    let total = d.as_secs();
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}

/// Exact count with thousands separators.
pub fn format_count(n: u128) -> String {
    let s = n.to_string();
    let mut out = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
