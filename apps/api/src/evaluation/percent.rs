//! Percentage extraction from free-text model output (match action only).

use once_cell::sync::Lazy;
use regex::Regex;

static PERCENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)%").unwrap());

/// Finds the first integer immediately followed by a literal `%` sign.
///
/// Only the first match is used even when several percentages appear.
/// The value is reported as-is — a model emitting "150%" yields 150; there
/// is deliberately no 0–100 clamping. `None` is an expected outcome of
/// free-text generation, not an error.
pub fn extract_percentage(text: &str) -> Option<u32> {
    PERCENT_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
}
