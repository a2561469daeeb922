// src/config/duration.rs

//! `--wait` / `[run].wait` values: an integer followed by `ms`, `s`, `m` or `h`.

use std::time::Duration;

const UNITS: &[(&str, u64)] = &[("ms", 1), ("s", 1_000), ("m", 60_000), ("h", 3_600_000)];

/// Parse `"250ms"`, `"30s"`, `"10m"` or `"2h"`.
///
/// Values that do not fit in a `Duration` are rejected rather than wrapped.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration".to_string());
    }

    let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (digits, unit) = (&s[..split], s[split..].trim());

    if digits.is_empty() {
        return Err(format!("duration '{}' must start with a number", s));
    }
    if unit.is_empty() {
        return Err(format!("duration '{}' needs a unit (ms, s, m, h)", s));
    }

    let millis_per_unit = UNITS
        .iter()
        .find(|(name, _)| unit.eq_ignore_ascii_case(name))
        .map(|&(_, ms)| ms)
        .ok_or_else(|| format!("unknown duration unit '{}'; expected ms, s, m or h", unit))?;

    let count: u64 = digits
        .parse()
        .map_err(|_| format!("duration '{}' is too large", s))?;

    count
        .checked_mul(millis_per_unit)
        .map(Duration::from_millis)
        .ok_or_else(|| format!("duration '{}' is too large", s))
}
