// Utility helpers for parsing and basic statistics.
//
// This module centralizes the forgiving CSV/number handling so the rest of
// the code can assume clean, typed values.
use num_format::{Locale, ToFormattedString};
use std::cmp::Ordering;

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in CSV exports.
///
/// - Accepts `Option<&str>` so callers can pass through optional fields.
/// - Trims whitespace.
/// - Rejects values that contain letters, except an exponent marker.
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed or is not finite.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s
        .chars()
        .any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E')
    {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Integers written by a dataframe with nulls come out as `2021.0`; both
/// spellings are accepted, fractional values are not.
pub fn parse_i32_safe(s: Option<&str>) -> Option<i32> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(v) = s.parse::<i32>() {
        return Some(v);
    }
    let v = parse_f64_safe(Some(s))?;
    if v.fract() != 0.0 || v < i32::MIN as f64 || v > i32::MAX as f64 {
        return None;
    }
    Some(v as i32)
}

/// Month cells are truncated toward zero (`3.7` -> 3). Range is not checked;
/// values beyond `i32` saturate so they still read as out-of-range months
/// instead of missing ones.
pub fn parse_month(s: Option<&str>) -> Option<i32> {
    let v = parse_f64_safe(s)?;
    if v < i32::MIN as f64 || v > i32::MAX as f64 {
        log::warn!("month value {v} does not fit an integer; keeping it as out of range");
    }
    // float-to-int `as` saturates at the bounds
    Some(v.trunc() as i32)
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(v: &[f64]) -> Option<f64> {
    if v.is_empty() {
        return None;
    }
    let sum: f64 = v.iter().copied().sum();
    Some(sum / v.len() as f64)
}

/// Quantile with linear interpolation between closest ranks.
///
/// Sorts its own copy, so callers may pass data in any order.
pub fn quantile(mut v: Vec<f64>, q: f64) -> Option<f64> {
    if v.is_empty() {
        return None;
    }
    v.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let pos = q.clamp(0.0, 1.0) * (v.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(v[lo] + (v[hi] - v[lo]) * frac)
}

pub fn median(v: Vec<f64>) -> Option<f64> {
    quantile(v, 0.5)
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

/// Human-readable magnitude with one decimal: `1.2K`, `3.4M`, `5.0B`.
pub fn human_int(n: f64) -> String {
    if n >= 1_000_000_000.0 {
        format!("{:.1}B", n / 1_000_000_000.0)
    } else if n >= 1_000_000.0 {
        format!("{:.1}M", n / 1_000_000.0)
    } else if n >= 1_000.0 {
        format!("{:.1}K", n / 1_000.0)
    } else {
        format!("{:.0}", n)
    }
}

/// Compact currency for axis-style labels: `$12B`, `$3M`, `$5K`, `$7`.
pub fn currency_compact(x: f64) -> String {
    if x >= 1e9 {
        format!("${:.0}B", x * 1e-9)
    } else if x >= 1e6 {
        format!("${:.0}M", x * 1e-6)
    } else if x >= 1e3 {
        format!("${:.0}K", x * 1e-3)
    } else {
        format!("${:.0}", x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_forgiving_numbers() {
        assert_eq!(parse_f64_safe(Some(" 1,234.5 ")), Some(1234.5));
        assert_eq!(parse_f64_safe(Some("1e9")), Some(1e9));
        assert_eq!(parse_f64_safe(Some("n/a")), None);
        assert_eq!(parse_f64_safe(Some("nan")), None);
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn parses_years_written_as_floats() {
        assert_eq!(parse_i32_safe(Some("2021")), Some(2021));
        assert_eq!(parse_i32_safe(Some("2021.0")), Some(2021));
        assert_eq!(parse_i32_safe(Some("2021.5")), None);
        assert_eq!(parse_i32_safe(Some("twenty")), None);
    }

    #[test]
    fn month_is_truncated_not_clamped() {
        assert_eq!(parse_month(Some("3.0")), Some(3));
        assert_eq!(parse_month(Some("13")), Some(13));
        assert_eq!(parse_month(Some("0")), Some(0));
        assert_eq!(parse_month(Some("")), None);
        assert_eq!(parse_month(Some("1e10")), Some(i32::MAX));
        assert_eq!(parse_month(Some("-1e10")), Some(i32::MIN));
    }

    #[test]
    fn quantile_interpolates() {
        assert_eq!(median(vec![3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(vec![1.0, 2.0, 3.0, 4.0]), Some(2.5));
        assert_eq!(quantile(vec![20.0, 0.0, 10.0], 0.25), Some(5.0));
        assert_eq!(quantile(Vec::new(), 0.5), None);
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn formats_numbers() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-1500.0, 0), "-1,500");
        assert_eq!(format_int(9855), "9,855");
        assert_eq!(human_int(1_500.0), "1.5K");
        assert_eq!(human_int(2_000_000_000.0), "2.0B");
        assert_eq!(human_int(42.0), "42");
        assert_eq!(currency_compact(3_200_000.0), "$3M");
        assert_eq!(currency_compact(999.0), "$999");
    }
}
