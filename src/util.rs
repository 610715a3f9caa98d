// Utility helpers for parsing cells and formatting numbers.
//
// This module centralizes the "dirty" cell handling so the rest of the code
// can assume clean, typed values.
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use num_format::{Locale, ToFormattedString};

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d-%b-%Y",
    "%d %b %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
];

/// Parse a date cell, trying each accepted layout in order.
///
/// Returns `None` for blanks and anything no layout accepts; callers treat
/// that as "no date" rather than an error.
pub fn parse_date_safe(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    // Offset-aware stamps keep their local calendar date.
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    // Fractional seconds (e.g. `2024-01-05 00:00:00.000`) are dropped first.
    let s = s.split('.').next().unwrap_or(s);
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Parse a non-negative count such as `12`, `1,204` or `12.0`.
///
/// Blank cells count as zero. Decimal values are rounded. Negative,
/// non-finite or non-numeric values yield `None`.
pub fn parse_count_safe(s: &str) -> Option<u64> {
    let s = s.trim();
    if s.is_empty() {
        return Some(0);
    }
    let s = s.replace(',', "");
    if let Ok(n) = s.parse::<u64>() {
        return Some(n);
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Some(v.round() as u64),
        _ => None,
    }
}

/// Convert an Excel serial day number into a calendar date.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::try_days(serial.floor() as i64)?)
}

/// Round to two decimals, half away from zero.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// `numerator / denominator * 100`, rounded, or 0 when the denominator is 0.
pub fn percent(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    round2(numerator as f64 / denominator as f64 * 100.0)
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}
