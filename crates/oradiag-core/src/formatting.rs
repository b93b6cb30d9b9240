use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use strum::{Display, EnumIter, IntoEnumIterator};

const SIZE_UNITS: [&str; 7] = ["B", "KB", "MB", "GB", "TB", "PB", "EB"];

/// Renders a byte count with a binary unit, e.g. `1536` as `"1.5 KB"`.
///
/// The value is rounded to two decimals and always keeps at least one
/// (`1024` renders as `"1.0 KB"`). Zero renders as `"0B"`.
pub fn convert_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0B".to_string();
    }
    let mut unit = 0;
    let mut divisor = 1u64;
    while unit + 1 < SIZE_UNITS.len() && bytes / divisor >= 1024 {
        divisor *= 1024;
        unit += 1;
    }
    #[allow(clippy::cast_precision_loss)]
    let scaled = bytes as f64 / divisor as f64;
    let mut rendered = format!("{scaled:.2}");
    while rendered.ends_with('0') && !rendered.ends_with(".0") {
        rendered.pop();
    }
    format!("{rendered} {}", SIZE_UNITS[unit])
}

/// Groups the integer part of a numeric string into thousands.
///
/// Any leading text before the first digit (or decimal separator) is kept as a
/// prefix, and the fractional part after the last decimal separator is kept
/// untouched: `format_number("$1234567.89", ",", ".")` gives `"$1,234,567.89"`.
pub fn format_number(value: &str, thousands_sep: &str, decimal_sep: &str) -> String {
    let start = value
        .find(|c: char| c.is_ascii_digit() || decimal_sep.contains(c))
        .unwrap_or(value.len());
    let (prefix, rest) = value.split_at(start);
    let (integer, fraction) = match rest.rfind(decimal_sep) {
        Some(pos) if !decimal_sep.is_empty() && pos > 0 => rest.split_at(pos),
        _ => (rest, ""),
    };
    let chars: Vec<char> = integer.chars().collect();
    let grouped = chars
        .rchunks(3)
        .rev()
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(thousands_sep);
    format!("{prefix}{grouped}{fraction}")
}

/// Date layouts accepted by [`validate_date`], named the way the database
/// spells them.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Display, EnumIter, Serialize)]
pub enum DateFormat {
    /// Calendar date only.
    #[strum(to_string = "YYYY-MM-DD")]
    Date,
    /// Date plus a 24-hour clock hour.
    #[strum(to_string = "YYYY-MM-DD HH24")]
    DateHour,
    /// Date, hour, and minute.
    #[strum(to_string = "YYYY-MM-DD HH24:MI")]
    DateHourMinute,
    /// Date and full time of day.
    #[strum(to_string = "YYYY-MM-DD HH24:MI:SS")]
    DateTime,
}

impl DateFormat {
    fn matches(self, input: &str) -> bool {
        match self {
            Self::Date => NaiveDate::parse_from_str(input, "%Y-%m-%d").is_ok(),
            // chrono will not build a time from an hour alone
            Self::DateHour => {
                NaiveDateTime::parse_from_str(&format!("{input}:00"), "%Y-%m-%d %H:%M").is_ok()
                    && !input.contains(':')
            }
            Self::DateHourMinute => {
                NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M").is_ok()
            }
            Self::DateTime => NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S").is_ok(),
        }
    }
}

/// Returns the first [`DateFormat`] that `input` is a valid instance of.
pub fn validate_date(input: &str) -> Option<DateFormat> {
    DateFormat::iter().find(|format| format.matches(input))
}
