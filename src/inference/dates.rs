//! Epoch and formatted-string date parsing

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::error::DateParseError;
use crate::flatten::Scalar;

/// Integer-part digit count above which an epoch is read as milliseconds
///
/// Ten digits of seconds run out in the year 2286.
pub const EPOCH_SECONDS_MAX_DIGITS: usize = 10;

/// How a value was recognised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateFormat {
    /// Seconds since the Unix epoch
    EpochSeconds,
    /// Milliseconds since the Unix epoch
    EpochMillis,
    /// ISO 8601, with or without offset
    Iso8601,
    /// `7/30/2024 6:27:00 PM`
    MonthDayYearMeridian,
    /// `2024-07-30 18:27:00`, naive, read as UTC
    YearMonthDay,
    /// `30-07-2024 18:27:00`, naive, read as UTC
    DayMonthYear,
}

/// A successfully parsed instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedInstant {
    pub instant: DateTime<Utc>,
    pub format: DateFormat,
}

// Digits with at most one decimal point
static EPOCH_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+\.?\d*|\.\d+)$").unwrap());

const ISO_OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
];

const ISO_NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Whether a value should be read as an epoch number
pub fn is_epoch(value: &Scalar) -> bool {
    match value {
        Scalar::Int(_) | Scalar::Float(_) => true,
        Scalar::Text(s) => EPOCH_REGEX.is_match(s.trim()),
        _ => false,
    }
}

/// Parse any scalar: epochs first, then the ordered string formats
pub fn parse_datetime(value: &Scalar) -> Result<ParsedInstant, DateParseError> {
    match value {
        Scalar::Int(_) | Scalar::Float(_) => parse_epoch(value),
        Scalar::Text(s) => parse_datetime_str(s),
        other => Err(DateParseError::unparseable(other.to_string())),
    }
}

/// Parse a string: digit strings as epochs, everything else by format
pub fn parse_datetime_str(value: &str) -> Result<ParsedInstant, DateParseError> {
    let trimmed = value.trim();
    if EPOCH_REGEX.is_match(trimmed) {
        return epoch_from_text(trimmed);
    }
    parse_formatted(trimmed).ok_or_else(|| DateParseError::unparseable(value))
}

/// Read a numeric scalar (or a numeric string) as an epoch
pub fn parse_epoch(value: &Scalar) -> Result<ParsedInstant, DateParseError> {
    match value {
        Scalar::Int(i) => epoch_from_parts(*i, digit_count(i.unsigned_abs()), &i.to_string()),
        Scalar::Float(f) => {
            if !f.is_finite() || f.abs() >= i64::MAX as f64 {
                return Err(DateParseError::OutOfRange {
                    value: f.to_string(),
                });
            }
            let whole = f.trunc() as i64;
            epoch_from_parts(whole, digit_count(whole.unsigned_abs()), &f.to_string())
        }
        Scalar::Text(s) => {
            let trimmed = s.trim();
            if EPOCH_REGEX.is_match(trimmed) {
                epoch_from_text(trimmed)
            } else {
                Err(DateParseError::unparseable(s.as_str()))
            }
        }
        other => Err(DateParseError::unparseable(other.to_string())),
    }
}

/// Whether the instant falls exactly on midnight UTC
pub fn is_midnight(instant: &DateTime<Utc>) -> bool {
    instant.time() == NaiveTime::MIN && instant.nanosecond() == 0
}

fn epoch_from_text(text: &str) -> Result<ParsedInstant, DateParseError> {
    let integer_part = text.split('.').next().unwrap_or_default();
    let digits = integer_part.len();
    let whole: i64 = if integer_part.is_empty() {
        0
    } else {
        integer_part.parse().map_err(|_| DateParseError::OutOfRange {
            value: text.to_string(),
        })?
    };
    epoch_from_parts(whole, digits, text)
}

fn epoch_from_parts(whole: i64, digits: usize, raw: &str) -> Result<ParsedInstant, DateParseError> {
    let (instant, format) = if digits > EPOCH_SECONDS_MAX_DIGITS {
        (DateTime::from_timestamp_millis(whole), DateFormat::EpochMillis)
    } else {
        (DateTime::from_timestamp(whole, 0), DateFormat::EpochSeconds)
    };
    instant
        .map(|instant| ParsedInstant { instant, format })
        .ok_or_else(|| DateParseError::OutOfRange {
            value: raw.to_string(),
        })
}

fn digit_count(value: u64) -> usize {
    value.checked_ilog10().map_or(1, |log| log as usize + 1)
}

fn parse_formatted(value: &str) -> Option<ParsedInstant> {
    parse_iso8601(value)
        .map(|instant| (instant, DateFormat::Iso8601))
        .or_else(|| {
            naive(value, "%m/%d/%Y %I:%M:%S %p").map(|i| (i, DateFormat::MonthDayYearMeridian))
        })
        .or_else(|| naive(value, "%Y-%m-%d %H:%M:%S%.f").map(|i| (i, DateFormat::YearMonthDay)))
        .or_else(|| naive(value, "%d-%m-%Y %H:%M:%S%.f").map(|i| (i, DateFormat::DayMonthYear)))
        .map(|(instant, format)| ParsedInstant { instant, format })
}

fn parse_iso8601(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ISO_OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for format in ISO_NAIVE_FORMATS {
        if let Some(dt) = naive(value, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
}

fn naive(value: &str, format: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, format)
        .ok()
        .map(|dt| dt.and_utc())
}
