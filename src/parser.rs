//! Raw row parsing and validation.
//!
//! A raw row either becomes a [`ValidatedSample`] or is attributed to exactly
//! one [`DiscardReason`]. The timestamp is checked first, so a row failing both
//! checks always counts as [`DiscardReason::BadTimestamp`].

use crate::constants::TIMESTAMP_FORMAT;
use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One input line as read, before any validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub timestamp: String,
    pub value: String,
}

impl RawRow {
    pub fn new(timestamp: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            value: value.into(),
        }
    }
}

/// A row whose timestamp and raw voltage both parsed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidatedSample {
    pub timestamp: NaiveDateTime,
    pub raw_value: f64,
}

/// Why a raw row was excluded from the cleaned series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiscardReason {
    BadTimestamp,
    BadValue,
}

impl fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscardReason::BadTimestamp => write!(f, "bad timestamp"),
            DiscardReason::BadValue => write!(f, "bad value"),
        }
    }
}

/// Parse a raw row into a validated sample
///
/// Surrounding whitespace is ignored. `NaN` and infinities are rejected as
/// [`DiscardReason::BadValue`]; any finite decimal is accepted regardless of range.
pub fn parse_row(row: &RawRow) -> Result<ValidatedSample, DiscardReason> {
    let timestamp = parse_timestamp(&row.timestamp).ok_or(DiscardReason::BadTimestamp)?;
    let raw_value = parse_value(&row.value).ok_or(DiscardReason::BadValue)?;

    Ok(ValidatedSample {
        timestamp,
        raw_value,
    })
}

/// Strict `YYYY-MM-DDTHH:MM:SS`
///
/// chrono alone accepts unpadded fields, a signed year and leap second 60, so
/// the text must also match its own re-formatting.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    let timestamp = NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT).ok()?;

    let is_leap_second = timestamp.nanosecond() >= 1_000_000_000;
    if is_leap_second || timestamp.format(TIMESTAMP_FORMAT).to_string() != text {
        return None;
    }
    Some(timestamp)
}

pub fn parse_value(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
