//! Calendar arithmetic for policy terms
//!
//! This module provides the date conventions used when deriving values from a
//! policy document:
//! - Age in full years at a reference date
//! - Contract term in months (a started month counts as elapsed)
//! - Contract term in days (both ends inclusive)
//! - Lenient parsing of the date and time formats found in policy documents

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use thiserror::Error;

/// Timezone wrapper for tenant jurisdictions
///
/// Wraps chrono_tz::Tz with string serialization support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse()
            .map_err(|_| serde::de::Error::custom(format!("Invalid timezone: {}", s)))
    }
}

impl FromStr for Timezone {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tz::from_str(s.trim())
            .map(Timezone)
            .map_err(|_| TemporalError::InvalidTimezone(s.to_string()))
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// Converts a UTC instant to the local calendar date
    pub fn local_date(&self, utc: DateTime<Utc>) -> NaiveDate {
        utc.with_timezone(&self.0).date_naive()
    }

    /// Today's date in this timezone
    pub fn today(&self) -> NaiveDate {
        self.local_date(Utc::now())
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(chrono_tz::Europe::Moscow)
    }
}

/// Errors related to temporal operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid period: start {start} must not be after end {end}")]
    InvalidPeriod { start: String, end: String },

    #[error("Unparsable date: {0}")]
    InvalidDate(String),

    #[error("Unparsable time: {0}")]
    InvalidTime(String),

    #[error("Unknown timezone: {0}")]
    InvalidTimezone(String),
}

/// Parses a date as found in policy documents
///
/// Accepts `YYYY-MM-DD`, `DD.MM.YYYY` and the date part of an ISO-8601
/// datetime (`2024-03-01T10:00:00Z`).
pub fn parse_date(raw: &str) -> Result<NaiveDate, TemporalError> {
    let trimmed = raw.trim();
    let date_part = trimmed.split(['T', ' ']).next().unwrap_or(trimmed);

    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(date_part, "%d.%m.%Y"))
        .map_err(|_| TemporalError::InvalidDate(raw.to_string()))
}

/// Parses a time of day, `HH:MM` or `HH:MM:SS`
pub fn parse_time(raw: &str) -> Result<NaiveTime, TemporalError> {
    let trimmed = raw.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|_| TemporalError::InvalidTime(raw.to_string()))
}

/// Age in full years on `on_date` for someone born on `birth_date`
///
/// Someone born on 29 February turns a year older on 1 March in non-leap
/// years.
pub fn age_on(birth_date: NaiveDate, on_date: NaiveDate) -> Result<u32, TemporalError> {
    if birth_date > on_date {
        return Err(TemporalError::InvalidPeriod {
            start: birth_date.to_string(),
            end: on_date.to_string(),
        });
    }

    let mut years = on_date.year() - birth_date.year();
    if (on_date.month(), on_date.day()) < (birth_date.month(), birth_date.day()) {
        years -= 1;
    }
    Ok(years.max(0) as u32)
}

/// Contract term in months between `start` and the inclusive `end` date
///
/// Whole calendar months are counted from `start` to the day after `end`; any
/// remaining days count as one more month. A contract from 15.01.2024 to
/// 14.01.2025 is 12 months, one from 15.01.2024 to 20.02.2024 is 2 months.
pub fn term_months(start: NaiveDate, end: NaiveDate) -> Result<u32, TemporalError> {
    if start > end {
        return Err(TemporalError::InvalidPeriod {
            start: start.to_string(),
            end: end.to_string(),
        });
    }

    let exclusive_end = end.succ_opt().ok_or_else(|| TemporalError::InvalidDate(end.to_string()))?;
    let mut months = (exclusive_end.year() - start.year()) * 12
        + exclusive_end.month() as i32
        - start.month() as i32;

    // Step back if the last whole month overshoots the end
    let whole = start
        .checked_add_months(Months::new(months.max(0) as u32))
        .ok_or_else(|| TemporalError::InvalidDate(start.to_string()))?;
    if whole > exclusive_end {
        months -= 1;
    }
    let whole = start
        .checked_add_months(Months::new(months.max(0) as u32))
        .ok_or_else(|| TemporalError::InvalidDate(start.to_string()))?;

    if whole < exclusive_end {
        months += 1;
    }
    Ok(months.max(0) as u32)
}

/// Contract term in days, counting both `start` and `end`
pub fn term_days(start: NaiveDate, end: NaiveDate) -> Result<u32, TemporalError> {
    if start > end {
        return Err(TemporalError::InvalidPeriod {
            start: start.to_string(),
            end: end.to_string(),
        });
    }
    Ok((end - start).num_days() as u32 + 1)
}
