//! # Temporal Types — ISO-8601 Calendar Dates
//!
//! Defines `CalendarDate`, a day-precision date with a strict textual
//! grammar used whenever untrusted text is coerced to a date.
//!
//! ## Grammar
//!
//! `YYYY-M-D` or `YYYY-MM-DD`: exactly four year digits, one or two month
//! digits, one or two day digits, separated by `-`. Nothing else is
//! accepted: no surrounding whitespace, no time component, no sign, no
//! week or ordinal forms. The named day must exist in the proleptic
//! Gregorian calendar (`2023-02-30` is rejected, not rolled over).
//!
//! ## Rendering
//!
//! The canonical text form is always zero-padded `YYYY-MM-DD`, so
//! `1982-11-6` renders back as `1982-11-06`.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Failure to read a calendar date from text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    /// The text does not follow the `YYYY-M-D` grammar.
    #[error("input should be a valid date in the format YYYY-MM-DD, got {0:?}")]
    Malformed(String),

    /// The text is well-formed but names a day that does not exist.
    #[error("input is not a real calendar day: {0:?}")]
    OutOfRange(String),
}

/// A calendar date without time or timezone.
///
/// # Construction
///
/// - [`CalendarDate::parse()`]: from text, using the strict grammar.
/// - [`CalendarDate::from_ymd()`]: from numeric components.
/// - [`CalendarDate::from_naive()`]: from a `chrono::NaiveDate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    /// Parse a date using the `YYYY-M-D` / `YYYY-MM-DD` grammar.
    ///
    /// # Errors
    ///
    /// Returns [`DateError::Malformed`] if the grammar is not followed and
    /// [`DateError::OutOfRange`] if the day does not exist.
    pub fn parse(s: &str) -> Result<Self, DateError> {
        let malformed = || DateError::Malformed(s.to_string());

        let mut parts = s.split('-');
        let (Some(year), Some(month), Some(day), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed());
        };

        if year.len() != 4 || !all_digits(year) {
            return Err(malformed());
        }
        for part in [month, day] {
            if part.is_empty() || part.len() > 2 || !all_digits(part) {
                return Err(malformed());
            }
        }

        // Digit-only components of bounded length cannot overflow.
        let year: i32 = year.parse().map_err(|_| malformed())?;
        let month: u32 = month.parse().map_err(|_| malformed())?;
        let day: u32 = day.parse().map_err(|_| malformed())?;

        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(|| DateError::OutOfRange(s.to_string()))
    }

    /// Create a date from year, month and day.
    ///
    /// Returns `None` if the day does not exist.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Wrap an existing `chrono::NaiveDate`.
    pub fn from_naive(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Access the inner `NaiveDate`.
    pub fn as_naive(&self) -> &NaiveDate {
        &self.0
    }

    /// Calendar year.
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Render as zero-padded `YYYY-MM-DD`.
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }

    /// Render with a `strftime`-style pattern, e.g. `"%Y/%m/%d"`.
    pub fn format(&self, pattern: &str) -> String {
        self.0.format(pattern).to_string()
    }
}

fn all_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl FromStr for CalendarDate {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl Serialize for CalendarDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso8601())
    }
}

impl<'de> Deserialize<'de> for CalendarDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
