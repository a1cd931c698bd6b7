use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Wire format of an entry timestamp: `YYYY/MM/DD HH:MM:SS`.
pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Format of the calendar day a timestamp falls on: `YYYY/MM/DD`.
pub const DATE_FORMAT: &str = "%Y/%m/%d";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TimestampError {
    #[error("invalid timestamp (expected YYYY/MM/DD HH:MM:SS): {raw}")]
    Invalid { raw: String },
}

/// Local wall-clock time an entry was logged at, with second precision.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LoggedAt(NaiveDateTime);

impl LoggedAt {
    /// Wrap a wall-clock time, dropping any sub-second part.
    #[must_use]
    pub fn new(at: NaiveDateTime) -> Self {
        Self(at.with_nanosecond(0).unwrap_or(at))
    }

    /// Parse a timestamp in [`TIMESTAMP_FORMAT`].
    ///
    /// # Errors
    ///
    /// Returns `TimestampError::Invalid` if the text does not match the format.
    pub fn parse(raw: &str) -> Result<Self, TimestampError> {
        NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT)
            .map(Self)
            .map_err(|_| TimestampError::Invalid {
                raw: raw.to_string(),
            })
    }

    #[must_use]
    pub fn value(&self) -> NaiveDateTime {
        self.0
    }

    /// Calendar day this timestamp falls on.
    #[must_use]
    pub fn day(&self) -> LogDate {
        LogDate(self.0.date())
    }
}

/// Calendar day of a workout, displayed as `YYYY/MM/DD`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LogDate(NaiveDate);

impl LogDate {
    #[must_use]
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    #[must_use]
    pub fn value(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for LoggedAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIMESTAMP_FORMAT))
    }
}

impl fmt::Debug for LoggedAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LoggedAt({self})")
    }
}

impl fmt::Display for LogDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl fmt::Debug for LogDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LogDate({self})")
    }
}

impl FromStr for LoggedAt {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for LoggedAt {
    type Error = TimestampError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<LoggedAt> for String {
    fn from(value: LoggedAt) -> Self {
        value.to_string()
    }
}
