//! Calendar-day and wall-clock helpers.
//!
//! Dates are plain local calendar days (`chrono::NaiveDate`, `yyyy-MM-dd`);
//! no timezone arithmetic is performed beyond what the local clock reports.

use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

/// Format used for persisted and displayed calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A wall-clock time at minute precision, written as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WallTime(NaiveTime);

impl WallTime {
    /// Sentinel for a day that is still in progress.
    pub const END_OF_DAY: WallTime = WallTime::fixed(23, 59);

    /// Sentinel for a day that has fully passed without a record.
    pub const MIDNIGHT: WallTime = WallTime::fixed(0, 0);

    const fn fixed(hour: u32, minute: u32) -> Self {
        match NaiveTime::from_hms_opt(hour, minute, 0) {
            Some(t) => WallTime(t),
            None => panic!("invalid fixed wall time"),
        }
    }

    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    /// Truncate a full time of day to minute precision.
    pub fn from_time(time: NaiveTime) -> Self {
        // hour/minute come from a valid NaiveTime
        Self::new(time.hour(), time.minute()).unwrap_or(Self::MIDNIGHT)
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }
}

impl fmt::Display for WallTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0.hour(), self.0.minute())
    }
}

impl FromStr for WallTime {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidTime(s.to_string());
        let (h, m) = s.split_once(':').ok_or_else(invalid)?;
        if h.len() != 2 || m.len() != 2 {
            return Err(invalid());
        }
        if !h.bytes().chain(m.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let hour: u32 = h.parse().map_err(|_| invalid())?;
        let minute: u32 = m.parse().map_err(|_| invalid())?;
        WallTime::new(hour, minute).ok_or_else(invalid)
    }
}

impl Serialize for WallTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WallTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Parse a `yyyy-MM-dd` calendar date.
pub fn parse_date(s: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| ValidationError::InvalidDate(s.to_string()))
}

/// Current local wall-clock date and time.
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}
