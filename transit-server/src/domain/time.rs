//! Time-of-day handling for bus arrivals.
//!
//! Buses carry their next arrival as an "HH:MM" string. This module parses
//! those strings into a compact minutes-from-midnight value that orders
//! naturally and wraps around midnight when minutes are added.

use std::fmt;

use chrono::{NaiveTime, Timelike};

/// Minutes in a day.
const MINUTES_PER_DAY: u16 = 24 * 60;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A time of day with minute resolution.
///
/// # Examples
///
/// ```
/// use transit_server::domain::TimeOfDay;
///
/// let t = TimeOfDay::parse_hhmm("07:45").unwrap();
/// assert_eq!(t.to_string(), "07:45");
///
/// // Single-digit hours are accepted
/// assert_eq!(TimeOfDay::parse_hhmm("7:45").unwrap(), t);
///
/// assert!(TimeOfDay::parse_hhmm("25:00").is_err());
/// assert!(TimeOfDay::parse_hhmm("0745").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    /// Midnight.
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);

    /// Build a time from hour and minute, wrapping out-of-range components.
    pub const fn from_hm(hour: u16, minute: u16) -> Self {
        Self(((hour % 24) * 60 + minute % 60) % MINUTES_PER_DAY)
    }

    /// Parse a time from "HH:MM" (or "H:MM") format.
    pub fn parse_hhmm(s: &str) -> Result<Self, TimeError> {
        let s = s.trim();
        let (hour_part, minute_part) = s
            .split_once(':')
            .ok_or_else(|| TimeError::new("expected HH:MM format"))?;

        let hour = match hour_part.as_bytes() {
            [d] => parse_digit(*d),
            [d1, d2] => parse_digit(*d1).zip(parse_digit(*d2)).map(|(a, b)| a * 10 + b),
            _ => None,
        }
        .ok_or_else(|| TimeError::new("invalid hour digits"))?;
        if hour > 23 {
            return Err(TimeError::new("hour must be 0-23"));
        }

        let minute = match minute_part.as_bytes() {
            [d1, d2] => parse_digit(*d1).zip(parse_digit(*d2)).map(|(a, b)| a * 10 + b),
            _ => None,
        }
        .ok_or_else(|| TimeError::new("invalid minute digits"))?;
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }

        Ok(Self(hour * 60 + minute))
    }

    /// Parse a time, falling back to `fallback` when the string is not a valid time.
    pub fn parse_or(s: &str, fallback: TimeOfDay) -> Self {
        Self::parse_hhmm(s).unwrap_or(fallback)
    }

    /// Returns the hour (0-23).
    pub fn hour(&self) -> u16 {
        self.0 / 60
    }

    /// Returns the minute (0-59).
    pub fn minute(&self) -> u16 {
        self.0 % 60
    }

    /// Minutes since midnight.
    pub fn minutes_from_midnight(&self) -> u16 {
        self.0
    }

    /// Add minutes, wrapping past midnight.
    pub fn add_minutes(&self, minutes: u32) -> Self {
        let wrapped = (self.0 as u32 + minutes % MINUTES_PER_DAY as u32) % MINUTES_PER_DAY as u32;
        Self(wrapped as u16)
    }

    /// Returns true if this time lies within `[start, end]` inclusive.
    pub fn within(&self, start: TimeOfDay, end: TimeOfDay) -> bool {
        start <= *self && *self <= end
    }
}

impl From<NaiveTime> for TimeOfDay {
    fn from(time: NaiveTime) -> Self {
        Self::from_hm(time.hour() as u16, time.minute() as u16)
    }
}

impl fmt::Debug for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimeOfDay({:02}:{:02})", self.hour(), self.minute())
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

fn parse_digit(b: u8) -> Option<u16> {
    (b as char).to_digit(10).map(|d| d as u16)
}
