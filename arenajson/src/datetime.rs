// SPDX-License-Identifier: Apache-2.0

//! Date-time values carried by `datetime` nodes.
//!
//! Stored as whole seconds since the Unix epoch (UTC) and rendered as
//! ISO-8601 text. Parsing accepts RFC 3339 as well as the relaxed
//! `2017-9-3T8:30:12` form with unpadded fields.

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time};

use crate::error::{Error, Result};

/// A UTC timestamp with one-second resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DateTime {
    stamp: i64,
}

impl DateTime {
    /// Wrap a raw Unix timestamp.
    pub const fn from_stamp(stamp: i64) -> Self {
        DateTime { stamp }
    }

    /// Build from calendar fields, validating each component.
    pub fn new(year: i32, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Result<Self> {
        let invalid = || Error::InvalidDateTime(format!(
            "{year}-{month}-{day}T{hour}:{minute}:{second}"
        ));
        let month = Month::try_from(month).map_err(|_| invalid())?;
        let date = Date::from_calendar_date(year, month, day).map_err(|_| invalid())?;
        let time = Time::from_hms(hour, minute, second).map_err(|_| invalid())?;
        Ok(Self::from_stamp(
            PrimitiveDateTime::new(date, time).assume_utc().unix_timestamp(),
        ))
    }

    /// Seconds since the Unix epoch.
    pub const fn stamp(self) -> i64 {
        self.stamp
    }

    /// Parse ISO-8601 text.
    pub fn parse(text: &str) -> Result<Self> {
        if let Ok(dt) = OffsetDateTime::parse(text, &Rfc3339) {
            return Ok(Self::from_stamp(dt.unix_timestamp()));
        }
        parse_relaxed(text).ok_or_else(|| Error::InvalidDateTime(text.to_owned()))
    }

    /// ISO-8601 rendering, `None` if the stamp is outside the representable calendar range.
    pub fn to_iso(self) -> Option<String> {
        let dt = OffsetDateTime::from_unix_timestamp(self.stamp).ok()?;
        dt.format(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second]"
        ))
        .ok()
    }
}

/// `Y-M-D[(T| )h:m[:s[.frac]]][Z]` with any field width.
fn parse_relaxed(text: &str) -> Option<DateTime> {
    let text = text.trim();
    let text = text.strip_suffix('Z').unwrap_or(text);
    let (date, time) = match text.split_once(['T', ' ']) {
        Some((date, time)) => (date, Some(time)),
        None => (text, None),
    };

    let mut date_parts = date.splitn(3, '-');
    let year = date_parts.next()?.parse().ok()?;
    let month = date_parts.next()?.parse().ok()?;
    let day = date_parts.next()?.parse().ok()?;

    let (hour, minute, second) = match time {
        None => (0, 0, 0),
        Some(time) => {
            let mut time_parts = time.splitn(3, ':');
            let hour = time_parts.next()?.parse().ok()?;
            let minute = time_parts.next()?.parse().ok()?;
            let second = match time_parts.next() {
                Some(sec) => sec.split('.').next()?.parse().ok()?,
                None => 0,
            };
            (hour, minute, second)
        }
    };
    DateTime::new(year, month, day, hour, minute, second).ok()
}

impl core::fmt::Display for DateTime {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.to_iso() {
            Some(text) => f.write_str(&text),
            None => write!(f, "{}", self.stamp),
        }
    }
}
