//! Conversion between fractional-hour clock positions and wall-clock strings.
//!
//! A clock position is the number of hours since midnight in `[0, 24]`, with
//! the fractional part standing for minutes. Everything shown to a user is
//! derived from it: the `HH:MM` [`DisplayTime`], the 12-hour [`label`] and the
//! [`ClockTime`] components consumed by the brightness model.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Upper bound of the synthetic timeline, in hours.
pub const HOURS_PER_DAY: f64 = 24.0;

const MINUTES_PER_HOUR: f64 = 60.0;

/// Hours since midnight, always clamped to `[0, 24]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct ClockPosition(f64);

impl ClockPosition {
    pub const MIDNIGHT: Self = Self(0.0);
    pub const END_OF_DAY: Self = Self(HOURS_PER_DAY);

    /// Clamps `hours` into the timeline. NaN collapses to midnight.
    pub fn new(hours: f64) -> Self {
        if hours.is_nan() {
            Self::MIDNIGHT
        } else {
            Self(hours.clamp(0.0, HOURS_PER_DAY))
        }
    }

    pub fn hours(self) -> f64 {
        self.0
    }

    pub fn is_end_of_day(self) -> bool {
        self.0 >= HOURS_PER_DAY
    }

    /// Canonical `HH:MM` rendering of this position.
    pub fn display(self) -> DisplayTime {
        format(Some(self.0))
    }

    /// Hour and minute components of this position.
    pub fn clock_time(self) -> ClockTime {
        parse(Some(self.0))
    }

    /// 12-hour label such as `2:30 PM`.
    pub fn label(self) -> String {
        label(Some(self.0))
    }
}

impl From<f64> for ClockPosition {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<ClockPosition> for f64 {
    fn from(value: ClockPosition) -> Self {
        value.0
    }
}

impl fmt::Display for ClockPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}h", self.0)
    }
}

/// Zero-padded 24-hour `HH:MM` string. Never authoritative; always recomputed
/// from a [`ClockPosition`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisplayTime(String);

impl DisplayTime {
    fn midnight() -> Self {
        Self("00:00".to_string())
    }

    fn last_minute() -> Self {
        Self("23:59".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DisplayTime {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Hour and minute components recovered from a [`DisplayTime`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClockTime {
    pub hours: u32,
    pub minutes: u32,
}

impl ClockTime {
    pub fn minutes_since_midnight(self) -> u32 {
        self.hours * 60 + self.minutes
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hours, self.minutes)
    }
}

/// Formats a raw clock value as `HH:MM`.
///
/// Absent, NaN, zero and negative input all read `00:00`; anything at or past
/// the end of the day reads `23:59`. Minutes are rounded, and a rounding
/// result of 60 wraps to `00` while the hour stays put, so `9.995` formats as
/// `09:00` rather than `10:00`.
pub fn format(position: Option<f64>) -> DisplayTime {
    let Some(value) = position.filter(|value| !value.is_nan() && *value != 0.0) else {
        return DisplayTime::midnight();
    };

    let hours = ClockPosition::new(value).hours();
    if hours == 0.0 {
        return DisplayTime::midnight();
    }
    if hours >= HOURS_PER_DAY {
        return DisplayTime::last_minute();
    }

    let hour_part = hours.trunc() as u32;
    let mut minute_part = (hours.fract() * MINUTES_PER_HOUR).round() as u32;
    if minute_part == 60 {
        minute_part = 0;
    }

    DisplayTime(format!("{hour_part:02}:{minute_part:02}"))
}

/// Splits the formatted time back into integer components.
pub fn parse(position: Option<f64>) -> ClockTime {
    let display = format(position);
    let (hours, minutes) = display.as_str().split_once(':').unwrap_or(("0", "0"));

    ClockTime {
        hours: hours.parse().unwrap_or(0),
        minutes: minutes.parse().unwrap_or(0),
    }
}

/// Human readable 12-hour label, e.g. `14.5` becomes `2:30 PM`.
///
/// Built from [`parse`] rather than from the raw value, so it shares the
/// clamp and minute wrap of [`format`]: `24.0` reads `11:59 PM` (not
/// `12:00 PM`) and `9.995` reads `9:00 AM` (never `9:60 AM`). Label and
/// display time therefore always name the same minute.
pub fn label(position: Option<f64>) -> String {
    let time = parse(position);
    let period = if time.hours < 12 { "AM" } else { "PM" };
    let hour = match time.hours % 12 {
        0 => 12,
        hour => hour,
    };

    format!("{hour}:{:02} {period}", time.minutes)
}
