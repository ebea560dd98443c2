use std::fmt;

use chrono::{DateTime, Duration, Utc};

use crate::error::TimeError;

/// The unit a [`Frequency`] counts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    Minute,
    Hour,
    Day,
}

/// A bar timeframe, e.g. `5min`, `1h`, `1d`.
///
/// Parsed from `"<N><unit>"` where `unit` is one of `min`, `h`, `d`. All bar
/// boundaries are aligned to the Unix epoch, so every timeframe shares a
/// common origin regardless of when a cache happens to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Frequency {
    unit: Unit,
    count: u32,
}

impl Frequency {
    pub const fn new(unit: Unit, count: u32) -> Self {
        Self { unit, count }
    }

    pub fn parse(input: &str) -> Result<Self, TimeError> {
        let (digits, rest) = input
            .find(|c: char| !c.is_ascii_digit())
            .map(|idx| input.split_at(idx))
            .ok_or_else(|| TimeError::InvalidFrequency(input.to_string()))?;

        let count: u32 = digits
            .parse()
            .map_err(|_| TimeError::InvalidFrequency(input.to_string()))?;
        if count == 0 {
            return Err(TimeError::InvalidFrequency(input.to_string()));
        }

        let unit = match rest {
            "min" => Unit::Minute,
            "h" => Unit::Hour,
            "d" => Unit::Day,
            _ => return Err(TimeError::InvalidFrequency(input.to_string())),
        };

        Ok(Self { unit, count })
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Duration of one bar at this frequency.
    pub fn duration(&self) -> Duration {
        let base = match self.unit {
            Unit::Minute => Duration::minutes(1),
            Unit::Hour => Duration::hours(1),
            Unit::Day => Duration::days(1),
        };
        base * self.count as i32
    }

    /// Round `instant` down to the most recent bar boundary at or before it.
    pub fn floor(&self, instant: DateTime<Utc>) -> DateTime<Utc> {
        let dur_ms = self.duration().num_milliseconds();
        let ts_ms = instant.timestamp_millis();
        let floored_ms = ts_ms.div_euclid(dur_ms) * dur_ms;
        DateTime::from_timestamp_millis(floored_ms).unwrap_or(instant)
    }

    /// Round `instant` up to the next bar boundary at or after it.
    pub fn ceil(&self, instant: DateTime<Utc>) -> DateTime<Utc> {
        let floored = self.floor(instant);
        if floored == instant {
            floored
        } else {
            floored + self.duration()
        }
    }

    /// The latest bar `start` that is fully closed as of `now`: a bar whose
    /// boundary exactly equals `now` has not finished accumulating yet, so
    /// it is excluded.
    pub fn max_end(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let floored = self.floor(now);
        if floored == now {
            floored - self.duration()
        } else {
            floored
        }
    }

    /// True if `self` is a positive integer multiple of `native`, the
    /// timeframe bars are natively stored/streamed at.
    pub fn is_multiple_of(&self, native: &Frequency) -> bool {
        self.duration().num_milliseconds() % native.duration().num_milliseconds() == 0
    }

    pub fn require_multiple_of(&self, native: &Frequency) -> Result<(), TimeError> {
        if self.is_multiple_of(native) {
            Ok(())
        } else {
            Err(TimeError::NotAMultiple(self.to_string(), native.to_string()))
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.unit {
            Unit::Minute => "min",
            Unit::Hour => "h",
            Unit::Day => "d",
        };
        write!(f, "{}{unit}", self.count)
    }
}
