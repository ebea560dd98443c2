use chrono::{DateTime, Datelike, NaiveTime, TimeZone, Timelike, Utc, Weekday};
use chrono_tz::Tz;

/// Predicate deciding whether a given instant is inside a tradable window for
/// an asset, evaluated against the asset's own wall-clock timezone.
///
/// `TimeOfDay` takes `start`/`end` as a close/open pair: when `start > end`
/// (e.g. close = "16:00", start; open = "09:30", end) the tradable window is
/// bounded by `[end, start]` -- ordinary market hours. When `start <= end`
/// the tradable window is everything outside `[start, end]`, e.g. a session
/// that brackets midnight. `Excluded` lists weekdays consistently as an
/// exclusion set in both `is_trading` and `filter` -- a day named here is
/// never tradable, full stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TradingRestriction {
    Always,
    Never,
    TimeOfDay {
        tz: Tz,
        start: NaiveTime,
        end: NaiveTime,
    },
    ExcludedWeekdays {
        tz: Tz,
        days: Vec<Weekday>,
    },
    Composed(Vec<TradingRestriction>),
}

impl TradingRestriction {
    pub fn always() -> Self {
        TradingRestriction::Always
    }

    pub fn never() -> Self {
        TradingRestriction::Never
    }

    pub fn time_of_day(tz: Tz, start: NaiveTime, end: NaiveTime) -> Self {
        TradingRestriction::TimeOfDay { tz, start, end }
    }

    pub fn excluded_weekdays(tz: Tz, days: Vec<Weekday>) -> Self {
        TradingRestriction::ExcludedWeekdays { tz, days }
    }

    pub fn composed(restrictions: Vec<TradingRestriction>) -> Self {
        TradingRestriction::Composed(restrictions)
    }

    /// Is `instant` inside a tradable window.
    pub fn is_trading(&self, instant: DateTime<Utc>) -> bool {
        match self {
            TradingRestriction::Always => true,
            TradingRestriction::Never => false,
            TradingRestriction::TimeOfDay { tz, start, end } => {
                let local = tz.from_utc_datetime(&instant.naive_utc()).time();
                time_in_window(local, *start, *end)
            }
            TradingRestriction::ExcludedWeekdays { tz, days } => {
                let local = tz.from_utc_datetime(&instant.naive_utc());
                !days.contains(&local.weekday())
            }
            TradingRestriction::Composed(restrictions) => {
                restrictions.iter().all(|r| r.is_trading(instant))
            }
        }
    }

    /// Drop every bar start in `instants` that falls outside the tradable
    /// window, preserving order. A restriction's `filter` is always
    /// consistent with its `is_trading`: filtering then checking every
    /// survivor with `is_trading` always returns `true`.
    pub fn filter(&self, instants: &[DateTime<Utc>]) -> Vec<DateTime<Utc>> {
        instants
            .iter()
            .copied()
            .filter(|instant| self.is_trading(*instant))
            .collect()
    }
}

fn time_in_window(local: NaiveTime, start: NaiveTime, end: NaiveTime) -> bool {
    if start > end {
        // wraps past midnight: `start` and `end` bound the tradable window
        // itself, e.g. `TimeOfDay { start: "16:00", end: "09:30" }` is
        // tradable from the day's open at 09:30 through the close at 16:00.
        local >= end && local <= start
    } else {
        // non-wrapping: the tradable window is everything *outside*
        // `[start, end]`.
        local <= start || local >= end
    }
}
