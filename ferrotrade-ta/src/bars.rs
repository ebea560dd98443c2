use ferrotrade_data::Bar;
use rust_decimal::Decimal;

/// Simple moving average of `close` over a trailing `period`-bar window, one
/// value per input bar once the window has filled.
///
/// Output is keyed by the bar it closes on: `sma(bars, n)[i]` corresponds to
/// `bars[i + n - 1]`.
pub fn sma(bars: &[Bar], period: usize) -> Vec<(usize, Decimal)> {
    if period == 0 || bars.len() < period {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(bars.len() - period + 1);
    let mut sum: Decimal = bars[..period].iter().map(|b| b.close).sum();
    out.push((period - 1, sum / Decimal::from(period as u64)));
    for i in period..bars.len() {
        sum += bars[i].close - bars[i - period].close;
        out.push((i, sum / Decimal::from(period as u64)));
    }
    out
}

/// Bollinger Bands: `(index, middle, upper, lower)` where `middle` is the SMA
/// and `upper`/`lower` are `middle ± k · stddev` over the same window.
pub fn bollinger_bands(bars: &[Bar], period: usize, k: Decimal) -> Vec<(usize, Decimal, Decimal, Decimal)> {
    if period == 0 || bars.len() < period {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(bars.len() - period + 1);
    for i in period - 1..bars.len() {
        let window = &bars[i + 1 - period..=i];
        let mean: Decimal = window.iter().map(|b| b.close).sum::<Decimal>() / Decimal::from(period as u64);
        let variance: Decimal = window
            .iter()
            .map(|b| {
                let d = b.close - mean;
                d * d
            })
            .sum::<Decimal>()
            / Decimal::from(period as u64);
        let stddev = variance.sqrt().unwrap_or(Decimal::ZERO);
        out.push((i, mean, mean + k * stddev, mean - k * stddev));
    }
    out
}

/// Average True Range over a trailing `period`-bar window (simple moving
/// average of true range, not Wilder smoothing), keyed the same way as
/// [`sma`].
pub fn atr(bars: &[Bar], period: usize) -> Vec<(usize, Decimal)> {
    if bars.len() < 2 || period == 0 {
        return Vec::new();
    }
    let true_ranges: Vec<Decimal> = (1..bars.len())
        .map(|i| true_range(&bars[i], &bars[i - 1]))
        .collect();
    if true_ranges.len() < period {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(true_ranges.len() - period + 1);
    let mut sum: Decimal = true_ranges[..period].iter().copied().sum();
    out.push((period, sum / Decimal::from(period as u64)));
    for i in period..true_ranges.len() {
        sum += true_ranges[i] - true_ranges[i - period];
        // true_ranges[i] corresponds to bars[i + 1]
        out.push((i + 1, sum / Decimal::from(period as u64)));
    }
    out
}

fn true_range(current: &Bar, previous: &Bar) -> Decimal {
    let hl = current.high - current.low;
    let hc = (current.high - previous.close).abs();
    let lc = (current.low - previous.close).abs();
    hl.max(hc).max(lc)
}

/// One Supertrend observation: `bullish` is the current trend direction and
/// `value` is the active stop level (`final_lower` while bullish, `final_upper`
/// while bearish).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupertrendPoint {
    pub index: usize,
    pub value: Decimal,
    pub bullish: bool,
}

/// Stateful Supertrend over a trailing `period`-bar ATR window and
/// multiplier `k`.
///
/// Computed iteratively exactly as the reference implementation: each step's
/// `final_upper`/`final_lower` band only moves toward price (never away from
/// it) unless the trend has just flipped, and `bullish` flips when close
/// crosses the opposing band. The seed row (the first bar with a defined
/// ATR) is used only to initialize the recurrence and is never itself
/// returned, so every emitted point has a fully-defined `bullish` flag
/// (never computed from a partially-initialized previous state).
pub fn supertrend(bars: &[Bar], period: usize, k: Decimal) -> Vec<SupertrendPoint> {
    let atrs = atr(bars, period);
    if atrs.len() < 2 {
        return Vec::new();
    }

    let mid = |b: &Bar| (b.high + b.low) / Decimal::TWO;

    let seed_idx = atrs[0].0;
    let seed_atr = atrs[0].1;
    let mut final_upper = mid(&bars[seed_idx]) + k * seed_atr;
    let mut final_lower = mid(&bars[seed_idx]) - k * seed_atr;
    // Sentinel, not a real comparison: forces the first real iteration into
    // the `final_lower` branch regardless of the seed bar's own close.
    let mut bullish = true;

    let mut out = Vec::with_capacity(atrs.len() - 1);
    for &(idx, bar_atr) in &atrs[1..] {
        let bar = &bars[idx];
        let basic_upper = mid(bar) + k * bar_atr;
        let basic_lower = mid(bar) - k * bar_atr;

        final_upper = if basic_upper < final_upper || bars[idx - 1].close > final_upper {
            basic_upper
        } else {
            final_upper
        };
        final_lower = if basic_lower > final_lower || bars[idx - 1].close < final_lower {
            basic_lower
        } else {
            final_lower
        };

        bullish = if bullish {
            bar.close >= final_lower
        } else {
            bar.close > final_upper
        };

        let value = if bullish { final_lower } else { final_upper };
        out.push(SupertrendPoint { index: idx, value, bullish });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use rust_decimal_macros::dec;

    fn bar(i: i64, open: Decimal, high: Decimal, low: Decimal, close: Decimal) -> Bar {
        let start: DateTime<Utc> = DateTime::from_timestamp(i * 60, 0).unwrap();
        Bar {
            start,
            open,
            high,
            low,
            close,
            volume: dec!(1),
            price: close,
            trade_count: None,
        }
    }

    fn trending_bars(n: i64) -> Vec<Bar> {
        (0..n)
            .map(|i| {
                let p = Decimal::from(100 + i);
                bar(i, p, p + dec!(1), p - dec!(1), p)
            })
            .collect()
    }

    #[test]
    fn sma_matches_hand_computed_average() {
        let bars = trending_bars(5);
        let out = sma(&bars, 3);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].1, dec!(101)); // avg(100,101,102)
        assert_eq!(out[2].1, dec!(103)); // avg(102,103,104)
    }

    #[test]
    fn sma_empty_when_not_enough_bars() {
        let bars = trending_bars(2);
        assert!(sma(&bars, 5).is_empty());
    }

    #[test]
    fn bollinger_bands_straddle_the_mean() {
        let bars = trending_bars(10);
        let out = bollinger_bands(&bars, 5, dec!(2));
        for (_, mean, upper, lower) in &out {
            assert!(upper >= mean);
            assert!(lower <= mean);
        }
    }

    #[test]
    fn atr_is_nonnegative() {
        let bars = trending_bars(10);
        let out = atr(&bars, 3);
        assert!(!out.is_empty());
        for (_, value) in out {
            assert!(value >= Decimal::ZERO);
        }
    }

    #[test]
    fn supertrend_is_bullish_on_a_steady_uptrend() {
        let bars = trending_bars(30);
        let out = supertrend(&bars, 10, dec!(3));
        assert!(!out.is_empty());
        assert!(out.last().unwrap().bullish);
    }

    #[test]
    fn supertrend_never_emits_the_seed_row() {
        let bars = trending_bars(30);
        let atrs = atr(&bars, 10);
        let out = supertrend(&bars, 10, dec!(3));
        assert_eq!(out.first().unwrap().index, atrs[1].0);
    }
}
