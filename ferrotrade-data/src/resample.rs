use ferrotrade_instrument::Frequency;
use rust_decimal::Decimal;

use crate::bar::Bar;

/// Resample a native-frequency, ascending bar slice into `target` buckets.
///
/// Standard OHLCV reduction: `open` is the first native bar's open, `close`
/// is the last native bar's close, `high`/`low` are the extrema across the
/// bucket, `volume` and `trade_count` are summed, and `price` is the
/// volume-weighted average of the contributing bars' own `price` (not
/// `close`). Every output bucket's `start` is the `target`-aligned boundary
/// of its first contributing bar.
pub fn resample(bars: &[Bar], target: Frequency) -> Vec<Bar> {
    let mut buckets: Vec<Vec<Bar>> = Vec::new();

    for &bar in bars {
        let bucket_start = target.floor(bar.start);
        match buckets.last() {
            Some(group) if target.floor(group[0].start) == bucket_start => {
                buckets.last_mut().expect("just matched").push(bar);
            }
            _ => buckets.push(vec![bar]),
        }
    }

    buckets.iter().map(|group| aggregate(group, target)).collect()
}

fn aggregate(group: &[Bar], target: Frequency) -> Bar {
    let first = group[0];
    let last = *group.last().expect("bucket groups are never empty");
    Bar {
        start: target.floor(first.start),
        open: first.open,
        high: group.iter().map(|b| b.high).fold(first.high, Decimal::max),
        low: group.iter().map(|b| b.low).fold(first.low, Decimal::min),
        close: last.close,
        volume: group.iter().map(|b| b.volume).sum(),
        price: vwap(group),
        trade_count: group.iter().fold(None, |acc, b| match (acc, b.trade_count) {
            (Some(a), Some(c)) => Some(a + c),
            (a, c) => a.or(c),
        }),
    }
}

/// Volume-weighted average price across `bars`: `Σ(price·volume) / Σ(volume)`,
/// with a tiny epsilon substituted for a zero total volume so a quiet bucket
/// divides cleanly instead of by zero (the previous VWAP is effectively
/// carried forward, since the numerator is also driven to zero).
pub fn vwap(bars: &[Bar]) -> Decimal {
    let total_volume: Decimal = bars.iter().map(|b| b.volume).sum();
    let weighted: Decimal = bars.iter().map(|b| b.price * b.volume).sum();
    let divisor = if total_volume.is_zero() {
        Decimal::new(1, 9) // 1e-9, matches the epsilon the original substitutes for zero volume.
    } else {
        total_volume
    };
    weighted / divisor
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use rust_decimal_macros::dec;

    fn bar(start_min: i64, o: Decimal, h: Decimal, l: Decimal, c: Decimal, v: Decimal) -> Bar {
        let start: DateTime<Utc> = DateTime::from_timestamp(start_min * 60, 0).unwrap();
        Bar {
            start,
            open: o,
            high: h,
            low: l,
            close: c,
            volume: v,
            price: c,
            trade_count: None,
        }
    }

    fn bar_with_price(start_min: i64, o: Decimal, h: Decimal, l: Decimal, c: Decimal, v: Decimal, price: Decimal) -> Bar {
        Bar { price, ..bar(start_min, o, h, l, c, v) }
    }

    #[test]
    fn resamples_1min_into_5min_with_correct_ohlcv() {
        let bars = vec![
            bar(0, dec!(10), dec!(11), dec!(9), dec!(10.5), dec!(100)),
            bar(1, dec!(10.5), dec!(12), dec!(10), dec!(11), dec!(100)),
            bar(2, dec!(11), dec!(11.5), dec!(10.5), dec!(11), dec!(100)),
            bar(3, dec!(11), dec!(13), dec!(10.8), dec!(12), dec!(100)),
            bar(4, dec!(12), dec!(12.5), dec!(11.9), dec!(12.2), dec!(100)),
            bar(5, dec!(12.2), dec!(12.3), dec!(12), dec!(12.1), dec!(50)),
        ];
        let freq5 = Frequency::parse("5min").unwrap();
        let out = resample(&bars, freq5);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].open, dec!(10));
        assert_eq!(out[0].close, dec!(12.2));
        assert_eq!(out[0].high, dec!(13));
        assert_eq!(out[0].low, dec!(9));
        assert_eq!(out[0].volume, dec!(500));
        assert_eq!(out[1].open, dec!(12.2));
        assert_eq!(out[1].volume, dec!(50));
    }

    #[test]
    fn resample_price_is_volume_weighted_across_the_bucket_not_close() {
        // Same price everywhere except the bar weighted by far the most
        // volume -- the bucket's price must track that bar's price, not the
        // last bar's close.
        let bars = vec![
            bar_with_price(0, dec!(10), dec!(10), dec!(10), dec!(10), dec!(1), dec!(10)),
            bar_with_price(1, dec!(10), dec!(10), dec!(10), dec!(999), dec!(1000), dec!(20)),
        ];
        let freq5 = Frequency::parse("5min").unwrap();
        let out = resample(&bars, freq5);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].close, dec!(999));
        // (10*1 + 20*1000) / 1001
        assert_eq!(out[0].price, dec!(20010) / dec!(1001));
    }

    #[test]
    fn vwap_divides_by_epsilon_on_zero_volume() {
        let bars = vec![bar(0, dec!(10), dec!(10), dec!(10), dec!(10), dec!(0))];
        let v = vwap(&bars);
        assert!(v > dec!(0));
    }

    #[test]
    fn vwap_weights_by_volume() {
        let bars = vec![
            bar(0, dec!(10), dec!(10), dec!(10), dec!(10), dec!(1)),
            bar(1, dec!(20), dec!(20), dec!(20), dec!(20), dec!(3)),
        ];
        assert_eq!(vwap(&bars), dec!(17.5));
    }
}
