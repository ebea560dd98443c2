use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

/// One OHLCV bar covering `[start, start + frequency)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub start: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    /// Volume-weighted average price for the interval, distinct from `close`
    /// when the venue reports one. Resampling re-derives this from the
    /// contributing bars' own `price`/`volume` rather than from `close`.
    pub price: Decimal,
    /// Venue-reported trade count, when available. Summed like volume when
    /// resampling to a coarser timeframe.
    pub trade_count: Option<u64>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BarError {
    #[error("bar low {low} exceeds min(open, close) {min_oc}")]
    LowAboveBody { low: String, min_oc: String },
    #[error("bar high {high} is below max(open, close) {max_oc}")]
    HighBelowBody { high: String, max_oc: String },
    #[error("bar volume {0} is negative")]
    NegativeVolume(String),
}

impl Bar {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        start: DateTime<Utc>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
        price: Decimal,
        trade_count: Option<u64>,
    ) -> Result<Self, BarError> {
        let bar = Bar {
            start,
            open,
            high,
            low,
            close,
            volume,
            price,
            trade_count,
        };
        bar.validate()?;
        Ok(bar)
    }

    pub fn validate(&self) -> Result<(), BarError> {
        let min_oc = self.open.min(self.close);
        let max_oc = self.open.max(self.close);
        if self.low > min_oc {
            return Err(BarError::LowAboveBody {
                low: self.low.to_string(),
                min_oc: min_oc.to_string(),
            });
        }
        if self.high < max_oc {
            return Err(BarError::HighBelowBody {
                high: self.high.to_string(),
                max_oc: max_oc.to_string(),
            });
        }
        if self.volume.is_sign_negative() && !self.volume.is_zero() {
            return Err(BarError::NegativeVolume(self.volume.to_string()));
        }
        Ok(())
    }
}
