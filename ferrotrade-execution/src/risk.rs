use rust_decimal::Decimal;
use thiserror::Error;

/// A single, independently-testable pre-trade check.
pub trait RiskCheck {
    type Input;
    type Error: std::error::Error;

    fn name(&self) -> &'static str;
    fn check(&self, input: &Self::Input) -> Result<(), Self::Error>;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("CheckLossLimitFailed: loss {loss} > limit {limit}")]
pub struct CheckLossLimitFailed {
    pub loss: String,
    pub limit: String,
}

/// Rejects a trade whose worst-case loss (`size · risk`) exceeds `limit`.
pub struct CheckLossLimit {
    pub limit: Decimal,
}

impl RiskCheck for CheckLossLimit {
    type Input = (Decimal, Decimal); // (size, risk per unit)
    type Error = CheckLossLimitFailed;

    fn name(&self) -> &'static str {
        "loss_limit"
    }

    fn check(&self, &(size, risk): &Self::Input) -> Result<(), Self::Error> {
        let loss = size * risk;
        if loss > self.limit {
            Err(CheckLossLimitFailed {
                loss: loss.to_string(),
                limit: self.limit.to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("CheckHigherThanFailed: notional {notional} > cap {cap}")]
pub struct CheckHigherThanFailed {
    pub notional: String,
    pub cap: String,
}

/// Rejects a trade whose notional (`size · price`) exceeds `cap`.
pub struct CheckHigherThan {
    pub cap: Decimal,
}

impl RiskCheck for CheckHigherThan {
    type Input = (Decimal, Decimal); // (size, price)
    type Error = CheckHigherThanFailed;

    fn name(&self) -> &'static str {
        "notional_cap"
    }

    fn check(&self, &(size, price): &Self::Input) -> Result<(), Self::Error> {
        let notional = size * price;
        if notional > self.cap {
            Err(CheckHigherThanFailed {
                notional: notional.to_string(),
                cap: self.cap.to_string(),
            })
        } else {
            Ok(())
        }
    }
}
