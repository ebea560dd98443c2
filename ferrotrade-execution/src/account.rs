use derive_more::Constructor;
use rust_decimal::Decimal;

/// Account-level figures the sizing formula needs: how much buying power
/// remains and the portfolio's total value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Constructor)]
pub struct Account {
    pub buying_power: Decimal,
    pub portfolio_value: Decimal,
}
