use rust_decimal::Decimal;

use crate::order::Side;

/// Risk-sized order quantity: the smaller of (a) the size that risks exactly
/// `portfolio_perc`% of the portfolio given a `risk` per unit, (b) the size
/// capped at `max_portfolio_perc`% of the portfolio's notional value, and
/// (c) whatever buying power is actually available.
///
/// A non-positive result means there isn't enough buying power (or `risk`/
/// `price` is non-positive) to open any position at all; the caller should
/// abort the trade rather than submit a zero-or-negative order.
pub fn risk_order_size(
    portfolio_value: Decimal,
    buying_power: Decimal,
    portfolio_perc: Decimal,
    max_portfolio_perc: Decimal,
    risk: Decimal,
    price: Decimal,
) -> Decimal {
    if risk <= Decimal::ZERO || price <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let size = portfolio_perc / Decimal::ONE_HUNDRED * portfolio_value / risk;
    let max_size = max_portfolio_perc / Decimal::ONE_HUNDRED * portfolio_value / price;
    size.min(max_size).min(buying_power)
}

/// The `(low, high)` bracket-exit price pair for a `Range` (OCO) order sized
/// to close a position opened at `price` with a given `risk` per unit and
/// reward target `win_to_loss_ratio · risk`.
///
/// For a long (`Side::Buy` entry, so the exit is a sell) the stop is below
/// entry and the target above; for a short the pair is swapped so `low` is
/// always the leg nearer zero and `high` the leg further from it, and the
/// caller submits the pair as-is regardless of side.
pub fn stop_profit_range(entry_side: Side, win_to_loss_ratio: Decimal, risk: Decimal, price: Decimal) -> (Decimal, Decimal) {
    let low = price - risk;
    let high = (price + win_to_loss_ratio * risk) * price / (price - risk);
    match entry_side {
        Side::Buy => (low, high),
        Side::Sell => (high, low),
    }
}
