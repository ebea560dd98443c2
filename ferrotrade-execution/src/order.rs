use chrono::{DateTime, Utc};
use derive_more::{Constructor, Display};
use rust_decimal::Decimal;
use smol_str::SmolStr;

/// Direction of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Side {
    Buy,
    Sell,
}

impl std::ops::Not for Side {
    type Output = Side;
    fn not(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Order type, including the bracket-exit `Range` (a single OCO order whose
/// price is a `(stop, limit)` pair) a venue may support natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum OrderType {
    Market,
    Limit,
    Stop,
    StopLimit,
    /// One-cancels-other bracket exit: fires at `stop` or `limit`, whichever
    /// is touched first, cancelling the other leg.
    Range,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TimeInForce {
    Day,
    Gtc,
    Opg,
    Cls,
}

/// Order lifecycle status, mirroring the taxonomy a venue actually reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Status {
    Pending,
    Filled,
    PartiallyFilled,
    Cancelled,
    Rejected,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Filled | Status::Cancelled | Status::Rejected)
    }
}

/// A single-price order, or the `(low, high)` pair of a bracket `Range` order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrderPrice {
    Single(Decimal),
    Range(Decimal, Decimal),
}

#[derive(Debug, Clone, Constructor)]
pub struct OrderRequest {
    pub symbol: SmolStr,
    pub size: Decimal,
    pub side: Side,
    pub kind: OrderType,
    pub time_in_force: TimeInForce,
    pub price: Option<OrderPrice>,
}

/// An order as reported back by a [`crate::broker::BrokerAdapter`], field
/// names matching the venue-agnostic vocabulary of `id`, `filled_size`,
/// `filled_price`, `status`.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: SmolStr,
    pub symbol: SmolStr,
    pub size: Decimal,
    pub side: Side,
    pub kind: OrderType,
    pub time_in_force: TimeInForce,
    pub price: Option<OrderPrice>,
    pub status: Status,
    pub filled_size: Decimal,
    pub filled_price: Option<Decimal>,
    pub submitted_at: DateTime<Utc>,
}
