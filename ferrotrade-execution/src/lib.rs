#![forbid(unsafe_code)]
#![warn(
    unused,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used,
    missing_debug_implementations
)]

//! Broker adapter trait, risk-sized order sizing, and the bracketed
//! entry-then-exit trade execution state machine.

pub mod account;
pub mod broker;
pub mod error;
pub mod order;
pub mod risk;
pub mod sizing;
pub mod trade;

pub use account::Account;
pub use broker::BrokerAdapter;
pub use error::{BrokerError, TradeError};
pub use order::{Order, OrderPrice, OrderType, Side, Status, TimeInForce};
pub use trade::{BracketStyle, TradeConfig, TradeOutcome, TradeState, TradeSubject};
