use std::time::Duration;

use derive_more::Display;
use rust_decimal::Decimal;
use smol_str::SmolStr;

use crate::broker::BrokerAdapter;
use crate::error::TradeError;
use crate::order::{Order, OrderPrice, OrderType, Side, Status, TimeInForce};
use crate::risk::{CheckHigherThan, CheckLossLimit, RiskCheck};
use crate::sizing::{risk_order_size, stop_profit_range};

/// Default fill timeout for an entry order before it is cancelled and the
/// trade is abandoned.
pub const ENTRY_FILL_TIMEOUT: Duration = Duration::from_secs(60);

/// The per-trade percentage caps and reward ratio a [`TradeConfig`] carries,
/// mirroring `global_max_risk_perc`/`global_max_portfolio_perc` in spec.md §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeConfig {
    pub risk_portfolio_perc: Decimal,
    pub max_portfolio_perc: Decimal,
    pub win_to_loss_ratio: Decimal,
    pub entry_timeout: Duration,
}

impl TradeConfig {
    pub fn new(risk_portfolio_perc: Decimal, max_portfolio_perc: Decimal, win_to_loss_ratio: Decimal) -> Self {
        Self {
            risk_portfolio_perc,
            max_portfolio_perc,
            win_to_loss_ratio,
            entry_timeout: ENTRY_FILL_TIMEOUT,
        }
    }
}

/// The asset-specific facts the state machine needs that don't live on
/// [`crate::account::Account`]: the symbol to trade and its tick sizes.
#[derive(Debug, Clone)]
pub struct TradeSubject {
    pub symbol: SmolStr,
    pub min_price_increment: Decimal,
    pub min_size_increment: Decimal,
}

/// Which bracket-exit implementation to submit once the entry has filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketStyle {
    /// A single one-cancels-other order; the broker is responsible for
    /// cancelling the losing leg once the other fills.
    Oco,
    /// Two independent exit orders; the state machine races them and
    /// cancels whichever did not fill first.
    Twin,
}

/// The terminal state a bracket trade ended in, mirroring the state diagram
/// of spec.md §4.6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TradeState {
    Sizing,
    EntrySubmitted,
    EntryPending,
    EntryFilled,
    BracketActive,
    OneSideDone,
    Closed,
    LeakedPosition,
    FailedToEnter,
}

/// The result of running a bracket trade to completion: always resolves to
/// one of the three terminal states, never left "in flight".
#[derive(Debug, Clone)]
pub struct TradeOutcome {
    pub state: TradeState,
    pub entry: Option<Order>,
    pub exit: Option<Order>,
    pub reason: Option<String>,
}

impl TradeOutcome {
    fn failed_to_enter(entry: Option<Order>, reason: impl Into<String>) -> Self {
        Self {
            state: TradeState::FailedToEnter,
            entry,
            exit: None,
            reason: Some(reason.into()),
        }
    }
}

fn truncate(value: Decimal, increment: Decimal) -> Decimal {
    if increment.is_zero() {
        return value;
    }
    (value / increment).trunc() * increment
}

/// Run one bracket trade to completion: size the entry by risk budget,
/// submit and wait for it to fill (cancelling on timeout or a partial
/// fill's remainder), then submit and race the stop-loss/take-profit exit
/// until one side completes, cancelling the other. Never returns with an
/// open position unaccounted for: every path ends in [`TradeState::Closed`],
/// [`TradeState::LeakedPosition`] (the exit closed less than the entry
/// filled — requires manual reconciliation), or [`TradeState::FailedToEnter`].
pub async fn execute_bracket_trade<B: BrokerAdapter>(
    broker: &B,
    subject: &TradeSubject,
    side: Side,
    price: Decimal,
    risk: Decimal,
    config: &TradeConfig,
    bracket_style: BracketStyle,
) -> Result<TradeOutcome, TradeError> {
    tracing::debug!(symbol = %subject.symbol, ?side, %price, %risk, state = %TradeState::Sizing, "sizing bracket trade");
    let account = broker.get_account().await?;

    let raw_size = risk_order_size(
        account.portfolio_value,
        account.buying_power,
        config.risk_portfolio_perc,
        config.max_portfolio_perc,
        risk,
        price,
    );
    let size = truncate(raw_size, subject.min_size_increment);

    let loss_check = CheckLossLimit {
        limit: config.risk_portfolio_perc / Decimal::ONE_HUNDRED * account.portfolio_value,
    };
    let notional_check = CheckHigherThan {
        cap: config.max_portfolio_perc / Decimal::ONE_HUNDRED * account.portfolio_value,
    };

    if size <= Decimal::ZERO {
        return Ok(TradeOutcome::failed_to_enter(None, "insufficient buying power for any size"));
    }
    if loss_check.check(&(size, risk)).is_err() || notional_check.check(&(size, price)).is_err() {
        return Ok(TradeOutcome::failed_to_enter(None, "sized order exceeds risk or notional cap"));
    }

    tracing::info!(symbol = %subject.symbol, %size, state = %TradeState::EntrySubmitted, "submitting entry order");
    let entry = broker
        .create_order(&subject.symbol, size, side, OrderType::Market, TimeInForce::Day, None)
        .await?;

    tracing::debug!(order_id = %entry.id, state = %TradeState::EntryPending, "awaiting entry fill");
    let entry = broker.wait_for_execution(&entry.id, Some(config.entry_timeout)).await?;

    let entry = match entry.status {
        Status::Filled => entry,
        Status::PartiallyFilled => {
            broker.cancel_order(&entry.id).await?;
            entry
        }
        Status::Pending => {
            broker.cancel_order(&entry.id).await?;
            return Ok(TradeOutcome::failed_to_enter(Some(entry), "entry fill timed out"));
        }
        Status::Cancelled | Status::Rejected => {
            return Ok(TradeOutcome::failed_to_enter(Some(entry), "entry order was rejected or cancelled"));
        }
    };

    if entry.filled_size <= Decimal::ZERO {
        return Ok(TradeOutcome::failed_to_enter(Some(entry), "entry order filled zero size"));
    }

    tracing::info!(order_id = %entry.id, filled = %entry.filled_size, state = %TradeState::EntryFilled, "entry filled");

    let fill_price = entry.filled_price.unwrap_or(price);
    let (low, high) = stop_profit_range(side, config.win_to_loss_ratio, risk, fill_price);
    let low = truncate(low, subject.min_price_increment);
    let high = truncate(high, subject.min_price_increment);
    let exit_side = !side;

    tracing::debug!(%low, %high, state = %TradeState::BracketActive, "submitting bracket exit");
    let (exit, leaked) = match bracket_style {
        BracketStyle::Oco => {
            let bracket = broker
                .create_order(
                    &subject.symbol,
                    entry.filled_size,
                    exit_side,
                    OrderType::Range,
                    TimeInForce::Gtc,
                    Some(OrderPrice::Range(low, high)),
                )
                .await?;
            let bracket = broker.wait_for_execution(&bracket.id, None).await?;
            let leaked = bracket.filled_size < entry.filled_size;
            (bracket, leaked)
        }
        BracketStyle::Twin => {
            let stop = broker
                .create_order(
                    &subject.symbol,
                    entry.filled_size,
                    exit_side,
                    OrderType::Stop,
                    TimeInForce::Gtc,
                    Some(OrderPrice::Single(low)),
                )
                .await?;
            let take = broker
                .create_order(
                    &subject.symbol,
                    entry.filled_size,
                    exit_side,
                    OrderType::Limit,
                    TimeInForce::Gtc,
                    Some(OrderPrice::Single(high)),
                )
                .await?;

            let (winner, loser_id) = tokio::select! {
                result = broker.wait_for_execution(&stop.id, None) => (result?, take.id.clone()),
                result = broker.wait_for_execution(&take.id, None) => (result?, stop.id.clone()),
            };
            broker.cancel_order(&loser_id).await?;
            let leaked = winner.filled_size < entry.filled_size;
            (winner, leaked)
        }
    };

    tracing::debug!(order_id = %exit.id, filled = %exit.filled_size, state = %TradeState::OneSideDone, "one side of the bracket completed");

    if leaked {
        tracing::error!(
            symbol = %subject.symbol,
            entry_id = %entry.id,
            entry_filled = %entry.filled_size,
            exit_id = %exit.id,
            exit_filled = %exit.filled_size,
            "LEAKED_POSITION: exit did not fully close the entry, manual reconciliation required"
        );
        return Ok(TradeOutcome {
            state: TradeState::LeakedPosition,
            entry: Some(entry),
            exit: Some(exit),
            reason: Some(format!(
                "exit {} filled {} but entry {} filled {}",
                exit.id, exit.filled_size, entry.id, entry.filled_size
            )),
        });
    }

    tracing::info!(symbol = %subject.symbol, state = %TradeState::Closed, "bracket trade closed");
    Ok(TradeOutcome {
        state: TradeState::Closed,
        entry: Some(entry),
        exit: Some(exit),
        reason: None,
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::account::Account;
    use crate::broker::mock::{FillBehaviour, MockBrokerAdapter};

    fn subject() -> TradeSubject {
        TradeSubject {
            symbol: SmolStr::new("AAPL"),
            min_price_increment: dec!(0.01),
            min_size_increment: dec!(1),
        }
    }

    fn config() -> TradeConfig {
        TradeConfig::new(dec!(1), dec!(50), dec!(2))
    }

    #[tokio::test]
    async fn happy_path_closes_via_oco_bracket() {
        let broker = MockBrokerAdapter::new(Account::new(dec!(100_000), dec!(100_000)));
        broker.set_fill_behaviour("AAPL", FillBehaviour::FullFillAt(dec!(100)));

        let outcome = execute_bracket_trade(
            &broker,
            &subject(),
            Side::Buy,
            dec!(100),
            dec!(1),
            &config(),
            BracketStyle::Oco,
        )
        .await
        .expect("trade runs to completion");

        assert_eq!(outcome.state, TradeState::Closed);
        assert!(outcome.entry.is_some());
        assert!(outcome.exit.is_some());
    }

    #[tokio::test]
    async fn happy_path_closes_via_twin_exit_orders() {
        let broker = MockBrokerAdapter::new(Account::new(dec!(100_000), dec!(100_000)));
        broker.set_fill_behaviour("AAPL", FillBehaviour::FullFillAt(dec!(100)));

        let outcome = execute_bracket_trade(
            &broker,
            &subject(),
            Side::Buy,
            dec!(100),
            dec!(1),
            &config(),
            BracketStyle::Twin,
        )
        .await
        .expect("trade runs to completion");

        assert_eq!(outcome.state, TradeState::Closed);
        let entry = outcome.entry.expect("entry present");
        let exit = outcome.exit.expect("exit present");
        assert_eq!(exit.filled_size, entry.filled_size);
    }

    #[tokio::test]
    async fn rejected_entry_yields_failed_to_enter_without_error() {
        let broker = MockBrokerAdapter::new(Account::new(dec!(100_000), dec!(100_000)));
        broker.set_fill_behaviour("AAPL", FillBehaviour::Reject);

        let outcome = execute_bracket_trade(
            &broker,
            &subject(),
            Side::Buy,
            dec!(100),
            dec!(1),
            &config(),
            BracketStyle::Oco,
        )
        .await
        .expect("a rejected entry is a terminal outcome, not an error");

        assert_eq!(outcome.state, TradeState::FailedToEnter);
        assert!(outcome.exit.is_none());
    }

    #[tokio::test]
    async fn insufficient_buying_power_aborts_before_any_order() {
        let broker = MockBrokerAdapter::new(Account::new(dec!(100_000), dec!(0)));
        broker.set_fill_behaviour("AAPL", FillBehaviour::FullFillAt(dec!(100)));

        let outcome = execute_bracket_trade(
            &broker,
            &subject(),
            Side::Buy,
            dec!(100),
            dec!(1),
            &config(),
            BracketStyle::Oco,
        )
        .await
        .expect("sizing failure is a terminal outcome, not an error");

        assert_eq!(outcome.state, TradeState::FailedToEnter);
        assert!(outcome.entry.is_none());
    }

    #[tokio::test]
    async fn sell_side_bracket_swaps_stop_and_target() {
        let broker = MockBrokerAdapter::new(Account::new(dec!(100_000), dec!(100_000)));
        broker.set_fill_behaviour("AAPL", FillBehaviour::FullFillAt(dec!(100)));

        let outcome = execute_bracket_trade(
            &broker,
            &subject(),
            Side::Sell,
            dec!(100),
            dec!(1),
            &config(),
            BracketStyle::Oco,
        )
        .await
        .expect("trade runs to completion");

        assert_eq!(outcome.state, TradeState::Closed);
    }
}
