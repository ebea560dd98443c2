use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::account::Account;
use crate::error::BrokerError;
use crate::order::{Order, OrderPrice, OrderType, Side, TimeInForce};

/// Abstraction over a concrete brokerage/exchange trading API.
///
/// `wait_for_execution` resolves once the order reaches a terminal
/// [`crate::order::Status`] or `timeout` elapses, whichever comes first --
/// never only on a timeout, and never spinning forever on a still-pending
/// order with no deadline unless the caller genuinely wants an unbounded
/// wait (pass `None`).
#[async_trait]
pub trait BrokerAdapter: Send + Sync {
    async fn get_account(&self) -> Result<Account, BrokerError>;

    async fn create_order(
        &self,
        symbol: &str,
        size: Decimal,
        side: Side,
        kind: OrderType,
        time_in_force: TimeInForce,
        price: Option<OrderPrice>,
    ) -> Result<Order, BrokerError>;

    async fn get_order(&self, order_id: &str) -> Result<Order, BrokerError>;

    async fn cancel_order(&self, order_id: &str) -> Result<(), BrokerError>;

    async fn wait_for_execution(
        &self,
        order_id: &str,
        timeout: Option<std::time::Duration>,
    ) -> Result<Order, BrokerError>;
}

/// In-memory broker for tests: orders fill (or not) according to a
/// scriptable per-symbol fill price, grounded on the original's in-memory
/// backtest trading provider.
pub mod mock {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU64, Ordering};

    use parking_lot::Mutex;
    use smol_str::SmolStr;

    use super::*;
    use crate::order::Status;

    #[derive(Debug, Clone, Copy)]
    pub enum FillBehaviour {
        FullFillAt(Decimal),
        Reject,
        StayPending,
    }

    pub struct MockBrokerAdapter {
        account: Mutex<Account>,
        next_id: AtomicU64,
        orders: Mutex<HashMap<SmolStr, Order>>,
        fills: Mutex<HashMap<SmolStr, FillBehaviour>>,
    }

    impl MockBrokerAdapter {
        pub fn new(account: Account) -> Self {
            Self {
                account: Mutex::new(account),
                next_id: AtomicU64::new(1),
                orders: Mutex::new(HashMap::new()),
                fills: Mutex::new(HashMap::new()),
            }
        }

        pub fn set_fill_behaviour(&self, symbol: &str, behaviour: FillBehaviour) {
            self.fills.lock().insert(SmolStr::new(symbol), behaviour);
        }
    }

    #[async_trait]
    impl BrokerAdapter for MockBrokerAdapter {
        async fn get_account(&self) -> Result<Account, BrokerError> {
            Ok(*self.account.lock())
        }

        async fn create_order(
            &self,
            symbol: &str,
            size: Decimal,
            side: Side,
            kind: OrderType,
            time_in_force: TimeInForce,
            price: Option<OrderPrice>,
        ) -> Result<Order, BrokerError> {
            let id = SmolStr::new(self.next_id.fetch_add(1, Ordering::SeqCst).to_string());
            let behaviour = self
                .fills
                .lock()
                .get(symbol)
                .copied()
                .unwrap_or(FillBehaviour::FullFillAt(Decimal::ONE));

            let (status, filled_size, filled_price) = match behaviour {
                FillBehaviour::FullFillAt(p) => (Status::Filled, size, Some(p)),
                FillBehaviour::Reject => (Status::Rejected, Decimal::ZERO, None),
                FillBehaviour::StayPending => (Status::Pending, Decimal::ZERO, None),
            };

            let order = Order {
                id: id.clone(),
                symbol: SmolStr::new(symbol),
                size,
                side,
                kind,
                time_in_force,
                price,
                status,
                filled_size,
                filled_price,
                submitted_at: chrono::Utc::now(),
            };
            self.orders.lock().insert(id, order.clone());
            Ok(order)
        }

        async fn get_order(&self, order_id: &str) -> Result<Order, BrokerError> {
            self.orders
                .lock()
                .get(order_id)
                .cloned()
                .ok_or_else(|| BrokerError::UnknownOrder(order_id.to_string()))
        }

        async fn cancel_order(&self, order_id: &str) -> Result<(), BrokerError> {
            let mut orders = self.orders.lock();
            let order = orders
                .get_mut(order_id)
                .ok_or_else(|| BrokerError::UnknownOrder(order_id.to_string()))?;
            if !order.status.is_terminal() {
                order.status = Status::Cancelled;
            }
            Ok(())
        }

        async fn wait_for_execution(
            &self,
            order_id: &str,
            _timeout: Option<std::time::Duration>,
        ) -> Result<Order, BrokerError> {
            self.get_order(order_id).await
        }
    }
}
