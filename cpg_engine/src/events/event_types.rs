use serde::{Deserialize, Serialize};

use crate::db_types::Order;

/// Published once per order, when payment is confirmed and the order first reaches `Success`. Redelivered
/// confirmations for an order that is already fulfilled do not publish this event again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFulfilledEvent {
    pub order: Order,
}

impl OrderFulfilledEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}

/// Published for each pending order that the expiry sweep moves to `Expired`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderExpiredEvent {
    pub order: Order,
}

impl OrderExpiredEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}
