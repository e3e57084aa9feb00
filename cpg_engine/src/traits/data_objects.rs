use serde::{Deserialize, Serialize};

use crate::db_types::Order;

/// The result of a guarded status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusUpdate {
    /// The order was `Pending` and now carries the requested status.
    Updated(Order),
    /// The order was already terminal. Nothing was written; the current record is returned.
    Unchanged(Order),
}

impl StatusUpdate {
    pub fn order(&self) -> &Order {
        match self {
            StatusUpdate::Updated(o) | StatusUpdate::Unchanged(o) => o,
        }
    }

    pub fn is_updated(&self) -> bool {
        matches!(self, StatusUpdate::Updated(_))
    }
}

/// The outcome of a fulfilment transaction.
///
/// `newly_fulfilled` is `false` when the order had already been fulfilled by an earlier call (e.g. a redelivered
/// webhook, or a capture racing the webhook). In that case nothing was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fulfilment {
    pub order: Order,
    pub newly_fulfilled: bool,
    /// The number of cart items removed by this call.
    pub cart_items_cleared: u64,
}
