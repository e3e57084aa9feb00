use chrono::Duration;
use thiserror::Error;

use crate::{
    db_types::{Course, NewOrder, Order, OrderId, OrderItem, OrderStatusType, ProviderTxId, UserId},
    traits::StatusUpdate,
};

#[derive(Debug, Clone, Error)]
pub enum OrderLedgerError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("An order is already bound to provider transaction {0}")]
    DuplicateProviderId(ProviderTxId),
    #[error("An order must contain at least one item")]
    EmptyOrder,
    #[error("The order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("No order is bound to provider transaction {0}")]
    ProviderIdNotFound(ProviderTxId),
    #[error("The order for provider transaction {0} has expired and cannot be fulfilled")]
    OrderExpired(ProviderTxId),
}

impl From<sqlx::Error> for OrderLedgerError {
    fn from(e: sqlx::Error) -> Self {
        OrderLedgerError::DatabaseError(e.to_string())
    }
}

/// The order ledger: the durable record of every checkout attempt and its priced line items.
///
/// Order status is monotonic. `Pending` moves to `Success` or `Expired`, and nothing leaves a terminal state.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Writes the order and all its items in a single atomic transaction. The order is created in `Pending` state,
    /// with its total set to the sum of the item prices.
    ///
    /// Fails with [`OrderLedgerError::DuplicateProviderId`] if an order is already bound to the provider id, in which
    /// case nothing is written.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderLedgerError>;

    /// Fails with [`OrderLedgerError::ProviderIdNotFound`] if no order is bound to the provider id.
    async fn fetch_order_by_provider_id(&self, provider_id: &ProviderTxId) -> Result<Order, OrderLedgerError>;

    async fn fetch_order_items(&self, order_id: &OrderId) -> Result<Vec<OrderItem>, OrderLedgerError>;

    /// Moves a `Pending` order to `new_status`. If the order is already terminal, this is a no-op and
    /// [`StatusUpdate::Unchanged`] is returned, so repeated calls are safe.
    async fn update_order_status(
        &self,
        order_id: &OrderId,
        new_status: OrderStatusType,
    ) -> Result<StatusUpdate, OrderLedgerError>;

    /// All of the user's orders, newest first.
    async fn fetch_orders_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, OrderLedgerError>;

    /// The courses contained in any of the user's `Success` orders.
    async fn fetch_owned_courses(&self, user_id: &UserId) -> Result<Vec<Course>, OrderLedgerError>;

    /// Marks every `Pending` order that has not been updated for longer than `older_than` as `Expired`.
    ///
    /// The result is the list of orders that were expired.
    async fn expire_old_orders(&self, older_than: Duration) -> Result<Vec<Order>, OrderLedgerError>;
}
