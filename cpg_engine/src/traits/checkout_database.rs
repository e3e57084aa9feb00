use crate::{
    db_types::ProviderTxId,
    traits::{CartManagement, CatalogManagement, Fulfilment, OrderLedgerError, OrderManagement},
};

/// This trait defines the highest level of behaviour for backends supporting the checkout engine.
///
/// Besides the catalog, cart and ledger behaviour, the backend must supply the fulfilment transaction, since it
/// spans both orders and carts and must be applied as one atomic unit.
#[allow(async_fn_in_trait)]
pub trait CheckoutDatabase: Clone + CatalogManagement + CartManagement + OrderManagement {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Fulfils the order bound to `provider_id`. In a single atomic transaction:
    /// * the order status is moved from `Pending` to `Success` with a status-guarded write, and
    /// * every item in the cart of the order's owner is deleted.
    ///
    /// Calling this more than once for the same provider id is safe. If the order is already `Success`, nothing is
    /// written and `newly_fulfilled` is `false` in the result.
    ///
    /// ## Failure modes:
    /// * [`OrderLedgerError::ProviderIdNotFound`] if no order is bound to the id. Callers should treat this as
    ///   retryable, since the order write may not have committed yet.
    /// * [`OrderLedgerError::OrderExpired`] if the order expired before payment was confirmed.
    async fn fulfil_order(&self, provider_id: &ProviderTxId) -> Result<Fulfilment, OrderLedgerError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), OrderLedgerError> {
        Ok(())
    }
}
