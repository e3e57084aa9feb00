use thiserror::Error;

use crate::{
    db_types::{Cents, CourseId, ProviderTxId},
    traits::{CartError, CatalogError, OrderLedgerError, ProviderError},
};

#[derive(Debug, Clone, Error)]
pub enum CheckoutError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("The cart is empty. There is nothing to check out.")]
    EmptyCart,
    #[error("The course {0} does not exist")]
    CourseNotFound(CourseId),
    #[error("The course {course_id} has an invalid price of {price}")]
    InvalidPrice { course_id: CourseId, price: Cents },
    #[error("{0}")]
    Provider(#[from] ProviderError),
    #[error("Payment for {provider_id} was not completed. The provider reported status {status}")]
    CaptureNotCompleted { provider_id: ProviderTxId, status: String },
    #[error("A charge was opened with provider id {provider_id}, but the order could not be saved. {reason}")]
    OrphanedCharge { provider_id: ProviderTxId, reason: String },
    #[error("No order is bound to provider transaction {0}")]
    OrderNotFound(ProviderTxId),
    #[error("The order for provider transaction {0} has expired")]
    OrderExpired(ProviderTxId),
    #[error("An order is already bound to provider transaction {0}")]
    DuplicateProviderId(ProviderTxId),
}

impl From<CatalogError> for CheckoutError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::DatabaseError(s) => CheckoutError::DatabaseError(s),
            CatalogError::CourseNotFound(id) => CheckoutError::CourseNotFound(id),
        }
    }
}

impl From<CartError> for CheckoutError {
    fn from(e: CartError) -> Self {
        match e {
            CartError::DatabaseError(s) => CheckoutError::DatabaseError(s),
        }
    }
}

impl From<OrderLedgerError> for CheckoutError {
    fn from(e: OrderLedgerError) -> Self {
        match e {
            OrderLedgerError::DatabaseError(s) => CheckoutError::DatabaseError(s),
            OrderLedgerError::DuplicateProviderId(id) => CheckoutError::DuplicateProviderId(id),
            OrderLedgerError::EmptyOrder => CheckoutError::EmptyCart,
            OrderLedgerError::ProviderIdNotFound(id) => CheckoutError::OrderNotFound(id),
            OrderLedgerError::OrderExpired(id) => CheckoutError::OrderExpired(id),
            OrderLedgerError::OrderNotFound(oid) => {
                CheckoutError::DatabaseError(format!("Order {oid} disappeared from the ledger"))
            },
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum CartApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("The course {0} does not exist")]
    CourseNotFound(CourseId),
    #[error("The course {0} has already been purchased")]
    AlreadyOwned(CourseId),
}

impl From<CatalogError> for CartApiError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::DatabaseError(s) => CartApiError::DatabaseError(s),
            CatalogError::CourseNotFound(id) => CartApiError::CourseNotFound(id),
        }
    }
}

impl From<CartError> for CartApiError {
    fn from(e: CartError) -> Self {
        match e {
            CartError::DatabaseError(s) => CartApiError::DatabaseError(s),
        }
    }
}

impl From<OrderLedgerError> for CartApiError {
    fn from(e: OrderLedgerError) -> Self {
        CartApiError::DatabaseError(e.to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AccountApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<OrderLedgerError> for AccountApiError {
    fn from(e: OrderLedgerError) -> Self {
        AccountApiError::DatabaseError(e.to_string())
    }
}
