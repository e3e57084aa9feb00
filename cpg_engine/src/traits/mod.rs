//! # Backend and provider contracts
//!
//! This module defines the interfaces the checkout engine depends on. A database backend implements the first four
//! traits; each payment provider integration implements one or both of the provider traits.
//!
//! * [`CatalogManagement`] reads course price, name and description snapshots. The catalog itself is maintained
//!   elsewhere.
//! * [`CartManagement`] holds a user's pending selections.
//! * [`OrderManagement`] is the order ledger. It is also the source of truth for course ownership: a user owns a
//!   course iff a `Success` order of theirs contains it.
//! * [`CheckoutDatabase`] ties the above together and adds the fulfilment transaction, which has to touch orders and
//!   carts atomically.
//! * [`PaymentProvider`] opens a charge with an external provider. [`CaptureProvider`] is the synchronous-capture
//!   variant that can also confirm a charge on request.
mod cart_management;
mod catalog_management;
mod checkout_database;
mod data_objects;
mod order_management;
mod payment_provider;

pub use cart_management::{CartError, CartManagement};
pub use catalog_management::{CatalogError, CatalogManagement};
pub use checkout_database::CheckoutDatabase;
pub use data_objects::{Fulfilment, StatusUpdate};
pub use order_management::{OrderLedgerError, OrderManagement};
pub use payment_provider::{
    CaptureOutcome,
    CaptureProvider,
    ChargeInitiation,
    ChargeLine,
    ChargeRequest,
    PaymentProvider,
    ProviderError,
};
