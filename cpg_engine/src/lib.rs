//! Course Payment Engine
//!
//! The checkout engine turns a user's cart into a paid order. It is provider-agnostic: payment integrations plug in
//! through the [`traits::PaymentProvider`] and [`traits::CaptureProvider`] traits.
//!
//! The library is divided into three main sections:
//! 1. Backend contracts ([`mod@traits`]) and the SQLite implementation of them ([`SqliteDatabase`]). You should never
//!    need to access the database directly. The exception is the data types used in the database, which are defined
//!    in the [`mod@db_types`] module and are public.
//! 2. The public API ([`CartApi`], [`CheckoutApi`], [`AccountApi`]). This is where the checkout orchestration and
//!    fulfilment rules live.
//! 3. Events. When an order is fulfilled or expires, an event is emitted. A simple actor framework lets you hook into
//!    these events and perform custom actions.
pub mod db_types;
pub mod events;
mod shop_api;
#[cfg(feature = "sqlite")]
mod sqlite;
pub mod traits;

pub use shop_api::{
    account_api::AccountApi,
    cart_api::CartApi,
    checkout_api::CheckoutApi,
    errors::{AccountApiError, CartApiError, CheckoutError},
    shop_objects,
};
#[cfg(feature = "sqlite")]
pub use sqlite::{db::SQLITE_DB_URL, SqliteDatabase};
