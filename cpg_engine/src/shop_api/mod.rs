//! # Course payment engine public API
//!
//! The `shop_api` module exposes the programmatic API for the checkout engine. Each API is created by supplying a
//! backend that implements the traits it needs, and every operation takes the acting user's id explicitly.
//!
//! * [`cart_api`] manages a user's cart.
//! * [`checkout_api`] opens charges, confirms payments, fulfils orders and expires stale ones.
//! * [`account_api`] reads the order history and the courses a user owns.
//!
//! ```rust,ignore
//! use cpg_engine::{CheckoutApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! let api = CheckoutApi::new(db, producers);
//! let initiation = api.checkout(&user_id, &paypal).await?;
//! ```

pub mod account_api;
pub mod cart_api;
pub mod checkout_api;
pub mod errors;
pub mod shop_objects;
