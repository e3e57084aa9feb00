//! # Course payment gateway server
//! This crate hosts the HTTP front end of the course shop checkout. It is responsible for:
//! * Resolving the caller's identity from their bearer token and passing it explicitly to the engine.
//! * Validating request input before it reaches the engine.
//! * Opening PayPal and Stripe charges for the user's cart, and capturing PayPal payments.
//! * Receiving and verifying Stripe's signed payment notifications, and fulfilling the matching order.
//! * Expiring pending orders that were never paid.
//! * Tagging every request with an `X-Request-Id` that appears in the access log and in error logs.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/cart`, `/api/cart/items`: The authenticated user's cart.
//! * `/api/courses/owned`, `/api/orders`: Purchase history.
//! * `/api/orders/paypal`, `/api/orders/paypal/{id}/capture`: Synchronous PayPal checkout.
//! * `/api/orders/stripe`: Opens a Stripe checkout session.
//! * `/orders/stripe/capture`: The Stripe webhook.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod expiry_worker;
pub mod integrations;
pub mod request_id;
pub mod routes;
pub mod server;
pub mod validation;

#[cfg(test)]
mod endpoint_tests;
